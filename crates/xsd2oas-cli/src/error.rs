//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application, and maps each of them to
//! the process exit code scripts rely on.

use std::error::Error as StdError;
use std::io;
use std::path::{Path, PathBuf};

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Exit code for command-line usage errors
pub const EXIT_USAGE: i32 = 1;
/// Exit code for file open, create, read and write failures
pub const EXIT_IO: i32 = 2;
/// Exit code for failures while converting the schema
pub const EXIT_CONVERSION: i32 = 3;
/// Exit code for unusable configuration files
pub const EXIT_CONFIG: i32 = 4;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or inconsistent command-line arguments
    #[error("{0}")]
    Usage(String),

    /// A file could not be opened, created, read or written
    #[error("Cannot {action} {}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Error from xsd2oas-core library
    #[error("Conversion failed for {}", path.display())]
    Core {
        path: PathBuf,
        #[source]
        source: xsd2oas_core::Error,
    },

    /// Configuration file could not be read or parsed
    #[error("Configuration error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Create a configuration error
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => EXIT_USAGE,
            Self::Io { .. } => EXIT_IO,
            // Write failures surface from the emitters as core errors
            Self::Core {
                source: xsd2oas_core::Error::Io { .. },
                ..
            } => EXIT_IO,
            Self::Core { .. } => EXIT_CONVERSION,
            Self::Config { .. } => EXIT_CONFIG,
            Self::Other { .. } => EXIT_USAGE,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}

/// Extension trait attaching file context to fallible results
pub trait ErrorContext<T> {
    /// Attach the failed file action and path to an I/O error
    fn with_path(self, action: &'static str, path: &Path) -> Result<T>;
}

impl<T> ErrorContext<T> for std::result::Result<T, io::Error> {
    fn with_path(self, action: &'static str, path: &Path) -> Result<T> {
        self.map_err(|source| Error::Io {
            action,
            path: path.to_path_buf(),
            source,
        })
    }
}

impl<T> ErrorContext<T> for xsd2oas_core::Result<T> {
    fn with_path(self, _action: &'static str, path: &Path) -> Result<T> {
        self.map_err(|source| Error::Core {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Format an error and its causes for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    let mut message = if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    };

    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(&format!("\n  caused by: {}", cause));
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn core_error() -> xsd2oas_core::Error {
        xsd2oas_core::Error::UndefinedType {
            name: "Amount".to_string(),
            referenced_by: "element 'Amt' of 'Body'".to_string(),
        }
    }

    #[test]
    fn test_exit_codes() {
        let missing: io::Result<()> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(Error::usage("missing -in").exit_code(), 1);
        assert_eq!(
            missing.with_path("read", Path::new("in.xsd")).unwrap_err().exit_code(),
            2
        );
        let converted: xsd2oas_core::Result<()> = Err(core_error());
        assert_eq!(
            converted.with_path("convert", Path::new("in.xsd")).unwrap_err().exit_code(),
            3
        );
        assert_eq!(Error::config("x.yaml", "bad").exit_code(), 4);
    }

    #[test]
    fn test_core_write_failure_is_io() {
        let error = Error::Core {
            path: PathBuf::from("out.yaml"),
            source: xsd2oas_core::Error::io(
                "failed to write OpenAPI document",
                io::Error::new(io::ErrorKind::Other, "disk full"),
            ),
        };
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_format_error_includes_cause_chain() {
        let error = Error::Core {
            path: PathBuf::from("pain.xsd"),
            source: core_error(),
        };
        assert_eq!(
            format_error(&error, false),
            "Error: Conversion failed for pain.xsd\n  caused by: Undefined type 'Amount' referenced by element 'Amt' of 'Body'"
        );
    }

    #[test]
    fn test_only_usage_errors_show_help() {
        assert!(Error::usage("missing -out").should_show_help());
        assert!(!Error::other("boom").should_show_help());
    }
}
