//! Error types for the xsd2oas core library
//!
//! This module defines the error handling system for the conversion engine,
//! using thiserror for ergonomic error definitions and anyhow for opaque
//! causes coming out of the XML layer.

use thiserror::Error;

/// Main error type for xsd2oas operations
#[derive(Error, Debug)]
pub enum Error {
    /// A type name is referenced but never defined in the graph
    #[error("Undefined type '{name}' referenced by {referenced_by}")]
    UndefinedType {
        name: String,
        referenced_by: String,
    },

    /// The designated root is missing or not a complex type
    #[error("Invalid root type '{name}': {message}")]
    InvalidRoot { name: String, message: String },

    /// A pattern facet that cannot be compiled
    #[error("Invalid pattern facet on type '{type_name}': {pattern}")]
    Pattern {
        type_name: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A sample value could not be produced for a simple type
    #[error("Sample generation failed for type '{type_name}': {message}")]
    SampleGeneration { type_name: String, message: String },

    /// XSD input that cannot be read into a type graph
    #[error("XSD error: {message}")]
    Xsd {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// IO errors while writing to an output sink
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an XSD error without an underlying cause
    pub fn xsd(message: impl Into<String>) -> Self {
        Self::Xsd {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a sink write failure with a description of what was being written
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }
}

impl From<roxmltree::Error> for Error {
    fn from(err: roxmltree::Error) -> Self {
        Self::Xsd {
            message: format!("malformed XML: {}", err),
            source: Some(anyhow::Error::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_type_message() {
        let err = Error::UndefinedType {
            name: "PartyId".to_string(),
            referenced_by: "element 'Pty' of 'Party'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Undefined type 'PartyId' referenced by element 'Pty' of 'Party'"
        );
    }

    #[test]
    fn test_xsd_error_has_no_source() {
        use std::error::Error as _;
        let err = Error::xsd("no global element");
        assert!(err.source().is_none());
    }
}
