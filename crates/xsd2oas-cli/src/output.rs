//! Terminal output for the CLI
//!
//! Generated documents go to files; this writer only carries status lines
//! and the tagged-path listing, honoring the quiet and color settings.

use crate::error::{ErrorContext, Result};
use colored::Colorize;
use std::io::{self, Write};
use std::path::Path;

/// Output writer for status messages
pub struct OutputWriter {
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self::with_writer(use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(use_color: bool, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            use_color,
            quiet,
            writer,
        }
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)
            .and_then(|()| self.writer.flush())
            .with_path("write to", Path::new("stdout"))
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write one tagged element path
    pub fn path(&mut self, path: &str, leaf: bool) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_color && !leaf {
            self.writeln(&path.dimmed().to_string())
        } else {
            self.writeln(path)
        }
    }
}

#[cfg(test)]
mod tests;
