//! Line-oriented YAML output with explicit indentation

use crate::error::{Error, Result};
use std::fmt;
use std::io::Write;

/// Indentation step, in spaces
pub const TAB: usize = 2;

/// Writes one YAML line at a time to an `io::Write` sink
pub struct YamlWriter<W: Write> {
    sink: W,
}

impl<W: Write> YamlWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Write `text` indented by `indent` spaces, followed by a newline
    pub fn line(&mut self, indent: usize, text: impl fmt::Display) -> Result<()> {
        writeln!(self.sink, "{:width$}{}", "", text, width = indent).map_err(write_error)
    }

    /// Write a YAML comment line
    pub fn comment(&mut self, indent: usize, text: impl fmt::Display) -> Result<()> {
        self.line(indent, format_args!("# {}", text))
    }

    pub fn blank(&mut self) -> Result<()> {
        writeln!(self.sink).map_err(write_error)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush().map_err(write_error)
    }
}

fn write_error(source: std::io::Error) -> Error {
    Error::io("failed to write OpenAPI document", source)
}

/// Single-quoted YAML scalar with embedded quotes doubled
pub fn single_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Double-quoted YAML scalar; backslashes and quotes are escaped so the
/// scalar decodes back to `value`
pub fn double_quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Quote a regular expression so it survives YAML decoding unchanged
pub fn quoted_pattern(pattern: &str) -> String {
    if pattern.contains('\\') {
        double_quoted(pattern)
    } else {
        single_quoted(pattern)
    }
}

/// Flow sequence of already-rendered scalars: `['a','b']`
pub fn flow_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined: Vec<String> = items
        .into_iter()
        .map(|item| item.as_ref().to_string())
        .collect();
    format!("[{}]", joined.join(","))
}

/// Whether a facet literal can be written as a bare YAML number
pub fn is_numeric(literal: &str) -> bool {
    literal.trim().parse::<f64>().is_ok_and(f64::is_finite)
        && literal
            .trim()
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
}

/// `$ref` target for a component schema
pub fn schema_ref(type_name: &str) -> String {
    single_quoted(&format!("#/components/schemas/{}", type_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_indents() {
        let mut out = Vec::new();
        {
            let mut writer = YamlWriter::new(&mut out);
            writer.line(0, "a:").unwrap();
            writer.line(TAB, format_args!("b: {}", 1)).unwrap();
            writer.comment(TAB, "note").unwrap();
            writer.blank().unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "a:\n  b: 1\n  # note\n\n");
    }

    #[test]
    fn test_quoting() {
        assert_eq!(single_quoted("it's"), "'it''s'");
        assert_eq!(quoted_pattern("[A-Z]{3}"), "'[A-Z]{3}'");
        assert_eq!(quoted_pattern("\\d{2}"), "\"\\\\d{2}\"");
        assert_eq!(flow_list(["'a'", "'b'"]), "['a','b']");
    }

    #[test]
    fn test_double_quoted_pattern_decodes_back() {
        let pattern = "\\+[0-9]{1,3}-\"x\"";
        let yaml = format!("pattern: {}", quoted_pattern(pattern));
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(value["pattern"].as_str(), Some(pattern));
    }

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric("0"));
        assert!(is_numeric("-12.50"));
        assert!(is_numeric("1e3"));
        assert!(!is_numeric("2020-01-01"));
        assert!(!is_numeric("inf"));
        assert!(!is_numeric("NaN"));
    }
}
