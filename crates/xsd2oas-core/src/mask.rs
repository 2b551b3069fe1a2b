//! Mask of required element paths
//!
//! A mask line is a fully qualified path such as `/Document/Body/Amount` that
//! must be present in the output. Every ancestor of a mask line is required
//! as well, so a path is selected when it is a prefix of some mask line.
//! Prefixes are compared at path-segment boundaries: `/A/B` selects
//! `/A/B/C` but never `/A/Bx/C`.

/// An ordered list of required element paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mask {
    lines: Vec<String>,
}

impl Mask {
    /// Build a mask from individual lines
    ///
    /// Lines are trimmed, blank lines and `#` comments are dropped, and a
    /// trailing `/` is removed.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = lines
            .into_iter()
            .filter_map(|line| {
                let line = line.as_ref().trim();
                if line.is_empty() || line.starts_with('#') {
                    return None;
                }
                let line = line.trim_end_matches('/');
                (!line.is_empty()).then(|| line.to_string())
            })
            .collect();
        Self { lines }
    }

    /// Parse newline-delimited mask text
    pub fn parse(text: &str) -> Self {
        Self::from_lines(text.lines())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether `path` is a mask line or an ancestor of one
    pub fn matches(&self, path: &str) -> bool {
        self.lines
            .iter()
            .any(|line| line == path || is_strictly_below(line, path))
    }

    /// Whether some mask line lies strictly below `path`
    pub fn extends_below(&self, path: &str) -> bool {
        self.lines.iter().any(|line| is_strictly_below(line, path))
    }
}

fn is_strictly_below(line: &str, path: &str) -> bool {
    line.strip_prefix(path)
        .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_skips_noise() {
        let mask = Mask::parse("  /Document/Body/Amount  \n\n# comment\n/Document/Hdr/\n");
        assert_eq!(mask.lines(), &["/Document/Body/Amount", "/Document/Hdr"]);
        assert_eq!(mask.len(), 2);
    }

    #[test]
    fn test_ancestors_match() {
        let mask = Mask::parse("/A/B/C");
        assert!(mask.matches("/A"));
        assert!(mask.matches("/A/B"));
        assert!(mask.matches("/A/B/C"));
        assert!(!mask.matches("/A/B/C/D"));
    }

    #[test]
    fn test_segment_boundary() {
        let mask = Mask::parse("/A/Bx/C");
        assert!(!mask.matches("/A/B"));
        assert!(mask.matches("/A/Bx"));
    }

    #[test]
    fn test_extends_below() {
        let mask = Mask::parse("/A/B/C");
        assert!(mask.extends_below("/A/B"));
        assert!(!mask.extends_below("/A/B/C"));
    }

    #[test]
    fn test_empty_mask_matches_nothing() {
        let mask = Mask::parse("\n\n");
        assert!(mask.is_empty());
        assert!(!mask.matches("/A"));
    }

    proptest! {
        #[test]
        fn prop_every_ancestor_of_a_line_matches(
            segments in proptest::collection::vec("[A-Za-z][A-Za-z0-9]{0,8}", 1..6)
        ) {
            let line = format!("/{}", segments.join("/"));
            let mask = Mask::parse(&line);
            for depth in 1..=segments.len() {
                let ancestor = format!("/{}", segments[..depth].join("/"));
                prop_assert!(mask.matches(&ancestor));
            }
        }

        #[test]
        fn prop_textual_prefix_of_last_segment_never_matches(
            parent in "[A-Z][a-z]{0,6}",
            leaf in "[A-Z][a-z]{1,6}",
        ) {
            let mask = Mask::parse(&format!("/{parent}/{leaf}x"));
            let shorter = format!("/{parent}/{leaf}");
            prop_assert!(!mask.matches(&shorter));
        }
    }
}
