//! Random string generation from a regular expression
//!
//! The pattern is parsed into a `regex_syntax` HIR and walked once per
//! sample: literals are copied, classes pick one character, repetitions pick
//! a count, alternations pick one branch. Look-around assertions produce
//! nothing. Unbounded repetitions (`*`, `+`, `{n,}`) are capped at
//! `repeat_limit` extra iterations.

use rand::Rng;
use regex_syntax::hir::{Class, ClassBytesRange, ClassUnicodeRange, Hir, HirKind};
use regex_syntax::ParserBuilder;
use std::borrow::Cow;

/// Printable ASCII, preferred whenever a class overlaps it
const PRINTABLE: (u32, u32) = (0x20, 0x7E);

/// Generator for strings matching one regular expression
#[derive(Debug, Clone)]
pub struct PatternGenerator {
    hir: Hir,
    repeat_limit: u32,
}

impl PatternGenerator {
    pub fn new(pattern: &str, repeat_limit: u32) -> Result<Self, regex_syntax::Error> {
        let hir = ParserBuilder::new().build().parse(pattern)?;
        Ok(Self { hir, repeat_limit })
    }

    /// Produce one candidate string
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let mut out = String::new();
        self.walk(&self.hir, rng, &mut out);
        out
    }

    fn walk<R: Rng + ?Sized>(&self, hir: &Hir, rng: &mut R, out: &mut String) {
        match hir.kind() {
            HirKind::Empty | HirKind::Look(_) => {}
            HirKind::Literal(literal) => out.push_str(&String::from_utf8_lossy(&literal.0)),
            HirKind::Class(Class::Unicode(class)) => {
                if let Some(c) = pick_unicode(class.ranges(), rng) {
                    out.push(c);
                }
            }
            HirKind::Class(Class::Bytes(class)) => {
                if let Some(c) = pick_byte(class.ranges(), rng) {
                    out.push(c);
                }
            }
            HirKind::Repetition(repetition) => {
                let min = repetition.min;
                let max = repetition
                    .max
                    .unwrap_or_else(|| min.saturating_add(self.repeat_limit))
                    .max(min);
                let count = rng.gen_range(min..=max);
                for _ in 0..count {
                    self.walk(&repetition.sub, rng, out);
                }
            }
            HirKind::Capture(capture) => self.walk(&capture.sub, rng, out),
            HirKind::Concat(parts) => {
                for part in parts {
                    self.walk(part, rng, out);
                }
            }
            HirKind::Alternation(branches) => {
                if !branches.is_empty() {
                    let idx = rng.gen_range(0..branches.len());
                    self.walk(&branches[idx], rng, out);
                }
            }
        }
    }
}

fn pick_unicode<R: Rng + ?Sized>(ranges: &[ClassUnicodeRange], rng: &mut R) -> Option<char> {
    let spans: Vec<(u32, u32)> = ranges
        .iter()
        .map(|range| (u32::from(range.start()), u32::from(range.end())))
        .collect();
    let (value, fallback) = pick_span(&prefer_printable(spans), rng)?;
    char::from_u32(value).or_else(|| char::from_u32(fallback))
}

fn pick_byte<R: Rng + ?Sized>(ranges: &[ClassBytesRange], rng: &mut R) -> Option<char> {
    let spans: Vec<(u32, u32)> = ranges
        .iter()
        .map(|range| (u32::from(range.start()), u32::from(range.end())))
        .collect();
    let (value, _) = pick_span(&prefer_printable(spans), rng)?;
    u8::try_from(value).ok().map(char::from)
}

/// Narrow the spans to printable ASCII if any of them overlap it
fn prefer_printable(spans: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
    let printable: Vec<(u32, u32)> = spans
        .iter()
        .filter_map(|&(lo, hi)| {
            let lo = lo.max(PRINTABLE.0);
            let hi = hi.min(PRINTABLE.1);
            (lo <= hi).then_some((lo, hi))
        })
        .collect();
    if printable.is_empty() {
        spans
    } else {
        printable
    }
}

/// Pick a code point uniformly across all spans; also returns its span start
fn pick_span<R: Rng + ?Sized>(spans: &[(u32, u32)], rng: &mut R) -> Option<(u32, u32)> {
    let total: u64 = spans.iter().map(|&(lo, hi)| u64::from(hi - lo) + 1).sum();
    if total == 0 {
        return None;
    }
    let mut n = rng.gen_range(0..total);
    for &(lo, hi) in spans {
        let size = u64::from(hi - lo) + 1;
        if n < size {
            // n < size <= u32 range, so the cast is lossless
            return Some((lo + n as u32, lo));
        }
        n -= size;
    }
    None
}

/// Rewrite the XSD-only escapes `\i`, `\I`, `\c`, `\C` as character classes
pub fn translate_xsd_escapes(pattern: &str) -> Cow<'_, str> {
    if !pattern.contains('\\') {
        return Cow::Borrowed(pattern);
    }
    let mut out = String::with_capacity(pattern.len() + 16);
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('i') => out.push_str("[_:A-Za-z]"),
            Some('I') => out.push_str("[^_:A-Za-z]"),
            Some('c') => out.push_str("[-._:A-Za-z0-9]"),
            Some('C') => out.push_str("[^-._:A-Za-z0-9]"),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use regex::Regex;

    fn check(pattern: &str) {
        let generator = PatternGenerator::new(pattern, 10).unwrap();
        let anchored = Regex::new(&format!("^(?:{})$", pattern)).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let value = generator.generate(&mut rng);
            assert!(anchored.is_match(&value), "{value:?} does not match {pattern}");
        }
    }

    #[test]
    fn test_fixed_repetition() {
        check("[A-Z]{3}");
    }

    #[test]
    fn test_iso_identifier_patterns() {
        check("[A-Z]{6,6}[A-Z2-9][A-NP-Z0-9]([A-Z0-9]{3,3}){0,1}");
        check("[A-Z]{2,2}[0-9]{2,2}[a-zA-Z0-9]{1,30}");
        check("\\+[0-9]{1,3}-[0-9()+\\-]{1,30}");
    }

    #[test]
    fn test_alternation_and_unbounded() {
        check("(CRED|DEBT)");
        check("a+b*c?");
        check("\\d+(\\.\\d{1,2})?");
    }

    #[test]
    fn test_unbounded_repetition_is_capped() {
        let generator = PatternGenerator::new("x*", 10).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            assert!(generator.generate(&mut rng).len() <= 10);
        }
    }

    #[test]
    fn test_dot_prefers_printable() {
        let generator = PatternGenerator::new(".{20}", 10).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let value = generator.generate(&mut rng);
        assert_eq!(value.chars().count(), 20);
        assert!(value.chars().all(|c| (' '..='~').contains(&c)));
    }

    #[test]
    fn test_malformed_pattern_is_rejected() {
        assert!(PatternGenerator::new("[A-Z", 10).is_err());
    }

    #[test]
    fn test_translate_xsd_escapes() {
        assert_eq!(translate_xsd_escapes("[A-Z]{3}"), "[A-Z]{3}");
        assert_eq!(translate_xsd_escapes("\\i\\c*"), "[_:A-Za-z][-._:A-Za-z0-9]*");
        assert_eq!(translate_xsd_escapes("\\\\i"), "\\\\i");
        assert_eq!(translate_xsd_escapes("\\d"), "\\d");
        check(&translate_xsd_escapes("\\i\\c{0,5}"));
    }
}
