//! Sample value synthesis for simple types
//!
//! Produces one literal per simple type, chosen by the mapped JSON type:
//!
//! - `boolean` gives `true`
//! - `number` gives a fixed placeholder numeral; range facets are not honoured
//! - `string` gives a value matching the `pattern` facet, else the first
//!   `enum` value, else a hexadecimal string sized by the length facets
//! - anything else gives the base type name as a string placeholder
//!
//! Copyright (c) 2025 xsd2oas contributors
//! Licensed under the Apache-2.0 license

mod pattern;

pub use pattern::{translate_xsd_escapes, PatternGenerator};

use crate::error::{Error, Result};
use crate::graph::{Facets, SimpleType, TypeGraph};
use crate::typemap::{map_type_name, JsonType};
use rand::rngs::StdRng;
use rand::SeedableRng;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{trace, warn};

/// Placeholder used for every numeric sample
pub const NUMBER_PLACEHOLDER: i64 = 123_456;

/// Length range used when no length facet is declared
pub const DEFAULT_LENGTH: (usize, usize) = (1, 10);

/// Hard ceiling on synthesized string length
pub const MAX_SAMPLE_LENGTH: usize = 1000;

/// Extra iterations allowed for unbounded pattern repetitions
pub const DEFAULT_REPEAT_LIMIT: u32 = 10;

struct CompiledPattern {
    generator: PatternGenerator,
    verifier: Regex,
}

/// Synthesizer of sample values, owning its random source
pub struct Synthesizer {
    rng: StdRng,
    repeat_limit: u32,
    patterns: HashMap<String, CompiledPattern>,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synthesizer {
    /// Create a synthesizer seeded from system entropy
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create a synthesizer with reproducible output
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            repeat_limit: DEFAULT_REPEAT_LIMIT,
            patterns: HashMap::new(),
        }
    }

    /// Override the cap on unbounded repetitions
    pub fn with_repeat_limit(mut self, repeat_limit: u32) -> Self {
        self.repeat_limit = repeat_limit;
        self.patterns.clear();
        self
    }

    /// Produce one value satisfying the facets of `simple`
    pub fn sample(&mut self, graph: &TypeGraph, simple: &SimpleType) -> Result<Value> {
        let base = graph.builtin_base(simple);
        match map_type_name(base).json_type {
            JsonType::Boolean => Ok(Value::Bool(true)),
            JsonType::Number => Ok(Value::from(NUMBER_PLACEHOLDER)),
            JsonType::String => self
                .sample_string(&simple.name, &simple.facets)
                .map(Value::String),
            JsonType::Passthrough(name) => {
                warn!(type_name = %simple.name, base = %name, "No sample policy for base type, using its name");
                Ok(Value::String(name.to_string()))
            }
        }
    }

    /// Produce one string satisfying `facets`
    pub fn sample_string(&mut self, type_name: &str, facets: &Facets) -> Result<String> {
        if let Some(pattern) = &facets.pattern {
            return self.sample_pattern(type_name, pattern);
        }
        if let Some(first) = facets.enumeration.first() {
            return Ok(first.clone());
        }
        let (min, max) = length_bounds(facets);
        self.sample_pattern(type_name, &format!("[0-9A-Fa-f]{{{},{}}}", min, max))
    }

    fn sample_pattern(&mut self, type_name: &str, pattern: &str) -> Result<String> {
        if !self.patterns.contains_key(pattern) {
            let compiled = self.compile(type_name, pattern)?;
            self.patterns.insert(pattern.to_string(), compiled);
        }
        let Self { rng, patterns, .. } = self;
        let compiled = &patterns[pattern];

        let value = compiled.generator.generate(rng);
        if !compiled.verifier.is_match(&value) {
            return Err(Error::SampleGeneration {
                type_name: type_name.to_string(),
                message: format!("generated {:?} does not match pattern {}", value, pattern),
            });
        }
        trace!(type_name, pattern, value = %value, "Synthesized pattern sample");
        Ok(value)
    }

    fn compile(&self, type_name: &str, pattern: &str) -> Result<CompiledPattern> {
        let translated = translate_xsd_escapes(pattern);
        let verifier = Regex::new(&format!("^(?:{})$", translated)).map_err(|source| Error::Pattern {
            type_name: type_name.to_string(),
            pattern: pattern.to_string(),
            source,
        })?;
        let generator = PatternGenerator::new(&translated, self.repeat_limit).map_err(|e| {
            Error::SampleGeneration {
                type_name: type_name.to_string(),
                message: format!("cannot generate from pattern {}: {}", pattern, e),
            }
        })?;
        Ok(CompiledPattern { generator, verifier })
    }
}

/// Length range for an unpatterned string sample
///
/// `length` fixes both ends. Otherwise `minLength` (at least 1) and
/// `maxLength` apply, defaulting to [`DEFAULT_LENGTH`]. Both ends are capped
/// at [`MAX_SAMPLE_LENGTH`].
pub fn length_bounds(facets: &Facets) -> (usize, usize) {
    if let Some(length) = facets.length {
        let length = length.min(MAX_SAMPLE_LENGTH);
        return (length, length);
    }
    let min = facets.min_length.unwrap_or(DEFAULT_LENGTH.0).max(1);
    let max = facets
        .max_length
        .filter(|max| *max >= 1)
        .unwrap_or(DEFAULT_LENGTH.1)
        .max(min)
        .min(MAX_SAMPLE_LENGTH);
    (min.min(max), max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Facets, SimpleType, TypeGraph};
    use proptest::prelude::*;

    fn graph() -> TypeGraph {
        TypeGraph::new("Document")
    }

    fn string_type(facets: Facets) -> SimpleType {
        SimpleType::new("Text", "string").with_facets(facets)
    }

    #[test]
    fn test_boolean_and_number_placeholders() {
        let mut synth = Synthesizer::with_seed(1);
        let graph = graph();
        assert_eq!(
            synth.sample(&graph, &SimpleType::new("Flag", "boolean")).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            synth.sample(&graph, &SimpleType::new("Amt", "decimal")).unwrap(),
            Value::from(123456)
        );
    }

    #[test]
    fn test_pattern_wins_over_enum() {
        let mut synth = Synthesizer::with_seed(2);
        let facets = Facets {
            pattern: Some("[A-Z]{3}".to_string()),
            enumeration: vec!["abc".to_string()],
            ..Facets::default()
        };
        let value = synth.sample(&graph(), &string_type(facets)).unwrap();
        let value = value.as_str().unwrap();
        assert_eq!(value.len(), 3);
        assert!(value.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_enum_uses_first_value() {
        let mut synth = Synthesizer::with_seed(3);
        let facets = Facets {
            enumeration: vec!["CRED".to_string(), "DEBT".to_string()],
            ..Facets::default()
        };
        assert_eq!(
            synth.sample(&graph(), &string_type(facets)).unwrap(),
            Value::String("CRED".to_string())
        );
    }

    #[test]
    fn test_default_length_is_one_to_ten_hex() {
        let mut synth = Synthesizer::with_seed(4);
        for _ in 0..100 {
            let value = synth.sample_string("Text", &Facets::default()).unwrap();
            assert!((1..=10).contains(&value.len()), "{value}");
            assert!(value.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_length_is_clamped_to_engine_ceiling() {
        let mut synth = Synthesizer::with_seed(5);
        let facets = Facets {
            max_length: Some(5000),
            ..Facets::default()
        };
        for _ in 0..10 {
            assert!(synth.sample_string("Text", &facets).unwrap().len() <= MAX_SAMPLE_LENGTH);
        }
    }

    #[test]
    fn test_base_chain_decides_the_mapping() {
        let graph = TypeGraph::new("Document")
            .with_type(SimpleType::new("Rate", "BaseRate"))
            .with_type(SimpleType::new("BaseRate", "decimal"));
        let mut synth = Synthesizer::with_seed(6);
        let rate = graph.simple("Rate").unwrap();
        assert_eq!(synth.sample(&graph, rate).unwrap(), Value::from(NUMBER_PLACEHOLDER));
    }

    #[test]
    fn test_unknown_base_falls_back_to_its_name() {
        let mut synth = Synthesizer::with_seed(7);
        let value = synth
            .sample(&graph(), &SimpleType::new("Odd", "SomethingElse"))
            .unwrap();
        assert_eq!(value, Value::String("SomethingElse".to_string()));
    }

    #[test]
    fn test_malformed_pattern_is_fatal() {
        let mut synth = Synthesizer::with_seed(8);
        let facets = Facets {
            pattern: Some("[A-Z".to_string()),
            ..Facets::default()
        };
        let err = synth.sample(&graph(), &string_type(facets)).unwrap_err();
        assert!(matches!(err, Error::Pattern { ref type_name, .. } if type_name == "Text"));
    }

    #[test]
    fn test_repeat_limit_caps_open_repetitions() {
        let mut synth = Synthesizer::with_seed(9).with_repeat_limit(2);
        let facets = Facets {
            pattern: Some("x+".to_string()),
            ..Facets::default()
        };
        for _ in 0..50 {
            let value = synth.sample_string("T", &facets).unwrap();
            assert!((1..=3).contains(&value.len()), "{value}");
        }
    }

    #[test]
    fn test_same_seed_same_values() {
        let facets = Facets {
            pattern: Some("[a-z]{4,12}".to_string()),
            ..Facets::default()
        };
        let mut a = Synthesizer::with_seed(42);
        let mut b = Synthesizer::with_seed(42);
        for _ in 0..5 {
            assert_eq!(
                a.sample_string("T", &facets).unwrap(),
                b.sample_string("T", &facets).unwrap()
            );
        }
    }

    proptest! {
        #[test]
        fn prop_length_bounds_are_ordered_and_capped(
            min in proptest::option::of(0usize..3000),
            max in proptest::option::of(0usize..6000),
        ) {
            let facets = Facets { min_length: min, max_length: max, ..Facets::default() };
            let (lo, hi) = length_bounds(&facets);
            prop_assert!(lo <= hi);
            prop_assert!(hi <= MAX_SAMPLE_LENGTH);
            prop_assert!(lo >= 1);
        }

        #[test]
        fn prop_samples_respect_declared_lengths(
            min in 1usize..40,
            extra in 0usize..40,
            seed in any::<u64>(),
        ) {
            let facets = Facets {
                min_length: Some(min),
                max_length: Some(min + extra),
                ..Facets::default()
            };
            let mut synth = Synthesizer::with_seed(seed);
            let value = synth.sample_string("Text", &facets).unwrap();
            prop_assert!(value.len() >= min && value.len() <= min + extra);
        }
    }
}
