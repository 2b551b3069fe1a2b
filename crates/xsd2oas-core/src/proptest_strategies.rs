//! Property-based testing strategies for generating test data
//!
//! This module provides proptest strategies for generating random but
//! well-formed type graphs, including recursive ones, for property testing
//! of the tagger and both emitters.

#![cfg(test)]

use crate::graph::{
    Attribute, ComplexType, Compositor, Element, Facets, MaxOccurs, SimpleType, TypeGraph,
};
use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;

/// Patterns the synthesizer must always satisfy
const PATTERNS: &[&str] = &[
    "[A-Z]{3}",
    "[A-Z]{6,6}[A-Z2-9][A-NP-Z0-9]([A-Z0-9]{3,3}){0,1}",
    "[0-9]{1,15}",
    "(CRED|DEBT)",
    "[a-z]+-[0-9]*",
];

const BASES: &[&str] = &["string", "token", "decimal", "int", "boolean", "date"];

/// Strategy for generating string facets
pub fn facets_strategy() -> impl Strategy<Value = Facets> {
    (
        option::of(0usize..20),
        option::of(0usize..200),
        option::of(prop::sample::select(PATTERNS)),
        vec("[A-Z]{2,6}", 0..4),
    )
        .prop_map(|(min_length, max_length, pattern, enumeration)| Facets {
            min_length,
            max_length,
            pattern: pattern.map(str::to_string),
            enumeration,
            ..Facets::default()
        })
}

/// Strategy for generating a simple type with the given name
pub fn simple_type_strategy(name: String) -> impl Strategy<Value = SimpleType> {
    (prop::sample::select(BASES), facets_strategy(), any::<bool>()).prop_map(
        move |(base, facets, with_attribute)| {
            let simple = SimpleType::new(name.clone(), base).with_facets(facets);
            if with_attribute {
                simple.with_attribute(Attribute::new("Ccy", "S0").required())
            } else {
                simple
            }
        },
    )
}

/// Strategy for element cardinality
pub fn occurs_strategy() -> impl Strategy<Value = (u32, MaxOccurs)> {
    prop_oneof![
        Just((1, MaxOccurs::Bounded(1))),
        Just((0, MaxOccurs::Bounded(1))),
        Just((1, MaxOccurs::Unbounded)),
        Just((0, MaxOccurs::Bounded(5))),
    ]
}

/// Strategy for generating type graphs rooted at `T0`
///
/// Complex types `T0..Tn` refer to each other freely, so cycles are common.
/// Simple types `S0..Sm` are leaves; `S0` is a plain string so it can serve
/// as an attribute type.
pub fn type_graph_strategy() -> impl Strategy<Value = TypeGraph> {
    (1usize..6, 1usize..5).prop_flat_map(|(complex_count, simple_count)| {
        let simples: Vec<_> = (1..simple_count)
            .map(|index| simple_type_strategy(format!("S{}", index)))
            .collect();
        let complexes = vec(
            (
                prop_oneof![Just(Compositor::Sequence), Just(Compositor::Choice)],
                vec(
                    (any::<bool>(), 0..complex_count.max(simple_count), occurs_strategy()),
                    0..5,
                ),
            ),
            complex_count,
        );
        (simples, complexes).prop_map(move |(simples, complexes)| {
            let mut graph = TypeGraph::new("T0").with_type(SimpleType::new("S0", "string"));
            for simple in simples {
                graph.insert(simple);
            }
            for (index, (compositor, elements)) in complexes.into_iter().enumerate() {
                let mut complex = ComplexType::new(format!("T{}", index), compositor);
                for (position, (to_complex, target, (min, max))) in elements.into_iter().enumerate() {
                    let type_name = if to_complex {
                        format!("T{}", target % complex_count)
                    } else {
                        format!("S{}", target % simple_count)
                    };
                    complex.elements.push(
                        Element::new(format!("E{}", position), type_name).with_occurs(min, max),
                    );
                }
                graph.insert(complex);
            }
            graph
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example::{ExampleConfig, ExampleEmitter};
    use crate::openapi::{EmitterConfig, SchemaEmitter};
    use crate::sample::Synthesizer;
    use crate::tagger::tag;
    use std::collections::BTreeSet;

    fn refs(value: &serde_yaml::Value, out: &mut BTreeSet<String>) {
        match value {
            serde_yaml::Value::Mapping(map) => {
                for (key, child) in map {
                    if key.as_str() == Some("$ref") {
                        if let Some(target) = child.as_str() {
                            out.insert(target.trim_start_matches("#/components/schemas/").to_string());
                        }
                    }
                    refs(child, out);
                }
            }
            serde_yaml::Value::Sequence(items) => items.iter().for_each(|item| refs(item, out)),
            _ => {}
        }
    }

    proptest! {
        #[test]
        fn test_generated_graphs_validate(graph in type_graph_strategy()) {
            prop_assert!(graph.validate().is_ok());
        }

        #[test]
        fn test_no_mask_includes_every_reachable_element(graph in type_graph_strategy()) {
            let tagging = tag(&graph, None, false).unwrap();
            for name in tagging.inclusion.type_names() {
                if let Some(complex) = graph.complex(name) {
                    for index in 0..complex.elements.len() {
                        prop_assert!(tagging.inclusion.includes_element(name, index));
                    }
                }
            }
        }

        #[test]
        fn test_every_ref_names_an_emitted_schema(graph in type_graph_strategy()) {
            let tagging = tag(&graph, None, false).unwrap();
            let config = EmitterConfig::new("prop");
            let yaml = SchemaEmitter::new(&graph, &tagging.inclusion, &config).render().unwrap();
            let document: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

            let mut targets = BTreeSet::new();
            refs(&document, &mut targets);
            let schemas = document["components"]["schemas"].as_mapping().unwrap();
            for target in targets {
                prop_assert!(
                    schemas.contains_key(serde_yaml::Value::String(target.clone())),
                    "dangling $ref to {}", target
                );
            }
        }

        #[test]
        fn test_emission_is_deterministic(graph in type_graph_strategy()) {
            let config = EmitterConfig::new("prop");
            let first = tag(&graph, None, false).unwrap();
            let second = tag(&graph, None, false).unwrap();
            let a = SchemaEmitter::new(&graph, &first.inclusion, &config).render().unwrap();
            let b = SchemaEmitter::new(&graph, &second.inclusion, &config).render().unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn test_example_always_builds(graph in type_graph_strategy(), seed in any::<u64>()) {
            let tagging = tag(&graph, None, false).unwrap();
            let config = ExampleConfig::default();
            let mut synth = Synthesizer::with_seed(seed);
            let document = ExampleEmitter::new(&graph, Some(&tagging.inclusion), &config)
                .build(&mut synth);
            prop_assert!(document.is_ok());
        }
    }
}
