//! Sample JSON document emission
//!
//! Walks the graph from the root the same way the schema emitter does and
//! fills every leaf with a value from the [`Synthesizer`], so the result is
//! one instance of the request body schema.

use crate::error::{Error, Result};
use crate::graph::{Attribute, ComplexType, Element, SimpleType, TypeDef, TypeGraph};
use crate::naming::property_name;
use crate::sample::Synthesizer;
use crate::tagger::Inclusion;
use serde_json::{Map, Value};
use std::io::Write;
use tracing::{debug, instrument, warn};

/// Nesting limit for complex types in the example
pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleConfig {
    /// Deepest complex-type nesting rendered; deeper elements are omitted
    pub max_depth: usize,
    pub fixup: bool,
}

impl Default for ExampleConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            fixup: false,
        }
    }
}

/// Emitter of one sample document
pub struct ExampleEmitter<'a> {
    graph: &'a TypeGraph,
    /// Restrict output to included elements; `None` renders everything
    inclusion: Option<&'a Inclusion>,
    config: &'a ExampleConfig,
}

impl<'a> ExampleEmitter<'a> {
    pub fn new(
        graph: &'a TypeGraph,
        inclusion: Option<&'a Inclusion>,
        config: &'a ExampleConfig,
    ) -> Self {
        Self {
            graph,
            inclusion,
            config,
        }
    }

    /// Build the sample document
    #[instrument(skip_all, fields(root = %self.graph.root_name(), full_graph = self.inclusion.is_none()))]
    pub fn build(&self, synth: &mut Synthesizer) -> Result<Value> {
        let root = self.graph.root()?;
        let mut active = vec![root.name.as_str()];
        let document = self.complex_value(root, synth, &mut active, "")?;
        debug!("Example document built");
        Ok(document)
    }

    /// Build the sample document and write it as pretty-printed JSON
    pub fn emit<W: Write>(&self, synth: &mut Synthesizer, mut sink: W) -> Result<()> {
        let document = self.build(synth)?;
        serde_json::to_writer_pretty(&mut sink, &document).map_err(|source| Error::Json {
            message: "failed to write example document".to_string(),
            source,
        })?;
        writeln!(sink)
            .and_then(|()| sink.flush())
            .map_err(|source| Error::io("failed to write example document", source))
    }

    /// Tagged output follows the expanded paths; the full graph takes everything
    fn includes(&self, owner: &str, index: usize, path: &str) -> bool {
        self.inclusion.map_or(true, |inclusion| {
            inclusion.includes_element(owner, index) && inclusion.includes_path(path)
        })
    }

    fn complex_value(
        &self,
        complex: &'a ComplexType,
        synth: &mut Synthesizer,
        active: &mut Vec<&'a str>,
        path: &str,
    ) -> Result<Value> {
        if let Some(simple) = &complex.simple_base {
            let attributes: Vec<&Attribute> = complex.all_attributes().collect();
            return self.simple_value(simple, &attributes, synth);
        }

        let mut object = Map::new();
        for attribute in &complex.attributes {
            let value = self.attribute_value(attribute, &complex.name, synth)?;
            object.insert(format!("@{}", attribute.name), value);
        }

        for (index, element) in complex.elements.iter().enumerate() {
            let element_path = format!("{}/{}", path, element.name);
            if !self.includes(&complex.name, index, &element_path) {
                if self.inclusion.is_some() && !element.is_optional() && !complex.is_choice() {
                    warn!(path = %element_path, "Omitting truncated recursive element from example");
                }
                continue;
            }
            let Some(value) = self.element_value(complex, element, synth, active, &element_path)?
            else {
                continue;
            };
            let value = if element.max_occurs.is_many() {
                Value::Array(vec![value])
            } else {
                value
            };
            object.insert(
                property_name(&element.name, self.config.fixup).into_owned(),
                value,
            );
            if complex.is_choice() {
                break;
            }
        }
        Ok(Value::Object(object))
    }

    /// Value of one element, or `None` when recursion limits omit it
    fn element_value(
        &self,
        parent: &ComplexType,
        element: &Element,
        synth: &mut Synthesizer,
        active: &mut Vec<&'a str>,
        path: &str,
    ) -> Result<Option<Value>> {
        let def = self.graph.resolve(&element.type_name, || {
            format!("element '{}' of '{}'", element.name, parent.name)
        })?;
        match def {
            TypeDef::Complex(child) => {
                // Tagged paths already bound recursion
                if self.inclusion.is_none() && active.contains(&child.name.as_str()) {
                    warn!(path, type_name = %child.name, "Omitting recursive element from example");
                    return Ok(None);
                }
                if active.len() >= self.config.max_depth {
                    warn!(path, max_depth = self.config.max_depth, "Omitting element nested too deeply for example");
                    return Ok(None);
                }
                active.push(&child.name);
                let value = self.complex_value(child, synth, active, path);
                active.pop();
                value.map(Some)
            }
            TypeDef::Simple(simple) => {
                let attributes: Vec<&Attribute> = simple.attributes.iter().collect();
                self.simple_value(simple, &attributes, synth).map(Some)
            }
        }
    }

    /// A scalar, or `value` plus one `@name` per attribute
    fn simple_value(
        &self,
        simple: &SimpleType,
        attributes: &[&Attribute],
        synth: &mut Synthesizer,
    ) -> Result<Value> {
        let value = synth.sample(self.graph, simple)?;
        if attributes.is_empty() {
            return Ok(value);
        }
        let mut object = Map::new();
        object.insert("value".to_string(), value);
        for attribute in attributes {
            let value = self.attribute_value(attribute, &simple.name, synth)?;
            object.insert(format!("@{}", attribute.name), value);
        }
        Ok(Value::Object(object))
    }

    fn attribute_value(
        &self,
        attribute: &Attribute,
        owner: &str,
        synth: &mut Synthesizer,
    ) -> Result<Value> {
        let referenced_by = || format!("attribute '{}' of '{}'", attribute.name, owner);
        let simple = self
            .graph
            .resolve(&attribute.type_name, referenced_by)?
            .as_simple()
            .ok_or_else(|| Error::UndefinedType {
                name: attribute.type_name.clone(),
                referenced_by: referenced_by(),
            })?;
        synth.sample(self.graph, simple)
    }
}

/// Write one sample document for `graph`
pub fn emit_example<W: Write>(
    graph: &TypeGraph,
    inclusion: Option<&Inclusion>,
    config: &ExampleConfig,
    synth: &mut Synthesizer,
    sink: W,
) -> Result<()> {
    ExampleEmitter::new(graph, inclusion, config).emit(synth, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Facets, MaxOccurs};
    use crate::mask::Mask;
    use crate::tagger::tag;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn payment_graph() -> TypeGraph {
        TypeGraph::new("Document")
            .with_type(
                ComplexType::sequence("Document")
                    .with_element(Element::new("Body", "Body"))
                    .with_element(Element::new("Note", "Note").optional()),
            )
            .with_type(
                ComplexType::sequence("Body")
                    .with_element(Element::new("Amt", "Amount"))
                    .with_element(Element::new("Flag", "Flag").with_occurs(1, MaxOccurs::Bounded(3))),
            )
            .with_type(
                SimpleType::new("Amount", "decimal")
                    .with_attribute(Attribute::new("Ccy", "Ccy").required()),
            )
            .with_type(SimpleType::new("Ccy", "string").with_facets(Facets {
                enumeration: vec!["EUR".to_string()],
                ..Facets::default()
            }))
            .with_type(SimpleType::new("Flag", "boolean"))
            .with_type(SimpleType::new("Note", "string").with_facets(Facets {
                enumeration: vec!["hello".to_string()],
                ..Facets::default()
            }))
    }

    fn build(graph: &TypeGraph, inclusion: Option<&Inclusion>, config: &ExampleConfig) -> Value {
        let mut synth = Synthesizer::with_seed(11);
        ExampleEmitter::new(graph, inclusion, config)
            .build(&mut synth)
            .unwrap()
    }

    #[test]
    fn test_full_graph_document() {
        let graph = payment_graph();
        let document = build(&graph, None, &ExampleConfig::default());
        assert_eq!(
            document,
            json!({
                "Body": {
                    "Amt": {"value": 123456, "@Ccy": "EUR"},
                    "Flag": [true]
                },
                "Note": "hello"
            })
        );
    }

    #[test]
    fn test_property_order_follows_declaration() {
        let graph = payment_graph();
        let document = build(&graph, None, &ExampleConfig::default());
        let keys: Vec<&String> = document["Body"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["Amt", "Flag"]);
    }

    #[test]
    fn test_inclusion_prunes_elements() {
        let graph = payment_graph();
        let tagging = tag(&graph, Some(&Mask::parse("/Body/Amt")), false).unwrap();
        let document = build(&graph, Some(&tagging.inclusion), &ExampleConfig::default());
        assert!(document.get("Note").is_none());
        assert_eq!(document["Body"]["Flag"], json!([true]));
    }

    #[test]
    fn test_choice_renders_first_branch_only() {
        let graph = TypeGraph::new("Document")
            .with_type(ComplexType::sequence("Document").with_element(Element::new("Pty", "Party")))
            .with_type(
                ComplexType::choice("Party")
                    .with_element(Element::new("Nm", "Flag"))
                    .with_element(Element::new("Id", "Flag")),
            )
            .with_type(SimpleType::new("Flag", "boolean"));
        let document = build(&graph, None, &ExampleConfig::default());
        assert_eq!(document, json!({"Pty": {"Nm": true}}));

        let tagging = tag(&graph, Some(&Mask::parse("/Pty/Id")), false).unwrap();
        let document = build(&graph, Some(&tagging.inclusion), &ExampleConfig::default());
        assert_eq!(document, json!({"Pty": {"Id": true}}));
    }

    #[test]
    fn test_recursion_is_cut() {
        let graph = TypeGraph::new("Document")
            .with_type(ComplexType::sequence("Document").with_element(Element::new("Pty", "Party")))
            .with_type(
                ComplexType::sequence("Party")
                    .with_element(Element::new("Flag", "Flag"))
                    .with_element(Element::new("Parent", "Party").optional()),
            )
            .with_type(SimpleType::new("Flag", "boolean"));
        let document = build(&graph, None, &ExampleConfig::default());
        assert_eq!(document, json!({"Pty": {"Flag": true}}));
    }

    #[test]
    fn test_recursion_follows_masked_paths() {
        let graph = TypeGraph::new("Document")
            .with_type(ComplexType::sequence("Document").with_element(Element::new("Pty", "Party")))
            .with_type(
                ComplexType::sequence("Party")
                    .with_element(Element::new("Nm", "Flag").optional())
                    .with_element(Element::new("Parent", "Party").optional()),
            )
            .with_type(SimpleType::new("Flag", "boolean"));
        let tagging = tag(&graph, Some(&Mask::parse("/Pty/Parent/Nm")), false).unwrap();
        assert_eq!(tagging.leaf_paths().collect::<Vec<_>>(), vec!["/Pty/Parent/Nm"]);

        let document = build(&graph, Some(&tagging.inclusion), &ExampleConfig::default());
        assert_eq!(document, json!({"Pty": {"Parent": {"Nm": true}}}));
    }

    #[test]
    fn test_truncated_paths_are_omitted_from_tagged_example() {
        let graph = TypeGraph::new("Document")
            .with_type(ComplexType::sequence("Document").with_element(Element::new("Pty", "Party")))
            .with_type(
                ComplexType::sequence("Party")
                    .with_element(Element::new("Flag", "Flag"))
                    .with_element(Element::new("Parent", "Party").optional()),
            )
            .with_type(SimpleType::new("Flag", "boolean"));
        let tagging = tag(&graph, None, false).unwrap();
        let document = build(&graph, Some(&tagging.inclusion), &ExampleConfig::default());
        assert_eq!(document, json!({"Pty": {"Flag": true}}));
    }

    #[test]
    fn test_depth_limit() {
        let graph = payment_graph();
        let config = ExampleConfig {
            max_depth: 1,
            ..ExampleConfig::default()
        };
        let document = build(&graph, None, &config);
        assert_eq!(document, json!({"Note": "hello"}));
    }

    #[test]
    fn test_simple_content_and_complex_attributes() {
        let graph = TypeGraph::new("Document")
            .with_type(
                ComplexType::sequence("Document")
                    .with_attribute(Attribute::new("Vrsn", "Flag"))
                    .with_element(Element::new("Amount", "Amt")),
            )
            .with_type(
                ComplexType::sequence("Amt").with_simple_base(
                    SimpleType::new("Amt", "decimal")
                        .with_attribute(Attribute::new("Ccy", "Flag").required()),
                ),
            )
            .with_type(SimpleType::new("Flag", "boolean"));
        let config = ExampleConfig {
            fixup: true,
            ..ExampleConfig::default()
        };
        let document = build(&graph, None, &config);
        assert_eq!(
            document,
            json!({"@Vrsn": true, "amount": {"value": 123456, "@Ccy": true}})
        );
        let keys: Vec<&String> = document.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["@Vrsn", "amount"]);
    }

    #[test]
    fn test_emit_writes_pretty_json() {
        let graph = TypeGraph::new("Document")
            .with_type(ComplexType::sequence("Document").with_element(Element::new("Flag", "Flag")))
            .with_type(SimpleType::new("Flag", "boolean"));
        let mut out = Vec::new();
        let mut synth = Synthesizer::with_seed(1);
        emit_example(&graph, None, &ExampleConfig::default(), &mut synth, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\n  \"Flag\": true\n}\n");
    }

    #[test]
    fn test_pattern_error_aborts() {
        let graph = TypeGraph::new("Document")
            .with_type(ComplexType::sequence("Document").with_element(Element::new("Cd", "Code")))
            .with_type(SimpleType::new("Code", "string").with_facets(Facets {
                pattern: Some("(".to_string()),
                ..Facets::default()
            }));
        let mut synth = Synthesizer::with_seed(1);
        let err = ExampleEmitter::new(&graph, None, &ExampleConfig::default())
            .build(&mut synth)
            .unwrap_err();
        assert!(matches!(err, Error::Pattern { .. }));
    }
}
