//! OpenAPI 3.0 schema emission
//!
//! Renders a tagged type graph as an OpenAPI document: a fixed header with
//! one `PUT` operation taking the root type as its JSON body, followed by one
//! component schema per included type in lexicographic order. Facets that
//! JSON Schema cannot enforce are kept as YAML comments.
//!
//! Copyright (c) 2025 xsd2oas contributors
//! Licensed under the Apache-2.0 license

mod writer;


pub use writer::{flow_list, is_numeric, quoted_pattern, single_quoted, YamlWriter, TAB};

use crate::error::Result;
use crate::graph::{Attribute, ComplexType, Element, SimpleType, TypeDef, TypeGraph};
use crate::naming::property_name;
use crate::tagger::Inclusion;
use crate::typemap::{map_type_name, JsonType};
use std::io::Write;
use tracing::{debug, instrument, trace};
use writer::schema_ref;

/// Server URL used when none is configured
pub const DEFAULT_SERVER_URL: &str = "https://example.com";

/// Fixed responses of the generated operation
const RESPONSES: &[(&str, &str)] = &[
    ("200", "Happy path"),
    ("400", "Bad request (body describes why)"),
    ("410", "Unauthorised"),
    ("504", "Gateway timeout (server did not respond)"),
    ("5XX", "Server Error"),
];

/// Settings for the document envelope and property naming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitterConfig {
    /// `info.title`, also the default operation path
    pub title: String,
    pub server_url: String,
    /// Operation path; `/<title>` when unset
    pub path: Option<String>,
    /// Lowercase the first letter of capitalized element names
    pub fixup: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            title: "api".to_string(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            path: None,
            fixup: false,
        }
    }
}

impl EmitterConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_fixup(mut self, fixup: bool) -> Self {
        self.fixup = fixup;
        self
    }

    /// The operation path
    pub fn operation_path(&self) -> String {
        self.path
            .clone()
            .unwrap_or_else(|| format!("/{}", self.title))
    }
}

/// Emitter of the OpenAPI document for one tagged graph
pub struct SchemaEmitter<'a> {
    graph: &'a TypeGraph,
    inclusion: &'a Inclusion,
    config: &'a EmitterConfig,
}

impl<'a> SchemaEmitter<'a> {
    pub fn new(graph: &'a TypeGraph, inclusion: &'a Inclusion, config: &'a EmitterConfig) -> Self {
        Self {
            graph,
            inclusion,
            config,
        }
    }

    /// Write the whole document to `sink`
    #[instrument(skip_all, fields(title = %self.config.title, types = self.inclusion.type_count()))]
    pub fn emit<W: Write>(&self, sink: W) -> Result<()> {
        let root = self.graph.root()?;
        let mut out = YamlWriter::new(sink);
        self.write_header(&mut out, &root.name)?;
        self.write_components(&mut out)?;
        out.flush()?;
        debug!("OpenAPI document written");
        Ok(())
    }

    /// Render the document into a string
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.emit(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    fn write_header<W: Write>(&self, out: &mut YamlWriter<W>, root: &str) -> Result<()> {
        out.line(0, "openapi: 3.0.0")?;
        out.line(0, "info:")?;
        out.line(TAB, format_args!("title: {}", single_quoted(&self.config.title)))?;
        out.line(TAB, "version: '0.1'")?;
        out.blank()?;

        out.line(0, "servers:")?;
        out.line(TAB, format_args!("- url: {}", single_quoted(&self.config.server_url)))?;
        out.blank()?;

        out.line(0, "paths:")?;
        out.line(TAB, format_args!("{}:", single_quoted(&self.config.operation_path())))?;
        out.line(2 * TAB, "put:")?;
        out.line(3 * TAB, "requestBody:")?;
        out.line(4 * TAB, "content:")?;
        out.line(5 * TAB, "application/json:")?;
        out.line(6 * TAB, "schema:")?;
        out.line(7 * TAB, format_args!("$ref: {}", schema_ref(root)))?;
        out.line(3 * TAB, "responses:")?;
        for (code, description) in RESPONSES {
            out.line(4 * TAB, format_args!("'{}':", code))?;
            out.line(5 * TAB, format_args!("description: {}", description))?;
        }
        out.blank()
    }

    fn write_components<W: Write>(&self, out: &mut YamlWriter<W>) -> Result<()> {
        out.comment(0, "---Component definitions---")?;
        out.line(0, "components:")?;
        out.line(TAB, "schemas:")?;
        out.blank()?;

        for name in self.inclusion.type_names() {
            let def = self
                .graph
                .resolve(name, || "the inclusion set".to_string())?;
            trace!(type_name = name, "Writing schema");
            out.line(2 * TAB, format_args!("{}:", name))?;
            match def {
                TypeDef::Complex(complex) => self.write_complex(out, complex, 3 * TAB)?,
                TypeDef::Simple(simple) => {
                    let attributes: Vec<&Attribute> = simple.attributes.iter().collect();
                    self.write_simple_body(out, simple, &attributes, 3 * TAB)?
                }
            }
        }
        Ok(())
    }

    fn write_complex<W: Write>(
        &self,
        out: &mut YamlWriter<W>,
        complex: &ComplexType,
        indent: usize,
    ) -> Result<()> {
        if let Some(simple) = &complex.simple_base {
            let attributes: Vec<&Attribute> = complex.all_attributes().collect();
            return self.write_simple_body(out, simple, &attributes, indent);
        }

        let elements: Vec<&Element> = complex
            .elements
            .iter()
            .enumerate()
            .filter(|(index, _)| self.inclusion.includes_element(&complex.name, *index))
            .map(|(_, element)| element)
            .collect();

        out.line(indent, "type: object")?;
        if !complex.attributes.is_empty() || !elements.is_empty() {
            out.line(indent, "properties:")?;
            for attribute in &complex.attributes {
                self.write_attribute(out, attribute, indent + TAB)?;
            }
            for element in &elements {
                self.write_element(out, element, indent + TAB)?;
            }
        }

        let mut required: Vec<String> = complex
            .attributes
            .iter()
            .filter(|attribute| attribute.required)
            .map(|attribute| single_quoted(&format!("@{}", attribute.name)))
            .collect();

        if complex.is_choice() {
            if !elements.is_empty() {
                out.line(indent, "oneOf:")?;
                for element in &elements {
                    let name = property_name(&element.name, self.config.fixup);
                    out.line(
                        indent + TAB,
                        format_args!("- required: {}", flow_list([single_quoted(&name)])),
                    )?;
                }
            }
        } else {
            required.extend(
                elements
                    .iter()
                    .filter(|element| !element.is_optional())
                    .map(|element| single_quoted(&property_name(&element.name, self.config.fixup))),
            );
        }
        if !required.is_empty() {
            out.line(indent, format_args!("required: {}", flow_list(&required)))?;
        }

        if complex.any {
            out.comment(indent, "XSD allows 'any', so properties not restricted")
        } else {
            out.line(indent, "additionalProperties: false")
        }
    }

    fn write_element<W: Write>(
        &self,
        out: &mut YamlWriter<W>,
        element: &Element,
        indent: usize,
    ) -> Result<()> {
        out.line(
            indent,
            format_args!("{}:", property_name(&element.name, self.config.fixup)),
        )?;
        if element.max_occurs.is_many() {
            out.line(indent + TAB, "type: array")?;
            out.line(indent + TAB, "items:")?;
            out.line(
                indent + 2 * TAB,
                format_args!("$ref: {}", schema_ref(&element.type_name)),
            )
        } else {
            out.line(indent + TAB, format_args!("$ref: {}", schema_ref(&element.type_name)))
        }
    }

    /// A simple type, or an object of `value` plus attributes when it has any
    fn write_simple_body<W: Write>(
        &self,
        out: &mut YamlWriter<W>,
        simple: &SimpleType,
        attributes: &[&Attribute],
        indent: usize,
    ) -> Result<()> {
        if attributes.is_empty() {
            return self.write_simple_properties(out, simple, indent);
        }

        out.line(indent, "type: object")?;
        out.line(indent, "properties:")?;
        out.line(indent + TAB, "\"value\":")?;
        self.write_simple_properties(out, simple, indent + 2 * TAB)?;

        let mut required = vec![single_quoted("value")];
        for attribute in attributes {
            self.write_attribute(out, attribute, indent + TAB)?;
            if attribute.required {
                required.push(single_quoted(&format!("@{}", attribute.name)));
            }
        }
        out.line(indent, format_args!("required: {}", flow_list(&required)))?;
        out.line(indent, "additionalProperties: false")
    }

    fn write_attribute<W: Write>(
        &self,
        out: &mut YamlWriter<W>,
        attribute: &Attribute,
        indent: usize,
    ) -> Result<()> {
        out.line(
            indent,
            format_args!("{}:", single_quoted(&format!("@{}", attribute.name))),
        )?;
        out.line(indent + TAB, format_args!("$ref: {}", schema_ref(&attribute.type_name)))?;
        if let Some(default) = &attribute.default {
            out.line(indent + TAB, format_args!("default: {}", single_quoted(default)))?;
        }
        if let Some(fixed) = &attribute.fixed {
            out.comment(indent + TAB, format_args!("XML specified fixed value {}", fixed))?;
        }
        Ok(())
    }

    fn write_simple_properties<W: Write>(
        &self,
        out: &mut YamlWriter<W>,
        simple: &SimpleType,
        indent: usize,
    ) -> Result<()> {
        let base = self.graph.builtin_base(simple);
        let mapping = map_type_name(base);
        out.line(indent, format_args!("type: {}", mapping.json_type))?;
        if mapping.lossy {
            out.comment(indent, format_args!("XML datatype was {}", base))?;
        }

        let facets = &simple.facets;
        match facets.length {
            Some(length) => {
                out.line(indent, format_args!("minLength: {}", length))?;
                out.line(indent, format_args!("maxLength: {}", length))?;
            }
            None => {
                if let Some(min) = facets.min_length {
                    out.line(indent, format_args!("minLength: {}", min))?;
                }
                if let Some(max) = facets.max_length {
                    out.line(indent, format_args!("maxLength: {}", max))?;
                }
            }
        }

        if !facets.enumeration.is_empty() {
            let numeric = mapping.json_type == JsonType::Number;
            let values = facets.enumeration.iter().map(|value| {
                if numeric && is_numeric(value) {
                    value.trim().to_string()
                } else {
                    single_quoted(value)
                }
            });
            out.line(indent, format_args!("enum: {}", flow_list(values)))?;
        }

        if let Some(pattern) = &facets.pattern {
            out.line(indent, format_args!("pattern: {}", quoted_pattern(pattern)))?;
        }

        write_bound(
            out,
            indent,
            ("minimum", "exclusiveMinimum"),
            ("minInclusive", &facets.min_inclusive),
            ("minExclusive", &facets.min_exclusive),
        )?;
        write_bound(
            out,
            indent,
            ("maximum", "exclusiveMaximum"),
            ("maxInclusive", &facets.max_inclusive),
            ("maxExclusive", &facets.max_exclusive),
        )?;

        if let Some(digits) = facets.total_digits {
            out.comment(indent, format_args!("XML specified totalDigits={}", digits))?;
        }
        if let Some(digits) = facets.fraction_digits {
            out.comment(indent, format_args!("XML specified fractionDigits={}", digits))?;
        }
        if let Some(white_space) = &facets.white_space {
            out.comment(indent, format_args!("XML specified whiteSpace={}", white_space))?;
        }
        Ok(())
    }
}

/// One side of a numeric range in OpenAPI 3.0 form
///
/// An exclusive bound is `minimum`/`maximum` plus a boolean flag; when both
/// facets are given the exclusive one is kept. Non-numeric literals such as
/// dates survive only as comments.
fn write_bound<W: Write>(
    out: &mut YamlWriter<W>,
    indent: usize,
    (key, exclusive_key): (&str, &str),
    (inclusive_facet, inclusive): (&str, &Option<String>),
    (exclusive_facet, exclusive): (&str, &Option<String>),
) -> Result<()> {
    let numeric = |literal: &&String| is_numeric(literal);
    if let Some(literal) = exclusive.as_ref().filter(numeric) {
        out.line(indent, format_args!("{}: {}", key, literal.trim()))?;
        out.line(indent, format_args!("{}: true", exclusive_key))?;
        if let Some(literal) = inclusive {
            out.comment(indent, format_args!("XML specified {}={}", inclusive_facet, literal))?;
        }
        return Ok(());
    }
    if let Some(literal) = exclusive {
        out.comment(indent, format_args!("XML specified {}={}", exclusive_facet, literal))?;
    }
    match inclusive {
        Some(literal) if is_numeric(literal) => {
            out.line(indent, format_args!("{}: {}", key, literal.trim()))
        }
        Some(literal) => {
            out.comment(indent, format_args!("XML specified {}={}", inclusive_facet, literal))
        }
        None => Ok(()),
    }
}

/// Write the OpenAPI document for `graph` restricted to `inclusion`
pub fn emit_openapi<W: Write>(
    graph: &TypeGraph,
    inclusion: &Inclusion,
    config: &EmitterConfig,
    sink: W,
) -> Result<()> {
    SchemaEmitter::new(graph, inclusion, config).emit(sink)
}
