//! XSD reader
//!
//! Builds a [`TypeGraph`] from the text of a single XML Schema document. Only
//! the constructs that shape a JSON payload are read: named and anonymous
//! simple and complex types, model groups, attributes and facets. External
//! schema references are skipped and namespaces are dropped from type
//! references.
//!
//! Anonymous types are registered under `<Owner>_<element>`; a global element
//! with an inline type gives that type the element's own name.
//!
//! Copyright (c) 2025 xsd2oas contributors
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::graph::{
    Attribute, ComplexType, Compositor, Element, Facets, MaxOccurs, SimpleType, TypeDef, TypeGraph,
};
use crate::typemap::{is_builtin, local_name};
use roxmltree::{Document, Node, ParsingOptions};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use tracing::{debug, instrument, warn};

const XS_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// Type given to elements declared without one
pub const ANY_TYPE: &str = "anyType";

/// Element name preferred as the document root
const DEFAULT_ROOT: &str = "Document";

/// Read XSD text into a validated type graph
///
/// `root` names the global element whose type becomes the graph root. When
/// unset, an element named `Document` is used, else the first global element.
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn parse_xsd(text: &str, root: Option<&str>) -> Result<TypeGraph> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document = Document::parse_with_options(text, options)?;
    let schema = document.root_element();
    if schema.tag_name().name() != "schema" || schema.tag_name().namespace() != Some(XS_NS) {
        return Err(Error::xsd("root element must be xs:schema"));
    }

    let mut reader = Reader::new(schema)?;
    reader.read_named_types()?;
    let root_type = reader.root_type(root)?;
    reader.finish(root_type)
}

fn xs_children<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(|child| child.is_element() && child.tag_name().namespace() == Some(XS_NS))
}

fn tag<'a, 'input: 'a>(node: &Node<'a, 'input>) -> &'a str {
    node.tag_name().name()
}

fn parse_count<T: FromStr>(value: &str, what: &str, owner: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::xsd(format!("invalid {} '{}' in '{}'", what, value, owner)))
}

fn read_occurs(node: Node, owner: &str) -> Result<(u32, MaxOccurs)> {
    let min = match node.attribute("minOccurs") {
        Some(value) => parse_count(value, "minOccurs", owner)?,
        None => 1,
    };
    let max = match node.attribute("maxOccurs") {
        Some("unbounded") => MaxOccurs::Unbounded,
        Some(value) => MaxOccurs::Bounded(parse_count(value, "maxOccurs", owner)?),
        None => MaxOccurs::default(),
    };
    Ok((min, max))
}

/// Names of the attributes a derivation marks `use="prohibited"`
fn prohibited_attributes(node: Node) -> Vec<String> {
    xs_children(node)
        .filter(|child| tag(child) == "attribute" && child.attribute("use") == Some("prohibited"))
        .filter_map(|child| child.attribute("name").or_else(|| child.attribute("ref")))
        .map(|name| local_name(name).to_string())
        .collect()
}

struct Reader<'a, 'input> {
    simple_nodes: Vec<(&'a str, Node<'a, 'input>)>,
    complex_nodes: Vec<(&'a str, Node<'a, 'input>)>,
    complex_names: HashSet<&'a str>,
    elements: HashMap<&'a str, Node<'a, 'input>>,
    element_order: Vec<&'a str>,
    groups: HashMap<&'a str, Node<'a, 'input>>,
    attribute_groups: HashMap<&'a str, Node<'a, 'input>>,
    attributes: HashMap<&'a str, Node<'a, 'input>>,
    /// Names taken by named types or already handed out to anonymous ones
    reserved: HashSet<String>,
    /// Resolved type of each global element or attribute read so far
    element_types: HashMap<String, String>,
    attribute_types: HashMap<String, String>,
    /// Derived type name to its base
    extends: HashMap<String, Derivation>,
    graph: TypeGraph,
}

/// How a complex type derives from another complex type
#[derive(Debug, Clone)]
struct Derivation {
    base: String,
    /// Simple content restriction: restated attributes replace inherited ones
    restriction: bool,
    /// Inherited attributes removed with `use="prohibited"`
    prohibited: Vec<String>,
}

impl Derivation {
    fn extension(base: &str) -> Self {
        Self {
            base: base.to_string(),
            restriction: false,
            prohibited: Vec::new(),
        }
    }

    /// Inherited attributes followed by the derived ones
    fn merge_attributes(&self, inherited: &[Attribute], own: Vec<Attribute>) -> Vec<Attribute> {
        if !self.restriction {
            let mut attributes = inherited.to_vec();
            attributes.extend(own);
            return attributes;
        }
        let mut attributes: Vec<Attribute> = inherited
            .iter()
            .filter(|attribute| !self.prohibited.contains(&attribute.name))
            .map(|attribute| {
                own.iter()
                    .find(|restated| restated.name == attribute.name)
                    .unwrap_or(attribute)
                    .clone()
            })
            .collect();
        for attribute in own {
            if !inherited.iter().any(|base| base.name == attribute.name) {
                attributes.push(attribute);
            }
        }
        attributes
    }
}

impl<'a, 'input> Reader<'a, 'input> {
    fn new(schema: Node<'a, 'input>) -> Result<Self> {
        let mut reader = Self {
            simple_nodes: Vec::new(),
            complex_nodes: Vec::new(),
            complex_names: HashSet::new(),
            elements: HashMap::new(),
            element_order: Vec::new(),
            groups: HashMap::new(),
            attribute_groups: HashMap::new(),
            attributes: HashMap::new(),
            reserved: HashSet::new(),
            element_types: HashMap::new(),
            attribute_types: HashMap::new(),
            extends: HashMap::new(),
            graph: TypeGraph::new(DEFAULT_ROOT),
        };

        for child in xs_children(schema) {
            let kind = tag(&child);
            let name = child.attribute("name");
            match (kind, name) {
                ("simpleType", Some(name)) => {
                    reader.reserved.insert(name.to_string());
                    reader.simple_nodes.push((name, child));
                }
                ("complexType", Some(name)) => {
                    reader.reserved.insert(name.to_string());
                    reader.complex_names.insert(name);
                    reader.complex_nodes.push((name, child));
                }
                ("element", Some(name)) => {
                    reader.elements.insert(name, child);
                    reader.element_order.push(name);
                }
                ("group", Some(name)) => {
                    reader.groups.insert(name, child);
                }
                ("attributeGroup", Some(name)) => {
                    reader.attribute_groups.insert(name, child);
                }
                ("attribute", Some(name)) => {
                    reader.attributes.insert(name, child);
                }
                ("include" | "import" | "redefine" | "override", _) => {
                    warn!(
                        kind,
                        location = child.attribute("schemaLocation").unwrap_or(""),
                        "Skipping external schema reference"
                    );
                }
                ("annotation" | "notation", _) => {}
                ("simpleType" | "complexType" | "element" | "group" | "attributeGroup" | "attribute", None) => {
                    return Err(Error::xsd(format!("top-level xs:{} has no name", kind)));
                }
                (other, _) => debug!(kind = other, "Ignoring top-level construct"),
            }
        }
        Ok(reader)
    }

    fn read_named_types(&mut self) -> Result<()> {
        for (name, node) in self.simple_nodes.clone() {
            let simple = self.parse_simple(node, name)?;
            self.define(simple)?;
        }
        for (name, node) in self.complex_nodes.clone() {
            let complex = self.parse_complex(node, name)?;
            self.define(complex)?;
        }
        Ok(())
    }

    fn define(&mut self, def: impl Into<TypeDef>) -> Result<()> {
        let def = def.into();
        let name = def.name().to_string();
        if self.graph.insert(def).is_some() {
            return Err(Error::xsd(format!("type '{}' is defined twice", name)));
        }
        Ok(())
    }

    /// Reserve a name for an anonymous type, suffixing it when taken
    fn fresh_name(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut counter = 2;
        while self.reserved.contains(&candidate) || self.graph.contains(&candidate) {
            candidate = format!("{}_{}", base, counter);
            counter += 1;
        }
        self.reserved.insert(candidate.clone());
        candidate
    }

    fn root_type(&mut self, requested: Option<&str>) -> Result<String> {
        let element = match requested {
            Some(name) if self.elements.contains_key(name) => name.to_string(),
            Some(name) => {
                return Err(Error::InvalidRoot {
                    name: name.to_string(),
                    message: "no global element with this name".to_string(),
                })
            }
            None if self.elements.contains_key(DEFAULT_ROOT) => DEFAULT_ROOT.to_string(),
            None => self
                .element_order
                .first()
                .map(|name| name.to_string())
                .ok_or_else(|| Error::xsd("schema declares no global element"))?,
        };
        debug!(element = %element, "Selected root element");
        self.global_element_type(&element, "the document root")
    }

    fn finish(mut self, root_type: String) -> Result<TypeGraph> {
        self.apply_extensions()?;
        self.inherit_facets();
        self.register_builtins();
        self.graph.set_root(root_type);
        self.graph.validate()?;
        debug!(types = self.graph.len(), root = %self.graph.root_name(), "Schema read");
        Ok(self.graph)
    }

    // Simple types

    fn parse_simple(&mut self, node: Node<'a, 'input>, name: &str) -> Result<SimpleType> {
        for child in xs_children(node) {
            match tag(&child) {
                "restriction" => {
                    let base = self.restriction_base(child, name)?;
                    let facets = self.read_facets(child, name)?;
                    return Ok(SimpleType::new(name, base).with_facets(facets));
                }
                kind @ ("list" | "union") => {
                    debug!(type_name = name, kind, "Reading list or union type as string");
                    return Ok(SimpleType::new(name, "string"));
                }
                _ => {}
            }
        }
        Err(Error::xsd(format!(
            "simple type '{}' has no restriction, list or union",
            name
        )))
    }

    fn restriction_base(&mut self, restriction: Node<'a, 'input>, owner: &str) -> Result<String> {
        if let Some(base) = restriction.attribute("base") {
            return Ok(local_name(base).to_string());
        }
        let inline = xs_children(restriction)
            .find(|child| tag(child) == "simpleType")
            .ok_or_else(|| Error::xsd(format!("restriction in '{}' has no base", owner)))?;
        let name = self.fresh_name(&format!("{}_base", owner));
        let simple = self.parse_simple(inline, &name)?;
        self.define(simple)?;
        Ok(name)
    }

    fn read_facets(&self, restriction: Node<'a, 'input>, owner: &str) -> Result<Facets> {
        let mut facets = Facets::default();
        let mut patterns = Vec::new();
        for facet in xs_children(restriction) {
            let Some(value) = facet.attribute("value") else {
                continue;
            };
            match tag(&facet) {
                "length" => facets.length = Some(parse_count(value, "length", owner)?),
                "minLength" => facets.min_length = Some(parse_count(value, "minLength", owner)?),
                "maxLength" => facets.max_length = Some(parse_count(value, "maxLength", owner)?),
                "pattern" => patterns.push(value.to_string()),
                "enumeration" => facets.enumeration.push(value.to_string()),
                "minInclusive" => facets.min_inclusive = Some(value.to_string()),
                "minExclusive" => facets.min_exclusive = Some(value.to_string()),
                "maxInclusive" => facets.max_inclusive = Some(value.to_string()),
                "maxExclusive" => facets.max_exclusive = Some(value.to_string()),
                "totalDigits" => {
                    facets.total_digits = Some(parse_count(value, "totalDigits", owner)?)
                }
                "fractionDigits" => {
                    facets.fraction_digits = Some(parse_count(value, "fractionDigits", owner)?)
                }
                "whiteSpace" => facets.white_space = Some(value.to_string()),
                other => debug!(facet = other, type_name = owner, "Ignoring facet"),
            }
        }
        // Sibling pattern facets are alternatives
        facets.pattern = match patterns.len() {
            0 => None,
            1 => patterns.pop(),
            _ => Some(
                patterns
                    .iter()
                    .map(|pattern| format!("({})", pattern))
                    .collect::<Vec<_>>()
                    .join("|"),
            ),
        };
        Ok(facets)
    }

    // Complex types

    fn parse_complex(&mut self, node: Node<'a, 'input>, name: &str) -> Result<ComplexType> {
        let mut complex = ComplexType::sequence(name);
        for child in xs_children(node) {
            match tag(&child) {
                "sequence" | "choice" | "all" | "group" => {
                    self.read_particle(child, name, true, false, false, &mut complex, &mut Vec::new())?
                }
                "attribute" | "attributeGroup" => {
                    self.read_attribute_like(child, name, &mut complex.attributes)?
                }
                "simpleContent" => self.read_simple_content(child, &mut complex)?,
                "complexContent" => self.read_complex_content(child, &mut complex)?,
                _ => {}
            }
        }
        Ok(complex)
    }

    /// Read one particle into `out`, flattening nested model groups
    ///
    /// Elements of a nested optional group or a nested choice become
    /// optional, and elements of a repeated group become repeated.
    #[allow(clippy::too_many_arguments)]
    fn read_particle(
        &mut self,
        node: Node<'a, 'input>,
        owner: &str,
        top: bool,
        optional: bool,
        many: bool,
        out: &mut ComplexType,
        groups: &mut Vec<&'a str>,
    ) -> Result<()> {
        match tag(&node) {
            "element" => {
                let mut element = self.read_element(node, owner)?;
                if optional {
                    element.min_occurs = 0;
                }
                if many {
                    element.max_occurs = MaxOccurs::Unbounded;
                }
                out.elements.push(element);
            }
            "any" => out.any = true,
            kind @ ("sequence" | "choice" | "all") => {
                let (min, max) = read_occurs(node, owner)?;
                let is_choice = kind == "choice";
                if top && is_choice {
                    out.compositor = Compositor::Choice;
                }
                let optional = optional || min == 0 || (is_choice && !top);
                let many = many || max.is_many();
                for child in xs_children(node) {
                    self.read_particle(child, owner, false, optional, many, out, groups)?;
                }
            }
            "group" => {
                let Some(reference) = node.attribute("ref") else {
                    return Ok(());
                };
                let name = local_name(reference);
                let group = self.groups.get(name).copied().ok_or_else(|| {
                    Error::xsd(format!("undefined group '{}' used in '{}'", name, owner))
                })?;
                if groups.contains(&name) {
                    return Err(Error::xsd(format!("group '{}' contains itself", name)));
                }
                let (min, max) = read_occurs(node, owner)?;
                groups.push(name);
                for child in xs_children(group) {
                    if matches!(tag(&child), "sequence" | "choice" | "all") {
                        self.read_particle(
                            child,
                            owner,
                            top,
                            optional || min == 0,
                            many || max.is_many(),
                            out,
                            groups,
                        )?;
                    }
                }
                groups.pop();
            }
            "annotation" => {}
            other => debug!(particle = other, owner, "Ignoring particle"),
        }
        Ok(())
    }

    fn read_element(&mut self, node: Node<'a, 'input>, owner: &str) -> Result<Element> {
        let (min, max) = read_occurs(node, owner)?;
        if let Some(reference) = node.attribute("ref") {
            let name = local_name(reference);
            let type_name = self.global_element_type(name, owner)?;
            return Ok(Element::new(name, type_name).with_occurs(min, max));
        }
        let name = node
            .attribute("name")
            .ok_or_else(|| Error::xsd(format!("element without name or ref in '{}'", owner)))?;
        let type_name = match node.attribute("type") {
            Some(type_name) => local_name(type_name).to_string(),
            None => {
                let anonymous = self.fresh_name(&format!("{}_{}", owner, name));
                if self.define_inline_type(node, &anonymous)? {
                    anonymous
                } else {
                    ANY_TYPE.to_string()
                }
            }
        };
        Ok(Element::new(name, type_name).with_occurs(min, max))
    }

    /// Type of a global element, reading its inline type on first use
    fn global_element_type(&mut self, name: &str, referrer: &str) -> Result<String> {
        if let Some(type_name) = self.element_types.get(name) {
            return Ok(type_name.clone());
        }
        let node = self
            .elements
            .get(name)
            .copied()
            .ok_or_else(|| Error::UndefinedType {
                name: name.to_string(),
                referenced_by: format!("element reference in {}", referrer),
            })?;

        if let Some(type_name) = node.attribute("type") {
            let type_name = local_name(type_name).to_string();
            self.element_types.insert(name.to_string(), type_name.clone());
            return Ok(type_name);
        }
        // Registered before reading so self-references resolve
        let anonymous = self.fresh_name(name);
        self.element_types.insert(name.to_string(), anonymous.clone());
        if self.define_inline_type(node, &anonymous)? {
            Ok(anonymous)
        } else {
            self.element_types.insert(name.to_string(), ANY_TYPE.to_string());
            Ok(ANY_TYPE.to_string())
        }
    }

    fn define_inline_type(&mut self, node: Node<'a, 'input>, name: &str) -> Result<bool> {
        for child in xs_children(node) {
            match tag(&child) {
                "complexType" => {
                    let complex = self.parse_complex(child, name)?;
                    self.define(complex)?;
                    return Ok(true);
                }
                "simpleType" => {
                    let simple = self.parse_simple(child, name)?;
                    self.define(simple)?;
                    return Ok(true);
                }
                _ => {}
            }
        }
        Ok(false)
    }

    fn read_simple_content(&mut self, node: Node<'a, 'input>, complex: &mut ComplexType) -> Result<()> {
        let owner = complex.name.clone();
        for child in xs_children(node) {
            let kind = tag(&child);
            if kind != "extension" && kind != "restriction" {
                continue;
            }
            let base = child
                .attribute("base")
                .map(local_name)
                .ok_or_else(|| Error::xsd(format!("simple content of '{}' has no base", owner)))?;
            let mut simple = SimpleType::new(owner.clone(), base);
            if kind == "restriction" {
                simple.facets = self.read_facets(child, &owner)?;
            }
            self.read_attributes(child, &owner, &mut simple.attributes)?;
            if self.complex_names.contains(base) {
                let derivation = Derivation {
                    base: base.to_string(),
                    restriction: kind == "restriction",
                    prohibited: prohibited_attributes(child),
                };
                self.extends.insert(owner.clone(), derivation);
            }
            complex.simple_base = Some(simple);
        }
        Ok(())
    }

    fn read_complex_content(&mut self, node: Node<'a, 'input>, complex: &mut ComplexType) -> Result<()> {
        let owner = complex.name.clone();
        for child in xs_children(node) {
            let kind = tag(&child);
            if kind != "extension" && kind != "restriction" {
                continue;
            }
            let base = child.attribute("base").map(local_name).ok_or_else(|| {
                Error::xsd(format!("complex content of '{}' has no base", owner))
            })?;
            if kind == "extension" && base != ANY_TYPE {
                self.extends.insert(owner.clone(), Derivation::extension(base));
            }
            for particle in xs_children(child) {
                match tag(&particle) {
                    "attribute" | "attributeGroup" => {
                        self.read_attribute_like(particle, &owner, &mut complex.attributes)?
                    }
                    "sequence" | "choice" | "all" | "group" => self.read_particle(
                        particle,
                        &owner,
                        true,
                        false,
                        false,
                        complex,
                        &mut Vec::new(),
                    )?,
                    _ => {}
                }
            }
        }
        Ok(())
    }

    // Attributes

    fn read_attributes(&mut self, node: Node<'a, 'input>, owner: &str, out: &mut Vec<Attribute>) -> Result<()> {
        for child in xs_children(node) {
            if matches!(tag(&child), "attribute" | "attributeGroup") {
                self.read_attribute_like(child, owner, out)?;
            }
        }
        Ok(())
    }

    fn read_attribute_like(&mut self, node: Node<'a, 'input>, owner: &str, out: &mut Vec<Attribute>) -> Result<()> {
        match tag(&node) {
            "attribute" => {
                if let Some(attribute) = self.read_attribute(node, owner)? {
                    out.push(attribute);
                }
                Ok(())
            }
            _ => self.read_attribute_group(node, owner, out, &mut Vec::new()),
        }
    }

    fn read_attribute(&mut self, node: Node<'a, 'input>, owner: &str) -> Result<Option<Attribute>> {
        if node.attribute("use") == Some("prohibited") {
            return Ok(None);
        }
        let (name, type_name) = if let Some(reference) = node.attribute("ref") {
            let name = local_name(reference);
            (name, self.global_attribute_type(name, reference, owner)?)
        } else {
            let name = node
                .attribute("name")
                .ok_or_else(|| Error::xsd(format!("attribute without name or ref in '{}'", owner)))?;
            let anonymous = format!("{}_{}", owner, name);
            (name, self.attribute_type(node, &anonymous)?)
        };

        let mut attribute = Attribute::new(name, type_name);
        attribute.required = node.attribute("use") == Some("required");
        attribute.default = node.attribute("default").map(str::to_string);
        attribute.fixed = node.attribute("fixed").map(str::to_string);
        Ok(Some(attribute))
    }

    fn global_attribute_type(&mut self, name: &str, reference: &str, owner: &str) -> Result<String> {
        if let Some(type_name) = self.attribute_types.get(name) {
            return Ok(type_name.clone());
        }
        let type_name = match self.attributes.get(name).copied() {
            Some(global) => self.attribute_type(global, name)?,
            // xml:lang and friends come from the XML namespace itself
            None if reference.starts_with("xml:") => "string".to_string(),
            None => {
                return Err(Error::UndefinedType {
                    name: name.to_string(),
                    referenced_by: format!("attribute reference in '{}'", owner),
                })
            }
        };
        self.attribute_types.insert(name.to_string(), type_name.clone());
        Ok(type_name)
    }

    fn attribute_type(&mut self, node: Node<'a, 'input>, anonymous: &str) -> Result<String> {
        if let Some(type_name) = node.attribute("type") {
            return Ok(local_name(type_name).to_string());
        }
        match xs_children(node).find(|child| tag(child) == "simpleType") {
            Some(inline) => {
                let name = self.fresh_name(anonymous);
                let simple = self.parse_simple(inline, &name)?;
                self.define(simple)?;
                Ok(name)
            }
            None => Ok("anySimpleType".to_string()),
        }
    }

    fn read_attribute_group(
        &mut self,
        node: Node<'a, 'input>,
        owner: &str,
        out: &mut Vec<Attribute>,
        stack: &mut Vec<&'a str>,
    ) -> Result<()> {
        let Some(reference) = node.attribute("ref") else {
            return Ok(());
        };
        let name = local_name(reference);
        let group = self.attribute_groups.get(name).copied().ok_or_else(|| {
            Error::xsd(format!("undefined attribute group '{}' used in '{}'", name, owner))
        })?;
        if stack.contains(&name) {
            return Err(Error::xsd(format!("attribute group '{}' contains itself", name)));
        }
        stack.push(name);
        for child in xs_children(group) {
            match tag(&child) {
                "attribute" => {
                    if let Some(attribute) = self.read_attribute(child, owner)? {
                        out.push(attribute);
                    }
                }
                "attributeGroup" => self.read_attribute_group(child, owner, out, stack)?,
                _ => {}
            }
        }
        stack.pop();
        Ok(())
    }

    // Post-processing

    fn apply_extensions(&mut self) -> Result<()> {
        let mut names: Vec<String> = self.extends.keys().cloned().collect();
        names.sort();
        let mut done = HashSet::new();
        for name in names {
            self.apply_extension(&name, &mut done, &mut Vec::new())?;
        }
        Ok(())
    }

    /// Merge the extension base into `name`, bases first
    fn apply_extension(
        &mut self,
        name: &str,
        done: &mut HashSet<String>,
        stack: &mut Vec<String>,
    ) -> Result<()> {
        if done.contains(name) {
            return Ok(());
        }
        let Some(derivation) = self.extends.get(name).cloned() else {
            done.insert(name.to_string());
            return Ok(());
        };
        if stack.iter().any(|entry| entry == name) {
            return Err(Error::xsd(format!("type '{}' extends itself", name)));
        }
        let base = derivation.base.clone();
        stack.push(name.to_string());
        self.apply_extension(&base, done, stack)?;
        stack.pop();

        let base_def = self
            .graph
            .complex(&base)
            .cloned()
            .ok_or_else(|| Error::UndefinedType {
                name: base.clone(),
                referenced_by: format!("extension base of '{}'", name),
            })?;
        let Some(TypeDef::Complex(derived)) = self.graph.get_mut(name) else {
            return Err(Error::xsd(format!("extended type '{}' is not a complex type", name)));
        };

        match (&mut derived.simple_base, &base_def.simple_base) {
            (Some(simple), Some(base_simple)) => {
                simple.base = base_simple.base.clone();
                simple.facets.inherit_from(&base_simple.facets);
                let own = std::mem::take(&mut simple.attributes);
                simple.attributes = derivation.merge_attributes(&base_simple.attributes, own);
            }
            (Some(_), None) => {
                return Err(Error::xsd(format!(
                    "simple content of '{}' cannot extend '{}', which has no simple content",
                    name, base
                )));
            }
            (None, _) => {
                let mut elements = base_def.elements;
                if derived.elements.is_empty() && !elements.is_empty() {
                    derived.compositor = base_def.compositor;
                }
                elements.append(&mut derived.elements);
                derived.elements = elements;

                let mut attributes = base_def.attributes;
                attributes.append(&mut derived.attributes);
                derived.attributes = attributes;
                derived.any |= base_def.any;
            }
        }
        debug!(type_name = name, base = %base, "Merged extension base");
        done.insert(name.to_string());
        Ok(())
    }

    /// Fill unset facets from each restriction base, transitively
    fn inherit_facets(&mut self) {
        let mut resolved: HashMap<String, Facets> = HashMap::new();
        let simple_names: Vec<String> = self
            .graph
            .types()
            .filter_map(TypeDef::as_simple)
            .map(|simple| simple.name.clone())
            .collect();
        for name in &simple_names {
            self.resolved_facets(name, &mut resolved, &mut HashSet::new());
        }

        let complex_bases: Vec<(String, String)> = self
            .graph
            .types()
            .filter_map(TypeDef::as_complex)
            .filter_map(|complex| {
                complex
                    .simple_base
                    .as_ref()
                    .map(|simple| (complex.name.clone(), simple.base.clone()))
            })
            .collect();
        let base_facets: Vec<(String, Facets)> = complex_bases
            .into_iter()
            .map(|(name, base)| {
                let facets = self.resolved_facets(&base, &mut resolved, &mut HashSet::new());
                (name, facets)
            })
            .collect();

        for (name, facets) in resolved {
            if let Some(TypeDef::Simple(simple)) = self.graph.get_mut(&name) {
                simple.facets = facets;
            }
        }
        for (name, facets) in base_facets {
            if let Some(TypeDef::Complex(complex)) = self.graph.get_mut(&name) {
                if let Some(simple) = complex.simple_base.as_mut() {
                    simple.facets.inherit_from(&facets);
                }
            }
        }
    }

    fn resolved_facets(
        &self,
        name: &str,
        resolved: &mut HashMap<String, Facets>,
        visiting: &mut HashSet<String>,
    ) -> Facets {
        if let Some(facets) = resolved.get(name) {
            return facets.clone();
        }
        let Some(simple) = self.graph.simple(name) else {
            return Facets::default();
        };
        let mut facets = simple.facets.clone();
        if simple.base != simple.name && visiting.insert(name.to_string()) {
            let base = self.resolved_facets(&simple.base, resolved, visiting);
            facets.inherit_from(&base);
        }
        resolved.insert(name.to_string(), facets.clone());
        facets
    }

    /// Register builtin datatypes that elements or attributes refer to
    fn register_builtins(&mut self) {
        let mut referenced: Vec<String> = Vec::new();
        for def in self.graph.types() {
            match def {
                TypeDef::Complex(complex) => {
                    referenced.extend(complex.elements.iter().map(|e| e.type_name.clone()));
                    referenced.extend(complex.all_attributes().map(|a| a.type_name.clone()));
                }
                TypeDef::Simple(simple) => {
                    referenced.extend(simple.attributes.iter().map(|a| a.type_name.clone()));
                }
            }
        }
        for name in referenced {
            if self.graph.contains(&name) {
                continue;
            }
            if name == ANY_TYPE {
                self.graph.insert(ComplexType::sequence(ANY_TYPE).with_any());
            } else if is_builtin(&name) {
                debug!(type_name = %name, "Registering builtin datatype");
                self.graph.insert(SimpleType::builtin(name));
            }
        }
    }
}
