//! Type graph data model
//!
//! A [`TypeGraph`] is the single owner of every complex and simple type
//! definition read from a schema. It is built once, validated, and then only
//! ever borrowed immutably by the tagger and the emitters. Inclusion state
//! lives outside the graph in [`crate::tagger::Inclusion`].
//!
//! Copyright (c) 2025 xsd2oas contributors
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::typemap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Content model of a complex type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compositor {
    /// Ordered content (`xs:sequence`, and `xs:all` which is treated the same)
    #[default]
    Sequence,
    /// Exactly one child present (`xs:choice`)
    Choice,
}

/// Upper occurrence bound of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxOccurs {
    Bounded(u32),
    Unbounded,
}

impl Default for MaxOccurs {
    fn default() -> Self {
        MaxOccurs::Bounded(1)
    }
}

impl MaxOccurs {
    /// Whether more than one occurrence is allowed (rendered as an array)
    pub fn is_many(&self) -> bool {
        match self {
            MaxOccurs::Bounded(n) => *n > 1,
            MaxOccurs::Unbounded => true,
        }
    }
}

fn default_min_occurs() -> u32 {
    1
}

/// A child element of a complex type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub type_name: String,
    #[serde(default = "default_min_occurs")]
    pub min_occurs: u32,
    #[serde(default)]
    pub max_occurs: MaxOccurs,
}

impl Element {
    /// Create a mandatory, single-occurrence element
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            min_occurs: 1,
            max_occurs: MaxOccurs::default(),
        }
    }

    /// Mark the element optional (`minOccurs="0"`)
    pub fn optional(mut self) -> Self {
        self.min_occurs = 0;
        self
    }

    /// Allow an unbounded number of occurrences
    pub fn repeated(mut self) -> Self {
        self.max_occurs = MaxOccurs::Unbounded;
        self
    }

    /// Set both occurrence bounds
    pub fn with_occurs(mut self, min_occurs: u32, max_occurs: MaxOccurs) -> Self {
        self.min_occurs = min_occurs;
        self.max_occurs = max_occurs;
        self
    }

    pub fn is_optional(&self) -> bool {
        self.min_occurs == 0
    }
}

/// An attribute carried by a simple or complex type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed: Option<String>,
}

impl Attribute {
    /// Create an optional attribute
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            required: false,
            default: None,
            fixed: None,
        }
    }

    /// Mark the attribute `use="required"`
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Constraining facets of a simple type. Unset facets are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Facets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enumeration: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_inclusive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_exclusive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_inclusive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_exclusive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_digits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fraction_digits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_space: Option<String>,
}

impl Facets {
    /// Fill every unset facet from `base` (restriction inherits base facets)
    pub fn inherit_from(&mut self, base: &Facets) {
        fn fill<T: Clone>(slot: &mut Option<T>, from: &Option<T>) {
            if slot.is_none() {
                slot.clone_from(from);
            }
        }
        fill(&mut self.min_length, &base.min_length);
        fill(&mut self.max_length, &base.max_length);
        fill(&mut self.length, &base.length);
        fill(&mut self.pattern, &base.pattern);
        fill(&mut self.min_inclusive, &base.min_inclusive);
        fill(&mut self.min_exclusive, &base.min_exclusive);
        fill(&mut self.max_inclusive, &base.max_inclusive);
        fill(&mut self.max_exclusive, &base.max_exclusive);
        fill(&mut self.total_digits, &base.total_digits);
        fill(&mut self.fraction_digits, &base.fraction_digits);
        fill(&mut self.white_space, &base.white_space);
        if self.enumeration.is_empty() {
            self.enumeration.clone_from(&base.enumeration);
        }
    }
}

/// A simple type: a builtin or restricted value type, optionally with attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleType {
    pub name: String,
    pub base: String,
    #[serde(default)]
    pub facets: Facets,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

impl SimpleType {
    pub fn new(name: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: base.into(),
            facets: Facets::default(),
            attributes: Vec::new(),
        }
    }

    /// A builtin XSD datatype registered under its own name
    pub fn builtin(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), name)
    }

    pub fn with_facets(mut self, facets: Facets) -> Self {
        self.facets = facets;
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Whether this entry stands for a builtin datatype rather than a user type
    pub fn is_builtin(&self) -> bool {
        self.name == self.base && typemap::is_builtin(&self.name)
    }
}

/// A complex type: a group of elements and attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexType {
    pub name: String,
    #[serde(default)]
    pub compositor: Compositor,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Value type when the complex type is a simple type with added attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple_base: Option<SimpleType>,
    /// XSD wildcard content (`xs:any`) is present
    #[serde(default)]
    pub any: bool,
}

impl ComplexType {
    pub fn new(name: impl Into<String>, compositor: Compositor) -> Self {
        Self {
            name: name.into(),
            compositor,
            elements: Vec::new(),
            attributes: Vec::new(),
            simple_base: None,
            any: false,
        }
    }

    pub fn sequence(name: impl Into<String>) -> Self {
        Self::new(name, Compositor::Sequence)
    }

    pub fn choice(name: impl Into<String>) -> Self {
        Self::new(name, Compositor::Choice)
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_simple_base(mut self, simple_base: SimpleType) -> Self {
        self.simple_base = Some(simple_base);
        self
    }

    pub fn with_any(mut self) -> Self {
        self.any = true;
        self
    }

    pub fn is_choice(&self) -> bool {
        self.compositor == Compositor::Choice
    }

    /// All attributes whose types must be emitted alongside this type
    pub fn all_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().chain(
            self.simple_base
                .iter()
                .flat_map(|simple| simple.attributes.iter()),
        )
    }
}

/// A type definition: the closed union of complex and simple types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDef {
    Complex(ComplexType),
    Simple(SimpleType),
}

impl TypeDef {
    pub fn name(&self) -> &str {
        match self {
            TypeDef::Complex(complex) => &complex.name,
            TypeDef::Simple(simple) => &simple.name,
        }
    }

    pub fn as_complex(&self) -> Option<&ComplexType> {
        match self {
            TypeDef::Complex(complex) => Some(complex),
            TypeDef::Simple(_) => None,
        }
    }

    pub fn as_simple(&self) -> Option<&SimpleType> {
        match self {
            TypeDef::Simple(simple) => Some(simple),
            TypeDef::Complex(_) => None,
        }
    }
}

impl From<ComplexType> for TypeDef {
    fn from(complex: ComplexType) -> Self {
        TypeDef::Complex(complex)
    }
}

impl From<SimpleType> for TypeDef {
    fn from(simple: SimpleType) -> Self {
        TypeDef::Simple(simple)
    }
}

/// Serialized form of a graph: a root name and a flat list of definitions
#[derive(Serialize, Deserialize)]
struct RawGraph {
    root: String,
    types: Vec<TypeDef>,
}

/// The type graph, keyed by type name and rooted at one complex type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGraph", into = "RawGraph")]
pub struct TypeGraph {
    root: String,
    types: BTreeMap<String, TypeDef>,
}

impl TryFrom<RawGraph> for TypeGraph {
    type Error = Error;

    fn try_from(raw: RawGraph) -> Result<Self> {
        let mut graph = TypeGraph::new(raw.root);
        for def in raw.types {
            let name = def.name().to_string();
            if graph.insert(def).is_some() {
                return Err(Error::xsd(format!("type '{}' is defined twice", name)));
            }
        }
        Ok(graph)
    }
}

impl From<TypeGraph> for RawGraph {
    fn from(graph: TypeGraph) -> Self {
        RawGraph {
            root: graph.root,
            types: graph.types.into_values().collect(),
        }
    }
}

impl TypeGraph {
    /// Create an empty graph rooted at the named complex type
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            types: BTreeMap::new(),
        }
    }

    /// Insert a definition, returning the one it replaced
    pub fn insert(&mut self, def: impl Into<TypeDef>) -> Option<TypeDef> {
        let def = def.into();
        self.types.insert(def.name().to_string(), def)
    }

    /// Builder-style insert
    pub fn with_type(mut self, def: impl Into<TypeDef>) -> Self {
        self.insert(def);
        self
    }

    pub fn root_name(&self) -> &str {
        &self.root
    }

    pub fn set_root(&mut self, root: impl Into<String>) {
        self.root = root.into();
    }

    /// The root complex type
    pub fn root(&self) -> Result<&ComplexType> {
        match self.types.get(&self.root) {
            Some(TypeDef::Complex(complex)) => Ok(complex),
            Some(TypeDef::Simple(_)) => Err(Error::InvalidRoot {
                name: self.root.clone(),
                message: "the root must be a complex type".to_string(),
            }),
            None => Err(Error::InvalidRoot {
                name: self.root.clone(),
                message: "no such type in the graph".to_string(),
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TypeDef> {
        self.types.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Look a type up, failing with the referrer named in the error
    pub fn resolve<F>(&self, name: &str, referenced_by: F) -> Result<&TypeDef>
    where
        F: FnOnce() -> String,
    {
        self.types.get(name).ok_or_else(|| Error::UndefinedType {
            name: name.to_string(),
            referenced_by: referenced_by(),
        })
    }

    pub fn complex(&self, name: &str) -> Option<&ComplexType> {
        self.get(name).and_then(TypeDef::as_complex)
    }

    pub fn simple(&self, name: &str) -> Option<&SimpleType> {
        self.get(name).and_then(TypeDef::as_simple)
    }

    /// All definitions in lexicographic name order
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The builtin datatype at the end of a simple type's base chain
    ///
    /// Stops at the first name that is not a user simple type, and at any
    /// name already visited.
    pub fn builtin_base<'a>(&'a self, simple: &'a SimpleType) -> &'a str {
        let mut visited = HashSet::new();
        visited.insert(simple.name.as_str());
        let mut current = simple.base.as_str();
        while let Some(next) = self.simple(current) {
            if next.base == next.name || !visited.insert(current) {
                break;
            }
            current = next.base.as_str();
        }
        current
    }

    /// Check that the root is a complex type and every reference resolves
    pub fn validate(&self) -> Result<()> {
        self.root()?;
        for def in self.types.values() {
            match def {
                TypeDef::Complex(complex) => {
                    for element in &complex.elements {
                        self.resolve(&element.type_name, || {
                            format!("element '{}' of '{}'", element.name, complex.name)
                        })?;
                    }
                    for attribute in complex.all_attributes() {
                        self.resolve_attribute(attribute, &complex.name)?;
                    }
                    if let Some(simple) = &complex.simple_base {
                        self.check_base(simple, &complex.name)?;
                    }
                }
                TypeDef::Simple(simple) => {
                    for attribute in &simple.attributes {
                        self.resolve_attribute(attribute, &simple.name)?;
                    }
                    self.check_base(simple, &simple.name)?;
                }
            }
        }
        Ok(())
    }

    fn resolve_attribute(&self, attribute: &Attribute, owner: &str) -> Result<&SimpleType> {
        let def = self.resolve(&attribute.type_name, || {
            format!("attribute '{}' of '{}'", attribute.name, owner)
        })?;
        def.as_simple().ok_or_else(|| Error::UndefinedType {
            name: attribute.type_name.clone(),
            referenced_by: format!(
                "attribute '{}' of '{}' (attributes need a simple type)",
                attribute.name, owner
            ),
        })
    }

    fn check_base(&self, simple: &SimpleType, owner: &str) -> Result<()> {
        if self.contains(&simple.base) || typemap::is_builtin(&simple.base) {
            return Ok(());
        }
        Err(Error::UndefinedType {
            name: simple.base.clone(),
            referenced_by: format!("base of '{}'", owner),
        })
    }
}
