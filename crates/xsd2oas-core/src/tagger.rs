//! Inclusion tagging
//!
//! Walks the type graph from the root and decides which elements and types
//! take part in the output. An element is required when the `all` flag is
//! set, when XSD cardinality makes it mandatory outside a choice group, or
//! when its path is selected by the mask (no mask selects everything).
//!
//! The result is an [`Inclusion`] set kept apart from the graph, so the
//! graph itself stays immutable and both emitters can share it.
//!
//! Copyright (c) 2025 xsd2oas contributors
//! Licensed under the Apache-2.0 license

use crate::error::Result;
use crate::graph::{Attribute, ComplexType, Element, SimpleType, TypeDef, TypeGraph};
use crate::mask::Mask;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, instrument, trace};

/// The set of types and elements selected for output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inclusion {
    types: BTreeSet<String>,
    elements: HashSet<(String, usize)>,
    /// Element paths expanded by the tagger, truncated ones excluded
    paths: HashSet<String>,
}

impl Inclusion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include a type, returning true the first time it is seen
    pub fn include_type(&mut self, name: &str) -> bool {
        if self.types.contains(name) {
            return false;
        }
        self.types.insert(name.to_string())
    }

    /// Include the element at `index` within complex type `owner`
    pub fn include_element(&mut self, owner: &str, index: usize) {
        self.elements.insert((owner.to_string(), index));
    }

    /// Record an element path whose content is part of the output
    pub fn include_path(&mut self, path: &str) {
        self.paths.insert(path.to_string());
    }

    pub fn includes_path(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn includes_type(&self, name: &str) -> bool {
        self.types.contains(name)
    }

    pub fn includes_element(&self, owner: &str, index: usize) -> bool {
        self.elements.contains(&(owner.to_string(), index))
    }

    /// Included type names in lexicographic order
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(String::as_str)
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}

/// A path visited by the tagger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedPath {
    pub path: String,
    /// The element has simple content, so the path ends here
    pub leaf: bool,
}

/// Outcome of a tagging pass
#[derive(Debug, Clone, Default)]
pub struct Tagging {
    pub inclusion: Inclusion,
    /// Required element paths in traversal order
    pub paths: Vec<TaggedPath>,
    /// Paths where a recursive type was not expanded again
    pub truncated: Vec<String>,
}

impl Tagging {
    /// Paths of required simple-typed elements; usable as a mask
    pub fn leaf_paths(&self) -> impl Iterator<Item = &str> {
        self.paths
            .iter()
            .filter(|tagged| tagged.leaf)
            .map(|tagged| tagged.path.as_str())
    }
}

/// Tag `graph` against an optional mask
pub fn tag(graph: &TypeGraph, mask: Option<&Mask>, all: bool) -> Result<Tagging> {
    Tagger::new(graph, mask, all).run()
}

/// Depth-first inclusion tagger
pub struct Tagger<'g> {
    graph: &'g TypeGraph,
    mask: Option<&'g Mask>,
    all: bool,
    /// Complex types on the active recursion path
    active: Vec<&'g str>,
    tagging: Tagging,
}

impl<'g> Tagger<'g> {
    pub fn new(graph: &'g TypeGraph, mask: Option<&'g Mask>, all: bool) -> Self {
        Self {
            graph,
            mask,
            all,
            active: Vec::new(),
            tagging: Tagging::default(),
        }
    }

    /// Run the pass from the graph root
    #[instrument(skip(self), fields(root = %self.graph.root_name(), masked = self.mask.is_some(), all = self.all))]
    pub fn run(mut self) -> Result<Tagging> {
        let root = self.graph.root()?;
        self.include_complex(root)?;
        self.active.push(&root.name);
        self.tag_complex(root, "")?;
        self.active.pop();

        debug!(
            types = self.tagging.inclusion.type_count(),
            elements = self.tagging.inclusion.element_count(),
            truncated = self.tagging.truncated.len(),
            "Tagging complete"
        );
        Ok(self.tagging)
    }

    fn is_required(&self, parent: &ComplexType, element: &Element, path: &str) -> bool {
        if self.all {
            return true;
        }
        if !parent.is_choice() && !element.is_optional() {
            return true;
        }
        self.mask.map_or(true, |mask| mask.matches(path))
    }

    /// Whether a type already on the active path may be expanded once more
    fn may_reenter(&self, path: &str) -> bool {
        !self.all && self.mask.is_some_and(|mask| mask.extends_below(path))
    }

    fn tag_complex(&mut self, complex: &'g ComplexType, path: &str) -> Result<()> {
        let graph = self.graph;
        for (index, element) in complex.elements.iter().enumerate() {
            let element_path = format!("{}/{}", path, element.name);
            if !self.is_required(complex, element, &element_path) {
                trace!(path = %element_path, "Not required");
                continue;
            }
            self.tagging.inclusion.include_element(&complex.name, index);

            let def = graph.resolve(&element.type_name, || {
                format!("element '{}' of '{}'", element.name, complex.name)
            })?;
            match def {
                TypeDef::Complex(child) => {
                    self.tagging.paths.push(TaggedPath {
                        path: element_path.clone(),
                        leaf: child.simple_base.is_some(),
                    });
                    self.include_complex(child)?;

                    if self.active.contains(&child.name.as_str()) && !self.may_reenter(&element_path) {
                        debug!(path = %element_path, type_name = %child.name, "Truncating recursive type");
                        self.tagging.truncated.push(element_path);
                        continue;
                    }

                    self.tagging.inclusion.include_path(&element_path);
                    self.active.push(&child.name);
                    let result = self.tag_complex(child, &element_path);
                    self.active.pop();
                    result?;
                }
                TypeDef::Simple(simple) => {
                    trace!(path = %element_path, type_name = %simple.name, "Tagged leaf");
                    self.tagging.inclusion.include_path(&element_path);
                    self.tagging.paths.push(TaggedPath {
                        path: element_path,
                        leaf: true,
                    });
                    self.include_simple(simple)?;
                }
            }
        }
        Ok(())
    }

    fn include_complex(&mut self, complex: &'g ComplexType) -> Result<()> {
        if self.tagging.inclusion.include_type(&complex.name) {
            for attribute in complex.all_attributes() {
                self.include_attribute_type(attribute, &complex.name)?;
            }
        }
        Ok(())
    }

    fn include_simple(&mut self, simple: &'g SimpleType) -> Result<()> {
        if self.tagging.inclusion.include_type(&simple.name) {
            for attribute in &simple.attributes {
                self.include_attribute_type(attribute, &simple.name)?;
            }
        }
        Ok(())
    }

    fn include_attribute_type(&mut self, attribute: &Attribute, owner: &str) -> Result<()> {
        let def = self.graph.resolve(&attribute.type_name, || {
            format!("attribute '{}' of '{}'", attribute.name, owner)
        })?;
        self.tagging.inclusion.include_type(def.name());
        Ok(())
    }
}
