//! xsd2oas Core - XSD type graphs to OpenAPI 3.0 schemas and sample documents
//!
//! This crate turns an XML Schema into a typed graph, decides which parts of
//! that graph a consumer needs, and renders the result as an OpenAPI 3.0 YAML
//! document plus a matching sample JSON instance.
//!
//! # Main Components
//!
//! - **XSD Reader**: Parse schema text into a [`TypeGraph`] ([`parse_xsd`])
//! - **Inclusion Tagger**: Mark the types and elements to emit, optionally
//!   narrowed by a path [`Mask`] ([`tag`])
//! - **Schema Emitter**: Write the OpenAPI YAML document ([`SchemaEmitter`])
//! - **Example Emitter**: Build a sample JSON document ([`ExampleEmitter`])
//!   from values produced by the [`Synthesizer`]
//!
//! # Example
//!
//! ```no_run
//! use xsd2oas_core::{parse_xsd, tag, EmitterConfig, Result, SchemaEmitter};
//!
//! fn example(xsd: &str) -> Result<String> {
//!     let graph = parse_xsd(xsd, None)?;
//!     let tagging = tag(&graph, None, false)?;
//!     let config = EmitterConfig::new("payments");
//!     SchemaEmitter::new(&graph, &tagging.inclusion, &config).render()
//! }
//! ```

pub mod error;
pub mod example;
pub mod graph;
pub mod mask;
pub mod naming;
pub mod openapi;
pub mod sample;
pub mod tagger;
pub mod typemap;
pub mod xsd;

mod proptest_strategies;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use graph::{
    Attribute, ComplexType, Compositor, Element, Facets, MaxOccurs, SimpleType, TypeDef,
    TypeGraph,
};
pub use mask::Mask;
pub use tagger::{tag, Inclusion, TaggedPath, Tagging};
pub use typemap::{map_type_name, JsonType, TypeMapping};

// Emitters
pub use example::{emit_example, ExampleConfig, ExampleEmitter};
pub use openapi::{emit_openapi, EmitterConfig, SchemaEmitter};
pub use sample::Synthesizer;
pub use xsd::parse_xsd;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
