//! Beamline Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Beamline parser,
//! serializers and transforms. It includes:
//!
//! - **Values**: Numeric or textual attribute values ([`value::Value`])
//! - **Attributes**: Canonical attribute names ([`attribute::Attribute`])
//! - **Families**: The closed element-type vocabulary ([`family::Family`])
//! - **Elements**: Typed element rows ([`element::Element`], [`element::ElementKind`])
//! - **Lattices**: Ordered element tables ([`lattice::Lattice`])
//! - **Registry**: Per-dialect attribute and family mappings ([`registry::Registry`])

pub mod attribute;
pub mod element;
pub mod error;
pub mod family;
pub mod lattice;
pub mod registry;
pub mod value;

pub use error::{LatticeError, SchemaError};
