//! Error types for the lattice model and the mapping registry.

use thiserror::Error;

use crate::{attribute::Attribute, family::Family, registry::Dialect};

/// A lookup against the element schema failed.
///
/// Raised for unknown families and attributes, attributes that do not
/// belong to a family, and families a dialect cannot express.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown element family `{0}`")]
    UnknownFamily(String),

    #[error("unknown attribute `{0}`")]
    UnknownAttribute(String),

    #[error("attribute `{attribute}` is not allowed for family `{family}`")]
    AttributeNotAllowed { family: Family, attribute: Attribute },

    #[error("attribute `{0}` cannot be set on an element without a definition")]
    NoDefinition(Attribute),

    #[error("family `{family}` is not supported by the {dialect} dialect")]
    UnsupportedFamily { dialect: Dialect, family: Family },
}

/// A lattice table violates one of its structural invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LatticeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("element `{name}` is placed with two different definitions")]
    ConflictingDefinition { name: String },

    #[error("lattice length must be a finite, non-negative number")]
    InvalidLength,
}
