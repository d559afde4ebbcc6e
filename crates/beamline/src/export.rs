//! Export of lattice tables to simulator input formats.
//!
//! This module provides the [`Exporter`] trait that defines the interface for
//! turning a [`Lattice`] into the text of one dialect. It is the final stage
//! of the conversion pipeline.
//!
//! # Pipeline Position
//!
//! ```text
//! MADX Source Text
//!     ↓ parse
//! Lattice Table
//!     ↓ transform (optional)
//! Lattice Table
//!     ↓ export (this module)
//! Dialect Text
//! ```
//!
//! # Available Backends
//!
//! - [`madx`]: MADX definitions and sequence via [`madx::MadxExporter`]
//! - [`elegant`]: Elegant `.lte` lattice via [`elegant::ElegantExporter`]
//! - [`tracy`]: Tracy lattice via [`tracy::TracyExporter`]
//! - [`seqedit`]: MADX `SEQEDIT` install and remove scripts
//!
//! # Error Handling
//!
//! Export operations return [`Error`]. A failing row aborts the export; no
//! partial text is returned. [`Error`] converts into
//! [`BeamlineError::Export`] at the crate boundary.
//!
//! [`BeamlineError::Export`]: crate::BeamlineError::Export

pub mod elegant;
pub mod madx;
pub mod seqedit;
pub mod tracy;

use beamline_core::{
    SchemaError,
    attribute::Attribute,
    element::Element,
    lattice::Lattice,
    registry::{Dialect, FamilySchema},
    value::Value,
};

/// Abstraction for dialect export backends.
pub trait Exporter {
    /// The dialect this backend writes.
    fn dialect(&self) -> Dialect;

    /// Exports a lattice to the backend's text format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] for a family the dialect cannot express,
    /// [`Error::MissingAttribute`] when a row lacks an attribute the dialect
    /// requires, [`Error::NonNumeric`] when an expression stands where a
    /// number must be written, and [`Error::Unplaced`] for a sequence row
    /// without a position.
    fn export(&self, lattice: &Lattice) -> Result<String, Error>;
}

/// Errors that can occur during lattice export.
#[derive(Debug)]
pub enum Error {
    /// The registry has no mapping for a family or attribute.
    Schema(SchemaError),
    /// A row lacks an attribute the target dialect requires.
    MissingAttribute { element: String, attribute: Attribute },
    /// A value that must be written as a number is an unevaluated expression.
    NonNumeric { element: String, attribute: Attribute },
    /// A row that must be placed has no position.
    Unplaced { element: String },
    /// The target format needs a lattice name.
    UnnamedLattice,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema(err) => write!(f, "{err}"),
            Self::MissingAttribute { element, attribute } => {
                write!(f, "element `{element}` lacks required attribute `{attribute}`")
            }
            Self::NonNumeric { element, attribute } => {
                write!(f, "attribute `{attribute}` of element `{element}` is not a number")
            }
            Self::Unplaced { element } => write!(f, "element `{element}` has no position"),
            Self::UnnamedLattice => write!(f, "lattice has no name"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Schema(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Self::Schema(err)
    }
}

/// Returns the lattice name or fails with [`Error::UnnamedLattice`].
fn lattice_name(lattice: &Lattice) -> Result<&str, Error> {
    lattice.name().ok_or(Error::UnnamedLattice)
}

/// Reads an optional numeric attribute; an expression is an error.
fn number(element: &Element, attribute: Attribute) -> Result<Option<f64>, Error> {
    match element.get(attribute) {
        None => Ok(None),
        Some(Value::Number(n)) => Ok(Some(*n)),
        Some(Value::Text(_)) => Err(Error::NonNumeric {
            element: element.name().to_string(),
            attribute,
        }),
    }
}

/// Reads a numeric attribute that must be present.
fn required(element: &Element, attribute: Attribute) -> Result<f64, Error> {
    number(element, attribute)?.ok_or_else(|| Error::MissingAttribute {
        element: element.name().to_string(),
        attribute,
    })
}

/// Centre position of a placed row.
fn center(element: &Element) -> Result<f64, Error> {
    element.center().ok_or_else(|| Error::Unplaced {
        element: element.name().to_string(),
    })
}

/// Fails if `element` lacks an attribute `schema` requires.
fn check_required(schema: &FamilySchema, element: &Element) -> Result<(), Error> {
    match schema
        .required()
        .iter()
        .find(|attribute| element.get(**attribute).is_none())
    {
        Some(&attribute) => Err(Error::MissingAttribute {
            element: element.name().to_string(),
            attribute,
        }),
        None => Ok(()),
    }
}
