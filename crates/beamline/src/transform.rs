//! Lattice transforms.
//!
//! Transforms take a lattice (or a subset of its rows) and produce a new
//! one; the input is never modified.
//!
//! - [`split`]: subdivide dipoles at given bend angles, inserting port markers
//! - [`drift`]: fill the gaps between placed elements with drifts
//! - [`compare`]: match elements of two lattices by centre position

pub mod compare;
pub mod drift;
pub mod split;

use thiserror::Error;

use beamline_core::{LatticeError, SchemaError, attribute::Attribute, element::Element};

/// Errors that can occur while transforming a lattice.
#[derive(Debug, Error)]
pub enum Error {
    #[error("element `{element}` is not a bending magnet")]
    NotABend { element: String },

    #[error("element `{element}` has a zero bend angle")]
    ZeroAngle { element: String },

    #[error("element `{element}` has negative length {length}")]
    NegativeLength { element: String, length: f64 },

    #[error("element `{element}` lacks attribute `{attribute}`")]
    MissingAttribute { element: String, attribute: Attribute },

    #[error("attribute `{attribute}` of element `{element}` is not a number")]
    NonNumeric { element: String, attribute: Attribute },

    #[error("element `{element}` has no position")]
    Unplaced { element: String },

    #[error(
        "half bend angle {half_deg} deg does not match element `{element}` with bend angle {total_deg} deg"
    )]
    HalfAngleMismatch {
        element: String,
        half_deg: f64,
        total_deg: f64,
    },

    #[error("cut at {angle_deg} deg lies outside element `{element}` ({total_deg} deg)")]
    CutOutOfRange {
        element: String,
        angle_deg: f64,
        total_deg: f64,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Lattice(#[from] LatticeError),
}

/// Reads a numeric attribute that must be present.
fn required(element: &Element, attribute: Attribute) -> Result<f64, Error> {
    match element.get(attribute) {
        None => Err(Error::MissingAttribute {
            element: element.name().to_string(),
            attribute,
        }),
        Some(value) => value.as_number().ok_or_else(|| Error::NonNumeric {
            element: element.name().to_string(),
            attribute,
        }),
    }
}

/// Centre position of a placed row.
fn center(element: &Element) -> Result<f64, Error> {
    element.center().ok_or_else(|| Error::Unplaced {
        element: element.name().to_string(),
    })
}
