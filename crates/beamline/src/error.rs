//! Error types for Beamline operations.
//!
//! This module provides the main error type [`BeamlineError`] which wraps
//! the error conditions of every conversion stage.

use std::io;

use thiserror::Error;

use beamline_core::LatticeError;
use beamline_parser::error::ParseError;

/// The main error type for Beamline operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text next to the diagnostics so the
/// caller can render them with source snippets.
#[derive(Debug, Error)]
pub enum BeamlineError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Lattice error: {0}")]
    Lattice(#[from] LatticeError),

    #[error("Export error: {0}")]
    Export(#[from] crate::export::Error),

    #[error("Transform error: {0}")]
    Transform(#[from] crate::transform::Error),
}

impl BeamlineError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
