//! # Beamline Parser
//!
//! Parser for MADX sequence files. This crate provides the pipeline from
//! source text to a [`Lattice`] table.
//!
//! ## Usage
//!
//! ```
//! # use beamline_parser::{parse, ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         QF: QUADRUPOLE, L = 0.5, K1 = 1.2;
//!         FODO: SEQUENCE, L = 4.0;
//!         QF, at = 1.0;
//!         ENDSEQUENCE;
//!     "#;
//!
//!     let lattice = parse(source)?;
//!     assert_eq!(lattice.len(), 1);
//!     Ok(())
//! }
//! ```

mod elaborate;
pub mod error;
mod lexer;
mod parser;
mod parser_types;
mod span;
mod tokens;

pub use error::ParseError;
pub use span::Span;

use log::{debug, trace};

use beamline_core::lattice::Lattice;

use elaborate::Builder;

/// Parse MADX source text into a lattice.
///
/// The pipeline runs in three steps:
///
/// 1. **Tokenize** - Convert source text to tokens
/// 2. **Parse** - Build the statement list from tokens
/// 3. **Resolve** - Fill the definition table and place the sequence rows
///
/// Names are case-insensitive and stored upper-case. A source without a
/// `SEQUENCE` block yields one unpositioned row per definition; a source
/// with a sequence but no definitions yields rows of unknown family.
///
/// # Errors
///
/// Returns a [`ParseError`] holding every diagnostic of the first phase
/// that failed.
pub fn parse(source: &str) -> Result<Lattice, ParseError> {
    // Step 1: Tokenize
    let tokens = lexer::tokenize(source)?;
    trace!(tokens = tokens.len(); "Source tokenized");

    // Step 2: Parse
    let statements = parser::build_statements(&tokens)?;
    debug!(statements = statements.len(); "Statements parsed");

    // Step 3: Resolve
    Builder::new(source).build(&statements)
}
