//! Error codes for the parser diagnostics.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser errors
//! - `E2xx` - Sequence resolution errors
//! - `E3xx` - Element schema errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    E001,

    /// Unexpected character.
    E002,

    /// Invalid numeric literal.
    ///
    /// A word starting like a number could not be read as one, e.g. `1.2.3`.
    E003,

    /// Unterminated block comment.
    E004,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    E100,

    /// Incomplete input.
    E101,

    // =========================================================================
    // Resolution Errors (E2xx)
    // =========================================================================
    /// Undefined element.
    ///
    /// A sequence places an element that no statement defines.
    E200,

    /// Multiple sequence blocks.
    ///
    /// A source may describe at most one `SEQUENCE ... ENDSEQUENCE` block.
    E201,

    // =========================================================================
    // Schema Errors (E3xx)
    // =========================================================================
    /// Unknown element family.
    E300,

    /// Attribute not allowed for family.
    E301,

    /// Invalid attribute value.
    ///
    /// The value has the wrong shape for its attribute, such as a symbolic
    /// `AT` or an unknown `REFER` option.
    E302,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "invalid numeric literal",
            ErrorCode::E004 => "unterminated block comment",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E200 => "undefined element",
            ErrorCode::E201 => "multiple sequence blocks",
            ErrorCode::E300 => "unknown element family",
            ErrorCode::E301 => "attribute not allowed for family",
            ErrorCode::E302 => "invalid attribute value",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
