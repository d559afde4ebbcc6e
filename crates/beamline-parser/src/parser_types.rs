//! Statement tree produced by the parser.
//!
//! Names and values borrow from the source; nothing here is validated
//! against the element schema yet. That happens during resolution.

use crate::span::{Span, Spanned};

/// Assignment operator of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `:=`, re-evaluated whenever referenced variables change.
    Deferred,
    /// `=`, evaluated once.
    Immediate,
}

/// Right-hand side of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue<'src> {
    /// A single, optionally signed, numeric literal.
    Number(f64),
    /// A single bare word such as `true` or `ENTRY`.
    Word(&'src str),
    /// A quoted string, without its quotes.
    String(&'src str),
    /// Anything else; the source text under the value's span.
    Expression,
}

/// `NAME (:=|=) VALUE`
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute<'src> {
    pub name: Spanned<&'src str>,
    pub operator: Operator,
    pub value: Spanned<AttributeValue<'src>>,
}

/// `NAME : CLASS (, ATTRIBUTE)* ;`
#[derive(Debug, Clone, PartialEq)]
pub struct Definition<'src> {
    pub name: Spanned<&'src str>,
    pub class: Spanned<&'src str>,
    pub attributes: Vec<Attribute<'src>>,
}

/// `NAME [: CLASS] (, ATTRIBUTE)* ;` inside a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement<'src> {
    pub name: Spanned<&'src str>,
    pub class: Option<Spanned<&'src str>>,
    pub attributes: Vec<Attribute<'src>>,
}

/// `NAME : SEQUENCE (, ATTRIBUTE)* ; PLACEMENT* ENDSEQUENCE ;`
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceBlock<'src> {
    pub name: Spanned<&'src str>,
    pub attributes: Vec<Attribute<'src>>,
    pub placements: Vec<Placement<'src>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement<'src> {
    Definition(Definition<'src>),
    Sequence(SequenceBlock<'src>),
    /// `NAME (:=|=) VALUE ;`
    Assignment(Spanned<&'src str>),
    /// `NAME [, ...] ;` such as `BEAM` or `USE`.
    Command(Spanned<&'src str>),
}
