//! Resolution phase: statement tree to lattice table.
//!
//! Resolution runs in two passes. The first fills a definition table in
//! textual order, including inline definitions written inside the sequence.
//! A later definition of the same name replaces the earlier one (last write
//! wins), so a file may redefine a template element after first declaring
//! it. The second pass walks the placements and turns each into a row.
//!
//! All problems are collected and reported together, so a file with three
//! undefined elements yields three diagnostics.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, info, trace};

use beamline_core::{
    attribute::Attribute,
    element::{Element, ElementKind},
    family::Family,
    lattice::Lattice,
    value::Value,
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    parser_types as types,
    span::Spanned,
};

/// Reference point of `AT` within an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refer {
    Entry,
    Centre,
    Exit,
}

impl Refer {
    fn parse(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "ENTRY" => Some(Refer::Entry),
            "CENTRE" | "CENTER" => Some(Refer::Centre),
            "EXIT" => Some(Refer::Exit),
            _ => None,
        }
    }

    /// Centre position of an element of `length` placed at `at`.
    fn center(self, at: f64, length: f64) -> f64 {
        match self {
            Refer::Entry => at + length / 2.0,
            Refer::Centre => at,
            Refer::Exit => at - length / 2.0,
        }
    }
}

/// Settings taken from a `SEQUENCE` header.
#[derive(Debug)]
struct SequenceHeader {
    name: String,
    length: f64,
    refer: Refer,
}

pub struct Builder<'a> {
    source: &'a str,
    definitions: IndexMap<String, ElementKind>,
    /// Names whose definition failed; placements of them are not reported again.
    failed: HashSet<String>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Builder<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            definitions: IndexMap::new(),
            failed: HashSet::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    // ============================================================================
    // Main Entry Methods
    // ============================================================================

    pub fn build(mut self, statements: &[types::Statement<'a>]) -> Result<Lattice, ParseError> {
        debug!(statements = statements.len(); "Resolving statements");

        let sequence = self.select_sequence(statements);

        // Pass one: definitions, in textual order.
        for statement in statements {
            match statement {
                types::Statement::Definition(definition) => {
                    self.define(&definition.name, &definition.class, &definition.attributes);
                }
                types::Statement::Sequence(block) if sequence.is_some_and(|s| std::ptr::eq(s, block)) => {
                    for placement in &block.placements {
                        if let Some(class) = &placement.class {
                            self.define(&placement.name, class, &placement.attributes);
                        }
                    }
                }
                _ => {}
            }
        }

        // Pass two: rows.
        let (name, length, rows) = match sequence {
            Some(block) => {
                let header = self.sequence_header(block);
                let rows = self.place(block, header.refer);
                (Some(header.name), header.length, rows)
            }
            None => {
                let rows = self
                    .definitions
                    .iter()
                    .map(|(name, kind)| Element::new(name.clone(), kind.clone()))
                    .collect();
                (None, 0.0, rows)
            }
        };

        self.diagnostics.finish()?;

        info!(name:?, length, rows = rows.len(); "Lattice resolved");
        Lattice::new(name, length, rows).map_err(|err| {
            ParseError::from(Diagnostic::error(err.to_string()).with_code(ErrorCode::E302))
        })
    }

    // ============================================================================
    // Statements
    // ============================================================================

    /// Pick the sequence block; every further block is an error.
    fn select_sequence<'s>(
        &mut self,
        statements: &'s [types::Statement<'a>],
    ) -> Option<&'s types::SequenceBlock<'a>> {
        let mut selected: Option<&'s types::SequenceBlock<'a>> = None;

        for statement in statements {
            match statement {
                types::Statement::Sequence(block) => match selected {
                    Some(first) => self.diagnostics.emit(
                        Diagnostic::error(format!(
                            "sequence `{}` follows sequence `{}`",
                            block.name.inner(),
                            first.name.inner()
                        ))
                        .with_code(ErrorCode::E201)
                        .with_label(block.name.span(), "second sequence")
                        .with_secondary_label(first.span, "first sequence here")
                        .with_help("a file may describe a single sequence"),
                    ),
                    None => selected = Some(block),
                },
                types::Statement::Assignment(name) => {
                    debug!(name = *name.inner(); "Skipping variable assignment");
                }
                types::Statement::Command(name) => {
                    debug!(command = *name.inner(); "Skipping command");
                }
                types::Statement::Definition(_) => {}
            }
        }

        selected
    }

    /// Register a definition, inheriting from an earlier definition or
    /// starting from an empty element of a family.
    fn define(
        &mut self,
        name: &Spanned<&'a str>,
        class: &Spanned<&'a str>,
        attributes: &[types::Attribute<'a>],
    ) {
        let key = name.to_ascii_uppercase();
        let parent = class.to_ascii_uppercase();

        let mut kind = match self.definitions.get(&parent) {
            Some(kind) => kind.clone(),
            None => match parent.parse::<Family>() {
                Ok(family) => ElementKind::new(family),
                Err(err) => {
                    self.diagnostics.emit(
                        Diagnostic::error(err.to_string())
                            .with_code(ErrorCode::E300)
                            .with_label(class.span(), "neither a family nor a defined element")
                            .with_help(format!(
                                "known families: {}",
                                Family::ALL.map(|f| f.as_str()).join(", ")
                            )),
                    );
                    self.failed.insert(key);
                    return;
                }
            },
        };

        let mut valid = true;
        for attribute in attributes {
            if attribute.name.eq_ignore_ascii_case("AT") {
                continue;
            }
            valid &= self.apply(&mut kind, attribute);
        }
        if !valid {
            self.failed.insert(key);
            return;
        }

        trace!(name = key.as_str(), kind:?; "Element defined");
        if self.definitions.insert(key.clone(), kind).is_some() {
            debug!(name = key.as_str(); "Element redefined, later definition wins");
        }
        self.failed.remove(&key);
    }

    /// Set one attribute on `kind`, reporting schema violations.
    fn apply(&mut self, kind: &mut ElementKind, attribute: &types::Attribute<'a>) -> bool {
        let name = attribute.name.inner();
        let family = kind.family().map_or("?", |f| f.as_str());

        let canonical = match name.parse::<Attribute>() {
            Ok(canonical) => canonical,
            Err(err) => {
                self.diagnostics.emit(
                    Diagnostic::error(err.to_string())
                        .with_code(ErrorCode::E301)
                        .with_label(attribute.name.span(), format!("not an attribute of `{family}`"))
                        .with_help(Self::allowed_help(kind)),
                );
                return false;
            }
        };

        trace!(
            attribute = canonical.as_str(),
            deferred = attribute.operator == types::Operator::Deferred;
            "Applying attribute"
        );

        let value = self.value(&attribute.value);
        if canonical == Attribute::L && value.as_number().is_some_and(|l| l < 0.0) {
            self.invalid_value(
                attribute,
                "element length must not be negative",
                "lengths are measured along the beam, e.g. `L = 2.0`",
            );
            return false;
        }

        match kind.set(canonical, value) {
            Ok(()) => true,
            Err(err) => {
                self.diagnostics.emit(
                    Diagnostic::error(err.to_string())
                        .with_code(ErrorCode::E301)
                        .with_label(attribute.name.span(), format!("not allowed for `{family}`"))
                        .with_help(Self::allowed_help(kind)),
                );
                false
            }
        }
    }

    fn allowed_help(kind: &ElementKind) -> String {
        match kind.family() {
            Some(family) if family.attributes().is_empty() => {
                format!("`{family}` takes no attributes")
            }
            Some(family) => format!(
                "`{family}` accepts: {}",
                family
                    .attributes()
                    .iter()
                    .map(|a| a.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            None => "only defined elements take attributes".to_string(),
        }
    }

    fn value(&self, value: &Spanned<types::AttributeValue<'a>>) -> Value {
        match value.inner() {
            types::AttributeValue::Number(n) => Value::Number(*n),
            types::AttributeValue::Word(word) => Value::from(*word),
            types::AttributeValue::String(text) => Value::from(*text),
            types::AttributeValue::Expression => {
                Value::from(self.source.get(value.span().range()).unwrap_or_default())
            }
        }
    }

    // ============================================================================
    // Sequence
    // ============================================================================

    fn sequence_header(&mut self, block: &types::SequenceBlock<'a>) -> SequenceHeader {
        let mut header = SequenceHeader {
            name: block.name.to_ascii_uppercase(),
            length: 0.0,
            refer: Refer::Centre,
        };

        for attribute in &block.attributes {
            let key = attribute.name.to_ascii_uppercase();
            match (key.as_str(), attribute.value.inner()) {
                ("L", types::AttributeValue::Number(length)) if *length >= 0.0 => {
                    header.length = *length;
                }
                ("L", _) => self.invalid_value(
                    attribute,
                    "sequence length must be a non-negative number",
                    "write the length as a literal, e.g. `L = 8.0`",
                ),
                (
                    "REFER",
                    types::AttributeValue::Word(word) | types::AttributeValue::String(word),
                ) if Refer::parse(word).is_some() => {
                    header.refer = Refer::parse(word).unwrap_or(Refer::Centre);
                }
                ("REFER", _) => self.invalid_value(
                    attribute,
                    "unknown `REFER` option",
                    "use `ENTRY`, `CENTRE` or `EXIT`",
                ),
                _ => self.diagnostics.emit(
                    Diagnostic::warning(format!("sequence option `{key}` ignored"))
                        .with_label(attribute.name.span(), "ignored"),
                ),
            }
        }

        debug!(header:?; "Sequence header");
        header
    }

    /// Turn placements into rows.
    fn place(&mut self, block: &types::SequenceBlock<'a>, refer: Refer) -> Vec<Element> {
        let mut rows = Vec::with_capacity(block.placements.len());
        let external = self.definitions.is_empty() && self.failed.is_empty();

        for placement in &block.placements {
            let key = placement.name.to_ascii_uppercase();

            let mut at = None;
            for attribute in &placement.attributes {
                if attribute.name.eq_ignore_ascii_case("AT") {
                    match attribute.value.inner() {
                        types::AttributeValue::Number(n) => at = Some(*n),
                        _ => self.invalid_value(
                            attribute,
                            "`AT` must be a number",
                            "write the position as a literal, e.g. `at = 2.5`",
                        ),
                    }
                } else if placement.class.is_none() {
                    self.invalid_value(
                        attribute,
                        &format!("`{}` can only be set where the element is defined", attribute.name.inner()),
                        &format!("write `{}: <family>, ...` to define it inline", placement.name.inner()),
                    );
                }
            }

            let kind = match self.definitions.get(&key) {
                Some(kind) => kind.clone(),
                None if external => ElementKind::External,
                None => {
                    if !self.failed.contains(&key) {
                        self.diagnostics.emit(
                            Diagnostic::error(format!("undefined element `{}`", placement.name.inner()))
                                .with_code(ErrorCode::E200)
                                .with_label(placement.name.span(), "not defined")
                                .with_help(format!(
                                    "define `{}` before the sequence block",
                                    placement.name.inner()
                                )),
                        );
                    }
                    continue;
                }
            };

            let mut element = Element::new(key, kind);
            if let Some(at) = at {
                let pos = refer.center(at, element.length());
                element = element.with_at(at).with_pos(pos);
            }
            rows.push(element);
        }

        rows
    }

    fn invalid_value(&mut self, attribute: &types::Attribute<'a>, message: &str, help: &str) {
        self.diagnostics.emit(
            Diagnostic::error(message)
                .with_code(ErrorCode::E302)
                .with_label(attribute.value.span(), "invalid value")
                .with_help(help),
        );
    }
}
