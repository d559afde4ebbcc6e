//! Drift insertion.

use std::collections::HashSet;

use log::{debug, warn};

use beamline_core::{
    attribute::Attribute,
    element::{Element, ElementKind},
    family::Family,
    lattice::Lattice,
};

use super::Error;
use crate::config::DriftConfig;

/// Returns a copy of `lattice` with a drift filling every gap between
/// consecutive rows, before the first row and after the last one.
///
/// Gaps are rounded to six decimals; only positive gaps get a drift.
/// Overlapping rows are kept as they are and logged. Drift names are
/// `{prefix}{n}` and skip every name already in the lattice.
///
/// # Errors
///
/// Returns [`Error::Unplaced`] for a row without a position.
pub fn add_drifts(lattice: &Lattice, config: &DriftConfig) -> Result<Lattice, Error> {
    let mut names = DriftNames::new(config.prefix(), lattice);
    let mut rows = Vec::with_capacity(2 * lattice.len() + 1);
    let mut cursor = 0.0;

    for element in lattice.elements() {
        let start = super::center(element)? - element.length() / 2.0;
        let gap = round6(start - cursor);
        if gap > 0.0 {
            rows.push(drift(names.fresh(), cursor, gap)?);
        } else if gap < 0.0 {
            warn!(
                name = element.name(),
                overlap = -gap;
                "Element overlaps its predecessor"
            );
        }
        cursor = f64::max(cursor, start + element.length());
        rows.push(element.clone());
    }

    let gap = round6(lattice.length() - cursor);
    if gap > 0.0 {
        rows.push(drift(names.fresh(), cursor, gap)?);
    }

    debug!(added = rows.len() - lattice.len(); "Inserted drifts");
    Ok(Lattice::new(
        lattice.name().map(str::to_string),
        lattice.length(),
        rows,
    )?)
}

/// A drift of length `length` starting at `start`.
fn drift(name: String, start: f64, length: f64) -> Result<Element, Error> {
    let mut kind = ElementKind::new(Family::Drift);
    kind.set(Attribute::L, length)?;
    Ok(Element::new(name, kind).with_pos(start + length / 2.0))
}

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// Generates drift names not already used in a lattice.
struct DriftNames<'a> {
    prefix: &'a str,
    used: HashSet<String>,
    counter: usize,
}

impl<'a> DriftNames<'a> {
    fn new(prefix: &'a str, lattice: &Lattice) -> Self {
        Self {
            prefix,
            used: lattice.elements().iter().map(|e| e.name().to_string()).collect(),
            counter: 0,
        }
    }

    fn fresh(&mut self) -> String {
        loop {
            self.counter += 1;
            let name = format!("{}{}", self.prefix, self.counter);
            if self.used.insert(name.clone()) {
                return name;
            }
        }
    }
}
