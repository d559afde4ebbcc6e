//! Comparing element positions of two lattices.

use log::{debug, trace};

use beamline_core::{element::Element, lattice::Lattice};

/// Positions closer than this are the same position.
const TOLERANCE: f64 = 1e-6;

/// A pair of elements found at the same centre position.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionMatch {
    pub position: f64,
    pub left: String,
    pub right: String,
}

/// An element of the first lattice with no counterpart in the second.
#[derive(Debug, Clone, PartialEq)]
pub struct Unmatched {
    pub position: f64,
    pub name: String,
}

/// Result of [`compare_center_positions`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionComparison {
    matches: Vec<PositionMatch>,
    unmatched: Vec<Unmatched>,
}

impl PositionComparison {
    /// Pairs in the order of the first lattice, then of the second.
    pub fn matches(&self) -> &[PositionMatch] {
        &self.matches
    }

    pub fn unmatched(&self) -> &[Unmatched] {
        &self.unmatched
    }

    /// `true` when every placed element of the first lattice has a match.
    pub fn is_aligned(&self) -> bool {
        self.unmatched.is_empty()
    }
}

/// Matches the rows of `a` against the rows of `b` by centre position.
///
/// A row of `a` matches every row of `b` within 1 µm of it; names are not
/// compared. Rows without a position take no part.
pub fn compare_center_positions(a: &Lattice, b: &Lattice) -> PositionComparison {
    let right: Vec<(&Element, f64)> = placed(b).collect();
    let mut comparison = PositionComparison::default();

    for (element, position) in placed(a) {
        let before = comparison.matches.len();
        comparison.matches.extend(
            right
                .iter()
                .filter(|(_, other)| (other - position).abs() <= TOLERANCE)
                .map(|(other, _)| PositionMatch {
                    position,
                    left: element.name().to_string(),
                    right: other.name().to_string(),
                }),
        );
        if comparison.matches.len() == before {
            comparison.unmatched.push(Unmatched {
                position,
                name: element.name().to_string(),
            });
        }
    }

    debug!(
        matches = comparison.matches.len(),
        unmatched = comparison.unmatched.len();
        "Compared centre positions"
    );
    comparison
}

fn placed(lattice: &Lattice) -> impl Iterator<Item = (&Element, f64)> {
    lattice.elements().iter().filter_map(|element| match element.center() {
        Some(position) => Some((element, position)),
        None => {
            trace!(name = element.name(); "Skipping unplaced element");
            None
        }
    })
}
