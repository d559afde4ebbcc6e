//! Dipole splitting.
//!
//! A bending magnet is cut at a set of cumulative bend angles measured from
//! its entrance. Every cut ends one sub-element; the half angle and the full
//! angle are always cuts, so each dipole yields at least two pieces. The
//! pieces share the magnet's bend radius, so their lengths and angles add up
//! to the original ones.
//!
//! A zero-length marker precedes every piece except the last. Markers sit on
//! the cut that ends their piece and are named after the port they model:
//!
//! ```text
//!   entrance                     half                          exit
//!      |---- B1_5p0 ----|-- BM_5p7296 --|-------- B2_11p4592 -------|
//!                    B_P1A1          B_P1M
//! ```

use indexmap::IndexMap;
use log::{debug, trace, warn};
use serde::Deserialize;

use beamline_core::{
    attribute::Attribute,
    element::{Element, ElementKind},
    family::Family,
    lattice::Lattice,
};

use super::Error;
use crate::config::SplitConfig;

/// Where to cut one dipole.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DipoleCuts {
    /// Cumulative bend angles in degrees.
    angles: Vec<f64>,

    /// Arc lengths in metres, converted to angles through the bend radius.
    lengths: Vec<f64>,
}

impl DipoleCuts {
    pub fn new(angles: Vec<f64>, lengths: Vec<f64>) -> Self {
        Self { angles, lengths }
    }

    /// Cuts given as angles only.
    pub fn from_angles(angles: Vec<f64>) -> Self {
        Self::new(angles, Vec::new())
    }

    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    pub fn lengths(&self) -> &[f64] {
        &self.lengths
    }
}

/// Cuts for a set of dipoles, keyed by element name.
///
/// Deserializes from:
///
/// ```toml
/// half_bend_angle = 5.0
///
/// [dipoles.BEND]
/// angles = [2.5, 7.5]
/// lengths = [0.4]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SplitPlan {
    /// Half bend angle in degrees shared by every dipole of the plan.
    half_bend_angle: Option<f64>,

    dipoles: IndexMap<String, DipoleCuts>,
}

impl SplitPlan {
    pub fn new(half_bend_angle: Option<f64>) -> Self {
        Self {
            half_bend_angle,
            dipoles: IndexMap::new(),
        }
    }

    /// Adds (or replaces) the cuts of dipole `name`.
    pub fn with_dipole(mut self, name: impl Into<String>, cuts: DipoleCuts) -> Self {
        self.dipoles.insert(name.into().to_uppercase(), cuts);
        self
    }

    pub fn half_bend_angle(&self) -> Option<f64> {
        self.half_bend_angle
    }

    /// Returns the cuts for `name`; names are compared case-insensitively.
    pub fn cuts(&self, name: &str) -> Option<&DipoleCuts> {
        self.dipoles
            .iter()
            .find(|(dipole, _)| dipole.eq_ignore_ascii_case(name))
            .map(|(_, cuts)| cuts)
    }

    /// Dipole names in the order they were given.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.dipoles.keys().map(String::as_str)
    }
}

/// Splits every row of `rows`.
///
/// Rows the plan does not name are split at their half angle only. The
/// result concatenates each row's markers and pieces in input order; it is
/// not merged back into any lattice (see [`split_lattice`]).
///
/// `half_bend_angle` is in degrees; when absent each row uses half of its
/// own bend angle.
///
/// # Errors
///
/// See [`split_dipole`].
pub fn split_dipoles(
    rows: &[Element],
    plan: &SplitPlan,
    half_bend_angle: Option<f64>,
    config: &SplitConfig,
) -> Result<Vec<Element>, Error> {
    let default_cuts = DipoleCuts::default();
    let mut out = Vec::new();

    for element in rows {
        let cuts = plan.cuts(element.name()).unwrap_or(&default_cuts);
        out.extend(split_dipole(element, cuts, half_bend_angle, config)?);
    }

    debug!(dipoles = rows.len(), rows = out.len(); "Split dipoles");
    Ok(out)
}

/// Returns a copy of `lattice` in which every placement of a dipole named
/// in `plan` is replaced by its pieces and markers, ordered by position.
///
/// The lattice length is unchanged.
///
/// # Errors
///
/// See [`split_dipole`]. Fails with [`Error::Lattice`] if a generated name
/// collides with a different element already in the lattice.
pub fn split_lattice(
    lattice: &Lattice,
    plan: &SplitPlan,
    half_bend_angle: Option<f64>,
    config: &SplitConfig,
) -> Result<Lattice, Error> {
    for name in plan.names() {
        if lattice.find(&name.to_uppercase()).is_none() {
            warn!(name; "Split plan names an element not in the lattice");
        }
    }

    let mut rows = Vec::with_capacity(lattice.len());
    for element in lattice.elements() {
        let Some(cuts) = plan.cuts(element.name()) else {
            rows.push(element.clone());
            continue;
        };
        let mut expansion = split_dipole(element, cuts, half_bend_angle, config)?;
        expansion.sort_by(|a, b| {
            a.center()
                .unwrap_or_default()
                .total_cmp(&b.center().unwrap_or_default())
        });
        rows.extend(expansion);
    }

    debug!(before = lattice.len(), after = rows.len(); "Split lattice");
    Ok(Lattice::new(
        lattice.name().map(str::to_string),
        lattice.length(),
        rows,
    )?)
}

/// Splits a single dipole.
///
/// # Errors
///
/// - [`Error::NotABend`] if the row is not an `SBEND` or `RBEND`
/// - [`Error::MissingAttribute`] / [`Error::NonNumeric`] for `L` or `ANGLE`
/// - [`Error::NegativeLength`] if `L` is negative
/// - [`Error::ZeroAngle`] if the bend angle is zero
/// - [`Error::Unplaced`] if the row has no position
/// - [`Error::HalfAngleMismatch`] if `half_bend_angle` is not half the bend
/// - [`Error::CutOutOfRange`] for a cut outside `(0, angle]`
pub fn split_dipole(
    element: &Element,
    cuts: &DipoleCuts,
    half_bend_angle: Option<f64>,
    config: &SplitConfig,
) -> Result<Vec<Element>, Error> {
    let name = element.name();
    if !element.family().is_some_and(|family| family.is_bend()) {
        return Err(Error::NotABend {
            element: name.to_string(),
        });
    }

    let length = super::required(element, Attribute::L)?;
    if length < 0.0 {
        return Err(Error::NegativeLength {
            element: name.to_string(),
            length,
        });
    }
    let angle = super::required(element, Attribute::Angle)?;
    if angle == 0.0 {
        return Err(Error::ZeroAngle {
            element: name.to_string(),
        });
    }
    let center = super::center(element)?;

    let tolerance = config.tolerance();
    let sign = angle.signum();
    let total = angle.abs();
    let radius = length / total;

    let half = match half_bend_angle {
        Some(degrees) => {
            let half = degrees.to_radians();
            if (2.0 * half - total).abs() > tolerance {
                return Err(Error::HalfAngleMismatch {
                    element: name.to_string(),
                    half_deg: degrees,
                    total_deg: total.to_degrees(),
                });
            }
            half
        }
        None => total / 2.0,
    };

    let mut cut_angles: Vec<f64> = cuts
        .angles()
        .iter()
        .map(|degrees| degrees.to_radians())
        .chain(cuts.lengths().iter().map(|arc| arc / radius))
        .collect();
    for &cut in &cut_angles {
        if cut <= 0.0 || cut > total + tolerance {
            return Err(Error::CutOutOfRange {
                element: name.to_string(),
                angle_deg: cut.to_degrees(),
                total_deg: total.to_degrees(),
            });
        }
    }
    cut_angles.push(half);
    cut_angles.push(total);
    cut_angles.sort_by(f64::total_cmp);
    let mut cut_angles = merge_cuts(cut_angles, half, total, tolerance);
    if let Some(last) = cut_angles.last_mut() {
        *last = total;
    }

    let instance = if name.contains(config.second_instance_tag()) {
        "2"
    } else {
        "1"
    };

    let mut out = Vec::with_capacity(2 * cut_angles.len());
    let mut previous = 0.0;
    let mut end = center - length / 2.0;
    let mut a_ports = 0;
    let mut b_ports = 0;

    for (i, &cut) in cut_angles.iter().enumerate() {
        let first = i == 0;
        let last = i + 1 == cut_angles.len();

        let width = cut - previous;
        let arc = width * radius;
        end += arc;
        let piece_center = end - arc / 2.0;
        previous = cut;

        let side = if (cut - half).abs() <= tolerance {
            Side::Middle
        } else if cut < half {
            Side::Entrance
        } else {
            Side::Exit
        };

        if !last {
            let port = match side {
                Side::Entrance => {
                    a_ports += 1;
                    format!("A{a_ports}")
                }
                Side::Middle => "M".to_string(),
                Side::Exit => {
                    b_ports += 1;
                    format!("B{b_ports}")
                }
            };
            let marker = Element::new(
                format!("{name}_P{instance}{port}"),
                ElementKind::new(Family::Marker),
            );
            out.push(placed_like(element, marker, end));
        }

        let mut kind = element.kind().clone();
        kind.set(Attribute::L, arc)?;
        kind.set(Attribute::Angle, sign * width)?;
        if !first && kind.get(Attribute::E1).is_some() {
            kind.set(Attribute::E1, 0.0)?;
        }
        if !last && kind.get(Attribute::E2).is_some() {
            kind.set(Attribute::E2, 0.0)?;
        }

        let piece_name = format!("{name}{}_{}", side.suffix(), degrees_label(cut.to_degrees()));
        trace!(name = piece_name.as_str(), length = arc, angle = sign * width; "Dipole piece");
        let piece = Element::new(piece_name, kind);
        out.push(placed_like(element, piece, piece_center).with_end_pos(end));
    }

    debug!(name, pieces = cut_angles.len(); "Split dipole");
    Ok(out)
}

/// Collapses sorted cuts that lie within `tolerance` of each other or that
/// would give their pieces the same name. Within a cluster the half and full
/// angle win over plan cuts.
fn merge_cuts(sorted: Vec<f64>, half: f64, total: f64, tolerance: f64) -> Vec<f64> {
    let mut merged: Vec<f64> = Vec::with_capacity(sorted.len());
    for cut in sorted {
        match merged.last_mut() {
            Some(kept)
                if (cut - *kept).abs() <= tolerance
                    || degrees_label(cut.to_degrees()) == degrees_label(kept.to_degrees()) =>
            {
                if cut == half || cut == total {
                    *kept = cut;
                } else {
                    trace!(cut, kept = *kept; "Cut merged into its neighbour");
                }
            }
            _ => merged.push(cut),
        }
    }
    merged
}

/// Which half of the magnet a cut falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Entrance,
    Middle,
    Exit,
}

impl Side {
    fn suffix(self) -> &'static str {
        match self {
            Side::Entrance => "1",
            Side::Middle => "M",
            Side::Exit => "2",
        }
    }
}

/// Places `row` at `center`, copying the sector and the presence of `at`
/// from `source`.
fn placed_like(source: &Element, row: Element, center: f64) -> Element {
    let mut row = row.with_pos(center);
    if source.at().is_some() {
        row = row.with_at(center);
    }
    if let Some(sector) = source.sector() {
        row = row.with_sector(sector);
    }
    row
}

/// `11.459155` -> `11p4592`, `5.0` -> `5p0`.
fn degrees_label(degrees: f64) -> String {
    let text = format!("{degrees:.4}");
    let trimmed = text.trim_end_matches('0');
    let text = if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    };
    text.replace('.', "p")
}


#[cfg(test)]
mod proptest_tests {
    use std::collections::HashSet;

    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn split_conserves_length_and_angle(
            length in 0.1f64..10.0,
            angle in 0.01f64..1.0,
            negative in any::<bool>(),
            percents in prop::collection::vec(1u32..100, 0..6),
        ) {
            let angle = if negative { -angle } else { angle };
            let mut kind = ElementKind::new(Family::Sbend);
            kind.set(Attribute::L, length).unwrap();
            kind.set(Attribute::Angle, angle).unwrap();
            let dipole = Element::new("B", kind).with_at(20.0);

            let total_deg = angle.abs().to_degrees();
            let cuts = DipoleCuts::from_angles(percents.iter().map(|&p| f64::from(p) / 100.0 * total_deg).collect());
            let plan = SplitPlan::new(None).with_dipole("B", cuts);

            let rows = split_dipoles(&[dipole], &plan, None, &SplitConfig::default()).unwrap();
            let pieces: Vec<&Element> = rows
                .iter()
                .filter(|row| row.family() == Some(Family::Sbend))
                .collect();

            let sum_length: f64 = pieces.iter().map(|p| p.length()).sum();
            let sum_angle: f64 = pieces.iter().filter_map(|p| p.number(Attribute::Angle)).sum();
            prop_assert!(approx_eq!(f64, sum_length, length, epsilon = 1e-9));
            prop_assert!(approx_eq!(f64, sum_angle, angle, epsilon = 1e-9));

            let last_end = pieces.last().and_then(|p| p.end_pos()).unwrap();
            prop_assert!(approx_eq!(f64, last_end, 20.0 + length / 2.0, epsilon = 1e-9));

            let unique: HashSet<&str> = rows.iter().map(Element::name).collect();
            prop_assert_eq!(unique.len(), rows.len());
        }
    }
}
