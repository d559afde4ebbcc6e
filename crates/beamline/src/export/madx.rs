//! MADX sequence export.
//!
//! Writes one definition line per distinct element followed by a
//! `SEQUENCE ... ENDSEQUENCE;` block placing every row at its centre.
//! Placement positions are always written with six decimals.

use std::fmt::Write as _;

use log::{debug, warn};

use beamline_core::{
    attribute::Attribute,
    element::Element,
    lattice::Lattice,
    registry::{Dialect, Registry},
    value::Value,
};

use super::{Error, Exporter};

/// Exporter for MADX sequence files.
#[derive(Debug, Clone, Copy)]
pub struct MadxExporter<'a> {
    registry: &'a Registry,
}

impl<'a> MadxExporter<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Writes the definition lines of every distinct element.
    ///
    /// A lattice holding any row without a definition of its own
    /// ([`ElementKind::External`]) is a placement listing whose definitions
    /// live in another file. No definitions are written for it at all, since
    /// a source that defines some elements must define every placed one.
    ///
    /// [`ElementKind::External`]: beamline_core::element::ElementKind::External
    pub fn definitions(&self, lattice: &Lattice) -> Result<String, Error> {
        let mut text = String::new();

        let definitions = lattice.definitions();
        if let Some(external) = definitions.iter().find(|e| e.family().is_none()) {
            let dropped = definitions.iter().filter(|e| e.family().is_some()).count();
            if dropped > 0 {
                warn!(
                    external = external.name(),
                    dropped;
                    "Lattice places externally defined elements, definitions omitted"
                );
            }
            return Ok(text);
        }

        for element in definitions {
            let Some(family) = element.family() else {
                continue;
            };
            let schema = self.registry.schema(Dialect::Madx, family)?;

            let _ = write!(text, "{:16}: {:12}", element.name(), schema.name());
            for (attribute, value) in element.kind().attributes() {
                if !schema.allowed().contains(&attribute) {
                    continue;
                }
                let Some(name) = self.registry.attribute_name(Dialect::Madx, attribute) else {
                    continue;
                };
                let value = Self::format_value(value);
                if attribute == Attribute::NoCavityTotalpath {
                    let _ = write!(text, ", {name}={value}");
                } else {
                    let _ = write!(text, ", {name}:={value}");
                }
            }
            text.push_str(";\n");
        }

        Ok(text)
    }

    /// Writes the `SEQUENCE` block.
    pub fn sequence(&self, lattice: &Lattice) -> Result<String, Error> {
        let name = super::lattice_name(lattice)?;
        let mut text = format!("{}: SEQUENCE, L={:?};\n", name, lattice.length());

        for element in lattice.elements() {
            text.push_str(&placement(element)?);
        }
        text.push_str("ENDSEQUENCE;");

        Ok(text)
    }

    fn format_value(value: &Value) -> String {
        match value {
            Value::Number(_) => value.to_string(),
            Value::Text(text) => text.to_lowercase(),
        }
    }
}

impl Exporter for MadxExporter<'_> {
    fn dialect(&self) -> Dialect {
        Dialect::Madx
    }

    fn export(&self, lattice: &Lattice) -> Result<String, Error> {
        debug!(rows = lattice.len(); "Exporting MADX sequence");

        let mut text = self.definitions(lattice)?;
        text.push_str(&self.sequence(lattice)?);
        Ok(text)
    }
}

/// Writes a single placement line.
fn placement(element: &Element) -> Result<String, Error> {
    Ok(format!("{:11}, at = {:12.6};\n", element.name(), super::center(element)?))
}


#[cfg(test)]
mod proptest_tests {
    use beamline_core::{element::ElementKind, family::Family};
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    /// One row: family selector, length, strength, gap before it.
    type RowSeed = (usize, f64, f64, f64);

    fn row(index: usize, (selector, length, strength, _): RowSeed) -> Element {
        let (family, strength_attribute) = match selector {
            0 => (Family::Quadrupole, Some(Attribute::K1)),
            1 => (Family::Sbend, Some(Attribute::Angle)),
            2 => (Family::Sextupole, Some(Attribute::K2)),
            3 => (Family::Drift, None),
            4 => (Family::Monitor, None),
            _ => (Family::Marker, None),
        };
        let mut kind = ElementKind::new(family);
        if family != Family::Marker {
            kind.set(Attribute::L, length).unwrap();
        }
        if let Some(attribute) = strength_attribute {
            kind.set(attribute, strength).unwrap();
        }
        Element::new(format!("E{index}"), kind)
    }

    fn lattice(seeds: &[RowSeed], tail: f64) -> Lattice {
        let mut cursor = 0.0;
        let mut rows = Vec::with_capacity(seeds.len());
        for (index, &seed) in seeds.iter().enumerate() {
            let element = row(index, seed);
            let center = cursor + seed.3 + element.length() / 2.0;
            cursor = center + element.length() / 2.0;
            rows.push(element.with_at(center));
        }
        Lattice::new(Some("RING".to_string()), cursor + tail, rows).unwrap()
    }

    proptest! {
        #[test]
        fn exported_lattice_parses_back(
            seeds in prop::collection::vec((0usize..6, 0.0f64..5.0, -5.0f64..5.0, 0.0f64..2.0), 1..12),
            tail in 0.0f64..3.0,
        ) {
            let original = lattice(&seeds, tail);

            let text = MadxExporter::new(Registry::global()).export(&original).unwrap();
            let reparsed = beamline_parser::parse(&text).unwrap();

            prop_assert_eq!(reparsed.name(), original.name());
            prop_assert_eq!(reparsed.length(), original.length());
            prop_assert_eq!(reparsed.len(), original.len());
            for (left, right) in original.elements().iter().zip(reparsed.elements()) {
                prop_assert_eq!(left.name(), right.name());
                prop_assert_eq!(left.kind(), right.kind());
                let (a, b) = (left.center().unwrap(), right.center().unwrap());
                prop_assert!(approx_eq!(f64, a, b, epsilon = 1e-6), "{} vs {}", a, b);
            }
        }
    }
}
