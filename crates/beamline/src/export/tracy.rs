//! Tracy lattice export.
//!
//! Tracy does not share the MADX units: angles are written in degrees, the
//! cavity takes hertz, volts and a phase in degrees, and the dipole fringe
//! field is a single `Gap` value. Each family therefore has its own
//! template instead of a rename table.

use std::fmt::Write as _;

use log::{debug, trace};

use beamline_core::{
    SchemaError,
    attribute::Attribute,
    element::Element,
    family::Family,
    lattice::Lattice,
    registry::{Dialect, Registry},
};

use super::{Error, Exporter};
use crate::config::ExportConfig;

/// Integration method written on thick magnets (4th order symplectic).
const METHOD: u32 = 4;

/// Exporter for Tracy lattice files.
#[derive(Debug, Clone, Copy)]
pub struct TracyExporter<'a> {
    registry: &'a Registry,
    config: &'a ExportConfig,
}

impl<'a> TracyExporter<'a> {
    pub fn new(registry: &'a Registry, config: &'a ExportConfig) -> Self {
        Self { registry, config }
    }

    /// Builds the element line for one definition.
    fn element_line(&self, element: &Element, family: Family) -> Result<String, Error> {
        let schema = self.registry.schema(Dialect::Tracy, family)?;
        super::check_required(schema, element)?;

        let mut fields = vec![schema.name().to_string()];
        match family {
            Family::Marker | Family::Monitor => {}
            Family::Drift => {
                fields.push(format!("L = {}", num(super::required(element, Attribute::L)?)));
            }
            Family::Sbend | Family::Rbend => {
                fields.push(format!("L = {}", num(super::required(element, Attribute::L)?)));
                fields.push(format!(
                    "T = {}",
                    num(super::required(element, Attribute::Angle)?.to_degrees())
                ));
                self.push_degrees(&mut fields, element, Attribute::E1)?;
                self.push_degrees(&mut fields, element, Attribute::E2)?;
                self.push_degrees(&mut fields, element, Attribute::Tilt)?;

                let hgap = super::number(element, Attribute::Hgap)?;
                let fint = super::number(element, Attribute::Fint)?;
                if let (Some(hgap), Some(fint)) = (hgap, fint) {
                    fields.push(format!("Gap = {}", num(4.0 * hgap * fint)));
                }
                if let Some(k1) = super::number(element, Attribute::K1)? {
                    fields.push(format!("K = {}", num(k1)));
                }
                self.push_integration(&mut fields);
            }
            Family::Quadrupole | Family::Sextupole => {
                if let Some(l) = super::number(element, Attribute::L)? {
                    fields.push(format!("L = {}", num(l)));
                }
                let strength = if family == Family::Quadrupole {
                    super::number(element, Attribute::K1)?
                } else {
                    super::number(element, Attribute::K2)?.map(|k2| k2 / 2.0)
                };
                if let Some(k) = strength {
                    fields.push(format!("K = {}", num(k)));
                }
                self.push_degrees(&mut fields, element, Attribute::Tilt)?;
                self.push_integration(&mut fields);
            }
            Family::Hkicker => fields.push("horizontal".to_string()),
            Family::Vkicker => fields.push("vertical".to_string()),
            Family::RfCavity => {
                let l = super::number(element, Attribute::L)?.unwrap_or(0.0);
                let freq = super::number(element, Attribute::Freq)?.unwrap_or(0.0);
                let volt = super::number(element, Attribute::Volt)?.unwrap_or(0.0);
                let lag = super::number(element, Attribute::Lag)?.unwrap_or(0.0);
                fields.push(format!("L = {}", num(l)));
                fields.push(format!("Frequency = {}", num(freq * 1e6)));
                fields.push(format!("Voltage = {}", num(volt * 1e6)));
                fields.push(format!("phi = {}", num(lag * 360.0)));
            }
            Family::Dipedge | Family::Octupole | Family::Kicker => {
                return Err(SchemaError::UnsupportedFamily {
                    dialect: Dialect::Tracy,
                    family,
                }
                .into());
            }
        }

        Ok(format!("{}: {};\n", element.name(), fields.join(", ")))
    }

    fn push_degrees(
        &self,
        fields: &mut Vec<String>,
        element: &Element,
        attribute: Attribute,
    ) -> Result<(), Error> {
        let Some(name) = self.registry.attribute_name(Dialect::Tracy, attribute) else {
            return Ok(());
        };
        if let Some(radians) = super::number(element, attribute)? {
            fields.push(format!("{name} = {}", num(radians.to_degrees())));
        }
        Ok(())
    }

    fn push_integration(&self, fields: &mut Vec<String>) {
        fields.push(format!("N = {}", self.config.tracy_integration_steps()));
        fields.push(format!("Method = {METHOD}"));
    }

    /// Writes `name: e1, e2, ...;` wrapped so no line exceeds the configured
    /// width, unless a single name is longer.
    fn ring_line(&self, name: &str, elements: &[Element]) -> String {
        let width = self.config.tracy_line_width();
        let mut text = format!("{name}:");
        let mut column = text.len();

        for (i, element) in elements.iter().enumerate() {
            let last = i + 1 == elements.len();
            let item = element.name();
            let needed = 1 + item.len() + 1;

            if column + needed > width && column > 0 {
                text.push('\n');
                column = 0;
            } else {
                text.push(' ');
                column += 1;
            }
            text.push_str(item);
            text.push(if last { ';' } else { ',' });
            column += item.len() + 1;
        }
        if elements.is_empty() {
            text.push(';');
        }

        text
    }
}

/// Formats a number the way Tracy reads it back.
fn num(value: f64) -> String {
    format!("{value:?}")
}

impl Exporter for TracyExporter<'_> {
    fn dialect(&self) -> Dialect {
        Dialect::Tracy
    }

    fn export(&self, lattice: &Lattice) -> Result<String, Error> {
        let name = super::lattice_name(lattice)?;
        debug!(rows = lattice.len(); "Exporting Tracy lattice");

        let mut text = String::new();
        for element in lattice.definitions() {
            let Some(family) = element.family() else {
                trace!(name = element.name(); "Skipping external element");
                continue;
            };
            text.push_str(&self.element_line(element, family)?);
        }

        let _ = write!(
            text,
            "\n{}\n\nring: {};\ncell: ring, symmetry=1;\nend;",
            self.ring_line(name, lattice.elements()),
            name
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use beamline_core::element::ElementKind;

    use super::*;

    fn element(name: &str, family: Family, attributes: &[(Attribute, f64)]) -> Element {
        let mut kind = ElementKind::new(family);
        for &(attribute, value) in attributes {
            kind.set(attribute, value).unwrap();
        }
        Element::new(name, kind)
    }

    fn export(elements: Vec<Element>) -> Result<String, Error> {
        let lattice = Lattice::new(Some("CELL".to_string()), 10.0, elements).unwrap();
        let config = ExportConfig::default();
        TracyExporter::new(Registry::global(), &config).export(&lattice)
    }

    #[test]
    fn test_simple_families() {
        let text = export(vec![
            element("M", Family::Marker, &[]),
            element("BPM", Family::Monitor, &[]),
            element("D1", Family::Drift, &[(Attribute::L, 1.5)]),
            element("CH", Family::Hkicker, &[]),
            element("CV", Family::Vkicker, &[]),
        ])
        .unwrap();

        assert!(text.starts_with(
            "M: Marker;\n\
             BPM: Beam Position Monitor;\n\
             D1: Drift, L = 1.5;\n\
             CH: Corrector, horizontal;\n\
             CV: Corrector, vertical;\n\
             \n\
             CELL: M, BPM, D1, CH, CV;\n\
             \n\
             ring: CELL;\n\
             cell: ring, symmetry=1;\n\
             end;"
        ));
    }

    #[test]
    fn test_bending_converts_to_degrees() {
        let text = export(vec![element(
            "B",
            Family::Sbend,
            &[
                (Attribute::L, 1.0),
                (Attribute::Angle, PI / 18.0),
                (Attribute::E1, PI / 36.0),
                (Attribute::Hgap, 0.025),
                (Attribute::Fint, 0.5),
                (Attribute::K1, -0.2),
            ],
        )])
        .unwrap();

        let line = text.lines().next().unwrap();
        assert!(line.starts_with("B: Bending, L = 1.0, T = 10"));
        assert!(line.contains(", T1 = 5"));
        assert!(!line.contains("T2"));
        assert!(line.contains(", Gap = 0.05"));
        assert!(line.ends_with(", K = -0.2, N = 10, Method = 4;"));
    }

    #[test]
    fn test_gap_needs_both_hgap_and_fint() {
        let text = export(vec![element(
            "B",
            Family::Rbend,
            &[(Attribute::L, 1.0), (Attribute::Angle, 0.1), (Attribute::Hgap, 0.02)],
        )])
        .unwrap();
        assert!(!text.contains("Gap"));
    }

    #[test]
    fn test_magnets() {
        let text = export(vec![
            element("QF", Family::Quadrupole, &[(Attribute::L, 0.5), (Attribute::K1, 1.2)]),
            element("SF", Family::Sextupole, &[(Attribute::L, 0.2), (Attribute::K2, 30.0)]),
        ])
        .unwrap();

        assert!(text.contains("QF: Quadrupole, L = 0.5, K = 1.2, N = 10, Method = 4;\n"));
        assert!(text.contains("SF: Sextupole, L = 0.2, K = 15.0, N = 10, Method = 4;\n"));
    }

    #[test]
    fn test_cavity_units_and_defaults() {
        let text = export(vec![element(
            "CAV",
            Family::RfCavity,
            &[(Attribute::Freq, 500.0), (Attribute::Volt, 1.5), (Attribute::Lag, 0.5)],
        )])
        .unwrap();

        assert!(text.starts_with(
            "CAV: Cavity, L = 0.0, Frequency = 500000000.0, Voltage = 1500000.0, phi = 180.0;\n"
        ));
    }

    #[test]
    fn test_missing_required_attribute() {
        let err = export(vec![element("B", Family::Sbend, &[(Attribute::L, 1.0)])]).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingAttribute { ref element, attribute: Attribute::Angle } if element == "B"
        ));
    }

    #[test]
    fn test_unsupported_families() {
        for family in [Family::Dipedge, Family::Octupole, Family::Kicker] {
            let err = export(vec![element("X", family, &[])]).unwrap_err();
            assert!(matches!(err, Error::Schema(_)), "{family} should be rejected");
        }
    }

    #[test]
    fn test_ring_line_wraps() {
        let names: Vec<Element> = (0..30)
            .map(|i| element(&format!("MARKER{i:02}"), Family::Marker, &[]))
            .collect();
        let config = ExportConfig::new(10, 40);
        let exporter = TracyExporter::new(Registry::global(), &config);

        let line = exporter.ring_line("CELL", &names);

        assert!(line.lines().count() > 1);
        assert!(line.lines().all(|l| l.len() <= 40));
        assert!(line.starts_with("CELL: MARKER00,"));
        assert!(line.ends_with("MARKER29;"));
    }
}
