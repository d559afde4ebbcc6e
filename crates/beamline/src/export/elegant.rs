//! Elegant lattice (`.lte`) export.
//!
//! Families and attributes are renamed through the registry. Attributes
//! Elegant has no equivalent for are left out rather than rejected. The
//! file ends with a `LINE` statement listing every row in table order.

use std::fmt::Write as _;

use log::{debug, trace};

use beamline_core::{
    lattice::Lattice,
    registry::{Dialect, Registry},
    value::Value,
};

use super::{Error, Exporter};

/// Exporter for Elegant lattice files.
#[derive(Debug, Clone, Copy)]
pub struct ElegantExporter<'a> {
    registry: &'a Registry,
}

impl<'a> ElegantExporter<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }
}

impl Exporter for ElegantExporter<'_> {
    fn dialect(&self) -> Dialect {
        Dialect::Elegant
    }

    fn export(&self, lattice: &Lattice) -> Result<String, Error> {
        let name = super::lattice_name(lattice)?;
        debug!(rows = lattice.len(); "Exporting Elegant lattice");

        let mut text = String::new();
        for element in lattice.definitions() {
            let Some(family) = element.family() else {
                trace!(name = element.name(); "Skipping external element");
                continue;
            };
            let schema = self.registry.schema(Dialect::Elegant, family)?;
            super::check_required(schema, element)?;

            let attributes: Vec<String> = element
                .kind()
                .attributes()
                .filter(|(attribute, _)| schema.allowed().contains(attribute))
                .filter_map(|(attribute, value)| {
                    let name = self.registry.attribute_name(Dialect::Elegant, attribute)?;
                    Some(match value {
                        Value::Number(n) => format!("{name}={n:16.12}"),
                        Value::Text(t) => format!("{name}={t:16}"),
                    })
                })
                .collect();

            if attributes.is_empty() {
                let _ = writeln!(text, "{:16}: {:12}", element.name(), schema.name());
            } else {
                let _ = writeln!(
                    text,
                    "{:16}: {:12}, {}",
                    element.name(),
                    schema.name(),
                    attributes.join(", ")
                );
            }
        }

        let line: Vec<&str> = lattice.elements().iter().map(|e| e.name()).collect();
        let _ = write!(text, "\n\n{}: LINE=({})", name, line.join(", "));

        Ok(text)
    }
}
