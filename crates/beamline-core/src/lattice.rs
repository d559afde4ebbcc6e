//! The lattice table.

use std::collections::HashMap;

use log::trace;

use crate::{element::Element, error::LatticeError, family::Family};

/// A named, ordered table of element rows.
///
/// Row order is placement order and is not necessarily sorted by position.
/// A name may occur on several rows only when every such row is a placement
/// of the same definition; the name is the join key between definition and
/// placements.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    name: Option<String>,
    length: f64,
    elements: Vec<Element>,
}

impl Lattice {
    /// Creates a lattice, checking the table invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::InvalidLength`] for a negative or non-finite
    /// length, and [`LatticeError::ConflictingDefinition`] when two rows share
    /// a name but differ in definition.
    pub fn new(
        name: Option<String>,
        length: f64,
        elements: Vec<Element>,
    ) -> Result<Self, LatticeError> {
        if !length.is_finite() || length < 0.0 {
            return Err(LatticeError::InvalidLength);
        }

        let mut seen: HashMap<&str, &Element> = HashMap::with_capacity(elements.len());
        for element in &elements {
            match seen.get(element.name()) {
                Some(first) if !first.same_definition(element) => {
                    return Err(LatticeError::ConflictingDefinition {
                        name: element.name().to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    seen.insert(element.name(), element);
                }
            }
        }

        trace!(name:?, length, rows = elements.len(); "Lattice created");

        Ok(Self {
            name,
            length,
            elements,
        })
    }

    /// Returns the lattice name; absent for a bare element list.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the total longitudinal extent.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Decomposes into `(name, length, rows)`.
    pub fn into_parts(self) -> (Option<String>, f64, Vec<Element>) {
        (self.name, self.length, self.elements)
    }

    /// Returns the first row named `name`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|element| element.name() == name)
    }

    /// Returns the rows of the given family, in table order.
    pub fn filter_family(&self, family: Family) -> impl Iterator<Item = &Element> {
        self.elements
            .iter()
            .filter(move |element| element.family() == Some(family))
    }

    /// Returns one row per distinct name, in order of first occurrence.
    pub fn definitions(&self) -> Vec<&Element> {
        let mut seen = HashMap::new();
        self.elements
            .iter()
            .filter(|element| seen.insert(element.name(), ()).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{attribute::Attribute, element::ElementKind};

    fn drift(name: &str, length: f64) -> Element {
        let mut kind = ElementKind::new(Family::Drift);
        kind.set(Attribute::L, length).unwrap();
        Element::new(name, kind)
    }

    fn marker(name: &str) -> Element {
        Element::new(name, ElementKind::new(Family::Marker))
    }

    #[test]
    fn test_repeated_placements_are_allowed() {
        let lattice = Lattice::new(
            Some("FODO".to_string()),
            4.0,
            vec![
                drift("D1", 1.0).with_at(0.5),
                marker("M"),
                drift("D1", 1.0).with_at(2.5),
            ],
        )
        .unwrap();

        assert_eq!(lattice.len(), 3);
        let names: Vec<_> = lattice.definitions().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["D1", "M"]);
    }

    #[test]
    fn test_conflicting_definitions_are_rejected() {
        let err = Lattice::new(None, 0.0, vec![drift("D1", 1.0), drift("D1", 2.0)]).unwrap_err();
        assert_eq!(
            err,
            LatticeError::ConflictingDefinition {
                name: "D1".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_length() {
        assert_eq!(
            Lattice::new(None, -1.0, vec![]).unwrap_err(),
            LatticeError::InvalidLength
        );
        assert_eq!(
            Lattice::new(None, f64::NAN, vec![]).unwrap_err(),
            LatticeError::InvalidLength
        );
    }

    #[test]
    fn test_find_and_filter_family() {
        let lattice = Lattice::new(
            None,
            0.0,
            vec![marker("START"), drift("D1", 1.0), marker("END")],
        )
        .unwrap();

        assert!(lattice.find("D1").is_some());
        assert!(lattice.find("QF").is_none());

        let markers: Vec<_> = lattice
            .filter_family(Family::Marker)
            .map(|e| e.name())
            .collect();
        assert_eq!(markers, vec!["START", "END"]);
    }

    #[test]
    fn test_into_parts() {
        let lattice = Lattice::new(Some("RING".to_string()), 10.0, vec![marker("M")]).unwrap();
        let (name, length, rows) = lattice.into_parts();
        assert_eq!(name.as_deref(), Some("RING"));
        assert_eq!(length, 10.0);
        assert_eq!(rows.len(), 1);
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use crate::{attribute::Attribute, element::ElementKind};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn definitions_collapse_repeated_placements(
            lengths in prop::collection::vec(0.1f64..5.0, 1..6),
            placements in prop::collection::vec(0usize..6, 0..24),
        ) {
            let templates: Vec<Element> = lengths
                .iter()
                .enumerate()
                .map(|(i, &length)| {
                    let mut kind = ElementKind::new(Family::Drift);
                    kind.set(Attribute::L, length).unwrap();
                    Element::new(format!("D{i}"), kind)
                })
                .collect();

            let rows: Vec<Element> = placements
                .iter()
                .enumerate()
                .map(|(n, &i)| templates[i % templates.len()].clone().with_at(n as f64))
                .collect();

            let mut distinct: Vec<&str> = rows.iter().map(|e| e.name()).collect();
            distinct.sort_unstable();
            distinct.dedup();

            let lattice = Lattice::new(None, 0.0, rows.clone()).unwrap();
            prop_assert_eq!(lattice.definitions().len(), distinct.len());
            prop_assert_eq!(lattice.elements(), rows.as_slice());
        }
    }
}
