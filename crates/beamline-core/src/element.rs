//! Element rows.
//!
//! An [`Element`] is one row of a lattice table. Its physics attributes live
//! in an [`ElementKind`], a closed sum over families where each variant holds
//! only the attributes that apply to that family. Asking a quadrupole for its
//! bend angle is therefore answered by the type, not by a runtime lookup of a
//! missing key.

use crate::{attribute::Attribute, error::SchemaError, family::Family, value::Value};

/// Uniform access to a family's attribute fields.
trait Fields {
    fn attributes(&self) -> &'static [Attribute];
    fn slot(&self, attribute: Attribute) -> Option<&Option<Value>>;
    fn slot_mut(&mut self, attribute: Attribute) -> Option<&mut Option<Value>>;
}

/// Generates a field struct with one optional value per attribute.
///
/// The listed order is the order in which attributes are emitted.
macro_rules! attribute_fields {
    ($(#[$meta:meta])* $name:ident { $($field:ident => $attr:ident),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            $(pub $field: Option<Value>,)*
        }

        impl $name {
            /// Attributes accepted by this family, in emission order.
            pub const ATTRIBUTES: &'static [Attribute] = &[$(Attribute::$attr),*];
        }

        impl Fields for $name {
            fn attributes(&self) -> &'static [Attribute] {
                Self::ATTRIBUTES
            }

            #[allow(unused_variables)]
            fn slot(&self, attribute: Attribute) -> Option<&Option<Value>> {
                match attribute {
                    $(Attribute::$attr => Some(&self.$field),)*
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }

            #[allow(unused_variables)]
            fn slot_mut(&mut self, attribute: Attribute) -> Option<&mut Option<Value>> {
                match attribute {
                    $(Attribute::$attr => Some(&mut self.$field),)*
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }
        }
    };
}

attribute_fields! {
    /// A zero-length marker.
    Marker {}
}

attribute_fields! {
    /// A field-free drift space.
    Drift { l => L }
}

attribute_fields! {
    /// A beam position monitor.
    Monitor { l => L }
}

attribute_fields! {
    /// A sector or rectangular bending magnet.
    Bend {
        l => L,
        angle => Angle,
        k1 => K1,
        k2 => K2,
        e1 => E1,
        e2 => E2,
        tilt => Tilt,
        fint => Fint,
        fintx => Fintx,
        hgap => Hgap,
        h1 => H1,
        h2 => H2,
    }
}

attribute_fields! {
    /// A thin dipole edge.
    Dipedge {
        h => H,
        e1 => E1,
        fint => Fint,
        hgap => Hgap,
        tilt => Tilt,
    }
}

attribute_fields! {
    /// A quadrupole magnet.
    Quadrupole { l => L, k1 => K1, k1s => K1s, tilt => Tilt }
}

attribute_fields! {
    /// A sextupole magnet.
    Sextupole { l => L, k2 => K2, k2s => K2s, tilt => Tilt }
}

attribute_fields! {
    /// An octupole magnet.
    Octupole { l => L, k3 => K3, k3s => K3s, tilt => Tilt }
}

attribute_fields! {
    /// A combined horizontal and vertical orbit kicker.
    Kicker { l => L, hkick => Hkick, vkick => Vkick, tilt => Tilt }
}

attribute_fields! {
    /// A single-plane orbit corrector.
    Corrector { l => L, kick => Kick, tilt => Tilt }
}

attribute_fields! {
    /// An RF cavity.
    RfCavity {
        l => L,
        volt => Volt,
        lag => Lag,
        freq => Freq,
        harmon => Harmon,
        no_cavity_totalpath => NoCavityTotalpath,
    }
}

/// The family and physics attributes of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Marker(Marker),
    Drift(Drift),
    Sbend(Bend),
    Rbend(Bend),
    Dipedge(Dipedge),
    Quadrupole(Quadrupole),
    Sextupole(Sextupole),
    Octupole(Octupole),
    Kicker(Kicker),
    Hkicker(Corrector),
    Vkicker(Corrector),
    RfCavity(RfCavity),
    Monitor(Monitor),
    /// A placement whose definition is held outside the lattice source.
    External,
}

impl ElementKind {
    /// Creates an element kind of `family` with no attributes set.
    pub fn new(family: Family) -> Self {
        match family {
            Family::Marker => Self::Marker(Marker::default()),
            Family::Drift => Self::Drift(Drift::default()),
            Family::Sbend => Self::Sbend(Bend::default()),
            Family::Rbend => Self::Rbend(Bend::default()),
            Family::Dipedge => Self::Dipedge(Dipedge::default()),
            Family::Quadrupole => Self::Quadrupole(Quadrupole::default()),
            Family::Sextupole => Self::Sextupole(Sextupole::default()),
            Family::Octupole => Self::Octupole(Octupole::default()),
            Family::Kicker => Self::Kicker(Kicker::default()),
            Family::Hkicker => Self::Hkicker(Corrector::default()),
            Family::Vkicker => Self::Vkicker(Corrector::default()),
            Family::RfCavity => Self::RfCavity(RfCavity::default()),
            Family::Monitor => Self::Monitor(Monitor::default()),
        }
    }

    /// Returns the family, or `None` for [`ElementKind::External`].
    pub fn family(&self) -> Option<Family> {
        let family = match self {
            Self::Marker(_) => Family::Marker,
            Self::Drift(_) => Family::Drift,
            Self::Sbend(_) => Family::Sbend,
            Self::Rbend(_) => Family::Rbend,
            Self::Dipedge(_) => Family::Dipedge,
            Self::Quadrupole(_) => Family::Quadrupole,
            Self::Sextupole(_) => Family::Sextupole,
            Self::Octupole(_) => Family::Octupole,
            Self::Kicker(_) => Family::Kicker,
            Self::Hkicker(_) => Family::Hkicker,
            Self::Vkicker(_) => Family::Vkicker,
            Self::RfCavity(_) => Family::RfCavity,
            Self::Monitor(_) => Family::Monitor,
            Self::External => return None,
        };
        Some(family)
    }

    fn fields(&self) -> Option<&dyn Fields> {
        match self {
            Self::Marker(f) => Some(f),
            Self::Drift(f) => Some(f),
            Self::Sbend(f) | Self::Rbend(f) => Some(f),
            Self::Dipedge(f) => Some(f),
            Self::Quadrupole(f) => Some(f),
            Self::Sextupole(f) => Some(f),
            Self::Octupole(f) => Some(f),
            Self::Kicker(f) => Some(f),
            Self::Hkicker(f) | Self::Vkicker(f) => Some(f),
            Self::RfCavity(f) => Some(f),
            Self::Monitor(f) => Some(f),
            Self::External => None,
        }
    }

    fn fields_mut(&mut self) -> Option<&mut dyn Fields> {
        match self {
            Self::Marker(f) => Some(f),
            Self::Drift(f) => Some(f),
            Self::Sbend(f) | Self::Rbend(f) => Some(f),
            Self::Dipedge(f) => Some(f),
            Self::Quadrupole(f) => Some(f),
            Self::Sextupole(f) => Some(f),
            Self::Octupole(f) => Some(f),
            Self::Kicker(f) => Some(f),
            Self::Hkicker(f) | Self::Vkicker(f) => Some(f),
            Self::RfCavity(f) => Some(f),
            Self::Monitor(f) => Some(f),
            Self::External => None,
        }
    }

    /// Returns the value of `attribute`, if set.
    pub fn get(&self, attribute: Attribute) -> Option<&Value> {
        self.fields()?.slot(attribute)?.as_ref()
    }

    /// Returns the numeric value of `attribute`, if set and numeric.
    pub fn number(&self, attribute: Attribute) -> Option<f64> {
        self.get(attribute).and_then(Value::as_number)
    }

    /// Sets `attribute` to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::AttributeNotAllowed`] if the family does not
    /// accept `attribute`, or [`SchemaError::NoDefinition`] for an external
    /// element.
    pub fn set(&mut self, attribute: Attribute, value: impl Into<Value>) -> Result<(), SchemaError> {
        let Some(family) = self.family() else {
            return Err(SchemaError::NoDefinition(attribute));
        };
        let slot = self
            .fields_mut()
            .and_then(|fields| fields.slot_mut(attribute))
            .ok_or(SchemaError::AttributeNotAllowed { family, attribute })?;
        *slot = Some(value.into());
        Ok(())
    }

    /// Clears `attribute`, returning its previous value.
    pub fn remove(&mut self, attribute: Attribute) -> Option<Value> {
        self.fields_mut()?.slot_mut(attribute)?.take()
    }

    /// Iterates over the set attributes in the family's emission order.
    pub fn attributes(&self) -> impl Iterator<Item = (Attribute, &Value)> {
        let fields = self.fields();
        fields
            .map(|f| f.attributes())
            .unwrap_or_default()
            .iter()
            .filter_map(move |&attribute| {
                let value = fields?.slot(attribute)?.as_ref()?;
                Some((attribute, value))
            })
    }
}

/// One row of a lattice table.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    kind: ElementKind,
    pos: Option<f64>,
    at: Option<f64>,
    sector: Option<String>,
    end_pos: Option<f64>,
}

impl Element {
    /// Creates an unplaced element.
    pub fn new(name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            name: name.into(),
            kind,
            pos: None,
            at: None,
            sector: None,
            end_pos: None,
        }
    }

    /// Sets the centre position.
    pub fn with_pos(mut self, pos: f64) -> Self {
        self.pos = Some(pos);
        self
    }

    /// Sets the sequence placement reference.
    pub fn with_at(mut self, at: f64) -> Self {
        self.at = Some(at);
        self
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_end_pos(mut self, end_pos: f64) -> Self {
        self.end_pos = Some(end_pos);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ElementKind {
        &mut self.kind
    }

    pub fn family(&self) -> Option<Family> {
        self.kind.family()
    }

    pub fn pos(&self) -> Option<f64> {
        self.pos
    }

    pub fn at(&self) -> Option<f64> {
        self.at
    }

    pub fn sector(&self) -> Option<&str> {
        self.sector.as_deref()
    }

    pub fn end_pos(&self) -> Option<f64> {
        self.end_pos
    }

    /// Returns the value of `attribute`, if set.
    pub fn get(&self, attribute: Attribute) -> Option<&Value> {
        self.kind.get(attribute)
    }

    /// Returns the numeric value of `attribute`, if set and numeric.
    pub fn number(&self, attribute: Attribute) -> Option<f64> {
        self.kind.number(attribute)
    }

    /// Sets `attribute`; see [`ElementKind::set`].
    pub fn set(&mut self, attribute: Attribute, value: impl Into<Value>) -> Result<(), SchemaError> {
        self.kind.set(attribute, value)
    }

    /// Returns the numeric length, zero when absent or symbolic.
    pub fn length(&self) -> f64 {
        self.number(Attribute::L).unwrap_or(0.0)
    }

    /// Returns the centre position: `pos`, falling back to `at`.
    pub fn center(&self) -> Option<f64> {
        self.pos.or(self.at)
    }

    /// Moves the element so its centre sits at `center`.
    ///
    /// `at` is shifted by the same offset when present so that both
    /// positional fields stay consistent.
    pub fn set_center(&mut self, center: f64) {
        if let Some(at) = self.at {
            let offset = at - self.center().unwrap_or(at);
            self.at = Some(center + offset);
        }
        self.pos = Some(center);
    }

    /// Returns the upstream edge, `center - L/2`.
    pub fn start(&self) -> Option<f64> {
        self.center().map(|center| center - self.length() / 2.0)
    }

    /// Returns the downstream edge, `center + L/2`.
    pub fn end(&self) -> Option<f64> {
        self.center().map(|center| center + self.length() / 2.0)
    }

    /// Returns `true` if both rows are placements of the same definition.
    pub fn same_definition(&self, other: &Element) -> bool {
        self.name == other.name && self.kind == other.kind
    }

    /// Returns a copy stripped of positional and bookkeeping columns.
    pub fn definition(&self) -> Element {
        Element::new(self.name.clone(), self.kind.clone())
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn quadrupole() -> Element {
        let mut kind = ElementKind::new(Family::Quadrupole);
        kind.set(Attribute::L, 0.5).unwrap();
        kind.set(Attribute::K1, 1.2).unwrap();
        Element::new("QF", kind)
    }

    #[test]
    fn test_set_and_get() {
        let element = quadrupole();
        assert_eq!(element.number(Attribute::L), Some(0.5));
        assert_eq!(element.get(Attribute::K1), Some(&Value::Number(1.2)));
        assert_eq!(element.get(Attribute::Tilt), None);
        assert_eq!(element.get(Attribute::Angle), None);
    }

    #[test]
    fn test_set_attribute_not_allowed() {
        let mut element = quadrupole();
        let err = element.set(Attribute::Angle, 0.1).unwrap_err();
        assert_eq!(
            err,
            SchemaError::AttributeNotAllowed {
                family: Family::Quadrupole,
                attribute: Attribute::Angle,
            }
        );
    }

    #[test]
    fn test_external_has_no_attributes() {
        let mut kind = ElementKind::External;
        assert_eq!(kind.family(), None);
        assert_eq!(kind.attributes().count(), 0);
        assert_eq!(
            kind.set(Attribute::L, 1.0),
            Err(SchemaError::NoDefinition(Attribute::L))
        );
    }

    #[test]
    fn test_attributes_follow_emission_order() {
        let mut kind = ElementKind::new(Family::Sbend);
        kind.set(Attribute::E1, 0.05).unwrap();
        kind.set(Attribute::L, 2.0).unwrap();
        kind.set(Attribute::Angle, 0.1).unwrap();

        let names: Vec<_> = kind.attributes().map(|(a, _)| a).collect();
        assert_eq!(names, vec![Attribute::L, Attribute::Angle, Attribute::E1]);
    }

    #[test]
    fn test_remove_attribute() {
        let mut element = quadrupole();
        assert_eq!(
            element.kind_mut().remove(Attribute::K1),
            Some(Value::Number(1.2))
        );
        assert_eq!(element.get(Attribute::K1), None);
    }

    #[test]
    fn test_hkicker_and_vkicker_are_distinct_families() {
        let h = ElementKind::new(Family::Hkicker);
        let v = ElementKind::new(Family::Vkicker);
        assert_eq!(h.family(), Some(Family::Hkicker));
        assert_eq!(v.family(), Some(Family::Vkicker));
        assert_ne!(h, v);
    }

    #[test]
    fn test_center_prefers_pos() {
        let element = quadrupole().with_at(3.0);
        assert_eq!(element.center(), Some(3.0));

        let element = element.with_pos(3.25);
        assert_eq!(element.center(), Some(3.25));
        assert_eq!(element.start(), Some(3.0));
        assert_eq!(element.end(), Some(3.5));
    }

    #[test]
    fn test_edges_of_short_element() {
        let mut kind = ElementKind::new(Family::Sextupole);
        kind.set(Attribute::L, 0.2).unwrap();
        let element = Element::new("SF", kind).with_at(0.1);

        assert_approx_eq!(f64, element.start().unwrap(), 0.0, epsilon = 1e-15);
        assert_approx_eq!(f64, element.end().unwrap(), 0.2, epsilon = 1e-15);
    }

    #[test]
    fn test_set_center_keeps_at_consistent() {
        let mut element = quadrupole().with_at(2.0).with_pos(2.25);
        element.set_center(5.25);
        assert_eq!(element.pos(), Some(5.25));
        assert_eq!(element.at(), Some(5.0));

        let mut unplaced = quadrupole();
        unplaced.set_center(1.0);
        assert_eq!(unplaced.pos(), Some(1.0));
        assert_eq!(unplaced.at(), None);
    }

    #[test]
    fn test_same_definition_ignores_position() {
        let a = quadrupole().with_at(1.0);
        let b = quadrupole().with_at(7.0);
        assert!(a.same_definition(&b));

        let mut c = quadrupole();
        c.set(Attribute::K1, -1.2).unwrap();
        assert!(!a.same_definition(&c));
    }

    #[test]
    fn test_definition_drops_positions() {
        let element = quadrupole().with_at(1.0).with_pos(1.0).with_sector("S1");
        let definition = element.definition();
        assert_eq!(definition.center(), None);
        assert_eq!(definition.sector(), None);
        assert!(definition.same_definition(&element));
    }
}
