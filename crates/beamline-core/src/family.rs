//! Element families.

use std::{fmt, str::FromStr};

use crate::{attribute::Attribute, element, error::SchemaError};

/// The physical type of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    Marker,
    Drift,
    Sbend,
    Rbend,
    Dipedge,
    Quadrupole,
    Sextupole,
    Octupole,
    Kicker,
    Hkicker,
    Vkicker,
    RfCavity,
    Monitor,
}

impl Family {
    /// Every known family.
    pub const ALL: [Family; 13] = [
        Family::Marker,
        Family::Drift,
        Family::Sbend,
        Family::Rbend,
        Family::Dipedge,
        Family::Quadrupole,
        Family::Sextupole,
        Family::Octupole,
        Family::Kicker,
        Family::Hkicker,
        Family::Vkicker,
        Family::RfCavity,
        Family::Monitor,
    ];

    /// Returns the canonical, upper-case family name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Marker => "MARKER",
            Family::Drift => "DRIFT",
            Family::Sbend => "SBEND",
            Family::Rbend => "RBEND",
            Family::Dipedge => "DIPEDGE",
            Family::Quadrupole => "QUADRUPOLE",
            Family::Sextupole => "SEXTUPOLE",
            Family::Octupole => "OCTUPOLE",
            Family::Kicker => "KICKER",
            Family::Hkicker => "HKICKER",
            Family::Vkicker => "VKICKER",
            Family::RfCavity => "RFCAVITY",
            Family::Monitor => "MONITOR",
        }
    }

    /// Returns the canonical attributes this family accepts, in emission order.
    pub fn attributes(&self) -> &'static [Attribute] {
        match self {
            Family::Marker => element::Marker::ATTRIBUTES,
            Family::Drift => element::Drift::ATTRIBUTES,
            Family::Sbend | Family::Rbend => element::Bend::ATTRIBUTES,
            Family::Dipedge => element::Dipedge::ATTRIBUTES,
            Family::Quadrupole => element::Quadrupole::ATTRIBUTES,
            Family::Sextupole => element::Sextupole::ATTRIBUTES,
            Family::Octupole => element::Octupole::ATTRIBUTES,
            Family::Kicker => element::Kicker::ATTRIBUTES,
            Family::Hkicker | Family::Vkicker => element::Corrector::ATTRIBUTES,
            Family::RfCavity => element::RfCavity::ATTRIBUTES,
            Family::Monitor => element::Monitor::ATTRIBUTES,
        }
    }

    /// Returns `true` if `attribute` belongs to this family.
    pub fn allows(&self, attribute: Attribute) -> bool {
        self.attributes().contains(&attribute)
    }

    /// Returns `true` for bending magnets.
    pub fn is_bend(&self) -> bool {
        matches!(self, Family::Sbend | Family::Rbend)
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive lookup of a canonical family name.
impl FromStr for Family {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Family::ALL
            .into_iter()
            .find(|family| family.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SchemaError::UnknownFamily(s.to_string()))
    }
}
