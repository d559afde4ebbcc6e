//! Dialect mapping registry.
//!
//! The registry is the single source of truth for which attributes each
//! family carries in each target dialect, and how canonical family and
//! attribute names are spelled there. It is built once and only read
//! afterwards; [`Registry::global`] returns the process-wide instance while
//! [`Registry::new`] builds one for explicit injection.

use std::{collections::HashMap, fmt, str::FromStr, sync::OnceLock};

use log::debug;

use crate::{attribute::Attribute, error::SchemaError, family::Family};

/// A target simulator text format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Madx,
    Elegant,
    Tracy,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::Madx, Dialect::Elegant, Dialect::Tracy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Madx => "madx",
            Dialect::Elegant => "elegant",
            Dialect::Tracy => "tracy",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::ALL
            .into_iter()
            .find(|dialect| dialect.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown dialect `{s}`"))
    }
}

/// How a single family is expressed in a dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilySchema {
    name: &'static str,
    allowed: &'static [Attribute],
    required: &'static [Attribute],
}

impl FamilySchema {
    /// The dialect's spelling of the family.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Canonical attributes the dialect can express for this family.
    pub fn allowed(&self) -> &'static [Attribute] {
        self.allowed
    }

    /// Canonical attributes a row must carry to be emitted.
    pub fn required(&self) -> &'static [Attribute] {
        self.required
    }
}

#[derive(Debug, Default)]
struct DialectTable {
    families: HashMap<Family, FamilySchema>,
    attributes: HashMap<Attribute, &'static str>,
}

type FamilyRow = (Family, &'static str, &'static [Attribute], &'static [Attribute]);

const BEND_ELEGANT: &[Attribute] = &[
    Attribute::L,
    Attribute::Angle,
    Attribute::K1,
    Attribute::K2,
    Attribute::E1,
    Attribute::E2,
    Attribute::Tilt,
    Attribute::Fint,
    Attribute::Hgap,
    Attribute::H1,
    Attribute::H2,
];

const ELEGANT_FAMILIES: &[FamilyRow] = &[
    (Family::Marker, "MARK", &[], &[]),
    (Family::Drift, "DRIF", &[Attribute::L], &[]),
    (Family::Sbend, "CSBEND", BEND_ELEGANT, &[]),
    (Family::Rbend, "RBEN", BEND_ELEGANT, &[]),
    (Family::Quadrupole, "KQUAD", &[Attribute::L, Attribute::K1, Attribute::Tilt], &[]),
    (Family::Sextupole, "KSEXT", &[Attribute::L, Attribute::K2, Attribute::Tilt], &[]),
    (Family::Octupole, "KOCT", &[Attribute::L, Attribute::K3, Attribute::Tilt], &[]),
    (
        Family::Kicker,
        "KICKER",
        &[Attribute::L, Attribute::Hkick, Attribute::Vkick, Attribute::Tilt],
        &[],
    ),
    (Family::Hkicker, "HKICK", &[Attribute::L, Attribute::Kick, Attribute::Tilt], &[]),
    (Family::Vkicker, "VKICK", &[Attribute::L, Attribute::Kick, Attribute::Tilt], &[]),
    (
        Family::RfCavity,
        "RFCA",
        &[Attribute::L, Attribute::Volt, Attribute::Lag, Attribute::Freq],
        &[],
    ),
    (Family::Monitor, "MONI", &[Attribute::L], &[]),
];

const ELEGANT_ATTRIBUTES: &[(Attribute, &str)] = &[
    (Attribute::L, "L"),
    (Attribute::Angle, "ANGLE"),
    (Attribute::K1, "K1"),
    (Attribute::K2, "K2"),
    (Attribute::K3, "K3"),
    (Attribute::E1, "E1"),
    (Attribute::E2, "E2"),
    (Attribute::Tilt, "TILT"),
    (Attribute::Fint, "FINT"),
    (Attribute::Hgap, "HGAP"),
    (Attribute::H1, "H1"),
    (Attribute::H2, "H2"),
    (Attribute::Kick, "KICK"),
    (Attribute::Hkick, "HKICK"),
    (Attribute::Vkick, "VKICK"),
    (Attribute::Volt, "VOLT"),
    (Attribute::Lag, "PHASE"),
    (Attribute::Freq, "FREQ"),
];

const BEND_TRACY: &[Attribute] = &[
    Attribute::L,
    Attribute::Angle,
    Attribute::E1,
    Attribute::E2,
    Attribute::Tilt,
    Attribute::K1,
    Attribute::Hgap,
    Attribute::Fint,
];

const TRACY_FAMILIES: &[FamilyRow] = &[
    (Family::Marker, "Marker", &[], &[]),
    (Family::Drift, "Drift", &[Attribute::L], &[Attribute::L]),
    (Family::Sbend, "Bending", BEND_TRACY, &[Attribute::L, Attribute::Angle]),
    (Family::Rbend, "Bending", BEND_TRACY, &[Attribute::L, Attribute::Angle]),
    (Family::Quadrupole, "Quadrupole", &[Attribute::L, Attribute::K1, Attribute::Tilt], &[]),
    (Family::Sextupole, "Sextupole", &[Attribute::L, Attribute::K2, Attribute::Tilt], &[]),
    (Family::Hkicker, "Corrector", &[], &[]),
    (Family::Vkicker, "Corrector", &[], &[]),
    (
        Family::RfCavity,
        "Cavity",
        &[Attribute::L, Attribute::Volt, Attribute::Lag, Attribute::Freq],
        &[],
    ),
    (Family::Monitor, "Beam Position Monitor", &[], &[]),
];

const TRACY_ATTRIBUTES: &[(Attribute, &str)] = &[
    (Attribute::L, "L"),
    (Attribute::Angle, "T"),
    (Attribute::E1, "T1"),
    (Attribute::E2, "T2"),
    (Attribute::Tilt, "Roll"),
    (Attribute::K1, "K"),
    (Attribute::K2, "K"),
];

/// Immutable per-dialect family and attribute tables.
#[derive(Debug)]
pub struct Registry {
    tables: HashMap<Dialect, DialectTable>,
}

impl Registry {
    /// Builds the registry from the static dialect tables.
    pub fn new() -> Self {
        let mut madx = DialectTable::default();
        for family in Family::ALL {
            madx.families.insert(
                family,
                FamilySchema {
                    name: family.as_str(),
                    allowed: family.attributes(),
                    required: &[],
                },
            );
        }
        for attribute in Attribute::ALL {
            madx.attributes.insert(attribute, attribute.as_str());
        }

        let tables = HashMap::from([
            (Dialect::Madx, madx),
            (
                Dialect::Elegant,
                Self::table(ELEGANT_FAMILIES, ELEGANT_ATTRIBUTES),
            ),
            (Dialect::Tracy, Self::table(TRACY_FAMILIES, TRACY_ATTRIBUTES)),
        ]);

        debug!(dialects = tables.len(); "Mapping registry built");

        Self { tables }
    }

    fn table(families: &[FamilyRow], attributes: &[(Attribute, &'static str)]) -> DialectTable {
        DialectTable {
            families: families
                .iter()
                .map(|&(family, name, allowed, required)| {
                    (
                        family,
                        FamilySchema {
                            name,
                            allowed,
                            required,
                        },
                    )
                })
                .collect(),
            attributes: attributes.iter().copied().collect(),
        }
    }

    /// Returns the process-wide registry, building it on first use.
    pub fn global() -> &'static Registry {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        REGISTRY.get_or_init(Registry::new)
    }

    /// Returns how `family` is expressed in `dialect`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnsupportedFamily`] if the dialect has no
    /// equivalent of `family`.
    pub fn schema(&self, dialect: Dialect, family: Family) -> Result<&FamilySchema, SchemaError> {
        self.tables
            .get(&dialect)
            .and_then(|table| table.families.get(&family))
            .ok_or(SchemaError::UnsupportedFamily { dialect, family })
    }

    /// Canonical attributes `dialect` can express for `family`.
    pub fn allowed(&self, dialect: Dialect, family: Family) -> Result<&'static [Attribute], SchemaError> {
        self.schema(dialect, family).map(FamilySchema::allowed)
    }

    /// Attributes a row of `family` must carry to be emitted in `dialect`.
    pub fn required(&self, dialect: Dialect, family: Family) -> Result<&'static [Attribute], SchemaError> {
        self.schema(dialect, family).map(FamilySchema::required)
    }

    /// The dialect's spelling of `family`.
    pub fn family_name(&self, dialect: Dialect, family: Family) -> Result<&'static str, SchemaError> {
        self.schema(dialect, family).map(FamilySchema::name)
    }

    /// The dialect's spelling of `attribute`; `None` means the attribute is
    /// dropped when emitting that dialect.
    pub fn attribute_name(&self, dialect: Dialect, attribute: Attribute) -> Option<&'static str> {
        self.tables
            .get(&dialect)
            .and_then(|table| table.attributes.get(&attribute))
            .copied()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
