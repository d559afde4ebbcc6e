//! Canonical attribute names.
//!
//! Canonical names follow the MADX spelling. Other dialects rename or drop
//! them through the [`Registry`](crate::registry::Registry).

use std::{fmt, str::FromStr};

use crate::error::SchemaError;

/// A canonical element attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    L,
    Angle,
    K1,
    K1s,
    K2,
    K2s,
    K3,
    K3s,
    E1,
    E2,
    Tilt,
    Fint,
    Fintx,
    Hgap,
    H,
    H1,
    H2,
    Kick,
    Hkick,
    Vkick,
    Volt,
    Lag,
    Freq,
    Harmon,
    NoCavityTotalpath,
}

impl Attribute {
    /// Every canonical attribute.
    pub const ALL: [Attribute; 25] = [
        Attribute::L,
        Attribute::Angle,
        Attribute::K1,
        Attribute::K1s,
        Attribute::K2,
        Attribute::K2s,
        Attribute::K3,
        Attribute::K3s,
        Attribute::E1,
        Attribute::E2,
        Attribute::Tilt,
        Attribute::Fint,
        Attribute::Fintx,
        Attribute::Hgap,
        Attribute::H,
        Attribute::H1,
        Attribute::H2,
        Attribute::Kick,
        Attribute::Hkick,
        Attribute::Vkick,
        Attribute::Volt,
        Attribute::Lag,
        Attribute::Freq,
        Attribute::Harmon,
        Attribute::NoCavityTotalpath,
    ];

    /// Returns the canonical, upper-case spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::L => "L",
            Attribute::Angle => "ANGLE",
            Attribute::K1 => "K1",
            Attribute::K1s => "K1S",
            Attribute::K2 => "K2",
            Attribute::K2s => "K2S",
            Attribute::K3 => "K3",
            Attribute::K3s => "K3S",
            Attribute::E1 => "E1",
            Attribute::E2 => "E2",
            Attribute::Tilt => "TILT",
            Attribute::Fint => "FINT",
            Attribute::Fintx => "FINTX",
            Attribute::Hgap => "HGAP",
            Attribute::H => "H",
            Attribute::H1 => "H1",
            Attribute::H2 => "H2",
            Attribute::Kick => "KICK",
            Attribute::Hkick => "HKICK",
            Attribute::Vkick => "VKICK",
            Attribute::Volt => "VOLT",
            Attribute::Lag => "LAG",
            Attribute::Freq => "FREQ",
            Attribute::Harmon => "HARMON",
            Attribute::NoCavityTotalpath => "NO_CAVITY_TOTALPATH",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive lookup of a canonical attribute name.
impl FromStr for Attribute {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Attribute::ALL
            .into_iter()
            .find(|attribute| attribute.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SchemaError::UnknownAttribute(s.to_string()))
    }
}
