//! Unit normalization to one canonical unit per quantity
//!
//! Energy -> joules, duration -> seconds, mass -> grams.

use super::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyUnit {
    Joule,
    Millijoule,
}

impl EnergyUnit {
    pub fn parse(unit: &str) -> Result<Self, ParseError> {
        match unit.trim() {
            "J" | "j" | "joule" | "joules" => Ok(EnergyUnit::Joule),
            "mJ" | "mj" | "millijoule" | "millijoules" => Ok(EnergyUnit::Millijoule),
            other => Err(ParseError::UnknownUnit {
                kind: "energy",
                unit: other.to_string(),
            }),
        }
    }

    /// Value in joules
    pub fn to_canonical(self, value: f64) -> f64 {
        match self {
            EnergyUnit::Joule => value,
            EnergyUnit::Millijoule => value / 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Second,
    Millisecond,
}

impl DurationUnit {
    pub fn parse(unit: &str) -> Result<Self, ParseError> {
        match unit.trim().to_ascii_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Ok(DurationUnit::Second),
            "ms" | "msec" | "millisecond" | "milliseconds" => Ok(DurationUnit::Millisecond),
            other => Err(ParseError::UnknownUnit {
                kind: "duration",
                unit: other.to_string(),
            }),
        }
    }

    /// Value in seconds
    pub fn to_canonical(self, value: f64) -> f64 {
        match self {
            DurationUnit::Second => value,
            DurationUnit::Millisecond => value / 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MassUnit {
    Gram,
    Milligram,
}

impl MassUnit {
    pub fn parse(unit: &str) -> Result<Self, ParseError> {
        match unit.trim().to_ascii_lowercase().as_str() {
            "g" | "gram" | "grams" => Ok(MassUnit::Gram),
            "mg" | "milligram" | "milligrams" => Ok(MassUnit::Milligram),
            other => Err(ParseError::UnknownUnit {
                kind: "mass",
                unit: other.to_string(),
            }),
        }
    }

    /// Value in grams
    pub fn to_canonical(self, value: f64) -> f64 {
        match self {
            MassUnit::Gram => value,
            MassUnit::Milligram => value / 1000.0,
        }
    }
}
