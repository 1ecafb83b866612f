//! Parser for structured JSON energy reports
//!
//! Produced by the energy-measurement step of the CI workflow:
//!
//! ```json
//! {
//!   "energy-total": { "value": 152340.0, "unit": "mJ" },
//!   "duration":     { "value": 5000 },
//!   "co2-total":    { "value": 0.0123, "unit": "g" },
//!   "cpu-avg":      { "value": 41.7 }
//! }
//! ```
//!
//! Without a `unit`, energy is taken as millijoules, duration as
//! milliseconds and CO2 as grams.

use super::units::{DurationUnit, EnergyUnit, MassUnit};
use super::{parse_f64, ParseError};
use crate::record::RunRecord;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct EcoReport {
    #[serde(rename = "energy-total")]
    energy_total: Option<Measurement>,
    duration: Option<Measurement>,
    #[serde(rename = "co2-total")]
    co2_total: Option<Measurement>,
    #[serde(rename = "cpu-avg")]
    cpu_avg: Option<Measurement>,
}

#[derive(Debug, Deserialize)]
struct Measurement {
    value: RawValue,
    #[serde(default)]
    unit: Option<String>,
}

/// Producers emit either JSON numbers or numeric strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
}

impl Measurement {
    fn value(&self, field: &'static str) -> Result<f64, ParseError> {
        match &self.value {
            RawValue::Number(v) if v.is_finite() && *v >= 0.0 => Ok(*v),
            RawValue::Number(v) => Err(ParseError::InvalidValue {
                field,
                reason: format!("{} is not a non-negative number", v),
            }),
            RawValue::Text(text) => parse_f64(field, text.trim()),
        }
    }
}

/// Parse one JSON energy report into a record
///
/// Strategy and round are not part of the document; the collect stage
/// takes them from the directory name.
pub fn parse_eco_report(path: &Path, content: &str) -> Result<RunRecord, ParseError> {
    let report: EcoReport = serde_json::from_str(content)?;
    let mut record = RunRecord::new(path);

    if let Some(energy) = &report.energy_total {
        let unit = match energy.unit.as_deref() {
            Some(unit) => EnergyUnit::parse(unit)?,
            None => EnergyUnit::Millijoule,
        };
        record.energy_j = Some(unit.to_canonical(energy.value("energy-total")?));
    }

    if let Some(duration) = &report.duration {
        let unit = match duration.unit.as_deref() {
            Some(unit) => DurationUnit::parse(unit)?,
            None => DurationUnit::Millisecond,
        };
        record.wall_time_s = Some(unit.to_canonical(duration.value("duration")?));
    }

    if let Some(co2) = &report.co2_total {
        let unit = match co2.unit.as_deref() {
            Some(unit) => MassUnit::parse(unit)?,
            None => MassUnit::Gram,
        };
        record.co2_g = Some(unit.to_canonical(co2.value("co2-total")?));
    }

    if let Some(cpu) = &report.cpu_avg {
        record.cpu_percent = Some(cpu.value("cpu-avg")?);
    }

    if record.is_blank() {
        return Err(ParseError::Unrecognized);
    }

    Ok(record)
}
