//! Metrics parsers
//!
//! Turn one unstructured report into a `RunRecord`:
//! - `time_report`: text captured from `/usr/bin/time -v` plus pytest output
//! - `eco_report`: structured JSON energy report
//! - `log_scan`: free-form CI log text (best effort)
//!
//! A field whose pattern is not found is absent from the record. Only a
//! completely unrecognized document or a malformed number is an error.

mod eco_report;
mod log_scan;
mod time_report;
mod units;

pub use eco_report::parse_eco_report;
pub use log_scan::{LogMetrics, LogScanner};
pub use time_report::{FieldExtractor, Occurrence, TimeField, TimeReportParser};
pub use units::{DurationUnit, EnergyUnit, MassUnit};

use thiserror::Error;

/// Errors that cause a report file to be skipped
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed number for {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Unknown {kind} unit: {unit:?}")]
    UnknownUnit { kind: &'static str, unit: String },

    #[error("No known metric found in report")]
    Unrecognized,

    #[error("Invalid JSON report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid extractor pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub(crate) fn parse_f64(field: &'static str, text: &str) -> Result<f64, ParseError> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| ParseError::InvalidNumber {
            field,
            value: text.to_string(),
        })
}

pub(crate) fn parse_u64(field: &'static str, text: &str) -> Result<u64, ParseError> {
    text.parse::<u64>().map_err(|_| ParseError::InvalidNumber {
        field,
        value: text.to_string(),
    })
}
