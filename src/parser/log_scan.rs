//! Best-effort metric extraction from raw CI log text
//!
//! Used when a run produced no artifact: the energy step still prints lines
//! such as `Energy: 152340 mJ` or `Duration: 12.4 s` into the job log.

use super::units::{DurationUnit, EnergyUnit, MassUnit};
use super::{parse_f64, ParseError};
use crate::record::Strategy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Metrics recovered from one CI log, canonical units
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogMetrics {
    pub run_id: String,
    pub strategy: Option<Strategy>,
    pub energy_j: Option<f64>,
    pub duration_s: Option<f64>,
    pub co2_g: Option<f64>,
}

impl LogMetrics {
    /// A log is only worth keeping when energy was found
    pub fn has_energy(&self) -> bool {
        self.energy_j.is_some()
    }
}

#[derive(Debug)]
pub struct LogScanner {
    energy: Regex,
    duration: Regex,
    co2: Regex,
}

impl LogScanner {
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            energy: Regex::new(r"(?i)Energy[:\s]+(\d+\.?\d*)\s*(mJ|J)\b")?,
            duration: Regex::new(r"(?i)Duration[:\s]+(\d+\.?\d*)\s*(ms|s)\b")?,
            co2: Regex::new(r"(?i)CO2[:\s]+(\d+\.?\d*)\s*(mg|g)\b")?,
        })
    }

    /// Scan a whole log; first match of each metric wins
    pub fn scan(&self, run_id: &str, log_text: &str) -> Result<LogMetrics, ParseError> {
        let mut metrics = LogMetrics {
            run_id: run_id.to_string(),
            strategy: Strategy::detect(log_text),
            ..LogMetrics::default()
        };

        if let Some(caps) = self.energy.captures(log_text) {
            let value = parse_f64("energy", &caps[1])?;
            let unit = EnergyUnit::parse(&caps[2].to_ascii_lowercase())?;
            metrics.energy_j = Some(unit.to_canonical(value));
        }

        if let Some(caps) = self.duration.captures(log_text) {
            let value = parse_f64("duration", &caps[1])?;
            metrics.duration_s = Some(DurationUnit::parse(&caps[2])?.to_canonical(value));
        }

        if let Some(caps) = self.co2.captures(log_text) {
            let value = parse_f64("co2", &caps[1])?;
            metrics.co2_g = Some(MassUnit::parse(&caps[2])?.to_canonical(value));
        }

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_all_metrics() {
        let scanner = LogScanner::new().unwrap();
        let log = "\
tia\tRun tests\t2024-11-20T10:00:00Z Running workflow tia.yml
tia\tEco CI\tEnergy: 2500 mJ
tia\tEco CI\tDuration: 1500 ms
tia\tEco CI\tCO2: 12 mg
";
        let metrics = scanner.scan("42", log).unwrap();
        assert_eq!(metrics.run_id, "42");
        assert_eq!(metrics.strategy, Some(Strategy::Tia));
        assert_eq!(metrics.energy_j, Some(2.5));
        assert_eq!(metrics.duration_s, Some(1.5));
        assert_eq!(metrics.co2_g, Some(0.012));
    }

    #[test]
    fn test_scan_joules_and_seconds() {
        let scanner = LogScanner::new().unwrap();
        let metrics = scanner
            .scan("1", "baseline job\nenergy 3.5 J\nduration: 4 s\n")
            .unwrap();
        assert_eq!(metrics.strategy, Some(Strategy::Baseline));
        assert_eq!(metrics.energy_j, Some(3.5));
        assert_eq!(metrics.duration_s, Some(4.0));
        assert_eq!(metrics.co2_g, None);
    }

    #[test]
    fn test_scan_nothing_found() {
        let scanner = LogScanner::new().unwrap();
        let metrics = scanner.scan("7", "setup\ncheckout\n").unwrap();
        assert!(!metrics.has_energy());
        assert_eq!(metrics.strategy, None);
    }
}
