//! Derived metrics and per-strategy descriptive statistics
//!
//! Energy estimation uses a flat per-core TDP: `cpu_total_s × tdp_watts`.
//! This is an approximation, not a measurement, and every report built on
//! it says so.

use crate::record::{DerivedMetrics, DerivedRecord, EnergySource, RunRecord, Strategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parameters of the derivation stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivationConfig {
    /// Assumed power draw per busy core, in watts
    pub tdp_watts: f64,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self { tdp_watts: 15.0 }
    }
}

impl DerivationConfig {
    /// Disclaimer printed next to any figure using estimated energy
    pub fn estimate_note(&self) -> String {
        format!(
            "Estimated energy = CPU time × {} W (approximation, not a measurement)",
            self.tdp_watts
        )
    }
}

/// Compute the derived metrics of one record
///
/// Each metric needs its inputs; nothing is zero-filled.
pub fn derive_record(record: RunRecord, config: &DerivationConfig) -> DerivedRecord {
    let cpu_total_s = match (record.cpu_user_s, record.cpu_sys_s) {
        (Some(user), Some(sys)) => Some(user + sys),
        _ => None,
    };
    let energy_estimated_j = cpu_total_s.map(|cpu| cpu * config.tdp_watts);

    let (energy_j, energy_source) = match (record.energy_j, energy_estimated_j) {
        (Some(measured), _) => (Some(measured), Some(EnergySource::Measured)),
        (None, Some(estimated)) => (Some(estimated), Some(EnergySource::Estimated)),
        (None, None) => (None, None),
    };

    let edp = match (energy_j, record.wall_time_s) {
        (Some(energy), Some(time)) => Some(energy * time),
        _ => None,
    };

    DerivedRecord {
        record,
        derived: DerivedMetrics {
            cpu_total_s,
            energy_estimated_j,
            energy_j,
            energy_source,
            edp,
        },
    }
}

pub fn derive_all(records: Vec<RunRecord>, config: &DerivationConfig) -> Vec<DerivedRecord> {
    records
        .into_iter()
        .map(|r| derive_record(r, config))
        .collect()
}

/// Numeric columns available for summaries and hypothesis tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    WallTime,
    CpuUser,
    CpuSys,
    CpuTotal,
    CpuPercent,
    MemoryMb,
    VoluntaryContextSwitches,
    InvoluntaryContextSwitches,
    TestsExecuted,
    Energy,
    EnergyEstimated,
    Edp,
    Co2,
}

impl Metric {
    pub const ALL: [Metric; 13] = [
        Metric::WallTime,
        Metric::CpuUser,
        Metric::CpuSys,
        Metric::CpuTotal,
        Metric::CpuPercent,
        Metric::MemoryMb,
        Metric::VoluntaryContextSwitches,
        Metric::InvoluntaryContextSwitches,
        Metric::TestsExecuted,
        Metric::Energy,
        Metric::EnergyEstimated,
        Metric::Edp,
        Metric::Co2,
    ];

    pub fn value(&self, record: &DerivedRecord) -> Option<f64> {
        let r = &record.record;
        let d = &record.derived;
        match self {
            Metric::WallTime => r.wall_time_s,
            Metric::CpuUser => r.cpu_user_s,
            Metric::CpuSys => r.cpu_sys_s,
            Metric::CpuTotal => d.cpu_total_s,
            Metric::CpuPercent => r.cpu_percent,
            Metric::MemoryMb => r.max_rss_mb(),
            Metric::VoluntaryContextSwitches => r.voluntary_ctx_switches.map(|v| v as f64),
            Metric::InvoluntaryContextSwitches => r.involuntary_ctx_switches.map(|v| v as f64),
            Metric::TestsExecuted => r.tests_executed.map(|v| v as f64),
            Metric::Energy => d.energy_j,
            Metric::EnergyEstimated => d.energy_estimated_j,
            Metric::Edp => d.edp,
            Metric::Co2 => r.co2_g,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::WallTime => "Time (s)",
            Metric::CpuUser => "CPU user (s)",
            Metric::CpuSys => "CPU sys (s)",
            Metric::CpuTotal => "CPU total (s)",
            Metric::CpuPercent => "CPU %",
            Metric::MemoryMb => "Memory (MB)",
            Metric::VoluntaryContextSwitches => "Voluntary ctx switches",
            Metric::InvoluntaryContextSwitches => "Involuntary ctx switches",
            Metric::TestsExecuted => "Tests",
            Metric::Energy => "Energy (J)",
            Metric::EnergyEstimated => "Energy est. (J)",
            Metric::Edp => "EDP (J·s)",
            Metric::Co2 => "CO2 (g)",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Values of `metric` for the records of one strategy, in input order
pub fn metric_values(records: &[DerivedRecord], strategy: Strategy, metric: Metric) -> Vec<f64> {
    records
        .iter()
        .filter(|r| r.strategy() == Some(strategy))
        .filter_map(|r| metric.value(r))
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n − 1); undefined below two samples
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Relative reduction of `treatment` against `control`, in percent
///
/// Positive when the treatment mean is lower. `None` for a zero control.
pub fn percent_change(control_mean: f64, treatment_mean: f64) -> Option<f64> {
    if control_mean == 0.0 {
        return None;
    }
    Some((control_mean - treatment_mean) / control_mean * 100.0)
}

/// Mean and spread of one metric within one strategy
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSummary {
    pub metric: Metric,
    /// Records carrying this metric
    pub n: usize,
    pub mean: f64,
    pub std_dev: Option<f64>,
}

/// Descriptive statistics for one strategy group
#[derive(Debug, Clone, PartialEq)]
pub struct StrategySummary {
    pub strategy: Strategy,
    pub n: usize,
    pub metrics: Vec<MetricSummary>,
    /// True when any record's energy is a TDP estimate
    pub uses_estimated_energy: bool,
}

impl StrategySummary {
    pub fn metric(&self, metric: Metric) -> Option<&MetricSummary> {
        self.metrics.iter().find(|m| m.metric == metric)
    }
}

/// Per-strategy summaries in `Strategy::ALL` order
///
/// Empty groups are skipped with a warning instead of producing NaN rows;
/// metrics absent from every record of a group are left out of it.
pub fn summarize(records: &[DerivedRecord]) -> Vec<StrategySummary> {
    let mut summaries = Vec::new();

    for strategy in Strategy::ALL {
        let group: Vec<&DerivedRecord> = records
            .iter()
            .filter(|r| r.strategy() == Some(strategy))
            .collect();

        if group.is_empty() {
            tracing::warn!("No records for strategy {}; skipping its summary", strategy);
            continue;
        }

        let metrics = Metric::ALL
            .iter()
            .filter_map(|&metric| {
                let values: Vec<f64> = group.iter().filter_map(|r| metric.value(r)).collect();
                Some(MetricSummary {
                    metric,
                    n: values.len(),
                    mean: mean(&values)?,
                    std_dev: std_dev(&values),
                })
            })
            .collect();

        summaries.push(StrategySummary {
            strategy,
            n: group.len(),
            metrics,
            uses_estimated_energy: group
                .iter()
                .any(|r| r.derived.energy_source == Some(EnergySource::Estimated)),
        });
    }

    let excluded = records.iter().filter(|r| r.strategy().is_none()).count();
    if excluded > 0 {
        tracing::warn!(
            "{} record(s) with an unknown strategy excluded from comparison",
            excluded
        );
    }

    summaries
}
