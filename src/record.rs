//! Run Record data model
//!
//! One `RunRecord` is one measurement sample for one executed test strategy.
//! Records are produced by the parsers, never mutated afterwards, and wrapped
//! into a `DerivedRecord` once the derivation stage has computed its metrics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// CI test-execution strategy under comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Sequential execution of the full suite
    Baseline,
    /// Parallelized execution of the full suite
    Parallel,
    /// Test Impact Analysis: only tests affected by recent changes
    Tia,
}

impl Strategy {
    /// All strategies in report order
    pub const ALL: [Strategy; 3] = [Strategy::Baseline, Strategy::Parallel, Strategy::Tia];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Baseline => "baseline",
            Strategy::Parallel => "parallel",
            Strategy::Tia => "tia",
        }
    }

    /// Human-readable label used in reports and CI step summaries
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Baseline => "Baseline (Sequential)",
            Strategy::Parallel => "Parallel (xdist)",
            Strategy::Tia => "Test Impact Analysis (TIA)",
        }
    }

    /// Exact, case-insensitive match against a strategy name
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|s| s.as_str() == token)
    }

    /// Substring match, checked in `ALL` order (e.g. `rodada-3-baseline`)
    pub fn detect(text: &str) -> Option<Self> {
        let text = text.to_ascii_lowercase();
        Self::ALL.into_iter().find(|s| text.contains(s.as_str()))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single parsed measurement sample
///
/// Every field is optional: a field whose pattern was not found in the
/// report is simply absent. Numeric fields are never negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// File the record was parsed from
    pub source: PathBuf,
    /// Strategy label as written in the report or path (lower-cased)
    pub strategy: Option<String>,
    /// Round index from the `rodada-<N>` directory convention
    pub round: Option<u32>,
    /// CI run identifier
    pub run_id: Option<String>,
    pub wall_time_s: Option<f64>,
    pub cpu_user_s: Option<f64>,
    pub cpu_sys_s: Option<f64>,
    /// May exceed 100 on multi-core runs
    pub cpu_percent: Option<f64>,
    pub max_rss_kb: Option<u64>,
    pub voluntary_ctx_switches: Option<u64>,
    pub involuntary_ctx_switches: Option<u64>,
    pub tests_executed: Option<u64>,
    /// Energy reported directly by a measurement tool, in joules
    pub energy_j: Option<f64>,
    pub co2_g: Option<f64>,
}

impl RunRecord {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Strategy when the label is one of the three known values
    ///
    /// Records with any other label are excluded from comparative analysis.
    pub fn known_strategy(&self) -> Option<Strategy> {
        self.strategy.as_deref().and_then(Strategy::from_token)
    }

    pub fn max_rss_mb(&self) -> Option<f64> {
        self.max_rss_kb.map(|kb| kb as f64 / 1024.0)
    }

    /// A record with neither a strategy nor a time measurement cannot be used
    pub fn is_usable(&self) -> bool {
        self.strategy.is_some() || self.wall_time_s.is_some()
    }

    /// True when no measurement or identification field was extracted
    pub fn is_blank(&self) -> bool {
        let Self {
            source: _,
            strategy,
            round,
            run_id,
            wall_time_s,
            cpu_user_s,
            cpu_sys_s,
            cpu_percent,
            max_rss_kb,
            voluntary_ctx_switches,
            involuntary_ctx_switches,
            tests_executed,
            energy_j,
            co2_g,
        } = self;
        strategy.is_none()
            && round.is_none()
            && run_id.is_none()
            && wall_time_s.is_none()
            && cpu_user_s.is_none()
            && cpu_sys_s.is_none()
            && cpu_percent.is_none()
            && max_rss_kb.is_none()
            && voluntary_ctx_switches.is_none()
            && involuntary_ctx_switches.is_none()
            && tests_executed.is_none()
            && energy_j.is_none()
            && co2_g.is_none()
    }
}

/// Where the energy figure of a derived record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergySource {
    /// Reported by an energy measurement tool
    Measured,
    /// CPU time × assumed TDP; an approximation, not a measurement
    Estimated,
}

impl EnergySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnergySource::Measured => "measured",
            EnergySource::Estimated => "estimated",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "measured" => Some(EnergySource::Measured),
            "estimated" => Some(EnergySource::Estimated),
            _ => None,
        }
    }
}

/// Secondary metrics computed once from a `RunRecord`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// user + system CPU seconds
    pub cpu_total_s: Option<f64>,
    /// cpu_total_s × TDP
    pub energy_estimated_j: Option<f64>,
    /// Energy used for EDP: measured when available, else estimated
    pub energy_j: Option<f64>,
    pub energy_source: Option<EnergySource>,
    /// Energy-Delay Product: energy_j × wall_time_s
    pub edp: Option<f64>,
}

/// A parsed record together with its derived metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRecord {
    pub record: RunRecord,
    pub derived: DerivedMetrics,
}

impl DerivedRecord {
    pub fn strategy(&self) -> Option<Strategy> {
        self.record.known_strategy()
    }
}
