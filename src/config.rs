//! Experiment configuration
//!
//! Every tunable of the harness (TDP wattage, repetitions, cooldown, file
//! locations, significance level) lives here and is passed explicitly to
//! the stage that needs it. Loaded from `greenci.toml` when present:
//!
//! ```toml
//! [derivation]
//! tdp_watts = 15.0
//!
//! [trigger]
//! repetitions = 10
//! cooldown_secs = 60
//! ```
//!
//! Missing sections and keys fall back to the defaults.

use crate::derive::DerivationConfig;
use crate::hypothesis::HypothesisConfig;
use crate::record::Strategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "greenci.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// File locations, relative to the working directory by default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// One subdirectory per executed run
    pub raw_dir: PathBuf,
    pub plots_dir: PathBuf,
    /// Output of the `/usr/bin/time -v` pipeline
    pub simple_csv: PathBuf,
    /// Output of the JSON energy-report pipeline
    pub eco_csv: PathBuf,
    /// Output of `extract-logs`
    pub log_metrics_json: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            plots_dir: PathBuf::from("data/plots"),
            simple_csv: PathBuf::from("data/resultados_simple.csv"),
            eco_csv: PathBuf::from("data/resultados_consolidados.csv"),
            log_metrics_json: PathBuf::from("data/raw/metrics_from_logs.json"),
        }
    }
}

/// Remote workflow dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Rounds; every workflow is dispatched once per round
    pub repetitions: u32,
    /// Wait after each dispatch to limit thermal carry-over
    pub cooldown_secs: u64,
    pub workflows: Vec<String>,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            repetitions: 3,
            cooldown_secs: 20,
            workflows: vec![
                "baseline.yml".to_string(),
                "parallel.yml".to_string(),
                "tia.yml".to_string(),
            ],
        }
    }
}

impl TriggerConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn total_dispatches(&self) -> usize {
        self.repetitions as usize * self.workflows.len()
    }
}

/// CI-side execution of the test suite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Program and arguments of the workload under test
    pub test_command: Vec<String>,
    pub strategy: Strategy,
    /// Environment variable naming the Markdown step-summary file
    pub summary_env: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            test_command: vec![
                "pytest".to_string(),
                "--testmon".to_string(),
                "--junitxml=test-results.xml".to_string(),
                "-vv".to_string(),
            ],
            strategy: Strategy::Tia,
            summary_env: "GITHUB_STEP_SUMMARY".to_string(),
        }
    }
}

/// Metric recovery from CI logs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub run_ids: Vec<u64>,
}

/// Complete harness configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub paths: PathsConfig,
    pub derivation: DerivationConfig,
    pub trigger: TriggerConfig,
    pub hypothesis: HypothesisConfig,
    pub orchestrator: OrchestratorConfig,
    pub extract: ExtractConfig,
}

impl ExperimentConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load and validate a configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit path must exist; otherwise `greenci.toml` is used when present
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.derivation.tdp_watts.is_finite() && self.derivation.tdp_watts > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "derivation.tdp_watts must be positive, got {}",
                self.derivation.tdp_watts
            )));
        }

        self.hypothesis
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("hypothesis: {}", e)))?;

        if self.trigger.workflows.is_empty() {
            return Err(ConfigError::Invalid(
                "trigger.workflows must name at least one workflow".to_string(),
            ));
        }

        if self.orchestrator.test_command.is_empty() {
            return Err(ConfigError::Invalid(
                "orchestrator.test_command must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_paths() {
        let config = ExperimentConfig::default();
        assert_eq!(config.paths.raw_dir, PathBuf::from("data/raw"));
        assert_eq!(config.paths.plots_dir, PathBuf::from("data/plots"));
        assert_eq!(config.derivation.tdp_watts, 15.0);
        assert_eq!(config.trigger.repetitions, 3);
        assert_eq!(config.trigger.cooldown(), Duration::from_secs(20));
        assert_eq!(config.trigger.total_dispatches(), 9);
        assert_eq!(config.hypothesis.min_sample_size, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExperimentConfig::from_toml_str(
            r#"
[derivation]
tdp_watts = 28.0

[trigger]
cooldown_secs = 60
"#,
        )
        .unwrap();
        assert_eq!(config.derivation.tdp_watts, 28.0);
        assert_eq!(config.trigger.cooldown_secs, 60);
        assert_eq!(config.trigger.repetitions, 3);
        assert_eq!(config.hypothesis.significance_level, 0.05);
    }

    #[test]
    fn test_orchestrator_strategy_from_toml() {
        let config = ExperimentConfig::from_toml_str(
            r#"
[orchestrator]
strategy = "parallel"
test_command = ["cargo", "test"]
"#,
        )
        .unwrap();
        assert_eq!(config.orchestrator.strategy, Strategy::Parallel);
        assert_eq!(config.orchestrator.test_command, vec!["cargo", "test"]);
        assert_eq!(config.orchestrator.summary_env, "GITHUB_STEP_SUMMARY");
    }

    #[test]
    fn test_invalid_tdp_rejected() {
        let config = ExperimentConfig::from_toml_str("[derivation]\ntdp_watts = 0.0\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = ExperimentConfig::load(Some(Path::new("/nonexistent/greenci.toml")));
        assert!(matches!(err, Err(ConfigError::Read { .. })));
    }
}
