//! Metric recovery from CI job logs
//!
//! Fallback for runs that uploaded no artifact: the job log is downloaded
//! with `gh run view <id> --log` and scanned for energy lines.

use crate::command::CommandRunner;
use crate::parser::{LogMetrics, LogScanner};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionReport {
    /// Runs whose log carried an energy figure
    pub extracted: Vec<LogMetrics>,
    /// Runs whose log could not be downloaded
    pub download_failed: Vec<u64>,
    /// Runs downloaded but without energy data
    pub without_metrics: Vec<u64>,
}

fn download_log(runner: &mut dyn CommandRunner, run_id: u64) -> Result<String, String> {
    let args = [
        "run".to_string(),
        "view".to_string(),
        run_id.to_string(),
        "--log".to_string(),
    ];
    match runner.run("gh", &args) {
        Ok(output) if output.success() => Ok(output.stdout),
        Ok(output) => Err(output.stderr.trim().to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Download and scan the log of every run id, in order
pub fn extract_from_logs(
    run_ids: &[u64],
    runner: &mut dyn CommandRunner,
) -> Result<ExtractionReport> {
    let scanner = LogScanner::new()?;
    let mut report = ExtractionReport::default();

    for (i, &run_id) in run_ids.iter().enumerate() {
        println!("\n[{}/{}] Processing run {}...", i + 1, run_ids.len(), run_id);

        let log = match download_log(runner, run_id) {
            Ok(log) => log,
            Err(reason) => {
                tracing::warn!("Failed to download log of run {}: {}", run_id, reason);
                println!("   ❌ Failed to download log: {}", reason);
                report.download_failed.push(run_id);
                continue;
            }
        };

        let metrics = match scanner.scan(&run_id.to_string(), &log) {
            Ok(metrics) => metrics,
            Err(e) => {
                tracing::warn!("Unparseable metrics in log of run {}: {}", run_id, e);
                report.without_metrics.push(run_id);
                continue;
            }
        };

        if let Some(energy) = metrics.energy_j {
            println!("   ✅ Energy: {:.2} J", energy);
            if let Some(duration) = metrics.duration_s {
                println!("   ✅ Duration: {:.2} s", duration);
            }
            println!(
                "   ✅ Strategy: {}",
                metrics.strategy.map(|s| s.as_str()).unwrap_or("unknown")
            );
            report.extracted.push(metrics);
        } else {
            println!("   ⚠️  Could not extract metrics");
            report.without_metrics.push(run_id);
        }
    }

    Ok(report)
}

/// Pretty JSON array of the extracted metrics
pub fn write_metrics_json(path: &Path, metrics: &[LogMetrics]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(metrics)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOutput;
    use crate::record::Strategy;
    use std::collections::HashMap;
    use std::io;

    struct LogRunner(HashMap<String, io::Result<CommandOutput>>);

    impl CommandRunner for LogRunner {
        fn run(&mut self, _: &str, args: &[String]) -> io::Result<CommandOutput> {
            match self.0.remove(&args[2]) {
                Some(result) => result,
                None => Ok(CommandOutput {
                    code: Some(1),
                    stdout: String::new(),
                    stderr: "run not found".to_string(),
                }),
            }
        }
    }

    fn log(text: &str) -> io::Result<CommandOutput> {
        Ok(CommandOutput {
            code: Some(0),
            stdout: text.to_string(),
            stderr: String::new(),
        })
    }

    #[test]
    fn test_extracts_and_classifies_runs() {
        let mut runner = LogRunner(HashMap::from([
            (
                "1".to_string(),
                log("tia.yml job\nEnergy: 1520 mJ\nDuration: 12.5 s\nCO2: 30 mg"),
            ),
            ("2".to_string(), log("baseline.yml job\nno eco output here")),
        ]));

        let report = extract_from_logs(&[1, 2, 3], &mut runner).unwrap();

        assert_eq!(report.extracted.len(), 1);
        let m = &report.extracted[0];
        assert_eq!(m.run_id, "1");
        assert_eq!(m.strategy, Some(Strategy::Tia));
        assert!((m.energy_j.unwrap() - 1.52).abs() < 1e-9);
        assert_eq!(m.duration_s, Some(12.5));
        assert_eq!(report.without_metrics, vec![2]);
        assert_eq!(report.download_failed, vec![3]);
    }

    #[test]
    fn test_write_metrics_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw/metrics_from_logs.json");
        let metrics = vec![LogMetrics {
            run_id: "19913403957".to_string(),
            strategy: Some(Strategy::Baseline),
            energy_j: Some(150.0),
            duration_s: Some(10.0),
            co2_g: None,
        }];

        write_metrics_json(&path, &metrics).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed[0]["run_id"], "19913403957");
        assert_eq!(parsed[0]["strategy"], "baseline");
        assert_eq!(parsed[0]["energy_j"], 150.0);
    }
}
