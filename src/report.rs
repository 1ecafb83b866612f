//! Descriptive text report
//!
//! Rendered to a `String` so callers decide where it goes; the analysis
//! pipelines print it to stdout.

use crate::derive::{percent_change, DerivationConfig, Metric, StrategySummary};
use crate::record::Strategy;
use std::fmt::Write;

/// Metrics shown in the per-strategy block, in display order
pub const REPORT_METRICS: [Metric; 8] = [
    Metric::WallTime,
    Metric::CpuTotal,
    Metric::CpuPercent,
    Metric::MemoryMb,
    Metric::Energy,
    Metric::Edp,
    Metric::Co2,
    Metric::TestsExecuted,
];

fn format_cell(summary: &StrategySummary, metric: Metric) -> Option<String> {
    let m = summary.metric(metric)?;
    Some(match m.std_dev {
        Some(sd) => format!("{:.2} ± {:.2}", m.mean, sd),
        None => format!("{:.2}", m.mean),
    })
}

/// Per-strategy mean ± std for the headline metrics
///
/// Metrics missing from a group are left out of its block. When any group
/// relies on TDP-estimated energy the estimate assumption is appended.
pub fn render_summary(summaries: &[StrategySummary], config: &DerivationConfig) -> String {
    let mut out = String::new();

    if summaries.is_empty() {
        out.push_str("No records to summarize.\n");
        return out;
    }

    let _ = writeln!(out, "\n=== Descriptive Statistics ===\n");
    for summary in summaries {
        let _ = writeln!(out, "{} (n={}):", summary.strategy.label(), summary.n);
        for metric in REPORT_METRICS {
            if let Some(cell) = format_cell(summary, metric) {
                let _ = writeln!(out, "  {:<16} {}", metric.label(), cell);
            }
        }
        out.push('\n');
    }

    if summaries.iter().any(|s| s.uses_estimated_energy) {
        let _ = writeln!(out, "Note: {}", config.estimate_note());
    }

    out
}

/// Mean change of every non-baseline strategy against the baseline
///
/// Positive values are reductions. Rows need both means; an absent
/// baseline yields no table at all.
pub fn render_reductions(summaries: &[StrategySummary]) -> String {
    let mut out = String::new();

    let Some(baseline) = summaries.iter().find(|s| s.strategy == Strategy::Baseline) else {
        return out;
    };

    let _ = writeln!(out, "=== Reduction vs {} ===\n", Strategy::Baseline.label());
    let _ = writeln!(out, "{:<28} {:<16} {:>10}", "strategy", "metric", "change %");
    let _ = writeln!(out, "{:-<28} {:-<16} {:->10}", "", "", "");

    for summary in summaries.iter().filter(|s| s.strategy != Strategy::Baseline) {
        for metric in REPORT_METRICS {
            let (Some(control), Some(treatment)) =
                (baseline.metric(metric), summary.metric(metric))
            else {
                continue;
            };
            if let Some(change) = percent_change(control.mean, treatment.mean) {
                let _ = writeln!(
                    out,
                    "{:<28} {:<16} {:>10.1}",
                    summary.strategy.label(),
                    metric.label(),
                    change
                );
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::{derive_all, summarize};
    use crate::record::RunRecord;

    fn summaries() -> Vec<StrategySummary> {
        let records = [("baseline", 10.0, 10.0), ("tia", 2.0, 2.0)]
            .iter()
            .flat_map(|&(strategy, wall, cpu)| {
                (0..3).map(move |i| RunRecord {
                    strategy: Some(strategy.to_string()),
                    wall_time_s: Some(wall + i as f64 * 0.1),
                    cpu_user_s: Some(cpu),
                    cpu_sys_s: Some(0.0),
                    ..RunRecord::new("metrics.txt")
                })
            })
            .collect();
        summarize(&derive_all(records, &DerivationConfig::default()))
    }

    #[test]
    fn test_summary_lists_each_strategy() {
        let text = render_summary(&summaries(), &DerivationConfig::default());
        assert!(text.contains("Baseline (Sequential) (n=3):"));
        assert!(text.contains("Test Impact Analysis (TIA) (n=3):"));
        assert!(!text.contains("Parallel"));
        assert!(text.contains("10.10 ± 0.10"));
    }

    #[test]
    fn test_summary_states_estimate_assumption() {
        let config = DerivationConfig { tdp_watts: 28.0 };
        let text = render_summary(&summaries(), &config);
        assert!(text.contains("Estimated energy = CPU time × 28 W"));
    }

    #[test]
    fn test_summary_omits_missing_metrics() {
        let text = render_summary(&summaries(), &DerivationConfig::default());
        assert!(!text.contains("CO2"));
        assert!(!text.contains("Memory"));
    }

    #[test]
    fn test_empty_summary() {
        let text = render_summary(&[], &DerivationConfig::default());
        assert_eq!(text, "No records to summarize.\n");
    }

    #[test]
    fn test_reductions_against_baseline() {
        let text = render_reductions(&summaries());
        // energy: 30 J vs 150 J
        assert!(text.contains("80.0"));
        assert!(text.contains("Test Impact Analysis (TIA)"));
    }

    #[test]
    fn test_reductions_without_baseline() {
        let only_tia: Vec<_> = summaries()
            .into_iter()
            .filter(|s| s.strategy == Strategy::Tia)
            .collect();
        assert!(render_reductions(&only_tia).is_empty());
    }
}
