//! End-to-end analysis pipelines
//!
//! collect → derive → append CSV → descriptive report → hypotheses → charts.
//! Stages only talk to each other through the records passed along and the
//! files written under the configured paths.

use crate::collect::{Collector, ReportFormat};
use crate::config::ExperimentConfig;
use crate::csv_output;
use crate::derive::{derive_all, summarize};
use crate::html_output::HtmlReport;
use crate::hypothesis::{
    assess_all, eco_hypotheses, simple_hypotheses, HypothesisAssessment, HypothesisSpec,
};
use crate::record::{DerivedRecord, EnergySource};
use crate::report::{render_reductions, render_summary};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// What a pipeline produced
#[derive(Debug, Clone, Default)]
pub struct AnalysisSummary {
    pub records: usize,
    pub skipped: usize,
    /// CSV appended to; `None` for the plot-only pipeline
    pub csv: Option<PathBuf>,
    pub assessments: Vec<HypothesisAssessment>,
    pub charts: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    /// No input records; nothing was written
    NoData,
    Completed(AnalysisSummary),
}

fn render_charts(records: &[DerivedRecord], config: &ExperimentConfig) -> Result<Vec<PathBuf>> {
    let mut report = HtmlReport::build(records)?;
    if records
        .iter()
        .any(|r| r.derived.energy_source == Some(EnergySource::Estimated))
    {
        report.add_note(config.derivation.estimate_note());
    }

    let written = report.write_to(&config.paths.plots_dir)?;
    for path in &written {
        println!("✅ Chart saved: {}", path.display());
    }
    Ok(written)
}

fn run_pipeline(
    config: &ExperimentConfig,
    format: ReportFormat,
    csv_path: &Path,
    hypotheses: &[HypothesisSpec],
) -> Result<AnalysisOutcome> {
    println!(
        "🔍 Collecting reports from {}...",
        config.paths.raw_dir.display()
    );
    let collected = Collector::new(format)?.collect(&config.paths.raw_dir)?;

    if collected.is_empty() {
        println!("\n❌ No data found in {}", config.paths.raw_dir.display());
        if collected.files_seen == 0 {
            println!(
                "   Expected one directory per run containing '{}'",
                format.default_glob()
            );
        }
        return Ok(AnalysisOutcome::NoData);
    }

    let skipped = collected.skipped.len();
    let records = derive_all(collected.records, &config.derivation);

    csv_output::append_records(csv_path, &records)?;
    println!("\n✅ {} record(s) saved to {}", records.len(), csv_path.display());

    let summaries = summarize(&records);
    print!("{}", render_summary(&summaries, &config.derivation));
    print!("{}", render_reductions(&summaries));

    println!("\n=== Hypothesis Tests ===\n");
    let assessments = assess_all(&records, hypotheses, &config.hypothesis)?;
    for assessment in &assessments {
        println!("{}", assessment.to_report_string());
    }

    let charts = render_charts(&records, config)?;

    Ok(AnalysisOutcome::Completed(AnalysisSummary {
        records: records.len(),
        skipped,
        csv: Some(csv_path.to_path_buf()),
        assessments,
        charts,
    }))
}

/// Pipeline over `/usr/bin/time -v` text captures
pub fn run_simple_analysis(config: &ExperimentConfig) -> Result<AnalysisOutcome> {
    run_pipeline(
        config,
        ReportFormat::TimeText,
        &config.paths.simple_csv,
        &simple_hypotheses(),
    )
}

/// Pipeline over JSON energy reports
pub fn run_eco_analysis(config: &ExperimentConfig) -> Result<AnalysisOutcome> {
    run_pipeline(
        config,
        ReportFormat::EcoJson,
        &config.paths.eco_csv,
        &eco_hypotheses(),
    )
}

/// Re-render charts from an existing results CSV
pub fn run_plots(config: &ExperimentConfig, csv_path: &Path) -> Result<AnalysisOutcome> {
    if !csv_path.is_file() {
        println!("❌ Results file not found: {}", csv_path.display());
        println!("   Run an analysis first.");
        return Ok(AnalysisOutcome::NoData);
    }

    let records = csv_output::read_records(csv_path)
        .with_context(|| format!("Failed to load {}", csv_path.display()))?;
    if records.is_empty() {
        println!("❌ {} contains no records", csv_path.display());
        return Ok(AnalysisOutcome::NoData);
    }
    println!("📊 {} record(s) loaded from {}", records.len(), csv_path.display());

    let charts = render_charts(&records, config)?;
    Ok(AnalysisOutcome::Completed(AnalysisSummary {
        records: records.len(),
        charts,
        ..AnalysisSummary::default()
    }))
}
