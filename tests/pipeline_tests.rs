//! End-to-end tests of the analysis pipelines over a fixture data tree

mod utils;

use greenci::analysis::{run_eco_analysis, run_plots, run_simple_analysis, AnalysisOutcome};
use greenci::config::ExperimentConfig;
use greenci::csv_output::read_records;
use greenci::derive::{summarize, Metric};
use greenci::hypothesis::{HypothesisOutcome, TestKind};
use greenci::record::{EnergySource, Strategy};
use std::path::Path;
use tempfile::TempDir;
use utils::{eco_report, write_reference_experiment, write_run};

fn config_in(dir: &Path) -> ExperimentConfig {
    let mut config = ExperimentConfig::default();
    config.paths.raw_dir = dir.join("data/raw");
    config.paths.plots_dir = dir.join("data/plots");
    config.paths.simple_csv = dir.join("data/resultados_simple.csv");
    config.paths.eco_csv = dir.join("data/resultados_consolidados.csv");
    config.paths.log_metrics_json = dir.join("data/raw/metrics_from_logs.json");
    config
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn completed(outcome: AnalysisOutcome) -> greenci::analysis::AnalysisSummary {
    match outcome {
        AnalysisOutcome::Completed(summary) => summary,
        AnalysisOutcome::NoData => panic!("expected a completed analysis"),
    }
}

#[test]
fn test_reference_experiment_energy_and_edp() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    write_reference_experiment(&config.paths.raw_dir);

    let summary = completed(run_simple_analysis(&config).unwrap());
    assert_eq!(summary.records, 9);
    assert_eq!(summary.skipped, 0);

    let records = read_records(&config.paths.simple_csv).unwrap();
    assert_eq!(records.len(), 9);

    let summaries = summarize(&records);
    let expected = [
        (Strategy::Baseline, 150.0, 1500.0),
        (Strategy::Parallel, 60.0, 240.0),
        (Strategy::Tia, 30.0, 60.0),
    ];
    for (strategy, energy, edp) in expected {
        let s = summaries.iter().find(|s| s.strategy == strategy).unwrap();
        assert_eq!(s.n, 3);
        assert!(approx(s.metric(Metric::Energy).unwrap().mean, energy));
        assert!(approx(s.metric(Metric::Edp).unwrap().mean, edp));
        assert!(s.uses_estimated_energy);
    }

    // TIA energy is 80% below the baseline
    let h1 = &summary.assessments[0];
    assert_eq!(h1.spec.control, Strategy::Baseline);
    assert_eq!(h1.spec.treatment, Strategy::Tia);
    match &h1.outcome {
        HypothesisOutcome::Tested(t) => {
            assert_eq!(t.kind, TestKind::WilcoxonSignedRank);
            assert!(approx(t.reduction_pct.unwrap(), 80.0));
        }
        other => panic!("H1 not tested: {:?}", other),
    }
}

#[test]
fn test_records_carry_round_and_estimate_flag() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    write_reference_experiment(&config.paths.raw_dir);

    completed(run_simple_analysis(&config).unwrap());
    let records = read_records(&config.paths.simple_csv).unwrap();

    assert!(records.iter().all(|r| r.record.round.is_some()));
    assert!(records
        .iter()
        .all(|r| r.derived.energy_source == Some(EnergySource::Estimated)));
    assert!(records.iter().all(|r| r.record.tests_executed == Some(50)));
}

#[test]
fn test_repeated_analysis_appends() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    write_reference_experiment(&config.paths.raw_dir);

    completed(run_simple_analysis(&config).unwrap());
    completed(run_simple_analysis(&config).unwrap());

    let text = std::fs::read_to_string(&config.paths.simple_csv).unwrap();
    assert_eq!(text.lines().filter(|l| l.starts_with("rodada,")).count(), 1);
    assert_eq!(read_records(&config.paths.simple_csv).unwrap().len(), 18);
}

#[test]
fn test_missing_data_directory_is_no_data() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());

    let outcome = run_simple_analysis(&config).unwrap();
    assert!(matches!(outcome, AnalysisOutcome::NoData));
    assert!(!config.paths.simple_csv.exists());
    assert!(!config.paths.plots_dir.exists());
}

#[test]
fn test_malformed_file_skipped() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    write_reference_experiment(&config.paths.raw_dir);
    write_run(
        &config.paths.raw_dir,
        4,
        "tia",
        "metrics.txt",
        "nothing useful in here\n",
    );

    let summary = completed(run_simple_analysis(&config).unwrap());
    assert_eq!(summary.records, 9);
    assert_eq!(summary.skipped, 1);
}

#[test]
fn test_two_runs_per_group_not_tested() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    for round in 1..=2 {
        for (strategy, seconds) in [("baseline", 10.0), ("tia", 2.0)] {
            write_run(
                &config.paths.raw_dir,
                round,
                strategy,
                "metrics.txt",
                &utils::time_report(strategy, seconds, seconds, 0.0, 10),
            );
        }
    }

    let summary = completed(run_simple_analysis(&config).unwrap());
    assert!(summary.assessments.iter().all(|a| !a.is_tested()));
}

#[test]
fn test_eco_pipeline_uses_measured_energy() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    for round in 1..=3 {
        let jitter = round as f64;
        write_run(
            &config.paths.raw_dir,
            round,
            "baseline",
            "eco-ci-output.json",
            &eco_report(150_000.0 + jitter, 10_000.0, 0.02),
        );
        write_run(
            &config.paths.raw_dir,
            round,
            "parallel",
            "eco-ci-output.json",
            &eco_report(60_000.0 + jitter, 4_000.0, 0.01),
        );
        write_run(
            &config.paths.raw_dir,
            round,
            "tia",
            "eco-ci-output.json",
            &eco_report(30_000.0 + jitter, 2_000.0, 0.005),
        );
    }

    let summary = completed(run_eco_analysis(&config).unwrap());
    assert_eq!(summary.records, 9);

    let records = read_records(&config.paths.eco_csv).unwrap();
    assert!(records
        .iter()
        .all(|r| r.derived.energy_source == Some(EnergySource::Measured)));
    let baseline = records
        .iter()
        .find(|r| r.strategy() == Some(Strategy::Baseline))
        .unwrap();
    assert!(approx(baseline.record.wall_time_s.unwrap(), 10.0));
    assert!((baseline.derived.energy_j.unwrap() - 150.0).abs() < 0.01);

    let h1 = &summary.assessments[0];
    assert!(h1.is_tested());
    assert!(h1.to_report_string().contains("Cohen's d"));
}

#[test]
fn test_plots_written() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    write_reference_experiment(&config.paths.raw_dir);

    let summary = completed(run_simple_analysis(&config).unwrap());
    assert!(config.paths.plots_dir.join("report.html").is_file());
    assert!(config.paths.plots_dir.join("edp_boxplot.svg").is_file());
    assert!(summary.charts.len() >= 6);

    let html = std::fs::read_to_string(config.paths.plots_dir.join("report.html")).unwrap();
    assert!(html.contains("Estimated energy = CPU time × 15 W"));
}

#[test]
fn test_plot_from_csv() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(dir.path());
    write_reference_experiment(&config.paths.raw_dir);
    completed(run_simple_analysis(&config).unwrap());

    config.paths.plots_dir = dir.path().join("replot");
    let summary = completed(run_plots(&config, &config.paths.simple_csv).unwrap());
    assert_eq!(summary.records, 9);
    assert!(dir.path().join("replot/report.html").is_file());
}

#[test]
fn test_plot_without_csv_is_no_data() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    let outcome = run_plots(&config, &config.paths.simple_csv).unwrap();
    assert!(matches!(outcome, AnalysisOutcome::NoData));
}

fn write_unlabelled(raw: &Path, content: &[u8]) {
    let dir = raw.join("misc");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("metrics.txt"), content).unwrap();
}

#[test]
fn test_record_without_strategy_or_time_dropped() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    write_reference_experiment(&config.paths.raw_dir);
    write_unlabelled(&config.paths.raw_dir, b"\tUser time (seconds): 1.0\n");

    let summary = completed(run_simple_analysis(&config).unwrap());
    assert_eq!(summary.records, 9);
    assert_eq!(summary.skipped, 1);

    let records = read_records(&config.paths.simple_csv).unwrap();
    assert_eq!(records.len(), 9);
    assert!(records
        .iter()
        .all(|r| !r.record.source.to_string_lossy().contains("misc")));
}

#[test]
fn test_every_file_dropped_is_no_data() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    write_unlabelled(&config.paths.raw_dir, b"\tUser time (seconds): 1.0\n");

    let outcome = run_simple_analysis(&config).unwrap();
    assert!(matches!(outcome, AnalysisOutcome::NoData));
    assert!(!config.paths.simple_csv.exists());
    assert!(!config.paths.plots_dir.exists());
}

#[test]
fn test_non_utf8_report_skipped() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    write_reference_experiment(&config.paths.raw_dir);
    let bad = config.paths.raw_dir.join("rodada-4-tia");
    std::fs::create_dir_all(&bad).unwrap();
    std::fs::write(bad.join("metrics.txt"), b"\xff\xfe\x00 not text").unwrap();

    let summary = completed(run_simple_analysis(&config).unwrap());
    assert_eq!(summary.records, 9);
    assert_eq!(summary.skipped, 1);
    assert_eq!(read_records(&config.paths.simple_csv).unwrap().len(), 9);
}
