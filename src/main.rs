use anyhow::Result;
use clap::Parser;
use greenci::analysis::{self, AnalysisOutcome};
use greenci::cli::{Cli, Command};
use greenci::command::{SystemRunner, ThreadSleeper};
use greenci::config::ExperimentConfig;
use greenci::orchestrator::{self, RunStatus};
use greenci::{log_extract, trigger, workload};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// An upstream command failed
const EXIT_FAILURE: u8 = 1;
/// Nothing to analyze
const EXIT_NO_DATA: u8 = 2;

/// Initialize tracing subscriber; warnings always, everything with --debug
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn analysis_exit(outcome: AnalysisOutcome) -> ExitCode {
    match outcome {
        AnalysisOutcome::NoData => ExitCode::from(EXIT_NO_DATA),
        AnalysisOutcome::Completed(summary) => {
            if summary.skipped > 0 {
                println!("⚠️  {} file(s) skipped, see warnings above", summary.skipped);
            }
            println!("\n✅ Analysis complete");
            ExitCode::SUCCESS
        }
    }
}

fn apply_analysis_overrides(
    config: &mut ExperimentConfig,
    raw_dir: Option<std::path::PathBuf>,
    tdp: Option<f64>,
) -> Result<()> {
    if let Some(dir) = raw_dir {
        config.paths.raw_dir = dir;
    }
    if let Some(watts) = tdp {
        config.derivation.tdp_watts = watts;
    }
    config.validate()?;
    Ok(())
}

fn run_workload(factorial: i64, sort_size: usize, io_ms: u64) -> Result<ExitCode> {
    println!("Running manual workload test...");
    let value = workload::cpu_intensive_task(factorial)?;
    println!(
        "Factorial({}): {}...",
        factorial,
        workload::leading_digits(&value, 10)
    );

    if sort_size > 0 {
        let sorted = workload::memory_intensive_task(sort_size);
        println!("Sorted {} random values", sorted.len());
    }
    if io_ms > 0 {
        println!(
            "I/O simulation: {}",
            workload::io_simulation(Duration::from_millis(io_ms))
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let mut config = ExperimentConfig::load(cli.config.as_deref())?;

    match cli.command() {
        Command::Trigger {
            repetitions,
            cooldown,
        } => {
            if let Some(n) = repetitions {
                config.trigger.repetitions = n;
            }
            if let Some(secs) = cooldown {
                config.trigger.cooldown_secs = secs;
            }
            let report = trigger::run_trigger(&config.trigger, &mut SystemRunner, &mut ThreadSleeper);
            Ok(if report.all_succeeded() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_FAILURE)
            })
        }

        Command::Orchestrate { command } => {
            if !command.is_empty() {
                config.orchestrator.test_command = command;
            }
            let summary = orchestrator::summary_path(&config.orchestrator.summary_env);
            let outcome = orchestrator::run_orchestration(
                &config.orchestrator,
                &mut SystemRunner,
                summary.as_deref(),
            )?;
            Ok(match outcome.status {
                RunStatus::Success => ExitCode::SUCCESS,
                RunStatus::Failure => ExitCode::from(EXIT_FAILURE),
            })
        }

        Command::ExtractLogs { run_ids } => {
            let run_ids = if run_ids.is_empty() {
                config.extract.run_ids.clone()
            } else {
                run_ids
            };
            if run_ids.is_empty() {
                println!("❌ No run ids given (pass them as arguments or set [extract].run_ids)");
                return Ok(ExitCode::from(EXIT_NO_DATA));
            }

            println!("🔍 Extracting metrics from CI logs...");
            let report = log_extract::extract_from_logs(&run_ids, &mut SystemRunner)?;
            if report.extracted.is_empty() {
                println!("\n❌ No metrics found in the logs");
                return Ok(ExitCode::from(EXIT_NO_DATA));
            }

            let path = &config.paths.log_metrics_json;
            log_extract::write_metrics_json(path, &report.extracted)?;
            println!("\n✅ {} run(s) extracted", report.extracted.len());
            println!("📁 Saved to: {}", path.display());
            println!("⚠️  Metrics taken from logs may be incomplete");
            Ok(ExitCode::SUCCESS)
        }

        Command::AnalyzeSimple { raw_dir, tdp } => {
            apply_analysis_overrides(&mut config, raw_dir, tdp)?;
            Ok(analysis_exit(analysis::run_simple_analysis(&config)?))
        }

        Command::AnalyzeEco { raw_dir, tdp } => {
            apply_analysis_overrides(&mut config, raw_dir, tdp)?;
            Ok(analysis_exit(analysis::run_eco_analysis(&config)?))
        }

        Command::Plot { csv, out_dir } => {
            if let Some(dir) = out_dir {
                config.paths.plots_dir = dir;
            }
            let csv = csv.unwrap_or_else(|| config.paths.simple_csv.clone());
            Ok(analysis_exit(analysis::run_plots(&config, &csv)?))
        }

        Command::Workload {
            factorial,
            sort_size,
            io_ms,
        } => run_workload(factorial, sort_size, io_ms),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.debug);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
