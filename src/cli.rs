//! CLI argument parsing for greenci

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "greenci")]
#[command(version)]
#[command(
    about = "Energy and performance harness comparing CI test-execution strategies",
    long_about = None
)]
pub struct Cli {
    /// Configuration file (default: greenci.toml when present)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug tracing output to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Stage to run (default: analyze-simple)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::AnalyzeSimple {
            raw_dir: None,
            tdp: None,
        })
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Dispatch every workflow once per round via `gh workflow run`
    Trigger {
        /// Number of rounds
        #[arg(short = 'n', long, value_name = "N")]
        repetitions: Option<u32>,

        /// Seconds to wait after each dispatch
        #[arg(long, value_name = "SECS")]
        cooldown: Option<u64>,
    },

    /// Run the test suite once and append a CI step summary
    Orchestrate {
        /// Test command to run (everything after --)
        #[arg(last = true)]
        command: Vec<String>,
    },

    /// Recover energy metrics from CI run logs
    ExtractLogs {
        /// Run identifiers (default: [extract].run_ids)
        run_ids: Vec<u64>,
    },

    /// Analyze `/usr/bin/time -v` captures under the raw data directory
    AnalyzeSimple {
        #[arg(long, value_name = "DIR")]
        raw_dir: Option<PathBuf>,

        /// Assumed CPU power draw in watts
        #[arg(long, value_name = "WATTS")]
        tdp: Option<f64>,
    },

    /// Analyze JSON energy reports under the raw data directory
    AnalyzeEco {
        #[arg(long, value_name = "DIR")]
        raw_dir: Option<PathBuf>,

        #[arg(long, value_name = "WATTS")]
        tdp: Option<f64>,
    },

    /// Render charts from a results CSV
    Plot {
        /// Results file (default: the simple-analysis CSV)
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,

        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },

    /// Run the synthetic workload once
    Workload {
        /// Factorial input
        #[arg(long, default_value = "100", allow_hyphen_values = true)]
        factorial: i64,

        /// Number of random values to sort
        #[arg(long, default_value = "0")]
        sort_size: usize,

        /// Simulated I/O wait in milliseconds
        #[arg(long, default_value = "0")]
        io_ms: u64,
    },
}
