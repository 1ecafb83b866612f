//! CI-side execution of the test suite
//!
//! Runs the configured test command once, times it, and appends a Markdown
//! block to the CI step summary when the runner provides one.

use crate::command::CommandRunner;
use crate::config::OrchestratorConfig;
use crate::record::Strategy;
use anyhow::{bail, Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Characters of test output echoed after a successful run
pub const OUTPUT_SNIPPET_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failure,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "Success",
            RunStatus::Failure => "Failure",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestrationOutcome {
    pub status: RunStatus,
    pub duration: Duration,
    /// Summary file actually written to
    pub summary: Option<PathBuf>,
}

/// First `max_chars` characters, never splitting a code point
pub fn snippet(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Markdown block appended to the step summary
pub fn render_summary(status: RunStatus, duration: Duration, strategy: Strategy) -> String {
    format!(
        "\n### 🌿 Green Metrics CI Report\n\n\
         | Metric | Value |\n\
         | :--- | :--- |\n\
         | **Status** | {} |\n\
         | **Execution Time** | {:.2}s |\n\
         | **Optimization Strategy** | {} |\n",
        status.as_str(),
        duration.as_secs_f64(),
        strategy.label()
    )
}

/// Path named by the `env_var` environment variable, when set and non-empty
pub fn summary_path(env_var: &str) -> Option<PathBuf> {
    std::env::var_os(env_var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Append the summary block to `path`, creating the file if needed
pub fn append_summary(path: &Path, markdown: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open step summary {}", path.display()))?;
    file.write_all(markdown.as_bytes())
        .with_context(|| format!("Failed to write step summary {}", path.display()))
}

/// Run the test command and report its outcome
///
/// A failing or unspawnable command is a `Failure` outcome, not an error;
/// errors are reserved for an unusable configuration. The step summary is
/// informational: failing to write it is logged and never changes the status.
pub fn run_orchestration(
    config: &OrchestratorConfig,
    runner: &mut dyn CommandRunner,
    summary: Option<&Path>,
) -> Result<OrchestrationOutcome> {
    let Some((program, args)) = config.test_command.split_first() else {
        bail!("orchestrator.test_command is empty");
    };

    println!("Initializing Green Metrics Orchestration...");
    println!("Executing Command: {}", config.test_command.join(" "));

    let start = Instant::now();
    let result = runner.run(program, args);
    let duration = start.elapsed();

    let status = match result {
        Ok(output) if output.success() => {
            println!("Tests Completed Successfully in {:.2}s", duration.as_secs_f64());
            println!(
                "Output snippet: {}",
                snippet(&output.stdout, OUTPUT_SNIPPET_CHARS)
            );
            RunStatus::Success
        }
        Ok(output) => {
            println!("Test Execution Failed after {:.2}s", duration.as_secs_f64());
            println!("Error Output: {}", output.stderr);
            tracing::warn!("Test command exited with {:?}", output.code);
            RunStatus::Failure
        }
        Err(e) => {
            println!("Test Execution Failed after {:.2}s", duration.as_secs_f64());
            println!("Error Output: failed to spawn {}: {}", program, e);
            tracing::warn!("Failed to spawn {}: {}", program, e);
            RunStatus::Failure
        }
    };

    let written = summary.and_then(|path| {
        match append_summary(path, &render_summary(status, duration, config.strategy)) {
            Ok(()) => {
                tracing::debug!("Step summary appended to {}", path.display());
                Some(path.to_path_buf())
            }
            Err(e) => {
                tracing::warn!("{:#}", e);
                None
            }
        }
    });

    Ok(OrchestrationOutcome {
        status,
        duration,
        summary: written,
    })
}
