//! Remote workflow dispatch
//!
//! Every configured workflow is dispatched once per round, with a cooldown
//! after each dispatch so consecutive runs do not share thermal state.

use crate::command::{CommandRunner, Sleeper};
use crate::config::TriggerConfig;

/// A single dispatch attempt that did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDispatch {
    pub round: u32,
    pub workflow: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerReport {
    /// (round, workflow) pairs accepted by `gh`
    pub dispatched: Vec<(u32, String)>,
    pub failed: Vec<FailedDispatch>,
}

impl TriggerReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

fn dispatch(runner: &mut dyn CommandRunner, workflow: &str) -> Result<(), String> {
    let args = ["workflow".to_string(), "run".to_string(), workflow.to_string()];
    match runner.run("gh", &args) {
        Ok(output) if output.success() => Ok(()),
        Ok(output) => Err(format!(
            "gh exited with {}: {}",
            output
                .code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string()),
            output.stderr.trim()
        )),
        Err(e) => Err(format!("failed to spawn gh: {}", e)),
    }
}

/// Dispatch `repetitions × workflows` runs
///
/// A failed dispatch is logged and the loop goes on; the cooldown is
/// applied after every attempt.
pub fn run_trigger(
    config: &TriggerConfig,
    runner: &mut dyn CommandRunner,
    sleeper: &mut dyn Sleeper,
) -> TriggerReport {
    let mut report = TriggerReport::default();

    println!("{}", "=".repeat(60));
    println!(
        "⚙️  {} repetitions × {} workflows = {} runs",
        config.repetitions,
        config.workflows.len(),
        config.total_dispatches()
    );
    println!("{}", "=".repeat(60));

    for round in 1..=config.repetitions {
        println!("\n🔄 Round {} of {}", round, config.repetitions);

        for workflow in &config.workflows {
            println!("   ▶️  Dispatching: {}", workflow);
            match dispatch(runner, workflow) {
                Ok(()) => report.dispatched.push((round, workflow.clone())),
                Err(reason) => {
                    tracing::warn!("Dispatch of {} (round {}) failed: {}", workflow, round, reason);
                    println!("   ❌ {}", reason);
                    report.failed.push(FailedDispatch {
                        round,
                        workflow: workflow.clone(),
                        reason,
                    });
                }
            }

            println!("   ⏳ Waiting {}s...", config.cooldown_secs);
            sleeper.sleep(config.cooldown());
        }
    }

    println!();
    if report.all_succeeded() {
        println!("✅ Experiment dispatched: {} runs", report.dispatched.len());
    } else {
        println!(
            "⚠️  {} of {} dispatches failed",
            report.failed.len(),
            config.total_dispatches()
        );
    }
    println!("📍 Follow the runs in the Actions tab and download the artifacts when done");

    report
}
