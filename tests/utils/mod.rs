// Shared fixtures for the integration tests
//
// Builds a `data/raw`-style tree with one directory per run.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// A `/usr/bin/time -v` capture preceded by the pytest tail
pub fn time_report(strategy: &str, wall_s: f64, user_s: f64, sys_s: f64, passed: u32) -> String {
    let minutes = (wall_s / 60.0).floor();
    let seconds = wall_s - minutes * 60.0;
    format!(
        "Estratégia: {strategy}\n\
         ======================= {passed} passed in {wall_s:.2}s =======================\n\
         \tCommand being timed: \"pytest\"\n\
         \tUser time (seconds): {user_s:.2}\n\
         \tSystem time (seconds): {sys_s:.2}\n\
         \tPercent of CPU this job got: 97%\n\
         \tElapsed (wall clock) time (h:mm:ss or m:ss): {minutes}:{seconds:05.2}\n\
         \tMaximum resident set size (kbytes): 51200\n\
         \tVoluntary context switches: 310\n\
         \tInvoluntary context switches: 12\n\
         \tExit status: 0\n"
    )
}

/// JSON energy report with explicit units
pub fn eco_report(energy_mj: f64, duration_ms: f64, co2_g: f64) -> String {
    format!(
        r#"{{
  "energy-total": {{ "value": {energy_mj}, "unit": "mJ" }},
  "duration": {{ "value": {duration_ms}, "unit": "ms" }},
  "co2-total": {{ "value": {co2_g}, "unit": "g" }},
  "cpu-avg": {{ "value": 42.0 }}
}}"#
    )
}

/// Write `content` to `<raw>/rodada-<round>-<strategy>/<file>`
pub fn write_run(raw: &Path, round: u32, strategy: &str, file: &str, content: &str) -> PathBuf {
    let dir = raw.join(format!("rodada-{}-{}", round, strategy));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(file);
    fs::write(&path, content).unwrap();
    path
}

/// Three rounds per strategy: baseline 10 s, parallel 4 s, tia 2 s, with
/// CPU time equal to wall time
pub fn write_reference_experiment(raw: &Path) {
    for round in 1..=3 {
        for (strategy, seconds) in [("baseline", 10.0), ("parallel", 4.0), ("tia", 2.0)] {
            write_run(
                raw,
                round,
                strategy,
                "metrics.txt",
                &time_report(strategy, seconds, seconds * 0.9, seconds * 0.1, 50),
            );
        }
    }
}
