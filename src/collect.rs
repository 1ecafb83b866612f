//! Collect stage: discover report files and turn them into run records
//!
//! Input layout (one subdirectory per executed run):
//!
//! ```text
//! data/raw/
//!   rodada-1-baseline/metrics.txt
//!   rodada-1-tia/eco-ci-output.json
//!   ...
//! ```
//!
//! The directory name carries the round (`rodada-<N>`) and the strategy
//! token. Per-file failures are logged and skipped; the batch always runs
//! to the end.

use crate::parser::{parse_eco_report, ParseError, TimeReportParser};
use crate::record::{RunRecord, Strategy};
use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Report format handled by a collection pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// `/usr/bin/time -v` text capture
    TimeText,
    /// JSON energy report
    EcoJson,
}

impl ReportFormat {
    /// File-name glob selecting this format's files
    pub fn default_glob(&self) -> &'static str {
        match self {
            ReportFormat::TimeText => "metrics.txt",
            ReportFormat::EcoJson => "*output*.json",
        }
    }
}

/// A file that produced no record
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of one collection pass
#[derive(Debug, Default)]
pub struct CollectOutcome {
    pub records: Vec<RunRecord>,
    pub skipped: Vec<SkippedFile>,
    /// Number of files matching the format's glob
    pub files_seen: usize,
}

impl CollectOutcome {
    /// True when there is nothing to analyze; downstream stages abort on this
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Collector bound to one report format
#[derive(Debug)]
pub struct Collector {
    format: ReportFormat,
    matcher: GlobMatcher,
    time_parser: TimeReportParser,
}

impl Collector {
    pub fn new(format: ReportFormat) -> Result<Self> {
        Self::with_glob(format, format.default_glob())
    }

    pub fn with_glob(format: ReportFormat, pattern: &str) -> Result<Self> {
        let matcher = Glob::new(pattern)
            .with_context(|| format!("Invalid file glob: {}", pattern))?
            .compile_matcher();
        let time_parser = TimeReportParser::new().context("Failed to build report parser")?;
        Ok(Self {
            format,
            matcher,
            time_parser,
        })
    }

    /// Collect all matching reports under `root`
    ///
    /// A missing root directory yields an empty outcome, not an error.
    pub fn collect(&self, root: &Path) -> Result<CollectOutcome> {
        let mut outcome = CollectOutcome::default();

        if !root.is_dir() {
            tracing::warn!("Data directory {} does not exist", root.display());
            return Ok(outcome);
        }

        let mut files = self.find_files(root, &mut outcome.skipped);
        files.sort();
        outcome.files_seen = files.len();

        for path in files {
            println!("📄 Processing: {}", path.display());
            match self.collect_file(root, &path) {
                Ok(record) if !record.is_usable() => {
                    let reason = "no strategy and no time measurement".to_string();
                    tracing::warn!("Dropping {}: {}", path.display(), reason);
                    outcome.skipped.push(SkippedFile { path, reason });
                }
                Ok(record) => {
                    println!(
                        "   ✅ {} - {}",
                        record.strategy.as_deref().unwrap_or("?"),
                        record
                            .wall_time_s
                            .map_or_else(|| "?".to_string(), |t| format!("{:.2}s", t))
                    );
                    outcome.records.push(record);
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    println!("   ❌ Error: {}", e);
                    outcome.skipped.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    /// Matching files under `root`; directory links are not followed and
    /// unreadable entries are recorded in `skipped`
    fn find_files(&self, root: &Path, skipped: &mut Vec<SkippedFile>) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    skipped.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            if entry.file_type().is_dir() || !entry.path().is_file() {
                continue;
            }
            if self.matcher.is_match(entry.file_name()) {
                files.push(entry.into_path());
            }
        }
        files
    }

    fn collect_file(&self, root: &Path, path: &Path) -> Result<RunRecord, CollectError> {
        let content = fs::read_to_string(path)?;
        let mut record = match self.format {
            ReportFormat::TimeText => self.time_parser.parse(path, &content)?,
            ReportFormat::EcoJson => parse_eco_report(path, &content)?,
        };

        let tokens = PathTokens::from_path(path.strip_prefix(root).unwrap_or(path));
        if record.strategy.is_none() {
            record.strategy = tokens.strategy.map(|s| s.as_str().to_string());
        }
        if record.round.is_none() {
            record.round = tokens.round;
        }

        Ok(record)
    }
}

#[derive(Debug, thiserror::Error)]
enum CollectError {
    #[error("Cannot read file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Round and strategy encoded in a run directory path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathTokens {
    pub round: Option<u32>,
    pub strategy: Option<Strategy>,
}

impl PathTokens {
    pub fn from_path(path: &Path) -> Self {
        let components: Vec<String> = path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        let round = components.iter().find_map(|c| round_token(c));
        let strategy = components.iter().find_map(|c| Strategy::detect(c));

        Self { round, strategy }
    }
}

/// `rodada-<N>` anywhere in a path component
fn round_token(component: &str) -> Option<u32> {
    let start = component.find("rodada-")? + "rodada-".len();
    let digits: String = component[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
