//! Parser for `/usr/bin/time -v` captures
//!
//! The CI workflow writes one `metrics.txt` per run containing a short header
//! (strategy, run id), the test runner output and the resource-usage block
//! printed by GNU time:
//!
//! ```text
//! Estratégia: tia
//! Run ID: 19913403957
//! ===== 12 passed in 0.52s =====
//!     User time (seconds): 1.23
//!     System time (seconds): 0.12
//!     Percent of CPU this job got: 95%
//!     Elapsed (wall clock) time (h:mm:ss or m:ss): 0:01.42
//!     Maximum resident set size (kbytes): 45120
//!     Voluntary context switches: 123
//!     Involuntary context switches: 45
//! ```
//!
//! Extraction is table-driven: each `FieldExtractor` pairs a field with its
//! pattern and a normalizer, so a single field can be added or tested alone.

use super::{parse_f64, parse_u64, ParseError};
use crate::record::RunRecord;
use regex::{Captures, Regex};
use std::path::Path;

/// Fields extracted from a resource-usage report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeField {
    Strategy,
    RunId,
    WallTime,
    UserTime,
    SystemTime,
    CpuPercent,
    MaxResidentMemory,
    VoluntaryContextSwitches,
    InvoluntaryContextSwitches,
    TestsPassed,
}

impl TimeField {
    pub fn name(&self) -> &'static str {
        match self {
            TimeField::Strategy => "strategy",
            TimeField::RunId => "run_id",
            TimeField::WallTime => "wall_time",
            TimeField::UserTime => "user_time",
            TimeField::SystemTime => "system_time",
            TimeField::CpuPercent => "cpu_percent",
            TimeField::MaxResidentMemory => "max_rss",
            TimeField::VoluntaryContextSwitches => "voluntary_ctx_switches",
            TimeField::InvoluntaryContextSwitches => "involuntary_ctx_switches",
            TimeField::TestsPassed => "tests_passed",
        }
    }
}

/// Which match wins when a pattern occurs more than once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    First,
    Last,
}

type Normalizer = fn(&Captures<'_>, &mut RunRecord) -> Result<(), ParseError>;

/// One row of the extraction table: field -> pattern -> normalizer
pub struct FieldExtractor {
    pub field: TimeField,
    pattern: Regex,
    occurrence: Occurrence,
    normalize: Normalizer,
}

impl std::fmt::Debug for FieldExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldExtractor")
            .field("field", &self.field)
            .field("pattern", &self.pattern.as_str())
            .field("occurrence", &self.occurrence)
            .finish()
    }
}

impl FieldExtractor {
    pub fn new(
        field: TimeField,
        pattern: &str,
        occurrence: Occurrence,
        normalize: Normalizer,
    ) -> Result<Self, ParseError> {
        Ok(Self {
            field,
            pattern: Regex::new(pattern)?,
            occurrence,
            normalize,
        })
    }

    /// Apply this extractor to `content`
    ///
    /// Returns `Ok(false)` when the pattern is absent (the field stays unset).
    pub fn apply(&self, content: &str, record: &mut RunRecord) -> Result<bool, ParseError> {
        let captures = match self.occurrence {
            Occurrence::First => self.pattern.captures(content),
            Occurrence::Last => self.pattern.captures_iter(content).last(),
        };

        match captures {
            Some(caps) => {
                (self.normalize)(&caps, record)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Group `i` of a match; every table pattern guarantees its groups participate
fn group<'t>(caps: &Captures<'t>, i: usize) -> &'t str {
    caps.get(i).map_or("", |m| m.as_str())
}

fn set_strategy(caps: &Captures<'_>, record: &mut RunRecord) -> Result<(), ParseError> {
    record.strategy = Some(group(caps, 1).to_lowercase());
    Ok(())
}

fn set_run_id(caps: &Captures<'_>, record: &mut RunRecord) -> Result<(), ParseError> {
    record.run_id = Some(group(caps, 1).to_string());
    Ok(())
}

/// `[H:]M:SS[.ss]` -> seconds
fn set_wall_time(caps: &Captures<'_>, record: &mut RunRecord) -> Result<(), ParseError> {
    let hours = match caps.get(1) {
        Some(h) => parse_u64("wall_time", h.as_str())?,
        None => 0,
    };
    let minutes = parse_u64("wall_time", group(caps, 2))?;
    let seconds = parse_f64("wall_time", group(caps, 3))?;
    let whole = hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60)?.checked_add(h))
        .ok_or_else(|| ParseError::InvalidNumber {
            field: "wall_time",
            value: group(caps, 0).to_string(),
        })?;
    record.wall_time_s = Some(whole as f64 + seconds);
    Ok(())
}

fn set_user_time(caps: &Captures<'_>, record: &mut RunRecord) -> Result<(), ParseError> {
    record.cpu_user_s = Some(parse_f64("user_time", group(caps, 1))?);
    Ok(())
}

fn set_system_time(caps: &Captures<'_>, record: &mut RunRecord) -> Result<(), ParseError> {
    record.cpu_sys_s = Some(parse_f64("system_time", group(caps, 1))?);
    Ok(())
}

fn set_cpu_percent(caps: &Captures<'_>, record: &mut RunRecord) -> Result<(), ParseError> {
    record.cpu_percent = Some(parse_u64("cpu_percent", group(caps, 1))? as f64);
    Ok(())
}

fn set_max_rss(caps: &Captures<'_>, record: &mut RunRecord) -> Result<(), ParseError> {
    record.max_rss_kb = Some(parse_u64("max_rss", group(caps, 1))?);
    Ok(())
}

fn set_voluntary(caps: &Captures<'_>, record: &mut RunRecord) -> Result<(), ParseError> {
    record.voluntary_ctx_switches = Some(parse_u64("voluntary_ctx_switches", group(caps, 1))?);
    Ok(())
}

fn set_involuntary(caps: &Captures<'_>, record: &mut RunRecord) -> Result<(), ParseError> {
    record.involuntary_ctx_switches =
        Some(parse_u64("involuntary_ctx_switches", group(caps, 1))?);
    Ok(())
}

fn set_tests_passed(caps: &Captures<'_>, record: &mut RunRecord) -> Result<(), ParseError> {
    record.tests_executed = Some(parse_u64("tests_passed", group(caps, 1))?);
    Ok(())
}

const EXTRACTION_TABLE: &[(TimeField, &str, Occurrence, Normalizer)] = &[
    (
        TimeField::Strategy,
        r"(?:Estratégia|Estrategia|Strategy):\s+(\w+)",
        Occurrence::First,
        set_strategy,
    ),
    (
        TimeField::RunId,
        r"Run ID:\s+(\d+)",
        Occurrence::First,
        set_run_id,
    ),
    (
        TimeField::WallTime,
        r"Elapsed.*?:\s+(?:(\d+):)?(\d+):(\d+(?:\.\d+)?)",
        Occurrence::First,
        set_wall_time,
    ),
    (
        TimeField::UserTime,
        r"User time.*?:\s+(\d+(?:\.\d+)?)",
        Occurrence::First,
        set_user_time,
    ),
    (
        TimeField::SystemTime,
        r"System time.*?:\s+(\d+(?:\.\d+)?)",
        Occurrence::First,
        set_system_time,
    ),
    (
        TimeField::CpuPercent,
        r"Percent of CPU.*?:\s+(\d+)%",
        Occurrence::First,
        set_cpu_percent,
    ),
    (
        TimeField::MaxResidentMemory,
        r"Maximum resident set size.*?:\s+(\d+)",
        Occurrence::First,
        set_max_rss,
    ),
    (
        TimeField::VoluntaryContextSwitches,
        r"Voluntary context switches.*?:\s+(\d+)",
        Occurrence::First,
        set_voluntary,
    ),
    (
        TimeField::InvoluntaryContextSwitches,
        r"Involuntary context switches.*?:\s+(\d+)",
        Occurrence::First,
        set_involuntary,
    ),
    (
        TimeField::TestsPassed,
        r"(\d+) passed",
        Occurrence::Last,
        set_tests_passed,
    ),
];

/// Table-driven parser for resource-usage text reports
#[derive(Debug)]
pub struct TimeReportParser {
    extractors: Vec<FieldExtractor>,
}

impl TimeReportParser {
    /// Compile the extraction table
    pub fn new() -> Result<Self, ParseError> {
        let extractors = EXTRACTION_TABLE
            .iter()
            .map(|&(field, pattern, occurrence, normalize)| {
                FieldExtractor::new(field, pattern, occurrence, normalize)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { extractors })
    }

    pub fn extractors(&self) -> &[FieldExtractor] {
        &self.extractors
    }

    pub fn extractor(&self, field: TimeField) -> Option<&FieldExtractor> {
        self.extractors.iter().find(|e| e.field == field)
    }

    /// Parse one report
    ///
    /// Missing fields are left unset. A report in which no field matched
    /// is `ParseError::Unrecognized`; a malformed number aborts the file.
    pub fn parse(&self, path: &Path, content: &str) -> Result<RunRecord, ParseError> {
        let mut record = RunRecord::new(path);
        let mut matched = 0usize;

        for extractor in &self.extractors {
            if extractor.apply(content, &mut record)? {
                matched += 1;
            } else {
                tracing::trace!(
                    "{}: field {} not found",
                    path.display(),
                    extractor.field.name()
                );
            }
        }

        if matched == 0 {
            return Err(ParseError::Unrecognized);
        }

        Ok(record)
    }
}
