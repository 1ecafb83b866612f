//! CSV persistence for derived run records
//!
//! One row per record with a fixed header. Absent values are empty cells.
//! Files are appended to: repeated analyses add rows and never overwrite.

use crate::record::{DerivedMetrics, DerivedRecord, EnergySource, RunRecord};
use anyhow::{anyhow, bail, Context, Result};
use csv::StringRecord;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column set, in output order
pub const COLUMNS: [&str; 19] = [
    "rodada",
    "run_id",
    "estrategia",
    "tempo_s",
    "cpu_user_s",
    "cpu_sys_s",
    "cpu_pct",
    "mem_max_kb",
    "mem_max_mb",
    "ctx_switches_vol",
    "ctx_switches_invol",
    "testes_executados",
    "energia_j",
    "co2_g",
    "cpu_total_s",
    "energia_estimada_j",
    "energia_fonte",
    "edp",
    "source",
];

/// CSV formatter for derived records
#[derive(Debug, Default)]
pub struct CsvOutput {
    rows: Vec<Vec<String>>,
}

impl CsvOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self, record: &DerivedRecord) {
        self.rows.push(Self::format_record(record));
    }

    pub fn header() -> String {
        COLUMNS.join(",")
    }

    fn opt<T: ToString>(value: Option<T>) -> String {
        value.map(|v| v.to_string()).unwrap_or_default()
    }

    fn format_record(record: &DerivedRecord) -> Vec<String> {
        let r = &record.record;
        let d = &record.derived;
        vec![
            Self::opt(r.round),
            r.run_id.clone().unwrap_or_default(),
            r.strategy.clone().unwrap_or_default(),
            Self::opt(r.wall_time_s),
            Self::opt(r.cpu_user_s),
            Self::opt(r.cpu_sys_s),
            Self::opt(r.cpu_percent),
            Self::opt(r.max_rss_kb),
            Self::opt(r.max_rss_mb()),
            Self::opt(r.voluntary_ctx_switches),
            Self::opt(r.involuntary_ctx_switches),
            Self::opt(r.tests_executed),
            Self::opt(d.energy_j),
            Self::opt(r.co2_g),
            Self::opt(d.cpu_total_s),
            Self::opt(d.energy_estimated_j),
            Self::opt(d.energy_source.map(|s| s.as_str())),
            Self::opt(d.edp),
            r.source.to_string_lossy().into_owned(),
        ]
    }

    /// Rows without header, one field per column
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    fn write_rows<W: Write>(&self, writer: &mut csv::Writer<W>, with_header: bool) -> Result<()> {
        if with_header {
            writer.write_record(COLUMNS)?;
        }
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Complete document with header
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        self.write_rows(&mut writer, true)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to finish CSV buffer: {}", e.error()))?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Append rows to `path`, writing the header first when the file is new
    /// or empty
    pub fn append_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        self.write_rows(&mut writer, needs_header)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Append derived records to a CSV file
pub fn append_records(path: &Path, records: &[DerivedRecord]) -> Result<()> {
    let mut output = CsvOutput::new();
    for record in records {
        output.add_record(record);
    }
    output.append_to(path)
}

/// Cells of one row looked up by column name
struct Row<'a> {
    fields: &'a StringRecord,
    /// index[i] = position in the file of COLUMNS[i]
    index: &'a [Option<usize>],
    line: u64,
}

impl Row<'_> {
    fn cell(&self, name: &str) -> Option<&str> {
        let pos = COLUMNS.iter().position(|c| *c == name)?;
        let field = self.fields.get((*self.index.get(pos)?)?)?.trim();
        (!field.is_empty()).then_some(field)
    }

    fn parsed<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>> {
        match self.cell(name) {
            Some(text) => text.parse::<T>().map(Some).map_err(|_| {
                anyhow!("line {}: malformed {} value {:?}", self.line, name, text)
            }),
            None => Ok(None),
        }
    }
}

/// Read records previously written by `append_records`
///
/// Columns are located by header name, so files with reordered or missing
/// columns still load; a repeated header row (from concatenated files) is
/// skipped.
pub fn read_records(path: &Path) -> Result<Vec<DerivedRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let header = reader
        .headers()
        .with_context(|| format!("Failed to read {}", path.display()))?
        .clone();
    if header.iter().all(|h| h.trim().is_empty()) {
        return Ok(Vec::new());
    }
    if !header.iter().any(|h| h == "estrategia") {
        bail!("{} has no 'estrategia' column", path.display());
    }
    let index: Vec<Option<usize>> = COLUMNS
        .iter()
        .map(|c| header.iter().position(|h| h == *c))
        .collect();

    let mut records = Vec::new();
    for fields in reader.records() {
        let fields = fields.with_context(|| format!("Failed to read {}", path.display()))?;
        if fields.iter().eq(header.iter()) || fields.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let row = Row {
            fields: &fields,
            index: &index,
            line: fields.position().map_or(0, |p| p.line()),
        };

        let energy_source = row.cell("energia_fonte").and_then(EnergySource::from_token);
        let energy_j: Option<f64> = row.parsed("energia_j")?;
        let record = RunRecord {
            source: row
                .cell("source")
                .map(PathBuf::from)
                .unwrap_or_else(|| path.to_path_buf()),
            strategy: row.cell("estrategia").map(str::to_string),
            round: row.parsed("rodada")?,
            run_id: row.cell("run_id").map(str::to_string),
            wall_time_s: row.parsed("tempo_s")?,
            cpu_user_s: row.parsed("cpu_user_s")?,
            cpu_sys_s: row.parsed("cpu_sys_s")?,
            cpu_percent: row.parsed("cpu_pct")?,
            max_rss_kb: row.parsed("mem_max_kb")?,
            voluntary_ctx_switches: row.parsed("ctx_switches_vol")?,
            involuntary_ctx_switches: row.parsed("ctx_switches_invol")?,
            tests_executed: row.parsed("testes_executados")?,
            energy_j: if energy_source == Some(EnergySource::Measured) {
                energy_j
            } else {
                None
            },
            co2_g: row.parsed("co2_g")?,
        };

        records.push(DerivedRecord {
            record,
            derived: DerivedMetrics {
                cpu_total_s: row.parsed("cpu_total_s")?,
                energy_estimated_j: row.parsed("energia_estimada_j")?,
                energy_j,
                energy_source,
                edp: row.parsed("edp")?,
            },
        });
    }

    Ok(records)
}
