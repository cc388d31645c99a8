//! Flat CSV file source.
//!
//! Expected layout: a header row followed by one record per line. Columns are
//! matched case-insensitively and may appear in any order:
//!
//! | Column | Required | Aliases |
//! |--------|----------|---------|
//! | `timestamp` | yes | |
//! | `return` | yes | `returns`, `return_value`, `pnl` |
//! | `inventory` | yes | |
//! | `spread` | no (defaults to 0) | `spread_bps` |
//!
//! Fields are plain comma-separated values; quoting is not supported.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use super::{RecordSource, SourceError};
use crate::domain::PeriodRecord;

const RETURN_COLUMNS: [&str; 4] = ["return", "returns", "return_value", "pnl"];
const SPREAD_COLUMNS: [&str; 2] = ["spread", "spread_bps"];

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Record source backed by a CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    path: PathBuf,
}

impl CsvRecordSource {
    /// Create a source reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse CSV text into records.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` for a missing header, a missing required column
    /// or an unparseable field.
    pub fn parse(&self, content: &str) -> Result<Vec<PeriodRecord>, SourceError> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let Some((_, header)) = lines.next() else {
            return Err(SourceError::MissingHeader {
                path: self.path.clone(),
            });
        };
        let layout = ColumnLayout::from_header(header.trim_start_matches('\u{feff}'), &self.path)?;

        let mut records = Vec::new();
        for (line_no, line) in lines {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            records.push(layout.parse_row(line_no, &fields)?);
        }

        Ok(records)
    }
}

impl RecordSource for CsvRecordSource {
    fn load(&self) -> Result<Vec<PeriodRecord>, SourceError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;

        let records = self.parse(&content)?;
        tracing::debug!(
            path = %self.path.display(),
            records = records.len(),
            "Loaded period records"
        );
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}

/// Positions of the recognised columns within a row.
#[derive(Debug)]
struct ColumnLayout {
    timestamp: usize,
    return_value: (usize, &'static str),
    inventory: usize,
    spread: Option<(usize, &'static str)>,
}

impl ColumnLayout {
    fn from_header(header: &str, path: &Path) -> Result<Self, SourceError> {
        let names: Vec<String> = header
            .split(',')
            .map(|name| name.trim().to_ascii_lowercase())
            .collect();
        let find = |wanted: &str| names.iter().position(|name| name == wanted);
        let find_any = |candidates: &[&'static str]| {
            candidates
                .iter()
                .find_map(|candidate| find(*candidate).map(|idx| (idx, *candidate)))
        };
        let missing = |column: &str| SourceError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        };

        Ok(Self {
            timestamp: find("timestamp").ok_or_else(|| missing("timestamp"))?,
            return_value: find_any(&RETURN_COLUMNS).ok_or_else(|| missing("return"))?,
            inventory: find("inventory").ok_or_else(|| missing("inventory"))?,
            spread: find_any(&SPREAD_COLUMNS),
        })
    }

    fn parse_row(&self, line: usize, fields: &[&str]) -> Result<PeriodRecord, SourceError> {
        let field = |idx: usize, column: &str| {
            fields.get(idx).copied().ok_or_else(|| SourceError::Parse {
                line,
                column: column.to_string(),
                message: format!("expected at least {} fields, found {}", idx + 1, fields.len()),
            })
        };

        let raw_ts = field(self.timestamp, "timestamp")?;
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| SourceError::Parse {
            line,
            column: "timestamp".to_string(),
            message: format!("unrecognised timestamp '{raw_ts}'"),
        })?;

        let (ret_idx, ret_name) = self.return_value;
        let return_value = parse_number(line, ret_name, field(ret_idx, ret_name)?)?;
        let inventory = parse_number(line, "inventory", field(self.inventory, "inventory")?)?;
        let spread = match self.spread {
            Some((idx, name)) => parse_number(line, name, field(idx, name)?)?,
            None => 0.0,
        };

        Ok(PeriodRecord::new(timestamp, return_value, inventory, spread))
    }
}

fn parse_number(line: usize, column: &str, raw: &str) -> Result<f64, SourceError> {
    raw.parse::<f64>().map_err(|_| SourceError::Parse {
        line,
        column: column.to_string(),
        message: format!("invalid number '{raw}'"),
    })
}

/// Parse a timestamp in any of the accepted formats. Naive values are UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
}

/// Write records as CSV in the layout [`CsvRecordSource`] reads.
///
/// # Errors
///
/// Returns `SourceError::Io` when the file cannot be written.
pub fn write_records(path: &Path, records: &[PeriodRecord]) -> Result<(), SourceError> {
    let mut csv = String::from("timestamp,return,inventory,spread\n");
    for record in records {
        let _ = writeln!(
            csv,
            "{},{},{},{}",
            record
                .timestamp
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            record.return_value,
            record.inventory,
            record.spread,
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| SourceError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, csv).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}
