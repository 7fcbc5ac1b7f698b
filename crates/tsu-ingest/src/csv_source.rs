//! Semicolon-delimited file source.
//!
//! ## File contract
//!
//! | Rule              | Detail                                                |
//! |-------------------|-------------------------------------------------------|
//! | Delimiter         | `;`                                                   |
//! | Header row        | mandatory; names are the raw row keys                 |
//! | Encoding          | UTF-8, optional leading BOM                           |
//! | Short rows        | allowed; missing trailing keys are simply absent      |
//! | Blank lines       | skipped by the reader                                 |
//!
//! Every cell is delivered as [`RawValue::Text`]; typing is the validator's job.

use std::path::{Path, PathBuf};

use crate::source::{RawRow, RawValue, RecordSource, SourceError};

pub const DELIMITER: u8 = b';';

const SOURCE_NAME: &str = "csv";

/// Reads one delimited file per run.
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    path: PathBuf,
}

impl CsvRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl RecordSource for CsvRecordSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn read(&self) -> Result<Vec<RawRow>, SourceError> {
        parse_csv_file(&self.path)
    }
}

/// Read and parse the file at `path`.
pub fn parse_csv_file(path: &Path) -> Result<Vec<RawRow>, SourceError> {
    let bytes = std::fs::read(path).map_err(|e| SourceError::Unavailable {
        source_name: SOURCE_NAME,
        reason: format!("open '{}': {e}", path.display()),
    })?;

    let text = String::from_utf8(bytes).map_err(|e| SourceError::Malformed {
        source_name: SOURCE_NAME,
        reason: format!("'{}' is not valid UTF-8: {e}", path.display()),
    })?;

    parse_csv_str(&text)
}

/// Parse delimited text from a string slice (tests, piped input).
///
/// See the module docs for the full contract.
pub fn parse_csv_str(src: &str) -> Result<Vec<RawRow>, SourceError> {
    let src = src.strip_prefix('\u{feff}').unwrap_or(src);

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(src.as_bytes());

    let headers = rdr.headers().map_err(malformed)?.clone();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(SourceError::Malformed {
            source_name: SOURCE_NAME,
            reason: "missing header row".to_string(),
        });
    }

    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec.map_err(malformed)?;

        let mut row = RawRow::new();
        // Cells beyond the header width have no name and are dropped.
        for (name, cell) in headers.iter().zip(rec.iter()) {
            if name.is_empty() {
                continue;
            }
            row.insert(name, RawValue::Text(cell.to_string()));
        }
        out.push(row);
    }

    Ok(out)
}

fn malformed(e: csv::Error) -> SourceError {
    let reason = match e.position() {
        Some(pos) => format!("line {}: {e}", pos.line()),
        None => e.to_string(),
    };
    SourceError::Malformed {
        source_name: SOURCE_NAME,
        reason,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
