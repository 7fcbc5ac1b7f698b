//! Record-source boundary for score ingestion.
//!
//! This module defines **only** the raw row types and the source trait.
//! No concrete source implementations and no validation belong here.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Raw values / rows
// ---------------------------------------------------------------------------

/// One loosely typed cell as delivered by a source.
///
/// Delimited files only ever produce [`RawValue::Text`]; spreadsheet cells
/// that the API returns as numbers arrive as `Integer` / `Float`.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl RawValue {
    /// `true` for text that is empty after trimming. Numbers are never blank.
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Text(s) => s.trim().is_empty(),
            RawValue::Integer(_) | RawValue::Float(_) => false,
        }
    }

    /// Textual form, as an operator would see it in the sheet.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            RawValue::Text(s) => Cow::Borrowed(s.as_str()),
            RawValue::Integer(v) => Cow::Owned(v.to_string()),
            RawValue::Float(v) => Cow::Owned(v.to_string()),
        }
    }

    /// Parse as a signed integer.
    ///
    /// Text is trimmed first. Floats are accepted only when integral and
    /// in `i64` range (spreadsheets report whole numbers as `12.0` at times).
    pub fn parse_i64(&self) -> Option<i64> {
        match self {
            RawValue::Text(s) => s.trim().parse::<i64>().ok(),
            RawValue::Integer(v) => Some(*v),
            RawValue::Float(v) => {
                if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e18 {
                    Some(*v as i64)
                } else {
                    None
                }
            }
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Integer(v)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Float(v)
    }
}

/// One untyped record, keyed by header name. No invariants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    fields: HashMap<String, RawValue>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RawValue>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Later inserts for the same key overwrite earlier ones.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields.get(key)
    }

    /// The value for `key` unless it is absent or blank.
    pub fn non_blank(&self, key: &str) -> Option<&RawValue> {
        self.get(key).filter(|v| !v.is_blank())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Fatal source failures. Row-level problems are never reported here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The source cannot be reached or read: bad path, auth failure, network
    /// failure, unexpected HTTP status.
    Unavailable {
        source_name: &'static str,
        reason: String,
    },
    /// The source was read but is structurally unusable (no header row,
    /// broken encoding, undecodable payload).
    Malformed {
        source_name: &'static str,
        reason: String,
    },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Unavailable {
                source_name,
                reason,
            } => write!(f, "source '{source_name}' unavailable: {reason}"),
            SourceError::Malformed {
                source_name,
                reason,
            } => write!(f, "source '{source_name}' malformed: {reason}"),
        }
    }
}

impl std::error::Error for SourceError {}

// ---------------------------------------------------------------------------
// Source trait
// ---------------------------------------------------------------------------

/// Supplier of raw rows for one run.
///
/// Implementations are object-safe so the CLI can pick one at startup and
/// hold a `Box<dyn RecordSource>`.
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Short stable identifier used in logs and errors (e.g. `"csv"`).
    fn name(&self) -> &'static str;

    /// Read every row, in source order. Called once per run.
    async fn read(&self) -> Result<Vec<RawRow>, SourceError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
