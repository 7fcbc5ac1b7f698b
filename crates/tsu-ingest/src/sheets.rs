//! Remote spreadsheet source (Google Sheets v4 values API).
//!
//! Flow for one [`RecordSource::read`]:
//! 1. load the service-account key file,
//! 2. sign an RS256 assertion and exchange it at the key's `token_uri`,
//! 3. resolve the title of the first sheet,
//! 4. fetch that sheet's values unformatted and map them to [`RawRow`]s.
//!
//! The key's private material is never logged; `Debug` is redacted.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::source::{RawRow, RawValue, RecordSource, SourceError};

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";
pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

const SOURCE_NAME: &str = "google_sheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

fn unavailable(reason: String) -> SourceError {
    SourceError::Unavailable {
        source_name: SOURCE_NAME,
        reason,
    }
}

// ---------------------------------------------------------------------------
// Service-account key
// ---------------------------------------------------------------------------

/// The subset of a service-account JSON key file needed for token exchange.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    private_key: String,
    #[serde(default)]
    private_key_id: Option<String>,
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<REDACTED>")
            .field("private_key_id", &self.private_key_id.as_ref().map(|_| "<REDACTED>"))
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            unavailable(format!("read service account key '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SourceError> {
        serde_json::from_str(raw)
            .map_err(|e| unavailable(format!("service account key json decode failed: {e}")))
    }

    /// Signed RS256 assertion valid from `now_epoch` for one hour.
    pub fn assertion(&self, scope: &str, now_epoch: i64) -> Result<String, SourceError> {
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope,
            aud: &self.token_uri,
            iat: now_epoch,
            exp: now_epoch + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| unavailable(format!("service account private key unusable: {e}")))?;

        jsonwebtoken::encode(&header, &claims, &key)
            .map_err(|e| unavailable(format!("sign service account assertion failed: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Reads every record of the first sheet of one spreadsheet.
#[derive(Debug, Clone)]
pub struct SheetsRecordSource {
    key_path: PathBuf,
    spreadsheet_id: String,
    http: reqwest::Client,
    base_url: String,
}

impl SheetsRecordSource {
    pub fn new(key_path: impl Into<PathBuf>, spreadsheet_id: impl Into<String>) -> Self {
        Self::new_with_base_url(key_path, spreadsheet_id, DEFAULT_SHEETS_BASE_URL)
    }

    pub fn new_with_base_url(
        key_path: impl Into<PathBuf>,
        spreadsheet_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            key_path: key_path.into(),
            spreadsheet_id: spreadsheet_id.into(),
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    async fn access_token(&self, key: &ServiceAccountKey) -> Result<String, SourceError> {
        let assertion = key.assertion(SHEETS_READONLY_SCOPE, Utc::now().timestamp())?;

        let resp = self
            .http
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| unavailable(format!("token request failed: {e}")))?;

        let token: TokenResponse = decode_json(resp, "token").await?;
        Ok(token.access_token)
    }

    async fn first_sheet_title(&self, token: &str) -> Result<String, SourceError> {
        let url = self.spreadsheet_url(&[])?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .await
            .map_err(|e| unavailable(format!("spreadsheet metadata request failed: {e}")))?;

        let meta: SpreadsheetMeta = decode_json(resp, "spreadsheet metadata").await?;
        meta.sheets
            .into_iter()
            .next()
            .map(|s| s.properties.title)
            .ok_or_else(|| {
                unavailable(format!("spreadsheet '{}' has no sheets", self.spreadsheet_id))
            })
    }

    async fn fetch_values(&self, token: &str, title: &str) -> Result<Vec<Vec<Value>>, SourceError> {
        let range = sheet_range(title);
        let url = self.spreadsheet_url(&["values", range.as_str()])?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(&[
                ("valueRenderOption", "UNFORMATTED_VALUE"),
                ("majorDimension", "ROWS"),
            ])
            .send()
            .await
            .map_err(|e| unavailable(format!("sheet values request failed: {e}")))?;

        let body: ValueRange = decode_json(resp, "sheet values").await?;
        Ok(body.values)
    }

    fn spreadsheet_url(&self, tail: &[&str]) -> Result<reqwest::Url, SourceError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| unavailable(format!("invalid sheets base url '{}': {e}", self.base_url)))?;
        {
            let mut segs = url.path_segments_mut().map_err(|_| {
                unavailable(format!("sheets base url '{}' cannot be a base", self.base_url))
            })?;
            segs.pop_if_empty()
                .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str()])
                .extend(tail);
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl RecordSource for SheetsRecordSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn read(&self) -> Result<Vec<RawRow>, SourceError> {
        let key = ServiceAccountKey::from_file(&self.key_path)?;
        let token = self.access_token(&key).await?;
        let title = self.first_sheet_title(&token).await?;
        let values = self.fetch_values(&token, &title).await?;
        Ok(values_to_rows(values))
    }
}

async fn decode_json<T: DeserializeOwned>(
    resp: reqwest::Response,
    what: &str,
) -> Result<T, SourceError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(unavailable(format!(
            "{what} http error status={} body={}",
            status.as_u16(),
            body.chars().take(200).collect::<String>()
        )));
    }
    resp.json::<T>()
        .await
        .map_err(|e| unavailable(format!("{what} response json decode failed: {e}")))
}

/// A1 range covering a whole sheet. Quotes inside the title are doubled.
fn sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

// ---------------------------------------------------------------------------
// Values -> rows
// ---------------------------------------------------------------------------

/// Map a values-API grid to row mappings.
///
/// The first row is the header. The API omits trailing empty cells, so short
/// rows are padded with empty text up to the header width. Columns with an
/// empty header are dropped.
pub fn values_to_rows(values: Vec<Vec<Value>>) -> Vec<RawRow> {
    let mut it = values.into_iter();
    let header: Vec<String> = match it.next() {
        Some(h) => h
            .iter()
            .map(|v| cell_to_raw(v).as_text().trim().to_string())
            .collect(),
        None => return Vec::new(),
    };

    it.map(|cells| {
        let mut row = RawRow::new();
        for (i, name) in header.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            let value = cells
                .get(i)
                .map(cell_to_raw)
                .unwrap_or_else(|| RawValue::Text(String::new()));
            row.insert(name.as_str(), value);
        }
        row
    })
    .collect()
}

fn cell_to_raw(v: &Value) -> RawValue {
    match v {
        Value::String(s) => RawValue::Text(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                RawValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                RawValue::Float(f)
            } else {
                RawValue::Text(n.to_string())
            }
        }
        Value::Bool(b) => RawValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Value::Null => RawValue::Text(String::new()),
        other => RawValue::Text(other.to_string()),
    }
}

// -----------------
// Tests (no network)
// -----------------
