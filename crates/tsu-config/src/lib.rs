//! tsu-config
//!
//! Single source of truth for uploader configuration.
//!
//! # Contract
//! - Callers resolve configuration **once** at startup via [`UploadConfig::from_env`]
//!   (or [`UploadConfig::from_lookup`] in tests) and pass the result into constructors.
//!   Never scatter `std::env::var` calls across the codebase.
//! - Every missing required variable is reported in one error, before any
//!   source or store is touched.
//! - Which variables are required depends on the selected record source:
//!
//! | Variable                          | Required             | Default |
//! |-----------------------------------|----------------------|---------|
//! | `TSU_DATABASE_URL`                | always               |         |
//! | `TSU_USE_GOOGLE_SHEETS`           | no                   | `false` |
//! | `TSU_CSV_PATH`                    | sheets disabled      |         |
//! | `TSU_GOOGLE_SERVICE_ACCOUNT_JSON` | sheets enabled       |         |
//! | `TSU_SPREADSHEET_ID`              | sheets enabled       |         |
//! | `TSU_DB_CONNECT_TIMEOUT_SECS`     | no                   | `5`     |
//! | `TSU_LOG_DIR`                     | no                   | `logs`  |
//! | `TSU_LOG_STYLE`                   | no                   | `auto`  |

pub mod secrets;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub use secrets::Secret;

pub const ENV_DATABASE_URL: &str = "TSU_DATABASE_URL";
pub const ENV_USE_GOOGLE_SHEETS: &str = "TSU_USE_GOOGLE_SHEETS";
pub const ENV_CSV_PATH: &str = "TSU_CSV_PATH";
pub const ENV_SERVICE_ACCOUNT_JSON: &str = "TSU_GOOGLE_SERVICE_ACCOUNT_JSON";
pub const ENV_SPREADSHEET_ID: &str = "TSU_SPREADSHEET_ID";
pub const ENV_DB_CONNECT_TIMEOUT_SECS: &str = "TSU_DB_CONNECT_TIMEOUT_SECS";
pub const ENV_LOG_DIR: &str = "TSU_LOG_DIR";
pub const ENV_LOG_STYLE: &str = "TSU_LOG_STYLE";

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_LOG_DIR: &str = "logs";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required variables that are unset or blank, in declaration order.
    Missing(Vec<&'static str>),
    /// A variable is set but its value cannot be used.
    Invalid { var: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(vars) => write!(
                f,
                "CONFIG_MISSING: required environment variables not set: {}",
                vars.join(", ")
            ),
            ConfigError::Invalid { var, reason } => {
                write!(f, "CONFIG_INVALID: {var}: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Where the uploader reads its rows from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    /// Semicolon-delimited file with a header row.
    Csv { path: PathBuf },
    /// First sheet of a remote spreadsheet, read with a service-account key.
    GoogleSheets {
        service_account_json: PathBuf,
        spreadsheet_id: String,
    },
}

impl SourceConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceConfig::Csv { .. } => "csv",
            SourceConfig::GoogleSheets { .. } => "google_sheets",
        }
    }
}

/// Console decoration preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStyle {
    /// Decorate only when stdout is a terminal.
    Auto,
    Color,
    Plain,
}

impl LogStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(LogStyle::Auto),
            "color" | "colour" | "always" => Some(LogStyle::Color),
            "plain" | "never" | "none" => Some(LogStyle::Plain),
            _ => None,
        }
    }
}

/// Fully resolved uploader configuration.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub database_url: Secret,
    pub source: SourceConfig,
    pub connect_timeout: Duration,
    pub log_dir: PathBuf,
    pub log_style: LogStyle,
}

impl UploadConfig {
    /// Resolve from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Resolve through an arbitrary lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let use_sheets = match secrets::resolve(&lookup, ENV_USE_GOOGLE_SHEETS) {
            None => false,
            Some(v) => parse_bool(&v).ok_or_else(|| ConfigError::Invalid {
                var: ENV_USE_GOOGLE_SHEETS,
                reason: format!("expected true or false, got '{v}'"),
            })?,
        };

        let mut missing: Vec<&'static str> = Vec::new();
        let mut require = |var: &'static str| {
            let v = secrets::resolve(&lookup, var);
            if v.is_none() {
                missing.push(var);
            }
            v
        };

        let database_url = require(ENV_DATABASE_URL);
        let source = if use_sheets {
            let key = require(ENV_SERVICE_ACCOUNT_JSON);
            let id = require(ENV_SPREADSHEET_ID);
            key.zip(id)
                .map(|(key, id)| SourceConfig::GoogleSheets {
                    service_account_json: PathBuf::from(key),
                    spreadsheet_id: id,
                })
        } else {
            require(ENV_CSV_PATH).map(|p| SourceConfig::Csv {
                path: PathBuf::from(p),
            })
        };

        let (database_url, source) = match (database_url, source) {
            (Some(url), Some(source)) if missing.is_empty() => (url, source),
            _ => return Err(ConfigError::Missing(missing)),
        };

        let connect_timeout = resolve_connect_timeout(&lookup)?;

        let log_dir = secrets::resolve(&lookup, ENV_LOG_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));

        let log_style = match secrets::resolve(&lookup, ENV_LOG_STYLE) {
            None => LogStyle::Auto,
            Some(v) => LogStyle::parse(&v).ok_or_else(|| ConfigError::Invalid {
                var: ENV_LOG_STYLE,
                reason: format!("expected auto | color | plain, got '{v}'"),
            })?,
        };

        Ok(UploadConfig {
            database_url: Secret::new(database_url),
            source,
            connect_timeout,
            log_dir,
            log_style,
        })
    }

    pub fn db(&self) -> DbConfig {
        DbConfig {
            database_url: self.database_url.clone(),
            connect_timeout: self.connect_timeout,
        }
    }
}

/// Store connection settings only (`tsu db ...` needs no record source).
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: Secret,
    pub connect_timeout: Duration,
}

impl DbConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = secrets::resolve(&lookup, ENV_DATABASE_URL)
            .ok_or_else(|| ConfigError::Missing(vec![ENV_DATABASE_URL]))?;
        Ok(DbConfig {
            database_url: Secret::new(database_url),
            connect_timeout: resolve_connect_timeout(&lookup)?,
        })
    }
}

fn resolve_connect_timeout<F>(lookup: &F) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match secrets::resolve(lookup, ENV_DB_CONNECT_TIMEOUT_SECS) {
        None => Ok(DEFAULT_CONNECT_TIMEOUT),
        Some(v) => match v.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::Invalid {
                var: ENV_DB_CONNECT_TIMEOUT_SECS,
                reason: format!("expected a positive number of seconds, got '{v}'"),
            }),
        },
    }
}

/// Logging settings only. Resolvable even when the rest of the config is
/// broken, so the config error itself can be logged to file.
pub fn log_settings_from_env() -> (PathBuf, LogStyle) {
    let lookup = |k: &str| std::env::var(k).ok();
    let dir = secrets::resolve(&lookup, ENV_LOG_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));
    let style = secrets::resolve(&lookup, ENV_LOG_STYLE)
        .and_then(|v| LogStyle::parse(&v))
        .unwrap_or(LogStyle::Auto);
    (dir, style)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_variants() {
        for s in ["true", "TRUE", "1", "yes"] {
            assert_eq!(parse_bool(s), Some(true), "failed for '{s}'");
        }
        for s in ["false", "False", "0", "no"] {
            assert_eq!(parse_bool(s), Some(false), "failed for '{s}'");
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn log_style_parse() {
        assert_eq!(LogStyle::parse("AUTO"), Some(LogStyle::Auto));
        assert_eq!(LogStyle::parse("color"), Some(LogStyle::Color));
        assert_eq!(LogStyle::parse("plain"), Some(LogStyle::Plain));
        assert_eq!(LogStyle::parse("rainbow"), None);
    }

    #[test]
    fn db_config_needs_only_the_url() {
        let cfg = DbConfig::from_lookup(|k| {
            (k == ENV_DATABASE_URL).then(|| "postgres://u:p@localhost/tsu".to_string())
        })
        .unwrap();
        assert_eq!(cfg.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert!(!format!("{cfg:?}").contains("u:p"));

        let err = DbConfig::from_lookup(|_| None).unwrap_err();
        assert_eq!(err, ConfigError::Missing(vec![ENV_DATABASE_URL]));
    }

    #[test]
    fn missing_error_lists_all_names() {
        let e = ConfigError::Missing(vec![ENV_DATABASE_URL, ENV_CSV_PATH]);
        let s = e.to_string();
        assert!(s.contains("TSU_DATABASE_URL"));
        assert!(s.contains("TSU_CSV_PATH"));
    }
}
