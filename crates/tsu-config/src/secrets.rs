//! Secret-bearing configuration values.
//!
//! # Contract
//! - `Debug` impls **redact** values; only the env var NAME is ever printed.
//! - Error messages reference the env var **NAME**, never the value.

use std::fmt;

/// A configuration value that must never appear in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw value. Callers hand it straight to the consuming client.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<REDACTED>")
    }
}

/// Resolve a named variable through `lookup`.
/// Returns `None` if the variable is unset or its value is blank.
pub(crate) fn resolve<F>(lookup: &F, var_name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var_name) {
        Some(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}
