//! Command handler modules for tsu-cli.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod db;
pub mod upload;

use crate::logging::REPORT_TARGET;
use crate::style::{Styler, Tone};

/// Print one operator line to stdout (styled) and record it in the log file.
pub fn report(styler: &dyn Styler, tone: Tone, text: &str) {
    match tone {
        Tone::Warning | Tone::Error => tracing::warn!(target: REPORT_TARGET, "{text}"),
        _ => tracing::info!(target: REPORT_TARGET, "{text}"),
    }
    println!("{}", styler.paint(tone, text));
}
