//! Process logging: console + daily-rotating file, one guard per process.
//!
//! `Logging::init` is called once at startup; dropping the returned value at
//! the end of `main` flushes the non-blocking file writer.

use std::io::IsTerminal;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{filter_fn, EnvFilter};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};
use tsu_config::LogStyle;

/// Rotated files are named `event_upload.log.<date>`.
pub const LOG_FILE_PREFIX: &str = "event_upload.log";
pub const MAX_LOG_FILES: usize = 7;

/// Target for operator report lines. The console layer skips it because
/// those lines are already printed, styled, on stdout.
pub const REPORT_TARGET: &str = "tsu::report";

pub struct Logging {
    _file_guard: WorkerGuard,
}

impl Logging {
    pub fn init(log_dir: &Path, style: LogStyle) -> Result<Self> {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("create log dir '{}' failed", log_dir.display()))?;

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .max_log_files(MAX_LOG_FILES)
            .build(log_dir)
            .with_context(|| format!("open log file in '{}' failed", log_dir.display()))?;
        let (file_writer, guard) = tracing_appender::non_blocking(appender);

        let ansi = match style {
            LogStyle::Color => true,
            LogStyle::Plain => false,
            LogStyle::Auto => std::io::stderr().is_terminal(),
        };

        let console = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(ansi)
            .with_target(false)
            .with_filter(filter_fn(|meta| meta.target() != REPORT_TARGET));

        let file = fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_target(false);

        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
            .with(console)
            .with(file)
            .try_init()
            .context("failed to set tracing subscriber")?;

        Ok(Self { _file_guard: guard })
    }
}
