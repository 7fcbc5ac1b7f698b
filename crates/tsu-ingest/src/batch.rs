//! Batch processing: validate every row once, partition the outcomes, never
//! abort on a bad row.

use std::time::{Duration, Instant};

use tsu_schemas::PlayerEntity;

use crate::source::RawRow;
use crate::validator::{validate, Rejection, Validation};

/// Batches at least this large report progress.
pub const PROGRESS_THRESHOLD: usize = 250;

/// Receives incremental progress for large batches, once per 10% step.
pub trait ProgressObserver: Send {
    fn on_progress(&mut self, done: usize, total: usize);
}

/// Default observer: one `info` line per 10% step.
#[derive(Debug, Default)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn on_progress(&mut self, done: usize, total: usize) {
        let pct = done * 100 / total.max(1);
        tracing::info!(done, total, "Processing players: {pct}% ({done}/{total})");
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub rows_seen: usize,
    pub blank_skipped: usize,
    pub valid: usize,
    pub rejected: usize,
    pub advisories: usize,
    pub elapsed: Duration,
}

/// Tone of one summary line; the CLI maps it to a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryTone {
    Success,
    Warning,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub tone: SummaryTone,
    pub text: String,
}

impl SummaryLine {
    fn new(tone: SummaryTone, text: impl Into<String>) -> Self {
        Self {
            tone,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub entities: Vec<PlayerEntity>,
    pub rejections: Vec<Rejection>,
    pub stats: BatchStats,
}

impl Batch {
    /// Operator-facing summary, in display order.
    pub fn summary_lines(&self) -> Vec<SummaryLine> {
        let mut out = Vec::new();

        if self.rejections.is_empty() {
            out.push(SummaryLine::new(
                SummaryTone::Success,
                "Validation completed without any errors.",
            ));
        } else {
            out.push(SummaryLine::new(
                SummaryTone::Error,
                format!(
                    "Validation completed with {} error(s).",
                    self.rejections.len()
                ),
            ));
            for r in &self.rejections {
                out.push(SummaryLine::new(SummaryTone::Warning, r.to_string()));
            }
        }

        out.push(SummaryLine::new(
            SummaryTone::Success,
            format!("Successfully processed {} valid player(s).", self.stats.valid),
        ));
        if !self.rejections.is_empty() {
            out.push(SummaryLine::new(
                SummaryTone::Warning,
                format!(
                    "Skipped {} invalid player(s) due to validation errors.",
                    self.stats.rejected
                ),
            ));
        }
        if self.stats.advisories > 0 {
            out.push(SummaryLine::new(
                SummaryTone::Warning,
                format!("{} advisory warning(s) logged.", self.stats.advisories),
            ));
        }
        out.push(SummaryLine::new(
            SummaryTone::Info,
            format!("Done in {:.2} seconds.", self.stats.elapsed.as_secs_f64()),
        ));
        out
    }
}

pub struct BatchProcessor {
    observer: Box<dyn ProgressObserver>,
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchProcessor {
    pub fn new() -> Self {
        Self::with_observer(Box::new(TracingProgress))
    }

    pub fn with_observer(observer: Box<dyn ProgressObserver>) -> Self {
        Self { observer }
    }

    pub fn process(&mut self, rows: &[RawRow]) -> Batch {
        let started = Instant::now();
        let total = rows.len();
        let report = total >= PROGRESS_THRESHOLD;
        let mut last_decile = 0;

        let mut batch = Batch::default();
        batch.stats.rows_seen = total;

        for (i, row) in rows.iter().enumerate() {
            let row_index = i + 1;
            match validate(row, row_index) {
                Validation::Blank => batch.stats.blank_skipped += 1,
                Validation::Rejected(r) => {
                    for advisory in &r.advisories {
                        tracing::warn!(row = row_index, "Validation warning: {advisory}");
                    }
                    batch.stats.advisories += r.advisories.len();
                    tracing::debug!(
                        row = r.row,
                        reason = r.reason.as_str(),
                        "row rejected: {}",
                        r.detail
                    );
                    batch.stats.rejected += 1;
                    batch.rejections.push(r);
                }
                Validation::Accepted(accepted) => {
                    for advisory in &accepted.advisories {
                        tracing::warn!(
                            row = row_index,
                            player_id = accepted.entity.player_id,
                            "Validation warning: {advisory}"
                        );
                    }
                    batch.stats.advisories += accepted.advisories.len();
                    batch.stats.valid += 1;
                    batch.entities.push(accepted.entity);
                }
            }

            if report {
                let decile = row_index * 10 / total;
                if decile > last_decile {
                    last_decile = decile;
                    self.observer.on_progress(row_index, total);
                }
            }
        }

        batch.stats.elapsed = started.elapsed();
        batch
    }
}
