//! `tsu upload`: source -> batch -> reconcile (or preview).

use anyhow::{Context, Result};
use tsu_config::{SourceConfig, UploadConfig};
use tsu_db::PgSnapshotStore;
use tsu_ingest::{BatchProcessor, CsvRecordSource, RecordSource, SheetsRecordSource};
use tsu_reconcile::{
    EmptyBatchPolicy, PreviewLine, ReconcileError, ReconcileMode, Reconciler, WriteResult,
};

use super::report;
use crate::style::{Styler, Tone};

#[derive(Debug, Clone, Copy, Default)]
pub struct UploadArgs {
    pub dry_run: bool,
    pub refuse_empty: bool,
}

pub async fn run(cfg: &UploadConfig, args: UploadArgs, styler: &dyn Styler) -> Result<()> {
    let mode = if args.dry_run {
        ReconcileMode::DryRun
    } else {
        ReconcileMode::Live
    };
    tracing::info!(source = cfg.source.kind(), ?mode, "upload starting");

    // Fail fast on the store before touching the source.
    let pool = tsu_db::connect(&cfg.db())
        .await
        .map_err(|e| ReconcileError::StoreUnavailable(format!("{e:#}")))?;
    let store = PgSnapshotStore::new(pool, cfg.connect_timeout);

    let source = record_source(&cfg.source);
    let rows = source
        .read()
        .await
        .with_context(|| format!("read records from {} failed", source.name()))?;
    tracing::info!(rows = rows.len(), "records loaded");

    let batch = BatchProcessor::new().process(&rows);
    for line in batch.summary_lines() {
        report(styler, line.tone.into(), &line.text);
    }

    let policy = if args.refuse_empty {
        EmptyBatchPolicy::Refuse
    } else {
        EmptyBatchPolicy::Clear
    };
    let result = Reconciler::new(&store)
        .with_empty_policy(policy)
        .with_ping_timeout(cfg.connect_timeout)
        .reconcile(&batch.entities, mode)
        .await?;

    match result {
        WriteResult::Preview { lines, would_write } => {
            report(styler, Tone::Info, "[DRY-RUN] Preview of first entries:");
            for line in &lines {
                report_preview_line(styler, line);
            }
            report(
                styler,
                Tone::Info,
                &format!("[DRY-RUN] {would_write} player(s) would be written; store unchanged."),
            );
        }
        WriteResult::Replaced { cleared, upserted } => {
            tracing::info!(cleared, "previous snapshot cleared");
            report(
                styler,
                Tone::Success,
                &format!("Updated {upserted} entries successfully."),
            );
        }
    }
    Ok(())
}

fn record_source(cfg: &SourceConfig) -> Box<dyn RecordSource> {
    match cfg {
        SourceConfig::Csv { path } => Box::new(CsvRecordSource::new(path.clone())),
        SourceConfig::GoogleSheets {
            service_account_json,
            spreadsheet_id,
        } => Box::new(SheetsRecordSource::new(
            service_account_json.clone(),
            spreadsheet_id.clone(),
        )),
    }
}

/// Same text as `PreviewLine`'s `Display`, with the name and id colored.
fn report_preview_line(styler: &dyn Styler, line: &PreviewLine) {
    tracing::info!(target: crate::logging::REPORT_TARGET, "{line}");
    println!(
        "- {} (ID: {}), Total Entries: {}, Example Groups: {}",
        styler.paint(Tone::Accent, &line.player_name),
        styler.paint(Tone::Muted, &line.player_id.to_string()),
        line.total_entries,
        line.example_groups.join(", ")
    );
}
