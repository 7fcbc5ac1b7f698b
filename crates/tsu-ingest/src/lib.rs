//! tsu-ingest
//!
//! Score ingestion: record sources (delimited file, remote spreadsheet), the
//! per-row validator and the batch processor.
//!
//! This crate does **not** touch the store; callers (CLI) hand the validated
//! batch to `tsu-reconcile`.

pub mod batch;
pub mod csv_source;
pub mod sheets;
pub mod source;
pub mod validator;

pub use batch::{
    Batch, BatchProcessor, BatchStats, ProgressObserver, SummaryLine, SummaryTone,
    TracingProgress, PROGRESS_THRESHOLD,
};
pub use csv_source::CsvRecordSource;
pub use sheets::{ServiceAccountKey, SheetsRecordSource};
pub use source::{RawRow, RawValue, RecordSource, SourceError};
pub use validator::{
    validate, AcceptedRow, Advisory, Rejection, RejectionReason, Validation, MAX_TOTAL_ENTRIES,
};
