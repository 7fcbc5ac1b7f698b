//! tsu-reconcile
//!
//! Snapshot reconciliation: bring the store to the state described by one
//! validated batch, or preview what that would do.
//!
//! - connectivity is checked before anything else, also in dry-run
//! - dry-run never mutates
//! - a live run fully supersedes the prior snapshot (clear + keyed upsert)
//! - an empty live batch clears unless the refuse policy is on
//!
//! Storage backends implement [`SnapshotStore`]; this crate ships only the
//! in-memory one. The Postgres store lives in `tsu-db`.

mod engine;
mod memory;
mod store;
mod types;

pub use engine::{preview_lines, Reconciler, PREVIEW_EXAMPLE_GROUPS, PREVIEW_LIMIT};
pub use memory::{MemorySnapshotStore, StoreFault};
pub use store::{ReplaceOutcome, SnapshotStore, StoreError};
pub use types::*;
