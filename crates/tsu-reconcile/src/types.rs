use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Validate and report only.
    DryRun,
    /// Replace the stored snapshot.
    Live,
}

/// What a live run does with a batch that has no entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyBatchPolicy {
    /// Clear the stored snapshot.
    #[default]
    Clear,
    /// Fail with [`ReconcileError::EmptyBatchRefused`] and leave the store alone.
    Refuse,
}

/// One dry-run preview line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewLine {
    pub player_name: String,
    pub player_id: i64,
    pub total_entries: u32,
    pub example_groups: Vec<String>,
}

impl fmt::Display for PreviewLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- {} (ID: {}), Total Entries: {}, Example Groups: {}",
            self.player_name,
            self.player_id,
            self.total_entries,
            self.example_groups.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    Preview {
        lines: Vec<PreviewLine>,
        would_write: usize,
    },
    Replaced {
        cleared: u64,
        upserted: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// Connectivity check failed or timed out; nothing was mutated.
    StoreUnavailable(String),
    /// The replace failed part-way or at commit.
    WriteFailed(String),
    /// Empty live batch under [`EmptyBatchPolicy::Refuse`]; nothing was mutated.
    EmptyBatchRefused,
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileError::StoreUnavailable(msg) => {
                write!(f, "STORE_UNAVAILABLE: database connection failed: {msg}")
            }
            ReconcileError::WriteFailed(msg) => {
                write!(f, "WRITE_FAILED: database operation failed: {msg}")
            }
            ReconcileError::EmptyBatchRefused => write!(
                f,
                "EMPTY_BATCH_REFUSED: no valid players in batch; refusing to clear the stored snapshot"
            ),
        }
    }
}

impl std::error::Error for ReconcileError {}
