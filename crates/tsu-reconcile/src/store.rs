use std::fmt;

use tsu_schemas::PlayerEntity;

/// Backend failure, flattened to a message. The reconciler decides whether it
/// means "unavailable" or "write failed".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceOutcome {
    /// Rows removed by the clear step.
    pub cleared: u64,
    /// Upsert statements applied, one per input entity.
    pub upserted: u64,
}

/// Persistent collection of player entities keyed by `player_id`.
///
/// `replace_all` must clear the collection and upsert every entity as one
/// unit: on `Err` the previously stored snapshot is still in place. When the
/// batch repeats a `player_id`, the later entity wins.
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Cheap connectivity probe. Must not mutate.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn replace_all(&self, entities: &[PlayerEntity]) -> Result<ReplaceOutcome, StoreError>;

    /// Current snapshot ordered by `player_id`.
    async fn load_all(&self) -> Result<Vec<PlayerEntity>, StoreError>;
}
