use std::time::Duration;

use tsu_schemas::PlayerEntity;

use crate::store::SnapshotStore;
use crate::{EmptyBatchPolicy, PreviewLine, ReconcileError, ReconcileMode, WriteResult};

/// Players shown in a dry-run preview.
pub const PREVIEW_LIMIT: usize = 3;
/// Group names shown per previewed player.
pub const PREVIEW_EXAMPLE_GROUPS: usize = 3;

/// First [`PREVIEW_LIMIT`] entities, in batch order.
pub fn preview_lines(entities: &[PlayerEntity]) -> Vec<PreviewLine> {
    entities
        .iter()
        .take(PREVIEW_LIMIT)
        .map(|e| PreviewLine {
            player_name: e.player_name.clone(),
            player_id: e.player_id,
            total_entries: e.total_entries,
            example_groups: e
                .example_groups(PREVIEW_EXAMPLE_GROUPS)
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
        .collect()
}

pub struct Reconciler<'a> {
    store: &'a dyn SnapshotStore,
    empty_policy: EmptyBatchPolicy,
    ping_timeout: Option<Duration>,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn SnapshotStore) -> Self {
        Self {
            store,
            empty_policy: EmptyBatchPolicy::default(),
            ping_timeout: None,
        }
    }

    pub fn with_empty_policy(mut self, policy: EmptyBatchPolicy) -> Self {
        self.empty_policy = policy;
        self
    }

    /// Upper bound on the connectivity check, on top of whatever the store
    /// enforces itself.
    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = Some(timeout);
        self
    }

    pub async fn reconcile(
        &self,
        entities: &[PlayerEntity],
        mode: ReconcileMode,
    ) -> Result<WriteResult, ReconcileError> {
        self.check_connectivity().await?;

        match mode {
            ReconcileMode::DryRun => {
                tracing::info!(would_write = entities.len(), "dry-run: store left untouched");
                Ok(WriteResult::Preview {
                    lines: preview_lines(entities),
                    would_write: entities.len(),
                })
            }
            ReconcileMode::Live => self.replace(entities).await,
        }
    }

    async fn check_connectivity(&self) -> Result<(), ReconcileError> {
        let ping = self.store.ping();
        let res = match self.ping_timeout {
            Some(limit) => match tokio::time::timeout(limit, ping).await {
                Ok(r) => r,
                Err(_) => {
                    return Err(ReconcileError::StoreUnavailable(format!(
                        "no response within {}s",
                        limit.as_secs_f64()
                    )))
                }
            },
            None => ping.await,
        };
        res.map_err(|e| {
            tracing::error!(error = %e, "Database connection failed.");
            ReconcileError::StoreUnavailable(e.to_string())
        })
    }

    async fn replace(&self, entities: &[PlayerEntity]) -> Result<WriteResult, ReconcileError> {
        if entities.is_empty() {
            match self.empty_policy {
                EmptyBatchPolicy::Refuse => return Err(ReconcileError::EmptyBatchRefused),
                EmptyBatchPolicy::Clear => {
                    tracing::warn!("empty batch: the stored snapshot will be cleared")
                }
            }
        }

        let outcome = self
            .store
            .replace_all(entities)
            .await
            .map_err(|e| ReconcileError::WriteFailed(e.to_string()))?;

        tracing::debug!(
            cleared = outcome.cleared,
            upserted = outcome.upserted,
            "snapshot replaced"
        );
        Ok(WriteResult::Replaced {
            cleared: outcome.cleared,
            upserted: outcome.upserted,
        })
    }
}
