//! Postgres-backed [`SnapshotStore`].
//!
//! `replace_all` runs the clear and every upsert in one transaction. Any
//! error before commit drops the transaction, which rolls it back; the prior
//! snapshot is never left half-replaced.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use sqlx::types::Json;
use sqlx::PgPool;
use tsu_reconcile::{ReplaceOutcome, SnapshotStore, StoreError};
use tsu_schemas::{EntrySlot, PlayerEntity};

#[derive(Debug, Clone)]
pub struct PgSnapshotStore {
    pool: PgPool,
    ping_timeout: Duration,
}

impl PgSnapshotStore {
    pub fn new(pool: PgPool, ping_timeout: Duration) -> Self {
        Self { pool, ping_timeout }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn replace_in_tx(&self, entities: &[PlayerEntity]) -> Result<ReplaceOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("begin replace transaction failed")?;

        let cleared = sqlx::query("delete from tournament")
            .execute(&mut *tx)
            .await
            .context("clear tournament failed")?
            .rows_affected();

        let mut upserted = 0u64;
        for e in entities {
            let total_entries = i32::try_from(e.total_entries).map_err(|_| {
                anyhow!(
                    "playerId {}: totalEntries {} exceeds column range",
                    e.player_id,
                    e.total_entries
                )
            })?;

            upserted += sqlx::query(
                r#"
                insert into tournament (player_id, player_name, total_entries, entries)
                values ($1, $2, $3, $4)
                on conflict (player_id) do update set
                  player_name = excluded.player_name,
                  total_entries = excluded.total_entries,
                  entries = excluded.entries,
                  updated_at_utc = now()
                "#,
            )
            .bind(e.player_id)
            .bind(&e.player_name)
            .bind(total_entries)
            .bind(Json(&e.entries))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("upsert tournament playerId {} failed", e.player_id))?
            .rows_affected();
        }

        tx.commit()
            .await
            .context("commit replace transaction failed")?;

        Ok(ReplaceOutcome { cleared, upserted })
    }

    async fn load(&self) -> Result<Vec<PlayerEntity>> {
        let rows: Vec<(i64, String, i32, Json<Vec<EntrySlot>>)> = sqlx::query_as(
            r#"
            select player_id, player_name, total_entries, entries
            from tournament
            order by player_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("load tournament failed")?;

        rows.into_iter()
            .map(|(player_id, player_name, total_entries, Json(entries))| {
                let total_entries = u32::try_from(total_entries)
                    .with_context(|| format!("playerId {player_id}: negative totalEntries"))?;
                Ok(PlayerEntity {
                    player_name,
                    player_id,
                    total_entries,
                    entries,
                })
            })
            .collect()
    }
}

fn store_error(e: anyhow::Error) -> StoreError {
    StoreError::new(format!("{e:#}"))
}

#[async_trait::async_trait]
impl SnapshotStore for PgSnapshotStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let probe = sqlx::query("select 1").execute(&self.pool);
        match tokio::time::timeout(self.ping_timeout, probe).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(StoreError::new(format!("ping failed: {e}"))),
            Err(_) => Err(StoreError::new(format!(
                "ping timed out after {}s",
                self.ping_timeout.as_secs()
            ))),
        }
    }

    async fn replace_all(&self, entities: &[PlayerEntity]) -> Result<ReplaceOutcome, StoreError> {
        let out = self.replace_in_tx(entities).await.map_err(store_error)?;
        tracing::debug!(
            cleared = out.cleared,
            upserted = out.upserted,
            "tournament snapshot replaced"
        );
        Ok(out)
    }

    async fn load_all(&self) -> Result<Vec<PlayerEntity>, StoreError> {
        self.load().await.map_err(store_error)
    }
}
