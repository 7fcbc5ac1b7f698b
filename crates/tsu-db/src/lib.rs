//! tsu-db
//!
//! Postgres access for the uploader: connection with a bounded connect
//! timeout, embedded migrations, the status probe, and the
//! [`PgSnapshotStore`] backend for `tsu-reconcile`.

mod snapshot_store;

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tsu_config::DbConfig;

pub use snapshot_store::PgSnapshotStore;

pub const ENV_DB_URL: &str = tsu_config::ENV_DATABASE_URL;

/// Snapshot table created by the migrations.
pub const TOURNAMENT_TABLE: &str = "tournament";

/// Connect to Postgres, giving up after `cfg.connect_timeout`.
pub async fn connect(cfg: &DbConfig) -> Result<PgPool> {
    connect_url(cfg.database_url.expose(), cfg.connect_timeout).await
}

pub async fn connect_url(url: &str, timeout: Duration) -> Result<PgPool> {
    let fut = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(timeout)
        .connect(url);

    match tokio::time::timeout(timeout, fut).await {
        Ok(res) => res.context("failed to connect to Postgres"),
        Err(_) => Err(anyhow!(
            "failed to connect to Postgres: no response within {}s",
            timeout.as_secs()
        )),
    }
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbStatus {
    pub ok: bool,
    pub has_tournament_table: bool,
    /// `None` until the migrations have run.
    pub stored_players: Option<i64>,
}

/// Connectivity + schema presence + stored row count.
pub async fn status(pool: &PgPool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as::<_, (i32,)>("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;

    let (exists,): (bool,) = sqlx::query_as::<_, (bool,)>(
        r#"
        select exists (
            select 1
            from information_schema.tables
            where table_schema = current_schema() and table_name = $1
        )
        "#,
    )
    .bind(TOURNAMENT_TABLE)
    .fetch_one(pool)
    .await
    .context("status table-exists query failed")?;

    let stored_players = if exists {
        let (n,): (i64,) = sqlx::query_as::<_, (i64,)>("select count(*)::bigint from tournament")
            .fetch_one(pool)
            .await
            .context("status row-count query failed")?;
        Some(n)
    } else {
        None
    };

    Ok(DbStatus {
        ok: one == 1,
        has_tournament_table: exists,
        stored_players,
    })
}
