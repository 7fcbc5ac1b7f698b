// DB-backed test, skipped if TSU_DATABASE_URL is not set.
//
// All assertions that touch the shared `tournament` table run in one test, in
// order, so parallel test threads cannot interleave replaces.

use std::time::Duration;

use anyhow::Result;
use tsu_db::PgSnapshotStore;
use tsu_reconcile::{ReconcileError, ReconcileMode, Reconciler, SnapshotStore, WriteResult};
use tsu_schemas::{EntrySlot, PlayerEntity};

fn player(id: i64, name: &str, total: u32, groups: &[(&str, i64)]) -> PlayerEntity {
    PlayerEntity {
        player_name: name.to_string(),
        player_id: id,
        total_entries: total,
        entries: groups.iter().map(|(g, s)| EntrySlot::new(*g, *s)).collect(),
    }
}

#[tokio::test]
async fn pg_replace_is_idempotent_transactional_and_ordered() -> Result<()> {
    let url = match std::env::var(tsu_db::ENV_DB_URL) {
        Ok(v) => v,
        Err(_) => {
            eprintln!("SKIP: TSU_DATABASE_URL not set");
            return Ok(());
        }
    };

    let pool = tsu_db::connect_url(&url, Duration::from_secs(5)).await?;
    tsu_db::migrate(&pool).await?;
    let store = PgSnapshotStore::new(pool.clone(), Duration::from_secs(5));
    let rec = Reconciler::new(&store);

    let batch = vec![
        player(9_876_543_210, "Bob", 1, &[("Blue", 1)]),
        player(1_234_567_890, "Alice", 2, &[("Red Team", 5), ("Sub Red", 3)]),
    ];

    // 1) live replace, rows come back ordered by player_id with entries intact
    let res = rec.reconcile(&batch, ReconcileMode::Live).await?;
    assert!(matches!(res, WriteResult::Replaced { upserted: 2, .. }));
    let first = store.load_all().await?;
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].player_name, "Alice");
    assert!(first[0].entries[1].sub);

    // 2) same batch again: identical snapshot
    rec.reconcile(&batch, ReconcileMode::Live).await?;
    assert_eq!(store.load_all().await?, first);

    // 3) dry-run leaves everything as it was
    rec.reconcile(&[player(1, "Ghost", 0, &[])], ReconcileMode::DryRun)
        .await?;
    assert_eq!(store.load_all().await?, first);

    // 4) a failure mid-transaction rolls back the clear
    let poisoned = vec![
        player(5_555_555_555, "Ok", 0, &[]),
        player(6_666_666_666, "TooMany", u32::MAX, &[]),
    ];
    let err = rec
        .reconcile(&poisoned, ReconcileMode::Live)
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::WriteFailed(_)), "{err}");
    assert_eq!(store.load_all().await?, first);

    // 5) duplicate ids: the later row wins
    let dupes = vec![
        player(1_234_567_890, "Alice", 1, &[("Old", 1)]),
        player(1_234_567_890, "Alice", 1, &[("New", 2)]),
    ];
    rec.reconcile(&dupes, ReconcileMode::Live).await?;
    let rows = store.load_all().await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].entries[0].group_name, "New");

    // 6) empty batch clears
    let res = rec.reconcile(&[], ReconcileMode::Live).await?;
    assert_eq!(res, WriteResult::Replaced { cleared: 1, upserted: 0 });
    assert!(store.load_all().await?.is_empty());

    let st = tsu_db::status(&pool).await?;
    assert!(st.ok && st.has_tournament_table);
    assert_eq!(st.stored_players, Some(0));

    Ok(())
}
