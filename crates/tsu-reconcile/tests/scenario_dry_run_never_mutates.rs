//! Scenario: dry-run checks connectivity, previews, and leaves the store as it was.

use tsu_reconcile::{
    MemorySnapshotStore, ReconcileError, ReconcileMode, Reconciler, SnapshotStore, StoreFault,
    WriteResult,
};
use tsu_schemas::{EntrySlot, PlayerEntity};

fn player(id: i64, name: &str) -> PlayerEntity {
    PlayerEntity {
        player_name: name.to_string(),
        player_id: id,
        total_entries: 4,
        entries: ["A", "B", "C", "D"]
            .iter()
            .map(|g| EntrySlot::new(*g, 1))
            .collect(),
    }
}

#[tokio::test]
async fn dry_run_store_bytes_unchanged() {
    let store = MemorySnapshotStore::with_rows([player(1_000_000_001, "Prior")]);
    let before = serde_json::to_vec(&store.load_all().await.unwrap()).unwrap();

    let batch: Vec<_> = (0..5).map(|i| player(2_000_000_000 + i, "New")).collect();
    let res = Reconciler::new(&store)
        .reconcile(&batch, ReconcileMode::DryRun)
        .await
        .unwrap();

    let after = serde_json::to_vec(&store.load_all().await.unwrap()).unwrap();
    assert_eq!(before, after);
    assert_eq!(store.replace_calls(), 0);

    match res {
        WriteResult::Preview { lines, would_write } => {
            assert_eq!(would_write, 5);
            assert_eq!(lines.len(), 3);
            assert_eq!(lines[0].example_groups, ["A", "B", "C"]);
        }
        other => panic!("expected Preview, got {other:?}"),
    }
}

#[tokio::test]
async fn dry_run_still_requires_connectivity() {
    let store = MemorySnapshotStore::new();
    store.set_fault(StoreFault::Unreachable);

    let err = Reconciler::new(&store)
        .reconcile(&[player(1_000_000_001, "X")], ReconcileMode::DryRun)
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::StoreUnavailable(_)));
}

#[tokio::test]
async fn empty_dry_run_previews_nothing() {
    let store = MemorySnapshotStore::with_rows([player(1_000_000_001, "Prior")]);
    let res = Reconciler::new(&store)
        .reconcile(&[], ReconcileMode::DryRun)
        .await
        .unwrap();
    assert_eq!(
        res,
        WriteResult::Preview {
            lines: Vec::new(),
            would_write: 0
        }
    );
    assert_eq!(store.load_all().await.unwrap().len(), 1);
}
