//! dispo_log upsert/get/delete semantics and the recent-entries window used
//! by the rescan driver.

use chrono::{Duration, Utc};
use laurel_ledger::LedgerStore;
use laurel_schemas::Disposition;
use tempfile::TempDir;

async fn open_store(dir: &TempDir) -> LedgerStore {
    LedgerStore::open(dir.path().join("ledger.db"))
        .await
        .expect("open ledger")
}

#[tokio::test]
async fn upsert_replaces_on_comment_id_conflict() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store
        .upsert_dispo_log("c1", Disposition::TooShort, "botreply-1", 100.0)
        .await
        .unwrap();

    let entry = store.get_dispo_log("c1").await.unwrap().expect("logged");
    assert_eq!(entry.dispo, Disposition::TooShort);
    assert_eq!(entry.reply_id, "botreply-1");

    // Disposition changes, the reply id stays — an in-place edit.
    store
        .upsert_dispo_log("c1", Disposition::Confirmed, "botreply-1", 100.0)
        .await
        .unwrap();

    let entry = store.get_dispo_log("c1").await.unwrap().expect("logged");
    assert_eq!(entry.dispo, Disposition::Confirmed);
    assert_eq!(entry.reply_id, "botreply-1");
    assert_eq!(entry.comment_time, 100.0);
}

#[tokio::test]
async fn delete_removes_the_entry() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store
        .upsert_dispo_log("c1", Disposition::AwardedOp, "botreply-1", 100.0)
        .await
        .unwrap();
    store.delete_dispo_log("c1").await.unwrap();
    assert!(store.get_dispo_log("c1").await.unwrap().is_none());

    // Deleting an absent entry is a no-op, not an error.
    store.delete_dispo_log("c1").await.unwrap();
}

#[tokio::test]
async fn recent_logs_filter_by_comment_age() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let now = Utc::now();
    let yesterday = (now - Duration::days(1)).timestamp() as f64;
    let last_month = (now - Duration::days(40)).timestamp() as f64;

    store
        .upsert_dispo_log("fresh", Disposition::TooShort, "botreply-1", yesterday)
        .await
        .unwrap();
    store
        .upsert_dispo_log("stale", Disposition::TooShort, "botreply-2", last_month)
        .await
        .unwrap();

    let recent = store.recent_dispo_logs(30).await.unwrap();
    let ids: Vec<&str> = recent.iter().map(|e| e.comment_id.as_str()).collect();
    assert_eq!(ids, vec!["fresh"]);
}
