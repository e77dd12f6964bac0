//! Monthly reporting window: `[month-start, next-month-start)` on awarding
//! time. Boundary rows prove the interval is half-open.

use chrono::{TimeZone, Utc};
use laurel_ledger::LedgerStore;
use laurel_testkit::award_row;
use tempfile::TempDir;

fn epoch(year: i32, month: u32, day: u32, hour: u32) -> f64 {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .unwrap()
        .timestamp() as f64
}

#[tokio::test]
async fn month_window_is_half_open() {
    let dir = TempDir::new().unwrap();
    let store = LedgerStore::open(dir.path().join("ledger.db"))
        .await
        .expect("open ledger");

    let rows = [
        ("before", epoch(2026, 2, 28, 23)),
        ("at-start", epoch(2026, 3, 1, 0)),
        ("mid-month", epoch(2026, 3, 15, 12)),
        ("last-hour", epoch(2026, 3, 31, 23)),
        ("next-start", epoch(2026, 4, 1, 0)),
    ];
    for (id, ts) in &rows {
        store
            .record_award(&award_row("s1", id, "bob", "alice", *ts))
            .await
            .expect("insert");
    }

    let march = store.awards_by_month(2026, 3).await.unwrap();
    let ids: Vec<&str> = march
        .iter()
        .map(|a| a.awarding_comment_id.as_str())
        .collect();

    assert_eq!(
        ids,
        vec!["at-start", "mid-month", "last-hour"],
        "month start is inclusive, next month start is exclusive"
    );
}

#[tokio::test]
async fn december_window_wraps_to_january() {
    let dir = TempDir::new().unwrap();
    let store = LedgerStore::open(dir.path().join("ledger.db"))
        .await
        .expect("open ledger");

    store
        .record_award(&award_row("s1", "dec", "bob", "alice", epoch(2026, 12, 31, 23)))
        .await
        .unwrap();
    store
        .record_award(&award_row("s1", "jan", "bob", "carol", epoch(2027, 1, 1, 0)))
        .await
        .unwrap();

    let december = store.awards_by_month(2026, 12).await.unwrap();
    assert_eq!(december.len(), 1);
    assert_eq!(december[0].awarding_comment_id, "dec");
}

#[tokio::test]
async fn invalid_month_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = LedgerStore::open(dir.path().join("ledger.db"))
        .await
        .expect("open ledger");

    assert!(store.awards_by_month(2026, 13).await.is_err());
    assert!(store.awards_by_month(2026, 0).await.is_err());
}
