//! DB-level uniqueness enforcement for awards.awarding_comment_id.
//!
//! The classifier's AlreadyAwarded rule is the first line of defense; the
//! unique index is the last. Both must hold for idempotent re-scans.

use laurel_ledger::{is_unique_violation, LedgerStore};
use laurel_testkit::award_row;
use tempfile::TempDir;

async fn open_store(dir: &TempDir) -> LedgerStore {
    LedgerStore::open(dir.path().join("ledger.db"))
        .await
        .expect("open ledger")
}

/// A second award for the same awarding comment id must be rejected.
#[tokio::test]
async fn duplicate_awarding_comment_id_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let first = award_row("s1", "c-award", "bob", "alice", 1_000.0);
    store.record_award(&first).await.expect("first insert");

    // Same awarding comment id, different snapshot content.
    let mut second = award_row("s1", "c-award", "bob", "alice", 2_000.0);
    second.awarding_comment_text = "!award again".to_string();

    let err = store
        .record_award(&second)
        .await
        .expect_err("duplicate awarding comment id must be rejected");
    assert!(
        is_unique_violation(&err),
        "expected unique violation, got: {err:?}"
    );

    // The ledger still holds exactly the first snapshot.
    let awards = store.prior_awards_in_thread("s1", "bob", "alice").await.unwrap();
    assert_eq!(awards.len(), 1);
    assert_eq!(awards[0].awarding_comment_text, "!award");
}

#[tokio::test]
async fn distinct_awarding_comment_ids_both_succeed() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store
        .record_award(&award_row("s1", "c1", "bob", "alice", 1_000.0))
        .await
        .expect("first insert");
    store
        .record_award(&award_row("s1", "c2", "bob", "alice", 2_000.0))
        .await
        .expect("second insert");

    assert!(store.has_award_for_comment("c1").await.unwrap());
    assert!(store.has_award_for_comment("c2").await.unwrap());
    assert!(!store.has_award_for_comment("c3").await.unwrap());
}

/// prior_awards_in_thread filters on all three of submission + author pair.
#[tokio::test]
async fn prior_awards_are_scoped_to_submission_and_pair() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store
        .record_award(&award_row("s1", "c1", "bob", "alice", 1_000.0))
        .await
        .unwrap();
    store
        .record_award(&award_row("s2", "c2", "bob", "alice", 1_000.0))
        .await
        .unwrap();
    store
        .record_award(&award_row("s1", "c3", "bob", "carol", 1_000.0))
        .await
        .unwrap();

    let in_s1 = store.prior_awards_in_thread("s1", "bob", "alice").await.unwrap();
    assert_eq!(in_s1.len(), 1);
    assert_eq!(in_s1[0].awarding_comment_id, "c1");

    assert!(store
        .prior_awards_in_thread("s3", "bob", "alice")
        .await
        .unwrap()
        .is_empty());
    assert!(store
        .prior_awards_in_thread("s1", "alice", "bob")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn awards_by_awardee_returns_only_that_author() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store
        .record_award(&award_row("s1", "c1", "bob", "alice", 2_000.0))
        .await
        .unwrap();
    store
        .record_award(&award_row("s2", "c2", "carol", "alice", 1_000.0))
        .await
        .unwrap();
    store
        .record_award(&award_row("s1", "c3", "bob", "dave", 3_000.0))
        .await
        .unwrap();

    let alice = store.awards_by_awardee("alice").await.unwrap();
    assert_eq!(alice.len(), 2);
    // Ordered by awarding time.
    assert_eq!(alice[0].awarding_comment_id, "c2");
    assert_eq!(alice[1].awarding_comment_id, "c1");
}
