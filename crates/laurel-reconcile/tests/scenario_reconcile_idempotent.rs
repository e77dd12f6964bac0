//! Re-running process_comment with no intervening state change produces no
//! visible side effects: replies are not duplicated, awards are not
//! re-inserted, logs are not churned.

use std::sync::Arc;

use laurel_classify::{Classifier, ClassifierConfig};
use laurel_ledger::LedgerStore;
use laurel_reconcile::{ReconcileOutcome, Reconciler};
use laurel_schemas::Disposition;
use laurel_testkit::{comment, submission, CannedRenderer, FakePlatform};
use tempfile::TempDir;

const BOT: &str = "laurelbot";

fn classifier() -> Classifier {
    Classifier::new(ClassifierConfig {
        bot_username: BOT.to_string(),
        tokens: vec!["!award".to_string()],
        base_minimum_length: 50,
    })
}

fn long_body() -> String {
    format!("!award you changed my view entirely. {}", "x".repeat(60))
}

async fn harness(dir: &TempDir) -> (Arc<FakePlatform>, LedgerStore, Reconciler) {
    let store = LedgerStore::open(dir.path().join("ledger.db"))
        .await
        .expect("open ledger");
    let platform = Arc::new(FakePlatform::new(BOT));
    platform.insert_submission(submission("s1").author("op").build());
    platform.insert_comment(
        comment("c-root")
            .author("alice")
            .body("a careful argument")
            .in_submission("s1")
            .build(),
    );
    let reconciler = Reconciler::new(
        platform.clone(),
        store.clone(),
        Arc::new(CannedRenderer),
        classifier(),
    );
    (platform, store, reconciler)
}

#[tokio::test]
async fn confirmed_awards_once_then_reaches_steady_state() {
    let dir = TempDir::new().unwrap();
    let (platform, store, reconciler) = harness(&dir).await;

    let c = comment("c-award")
        .author("bob")
        .body(&long_body())
        .in_submission("s1")
        .reply_to("c-root")
        .build();
    platform.insert_comment(c.clone());

    let first = reconciler.process_comment(&c, true).await.unwrap();
    assert_eq!(
        first,
        ReconcileOutcome::Replied {
            dispo: Disposition::Confirmed
        }
    );
    assert_eq!(platform.replies().len(), 1);
    assert_eq!(store.awards_by_awardee("alice").await.unwrap().len(), 1);

    let log = store.get_dispo_log("c-award").await.unwrap().unwrap();
    assert_eq!(log.dispo, Disposition::Confirmed);

    // Second pass: the ledger row makes the comment classify as
    // AlreadyAwarded, which the transition table treats as terminal.
    let second = reconciler.process_comment(&c, true).await.unwrap();
    assert_eq!(second, ReconcileOutcome::SteadyState);
    assert_eq!(platform.replies().len(), 1, "no duplicate reply");
    assert!(platform.edits().is_empty(), "no reply churn");
    assert_eq!(
        store.awards_by_awardee("alice").await.unwrap().len(),
        1,
        "no double award"
    );
    // The log keeps its original disposition; steady-state does not re-log.
    let log = store.get_dispo_log("c-award").await.unwrap().unwrap();
    assert_eq!(log.dispo, Disposition::Confirmed);
}

#[tokio::test]
async fn non_awarding_disposition_is_a_noop_on_rescan() {
    let dir = TempDir::new().unwrap();
    let (platform, store, reconciler) = harness(&dir).await;

    // alice replies to her own comment with a token: AwardedSelf.
    let c = comment("c-self")
        .author("alice")
        .body(&long_body())
        .in_submission("s1")
        .reply_to("c-root")
        .build();
    platform.insert_comment(c.clone());

    let first = reconciler.process_comment(&c, true).await.unwrap();
    assert_eq!(
        first,
        ReconcileOutcome::Replied {
            dispo: Disposition::AwardedSelf
        }
    );

    let second = reconciler.process_comment(&c, true).await.unwrap();
    assert_eq!(
        second,
        ReconcileOutcome::Unchanged {
            dispo: Disposition::AwardedSelf
        }
    );
    assert_eq!(platform.replies().len(), 1);
    assert!(platform.edits().is_empty());
    assert!(store.awards_by_awardee("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn trivial_disposition_stays_suppressed() {
    let dir = TempDir::new().unwrap();
    let (platform, store, reconciler) = harness(&dir).await;

    let c = comment("c-plain")
        .author("bob")
        .body("interesting discussion, no award intended")
        .in_submission("s1")
        .reply_to("c-root")
        .build();
    platform.insert_comment(c.clone());

    for _ in 0..2 {
        let outcome = reconciler.process_comment(&c, true).await.unwrap();
        assert_eq!(outcome, ReconcileOutcome::Suppressed);
    }
    assert!(platform.replies().is_empty());
    assert!(store.get_dispo_log("c-plain").await.unwrap().is_none());
}
