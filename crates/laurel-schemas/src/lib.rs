//! laurel-schemas
//!
//! Shared data model for the award-bot core: platform entities as the core
//! sees them, the two ledger row types, and the closed `Disposition`
//! enumeration with its stable integer codes.
//!
//! Nothing here performs IO. Timestamps are carried as f64 epoch seconds —
//! the platform's native wire format — with chrono conversions where a
//! calendar view is needed.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Platform entities (read-only to the core)
// ---------------------------------------------------------------------------

/// A comment as fetched from the platform. The core never mutates one
/// directly; it only requests reply/edit/retract actions against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub body: String,
    pub author: String,
    /// Id of the parent comment, or of the submission when `is_root`.
    pub parent_id: String,
    /// Id of the submission this comment ultimately belongs to.
    pub submission_id: String,
    /// True when this comment is a top-level reply to the submission.
    pub is_root: bool,
    pub permalink: String,
    /// Creation time, epoch seconds.
    pub created_utc: f64,
}

impl Comment {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        epoch_to_datetime(self.created_utc)
    }
}

/// A submission (thread starter). Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub title: String,
    pub self_text: String,
    pub author: String,
    pub permalink: String,
    pub url: String,
    /// Creation time, epoch seconds.
    pub created_utc: f64,
}

fn epoch_to_datetime(secs: f64) -> Option<DateTime<Utc>> {
    let whole = secs.trunc() as i64;
    let nanos = ((secs - secs.trunc()) * 1e9) as u32;
    Utc.timestamp_opt(whole, nanos).single()
}

// ---------------------------------------------------------------------------
// Disposition
// ---------------------------------------------------------------------------

/// Classification outcome for a comment. Drives every reconciler action.
///
/// Codes are stable and persisted in the `dispo_log` table; never renumber.
/// The priority order in which the classifier evaluates these is fixed and
/// lives in `laurel-classify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Comment meets every criterion; a point is awarded.
    Confirmed,
    /// Body contains no award token outside quoted/code regions.
    TokenMissing,
    /// The comment was written by the bot account itself.
    AuthorIsBot,
    /// The comment replies to the bot account.
    ParentIsBot,
    /// The author attempted to award their own comment.
    AwardedSelf,
    /// The author attempted to award the submission author.
    AwardedOp,
    /// Body is shorter than the configured minimum.
    TooShort,
    /// An award already exists for this exact awarding comment.
    AlreadyAwarded,
    /// The awarding author already awarded the same awardee in this thread.
    AlreadyAwardedInTree,
}

impl Disposition {
    /// Stable integer code used in the disposition log.
    pub fn code(self) -> i64 {
        match self {
            Disposition::Confirmed => 0,
            Disposition::TokenMissing => 1,
            Disposition::AuthorIsBot => 2,
            Disposition::ParentIsBot => 3,
            Disposition::AwardedSelf => 4,
            Disposition::AwardedOp => 5,
            Disposition::TooShort => 6,
            Disposition::AlreadyAwarded => 7,
            Disposition::AlreadyAwardedInTree => 8,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => Disposition::Confirmed,
            1 => Disposition::TokenMissing,
            2 => Disposition::AuthorIsBot,
            3 => Disposition::ParentIsBot,
            4 => Disposition::AwardedSelf,
            5 => Disposition::AwardedOp,
            6 => Disposition::TooShort,
            7 => Disposition::AlreadyAwarded,
            8 => Disposition::AlreadyAwardedInTree,
            _ => return None,
        })
    }

    /// Trivial dispositions warrant no bot reply and no log entry; an
    /// existing reply is retracted when a comment degrades to one of these.
    pub fn is_trivial(self) -> bool {
        matches!(self, Disposition::TokenMissing | Disposition::AuthorIsBot)
    }

    /// Rescannable dispositions are re-evaluated by the periodic rescan
    /// pass. Deliberately disjoint from the trivial set: a short comment
    /// keeps its reply and may still transition to `Confirmed` later.
    pub fn is_rescannable(self) -> bool {
        matches!(self, Disposition::TooShort)
    }
}

// ---------------------------------------------------------------------------
// Ledger rows
// ---------------------------------------------------------------------------

/// One confirmed award event. Append-only: never updated or deleted.
///
/// Full snapshots are stored because the platform is mutable and partially
/// observable — the reporting collaborators must not depend on the original
/// comments still existing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Award {
    pub submission_id: String,
    pub submission_title: String,
    pub submission_self_text: String,
    pub submission_author: String,
    pub submission_url: String,
    pub submission_time: f64,

    pub awarded_comment_id: String,
    pub awarded_comment_text: String,
    pub awarded_comment_author: String,
    pub awarded_comment_url: String,
    pub awarded_comment_time: f64,

    pub awarding_comment_id: String,
    pub awarding_comment_text: String,
    pub awarding_comment_author: String,
    pub awarding_comment_url: String,
    pub awarding_comment_time: f64,
}

impl Award {
    /// Snapshot the three entities involved in one award event.
    pub fn assemble(submission: &Submission, awarded: &Comment, awarding: &Comment) -> Self {
        Self {
            submission_id: submission.id.clone(),
            submission_title: submission.title.clone(),
            submission_self_text: submission.self_text.clone(),
            submission_author: submission.author.clone(),
            submission_url: submission.permalink.clone(),
            submission_time: submission.created_utc,

            awarded_comment_id: awarded.id.clone(),
            awarded_comment_text: awarded.body.clone(),
            awarded_comment_author: awarded.author.clone(),
            awarded_comment_url: awarded.permalink.clone(),
            awarded_comment_time: awarded.created_utc,

            awarding_comment_id: awarding.id.clone(),
            awarding_comment_text: awarding.body.clone(),
            awarding_comment_author: awarding.author.clone(),
            awarding_comment_url: awarding.permalink.clone(),
            awarding_comment_time: awarding.created_utc,
        }
    }
}

/// One row per comment ever processed. Upserted whenever the computed
/// disposition changes; deleted when the disposition becomes trivial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispositionLogEntry {
    pub comment_id: String,
    pub dispo: Disposition,
    /// Id of the bot's live reply associated with this disposition.
    pub reply_id: String,
    /// Creation time of the logged comment, epoch seconds.
    pub comment_time: f64,
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_codes_are_stable() {
        // Persisted codes; a renumbering here silently corrupts dispo_log.
        assert_eq!(Disposition::Confirmed.code(), 0);
        assert_eq!(Disposition::TooShort.code(), 6);
        assert_eq!(Disposition::AlreadyAwardedInTree.code(), 8);
        for code in 0..=8 {
            let d = Disposition::from_code(code).expect("known code");
            assert_eq!(d.code(), code);
        }
        assert_eq!(Disposition::from_code(9), None);
        assert_eq!(Disposition::from_code(-1), None);
    }

    #[test]
    fn trivial_and_rescannable_sets_are_disjoint() {
        assert!(Disposition::TokenMissing.is_trivial());
        assert!(Disposition::AuthorIsBot.is_trivial());
        assert!(!Disposition::TooShort.is_trivial());
        assert!(Disposition::TooShort.is_rescannable());
        for code in 0..=8 {
            let d = Disposition::from_code(code).unwrap();
            assert!(
                !(d.is_trivial() && d.is_rescannable()),
                "{d:?} must not be both trivial and rescannable"
            );
        }
    }

    #[test]
    fn award_assemble_snapshots_all_three_entities() {
        let submission = Submission {
            id: "s1".into(),
            title: "title".into(),
            self_text: "text".into(),
            author: "op".into(),
            permalink: "/s/s1".into(),
            url: "https://example.test/s1".into(),
            created_utc: 100.0,
        };
        let awarded = Comment {
            id: "c1".into(),
            body: "insightful".into(),
            author: "alice".into(),
            parent_id: "s1".into(),
            submission_id: "s1".into(),
            is_root: true,
            permalink: "/s/s1/c1".into(),
            created_utc: 200.0,
        };
        let awarding = Comment {
            id: "c2".into(),
            body: "!award you changed my view".into(),
            author: "bob".into(),
            parent_id: "c1".into(),
            submission_id: "s1".into(),
            is_root: false,
            permalink: "/s/s1/c2".into(),
            created_utc: 300.0,
        };

        let award = Award::assemble(&submission, &awarded, &awarding);
        assert_eq!(award.submission_author, "op");
        assert_eq!(award.awarded_comment_author, "alice");
        assert_eq!(award.awarding_comment_id, "c2");
        assert_eq!(award.awarding_comment_time, 300.0);
    }
}
