//! The fixed-priority disposition classifier.

use laurel_ledger::LedgerStore;
use laurel_platform::{require_comment, require_submission, PlatformClient};
use laurel_scan::{contains_token, minimum_body_length};
use laurel_schemas::{Comment, Disposition, Submission};
use tracing::debug;

use crate::walker::already_awarded_in_tree;
use crate::ClassifyError;

/// Classifier inputs that are fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// The bot's own account name (rules 2 and 3).
    pub bot_username: String,
    /// Award token strings scanned for in comment bodies.
    pub tokens: Vec<String>,
    /// Base minimum body length, added to the longest token length.
    pub base_minimum_length: usize,
}

/// Result of classifying one comment. `parent` and `submission` are the
/// entities resolved during classification, returned so the reconciler can
/// assemble award snapshots without re-fetching.
///
/// `parent` is `None` on the token-missing short-circuit and for root-level
/// comments (whose parent is the submission itself). A `Confirmed`
/// disposition always carries `Some` for both.
#[derive(Debug, Clone)]
pub struct Classification {
    pub dispo: Disposition,
    pub parent: Option<Comment>,
    pub submission: Option<Submission>,
}

/// Pure decision function over the fixed priority table; first match wins.
///
/// | Order | Condition (strict-only where marked)       | Disposition            |
/// |-------|--------------------------------------------|------------------------|
/// | 1     | body lacks a token *(strict)*              | `TokenMissing`         |
/// | 2     | comment author is the bot                  | `AuthorIsBot`          |
/// | 3     | parent author is the bot                   | `ParentIsBot`          |
/// | 4     | parent author is the comment author        | `AwardedSelf`          |
/// | 5     | parent author is the submission author     | `AwardedOp`            |
/// | 6     | body shorter than minimum *(strict)*       | `TooShort`             |
/// | 7     | award exists for this awarding comment     | `AlreadyAwarded`       |
/// | 8     | already awarded in this tree *(strict)*    | `AlreadyAwardedInTree` |
/// | 9     | none of the above                          | `Confirmed`            |
///
/// Non-strict mode (moderator force-add) skips rows 1, 6 and 8.
pub struct Classifier {
    bot_username: String,
    tokens: Vec<String>,
    minimum_body_length: usize,
}

impl Classifier {
    pub fn new(cfg: ClassifierConfig) -> Self {
        let minimum = minimum_body_length(&cfg.tokens, cfg.base_minimum_length);
        Self {
            bot_username: cfg.bot_username,
            tokens: cfg.tokens,
            minimum_body_length: minimum,
        }
    }

    /// Effective minimum body length (longest token + configured base).
    pub fn minimum_body_length(&self) -> usize {
        self.minimum_body_length
    }

    pub async fn classify(
        &self,
        client: &dyn PlatformClient,
        ledger: &LedgerStore,
        comment: &Comment,
        strict: bool,
    ) -> Result<Classification, ClassifyError> {
        if strict && !contains_token(&comment.body, &self.tokens) {
            debug!(comment = %comment.id, "no award token outside quoted regions");
            return Ok(Classification {
                dispo: Disposition::TokenMissing,
                parent: None,
                submission: None,
            });
        }

        let submission = require_submission(client, &comment.submission_id).await?;

        // Resolve the parent. A root-level comment awards the submission
        // itself, so its parent author is the submission author and it will
        // resolve at the OP rule or earlier.
        let (parent, parent_author) = if comment.is_root {
            (None, submission.author.clone())
        } else {
            let p = require_comment(client, &comment.parent_id).await?;
            let author = p.author.clone();
            (Some(p), author)
        };

        let dispo = if comment.author == self.bot_username {
            debug!(comment = %comment.id, "comment written by the bot itself");
            Disposition::AuthorIsBot
        } else if parent_author == self.bot_username {
            debug!(comment = %comment.id, "comment replies to the bot");
            Disposition::ParentIsBot
        } else if parent_author == comment.author {
            debug!(comment = %comment.id, "author attempted to award self");
            Disposition::AwardedSelf
        } else if parent_author == submission.author {
            debug!(comment = %comment.id, "author attempted to award OP");
            Disposition::AwardedOp
        } else if strict && comment.body.chars().count() < self.minimum_body_length {
            debug!(comment = %comment.id, "body below minimum length");
            Disposition::TooShort
        } else if ledger.has_award_for_comment(&comment.id).await? {
            debug!(comment = %comment.id, "award already recorded for this comment");
            Disposition::AlreadyAwarded
        } else {
            match parent.as_ref() {
                // A root comment's parent author equals the submission
                // author and resolved at the OP rule above.
                None => Disposition::AwardedOp,
                Some(awarded) => {
                    if strict && already_awarded_in_tree(client, ledger, comment, awarded).await? {
                        debug!(
                            comment = %comment.id,
                            awardee = %awarded.author,
                            "pair already awarded in this tree"
                        );
                        Disposition::AlreadyAwardedInTree
                    } else {
                        debug!(comment = %comment.id, "comment meets all award criteria");
                        Disposition::Confirmed
                    }
                }
            }
        };

        Ok(Classification {
            dispo,
            parent,
            submission: Some(submission),
        })
    }
}
