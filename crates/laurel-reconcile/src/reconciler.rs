//! The per-comment reconciliation state machine.

use std::sync::Arc;

use laurel_classify::{Classification, Classifier, ClassifyError};
use laurel_ledger::{LedgerStore, StorageError};
use laurel_platform::{PlatformClient, PlatformError, ReplyRenderer};
use laurel_schemas::{Award, Comment, Disposition};
use tracing::info;

// ---------------------------------------------------------------------------
// ReconcileError
// ---------------------------------------------------------------------------

/// Why a `process_comment` call aborted. None of these are fatal to the
/// process; drivers log and continue with the next comment.
#[derive(Debug)]
pub enum ReconcileError {
    /// Classification aborted (lookup or ledger failure). Nothing was
    /// written for this comment.
    Classify(ClassifyError),
    /// A ledger transaction failed. No partial writes; retry on next scan.
    Storage(StorageError),
    /// A reply/edit/delete against the platform failed. The disposition log
    /// may be stale until the next scan naturally reconciles it.
    Action(PlatformError),
    /// Invariant breach: a confirmed classification without its thread
    /// context.
    MissingContext(&'static str),
}

impl std::fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileError::Classify(e) => write!(f, "{e}"),
            ReconcileError::Storage(e) => write!(f, "{e}"),
            ReconcileError::Action(e) => write!(f, "platform action failed: {e}"),
            ReconcileError::MissingContext(what) => write!(f, "missing context: {what}"),
        }
    }
}

impl std::error::Error for ReconcileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReconcileError::Classify(e) => Some(e),
            ReconcileError::Storage(e) => Some(e),
            ReconcileError::Action(e) => Some(e),
            ReconcileError::MissingContext(_) => None,
        }
    }
}

impl From<ClassifyError> for ReconcileError {
    fn from(e: ClassifyError) -> Self {
        ReconcileError::Classify(e)
    }
}

impl From<StorageError> for ReconcileError {
    fn from(e: StorageError) -> Self {
        ReconcileError::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// ReconcileOutcome
// ---------------------------------------------------------------------------

/// Visible effect of one `process_comment` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Trivial disposition on first sight: no reply, no log entry.
    Suppressed,
    /// First sight: reply posted, disposition logged.
    Replied { dispo: Disposition },
    /// Disposition unchanged since the previous scan.
    Unchanged { dispo: Disposition },
    /// Degraded to trivial: previous reply deleted, log entry removed.
    Retracted,
    /// Changed to `AlreadyAwarded`: terminal steady-state, nothing touched.
    SteadyState,
    /// Changed: existing reply edited in place, log upserted.
    Edited { dispo: Disposition },
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Stateful orchestrator over classifier, ledger, platform and renderer.
pub struct Reconciler {
    client: Arc<dyn PlatformClient>,
    ledger: LedgerStore,
    renderer: Arc<dyn ReplyRenderer>,
    classifier: Classifier,
}

impl Reconciler {
    pub fn new(
        client: Arc<dyn PlatformClient>,
        ledger: LedgerStore,
        renderer: Arc<dyn ReplyRenderer>,
        classifier: Classifier,
    ) -> Self {
        Self {
            client,
            ledger,
            renderer,
            classifier,
        }
    }

    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    pub(crate) fn client(&self) -> &dyn PlatformClient {
        self.client.as_ref()
    }

    /// Classify one observed comment and converge the bot's visible state
    /// to it. Called once per comment per scan pass — fresh scans, periodic
    /// rescans and moderator force-adds all come through here unchanged.
    pub async fn process_comment(
        &self,
        comment: &Comment,
        strict: bool,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        info!(comment = %comment.id, author = %comment.author, strict, "processing comment");

        let classification = self
            .classifier
            .classify(self.client.as_ref(), &self.ledger, comment, strict)
            .await?;
        let dispo = classification.dispo;

        let prior = self.ledger.get_dispo_log(&comment.id).await?;

        match prior {
            None => {
                if dispo.is_trivial() {
                    return Ok(ReconcileOutcome::Suppressed);
                }
                let body = self
                    .renderer
                    .render(dispo, comment, classification.parent.as_ref());
                let reply = self
                    .client
                    .reply(comment, &body)
                    .await
                    .map_err(ReconcileError::Action)?;
                self.ledger
                    .upsert_dispo_log(&comment.id, dispo, &reply.id, comment.created_utc)
                    .await?;
                if dispo == Disposition::Confirmed {
                    self.record_award(&classification, comment).await?;
                }
                info!(comment = %comment.id, ?dispo, reply = %reply.id, "posted reply");
                Ok(ReconcileOutcome::Replied { dispo })
            }

            Some(prev) if prev.dispo == dispo => Ok(ReconcileOutcome::Unchanged { dispo }),

            Some(prev) => {
                if dispo.is_trivial() {
                    // The comment no longer warrants bot presence.
                    self.client
                        .delete(&prev.reply_id)
                        .await
                        .map_err(ReconcileError::Action)?;
                    self.ledger.delete_dispo_log(&comment.id).await?;
                    info!(
                        comment = %comment.id,
                        from = ?prev.dispo,
                        to = ?dispo,
                        "retracted reply"
                    );
                    Ok(ReconcileOutcome::Retracted)
                } else if dispo == Disposition::AlreadyAwarded {
                    // The ledger already holds this award; re-editing or
                    // re-logging would only churn external state.
                    Ok(ReconcileOutcome::SteadyState)
                } else {
                    let body = self
                        .renderer
                        .render(dispo, comment, classification.parent.as_ref());
                    self.client
                        .edit(&prev.reply_id, &body)
                        .await
                        .map_err(ReconcileError::Action)?;
                    self.ledger
                        .upsert_dispo_log(&comment.id, dispo, &prev.reply_id, comment.created_utc)
                        .await?;
                    if dispo == Disposition::Confirmed {
                        self.record_award(&classification, comment).await?;
                    }
                    info!(
                        comment = %comment.id,
                        from = ?prev.dispo,
                        to = ?dispo,
                        reply = %prev.reply_id,
                        "edited reply in place"
                    );
                    Ok(ReconcileOutcome::Edited { dispo })
                }
            }
        }
    }

    async fn record_award(
        &self,
        classification: &Classification,
        awarding: &Comment,
    ) -> Result<(), ReconcileError> {
        let (Some(awarded), Some(submission)) =
            (&classification.parent, &classification.submission)
        else {
            return Err(ReconcileError::MissingContext(
                "confirmed disposition without parent and submission",
            ));
        };

        let award = Award::assemble(submission, awarded, awarding);
        self.ledger.record_award(&award).await?;
        Ok(())
    }
}
