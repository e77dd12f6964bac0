//! Ancestor walking and the thread-scoped duplicate-award check.

use laurel_ledger::LedgerStore;
use laurel_platform::{require_comment, PlatformClient, PlatformError};
use laurel_schemas::Comment;

use crate::ClassifyError;

/// Climb a comment's parent chain to its thread root.
///
/// Iterative on purpose: reply chains can be arbitrarily deep and a
/// recursive climb would be unbounded stack. A deleted ancestor surfaces as
/// `NotFound` and is propagated, never swallowed.
pub async fn climb_to_root(
    client: &dyn PlatformClient,
    comment: &Comment,
) -> Result<Comment, PlatformError> {
    let mut current = comment.clone();
    while !current.is_root {
        current = require_comment(client, &current.parent_id).await?;
    }
    Ok(current)
}

/// Has `awarding.author` already awarded `awarded.author` within the same
/// conversation thread?
///
/// The ledger is first consulted for prior awards between the pair in this
/// submission; only when some exist are ancestor chains walked. The rule is
/// scoped per thread root, not globally — awarding the same person again in
/// an unrelated thread of the same submission is legitimate.
pub async fn already_awarded_in_tree(
    client: &dyn PlatformClient,
    ledger: &LedgerStore,
    awarding: &Comment,
    awarded: &Comment,
) -> Result<bool, ClassifyError> {
    let prior = ledger
        .prior_awards_in_thread(&awarding.submission_id, &awarding.author, &awarded.author)
        .await?;
    if prior.is_empty() {
        return Ok(false);
    }

    let awarded_root = climb_to_root(client, awarded).await?;
    for award in &prior {
        let prior_awarding = require_comment(client, &award.awarding_comment_id).await?;
        let prior_root = climb_to_root(client, &prior_awarding).await?;
        if prior_root.id == awarded_root.id {
            return Ok(true);
        }
    }
    Ok(false)
}
