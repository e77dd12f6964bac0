//! laurel-platform
//!
//! Interfaces to the two excluded collaborators:
//!
//! - [`PlatformClient`] — the network layer that fetches comments and
//!   submissions from the remote platform and performs reply/edit/delete
//!   actions on the bot's behalf. The core treats it as a synchronous,
//!   possibly-failing capability; retry and backoff live outside.
//! - [`ReplyRenderer`] — the templating layer that turns a disposition plus
//!   structured context into human-readable reply text.
//!
//! Production implementations live outside this workspace. Test doubles are
//! provided by `laurel-testkit`.

use async_trait::async_trait;
use laurel_schemas::{Comment, Disposition, Submission};

// ---------------------------------------------------------------------------
// PlatformError
// ---------------------------------------------------------------------------

/// Failure of a platform capability call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The requested entity does not exist (deleted node, bad id).
    NotFound { id: String },
    /// The platform was unreachable or returned a retryable failure.
    Transient { message: String },
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::NotFound { id } => write!(f, "platform entity not found: {id}"),
            PlatformError::Transient { message } => {
                write!(f, "transient platform failure: {message}")
            }
        }
    }
}

impl std::error::Error for PlatformError {}

// ---------------------------------------------------------------------------
// PlatformClient
// ---------------------------------------------------------------------------

/// The remote platform as the core consumes it.
///
/// # Contract
/// `fetch_comment` / `fetch_submission` return `Ok(None)` for an id that
/// resolves to nothing; `Err(Transient)` only for delivery failures.
/// `reply` returns the newly created comment so the caller can log its id.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    async fn fetch_comment(&self, id: &str) -> Result<Option<Comment>, PlatformError>;

    async fn fetch_submission(&self, id: &str) -> Result<Option<Submission>, PlatformError>;

    /// Post a new reply under `comment`; returns the created reply.
    async fn reply(&self, comment: &Comment, body: &str) -> Result<Comment, PlatformError>;

    /// Replace the body of an existing bot comment.
    async fn edit(&self, comment_id: &str, body: &str) -> Result<(), PlatformError>;

    /// Delete an existing bot comment.
    async fn delete(&self, comment_id: &str) -> Result<(), PlatformError>;

    /// Direct message a user. Consumed only by functionality outside the
    /// classification/reconciliation core (first-award notices, mod alerts).
    async fn send_message(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), PlatformError>;

    /// Whether a user moderates the watched community. Consumed only by the
    /// command handling outside this core (force-add authorization).
    async fn is_moderator(&self, username: &str) -> Result<bool, PlatformError>;
}

/// Fetch a comment that must exist; a missing one is a hard `NotFound`.
/// Ancestor walking and parent resolution use this — a deleted node aborts
/// classification rather than defaulting to a disposition.
pub async fn require_comment(
    client: &dyn PlatformClient,
    id: &str,
) -> Result<Comment, PlatformError> {
    client
        .fetch_comment(id)
        .await?
        .ok_or_else(|| PlatformError::NotFound { id: id.to_string() })
}

/// Fetch a submission that must exist.
pub async fn require_submission(
    client: &dyn PlatformClient,
    id: &str,
) -> Result<Submission, PlatformError> {
    client
        .fetch_submission(id)
        .await?
        .ok_or_else(|| PlatformError::NotFound { id: id.to_string() })
}

// ---------------------------------------------------------------------------
// ReplyRenderer
// ---------------------------------------------------------------------------

/// Renders reply text for a disposition. Receives only the disposition code
/// and structured context; the template dictionary itself is configuration
/// owned by the implementation.
pub trait ReplyRenderer: Send + Sync {
    fn render(&self, dispo: Disposition, comment: &Comment, parent: Option<&Comment>) -> String;
}
