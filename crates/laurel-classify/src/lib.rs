//! laurel-classify
//!
//! Disposition classification: the fixed-priority decision function mapping
//! (comment, parent, submission, ledger queries) to a [`Disposition`], plus
//! the ancestor walker and the thread-scoped duplicate-award detector it
//! relies on.
//!
//! Classification itself performs no writes. Any parent/submission/ancestor
//! lookup failure or ledger failure aborts the comment with a typed error —
//! the caller must not record a disposition on that path.

mod classifier;
mod walker;

pub use classifier::{Classification, Classifier, ClassifierConfig};
pub use walker::{already_awarded_in_tree, climb_to_root};

use laurel_ledger::StorageError;
use laurel_platform::PlatformError;

/// Classification aborted before producing a disposition.
#[derive(Debug)]
pub enum ClassifyError {
    /// Parent, submission or ancestor lookup failed.
    Platform(PlatformError),
    /// A ledger query failed.
    Storage(StorageError),
}

impl std::fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifyError::Platform(e) => write!(f, "classification lookup failed: {e}"),
            ClassifyError::Storage(e) => write!(f, "classification ledger query failed: {e}"),
        }
    }
}

impl std::error::Error for ClassifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClassifyError::Platform(e) => Some(e),
            ClassifyError::Storage(e) => Some(e),
        }
    }
}

impl From<PlatformError> for ClassifyError {
    fn from(e: PlatformError) -> Self {
        ClassifyError::Platform(e)
    }
}

impl From<StorageError> for ClassifyError {
    fn from(e: StorageError) -> Self {
        ClassifyError::Storage(e)
    }
}
