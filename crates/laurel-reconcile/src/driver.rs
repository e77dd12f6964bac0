//! Driver-side helpers: the periodic rescan pass and the advisory
//! recently-scanned-id window.

use std::collections::VecDeque;

use laurel_ledger::StorageError;
use tracing::{debug, warn};

use crate::reconciler::Reconciler;

// ---------------------------------------------------------------------------
// Rescan pass
// ---------------------------------------------------------------------------

/// Counts from one rescan pass. Per-comment failures are logged and
/// counted, never fatal to the pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RescanReport {
    /// Log entries with a rescannable disposition inside the window.
    pub candidates: usize,
    /// Candidates re-run through the full pipeline.
    pub processed: usize,
    /// Candidates whose live comment no longer exists.
    pub skipped_missing: usize,
    /// Candidates that failed mid-processing.
    pub failed: usize,
}

impl Reconciler {
    /// Re-evaluate recently logged comments whose disposition is
    /// rescannable. Each candidate is re-fetched live and pushed through
    /// `process_comment` unchanged — there is no separate rescan code path,
    /// only a different set of candidate ids.
    pub async fn rescan_pass(&self, max_age_days: i64) -> Result<RescanReport, StorageError> {
        let logs = self.ledger().recent_dispo_logs(max_age_days).await?;
        let mut report = RescanReport::default();

        for entry in logs.into_iter().filter(|e| e.dispo.is_rescannable()) {
            report.candidates += 1;

            match self.client().fetch_comment(&entry.comment_id).await {
                Ok(Some(comment)) => match self.process_comment(&comment, true).await {
                    Ok(outcome) => {
                        report.processed += 1;
                        debug!(comment = %entry.comment_id, ?outcome, "rescanned comment");
                    }
                    Err(e) => {
                        report.failed += 1;
                        warn!(comment = %entry.comment_id, error = %e, "rescan failed");
                    }
                },
                Ok(None) => {
                    report.skipped_missing += 1;
                    warn!(comment = %entry.comment_id, "rescannable comment no longer exists");
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(comment = %entry.comment_id, error = %e, "rescan fetch failed");
                }
            }
        }

        debug!(?report, "rescan pass complete");
        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// ScanWindow
// ---------------------------------------------------------------------------

pub const DEFAULT_SCAN_WINDOW_CAPACITY: usize = 10;

/// Bounded window of recently-scanned comment ids, oldest evicted. Owned by
/// the outer polling driver as a resume hint for listing fresh comments.
///
/// Advisory bookkeeping only: award correctness rests on the ledger's
/// uniqueness checks, never on this window.
#[derive(Debug, Clone)]
pub struct ScanWindow {
    ids: VecDeque<String>,
    capacity: usize,
}

impl Default for ScanWindow {
    fn default() -> Self {
        Self::new(DEFAULT_SCAN_WINDOW_CAPACITY)
    }
}

impl ScanWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a scanned id. Platform ids order lexicographically by age, so
    /// only ids newer than the current newest are kept.
    pub fn record(&mut self, id: &str) {
        if self.ids.back().is_some_and(|last| id <= last.as_str()) {
            return;
        }
        if self.ids.len() == self.capacity {
            self.ids.pop_front();
        }
        self.ids.push_back(id.to_string());
    }

    /// Newest recorded id, the `before` anchor for the next listing.
    pub fn most_recent(&self) -> Option<&str> {
        self.ids.back().map(String::as_str)
    }

    /// Discard the newest id (e.g. its comment was deleted and can no
    /// longer anchor a listing) and expose the next-newest.
    pub fn drop_most_recent(&mut self) -> Option<String> {
        self.ids.pop_back()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
