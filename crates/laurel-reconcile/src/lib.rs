//! laurel-reconcile
//!
//! The reconciler: compares a comment's newly computed disposition against
//! its previously logged disposition and issues the minimal corrective
//! action — create reply, edit reply, retract reply, award point, or no-op.
//!
//! The transition table is the load-bearing contract:
//!
//! ```text
//!   prior log   new dispo          action
//!   ---------   ----------------   ------------------------------------------
//!   none        trivial            nothing
//!   none        other              reply + log (+ award when Confirmed)
//!   exists      unchanged          nothing (idempotent re-scan)
//!   exists      trivial            delete reply + delete log
//!   exists      AlreadyAwarded     nothing (terminal steady-state)
//!   exists      other change       edit reply in place + upsert log
//!                                  (+ award when Confirmed)
//! ```
//!
//! Guarantees: at most one live bot reply per comment; replies converge to
//! the comment's current truth across overlapping scans; awarding is
//! idempotent, because a re-confirmed comment classifies as
//! `AlreadyAwarded` before this table can reach `Confirmed` again.

mod driver;
mod reconciler;

pub use driver::{RescanReport, ScanWindow, DEFAULT_SCAN_WINDOW_CAPACITY};
pub use reconciler::{ReconcileError, ReconcileOutcome, Reconciler};
