//! Read-only projections returned to presentation layers.
//!
//! Nothing in this module is persisted; values are computed per query.

use crate::model::chore::{ChoreId, PartyId, Period};
use serde::{Deserialize, Serialize};

/// One period's occurrence of a chore, materialized on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoreInstance {
    pub chore_id: ChoreId,
    pub title: String,
    pub frequency: i64,
    pub period: Period,
    /// Inclusive window start in epoch seconds.
    pub period_start: i64,
    /// Exclusive window end, `period_start + frequency`.
    pub period_end: i64,
    /// Resolved responsible party (override or rotation).
    pub assignee: PartyId,
    pub completed: bool,
}

/// Stored completion for one `(chore, period)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub chore_id: ChoreId,
    pub period: Period,
    /// Wall-clock marking time in epoch milliseconds, not the period window.
    pub completed_at: i64,
}
