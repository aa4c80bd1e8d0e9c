//! Round-robin rotation over an ordered member list.
//!
//! # Invariants
//! - Selection is a pure function of `(chore_id, period, members)`.
//! - The index is offset by `chore_id` so chores sharing a cadence do not
//!   all land on the same member in the same period.
//! - Over any `n` consecutive periods of one chore, each of `n` members is
//!   selected exactly once.

use crate::model::chore::{ChoreId, PartyId, Period};

/// Rotation slot `(chore_id + period) mod member_count`.
///
/// Returns `None` for an empty member list.
pub fn rotation_index(chore_id: ChoreId, period: Period, member_count: usize) -> Option<usize> {
    if member_count == 0 {
        return None;
    }

    // u128 keeps `chore_id + period` exact for any pair of u64 inputs.
    let slot = (u128::from(chore_id) + u128::from(period)) % member_count as u128;
    usize::try_from(slot).ok()
}

/// Rotation assignee for `(chore_id, period)`, or `None` when nobody is a member.
pub fn rotate(chore_id: ChoreId, period: Period, members: &[PartyId]) -> Option<PartyId> {
    rotation_index(chore_id, period, members.len()).map(|index| members[index])
}
