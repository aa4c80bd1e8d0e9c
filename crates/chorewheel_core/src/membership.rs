//! Membership collaborator contract and in-process snapshot.
//!
//! # Responsibility
//! - Define the read-only membership view the assignment resolver consults.
//! - Provide an in-memory implementation for hosts without their own registry.
//!
//! # Invariants
//! - `members()` order is the rotation order and must be stable between calls
//!   for an unchanged membership.
//! - The resolver never mutates a provider.

use crate::model::chore::{GroupId, PartyId};
use std::collections::{BTreeMap, HashSet};

/// External membership lookups consumed by assignment resolution.
pub trait MembershipProvider {
    /// Whether `party` is currently a member of `group`.
    fn is_member(&self, group: GroupId, party: PartyId) -> bool;
    /// Current members of `group` in rotation order.
    fn members(&self, group: GroupId) -> Vec<PartyId>;
}

impl<T: MembershipProvider + ?Sized> MembershipProvider for &T {
    fn is_member(&self, group: GroupId, party: PartyId) -> bool {
        (**self).is_member(group, party)
    }

    fn members(&self, group: GroupId) -> Vec<PartyId> {
        (**self).members(group)
    }
}

#[derive(Debug, Default, Clone)]
struct MemberList {
    order: Vec<PartyId>,
    index: HashSet<PartyId>,
}

/// In-memory membership snapshot keyed by group.
#[derive(Debug, Default, Clone)]
pub struct StaticMembership {
    groups: BTreeMap<GroupId, MemberList>,
}

impl StaticMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole member list of `group`, dropping duplicates.
    pub fn set_members(&mut self, group: GroupId, members: impl IntoIterator<Item = PartyId>) {
        let mut list = MemberList::default();
        for party in members {
            if list.index.insert(party) {
                list.order.push(party);
            }
        }
        self.groups.insert(group, list);
    }

    /// Appends `party` at the end of the rotation. Returns `false` if present.
    pub fn add_member(&mut self, group: GroupId, party: PartyId) -> bool {
        let list = self.groups.entry(group).or_default();
        if !list.index.insert(party) {
            return false;
        }
        list.order.push(party);
        true
    }

    /// Removes `party` from `group`. Returns `false` if it was not a member.
    pub fn remove_member(&mut self, group: GroupId, party: PartyId) -> bool {
        let Some(list) = self.groups.get_mut(&group) else {
            return false;
        };
        if !list.index.remove(&party) {
            return false;
        }
        list.order.retain(|member| *member != party);
        true
    }
}

impl MembershipProvider for StaticMembership {
    fn is_member(&self, group: GroupId, party: PartyId) -> bool {
        self.groups
            .get(&group)
            .is_some_and(|list| list.index.contains(&party))
    }

    fn members(&self, group: GroupId) -> Vec<PartyId> {
        self.groups
            .get(&group)
            .map(|list| list.order.clone())
            .unwrap_or_default()
    }
}
