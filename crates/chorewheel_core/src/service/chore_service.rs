//! Chore scheduling use-case service.
//!
//! # Responsibility
//! - Expose the mutators (`add_chores`, `remove_chore`, `mark_complete`,
//!   `set_assignee`) and readers (definitions, completion, assignee
//!   resolution, instance projection) consumed by the host workflow.
//! - Combine overrides with rotation against the external membership view.
//!
//! # Invariants
//! - Every error aborts the whole operation; nothing is retried internally.
//! - Completion and override writes require a live chore.
//! - A stored override whose party is no longer a member is ignored and
//!   resolution falls back to rotation. This is NOT an error and is never
//!   surfaced to callers.
//! - Resolution and projection never write.

use crate::membership::MembershipProvider;
use crate::model::chore::{
    ChoreDefinition, ChoreId, ChoreValidationError, GroupId, NewChore, PartyId, Period,
};
use crate::model::instance::{ChoreInstance, CompletionRecord};
use crate::repo::chore_repo::{ChoreRepository, RepoError};
use crate::repo::ledger_repo::LedgerRepository;
use crate::schedule::period::{period_at, period_end};
use crate::schedule::rotation::rotate;
use crate::schedule::window::PeriodWindow;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ChoreResult<T> = Result<T, ChoreError>;

/// Coarse error category for host-side handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input.
    Validation,
    /// Unknown or tombstoned chore id.
    NotFound,
    /// Re-marking an already complete period.
    Conflict,
    /// Rotation requested with zero members.
    Precondition,
    /// Storage transport or corrupted persisted state.
    Storage,
}

/// Errors from chore service operations.
#[derive(Debug)]
pub enum ChoreError {
    Validation(ChoreValidationError),
    /// Chore id is unknown in the group or has been removed.
    InvalidChoreId { group: GroupId, chore_id: ChoreId },
    AlreadyCompleted { chore_id: ChoreId, period: Period },
    /// The group has no members to rotate over.
    NoMembers(GroupId),
    /// Period index cannot be stored.
    PeriodOutOfRange(Period),
    Repo(RepoError),
}

impl ChoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::PeriodOutOfRange(_) => ErrorKind::Validation,
            Self::InvalidChoreId { .. } => ErrorKind::NotFound,
            Self::AlreadyCompleted { .. } => ErrorKind::Conflict,
            Self::NoMembers(_) => ErrorKind::Precondition,
            Self::Repo(_) => ErrorKind::Storage,
        }
    }
}

impl Display for ChoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidChoreId { group, chore_id } => {
                write!(f, "invalid chore id {chore_id} in group {group}")
            }
            Self::AlreadyCompleted { chore_id, period } => {
                write!(f, "chore {chore_id} already completed for period {period}")
            }
            Self::NoMembers(group) => write!(f, "group {group} has no members"),
            Self::PeriodOutOfRange(period) => {
                write!(f, "period {period} exceeds the storable range")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ChoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ChoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound { group, chore_id } => Self::InvalidChoreId { group, chore_id },
            RepoError::PeriodOutOfRange(period) => Self::PeriodOutOfRange(period),
            other => Self::Repo(other),
        }
    }
}

/// Chore ledger facade over definition storage, ledger storage and membership.
pub struct ChoreService<R: ChoreRepository, L: LedgerRepository, M: MembershipProvider> {
    chores: R,
    ledger: L,
    membership: M,
}

impl<R, L, M> ChoreService<R, L, M>
where
    R: ChoreRepository,
    L: LedgerRepository,
    M: MembershipProvider,
{
    pub fn new(chores: R, ledger: L, membership: M) -> Self {
        Self {
            chores,
            ledger,
            membership,
        }
    }

    /// Creates a batch of chores with sequential ids.
    ///
    /// # Contract
    /// - Fails with a validation error, creating nothing, when the batch is
    ///   empty or any draft has a blank title, non-positive frequency or
    ///   non-positive start time.
    /// - Returns created definitions in input order.
    pub fn add_chores(
        &self,
        group: GroupId,
        drafts: &[NewChore],
    ) -> ChoreResult<Vec<ChoreDefinition>> {
        let created = self.chores.create_chores(group, drafts)?;
        info!(
            "event=chores_add module=chore_service status=ok group={group} count={} first_id={}",
            created.len(),
            created.first().map_or(0, |chore| chore.id)
        );
        Ok(created)
    }

    /// Tombstones a live chore. A second removal fails with `InvalidChoreId`.
    pub fn remove_chore(&self, group: GroupId, chore_id: ChoreId) -> ChoreResult<()> {
        self.chores.soft_delete_chore(group, chore_id)?;
        info!(
            "event=chore_remove module=chore_service status=ok group={group} chore_id={chore_id}"
        );
        Ok(())
    }

    /// Live definitions in creation order.
    pub fn get_definitions(&self, group: GroupId) -> ChoreResult<Vec<ChoreDefinition>> {
        self.chores.list_chores(group, false).map_err(Into::into)
    }

    /// Id-stable lookup, including tombstoned definitions when asked.
    pub fn get_chore(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        include_deleted: bool,
    ) -> ChoreResult<Option<ChoreDefinition>> {
        self.chores
            .get_chore(group, chore_id, include_deleted)
            .map_err(Into::into)
    }

    /// Period index of a live chore at caller-supplied `now`.
    pub fn current_period(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        now: i64,
    ) -> ChoreResult<Period> {
        let chore = self.require_live(group, chore_id)?;
        Ok(period_at(&chore, now))
    }

    /// Marks `(chore_id, period)` complete and stamps the wall-clock time.
    ///
    /// # Contract
    /// - `InvalidChoreId` when the chore is unknown or removed.
    /// - `AlreadyCompleted` when the pair is already marked; state is unchanged.
    /// - There is no unmark operation.
    pub fn mark_complete(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        period: Period,
    ) -> ChoreResult<CompletionRecord> {
        self.require_live(group, chore_id)?;
        let record = self
            .ledger
            .insert_completion(group, chore_id, period)?
            .ok_or(ChoreError::AlreadyCompleted { chore_id, period })?;
        info!(
            "event=chore_complete module=chore_service status=ok group={group} chore_id={chore_id} period={period}"
        );
        Ok(record)
    }

    /// Whether `(chore_id, period)` was marked. Never-marked periods are `false`.
    pub fn is_complete(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        period: Period,
    ) -> ChoreResult<bool> {
        Ok(self.get_completion(group, chore_id, period)?.is_some())
    }

    /// Completion record for `(chore_id, period)`, if marked.
    pub fn get_completion(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        period: Period,
    ) -> ChoreResult<Option<CompletionRecord>> {
        self.ledger
            .get_completion(group, chore_id, period)
            .map_err(Into::into)
    }

    /// Writes (`Some`) or clears (`None`) the assignee override for one period.
    ///
    /// Membership is deliberately not checked here; an override may be set
    /// ahead of a membership change and is re-validated on every read.
    pub fn set_assignee(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        period: Period,
        party: Option<PartyId>,
    ) -> ChoreResult<()> {
        self.require_live(group, chore_id)?;
        self.ledger.set_override(group, chore_id, period, party)?;
        info!(
            "event=assignee_set module=chore_service status=ok group={group} chore_id={chore_id} period={period} cleared={}",
            party.is_none()
        );
        Ok(())
    }

    /// Stored override for a live chore, without membership validation.
    pub fn get_override(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        period: Period,
    ) -> ChoreResult<Option<PartyId>> {
        self.require_live(group, chore_id)?;
        self.ledger
            .get_override(group, chore_id, period)
            .map_err(Into::into)
    }

    /// Responsible party for `(chore_id, period)`.
    ///
    /// # Contract
    /// - A stored override wins while its party is still a member.
    /// - A stale override silently falls back to rotation.
    /// - Rotation is `members[(chore_id + period) mod n]`; `NoMembers` when
    ///   `n == 0`.
    pub fn resolve_assignee(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        period: Period,
    ) -> ChoreResult<PartyId> {
        self.require_live(group, chore_id)?;
        self.resolve_live(group, chore_id, period)
    }

    /// Responsible party for the period containing `now`.
    pub fn current_assignee(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        now: i64,
    ) -> ChoreResult<PartyId> {
        let chore = self.require_live(group, chore_id)?;
        self.resolve_live(group, chore_id, period_at(&chore, now))
    }

    /// Materializes every live chore occurrence whose window intersects
    /// `[start, end)`.
    ///
    /// Output is grouped by chore in creation order, ascending period within
    /// a chore. Nothing is persisted.
    ///
    /// Cost is `O(chores x periods in range)` and is NOT capped here: a
    /// multi-year window over a one-second chore materializes every second.
    /// Callers must bound the window.
    pub fn get_instances(
        &self,
        group: GroupId,
        start: i64,
        end: i64,
    ) -> ChoreResult<Vec<ChoreInstance>> {
        let definitions = self.chores.list_chores(group, false)?;
        // One snapshot for the whole query keeps rotation consistent across
        // instances.
        let members = self.membership.members(group);

        let mut instances = Vec::new();
        for chore in &definitions {
            for (period, period_start) in PeriodWindow::new(chore, start, end) {
                let assignee = match self.usable_override(group, chore.id, period)? {
                    Some(party) => party,
                    None => rotate(chore.id, period, &members)
                        .ok_or(ChoreError::NoMembers(group))?,
                };
                let completed = self
                    .ledger
                    .get_completion(group, chore.id, period)?
                    .is_some();
                instances.push(ChoreInstance {
                    chore_id: chore.id,
                    title: chore.title.clone(),
                    frequency: chore.frequency,
                    period,
                    period_start,
                    period_end: period_end(chore.start_time, chore.frequency, period),
                    assignee,
                    completed,
                });
            }
        }

        debug!(
            "event=instances_project module=chore_service status=ok group={group} start={start} end={end} chores={} instances={}",
            definitions.len(),
            instances.len()
        );
        Ok(instances)
    }

    fn require_live(&self, group: GroupId, chore_id: ChoreId) -> ChoreResult<ChoreDefinition> {
        self.chores
            .get_chore(group, chore_id, false)?
            .ok_or(ChoreError::InvalidChoreId { group, chore_id })
    }

    fn resolve_live(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        period: Period,
    ) -> ChoreResult<PartyId> {
        if let Some(party) = self.usable_override(group, chore_id, period)? {
            return Ok(party);
        }
        rotate(chore_id, period, &self.membership.members(group))
            .ok_or(ChoreError::NoMembers(group))
    }

    /// Stored override when its party is still a member; stale ones read as `None`.
    fn usable_override(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        period: Period,
    ) -> ChoreResult<Option<PartyId>> {
        let Some(party) = self.ledger.get_override(group, chore_id, period)? else {
            return Ok(None);
        };
        if self.membership.is_member(group, party) {
            return Ok(Some(party));
        }

        debug!(
            "event=override_stale module=chore_service status=fallback group={group} chore_id={chore_id} period={period}"
        );
        Ok(None)
    }
}
