//! Core scheduling and rotation engine for shared group chores.
//! This crate is the single source of truth for chore ledger invariants.

pub mod db;
pub mod logging;
pub mod membership;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use membership::{MembershipProvider, StaticMembership};
pub use model::chore::{
    ChoreDefinition, ChoreId, ChoreValidationError, GroupId, NewChore, PartyId, Period,
};
pub use model::instance::{ChoreInstance, CompletionRecord};
pub use repo::chore_repo::{ChoreRepository, RepoError, RepoResult, SqliteChoreRepository};
pub use repo::ledger_repo::{LedgerRepository, SqliteLedgerRepository};
pub use schedule::period::{period_at, period_end, period_for, period_start};
pub use service::chore_service::{ChoreError, ChoreResult, ChoreService, ErrorKind};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
