//! Domain model for recurring group chores.
//!
//! # Responsibility
//! - Define canonical data structures used by core scheduling logic.
//! - Keep stored definitions separate from per-query projections.
//!
//! # Invariants
//! - Every chore is identified by a stable per-group `ChoreId`.
//! - Deletion is represented by soft-delete tombstones, not hard delete.
//! - Periods and instances are derived, never stored on the definition.

pub mod chore;
pub mod instance;
