//! Chore definition domain model.
//!
//! # Responsibility
//! - Define the recurring obligation record owned by one group.
//! - Validate creation drafts before they reach storage.
//!
//! # Invariants
//! - `id` is unique per group and never reused, even after tombstoning.
//! - `frequency > 0` and `start_time > 0` for every stored definition.
//! - `title` is non-empty after trim.
//! - `is_deleted` is the source of truth for tombstone state.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Group identity supplied by the external registration layer.
pub type GroupId = Uuid;

/// Member identity supplied by the external registration layer.
pub type PartyId = Uuid;

/// Per-group chore identifier, assigned sequentially from `0`.
pub type ChoreId = u64;

/// Derived period index; never stored on the definition itself.
pub type Period = u64;

/// Caller-supplied chore draft used for batch creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChore {
    /// Display title. Trimmed before validation and storage.
    pub title: String,
    /// Period length in epoch seconds.
    pub frequency: i64,
    /// Start of period `0` in epoch seconds.
    pub start_time: i64,
}

impl NewChore {
    pub fn new(title: impl Into<String>, frequency: i64, start_time: i64) -> Self {
        Self {
            title: title.into(),
            frequency,
            start_time,
        }
    }
}

/// Stored recurring chore definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoreDefinition {
    /// Stable per-group id.
    pub id: ChoreId,
    pub title: String,
    /// Period length in epoch seconds.
    pub frequency: i64,
    /// Start of period `0` in epoch seconds.
    pub start_time: i64,
    /// Soft delete tombstone; the row stays addressable by id.
    pub is_deleted: bool,
}

impl ChoreDefinition {
    /// Returns whether this definition is still part of the live schedule.
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }

    /// Validates stored-shape invariants.
    pub fn validate(&self) -> Result<(), ChoreValidationError> {
        validate_fields(0, &self.title, self.frequency, self.start_time)
    }
}

/// Validation failures for chore drafts and persisted definitions.
///
/// Batch variants carry the zero-based index of the offending draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoreValidationError {
    /// The batch contained no drafts.
    NoDefinitions,
    EmptyTitle { index: usize },
    InvalidFrequency { index: usize },
    InvalidStartTime { index: usize },
}

impl Display for ChoreValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDefinitions => write!(f, "chore batch must contain at least one definition"),
            Self::EmptyTitle { index } => write!(f, "chore #{index} title must not be blank"),
            Self::InvalidFrequency { index } => {
                write!(f, "chore #{index} frequency must be positive")
            }
            Self::InvalidStartTime { index } => {
                write!(f, "chore #{index} start time must be positive")
            }
        }
    }
}

impl Error for ChoreValidationError {}

/// Validates a whole creation batch and returns normalized drafts.
///
/// # Invariants
/// - Fails on the first invalid draft; nothing is returned for partial input.
/// - Returned titles are trimmed.
pub fn validate_batch(drafts: &[NewChore]) -> Result<Vec<NewChore>, ChoreValidationError> {
    if drafts.is_empty() {
        return Err(ChoreValidationError::NoDefinitions);
    }

    drafts
        .iter()
        .enumerate()
        .map(|(index, draft)| {
            let title = draft.title.trim();
            validate_fields(index, title, draft.frequency, draft.start_time)?;
            Ok(NewChore {
                title: title.to_string(),
                frequency: draft.frequency,
                start_time: draft.start_time,
            })
        })
        .collect()
}

fn validate_fields(
    index: usize,
    title: &str,
    frequency: i64,
    start_time: i64,
) -> Result<(), ChoreValidationError> {
    if title.trim().is_empty() {
        return Err(ChoreValidationError::EmptyTitle { index });
    }
    if frequency <= 0 {
        return Err(ChoreValidationError::InvalidFrequency { index });
    }
    if start_time <= 0 {
        return Err(ChoreValidationError::InvalidStartTime { index });
    }
    Ok(())
}
