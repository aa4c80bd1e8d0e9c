//! Chore definition repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own per-group chore identity: sequential ids from a persisted
//!   high-water mark.
//! - Provide batch create, tombstone and live/historical reads.
//!
//! # Invariants
//! - Batch writes call `validate_batch()` before SQL and commit all-or-nothing.
//! - `chore_groups.next_chore_id` only grows, so tombstoned ids are never
//!   reissued.
//! - Rows are never physically deleted; the live list is `is_deleted = 0`
//!   ordered by `chore_id` (creation order).
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::chore::{
    validate_batch, ChoreDefinition, ChoreId, ChoreValidationError, GroupId, NewChore, Period,
};
use crate::repo::support::{bool_from_db, ensure_schema, u64_from_db, u64_to_db};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CHORE_SELECT_SQL: &str = "SELECT
    chore_id,
    title,
    frequency,
    start_time,
    is_deleted
FROM chores";

const REQUIRED_TABLES: &[(&str, &[&str])] = &[
    ("chore_groups", &["group_uuid", "next_chore_id"]),
    (
        "chores",
        &[
            "group_uuid",
            "chore_id",
            "title",
            "frequency",
            "start_time",
            "is_deleted",
        ],
    ),
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for chore ledger persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ChoreValidationError),
    Db(DbError),
    /// Chore id unknown in the group, or already tombstoned for writes.
    NotFound {
        group: GroupId,
        chore_id: ChoreId,
    },
    /// Period index does not fit the storage integer range.
    PeriodOutOfRange(Period),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { group, chore_id } => {
                write!(f, "chore not found: {chore_id} in group {group}")
            }
            Self::PeriodOutOfRange(period) => {
                write!(f, "period {period} exceeds the storable range")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "chore repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "chore repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "chore repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted chore data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ChoreValidationError> for RepoError {
    fn from(value: ChoreValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for chore definitions.
pub trait ChoreRepository {
    /// Validates and stores a whole batch, returning the created definitions
    /// in input order.
    fn create_chores(&self, group: GroupId, drafts: &[NewChore])
        -> RepoResult<Vec<ChoreDefinition>>;
    /// Looks up one definition; tombstoned rows only when `include_deleted`.
    fn get_chore(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        include_deleted: bool,
    ) -> RepoResult<Option<ChoreDefinition>>;
    /// Lists definitions in creation order.
    fn list_chores(&self, group: GroupId, include_deleted: bool)
        -> RepoResult<Vec<ChoreDefinition>>;
    /// Tombstones a live definition. Unknown or already deleted ids are
    /// `NotFound`.
    fn soft_delete_chore(&self, group: GroupId, chore_id: ChoreId) -> RepoResult<()>;
}

/// SQLite-backed chore definition repository.
#[derive(Clone, Copy)]
pub struct SqliteChoreRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteChoreRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl ChoreRepository for SqliteChoreRepository<'_> {
    fn create_chores(
        &self,
        group: GroupId,
        drafts: &[NewChore],
    ) -> RepoResult<Vec<ChoreDefinition>> {
        let drafts = validate_batch(drafts)?;
        let group_text = group.to_string();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO chore_groups (group_uuid, next_chore_id)
             VALUES (?1, 0)
             ON CONFLICT (group_uuid) DO NOTHING;",
            [group_text.as_str()],
        )?;
        let first_id: i64 = tx.query_row(
            "SELECT next_chore_id FROM chore_groups WHERE group_uuid = ?1;",
            [group_text.as_str()],
            |row| row.get(0),
        )?;

        let mut created = Vec::with_capacity(drafts.len());
        for (offset, draft) in drafts.into_iter().enumerate() {
            let chore_id = first_id
                .checked_add(offset as i64)
                .ok_or_else(|| RepoError::InvalidData("chore id space exhausted".to_string()))?;
            tx.execute(
                "INSERT INTO chores (
                    group_uuid,
                    chore_id,
                    title,
                    frequency,
                    start_time,
                    is_deleted
                ) VALUES (?1, ?2, ?3, ?4, ?5, 0);",
                params![
                    group_text.as_str(),
                    chore_id,
                    draft.title.as_str(),
                    draft.frequency,
                    draft.start_time,
                ],
            )?;
            created.push(ChoreDefinition {
                id: u64_from_db(chore_id, "chores.chore_id")?,
                title: draft.title,
                frequency: draft.frequency,
                start_time: draft.start_time,
                is_deleted: false,
            });
        }

        tx.execute(
            "UPDATE chore_groups
             SET next_chore_id = ?2
             WHERE group_uuid = ?1;",
            params![group_text.as_str(), first_id + created.len() as i64],
        )?;
        tx.commit()?;

        Ok(created)
    }

    fn get_chore(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        include_deleted: bool,
    ) -> RepoResult<Option<ChoreDefinition>> {
        let Some(db_id) = u64_to_db(chore_id) else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(&format!(
            "{CHORE_SELECT_SQL}
             WHERE group_uuid = ?1
               AND chore_id = ?2
               AND (?3 = 1 OR is_deleted = 0);"
        ))?;
        let mut rows = stmt.query(params![
            group.to_string(),
            db_id,
            i64::from(include_deleted)
        ])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_chore_row(row)?));
        }

        Ok(None)
    }

    fn list_chores(
        &self,
        group: GroupId,
        include_deleted: bool,
    ) -> RepoResult<Vec<ChoreDefinition>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CHORE_SELECT_SQL}
             WHERE group_uuid = ?1
               AND (?2 = 1 OR is_deleted = 0)
             ORDER BY chore_id ASC;"
        ))?;
        let mut rows = stmt.query(params![group.to_string(), i64::from(include_deleted)])?;

        let mut chores = Vec::new();
        while let Some(row) = rows.next()? {
            chores.push(parse_chore_row(row)?);
        }
        Ok(chores)
    }

    fn soft_delete_chore(&self, group: GroupId, chore_id: ChoreId) -> RepoResult<()> {
        let not_found = RepoError::NotFound { group, chore_id };
        let Some(db_id) = u64_to_db(chore_id) else {
            return Err(not_found);
        };

        let changed = self.conn.execute(
            "UPDATE chores
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE group_uuid = ?1
               AND chore_id = ?2
               AND is_deleted = 0;",
            params![group.to_string(), db_id],
        )?;

        if changed == 0 {
            return Err(not_found);
        }
        Ok(())
    }
}

fn parse_chore_row(row: &Row<'_>) -> RepoResult<ChoreDefinition> {
    let chore = ChoreDefinition {
        id: u64_from_db(row.get("chore_id")?, "chores.chore_id")?,
        title: row.get("title")?,
        frequency: row.get("frequency")?,
        start_time: row.get("start_time")?,
        is_deleted: bool_from_db(row.get("is_deleted")?, "chores.is_deleted")?,
    };
    chore
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("chore {}: {err}", chore.id)))?;
    Ok(chore)
}
