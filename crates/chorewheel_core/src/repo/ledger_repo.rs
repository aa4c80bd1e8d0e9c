//! Completion ledger and assignee override storage.
//!
//! # Responsibility
//! - Record write-once completions keyed by `(group, chore, period)`.
//! - Store per-period assignee overrides as optional values.
//!
//! # Invariants
//! - A completion row is inserted at most once and never updated or removed.
//! - Absent rows mean "not completed" / "no override"; nothing is pre-seeded.
//! - Override writes never consult membership; validity is a read concern.
//! - Chore liveness is checked by the caller before any write here.

use crate::model::chore::{ChoreId, GroupId, PartyId, Period};
use crate::model::instance::CompletionRecord;
use crate::repo::chore_repo::{RepoError, RepoResult};
use crate::repo::support::{ensure_schema, parse_uuid, u64_to_db};
use rusqlite::{params, Connection, OptionalExtension};

const REQUIRED_TABLES: &[(&str, &[&str])] = &[
    (
        "chore_completions",
        &["group_uuid", "chore_id", "period", "completed_at"],
    ),
    (
        "chore_assignee_overrides",
        &["group_uuid", "chore_id", "period", "party_uuid"],
    ),
];

/// Repository interface for per-period ledger state.
pub trait LedgerRepository {
    /// Inserts a completion stamped with the current wall-clock time.
    ///
    /// Returns `None` without writing when the pair is already complete.
    fn insert_completion(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        period: Period,
    ) -> RepoResult<Option<CompletionRecord>>;
    fn get_completion(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        period: Period,
    ) -> RepoResult<Option<CompletionRecord>>;
    /// Writes (`Some`) or clears (`None`) the override for one period.
    fn set_override(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        period: Period,
        party: Option<PartyId>,
    ) -> RepoResult<()>;
    fn get_override(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        period: Period,
    ) -> RepoResult<Option<PartyId>>;
}

/// SQLite-backed ledger repository.
#[derive(Clone, Copy)]
pub struct SqliteLedgerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLedgerRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl LedgerRepository for SqliteLedgerRepository<'_> {
    fn insert_completion(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        period: Period,
    ) -> RepoResult<Option<CompletionRecord>> {
        let (db_chore, db_period) = ledger_key(group, chore_id, period)?;

        let completed_at: Option<i64> = self
            .conn
            .query_row(
                "INSERT INTO chore_completions (group_uuid, chore_id, period)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (group_uuid, chore_id, period) DO NOTHING
                 RETURNING completed_at;",
                params![group.to_string(), db_chore, db_period],
                |row| row.get(0),
            )
            .optional()?;

        Ok(completed_at.map(|completed_at| CompletionRecord {
            chore_id,
            period,
            completed_at,
        }))
    }

    fn get_completion(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        period: Period,
    ) -> RepoResult<Option<CompletionRecord>> {
        // Unstorable keys can never have been written.
        let Ok((db_chore, db_period)) = ledger_key(group, chore_id, period) else {
            return Ok(None);
        };

        let completed_at: Option<i64> = self
            .conn
            .query_row(
                "SELECT completed_at
                 FROM chore_completions
                 WHERE group_uuid = ?1
                   AND chore_id = ?2
                   AND period = ?3;",
                params![group.to_string(), db_chore, db_period],
                |row| row.get(0),
            )
            .optional()?;

        Ok(completed_at.map(|completed_at| CompletionRecord {
            chore_id,
            period,
            completed_at,
        }))
    }

    fn set_override(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        period: Period,
        party: Option<PartyId>,
    ) -> RepoResult<()> {
        let (db_chore, db_period) = ledger_key(group, chore_id, period)?;

        match party {
            Some(party) => {
                self.conn.execute(
                    "INSERT INTO chore_assignee_overrides (group_uuid, chore_id, period, party_uuid)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT (group_uuid, chore_id, period) DO UPDATE SET
                        party_uuid = excluded.party_uuid,
                        updated_at = (strftime('%s', 'now') * 1000);",
                    params![group.to_string(), db_chore, db_period, party.to_string()],
                )?;
            }
            None => {
                self.conn.execute(
                    "DELETE FROM chore_assignee_overrides
                     WHERE group_uuid = ?1
                       AND chore_id = ?2
                       AND period = ?3;",
                    params![group.to_string(), db_chore, db_period],
                )?;
            }
        }

        Ok(())
    }

    fn get_override(
        &self,
        group: GroupId,
        chore_id: ChoreId,
        period: Period,
    ) -> RepoResult<Option<PartyId>> {
        let Ok((db_chore, db_period)) = ledger_key(group, chore_id, period) else {
            return Ok(None);
        };

        let party_text: Option<String> = self
            .conn
            .query_row(
                "SELECT party_uuid
                 FROM chore_assignee_overrides
                 WHERE group_uuid = ?1
                   AND chore_id = ?2
                   AND period = ?3;",
                params![group.to_string(), db_chore, db_period],
                |row| row.get(0),
            )
            .optional()?;

        party_text
            .map(|text| parse_uuid(&text, "chore_assignee_overrides.party_uuid"))
            .transpose()
    }
}

fn ledger_key(group: GroupId, chore_id: ChoreId, period: Period) -> RepoResult<(i64, i64)> {
    let db_chore = u64_to_db(chore_id).ok_or(RepoError::NotFound { group, chore_id })?;
    let db_period = u64_to_db(period).ok_or(RepoError::PeriodOutOfRange(period))?;
    Ok((db_chore, db_period))
}
