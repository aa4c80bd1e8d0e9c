use chorewheel_core::db::open_db_in_memory;
use chorewheel_core::{
    ChoreError, ChoreService, ErrorKind, LedgerRepository, NewChore, SqliteChoreRepository,
    SqliteLedgerRepository, StaticMembership,
};
use rusqlite::Connection;
use uuid::Uuid;

type Service<'c> =
    ChoreService<SqliteChoreRepository<'c>, SqliteLedgerRepository<'c>, &'c StaticMembership>;

fn service<'c>(conn: &'c Connection, membership: &'c StaticMembership) -> Service<'c> {
    ChoreService::new(
        SqliteChoreRepository::try_new(conn).unwrap(),
        SqliteLedgerRepository::try_new(conn).unwrap(),
        membership,
    )
}

fn seeded_group(service: &Service<'_>) -> Uuid {
    let group = Uuid::new_v4();
    service
        .add_chores(
            group,
            &[
                NewChore::new("dishes", 100, 1_000),
                NewChore::new("trash", 700, 1_000),
            ],
        )
        .unwrap();
    group
}

#[test]
fn unmarked_periods_default_to_incomplete() {
    let conn = open_db_in_memory().unwrap();
    let membership = StaticMembership::new();
    let service = service(&conn, &membership);
    let group = seeded_group(&service);

    assert!(!service.is_complete(group, 0, 0).unwrap());
    assert!(!service.is_complete(group, 0, 1_000_000).unwrap());
    assert!(!service.is_complete(group, 0, u64::MAX).unwrap());
    assert!(!service.is_complete(group, 42, 0).unwrap());
}

#[test]
fn mark_complete_succeeds_once_then_conflicts() {
    let conn = open_db_in_memory().unwrap();
    let membership = StaticMembership::new();
    let service = service(&conn, &membership);
    let group = seeded_group(&service);

    let record = service.mark_complete(group, 0, 0).unwrap();
    assert_eq!(record.chore_id, 0);
    assert_eq!(record.period, 0);
    assert!(record.completed_at > 0);
    assert!(service.is_complete(group, 0, 0).unwrap());

    let err = service.mark_complete(group, 0, 0).unwrap_err();
    assert!(matches!(
        err,
        ChoreError::AlreadyCompleted {
            chore_id: 0,
            period: 0
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let stored = service.get_completion(group, 0, 0).unwrap().unwrap();
    assert_eq!(stored, record);
}

#[test]
fn completion_is_keyed_by_chore_and_period() {
    let conn = open_db_in_memory().unwrap();
    let membership = StaticMembership::new();
    let service = service(&conn, &membership);
    let group = seeded_group(&service);

    service.mark_complete(group, 0, 3).unwrap();

    assert!(service.is_complete(group, 0, 3).unwrap());
    assert!(!service.is_complete(group, 0, 2).unwrap());
    assert!(!service.is_complete(group, 0, 4).unwrap());
    assert!(!service.is_complete(group, 1, 3).unwrap());
}

#[test]
fn future_periods_can_be_marked() {
    let conn = open_db_in_memory().unwrap();
    let membership = StaticMembership::new();
    let service = service(&conn, &membership);
    let group = seeded_group(&service);

    service.mark_complete(group, 1, 9_999).unwrap();
    assert!(service.is_complete(group, 1, 9_999).unwrap());
}

#[test]
fn mark_complete_requires_live_chore() {
    let conn = open_db_in_memory().unwrap();
    let membership = StaticMembership::new();
    let service = service(&conn, &membership);
    let group = seeded_group(&service);

    let err = service.mark_complete(group, 5, 0).unwrap_err();
    assert!(matches!(err, ChoreError::InvalidChoreId { chore_id: 5, .. }));

    service.remove_chore(group, 1).unwrap();
    let err = service.mark_complete(group, 1, 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!service.is_complete(group, 1, 0).unwrap());
}

#[test]
fn completions_survive_tombstoning() {
    let conn = open_db_in_memory().unwrap();
    let membership = StaticMembership::new();
    let service = service(&conn, &membership);
    let group = seeded_group(&service);

    service.mark_complete(group, 0, 2).unwrap();
    service.remove_chore(group, 0).unwrap();

    assert!(service.is_complete(group, 0, 2).unwrap());
}

#[test]
fn unstorable_period_is_rejected_on_write() {
    let conn = open_db_in_memory().unwrap();
    let membership = StaticMembership::new();
    let service = service(&conn, &membership);
    let group = seeded_group(&service);

    let err = service.mark_complete(group, 0, u64::MAX).unwrap_err();
    assert!(matches!(err, ChoreError::PeriodOutOfRange(u64::MAX)));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn ledger_insert_reports_existing_rows() {
    let conn = open_db_in_memory().unwrap();
    let membership = StaticMembership::new();
    let service = service(&conn, &membership);
    let group = seeded_group(&service);
    let ledger = SqliteLedgerRepository::try_new(&conn).unwrap();

    assert!(ledger.insert_completion(group, 0, 1).unwrap().is_some());
    assert!(ledger.insert_completion(group, 0, 1).unwrap().is_none());

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM chore_completions;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(rows, 1);
}
