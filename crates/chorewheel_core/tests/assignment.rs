use chorewheel_core::db::open_db_in_memory;
use chorewheel_core::{
    ChoreError, ChoreService, ErrorKind, NewChore, PartyId, SqliteChoreRepository,
    SqliteLedgerRepository, StaticMembership,
};
use rusqlite::Connection;
use std::collections::HashSet;
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

struct Fixture {
    conn: Connection,
    membership: StaticMembership,
    group: Uuid,
    members: Vec<PartyId>,
}

fn fixture(member_count: usize, chore_count: usize) -> Fixture {
    let conn = open_db_in_memory().unwrap();
    let group = Uuid::new_v4();
    let members: Vec<PartyId> = (0..member_count).map(|_| Uuid::new_v4()).collect();
    let mut membership = StaticMembership::new();
    membership.set_members(group, members.iter().copied());

    let drafts: Vec<NewChore> = (0..chore_count)
        .map(|index| NewChore::new(format!("chore {index}"), 100, 1_000))
        .collect();
    service(&conn, &membership).add_chores(group, &drafts).unwrap();

    Fixture {
        conn,
        membership,
        group,
        members,
    }
}

#[test]
fn rotation_is_staggered_by_chore_id() {
    let fx = fixture(3, 3);
    let service = service(&fx.conn, &fx.membership);

    for chore_id in 0..3_u64 {
        for period in 0..6_u64 {
            let expected = fx.members[((chore_id + period) % 3) as usize];
            assert_eq!(
                service.resolve_assignee(fx.group, chore_id, period).unwrap(),
                expected,
                "chore {chore_id} period {period}"
            );
        }
    }
}

#[test]
fn each_member_serves_once_per_rotation_cycle() {
    let fx = fixture(4, 2);
    let service = service(&fx.conn, &fx.membership);

    for first_period in [0_u64, 5, 11] {
        let assignees: HashSet<PartyId> = (first_period..first_period + 4)
            .map(|period| service.resolve_assignee(fx.group, 1, period).unwrap())
            .collect();
        assert_eq!(assignees.len(), 4);
    }
}

#[test]
fn resolution_is_deterministic_and_isolated() {
    let fx = fixture(3, 2);
    let service = service(&fx.conn, &fx.membership);

    let before = service.resolve_assignee(fx.group, 0, 4).unwrap();
    service
        .set_assignee(fx.group, 1, 4, Some(fx.members[0]))
        .unwrap();
    service
        .set_assignee(fx.group, 0, 5, Some(fx.members[2]))
        .unwrap();

    assert_eq!(service.resolve_assignee(fx.group, 0, 4).unwrap(), before);
    assert_eq!(service.resolve_assignee(fx.group, 0, 4).unwrap(), before);
}

#[test]
fn valid_override_wins_over_rotation() {
    let fx = fixture(3, 1);
    let service = service(&fx.conn, &fx.membership);

    let rotation = service.resolve_assignee(fx.group, 0, 2).unwrap();
    let pinned = fx
        .members
        .iter()
        .copied()
        .find(|member| *member != rotation)
        .unwrap();

    service.set_assignee(fx.group, 0, 2, Some(pinned)).unwrap();
    assert_eq!(service.resolve_assignee(fx.group, 0, 2).unwrap(), pinned);
    assert_eq!(service.get_override(fx.group, 0, 2).unwrap(), Some(pinned));

    service.set_assignee(fx.group, 0, 2, None).unwrap();
    assert_eq!(service.resolve_assignee(fx.group, 0, 2).unwrap(), rotation);
    assert_eq!(service.get_override(fx.group, 0, 2).unwrap(), None);
}

#[test]
fn override_can_be_replaced() {
    let fx = fixture(3, 1);
    let service = service(&fx.conn, &fx.membership);

    service.set_assignee(fx.group, 0, 0, Some(fx.members[1])).unwrap();
    service.set_assignee(fx.group, 0, 0, Some(fx.members[2])).unwrap();

    assert_eq!(
        service.resolve_assignee(fx.group, 0, 0).unwrap(),
        fx.members[2]
    );
}

#[test]
fn stale_override_silently_falls_back_to_rotation() {
    let mut fx = fixture(3, 1);
    let leaving = fx.members[2];
    // Period 1 of chore 0 rotates to members[1], so the override is visible.
    service(&fx.conn, &fx.membership)
        .set_assignee(fx.group, 0, 1, Some(leaving))
        .unwrap();
    assert_eq!(
        service(&fx.conn, &fx.membership)
            .resolve_assignee(fx.group, 0, 1)
            .unwrap(),
        leaving
    );

    assert!(fx.membership.remove_member(fx.group, leaving));
    let remaining = [fx.members[0], fx.members[1]];

    let service = service(&fx.conn, &fx.membership);
    let resolved = service.resolve_assignee(fx.group, 0, 1).unwrap();
    assert_ne!(resolved, leaving);
    assert_eq!(resolved, remaining[1]);
    // The stored override is kept and would apply again if the party rejoined.
    assert_eq!(service.get_override(fx.group, 0, 1).unwrap(), Some(leaving));
}

#[test]
fn override_for_non_member_can_be_written_ahead_of_joining() {
    let mut fx = fixture(2, 1);
    let newcomer = Uuid::new_v4();

    service(&fx.conn, &fx.membership)
        .set_assignee(fx.group, 0, 10, Some(newcomer))
        .unwrap();
    let before = service(&fx.conn, &fx.membership)
        .resolve_assignee(fx.group, 0, 10)
        .unwrap();
    assert_ne!(before, newcomer);

    fx.membership.add_member(fx.group, newcomer);
    let after = service(&fx.conn, &fx.membership)
        .resolve_assignee(fx.group, 0, 10)
        .unwrap();
    assert_eq!(after, newcomer);
}

#[test]
fn rotation_without_members_fails_with_precondition() {
    let fx = fixture(0, 1);
    let service = service(&fx.conn, &fx.membership);

    let err = service.resolve_assignee(fx.group, 0, 0).unwrap_err();
    assert!(matches!(err, ChoreError::NoMembers(group) if group == fx.group));
    assert_eq!(err.kind(), ErrorKind::Precondition);
}

#[test]
fn override_still_resolves_when_it_is_the_only_member() {
    let mut fx = fixture(1, 1);
    let solo = fx.members[0];
    service(&fx.conn, &fx.membership)
        .set_assignee(fx.group, 0, 0, Some(solo))
        .unwrap();
    assert_eq!(
        service(&fx.conn, &fx.membership)
            .resolve_assignee(fx.group, 0, 0)
            .unwrap(),
        solo
    );

    fx.membership.remove_member(fx.group, solo);
    let err = service(&fx.conn, &fx.membership)
        .resolve_assignee(fx.group, 0, 0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
}

#[test]
fn overrides_on_removed_chores_are_unreachable() {
    let fx = fixture(2, 2);
    let service = service(&fx.conn, &fx.membership);

    service.set_assignee(fx.group, 1, 0, Some(fx.members[0])).unwrap();
    service.remove_chore(fx.group, 1).unwrap();

    for err in [
        service.resolve_assignee(fx.group, 1, 0).unwrap_err(),
        service.get_override(fx.group, 1, 0).unwrap_err(),
        service
            .set_assignee(fx.group, 1, 0, Some(fx.members[1]))
            .unwrap_err(),
    ] {
        assert!(matches!(err, ChoreError::InvalidChoreId { chore_id: 1, .. }));
    }
}

#[test]
fn current_assignee_follows_period_clock() {
    let fx = fixture(3, 1);
    let service = service(&fx.conn, &fx.membership);

    assert_eq!(
        service.current_assignee(fx.group, 0, 900).unwrap(),
        fx.members[0]
    );
    assert_eq!(
        service.current_assignee(fx.group, 0, 1_050).unwrap(),
        fx.members[0]
    );
    assert_eq!(
        service.current_assignee(fx.group, 0, 1_100).unwrap(),
        fx.members[1]
    );
    assert_eq!(
        service.current_assignee(fx.group, 0, 1_299).unwrap(),
        fx.members[2]
    );
}
