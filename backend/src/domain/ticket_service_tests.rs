//! Tests for the ticket service.

use std::sync::Arc;

use mockable::MockClock;
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    MockTicketRepository, MockUserRepository, TicketPersistenceError, UserPersistenceError,
};
use crate::domain::test_fixtures::{
    at, caller, in_progress_ticket, new_ticket, open_ticket, user_with,
};
use crate::domain::{ErrorCode, Role, TicketStatus};

type Service = TicketService<MockTicketRepository, MockUserRepository>;

fn clock_at(hour: u32) -> Arc<dyn Clock> {
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(at(hour));
    Arc::new(clock)
}

fn summaries_for_any(users: &mut MockUserRepository) {
    users.expect_find_summaries().returning(|ids| {
        Ok(ids
            .iter()
            .map(|id| user_with(id, Role::Coordinator).summary())
            .collect())
    });
}

fn service(tickets: MockTicketRepository, users: MockUserRepository) -> Service {
    TicketService::new(Arc::new(tickets), Arc::new(users), clock_at(12))
}

#[tokio::test]
async fn create_ticket_persists_and_embeds_coordinator() {
    let coordinator = caller(Role::Coordinator);
    let mut tickets = MockTicketRepository::new();
    tickets
        .expect_insert()
        .times(1)
        .withf(|ticket| ticket.status() == TicketStatus::Open)
        .returning(|_| Ok(()));
    let mut users = MockUserRepository::new();
    summaries_for_any(&mut users);

    let view = service(tickets, users)
        .create_ticket(&coordinator, new_ticket())
        .await
        .expect("ticket created");

    assert_eq!(view.ticket.coordinator_id(), coordinator.id());
    assert_eq!(view.ticket.created_at(), at(12));
    assert_eq!(
        view.coordinator.map(|summary| summary.id),
        Some(coordinator.id().clone())
    );
    assert!(view.technician.is_none());
}

#[tokio::test]
async fn technician_cannot_create_ticket() {
    let mut tickets = MockTicketRepository::new();
    tickets.expect_insert().times(0);

    let error = service(tickets, MockUserRepository::new())
        .create_ticket(&caller(Role::Technician), new_ticket())
        .await
        .expect_err("forbidden");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn admin_assigns_technician() {
    let owner = caller(Role::Coordinator);
    let stored = open_ticket(owner.id());
    let ticket_id = stored.id();
    let technician = user_with(&UserId::random(), Role::Technician);
    let technician_id = technician.id().clone();

    let mut tickets = MockTicketRepository::new();
    tickets
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    tickets
        .expect_apply_transition()
        .times(1)
        .withf(|transition| transition.expected == TicketStatus::Open)
        .returning(|transition| Ok(transition.ticket.clone()));
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(technician)));
    summaries_for_any(&mut users);

    let view = service(tickets, users)
        .assign_technician(&caller(Role::Admin), ticket_id, technician_id.clone())
        .await
        .expect("assigned");

    assert_eq!(view.ticket.status(), TicketStatus::InProgress);
    assert_eq!(view.ticket.assigned_at(), Some(at(12)));
    assert_eq!(
        view.technician.map(|summary| summary.id),
        Some(technician_id)
    );
}

#[tokio::test]
async fn coordinator_assignment_is_forbidden_without_user_lookup() {
    let owner = caller(Role::Coordinator);
    let stored = open_ticket(owner.id());
    let ticket_id = stored.id();
    let mut tickets = MockTicketRepository::new();
    tickets
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    tickets.expect_apply_transition().times(0);
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().times(0);

    let error = service(tickets, users)
        .assign_technician(&owner, ticket_id, UserId::random())
        .await
        .expect_err("forbidden");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn assigning_unknown_technician_is_not_found() {
    let stored = open_ticket(caller(Role::Coordinator).id());
    let ticket_id = stored.id();
    let mut tickets = MockTicketRepository::new();
    tickets
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(|_| Ok(None));

    let error = service(tickets, users)
        .assign_technician(&caller(Role::Admin), ticket_id, UserId::random())
        .await
        .expect_err("missing technician");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn lost_race_is_reported_as_invalid_transition() {
    let stored = open_ticket(caller(Role::Coordinator).id());
    let ticket_id = stored.id();
    let technician = user_with(&UserId::random(), Role::Technician);
    let mut tickets = MockTicketRepository::new();
    tickets
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    tickets.expect_apply_transition().return_once(move |_| {
        Err(TicketPersistenceError::stale_status(
            ticket_id,
            TicketStatus::Open,
            TicketStatus::InProgress,
        ))
    });
    let mut users = MockUserRepository::new();
    let technician_id = technician.id().clone();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(technician)));

    let error = service(tickets, users)
        .assign_technician(&caller(Role::Admin), ticket_id, technician_id)
        .await
        .expect_err("stale");

    assert_eq!(error.code(), ErrorCode::InvalidTransition);
    assert_eq!(
        error.details(),
        Some(&json!({"expected": "OPEN", "actual": "IN_PROGRESS"}))
    );
}

#[tokio::test]
async fn unrelated_technician_cannot_close() {
    let stored = in_progress_ticket(caller(Role::Coordinator).id(), &UserId::random());
    let ticket_id = stored.id();
    let mut tickets = MockTicketRepository::new();
    tickets
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    tickets.expect_apply_transition().times(0);

    let error = service(tickets, MockUserRepository::new())
        .close_ticket(&caller(Role::Technician), ticket_id, None)
        .await
        .expect_err("forbidden");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn assigned_technician_closes_ticket() {
    let technician = caller(Role::Technician);
    let stored = in_progress_ticket(caller(Role::Coordinator).id(), technician.id());
    let ticket_id = stored.id();
    let mut tickets = MockTicketRepository::new();
    tickets
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    tickets
        .expect_apply_transition()
        .withf(|transition| transition.expected == TicketStatus::InProgress)
        .returning(|transition| Ok(transition.ticket.clone()));
    let mut users = MockUserRepository::new();
    summaries_for_any(&mut users);

    let remarks = Remarks::new("Cable replaced").expect("remarks");
    let view = service(tickets, users)
        .close_ticket(&technician, ticket_id, Some(remarks.clone()))
        .await
        .expect("closed");

    assert_eq!(view.ticket.status(), TicketStatus::Closed);
    assert_eq!(view.ticket.resolved_at(), Some(at(12)));
    assert_eq!(view.ticket.remarks(), Some(&remarks));
}

#[tokio::test]
async fn missing_ticket_is_not_found() {
    let mut tickets = MockTicketRepository::new();
    tickets.expect_find_by_id().return_once(|_| Ok(None));

    let error = service(tickets, MockUserRepository::new())
        .get_ticket(&caller(Role::Admin), TicketId::random())
        .await
        .expect_err("missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn list_scopes_coordinators_to_their_tickets() {
    let coordinator = caller(Role::Coordinator);
    let expected_scope = lifecycle::Visibility::CoordinatedBy(coordinator.id().clone());
    let mut tickets = MockTicketRepository::new();
    tickets
        .expect_list()
        .times(1)
        .withf(move |query| {
            query.visibility == expected_scope && query.order == TicketOrder::RecentlyUpdated
        })
        .returning(|_| Ok(Vec::new()));
    let mut users = MockUserRepository::new();
    users.expect_find_summaries().times(0);

    let views = service(tickets, users)
        .list_tickets(
            &coordinator,
            TicketFilter::default(),
            TicketOrder::RecentlyUpdated,
        )
        .await
        .expect("listed");

    assert!(views.is_empty());
}

#[rstest]
#[case(
    TicketPersistenceError::connection("refused"),
    ErrorCode::ServiceUnavailable
)]
#[case(TicketPersistenceError::query("syntax"), ErrorCode::InternalError)]
#[case(TicketPersistenceError::not_found(TicketId::random()), ErrorCode::NotFound)]
#[tokio::test]
async fn store_failures_map_to_error_codes(
    #[case] failure: TicketPersistenceError,
    #[case] expected: ErrorCode,
) {
    let mut tickets = MockTicketRepository::new();
    tickets.expect_find_by_id().return_once(move |_| Err(failure));

    let error = service(tickets, MockUserRepository::new())
        .get_ticket(&caller(Role::Admin), TicketId::random())
        .await
        .expect_err("store failure");

    assert_eq!(error.code(), expected);
}

#[tokio::test]
async fn summary_lookup_failure_is_surfaced() {
    let stored = open_ticket(caller(Role::Coordinator).id());
    let ticket_id = stored.id();
    let mut tickets = MockTicketRepository::new();
    tickets
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    let mut users = MockUserRepository::new();
    users
        .expect_find_summaries()
        .return_once(|_| Err(UserPersistenceError::connection("down")));

    let error = service(tickets, users)
        .get_ticket(&caller(Role::Admin), ticket_id)
        .await
        .expect_err("summary failure");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
