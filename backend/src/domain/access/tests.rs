//! Tests for the access policy table.

use super::*;
use crate::domain::test_fixtures::{caller, closed_ticket, in_progress_ticket, open_ticket};
use rstest::rstest;

#[test]
fn every_operation_has_exactly_one_rule() {
    let operations = [
        Operation::CreateTicket,
        Operation::AssignTechnician,
        Operation::CloseTicket,
        Operation::EditTicket,
        Operation::ViewTicket,
        Operation::ListAllTickets,
        Operation::ListOwnTickets,
        Operation::CreateUserAccount,
        Operation::ListStaff,
    ];
    for operation in operations {
        let count = POLICY
            .iter()
            .filter(|rule| rule.operation == operation)
            .count();
        assert_eq!(count, 1, "{operation:?} must have one rule");
    }
}

#[rstest]
#[case(Role::Coordinator, true)]
#[case(Role::Admin, true)]
#[case(Role::Technician, false)]
fn create_ticket_is_role_gated(#[case] role: Role, #[case] allowed: bool) {
    let result = authorize(&caller(role), Operation::CreateTicket, None);
    assert_eq!(result.is_ok(), allowed);
}

#[rstest]
#[case(Operation::CreateUserAccount)]
#[case(Operation::ListStaff)]
#[case(Operation::ListAllTickets)]
fn admin_only_operations_reject_other_roles(#[case] operation: Operation) {
    assert!(authorize(&caller(Role::Admin), operation, None).is_ok());
    assert_eq!(
        authorize(&caller(Role::Coordinator), operation, None),
        Err(Denied::Forbidden)
    );
    assert_eq!(
        authorize(&caller(Role::Technician), operation, None),
        Err(Denied::Forbidden)
    );
}

#[rstest]
fn close_accepts_owner_assignee_and_admin() {
    let owner = caller(Role::Coordinator);
    let assignee = caller(Role::Technician);
    let ticket = in_progress_ticket(owner.id(), assignee.id());

    for allowed in [&owner, &assignee, &caller(Role::Admin)] {
        assert!(authorize(allowed, Operation::CloseTicket, Some(&ticket)).is_ok());
    }
    for denied in [&caller(Role::Coordinator), &caller(Role::Technician)] {
        assert_eq!(
            authorize(denied, Operation::CloseTicket, Some(&ticket)),
            Err(Denied::Forbidden)
        );
    }
}

#[rstest]
fn relationship_grants_need_a_subject() {
    let owner = caller(Role::Coordinator);
    assert_eq!(
        authorize(&owner, Operation::ViewTicket, None),
        Err(Denied::Forbidden)
    );
}

#[rstest]
fn wrong_status_is_reported_after_grant_check() {
    let owner = caller(Role::Coordinator);
    let technician = caller(Role::Technician);
    let ticket = closed_ticket(owner.id(), technician.id());

    assert_eq!(
        authorize(&caller(Role::Admin), Operation::AssignTechnician, Some(&ticket)),
        Err(Denied::WrongStatus {
            expected: TicketStatus::Open,
            actual: TicketStatus::Closed,
        })
    );
    assert_eq!(
        authorize(&caller(Role::Coordinator), Operation::AssignTechnician, Some(&ticket)),
        Err(Denied::Forbidden)
    );
}

#[rstest]
fn owner_can_edit_only_open_tickets() {
    let owner = caller(Role::Coordinator);
    let technician = caller(Role::Technician);
    let open = open_ticket(owner.id());
    let started = in_progress_ticket(owner.id(), technician.id());

    assert!(authorize(&owner, Operation::EditTicket, Some(&open)).is_ok());
    assert_eq!(
        authorize(&owner, Operation::EditTicket, Some(&started)),
        Err(Denied::WrongStatus {
            expected: TicketStatus::Open,
            actual: TicketStatus::InProgress,
        })
    );
    assert_eq!(
        authorize(&technician, Operation::EditTicket, Some(&started)),
        Err(Denied::Forbidden)
    );
}
