//! Role-based access policy.
//!
//! The policy is a static table: one [`PolicyRule`] per [`Operation`]. Role
//! rules live nowhere else; the lifecycle engine and the services consult
//! [`authorize`] and never compare roles themselves.

use super::{Role, Ticket, TicketStatus, UserId};

/// Authenticated identity making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    id: UserId,
    role: Role,
}

impl Caller {
    /// Build a caller from a decoded session.
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

/// Operations guarded by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateTicket,
    AssignTechnician,
    CloseTicket,
    EditTicket,
    ViewTicket,
    ListAllTickets,
    ListOwnTickets,
    CreateUserAccount,
    ListStaff,
}

/// Ways a caller can satisfy a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// Any caller holding the role.
    Role(Role),
    /// A coordinator who filed the subject ticket.
    OwningCoordinator,
    /// The technician assigned to the subject ticket.
    AssignedTechnician,
}

/// One row of the policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyRule {
    pub operation: Operation,
    pub grants: &'static [Grant],
    /// Status the subject ticket must be in, if any.
    pub required_status: Option<TicketStatus>,
}

/// The access policy.
pub const POLICY: &[PolicyRule] = &[
    PolicyRule {
        operation: Operation::CreateTicket,
        grants: &[Grant::Role(Role::Coordinator), Grant::Role(Role::Admin)],
        required_status: None,
    },
    PolicyRule {
        operation: Operation::AssignTechnician,
        grants: &[Grant::Role(Role::Admin)],
        required_status: Some(TicketStatus::Open),
    },
    PolicyRule {
        operation: Operation::CloseTicket,
        grants: &[
            Grant::Role(Role::Admin),
            Grant::OwningCoordinator,
            Grant::AssignedTechnician,
        ],
        required_status: Some(TicketStatus::InProgress),
    },
    PolicyRule {
        operation: Operation::EditTicket,
        grants: &[Grant::Role(Role::Admin), Grant::OwningCoordinator],
        required_status: Some(TicketStatus::Open),
    },
    PolicyRule {
        operation: Operation::ViewTicket,
        grants: &[
            Grant::Role(Role::Admin),
            Grant::OwningCoordinator,
            Grant::AssignedTechnician,
        ],
        required_status: None,
    },
    PolicyRule {
        operation: Operation::ListAllTickets,
        grants: &[Grant::Role(Role::Admin)],
        required_status: None,
    },
    PolicyRule {
        operation: Operation::ListOwnTickets,
        grants: &[Grant::Role(Role::Coordinator), Grant::Role(Role::Technician)],
        required_status: None,
    },
    PolicyRule {
        operation: Operation::CreateUserAccount,
        grants: &[Grant::Role(Role::Admin)],
        required_status: None,
    },
    PolicyRule {
        operation: Operation::ListStaff,
        grants: &[Grant::Role(Role::Admin)],
        required_status: None,
    },
];

/// Reason an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Denied {
    /// The caller holds no grant for the operation.
    #[error("caller may not perform this operation")]
    Forbidden,
    /// The caller is allowed but the ticket is in the wrong status.
    #[error("ticket must be {expected} but is {actual}")]
    WrongStatus {
        expected: TicketStatus,
        actual: TicketStatus,
    },
}

/// Look up the rule for an operation.
pub fn rule_for(operation: Operation) -> Option<&'static PolicyRule> {
    POLICY.iter().find(|rule| rule.operation == operation)
}

fn grant_matches(grant: Grant, caller: &Caller, subject: Option<&Ticket>) -> bool {
    match grant {
        Grant::Role(role) => caller.role == role,
        Grant::OwningCoordinator => {
            caller.role == Role::Coordinator
                && subject.is_some_and(|ticket| ticket.coordinator_id() == &caller.id)
        }
        Grant::AssignedTechnician => {
            caller.role == Role::Technician
                && subject.is_some_and(|ticket| ticket.technician_id() == Some(&caller.id))
        }
    }
}

/// Decide whether `caller` may perform `operation` on `subject`.
///
/// Grants are checked before the status precondition, so a caller without a
/// grant sees [`Denied::Forbidden`] even when the ticket status is also wrong.
/// Relationship grants only match when a subject is supplied.
///
/// # Examples
/// ```
/// use helpdesk::domain::{Caller, Denied, Operation, Role, UserId, authorize};
///
/// let technician = Caller::new(UserId::random(), Role::Technician);
/// assert_eq!(
///     authorize(&technician, Operation::CreateTicket, None),
///     Err(Denied::Forbidden)
/// );
/// ```
pub fn authorize(
    caller: &Caller,
    operation: Operation,
    subject: Option<&Ticket>,
) -> Result<(), Denied> {
    let rule = rule_for(operation).ok_or(Denied::Forbidden)?;
    if !rule
        .grants
        .iter()
        .any(|grant| grant_matches(*grant, caller, subject))
    {
        return Err(Denied::Forbidden);
    }
    match (rule.required_status, subject) {
        (Some(expected), Some(ticket)) if ticket.status() != expected => Err(Denied::WrongStatus {
            expected,
            actual: ticket.status(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests;
