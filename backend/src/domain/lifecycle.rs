//! Ticket lifecycle engine.
//!
//! Pure decision functions: each takes already-fetched state, the caller and
//! the current time, consults the access policy, and returns either the next
//! ticket plus the exact change to persist, or a [`LifecycleError`]. Nothing
//! here performs I/O.
//!
//! Checks run in a fixed order: grants first ([`LifecycleError::Forbidden`]),
//! then the status precondition ([`LifecycleError::InvalidTransition`]), then
//! input checks ([`LifecycleError::Validation`]).

use chrono::{DateTime, Utc};

use super::access::{Denied, Operation, authorize};
use super::{
    Caller, Department, DeviceId, Location, NewTicket, Priority, Remarks, Role, Ticket,
    TicketDescription, TicketDraft, TicketId, TicketStatus, TicketTitle, TicketValidationError,
    User, UserId,
};

/// Failure of a lifecycle decision.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("caller may not perform this operation")]
    Forbidden,
    #[error("ticket must be {expected} but is {actual}")]
    InvalidTransition {
        expected: TicketStatus,
        actual: TicketStatus,
    },
    #[error(transparent)]
    Validation(#[from] TicketValidationError),
}

impl From<Denied> for LifecycleError {
    fn from(value: Denied) -> Self {
        match value {
            Denied::Forbidden => Self::Forbidden,
            Denied::WrongStatus { expected, actual } => Self::InvalidTransition { expected, actual },
        }
    }
}

/// Fields a status transition writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketChange {
    Assigned {
        technician_id: UserId,
        assigned_at: DateTime<Utc>,
    },
    Closed {
        resolved_at: DateTime<Utc>,
        remarks: Option<Remarks>,
    },
}

/// Outcome of a status transition.
///
/// Stores apply `change` only while the stored status still equals
/// `expected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketTransition {
    pub ticket_id: TicketId,
    pub expected: TicketStatus,
    pub change: TicketChange,
    /// The ticket as it will read after the write.
    pub ticket: Ticket,
}

impl TicketChange {
    /// Status the change moves a ticket into.
    pub fn next_status(&self) -> TicketStatus {
        match self {
            Self::Assigned { .. } => TicketStatus::InProgress,
            Self::Closed { .. } => TicketStatus::Closed,
        }
    }

    /// Write the changed fields into `draft`.
    pub fn apply_to(&self, draft: &mut TicketDraft) {
        draft.status = self.next_status();
        match self {
            Self::Assigned {
                technician_id,
                assigned_at,
            } => {
                draft.technician_id = Some(technician_id.clone());
                draft.assigned_at = Some(*assigned_at);
            }
            Self::Closed {
                resolved_at,
                remarks,
            } => {
                draft.resolved_at = Some(*resolved_at);
                draft.remarks.clone_from(remarks);
            }
        }
    }
}

impl TicketTransition {
    /// Status written by the transition.
    pub fn next_status(&self) -> TicketStatus {
        self.ticket.status()
    }

    /// `updated_at` written by the transition.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.ticket.updated_at()
    }
}

/// Replacement values for an open ticket's details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketEdit {
    pub title: Option<TicketTitle>,
    pub description: Option<TicketDescription>,
    pub department: Option<Department>,
    pub location: Option<Location>,
    pub device_id: Option<DeviceId>,
    pub priority: Option<Priority>,
}

impl TicketEdit {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.department.is_none()
            && self.location.is_none()
            && self.device_id.is_none()
            && self.priority.is_none()
    }

    /// Overwrite the edited fields of `draft`.
    pub fn apply_to(&self, draft: &mut TicketDraft) {
        if let Some(value) = &self.title {
            draft.title = value.clone();
        }
        if let Some(value) = &self.description {
            draft.description = value.clone();
        }
        if let Some(value) = self.department {
            draft.department = value;
        }
        if let Some(value) = &self.location {
            draft.location = value.clone();
        }
        if let Some(value) = &self.device_id {
            draft.device_id = value.clone();
        }
        if let Some(value) = self.priority {
            draft.priority = value;
        }
    }
}

/// Outcome of a detail edit; applied only while the ticket is still `OPEN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRevision {
    pub ticket_id: TicketId,
    pub expected: TicketStatus,
    pub edit: TicketEdit,
    pub ticket: Ticket,
}

/// Which tickets a caller may list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    All,
    CoordinatedBy(UserId),
    AssignedTo(UserId),
}

/// Optional constraints supplied by the client. All are AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub technician_id: Option<UserId>,
    pub coordinator_id: Option<UserId>,
    pub department: Option<Department>,
}

/// Result ordering for ticket lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TicketOrder {
    /// `updated_at` descending, ties broken by id descending.
    RecentlyUpdated,
    #[default]
    Unspecified,
}

/// Complete list query handed to a ticket store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketQuery {
    pub filter: TicketFilter,
    pub visibility: Visibility,
    pub order: TicketOrder,
}

impl TicketQuery {
    /// Whether `ticket` satisfies both the filter and the visibility scope.
    ///
    /// Adapters that filter in memory use this; SQL adapters translate the
    /// same constraints into a `WHERE` clause.
    pub fn matches(&self, ticket: &Ticket) -> bool {
        let TicketFilter {
            status,
            technician_id,
            coordinator_id,
            department,
        } = &self.filter;
        let in_scope = match &self.visibility {
            Visibility::All => true,
            Visibility::CoordinatedBy(id) => ticket.coordinator_id() == id,
            Visibility::AssignedTo(id) => ticket.technician_id() == Some(id),
        };
        in_scope
            && status.is_none_or(|s| ticket.status() == s)
            && technician_id
                .as_ref()
                .is_none_or(|id| ticket.technician_id() == Some(id))
            && coordinator_id
                .as_ref()
                .is_none_or(|id| ticket.coordinator_id() == id)
            && department.is_none_or(|d| ticket.department() == d)
    }
}

/// Keep `updated_at` monotonic even if the clock steps backwards.
fn advance(ticket: &Ticket, now: DateTime<Utc>) -> DateTime<Utc> {
    now.max(ticket.updated_at())
}

fn transition(
    ticket: &Ticket,
    change: TicketChange,
    updated_at: DateTime<Utc>,
) -> Result<TicketTransition, LifecycleError> {
    let mut draft = ticket.clone().into_draft();
    change.apply_to(&mut draft);
    draft.updated_at = updated_at;
    Ok(TicketTransition {
        ticket_id: ticket.id(),
        expected: ticket.status(),
        change,
        ticket: Ticket::restore(draft)?,
    })
}

/// File a new ticket on behalf of `caller`.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use helpdesk::domain::{
///     Caller, Department, DeviceId, Location, NewTicket, Priority, Role, TicketDescription,
///     TicketId, TicketStatus, TicketTitle, UserId, lifecycle,
/// };
///
/// let coordinator = Caller::new(UserId::random(), Role::Coordinator);
/// let new = NewTicket {
///     title: TicketTitle::new("Printer jam").unwrap(),
///     description: TicketDescription::new("Jammed printer").unwrap(),
///     department: Department::Cse,
///     location: Location::new("F101").unwrap(),
///     device_id: DeviceId::new("PR-12").unwrap(),
///     priority: None,
/// };
/// let ticket = lifecycle::open_ticket(&coordinator, new, TicketId::random(), Utc::now()).unwrap();
/// assert_eq!(ticket.status(), TicketStatus::Open);
/// assert_eq!(ticket.priority(), Priority::Medium);
/// ```
pub fn open_ticket(
    caller: &Caller,
    new: NewTicket,
    id: TicketId,
    now: DateTime<Utc>,
) -> Result<Ticket, LifecycleError> {
    authorize(caller, Operation::CreateTicket, None)?;
    let NewTicket {
        title,
        description,
        department,
        location,
        device_id,
        priority,
    } = new;
    Ok(Ticket::restore(TicketDraft {
        id,
        title,
        description,
        department,
        location,
        device_id,
        priority: priority.unwrap_or_default(),
        status: TicketStatus::Open,
        coordinator_id: caller.id().clone(),
        technician_id: None,
        created_at: now,
        updated_at: now,
        assigned_at: None,
        resolved_at: None,
        remarks: None,
    })?)
}

/// Assign `technician` to an open ticket, moving it to `IN_PROGRESS`.
///
/// Not idempotent: once assigned, a second call fails with
/// [`LifecycleError::InvalidTransition`].
pub fn assign_technician(
    caller: &Caller,
    ticket: &Ticket,
    technician: &User,
    now: DateTime<Utc>,
) -> Result<TicketTransition, LifecycleError> {
    authorize(caller, Operation::AssignTechnician, Some(ticket))?;
    if technician.role() != Role::Technician {
        return Err(TicketValidationError::NotATechnician.into());
    }

    let updated_at = advance(ticket, now);
    let change = TicketChange::Assigned {
        technician_id: technician.id().clone(),
        assigned_at: updated_at,
    };
    transition(ticket, change, updated_at)
}

/// Close an in-progress ticket, optionally recording remarks.
pub fn close_ticket(
    caller: &Caller,
    ticket: &Ticket,
    remarks: Option<Remarks>,
    now: DateTime<Utc>,
) -> Result<TicketTransition, LifecycleError> {
    authorize(caller, Operation::CloseTicket, Some(ticket))?;

    let updated_at = advance(ticket, now);
    let change = TicketChange::Closed {
        resolved_at: updated_at,
        remarks,
    };
    transition(ticket, change, updated_at)
}

/// Replace details of an open ticket.
pub fn edit_ticket(
    caller: &Caller,
    ticket: &Ticket,
    edit: TicketEdit,
    now: DateTime<Utc>,
) -> Result<TicketRevision, LifecycleError> {
    authorize(caller, Operation::EditTicket, Some(ticket))?;
    if edit.is_empty() {
        return Err(TicketValidationError::EmptyEdit.into());
    }

    let mut draft = ticket.clone().into_draft();
    edit.apply_to(&mut draft);
    draft.updated_at = advance(ticket, now);
    let next = Ticket::restore(draft)?;

    Ok(TicketRevision {
        ticket_id: ticket.id(),
        expected: ticket.status(),
        edit,
        ticket: next,
    })
}

/// Confirm `caller` may read `ticket`.
pub fn ensure_visible(caller: &Caller, ticket: &Ticket) -> Result<(), LifecycleError> {
    Ok(authorize(caller, Operation::ViewTicket, Some(ticket))?)
}

/// Listing scope for `caller`, derived from the list rows of the policy.
pub fn visibility(caller: &Caller) -> Result<Visibility, LifecycleError> {
    if authorize(caller, Operation::ListAllTickets, None).is_ok() {
        return Ok(Visibility::All);
    }
    authorize(caller, Operation::ListOwnTickets, None)?;
    match caller.role() {
        Role::Coordinator => Ok(Visibility::CoordinatedBy(caller.id().clone())),
        Role::Technician => Ok(Visibility::AssignedTo(caller.id().clone())),
        Role::Admin => Ok(Visibility::All),
    }
}
