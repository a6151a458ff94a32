//! Shared builders for domain unit tests.

use chrono::{DateTime, TimeZone, Utc};

use super::{
    Caller, Department, DeviceId, DisplayName, EmailAddress, Location, NewTicket, Priority, Role,
    Ticket, TicketDescription, TicketDraft, TicketId, TicketStatus, TicketTitle, User, UserDraft,
    UserId,
};

pub(crate) fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn caller(role: Role) -> Caller {
    Caller::new(UserId::random(), role)
}

pub(crate) fn user_with(id: &UserId, role: Role) -> User {
    let department = match role {
        Role::Coordinator => Some(Department::Cse),
        Role::Technician | Role::Admin => None,
    };
    User::try_new(UserDraft {
        id: id.clone(),
        email: EmailAddress::new(format!("{}@example.edu", id.as_uuid().simple()))
            .expect("fixture email"),
        name: DisplayName::new(format!("{role} user")).expect("fixture name"),
        role,
        department,
        image: None,
        created_at: at(8),
        updated_at: at(8),
    })
    .expect("fixture user")
}

pub(crate) fn new_ticket() -> NewTicket {
    NewTicket {
        title: TicketTitle::new("Projector broken").expect("title"),
        description: TicketDescription::new("Lamp does not turn on").expect("description"),
        department: Department::Cse,
        location: Location::new("Lab 3").expect("location"),
        device_id: DeviceId::new("PRJ-0042").expect("device id"),
        priority: None,
    }
}

pub(crate) fn open_ticket(coordinator: &UserId) -> Ticket {
    Ticket::restore(TicketDraft {
        id: TicketId::random(),
        title: TicketTitle::new("Projector broken").expect("title"),
        description: TicketDescription::new("Lamp does not turn on").expect("description"),
        department: Department::Cse,
        location: Location::new("Lab 3").expect("location"),
        device_id: DeviceId::new("PRJ-0042").expect("device id"),
        priority: Priority::Medium,
        status: TicketStatus::Open,
        coordinator_id: coordinator.clone(),
        technician_id: None,
        created_at: at(9),
        updated_at: at(9),
        assigned_at: None,
        resolved_at: None,
        remarks: None,
    })
    .expect("fixture open ticket")
}

pub(crate) fn in_progress_ticket(coordinator: &UserId, technician: &UserId) -> Ticket {
    let mut draft = open_ticket(coordinator).into_draft();
    draft.status = TicketStatus::InProgress;
    draft.technician_id = Some(technician.clone());
    draft.assigned_at = Some(at(10));
    draft.updated_at = at(10);
    Ticket::restore(draft).expect("fixture in-progress ticket")
}

pub(crate) fn closed_ticket(coordinator: &UserId, technician: &UserId) -> Ticket {
    let mut draft = in_progress_ticket(coordinator, technician).into_draft();
    draft.status = TicketStatus::Closed;
    draft.resolved_at = Some(at(11));
    draft.updated_at = at(11);
    Ticket::restore(draft).expect("fixture closed ticket")
}
