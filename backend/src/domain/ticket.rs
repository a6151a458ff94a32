//! Ticket data model.
//!
//! A ticket is filed by a coordinator, assigned to a technician and finally
//! closed. Field newtypes validate input at construction so a malformed title
//! never reaches a store, and [`Ticket::restore`] checks the status invariants
//! whenever a ticket is built, including when rows are loaded from storage.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Department, UserId};

/// Validation failures for ticket fields and invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TicketValidationError {
    /// A text field fell outside its length bounds after trimming.
    #[error("{field} must be between {min} and {max} characters")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
    },
    /// The identifier was not a UUID.
    #[error("ticket id must be a valid UUID")]
    InvalidId,
    /// Unknown status wire name.
    #[error("status must be one of OPEN, IN_PROGRESS, CLOSED")]
    UnknownStatus,
    /// Unknown priority wire name.
    #[error("priority must be one of LOW, MEDIUM, HIGH")]
    UnknownPriority,
    /// Status-dependent fields disagree with the status.
    #[error("{status} ticket {reason}")]
    StatusInvariant {
        status: TicketStatus,
        reason: &'static str,
    },
    /// `updated_at` precedes `created_at`.
    #[error("updatedAt must not precede createdAt")]
    TimestampsOutOfOrder,
    /// An edit carried no fields.
    #[error("edit must change at least one field")]
    EmptyEdit,
    /// The assignee does not hold the technician role.
    #[error("assignee must be a technician")]
    NotATechnician,
}

/// Stable ticket identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Parse a ticket identifier from text.
    pub fn new(id: impl AsRef<str>) -> Result<Self, TicketValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| TicketValidationError::InvalidId)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! bounded_text {
    ($(#[$meta:meta])* $name:ident, $field:literal, $min:expr, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Minimum length after trimming.
            pub const MIN: usize = $min;
            /// Maximum length after trimming.
            pub const MAX: usize = $max;

            /// Trim and validate the input.
            pub fn new(value: impl AsRef<str>) -> Result<Self, TicketValidationError> {
                let trimmed = value.as_ref().trim();
                let length = trimmed.chars().count();
                if length < Self::MIN || length > Self::MAX {
                    return Err(TicketValidationError::Length {
                        field: $field,
                        min: Self::MIN,
                        max: Self::MAX,
                    });
                }
                Ok(Self(trimmed.to_owned()))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = TicketValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

bounded_text!(
    /// Short summary of the problem.
    TicketTitle, "title", 3, 50
);
bounded_text!(
    /// Longer problem description.
    TicketDescription, "description", 3, 500
);
bounded_text!(
    /// Where the affected device is (room, lab, floor).
    Location, "location", 1, 100
);
bounded_text!(
    /// Asset tag or other device reference.
    DeviceId, "deviceId", 1, 100
);
bounded_text!(
    /// Resolution notes recorded on close.
    Remarks, "remarks", 1, 500
);

/// Ticket urgency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Wire and storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl FromStr for Priority {
    type Err = TicketValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            _ => Err(TicketValidationError::UnknownPriority),
        }
    }
}

/// Lifecycle status. Transitions only move forward:
/// `OPEN -> IN_PROGRESS -> CLOSED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Open,
    InProgress,
    Closed,
}

impl TicketStatus {
    /// Wire and storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = TicketValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "CLOSED" => Ok(Self::Closed),
            _ => Err(TicketValidationError::UnknownStatus),
        }
    }
}

/// Validated input for filing a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub title: TicketTitle,
    pub description: TicketDescription,
    pub department: Department,
    pub location: Location,
    pub device_id: DeviceId,
    /// Defaults to [`Priority::Medium`] when absent.
    pub priority: Option<Priority>,
}

/// Every stored field of a ticket, prior to invariant checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
    pub id: TicketId,
    pub title: TicketTitle,
    pub description: TicketDescription,
    pub department: Department,
    pub location: Location,
    pub device_id: DeviceId,
    pub priority: Priority,
    pub status: TicketStatus,
    pub coordinator_id: UserId,
    pub technician_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub remarks: Option<Remarks>,
}

/// A helpdesk ticket whose status invariants hold.
///
/// ## Invariants
/// - `OPEN`: no technician, `assigned_at` and `resolved_at` unset.
/// - `IN_PROGRESS`: technician and `assigned_at` set, `resolved_at` unset.
/// - `CLOSED`: technician, `assigned_at` and `resolved_at` set.
/// - `updated_at >= created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket(TicketDraft);

impl Ticket {
    /// Build a ticket, rejecting field combinations that break the invariants.
    pub fn restore(draft: TicketDraft) -> Result<Self, TicketValidationError> {
        let status = draft.status;
        let violation = |reason| TicketValidationError::StatusInvariant { status, reason };
        let assigned = draft.technician_id.is_some();
        match draft.status {
            TicketStatus::Open => {
                if assigned {
                    return Err(violation("must not have a technician"));
                }
                if draft.assigned_at.is_some() {
                    return Err(violation("must not have an assignment time"));
                }
                if draft.resolved_at.is_some() {
                    return Err(violation("must not have a resolution time"));
                }
            }
            TicketStatus::InProgress => {
                if !assigned || draft.assigned_at.is_none() {
                    return Err(violation("must have a technician and assignment time"));
                }
                if draft.resolved_at.is_some() {
                    return Err(violation("must not have a resolution time"));
                }
            }
            TicketStatus::Closed => {
                if !assigned || draft.assigned_at.is_none() {
                    return Err(violation("must have a technician and assignment time"));
                }
                if draft.resolved_at.is_none() {
                    return Err(violation("must have a resolution time"));
                }
            }
        }
        if draft.updated_at < draft.created_at {
            return Err(TicketValidationError::TimestampsOutOfOrder);
        }
        Ok(Self(draft))
    }

    /// Release the underlying fields for a modification.
    pub fn into_draft(self) -> TicketDraft {
        self.0
    }

    pub fn id(&self) -> TicketId {
        self.0.id
    }

    pub fn title(&self) -> &TicketTitle {
        &self.0.title
    }

    pub fn description(&self) -> &TicketDescription {
        &self.0.description
    }

    pub fn department(&self) -> Department {
        self.0.department
    }

    pub fn location(&self) -> &Location {
        &self.0.location
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.0.device_id
    }

    pub fn priority(&self) -> Priority {
        self.0.priority
    }

    pub fn status(&self) -> TicketStatus {
        self.0.status
    }

    /// Coordinator who filed the ticket. Never changes.
    pub fn coordinator_id(&self) -> &UserId {
        &self.0.coordinator_id
    }

    /// Assigned technician, set once the ticket leaves `OPEN`.
    pub fn technician_id(&self) -> Option<&UserId> {
        self.0.technician_id.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.0.updated_at
    }

    pub fn assigned_at(&self) -> Option<DateTime<Utc>> {
        self.0.assigned_at
    }

    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.0.resolved_at
    }

    pub fn remarks(&self) -> Option<&Remarks> {
        self.0.remarks.as_ref()
    }
}
