//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities used by the API and persistence
//! layers, the ticket lifecycle engine and its access policy, and the
//! services that implement the driving ports. Nothing in this module performs
//! I/O directly; stores and hashers are reached through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - User, Ticket, Department: validated aggregates and value types.
//! - access / lifecycle: policy table and pure transition functions.
//! - TicketService / UserAccountService: driving port implementations.

pub mod access;
pub mod auth;
pub mod department;
pub mod error;
pub mod lifecycle;
pub mod ports;
pub mod ticket;
pub mod ticket_service;
pub mod trace_id;
pub mod user;
pub mod user_service;

#[cfg(test)]
mod test_fixtures;

pub use self::access::{Caller, Denied, Operation, POLICY, PolicyRule, authorize};
pub use self::auth::{
    LoginCredentials, LoginValidationError, NewPassword, PASSWORD_MAX, PASSWORD_MIN,
    PasswordPolicyError,
};
pub use self::department::{Department, UnknownDepartment};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::lifecycle::{LifecycleError, TicketEdit, TicketFilter, TicketOrder, Visibility};
pub use self::ticket::{
    DeviceId, Location, NewTicket, Priority, Remarks, Ticket, TicketDescription, TicketDraft,
    TicketId, TicketStatus, TicketTitle, TicketValidationError,
};
pub use self::ticket_service::TicketService;
pub use self::trace_id::TraceId;
pub use self::user::{
    DisplayName, EmailAddress, ProfileImage, Role, User, UserDraft, UserId, UserSummary,
    UserValidationError,
};
pub use self::user_service::UserAccountService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use helpdesk::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
