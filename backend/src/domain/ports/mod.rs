//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, `PasswordHasher`) describe what the domain
//! needs from storage and crypto adapters. Driving ports (`*Command`,
//! `*Query`, `LoginService`) are what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod login_service;
mod password_hasher;
mod ticket_command;
mod ticket_repository;
mod tickets_query;
mod user_account_command;
mod user_repository;
mod users_query;

pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHash, PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use ticket_command::MockTicketCommand;
pub use ticket_command::TicketCommand;
#[cfg(test)]
pub use ticket_repository::MockTicketRepository;
pub use ticket_repository::{TicketPersistenceError, TicketRepository};
#[cfg(test)]
pub use tickets_query::MockTicketsQuery;
pub use tickets_query::{TicketView, TicketsQuery};
#[cfg(test)]
pub use user_account_command::MockUserAccountCommand;
pub use user_account_command::{CreateUserRequest, ProfileUpdateRequest, UserAccountCommand};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{
    ProfileChanges, StoredCredentials, UserPersistenceError, UserRepository,
};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
