//! In-process store adapters.
//!
//! Used when no database URL is configured and by HTTP and scenario tests.
//! Each store keeps its rows behind one mutex, so a conditional write checks
//! and updates under the same guard.

mod ticket_repository;
mod user_repository;

pub use ticket_repository::InMemoryTicketRepository;
pub use user_repository::InMemoryUserRepository;
