//! Port abstraction for ticket persistence adapters and their errors.
//!
//! Status-changing writes are conditional: an adapter applies a transition or
//! revision only while the stored status still equals the `expected` status
//! the decision was made against, and reports `StaleStatus` otherwise.
use async_trait::async_trait;

use crate::domain::lifecycle::{TicketQuery, TicketRevision, TicketTransition};
use crate::domain::{Ticket, TicketId, TicketStatus};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by ticket repository adapters.
    pub enum TicketPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "ticket repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "ticket repository query failed: {message}",
        /// No ticket with the id exists.
        NotFound { ticket_id: TicketId } => "ticket {ticket_id} not found",
        /// The stored status moved on since the ticket was read.
        StaleStatus { ticket_id: TicketId, expected: TicketStatus, actual: TicketStatus } =>
            "ticket {ticket_id} is {actual}, expected {expected}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Store a freshly opened ticket.
    async fn insert(&self, ticket: &Ticket) -> Result<(), TicketPersistenceError>;

    /// Fetch a ticket by identifier.
    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, TicketPersistenceError>;

    /// Tickets matching the filter and visibility scope, in the requested order.
    async fn list(&self, query: &TicketQuery) -> Result<Vec<Ticket>, TicketPersistenceError>;

    /// Write a status transition and return the stored ticket.
    async fn apply_transition(
        &self,
        transition: &TicketTransition,
    ) -> Result<Ticket, TicketPersistenceError>;

    /// Write a detail edit and return the stored ticket.
    async fn apply_revision(
        &self,
        revision: &TicketRevision,
    ) -> Result<Ticket, TicketPersistenceError>;
}
