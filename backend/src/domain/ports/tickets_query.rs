//! Driving port for ticket reads.

use async_trait::async_trait;

use crate::domain::lifecycle::{TicketFilter, TicketOrder};
use crate::domain::{Caller, Error, Ticket, TicketId, UserSummary};

/// A ticket with its coordinator and technician resolved to summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketView {
    pub ticket: Ticket,
    pub coordinator: Option<UserSummary>,
    pub technician: Option<UserSummary>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketsQuery: Send + Sync {
    /// A single ticket visible to the caller.
    async fn get_ticket(&self, caller: &Caller, ticket_id: TicketId)
    -> Result<TicketView, Error>;

    /// Tickets within the caller's scope matching `filter`.
    async fn list_tickets(
        &self,
        caller: &Caller,
        filter: TicketFilter,
        order: TicketOrder,
    ) -> Result<Vec<TicketView>, Error>;
}
