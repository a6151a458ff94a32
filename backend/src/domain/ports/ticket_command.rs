//! Driving port for ticket mutations.

use async_trait::async_trait;

use crate::domain::lifecycle::TicketEdit;
use crate::domain::{Caller, Error, NewTicket, Remarks, TicketId, UserId};

use super::TicketView;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketCommand: Send + Sync {
    /// File a new ticket.
    async fn create_ticket(&self, caller: &Caller, ticket: NewTicket)
    -> Result<TicketView, Error>;

    /// Assign a technician to an open ticket.
    async fn assign_technician(
        &self,
        caller: &Caller,
        ticket_id: TicketId,
        technician_id: UserId,
    ) -> Result<TicketView, Error>;

    /// Close an in-progress ticket.
    async fn close_ticket(
        &self,
        caller: &Caller,
        ticket_id: TicketId,
        remarks: Option<Remarks>,
    ) -> Result<TicketView, Error>;

    /// Replace details of an open ticket.
    async fn edit_ticket(
        &self,
        caller: &Caller,
        ticket_id: TicketId,
        edit: TicketEdit,
    ) -> Result<TicketView, Error>;
}
