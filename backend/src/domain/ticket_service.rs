//! Ticket domain services.
//!
//! [`TicketService`] implements the ticket driving ports. Each operation
//! fetches state through the store ports, hands it to the lifecycle engine,
//! and persists whatever the engine decided.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::access::{Operation, authorize};
use crate::domain::lifecycle::{
    self, LifecycleError, TicketEdit, TicketFilter, TicketOrder, TicketQuery, TicketTransition,
};
use crate::domain::ports::{
    TicketCommand, TicketPersistenceError, TicketRepository, TicketView, TicketsQuery,
    UserRepository,
};
use crate::domain::user_service::map_user_persistence_error;
use crate::domain::{
    Caller, Error, NewTicket, Remarks, Ticket, TicketId, TicketStatus, UserId, UserSummary,
};

pub(crate) fn map_ticket_persistence_error(error: TicketPersistenceError) -> Error {
    match error {
        TicketPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("ticket repository unavailable: {message}"))
        }
        TicketPersistenceError::Query { message } => {
            Error::internal(format!("ticket repository error: {message}"))
        }
        TicketPersistenceError::NotFound { ticket_id } => {
            Error::not_found(format!("ticket {ticket_id} not found"))
        }
        TicketPersistenceError::StaleStatus {
            ticket_id,
            expected,
            actual,
        } => {
            debug!(%ticket_id, %expected, %actual, "conditional ticket write lost a race");
            transition_error(expected, actual)
        }
    }
}

fn transition_error(expected: TicketStatus, actual: TicketStatus) -> Error {
    Error::invalid_transition(format!("ticket must be {expected} but is {actual}")).with_details(
        json!({
            "expected": expected.as_str(),
            "actual": actual.as_str(),
        }),
    )
}

pub(crate) fn map_lifecycle_error(error: LifecycleError) -> Error {
    match error {
        LifecycleError::Forbidden => Error::forbidden("caller may not perform this operation"),
        LifecycleError::InvalidTransition { expected, actual } => {
            transition_error(expected, actual)
        }
        LifecycleError::Validation(err) => Error::invalid_request(err.to_string()),
    }
}

/// Ticket service implementing [`TicketCommand`] and [`TicketsQuery`].
#[derive(Clone)]
pub struct TicketService<T, U> {
    tickets: Arc<T>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<T, U> TicketService<T, U> {
    /// Create a service over the ticket and user stores.
    pub fn new(tickets: Arc<T>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            tickets,
            users,
            clock,
        }
    }
}

impl<T, U> TicketService<T, U>
where
    T: TicketRepository,
    U: UserRepository,
{
    async fn load(&self, ticket_id: TicketId) -> Result<Ticket, Error> {
        self.tickets
            .find_by_id(&ticket_id)
            .await
            .map_err(map_ticket_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("ticket {ticket_id} not found")))
    }

    async fn apply(&self, caller: &Caller, transition: TicketTransition) -> Result<Ticket, Error> {
        let stored = self
            .tickets
            .apply_transition(&transition)
            .await
            .map_err(map_ticket_persistence_error)?;
        info!(
            ticket_id = %transition.ticket_id,
            caller_id = %caller.id(),
            from = %transition.expected,
            to = %stored.status(),
            "ticket transition applied"
        );
        Ok(stored)
    }

    async fn view(&self, ticket: Ticket) -> Result<TicketView, Error> {
        let mut views = self.views(vec![ticket]).await?;
        views
            .pop()
            .ok_or_else(|| Error::internal("ticket view could not be assembled"))
    }

    /// Resolve coordinator and technician summaries with one store call.
    async fn views(&self, tickets: Vec<Ticket>) -> Result<Vec<TicketView>, Error> {
        if tickets.is_empty() {
            return Ok(Vec::new());
        }
        let mut ids: Vec<UserId> = Vec::new();
        for ticket in &tickets {
            let related = std::iter::once(ticket.coordinator_id()).chain(ticket.technician_id());
            for id in related {
                if !ids.contains(id) {
                    ids.push(id.clone());
                }
            }
        }
        let summaries: HashMap<UserId, UserSummary> = self
            .users
            .find_summaries(&ids)
            .await
            .map_err(map_user_persistence_error)?
            .into_iter()
            .map(|summary| (summary.id.clone(), summary))
            .collect();

        Ok(tickets
            .into_iter()
            .map(|ticket| TicketView {
                coordinator: summaries.get(ticket.coordinator_id()).cloned(),
                technician: ticket
                    .technician_id()
                    .and_then(|id| summaries.get(id))
                    .cloned(),
                ticket,
            })
            .collect())
    }
}

#[async_trait]
impl<T, U> TicketCommand for TicketService<T, U>
where
    T: TicketRepository,
    U: UserRepository,
{
    async fn create_ticket(&self, caller: &Caller, ticket: NewTicket) -> Result<TicketView, Error> {
        let ticket = lifecycle::open_ticket(caller, ticket, TicketId::random(), self.clock.utc())
            .map_err(map_lifecycle_error)?;
        self.tickets
            .insert(&ticket)
            .await
            .map_err(map_ticket_persistence_error)?;
        info!(
            ticket_id = %ticket.id(),
            caller_id = %caller.id(),
            department = %ticket.department(),
            "ticket opened"
        );
        self.view(ticket).await
    }

    async fn assign_technician(
        &self,
        caller: &Caller,
        ticket_id: TicketId,
        technician_id: UserId,
    ) -> Result<TicketView, Error> {
        let ticket = self.load(ticket_id).await?;
        // Refuse before revealing whether the technician exists.
        authorize(caller, Operation::AssignTechnician, Some(&ticket))
            .map_err(|denied| map_lifecycle_error(denied.into()))?;
        let technician = self
            .users
            .find_by_id(&technician_id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("user {technician_id} not found")))?;

        let transition =
            lifecycle::assign_technician(caller, &ticket, &technician, self.clock.utc())
                .map_err(map_lifecycle_error)?;
        let stored = self.apply(caller, transition).await?;
        self.view(stored).await
    }

    async fn close_ticket(
        &self,
        caller: &Caller,
        ticket_id: TicketId,
        remarks: Option<Remarks>,
    ) -> Result<TicketView, Error> {
        let ticket = self.load(ticket_id).await?;
        let transition = lifecycle::close_ticket(caller, &ticket, remarks, self.clock.utc())
            .map_err(map_lifecycle_error)?;
        let stored = self.apply(caller, transition).await?;
        self.view(stored).await
    }

    async fn edit_ticket(
        &self,
        caller: &Caller,
        ticket_id: TicketId,
        edit: TicketEdit,
    ) -> Result<TicketView, Error> {
        let ticket = self.load(ticket_id).await?;
        let revision = lifecycle::edit_ticket(caller, &ticket, edit, self.clock.utc())
            .map_err(map_lifecycle_error)?;
        let stored = self
            .tickets
            .apply_revision(&revision)
            .await
            .map_err(map_ticket_persistence_error)?;
        info!(ticket_id = %ticket_id, caller_id = %caller.id(), "ticket details edited");
        self.view(stored).await
    }
}

#[async_trait]
impl<T, U> TicketsQuery for TicketService<T, U>
where
    T: TicketRepository,
    U: UserRepository,
{
    async fn get_ticket(&self, caller: &Caller, ticket_id: TicketId) -> Result<TicketView, Error> {
        let ticket = self.load(ticket_id).await?;
        lifecycle::ensure_visible(caller, &ticket).map_err(map_lifecycle_error)?;
        self.view(ticket).await
    }

    async fn list_tickets(
        &self,
        caller: &Caller,
        filter: TicketFilter,
        order: TicketOrder,
    ) -> Result<Vec<TicketView>, Error> {
        let visibility = lifecycle::visibility(caller).map_err(map_lifecycle_error)?;
        let query = TicketQuery {
            filter,
            visibility,
            order,
        };
        let tickets = self
            .tickets
            .list(&query)
            .await
            .map_err(map_ticket_persistence_error)?;
        self.views(tickets).await
    }
}

#[cfg(test)]
#[path = "ticket_service_tests.rs"]
mod tests;
