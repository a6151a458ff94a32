//! Mutex-guarded `TicketRepository`.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::lifecycle::{TicketOrder, TicketQuery, TicketRevision, TicketTransition};
use crate::domain::ports::{TicketPersistenceError, TicketRepository};
use crate::domain::{Ticket, TicketDraft, TicketId, TicketStatus};

/// In-memory ticket store preserving insertion order.
#[derive(Debug, Default)]
pub struct InMemoryTicketRepository {
    tickets: Mutex<Vec<Ticket>>,
}

impl InMemoryTicketRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn tickets(&self) -> Result<MutexGuard<'_, Vec<Ticket>>, TicketPersistenceError> {
        self.tickets
            .lock()
            .map_err(|_| TicketPersistenceError::query("ticket store lock poisoned"))
    }
}

/// Locate a ticket whose stored status still equals `expected`.
fn slot_for<'a>(
    tickets: &'a mut [Ticket],
    id: TicketId,
    expected: TicketStatus,
) -> Result<&'a mut Ticket, TicketPersistenceError> {
    let slot = tickets
        .iter_mut()
        .find(|ticket| ticket.id() == id)
        .ok_or_else(|| TicketPersistenceError::not_found(id))?;
    if slot.status() != expected {
        return Err(TicketPersistenceError::stale_status(
            id,
            expected,
            slot.status(),
        ));
    }
    Ok(slot)
}

fn rebuild(draft: TicketDraft) -> Result<Ticket, TicketPersistenceError> {
    Ticket::restore(draft).map_err(|err| TicketPersistenceError::query(err.to_string()))
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    async fn insert(&self, ticket: &Ticket) -> Result<(), TicketPersistenceError> {
        let mut tickets = self.tickets()?;
        if tickets.iter().any(|stored| stored.id() == ticket.id()) {
            return Err(TicketPersistenceError::query(format!(
                "ticket {} already exists",
                ticket.id()
            )));
        }
        tickets.push(ticket.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, TicketPersistenceError> {
        Ok(self
            .tickets()?
            .iter()
            .find(|ticket| ticket.id() == *id)
            .cloned())
    }

    async fn list(&self, query: &TicketQuery) -> Result<Vec<Ticket>, TicketPersistenceError> {
        let mut matching: Vec<Ticket> = self
            .tickets()?
            .iter()
            .filter(|ticket| query.matches(ticket))
            .cloned()
            .collect();
        if query.order == TicketOrder::RecentlyUpdated {
            matching.sort_by(|a, b| {
                b.updated_at()
                    .cmp(&a.updated_at())
                    .then_with(|| b.id().cmp(&a.id()))
            });
        }
        Ok(matching)
    }

    async fn apply_transition(
        &self,
        transition: &TicketTransition,
    ) -> Result<Ticket, TicketPersistenceError> {
        let mut tickets = self.tickets()?;
        let slot = slot_for(&mut tickets, transition.ticket_id, transition.expected)?;
        let mut draft = slot.clone().into_draft();
        transition.change.apply_to(&mut draft);
        draft.updated_at = transition.updated_at();
        *slot = rebuild(draft)?;
        Ok(slot.clone())
    }

    async fn apply_revision(
        &self,
        revision: &TicketRevision,
    ) -> Result<Ticket, TicketPersistenceError> {
        let mut tickets = self.tickets()?;
        let slot = slot_for(&mut tickets, revision.ticket_id, revision.expected)?;
        let mut draft = slot.clone().into_draft();
        revision.edit.apply_to(&mut draft);
        draft.updated_at = revision.ticket.updated_at();
        *slot = rebuild(draft)?;
        Ok(slot.clone())
    }
}
