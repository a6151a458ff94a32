//! PostgreSQL-backed `TicketRepository` implementation using Diesel ORM.
//!
//! Transitions and edits are single conditional statements:
//! `UPDATE tickets SET … WHERE id = $1 AND status = $2 RETURNING *`. When no
//! row comes back, a follow-up read tells a missing ticket apart from one
//! whose status moved on.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::lifecycle::{
    TicketChange, TicketOrder, TicketQuery, TicketRevision, TicketTransition, Visibility,
};
use crate::domain::ports::{TicketPersistenceError, TicketRepository};
use crate::domain::{
    Department, DeviceId, Location, Priority, Remarks, Ticket, TicketDescription, TicketDraft,
    TicketId, TicketStatus, TicketTitle, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewTicketRow, TicketDetailsUpdate, TicketRow};
use super::pool::{DbPool, PoolError};
use super::schema::tickets;

/// Diesel-backed implementation of the ticket repository port.
#[derive(Clone)]
pub struct DieselTicketRepository {
    pool: DbPool,
}

impl DieselTicketRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TicketPersistenceError {
    map_basic_pool_error(error, TicketPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> TicketPersistenceError {
    map_basic_diesel_error(
        error,
        TicketPersistenceError::query,
        TicketPersistenceError::connection,
    )
}

fn invalid_row(id: Uuid, err: impl std::fmt::Display) -> TicketPersistenceError {
    TicketPersistenceError::query(format!("invalid ticket row {id}: {err}"))
}

/// Convert a database row into a ticket, enforcing the status invariants.
fn row_to_ticket(row: TicketRow) -> Result<Ticket, TicketPersistenceError> {
    let TicketRow {
        id,
        title,
        description,
        department,
        location,
        device_id,
        priority,
        status,
        coordinator_id,
        technician_id,
        created_at,
        updated_at,
        assigned_at,
        resolved_at,
        remarks,
    } = row;
    let bad = |err: &dyn std::fmt::Display| invalid_row(id, err);

    Ticket::restore(TicketDraft {
        id: TicketId::from_uuid(id),
        title: TicketTitle::new(title).map_err(|err| bad(&err))?,
        description: TicketDescription::new(description).map_err(|err| bad(&err))?,
        department: department
            .parse::<Department>()
            .map_err(|err| bad(&err))?,
        location: Location::new(location).map_err(|err| bad(&err))?,
        device_id: DeviceId::new(device_id).map_err(|err| bad(&err))?,
        priority: priority.parse::<Priority>().map_err(|err| bad(&err))?,
        status: status.parse::<TicketStatus>().map_err(|err| bad(&err))?,
        coordinator_id: UserId::from_uuid(coordinator_id),
        technician_id: technician_id.map(UserId::from_uuid),
        created_at,
        updated_at,
        assigned_at,
        resolved_at,
        remarks: remarks
            .map(Remarks::new)
            .transpose()
            .map_err(|err| bad(&err))?,
    })
    .map_err(|err| bad(&err))
}

/// Explain why a conditional write matched no row.
async fn missed_write(
    conn: &mut AsyncPgConnection,
    id: TicketId,
    expected: TicketStatus,
) -> TicketPersistenceError {
    let current = tickets::table
        .filter(tickets::id.eq(id.as_uuid()))
        .select(tickets::status)
        .first::<String>(conn)
        .await
        .optional();
    match current {
        Ok(None) => TicketPersistenceError::not_found(id),
        Ok(Some(status)) => match status.parse::<TicketStatus>() {
            Ok(actual) => TicketPersistenceError::stale_status(id, expected, actual),
            Err(err) => invalid_row(*id.as_uuid(), err),
        },
        Err(err) => map_diesel_error(err),
    }
}

#[async_trait]
impl TicketRepository for DieselTicketRepository {
    async fn insert(&self, ticket: &Ticket) -> Result<(), TicketPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewTicketRow {
            id: *ticket.id().as_uuid(),
            title: ticket.title().as_ref(),
            description: ticket.description().as_ref(),
            department: ticket.department().code(),
            location: ticket.location().as_ref(),
            device_id: ticket.device_id().as_ref(),
            priority: ticket.priority().as_str(),
            status: ticket.status().as_str(),
            coordinator_id: *ticket.coordinator_id().as_uuid(),
            created_at: ticket.created_at(),
            updated_at: ticket.updated_at(),
        };

        diesel::insert_into(tickets::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, TicketPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = tickets::table
            .filter(tickets::id.eq(id.as_uuid()))
            .select(TicketRow::as_select())
            .first::<TicketRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_ticket).transpose()
    }

    async fn list(&self, query: &TicketQuery) -> Result<Vec<Ticket>, TicketPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut statement = tickets::table
            .select(TicketRow::as_select())
            .into_boxed();

        statement = match &query.visibility {
            Visibility::All => statement,
            Visibility::CoordinatedBy(id) => {
                statement.filter(tickets::coordinator_id.eq(*id.as_uuid()))
            }
            Visibility::AssignedTo(id) => {
                statement.filter(tickets::technician_id.eq(*id.as_uuid()))
            }
        };
        let filter = &query.filter;
        if let Some(status) = filter.status {
            statement = statement.filter(tickets::status.eq(status.as_str()));
        }
        if let Some(id) = &filter.technician_id {
            statement = statement.filter(tickets::technician_id.eq(*id.as_uuid()));
        }
        if let Some(id) = &filter.coordinator_id {
            statement = statement.filter(tickets::coordinator_id.eq(*id.as_uuid()));
        }
        if let Some(department) = filter.department {
            statement = statement.filter(tickets::department.eq(department.code()));
        }
        statement = match query.order {
            TicketOrder::RecentlyUpdated => {
                statement.order((tickets::updated_at.desc(), tickets::id.desc()))
            }
            TicketOrder::Unspecified => statement.order(tickets::created_at.asc()),
        };

        let rows: Vec<TicketRow> = statement
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_ticket).collect()
    }

    async fn apply_transition(
        &self,
        transition: &TicketTransition,
    ) -> Result<Ticket, TicketPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = transition.ticket_id;
        let target = tickets::table.filter(
            tickets::id
                .eq(*id.as_uuid())
                .and(tickets::status.eq(transition.expected.as_str())),
        );
        let status = transition.change.next_status().as_str();
        let updated_at = transition.updated_at();

        let row = match &transition.change {
            TicketChange::Assigned {
                technician_id,
                assigned_at,
            } => {
                diesel::update(target)
                    .set((
                        tickets::status.eq(status),
                        tickets::technician_id.eq(Some(*technician_id.as_uuid())),
                        tickets::assigned_at.eq(Some(*assigned_at)),
                        tickets::updated_at.eq(updated_at),
                    ))
                    .returning(TicketRow::as_returning())
                    .get_result::<TicketRow>(&mut conn)
                    .await
            }
            TicketChange::Closed {
                resolved_at,
                remarks,
            } => {
                diesel::update(target)
                    .set((
                        tickets::status.eq(status),
                        tickets::resolved_at.eq(Some(*resolved_at)),
                        tickets::remarks.eq(remarks.clone().map(String::from)),
                        tickets::updated_at.eq(updated_at),
                    ))
                    .returning(TicketRow::as_returning())
                    .get_result::<TicketRow>(&mut conn)
                    .await
            }
        }
        .optional()
        .map_err(map_diesel_error)?;

        match row {
            Some(row) => row_to_ticket(row),
            None => Err(missed_write(&mut conn, id, transition.expected).await),
        }
    }

    async fn apply_revision(
        &self,
        revision: &TicketRevision,
    ) -> Result<Ticket, TicketPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = revision.ticket_id;
        let edit = &revision.edit;
        let update = TicketDetailsUpdate {
            title: edit.title.as_ref().map(AsRef::as_ref),
            description: edit.description.as_ref().map(AsRef::as_ref),
            department: edit.department.map(Department::code),
            location: edit.location.as_ref().map(AsRef::as_ref),
            device_id: edit.device_id.as_ref().map(AsRef::as_ref),
            priority: edit.priority.map(Priority::as_str),
            updated_at: revision.ticket.updated_at(),
        };

        let row = diesel::update(
            tickets::table.filter(
                tickets::id
                    .eq(*id.as_uuid())
                    .and(tickets::status.eq(revision.expected.as_str())),
            ),
        )
        .set(&update)
        .returning(TicketRow::as_returning())
        .get_result::<TicketRow>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        match row {
            Some(row) => row_to_ticket(row),
            None => Err(missed_write(&mut conn, id, revision.expected).await),
        }
    }
}
