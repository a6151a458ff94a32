//! Ticket HTTP handlers.
//!
//! ```text
//! POST /api/v1/tickets
//! GET  /api/v1/tickets?status=OPEN&department=CSE&view=recent
//! GET  /api/v1/tickets/{id}
//! PUT  /api/v1/tickets/{id}
//! PUT  /api/v1/tickets/{id}/technician/{technicianId}
//! PUT  /api/v1/tickets/{id}/close
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::TicketView;
use crate::domain::{
    Department, DeviceId, Error, Location, NewTicket, Operation, Priority, Remarks,
    TicketDescription, TicketEdit, TicketFilter, TicketOrder, TicketStatus, TicketTitle,
    authorize,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, PrioritySchema, TicketStatusSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::UserSummaryResponse;
use crate::inbound::http::validation::{
    FieldName, field, invalid_field, parse_code, parse_ticket_id, parse_user_id, require,
};

const TITLE: FieldName = FieldName::new("title");
const DESCRIPTION: FieldName = FieldName::new("description");
const DEPARTMENT: FieldName = FieldName::new("department");
const LOCATION: FieldName = FieldName::new("location");
const DEVICE_ID: FieldName = FieldName::new("deviceId");
const PRIORITY: FieldName = FieldName::new("priority");
const STATUS: FieldName = FieldName::new("status");
const REMARKS: FieldName = FieldName::new("remarks");
const TICKET_ID: FieldName = FieldName::new("id");
const TECHNICIAN_ID: FieldName = FieldName::new("technicianId");
const COORDINATOR_ID: FieldName = FieldName::new("coordinatorId");
const VIEW: FieldName = FieldName::new("view");

/// Ticket with its coordinator and technician summaries.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: String,
    #[schema(example = "Projector broken")]
    pub title: String,
    pub description: String,
    #[schema(example = "CSE")]
    pub department: String,
    pub department_label: String,
    pub location: String,
    pub device_id: String,
    #[schema(value_type = PrioritySchema)]
    pub priority: String,
    #[schema(value_type = TicketStatusSchema)]
    pub status: String,
    pub coordinator_id: String,
    pub technician_id: Option<String>,
    pub coordinator: Option<UserSummaryResponse>,
    pub technician: Option<UserSummaryResponse>,
    pub created_at: String,
    pub updated_at: String,
    pub assigned_at: Option<String>,
    pub resolved_at: Option<String>,
    pub remarks: Option<String>,
}

impl From<TicketView> for TicketResponse {
    fn from(view: TicketView) -> Self {
        let TicketView {
            ticket,
            coordinator,
            technician,
        } = view;
        Self {
            id: ticket.id().to_string(),
            title: ticket.title().as_ref().to_owned(),
            description: ticket.description().as_ref().to_owned(),
            department: ticket.department().code().to_owned(),
            department_label: ticket.department().label().to_owned(),
            location: ticket.location().as_ref().to_owned(),
            device_id: ticket.device_id().as_ref().to_owned(),
            priority: ticket.priority().as_str().to_owned(),
            status: ticket.status().as_str().to_owned(),
            coordinator_id: ticket.coordinator_id().to_string(),
            technician_id: ticket.technician_id().map(ToString::to_string),
            coordinator: coordinator.map(UserSummaryResponse::from),
            technician: technician.map(UserSummaryResponse::from),
            created_at: ticket.created_at().to_rfc3339(),
            updated_at: ticket.updated_at().to_rfc3339(),
            assigned_at: ticket.assigned_at().map(|at| at.to_rfc3339()),
            resolved_at: ticket.resolved_at().map(|at| at.to_rfc3339()),
            remarks: ticket.remarks().map(|r| r.as_ref().to_owned()),
        }
    }
}

/// Request body for `POST /api/v1/tickets`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub device_id: Option<String>,
    /// Defaults to `MEDIUM`.
    #[schema(value_type = Option<PrioritySchema>)]
    pub priority: Option<String>,
}

impl TryFrom<CreateTicketBody> for NewTicket {
    type Error = Error;

    fn try_from(body: CreateTicketBody) -> Result<Self, Self::Error> {
        Ok(Self {
            title: field(TITLE, TicketTitle::new(require(body.title, TITLE)?))?,
            description: field(
                DESCRIPTION,
                TicketDescription::new(require(body.description, DESCRIPTION)?),
            )?,
            department: parse_code(&require(body.department, DEPARTMENT)?, DEPARTMENT)?,
            location: field(LOCATION, Location::new(require(body.location, LOCATION)?))?,
            device_id: field(DEVICE_ID, DeviceId::new(require(body.device_id, DEVICE_ID)?))?,
            priority: body
                .priority
                .map(|raw| parse_code::<Priority>(&raw, PRIORITY))
                .transpose()?,
        })
    }
}

/// Request body for `PUT /api/v1/tickets/{id}`. Absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditTicketBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub device_id: Option<String>,
    #[schema(value_type = Option<PrioritySchema>)]
    pub priority: Option<String>,
}

impl TryFrom<EditTicketBody> for TicketEdit {
    type Error = Error;

    fn try_from(body: EditTicketBody) -> Result<Self, Self::Error> {
        Ok(Self {
            title: body
                .title
                .map(|raw| field(TITLE, TicketTitle::new(raw)))
                .transpose()?,
            description: body
                .description
                .map(|raw| field(DESCRIPTION, TicketDescription::new(raw)))
                .transpose()?,
            department: body
                .department
                .map(|raw| parse_code::<Department>(&raw, DEPARTMENT))
                .transpose()?,
            location: body
                .location
                .map(|raw| field(LOCATION, Location::new(raw)))
                .transpose()?,
            device_id: body
                .device_id
                .map(|raw| field(DEVICE_ID, DeviceId::new(raw)))
                .transpose()?,
            priority: body
                .priority
                .map(|raw| parse_code::<Priority>(&raw, PRIORITY))
                .transpose()?,
        })
    }
}

/// Request body for `PUT /api/v1/tickets/{id}/close`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CloseTicketBody {
    #[schema(example = "Replaced the lamp")]
    pub remarks: Option<String>,
}

/// Query string for `GET /api/v1/tickets`. Filters are AND-combined.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TicketListParams {
    /// `OPEN`, `IN_PROGRESS` or `CLOSED`.
    pub status: Option<String>,
    /// Department code, e.g. `CSE`.
    pub department: Option<String>,
    pub technician_id: Option<String>,
    pub coordinator_id: Option<String>,
    /// `recent` orders by last update, newest first.
    pub view: Option<String>,
}

impl TicketListParams {
    fn parse(self) -> Result<(TicketFilter, TicketOrder), Error> {
        let order = match self.view.as_deref() {
            None => TicketOrder::Unspecified,
            Some("recent") => TicketOrder::RecentlyUpdated,
            Some(_) => return Err(invalid_field(VIEW, "view must be `recent` when present")),
        };
        let filter = TicketFilter {
            status: self
                .status
                .map(|raw| parse_code::<TicketStatus>(&raw, STATUS))
                .transpose()?,
            technician_id: self
                .technician_id
                .map(|raw| parse_user_id(&raw, TECHNICIAN_ID))
                .transpose()?,
            coordinator_id: self
                .coordinator_id
                .map(|raw| parse_user_id(&raw, COORDINATOR_ID))
                .transpose()?,
            department: self
                .department
                .map(|raw| parse_code::<Department>(&raw, DEPARTMENT))
                .transpose()?,
        };
        Ok((filter, order))
    }
}

#[derive(Debug, Deserialize)]
pub struct TicketPath {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPath {
    id: String,
    technician_id: String,
}

/// File a new ticket. Coordinators and admins only.
#[utoipa::path(
    post,
    path = "/api/v1/tickets",
    request_body = CreateTicketBody,
    responses(
        (status = 201, description = "Ticket filed", body = TicketResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "createTicket"
)]
#[post("/tickets")]
pub async fn create_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateTicketBody>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller()?;
    authorize(&caller, Operation::CreateTicket, None)
        .map_err(|denied| Error::forbidden(denied.to_string()))?;
    let new = NewTicket::try_from(payload.into_inner())?;
    let view = state.tickets.create_ticket(&caller, new).await?;
    Ok(HttpResponse::Created().json(TicketResponse::from(view)))
}

/// List the tickets visible to the caller.
///
/// Admins see every ticket, coordinators the ones they filed and technicians
/// the ones assigned to them.
#[utoipa::path(
    get,
    path = "/api/v1/tickets",
    params(TicketListParams),
    responses(
        (status = 200, description = "Visible tickets", body = [TicketResponse]),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "listTickets"
)]
#[get("/tickets")]
pub async fn list_tickets(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<TicketListParams>,
) -> ApiResult<web::Json<Vec<TicketResponse>>> {
    let caller = session.require_caller()?;
    let (filter, order) = params.into_inner().parse()?;
    let views = state
        .tickets_query
        .list_tickets(&caller, filter, order)
        .await?;
    Ok(web::Json(views.into_iter().map(TicketResponse::from).collect()))
}

/// Fetch one ticket.
#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}",
    params(("id" = String, Path, description = "Ticket identifier")),
    responses(
        (status = 200, description = "Ticket", body = TicketResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "getTicket"
)]
#[get("/tickets/{id}")]
pub async fn get_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<TicketPath>,
) -> ApiResult<web::Json<TicketResponse>> {
    let caller = session.require_caller()?;
    let ticket_id = parse_ticket_id(&path.id, TICKET_ID)?;
    let view = state.tickets_query.get_ticket(&caller, ticket_id).await?;
    Ok(web::Json(TicketResponse::from(view)))
}

/// Edit the details of an open ticket.
#[utoipa::path(
    put,
    path = "/api/v1/tickets/{id}",
    params(("id" = String, Path, description = "Ticket identifier")),
    request_body = EditTicketBody,
    responses(
        (status = 200, description = "Edited ticket", body = TicketResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Ticket is no longer open", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "editTicket"
)]
#[put("/tickets/{id}")]
pub async fn edit_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<TicketPath>,
    payload: web::Json<EditTicketBody>,
) -> ApiResult<web::Json<TicketResponse>> {
    let caller = session.require_caller()?;
    let ticket_id = parse_ticket_id(&path.id, TICKET_ID)?;
    let edit = TicketEdit::try_from(payload.into_inner())?;
    let view = state.tickets.edit_ticket(&caller, ticket_id, edit).await?;
    Ok(web::Json(TicketResponse::from(view)))
}

/// Assign a technician to an open ticket. Admin only.
#[utoipa::path(
    put,
    path = "/api/v1/tickets/{id}/technician/{technicianId}",
    params(
        ("id" = String, Path, description = "Ticket identifier"),
        ("technicianId" = String, Path, description = "Technician account identifier")
    ),
    responses(
        (status = 200, description = "Ticket in progress", body = TicketResponse),
        (status = 400, description = "Assignee is not a technician", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Ticket or technician not found", body = ErrorSchema),
        (status = 409, description = "Ticket is not open", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "assignTechnician"
)]
#[put("/tickets/{id}/technician/{technicianId}")]
pub async fn assign_technician(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<AssignmentPath>,
) -> ApiResult<web::Json<TicketResponse>> {
    let caller = session.require_caller()?;
    let AssignmentPath { id, technician_id } = path.into_inner();
    let ticket_id = parse_ticket_id(&id, TICKET_ID)?;
    let technician_id = parse_user_id(&technician_id, TECHNICIAN_ID)?;
    let view = state
        .tickets
        .assign_technician(&caller, ticket_id, technician_id)
        .await?;
    Ok(web::Json(TicketResponse::from(view)))
}

/// Close an in-progress ticket with optional remarks.
///
/// The body may be omitted entirely.
#[utoipa::path(
    put,
    path = "/api/v1/tickets/{id}/close",
    params(("id" = String, Path, description = "Ticket identifier")),
    request_body(content = CloseTicketBody, description = "Optional remarks"),
    responses(
        (status = 200, description = "Ticket closed", body = TicketResponse),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Ticket is not in progress", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "closeTicket"
)]
#[put("/tickets/{id}/close")]
pub async fn close_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<TicketPath>,
    payload: web::Bytes,
) -> ApiResult<web::Json<TicketResponse>> {
    let caller = session.require_caller()?;
    let ticket_id = parse_ticket_id(&path.id, TICKET_ID)?;
    let remarks = close_remarks(&payload)?;
    let view = state.tickets.close_ticket(&caller, ticket_id, remarks).await?;
    Ok(web::Json(TicketResponse::from(view)))
}

/// Remarks from an optional close body. An empty body carries none; anything
/// else must be a valid [`CloseTicketBody`].
fn close_remarks(payload: &[u8]) -> Result<Option<Remarks>, Error> {
    if payload.trim_ascii().is_empty() {
        return Ok(None);
    }
    let body: CloseTicketBody =
        serde_json::from_slice(payload).map_err(|err| invalid_field(REMARKS, err))?;
    body.remarks
        .map(|raw| field(REMARKS, Remarks::new(raw)))
        .transpose()
}

#[cfg(test)]
#[path = "tickets_tests.rs"]
mod tests;
