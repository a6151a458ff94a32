//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler and the health probes, the
//! schema wrappers from [`crate::inbound::http::schemas`] and the session
//! cookie security scheme. Swagger UI serves it in debug builds and the
//! `openapi-dump` binary prints it for external tooling.

use crate::inbound::http::auth::{LoginRequest, ProfileRequest};
use crate::inbound::http::departments::DepartmentResponse;
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, PrioritySchema, RoleSchema, TicketStatusSchema,
};
use crate::inbound::http::tickets::{
    CloseTicketBody, CreateTicketBody, EditTicketBody, TicketResponse,
};
use crate::inbound::http::users::{CreateUserBody, UserResponse, UserSummaryResponse};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the helpdesk REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Helpdesk API",
        description = "Campus IT helpdesk: staff accounts, ticket lifecycle and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::current_user,
        crate::inbound::http::auth::update_profile,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::list_technicians,
        crate::inbound::http::users::list_coordinators,
        crate::inbound::http::tickets::create_ticket,
        crate::inbound::http::tickets::list_tickets,
        crate::inbound::http::tickets::get_ticket,
        crate::inbound::http::tickets::edit_ticket,
        crate::inbound::http::tickets::assign_technician,
        crate::inbound::http::tickets::close_ticket,
        crate::inbound::http::departments::list_departments,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RoleSchema,
        PrioritySchema,
        TicketStatusSchema,
        LoginRequest,
        ProfileRequest,
        UserResponse,
        UserSummaryResponse,
        CreateUserBody,
        TicketResponse,
        CreateTicketBody,
        EditTicketBody,
        CloseTicketBody,
        DepartmentResponse,
    )),
    tags(
        (name = "auth", description = "Login, logout and own profile"),
        (name = "users", description = "Staff accounts"),
        (name = "tickets", description = "Ticket lifecycle"),
        (name = "departments", description = "Department catalogue"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
