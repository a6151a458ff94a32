//! Staff account HTTP handlers.
//!
//! ```text
//! POST /api/v1/users {"email":"tech@example.edu","password":"Sup3r$ecret","name":"Tess","role":"TECHNICIAN"}
//! GET /api/v1/users/technicians
//! GET /api/v1/users/coordinators
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::CreateUserRequest;
use crate::domain::{
    Department, DisplayName, EmailAddress, Error, NewPassword, Role, User, UserSummary,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, RoleSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, field, parse_code, require, weak_password_error,
};

/// Account profile returned by user and auth endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "ada@example.edu")]
    pub email: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(value_type = RoleSchema)]
    pub role: String,
    #[schema(example = "CSE")]
    pub department: Option<String>,
    #[schema(example = "Computer Science and Engineering")]
    pub department_label: Option<String>,
    pub image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id().to_string(),
            email: value.email().to_string(),
            name: value.name().to_string(),
            role: value.role().to_string(),
            department: value.department().map(|d| d.code().to_owned()),
            department_label: value.department().map(|d| d.label().to_owned()),
            image: value.image().map(|i| i.as_ref().to_owned()),
            created_at: value.created_at().to_rfc3339(),
            updated_at: value.updated_at().to_rfc3339(),
        }
    }
}

/// `{id, name, email}` projection embedded in ticket responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserSummaryResponse {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<UserSummary> for UserSummaryResponse {
    fn from(value: UserSummary) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.to_string(),
            email: value.email.to_string(),
        }
    }
}

/// Request body for `POST /api/v1/users`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserBody {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    #[schema(value_type = Option<RoleSchema>)]
    pub role: Option<String>,
    #[schema(example = "CSE")]
    pub department: Option<String>,
}

const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");
const NAME: FieldName = FieldName::new("name");
const ROLE: FieldName = FieldName::new("role");
const DEPARTMENT: FieldName = FieldName::new("department");

pub(crate) fn parse_new_password(raw: &str) -> Result<NewPassword, Error> {
    NewPassword::new(raw).map_err(|error| weak_password_error(PASSWORD, &error))
}

impl TryFrom<CreateUserBody> for CreateUserRequest {
    type Error = Error;

    fn try_from(body: CreateUserBody) -> Result<Self, Self::Error> {
        let email = field(EMAIL, EmailAddress::new(require(body.email, EMAIL)?))?;
        let password = parse_new_password(&require(body.password, PASSWORD)?)?;
        let name = field(NAME, DisplayName::new(require(body.name, NAME)?))?;
        let role: Role = parse_code(&require(body.role, ROLE)?, ROLE)?;
        let department = body
            .department
            .map(|raw| parse_code::<Department>(&raw, DEPARTMENT))
            .transpose()?;
        Ok(Self {
            email,
            password,
            name,
            role,
            department,
        })
    }
}

/// Create a staff account. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserBody,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateUserBody>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller()?;
    let request = CreateUserRequest::try_from(payload.into_inner())?;
    let user = state.accounts.create_user(&caller, request).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

async fn list_staff(
    state: &HttpState,
    session: &SessionContext,
    role: Role,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let caller = session.require_caller()?;
    let users = state.users.list_staff(&caller, role).await?;
    Ok(web::Json(users.into_iter().map(UserResponse::from).collect()))
}

/// List technician accounts. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/users/technicians",
    responses(
        (status = 200, description = "Technicians ordered by name", body = [UserResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listTechnicians"
)]
#[get("/users/technicians")]
pub async fn list_technicians(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    list_staff(&state, &session, Role::Technician).await
}

/// List coordinator accounts. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/users/coordinators",
    responses(
        (status = 200, description = "Coordinators ordered by name", body = [UserResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listCoordinators"
)]
#[get("/users/coordinators")]
pub async fn list_coordinators(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    list_staff(&state, &session, Role::Coordinator).await
}
