//! Authentication and own-profile HTTP handlers.
//!
//! ```text
//! POST /api/v1/auth/login {"email":"admin@example.edu","password":"Sup3r$ecret"}
//! POST /api/v1/auth/logout
//! GET /api/v1/auth/me
//! PUT /api/v1/auth/profile {"name":"Ada","image":"https://…","password":"N3w$ecret"}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::ports::ProfileUpdateRequest;
use crate::domain::{DisplayName, Error, LoginCredentials, LoginValidationError, ProfileImage};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{UserResponse, parse_new_password};
use crate::inbound::http::validation::{FieldName, field};

/// Login request body for `POST /api/v1/auth/login`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "admin@example.edu")]
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyEmail => Error::invalid_request("email must not be empty")
            .with_details(json!({ "field": "email", "code": "empty_email" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Authenticate by email and password and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user = state.login.authenticate(&credentials).await?;
    session.persist_user(&user)?;
    info!(user_id = %user.id(), role = %user.role(), "login succeeded");
    Ok(web::Json(UserResponse::from(user)))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Profile of the signed-in account.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserResponse>> {
    let caller = session.require_caller()?;
    let user = state.users.current_user(&caller).await?;
    Ok(web::Json(UserResponse::from(user)))
}

/// Request body for `PUT /api/v1/auth/profile`. Absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<ProfileRequest> for ProfileUpdateRequest {
    type Error = Error;

    fn try_from(body: ProfileRequest) -> Result<Self, Self::Error> {
        const NAME: FieldName = FieldName::new("name");
        const IMAGE: FieldName = FieldName::new("image");
        Ok(Self {
            name: body
                .name
                .map(|raw| field(NAME, DisplayName::new(raw)))
                .transpose()?,
            image: body
                .image
                .map(|raw| field(IMAGE, ProfileImage::new(raw)))
                .transpose()?,
            password: body
                .password
                .map(|raw| parse_new_password(&raw))
                .transpose()?,
        })
    }
}

/// Update the signed-in account's name, avatar or password.
#[utoipa::path(
    put,
    path = "/api/v1/auth/profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated account", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "updateProfile"
)]
#[put("/auth/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let caller = session.require_caller()?;
    let request = ProfileUpdateRequest::try_from(payload.into_inner())?;
    let user = state.accounts.update_profile(&caller, request).await?;
    Ok(web::Json(UserResponse::from(user)))
}
