//! Department catalogue endpoint.
//!
//! ```text
//! GET /api/v1/departments
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Department;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;

/// One catalogue entry.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DepartmentResponse {
    #[schema(example = "CSE")]
    pub code: String,
    #[schema(example = "Computer Science and Engineering")]
    pub label: String,
}

impl From<Department> for DepartmentResponse {
    fn from(value: Department) -> Self {
        Self {
            code: value.code().to_owned(),
            label: value.label().to_owned(),
        }
    }
}

/// List every department code with its label.
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses(
        (status = 200, description = "Department catalogue", body = [DepartmentResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["departments"],
    operation_id = "listDepartments"
)]
#[get("/departments")]
pub async fn list_departments(
    session: SessionContext,
) -> ApiResult<web::Json<Vec<DepartmentResponse>>> {
    session.require_caller()?;
    Ok(web::Json(
        Department::ALL
            .iter()
            .copied()
            .map(DepartmentResponse::from)
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{TestBackend, login_cookie};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;

    #[actix_web::test]
    async fn catalogue_lists_codes_in_order() {
        let backend = TestBackend::new().await;
        let app = actix_test::init_service(backend.app()).await;
        let cookie = login_cookie(&app, "admin@example.edu").await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/departments")
            .cookie(cookie)
            .to_request();
        let body: Vec<DepartmentResponse> = actix_test::call_and_read_body_json(&app, request).await;

        assert_eq!(body.len(), Department::ALL.len());
        assert_eq!(body[0].code, "ISE");
        let cse = body.iter().find(|d| d.code == "CSE").expect("CSE entry");
        assert_eq!(cse.label, "Computer Science and Engineering");
    }

    #[actix_web::test]
    async fn catalogue_requires_a_session() {
        let backend = TestBackend::new().await;
        let app = actix_test::init_service(backend.app()).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/departments")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
