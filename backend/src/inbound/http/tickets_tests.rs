//! Tests for ticket handlers, run against in-memory stores.

use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::{Department, Role, User};
use crate::inbound::http::test_utils::{TestBackend, login_cookie};

struct Staff {
    coordinator: User,
    other_coordinator: User,
    technician: User,
    other_technician: User,
}

async fn seed_staff(backend: &TestBackend) -> Staff {
    Staff {
        coordinator: backend
            .seed(Role::Coordinator, "coord@example.edu", Some(Department::Cse))
            .await,
        other_coordinator: backend
            .seed(Role::Coordinator, "other@example.edu", Some(Department::Me))
            .await,
        technician: backend
            .seed(Role::Technician, "tess@example.edu", None)
            .await,
        other_technician: backend
            .seed(Role::Technician, "tom@example.edu", None)
            .await,
    }
}

fn ticket_body(title: &str, department: &str) -> Value {
    json!({
        "title": title,
        "description": "Lamp does not turn on",
        "department": department,
        "location": "Lab 3",
        "deviceId": "PRJ-0042",
    })
}

async fn send<S>(app: &S, request: actix_http::Request) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let response = actix_test::call_service(app, request).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

async fn file_ticket<S>(app: &S, cookie: &Cookie<'static>, title: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    file_ticket_in(app, cookie, title, "CSE").await
}

async fn file_ticket_in<S>(
    app: &S,
    cookie: &Cookie<'static>,
    title: &str,
    department: &str,
) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/tickets")
        .cookie(cookie.clone())
        .set_json(ticket_body(title, department))
        .to_request();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().expect("ticket id").to_owned()
}

fn put(uri: &str, cookie: &Cookie<'static>) -> actix_test::TestRequest {
    actix_test::TestRequest::put()
        .uri(uri)
        .cookie(cookie.clone())
}

fn get(uri: &str, cookie: &Cookie<'static>) -> actix_http::Request {
    actix_test::TestRequest::get()
        .uri(uri)
        .cookie(cookie.clone())
        .to_request()
}

#[actix_web::test]
async fn coordinator_files_ticket_with_defaults() {
    let backend = TestBackend::new().await;
    let staff = seed_staff(&backend).await;
    let app = actix_test::init_service(backend.app()).await;
    let cookie = login_cookie(&app, "coord@example.edu").await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/tickets")
        .cookie(cookie)
        .set_json(ticket_body("Projector broken", "CSE"))
        .to_request();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "OPEN");
    assert_eq!(body["priority"], "MEDIUM");
    assert_eq!(body["technicianId"], Value::Null);
    assert_eq!(body["coordinatorId"], staff.coordinator.id().to_string());
    assert_eq!(body["coordinator"]["email"], "coord@example.edu");
    assert_eq!(body["departmentLabel"], "Computer Science and Engineering");
    assert_eq!(body["createdAt"], body["updatedAt"]);
}

#[actix_web::test]
async fn technicians_cannot_file_tickets() {
    let backend = TestBackend::new().await;
    seed_staff(&backend).await;
    let app = actix_test::init_service(backend.app()).await;
    let cookie = login_cookie(&app, "tess@example.edu").await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/tickets")
        .cookie(cookie)
        .set_json(ticket_body("Projector broken", "CSE"))
        .to_request();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[actix_web::test]
async fn technician_with_invalid_body_is_still_forbidden() {
    let backend = TestBackend::new().await;
    seed_staff(&backend).await;
    let app = actix_test::init_service(backend.app()).await;
    let cookie = login_cookie(&app, "tess@example.edu").await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/tickets")
        .cookie(cookie)
        .set_json(json!({ "title": "ab", "department": "NOPE" }))
        .to_request();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[rstest]
#[case(json!({"title": "ab", "description": "desc", "department": "CSE", "location": "L", "deviceId": "D"}), "title")]
#[case(json!({"title": "Broken", "description": "desc", "department": "NOPE", "location": "L", "deviceId": "D"}), "department")]
#[case(json!({"title": "Broken", "description": "desc", "department": "CSE", "location": "L", "deviceId": "D", "priority": "URGENT"}), "priority")]
#[case(json!({"title": "Broken", "description": "desc", "department": "CSE", "location": "L"}), "deviceId")]
#[actix_web::test]
async fn invalid_ticket_fields_are_reported(#[case] payload: Value, #[case] field: &str) {
    let backend = TestBackend::new().await;
    seed_staff(&backend).await;
    let app = actix_test::init_service(backend.app()).await;
    let cookie = login_cookie(&app, "coord@example.edu").await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/tickets")
        .cookie(cookie)
        .set_json(payload)
        .to_request();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn assignment_happens_once() {
    let backend = TestBackend::new().await;
    let staff = seed_staff(&backend).await;
    let app = actix_test::init_service(backend.app()).await;
    let coordinator = login_cookie(&app, "coord@example.edu").await;
    let admin = login_cookie(&app, "admin@example.edu").await;
    let id = file_ticket(&app, &coordinator, "Projector broken").await;
    let uri = format!("/api/v1/tickets/{id}/technician/{}", staff.technician.id());

    let (status, body) = send(&app, put(&uri, &admin).to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "IN_PROGRESS");
    assert_eq!(body["technician"]["id"], staff.technician.id().to_string());
    assert!(body["assignedAt"].is_string());

    let again = format!(
        "/api/v1/tickets/{id}/technician/{}",
        staff.other_technician.id()
    );
    let (status, body) = send(&app, put(&again, &admin).to_request()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "invalid_transition");
    assert_eq!(body["details"]["expected"], "OPEN");
    assert_eq!(body["details"]["actual"], "IN_PROGRESS");
}

#[actix_web::test]
async fn coordinator_cannot_assign() {
    let backend = TestBackend::new().await;
    let staff = seed_staff(&backend).await;
    let app = actix_test::init_service(backend.app()).await;
    let coordinator = login_cookie(&app, "coord@example.edu").await;
    let id = file_ticket(&app, &coordinator, "Projector broken").await;
    let uri = format!("/api/v1/tickets/{id}/technician/{}", staff.technician.id());

    let (status, _) = send(&app, put(&uri, &coordinator).to_request()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn assignee_must_hold_technician_role() {
    let backend = TestBackend::new().await;
    let staff = seed_staff(&backend).await;
    let app = actix_test::init_service(backend.app()).await;
    let coordinator = login_cookie(&app, "coord@example.edu").await;
    let admin = login_cookie(&app, "admin@example.edu").await;
    let id = file_ticket(&app, &coordinator, "Projector broken").await;
    let uri = format!(
        "/api/v1/tickets/{id}/technician/{}",
        staff.other_coordinator.id()
    );

    let (status, body) = send(&app, put(&uri, &admin).to_request()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "assignee must be a technician");
}

#[actix_web::test]
async fn close_rules_follow_assignment() {
    let backend = TestBackend::new().await;
    let staff = seed_staff(&backend).await;
    let app = actix_test::init_service(backend.app()).await;
    let coordinator = login_cookie(&app, "coord@example.edu").await;
    let admin = login_cookie(&app, "admin@example.edu").await;
    let technician = login_cookie(&app, "tess@example.edu").await;
    let bystander = login_cookie(&app, "tom@example.edu").await;
    let id = file_ticket(&app, &coordinator, "Projector broken").await;
    let close_uri = format!("/api/v1/tickets/{id}/close");

    let (status, body) = send(&app, put(&close_uri, &coordinator).to_request()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["expected"], "IN_PROGRESS");

    let assign = format!("/api/v1/tickets/{id}/technician/{}", staff.technician.id());
    assert_eq!(send(&app, put(&assign, &admin).to_request()).await.0, StatusCode::OK);

    let (status, _) = send(
        &app,
        put(&close_uri, &bystander)
            .set_json(json!({ "remarks": "Not mine" }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        put(&close_uri, &technician)
            .set_json(json!({ "remarks": "Replaced the lamp" }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CLOSED");
    assert_eq!(body["remarks"], "Replaced the lamp");
    assert!(body["resolvedAt"].is_string());
}

#[actix_web::test]
async fn owning_coordinator_closes_without_body() {
    let backend = TestBackend::new().await;
    let staff = seed_staff(&backend).await;
    let app = actix_test::init_service(backend.app()).await;
    let coordinator = login_cookie(&app, "coord@example.edu").await;
    let admin = login_cookie(&app, "admin@example.edu").await;
    let id = file_ticket(&app, &coordinator, "Projector broken").await;
    let assign = format!("/api/v1/tickets/{id}/technician/{}", staff.technician.id());
    send(&app, put(&assign, &admin).to_request()).await;

    let close_uri = format!("/api/v1/tickets/{id}/close");
    let (status, body) = send(&app, put(&close_uri, &coordinator).to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["remarks"], Value::Null);
}

#[rstest]
#[case(r#"{"remarks": 42}"#)]
#[case(r#"{"remarks": "Replaced"#)]
#[case("remarks=Replaced")]
#[actix_web::test]
async fn malformed_close_body_leaves_ticket_in_progress(#[case] payload: &'static str) {
    let backend = TestBackend::new().await;
    let staff = seed_staff(&backend).await;
    let app = actix_test::init_service(backend.app()).await;
    let coordinator = login_cookie(&app, "coord@example.edu").await;
    let admin = login_cookie(&app, "admin@example.edu").await;
    let technician = login_cookie(&app, "tess@example.edu").await;
    let id = file_ticket(&app, &coordinator, "Projector broken").await;
    let assign = format!("/api/v1/tickets/{id}/technician/{}", staff.technician.id());
    send(&app, put(&assign, &admin).to_request()).await;

    let close_uri = format!("/api/v1/tickets/{id}/close");
    let request = put(&close_uri, &technician)
        .insert_header(("content-type", "application/json"))
        .set_payload(payload)
        .to_request();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], "remarks");

    let (_, ticket) = send(&app, get(&format!("/api/v1/tickets/{id}"), &admin)).await;
    assert_eq!(ticket["status"], "IN_PROGRESS");
    assert_eq!(ticket["resolvedAt"], Value::Null);
}

#[actix_web::test]
async fn lists_are_scoped_by_role() {
    let backend = TestBackend::new().await;
    let staff = seed_staff(&backend).await;
    let app = actix_test::init_service(backend.app()).await;
    let coordinator = login_cookie(&app, "coord@example.edu").await;
    let other = login_cookie(&app, "other@example.edu").await;
    let admin = login_cookie(&app, "admin@example.edu").await;
    let technician = login_cookie(&app, "tess@example.edu").await;

    let mine = file_ticket(&app, &coordinator, "Projector broken").await;
    let lathe = file_ticket_in(&app, &other, "Lathe jammed", "ME").await;
    let assign = format!("/api/v1/tickets/{mine}/technician/{}", staff.technician.id());
    send(&app, put(&assign, &admin).to_request()).await;

    let ids = |body: &Value| -> Vec<String> {
        body.as_array()
            .expect("array")
            .iter()
            .filter_map(|t| t["id"].as_str().map(str::to_owned))
            .collect()
    };

    let (_, all) = send(&app, get("/api/v1/tickets", &admin)).await;
    assert_eq!(ids(&all).len(), 2);

    let (_, own) = send(&app, get("/api/v1/tickets", &coordinator)).await;
    assert_eq!(ids(&own), vec![mine.clone()]);

    let foreign = format!(
        "/api/v1/tickets?coordinatorId={}",
        staff.other_coordinator.id()
    );
    let (status, none) = send(&app, get(&foreign, &coordinator)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(ids(&none).is_empty());

    let (_, assigned) = send(&app, get("/api/v1/tickets", &technician)).await;
    assert_eq!(ids(&assigned), vec![mine.clone()]);

    let (_, open) = send(&app, get("/api/v1/tickets?status=OPEN&department=ME", &admin)).await;
    assert_eq!(ids(&open), vec![lathe]);

    let (_, cse) = send(&app, get("/api/v1/tickets?department=CSE", &admin)).await;
    assert_eq!(ids(&cse), vec![mine]);
}

#[actix_web::test]
async fn recent_view_orders_by_last_update() {
    let backend = TestBackend::new().await;
    let staff = seed_staff(&backend).await;
    let app = actix_test::init_service(backend.app()).await;
    let coordinator = login_cookie(&app, "coord@example.edu").await;
    let admin = login_cookie(&app, "admin@example.edu").await;
    let first = file_ticket(&app, &coordinator, "First ticket").await;
    let second = file_ticket(&app, &coordinator, "Second ticket").await;
    let assign = format!("/api/v1/tickets/{first}/technician/{}", staff.technician.id());
    send(&app, put(&assign, &admin).to_request()).await;

    let (status, body) = send(&app, get("/api/v1/tickets?view=recent", &admin)).await;
    assert_eq!(status, StatusCode::OK);
    let order: Vec<&str> = body
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|t| t["id"].as_str())
        .collect();
    assert_eq!(order, vec![first.as_str(), second.as_str()]);
}

#[rstest]
#[case("/api/v1/tickets?view=oldest", "view")]
#[case("/api/v1/tickets?status=PENDING", "status")]
#[case("/api/v1/tickets?technicianId=abc", "technicianId")]
#[actix_web::test]
async fn invalid_list_parameters_are_rejected(#[case] uri: &str, #[case] field: &str) {
    let backend = TestBackend::new().await;
    let app = actix_test::init_service(backend.app()).await;
    let admin = login_cookie(&app, "admin@example.edu").await;

    let (status, body) = send(&app, get(uri, &admin)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn single_ticket_respects_view_rule() {
    let backend = TestBackend::new().await;
    seed_staff(&backend).await;
    let app = actix_test::init_service(backend.app()).await;
    let coordinator = login_cookie(&app, "coord@example.edu").await;
    let other = login_cookie(&app, "other@example.edu").await;
    let id = file_ticket(&app, &coordinator, "Projector broken").await;
    let uri = format!("/api/v1/tickets/{id}");

    assert_eq!(send(&app, get(&uri, &coordinator)).await.0, StatusCode::OK);
    assert_eq!(send(&app, get(&uri, &other)).await.0, StatusCode::FORBIDDEN);

    let missing = format!("/api/v1/tickets/{}", uuid::Uuid::new_v4());
    assert_eq!(send(&app, get(&missing, &coordinator)).await.0, StatusCode::NOT_FOUND);
    assert_eq!(
        send(&app, get("/api/v1/tickets/not-a-uuid", &coordinator)).await.0,
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn edits_apply_only_while_open() {
    let backend = TestBackend::new().await;
    let staff = seed_staff(&backend).await;
    let app = actix_test::init_service(backend.app()).await;
    let coordinator = login_cookie(&app, "coord@example.edu").await;
    let admin = login_cookie(&app, "admin@example.edu").await;
    let id = file_ticket(&app, &coordinator, "Projector broken").await;
    let uri = format!("/api/v1/tickets/{id}");

    let (status, body) = send(
        &app,
        put(&uri, &coordinator)
            .set_json(json!({ "priority": "HIGH", "location": "Lab 4" }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["priority"], "HIGH");
    assert_eq!(body["location"], "Lab 4");
    assert_eq!(body["title"], "Projector broken");

    let assign = format!("/api/v1/tickets/{id}/technician/{}", staff.technician.id());
    send(&app, put(&assign, &admin).to_request()).await;

    let (status, body) = send(
        &app,
        put(&uri, &coordinator)
            .set_json(json!({ "priority": "LOW" }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "invalid_transition");
}
