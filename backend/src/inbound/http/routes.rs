//! Route table for the `/api/v1` scope.
//!
//! The server mounts this under the session middleware; tests mount the same
//! table so they exercise the exact routing that ships.

use actix_web::web;

use crate::domain::Error;
use crate::inbound::http::auth::{current_user, login, logout, update_profile};
use crate::inbound::http::departments::list_departments;
use crate::inbound::http::tickets::{
    assign_technician, close_ticket, create_ticket, edit_ticket, get_ticket, list_tickets,
};
use crate::inbound::http::users::{create_user, list_coordinators, list_technicians};

/// Register every `/api/v1` handler plus extractor error mapping.
///
/// Malformed JSON bodies and query strings surface as `invalid_request`
/// errors with the usual JSON body instead of actix's plain-text default.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("malformed JSON body: {err}")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("malformed query string: {err}")).into()
    }))
    .service(login)
    .service(logout)
    .service(current_user)
    .service(update_profile)
    .service(create_user)
    .service(list_technicians)
    .service(list_coordinators)
    .service(create_ticket)
    .service(list_tickets)
    .service(get_ticket)
    .service(edit_ticket)
    .service(assign_technician)
    .service(close_ticket)
    .service(list_departments);
}
