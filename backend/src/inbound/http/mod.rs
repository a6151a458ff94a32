//! HTTP inbound adapter exposing the `/api/v1` REST surface.

pub mod auth;
pub mod departments;
pub mod error;
pub mod health;
pub mod routes;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod tickets;
pub mod users;
pub mod validation;

pub use error::ApiResult;
