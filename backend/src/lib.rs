//! Campus IT helpdesk backend.
//!
//! - [`domain`]: accounts, tickets, the lifecycle engine and its policy table
//! - [`inbound`]: the actix-web REST adapter
//! - [`outbound`]: PostgreSQL, in-memory and Argon2 adapters
//! - [`settings`] and [`bootstrap`]: startup configuration

pub mod bootstrap;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
