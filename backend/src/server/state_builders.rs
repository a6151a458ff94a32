//! Wiring of stores and services into [`HttpState`].

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::{info, warn};

use helpdesk::domain::ports::{TicketRepository, UserRepository};
use helpdesk::domain::{TicketService, UserAccountService};
use helpdesk::inbound::http::state::{HttpState, HttpStatePorts};
use helpdesk::outbound::memory::{InMemoryTicketRepository, InMemoryUserRepository};
use helpdesk::outbound::persistence::{DbPool, DieselTicketRepository, DieselUserRepository};
use helpdesk::outbound::security::Argon2PasswordHasher;

/// Build handler state over PostgreSQL when a pool is configured, otherwise
/// over process-local stores.
pub(crate) fn build_http_state(pool: Option<&DbPool>) -> HttpState {
    match pool {
        Some(pool) => {
            info!(store = "postgres", "ticket and user stores ready");
            wire(
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselTicketRepository::new(pool.clone())),
            )
        }
        None => {
            warn!(
                store = "memory",
                "no database configured; data will be lost on restart"
            );
            wire(
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryTicketRepository::new()),
            )
        }
    }
}

fn wire<U, T>(users: Arc<U>, tickets: Arc<T>) -> HttpState
where
    U: UserRepository + 'static,
    T: TicketRepository + 'static,
{
    let clock = Arc::new(DefaultClock);
    let accounts = Arc::new(UserAccountService::new(
        users.clone(),
        Arc::new(Argon2PasswordHasher),
        clock.clone(),
    ));
    let tickets = Arc::new(TicketService::new(tickets, users, clock));
    HttpState::new(HttpStatePorts {
        login: accounts.clone(),
        users: accounts.clone(),
        accounts,
        tickets: tickets.clone(),
        tickets_query: tickets,
    })
}
