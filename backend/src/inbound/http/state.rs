//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    LoginService, TicketCommand, TicketsQuery, UserAccountCommand, UsersQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersQuery>,
    pub accounts: Arc<dyn UserAccountCommand>,
    pub tickets: Arc<dyn TicketCommand>,
    pub tickets_query: Arc<dyn TicketsQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersQuery>,
    pub accounts: Arc<dyn UserAccountCommand>,
    pub tickets: Arc<dyn TicketCommand>,
    pub tickets_query: Arc<dyn TicketsQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use helpdesk::domain::{TicketService, UserAccountService};
    /// use helpdesk::inbound::http::state::{HttpState, HttpStatePorts};
    /// use helpdesk::outbound::memory::{InMemoryTicketRepository, InMemoryUserRepository};
    /// use helpdesk::outbound::security::Argon2PasswordHasher;
    ///
    /// let users = Arc::new(InMemoryUserRepository::default());
    /// let accounts = Arc::new(UserAccountService::new(
    ///     users.clone(),
    ///     Arc::new(Argon2PasswordHasher),
    ///     Arc::new(DefaultClock),
    /// ));
    /// let tickets = Arc::new(TicketService::new(
    ///     Arc::new(InMemoryTicketRepository::default()),
    ///     users,
    ///     Arc::new(DefaultClock),
    /// ));
    /// let state = HttpState::new(HttpStatePorts {
    ///     login: accounts.clone(),
    ///     users: accounts.clone(),
    ///     accounts,
    ///     tickets: tickets.clone(),
    ///     tickets_query: tickets,
    /// });
    /// let _login = state.login.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            users,
            accounts,
            tickets,
            tickets_query,
        } = ports;
        Self {
            login,
            users,
            accounts,
            tickets,
            tickets_query,
        }
    }
}
