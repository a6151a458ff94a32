//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use mockable::DefaultClock;
use serde_json::json;

use crate::domain::ports::{
    CreateUserRequest, LoginService, PasswordHash, PasswordHashError, PasswordHasher,
    UserAccountCommand,
};
use crate::domain::{
    Caller, Department, DisplayName, EmailAddress, LoginCredentials, NewPassword, Role,
    TicketService, User, UserAccountService,
};
use crate::inbound::http::routes::configure;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::{InMemoryTicketRepository, InMemoryUserRepository};

/// Password accepted by every seeded account.
pub const TEST_PASSWORD: &str = "Sup3r$ecret";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Reversible hasher so HTTP tests skip argon2's deliberate cost.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextHasher;

impl PasswordHasher for PlainTextHasher {
    fn hash(&self, password: &NewPassword) -> Result<PasswordHash, PasswordHashError> {
        Ok(PasswordHash::new(format!("plain${}", password.expose())))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        Ok(hash.as_ref() == format!("plain${password}"))
    }
}

type TestAccounts = UserAccountService<InMemoryUserRepository, PlainTextHasher>;

/// In-memory wiring shared by handler tests.
pub struct TestBackend {
    pub state: HttpState,
    pub accounts: Arc<TestAccounts>,
    pub admin: User,
}

impl TestBackend {
    /// Wire services over empty in-memory stores and bootstrap one admin.
    pub async fn new() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let accounts = Arc::new(UserAccountService::new(
            users.clone(),
            Arc::new(PlainTextHasher),
            Arc::new(DefaultClock),
        ));
        let tickets = Arc::new(TicketService::new(
            Arc::new(InMemoryTicketRepository::new()),
            users,
            Arc::new(DefaultClock),
        ));
        let state = HttpState::new(HttpStatePorts {
            login: accounts.clone(),
            users: accounts.clone(),
            accounts: accounts.clone(),
            tickets: tickets.clone(),
            tickets_query: tickets,
        });

        let email = EmailAddress::new("admin@example.edu").expect("admin email");
        accounts
            .ensure_admin(
                email,
                NewPassword::new(TEST_PASSWORD).expect("password"),
                DisplayName::new("Helpdesk Admin").expect("name"),
            )
            .await
            .expect("admin bootstrap");
        let credentials =
            LoginCredentials::try_from_parts("admin@example.edu", TEST_PASSWORD).expect("creds");
        let admin = accounts
            .authenticate(&credentials)
            .await
            .expect("admin login");

        Self {
            state,
            accounts,
            admin,
        }
    }

    /// Create an account through the admin path.
    pub async fn seed(&self, role: Role, email: &str, department: Option<Department>) -> User {
        let caller = Caller::new(self.admin.id().clone(), Role::Admin);
        self.accounts
            .create_user(
                &caller,
                CreateUserRequest {
                    email: EmailAddress::new(email).expect("email"),
                    password: NewPassword::new(TEST_PASSWORD).expect("password"),
                    name: DisplayName::new(format!("{role} {email}")).expect("name"),
                    role,
                    department,
                },
            )
            .await
            .expect("seeded account")
    }

    /// Build an app serving the full `/api/v1` surface.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .service(
                web::scope("/api/v1")
                    .wrap(test_session_middleware())
                    .configure(configure),
            )
    }
}

/// Log in through the HTTP endpoint and return the session cookie.
pub async fn login_cookie(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    email: &str,
) -> Cookie<'static> {
    let request = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": email, "password": TEST_PASSWORD }))
        .to_request();
    let response = test::call_service(app, request).await;
    assert!(response.status().is_success(), "login failed for {email}");
    response
        .response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("session cookie")
        .into_owned()
}
