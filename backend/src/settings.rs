//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `HELPDESK_*` environment variables or a
//! configuration file, in OrthoConfig's usual precedence.

use std::fmt;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_ADMIN_NAME: &str = "Helpdesk Admin";

/// Server, database and bootstrap settings.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HELPDESK")]
pub struct AppSettings {
    /// Interface or hostname to bind.
    #[ortho_config(default = "0.0.0.0".to_owned())]
    pub host: String,
    /// Port to bind.
    #[ortho_config(default = 8080)]
    pub port: u16,
    /// PostgreSQL URL. In-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
    /// Email of the admin created at startup when no such account exists.
    pub bootstrap_admin_email: Option<String>,
    /// Password for the bootstrap admin.
    pub bootstrap_admin_password: Option<String>,
    /// Display name for the bootstrap admin.
    pub bootstrap_admin_name: Option<String>,
}

impl AppSettings {
    /// Host and port the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }

    /// Database URL with blank values treated as unset.
    #[must_use]
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Pool size; ten connections unless configured.
    #[must_use]
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
    }

    /// Bootstrap admin display name.
    #[must_use]
    pub fn bootstrap_admin_name(&self) -> &str {
        self.bootstrap_admin_name
            .as_deref()
            .unwrap_or(DEFAULT_ADMIN_NAME)
    }
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &self.database_url().map(|_| "<set>"))
            .field("db_max_connections", &self.db_max_connections)
            .field("bootstrap_admin_email", &self.bootstrap_admin_email)
            .field(
                "bootstrap_admin_password",
                &self.bootstrap_admin_password.as_ref().map(|_| "<redacted>"),
            )
            .field("bootstrap_admin_name", &self.bootstrap_admin_name)
            .finish()
    }
}
