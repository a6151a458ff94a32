//! `bb8` pool of `diesel-async` PostgreSQL connections.
//!
//! Each repository call checks out one connection. Checkout failures become
//! [`PoolError::Checkout`], which repositories report as their port's
//! `Connection` error so handlers answer `503`.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use tracing::info;

const DEFAULT_MAX_SIZE: u32 = 10;
const MAX_IDLE_FLOOR: u32 = 2;
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(30);

/// Pool construction and checkout failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("database connection unavailable: {message}")]
    Checkout { message: String },
    #[error("database pool could not be built: {message}")]
    Build { message: String },
}

impl PoolError {
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Database URL and sizing for [`DbPool`].
///
/// ```
/// use helpdesk::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://helpdesk@localhost/helpdesk").with_max_size(0);
/// assert_eq!(config.max_size(), 1);
/// ```
#[derive(Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    checkout_timeout: Duration,
}

impl PoolConfig {
    /// Ten connections and a thirty second checkout timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: DEFAULT_MAX_SIZE,
            checkout_timeout: CHECKOUT_TIMEOUT,
        }
    }

    /// Cap the pool at `max_size` connections, never below one.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    pub fn with_checkout_timeout(mut self, timeout: Duration) -> Self {
        self.checkout_timeout = timeout;
        self
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    /// Idle connections kept warm: two, or fewer for tiny pools.
    pub fn min_idle(&self) -> u32 {
        self.max_size.min(MAX_IDLE_FLOOR)
    }

    /// Host and database part of the URL, with credentials removed.
    pub fn redacted_target(&self) -> &str {
        let url = self.database_url.as_str();
        url.rsplit_once('@').map_or(url, |(_, target)| target)
    }
}

impl std::fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolConfig")
            .field("target", &self.redacted_target())
            .field("max_size", &self.max_size)
            .field("checkout_timeout", &self.checkout_timeout)
            .finish()
    }
}

/// Shared PostgreSQL pool. Clones share the same `bb8` pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool and open the initial idle connections.
    ///
    /// # Errors
    /// [`PoolError::Build`] when the URL is invalid or the server cannot be
    /// reached.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);
        let inner = Pool::builder()
            .max_size(config.max_size)
            .min_idle(Some(config.min_idle()))
            .connection_timeout(config.checkout_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        info!(
            target_db = config.redacted_target(),
            max_size = config.max_size,
            "database pool ready"
        );
        Ok(Self { inner })
    }

    /// Check out a connection.
    ///
    /// # Errors
    /// [`PoolError::Checkout`] when none frees up within the timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1, 1)]
    #[case(1, 1, 1)]
    #[case(10, 10, 2)]
    #[case(40, 40, 2)]
    fn sizes_are_clamped(#[case] requested: u32, #[case] max: u32, #[case] idle: u32) {
        let config = PoolConfig::new("postgres://localhost/helpdesk").with_max_size(requested);
        assert_eq!(config.max_size(), max);
        assert_eq!(config.min_idle(), idle);
    }

    #[rstest]
    #[case("postgres://app:s3cret@db:5432/helpdesk", "db:5432/helpdesk")]
    #[case("postgres://localhost/helpdesk", "postgres://localhost/helpdesk")]
    fn credentials_never_reach_logs(#[case] url: &str, #[case] shown: &str) {
        let config = PoolConfig::new(url);
        assert_eq!(config.redacted_target(), shown);
        assert!(!format!("{config:?}").contains("s3cret"));
    }

    #[rstest]
    fn checkout_timeout_is_configurable() {
        let config = PoolConfig::new("postgres://localhost/helpdesk")
            .with_checkout_timeout(Duration::from_secs(5));
        assert_eq!(config.checkout_timeout, Duration::from_secs(5));
        assert_eq!(PoolConfig::new("x").checkout_timeout, CHECKOUT_TIMEOUT);
    }
}
