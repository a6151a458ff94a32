//! Helpdesk server entry-point: loads settings, wires stores, bootstraps the
//! admin account and serves the REST API.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use helpdesk::bootstrap::bootstrap_admin;
use helpdesk::inbound::http::health::HealthState;
use helpdesk::inbound::http::session_config::{BuildMode, session_settings_from_env};
use helpdesk::outbound::persistence::{DbPool, PoolConfig};
use helpdesk::settings::AppSettings;
#[cfg(feature = "metrics")]
use server::initialize_metrics;
use server::{ServerConfig, build_http_state, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let env = DefaultEnv::new();
    let session = session_settings_from_env(&env, BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(session, settings.bind_addr());
    if let Some(url) = settings.database_url() {
        let pool = DbPool::new(
            PoolConfig::new(url).with_max_size(settings.db_max_connections()),
        )
        .await
        .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    }
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(initialize_metrics());

    let http_state = build_http_state(config.db_pool.as_ref());
    bootstrap_admin(&settings, http_state.accounts.as_ref())
        .await
        .map_err(std::io::Error::other)?;

    let (host, port) = settings.bind_addr();
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, http_state, config)?;
    info!(%host, port, "helpdesk listening");
    server.await
}
