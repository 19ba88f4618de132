//! Queue server entry-point: loads settings, prepares storage and serves the API.

mod server;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use bqms::inbound::http::health::HealthState;
use bqms::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use bqms::settings::ServerSettings;
use ortho_config::OrthoConfig;

use server::{ServerConfig, create_server};

async fn connect_database(database_url: &str, max_connections: u32) -> std::io::Result<DbPool> {
    let applied = run_pending_migrations(database_url)
        .await
        .map_err(|e| std::io::Error::other(format!("database migration failed: {e}")))?;
    info!(applied, "database migrations complete");

    DbPool::new(PoolConfig::new(database_url).with_max_size(max_connections))
        .await
        .map_err(|e| std::io::Error::other(format!("database pool creation failed: {e}")))
}

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

    let settings = ServerSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let mut config = ServerConfig::from_settings(&settings)
        .map_err(|e| std::io::Error::other(format!("invalid settings: {e}")))?;

    if let Some(database_url) = settings.database_url.as_deref() {
        let pool = connect_database(database_url, settings.db_max_connections()).await?;
        config = config.with_db_pool(pool);
    }

    let bind_addr = config.bind_addr();
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config).await?;
    info!(%bind_addr, "queue server listening");

    let result = server.await;
    health_state.mark_unhealthy();
    result
}
