//! Goalkeeper Manager backend server.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use goleiros_manager::config::Config;
use goleiros_manager::db::{self, Repository, POOL_MAX_CONNECTIONS};
use goleiros_manager::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Goleiro Manager backend");
    tracing::info!(
        host = config.database.host.as_deref().unwrap_or("-"),
        database = config.database.name.as_deref().unwrap_or("-"),
        port = config.database.port,
        url_override = config.database.url.is_some(),
        "Database settings"
    );
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database
    let database_url = config.database.connection_url()?;
    let database = db::init_database(&database_url).await?;
    tracing::info!("Connection pool ready ({} connections max)", POOL_MAX_CONNECTIONS);

    // Create application state
    let state = AppState {
        repo: Arc::new(Repository::new(database)),
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
