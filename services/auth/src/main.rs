use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use auth::{AppState, AuthService, config::AppConfig, repositories::UserRepository, routes};
use common::Database;

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is not an error
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    info!("Starting authentication service");

    let config = AppConfig::from_env().inspect_err(|e| error!("Invalid configuration: {:#}", e))?;

    // Pool creation failure is fatal
    let database = Database::connect(&config.database)
        .await
        .inspect_err(|e| error!("Error connecting to database: {}", e))?;

    // Check database connectivity
    if database.health_check().await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database.init_db().await?;

    let user_repository = UserRepository::new(database.clone());
    let auth_service = AuthService::new(Arc::new(user_repository));
    let app_state = AppState::new(
        auth_service,
        config.secret_key.as_bytes(),
        config.secure_cookies,
    );

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Authentication service listening on {}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    database.shutdown().await;
    info!("Authentication service stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            warn!("Received SIGTERM, shutting down");
        }
    }
}
