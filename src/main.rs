use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use linklens::auth::AuthService;
use linklens::config::{AuthMode, Config};
use linklens::{api, redirect, storage};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env first so RUST_LOG is honoured
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linklens=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize storage
    info!("Using {:?} storage", config.database.backend);
    let storage = storage::connect(&config.database).await?;

    info!("Initializing database...");
    storage.init().await?;
    info!("Database initialized successfully");

    let auth_service = Arc::new(AuthService::new(config.auth.clone())?);
    match auth_service.mode() {
        AuthMode::None => {
            info!(
                "🔓 Authentication is disabled - all API requests act as owner '{}'",
                config.auth.default_owner
            );
        }
        AuthMode::Jwt => {
            info!("🔐 Bearer token authentication enabled");
        }
    }

    let api_router = api::create_api_router(
        Arc::clone(&storage),
        auth_service,
        config.short_code_max_length,
    );
    let redirect_router = redirect::create_redirect_router(
        Arc::clone(&storage),
        config.client_ip.clone(),
        config.redirect_status,
    );

    let api_addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("🚀 API server listening on http://{}", api_addr);

    let redirect_addr = format!(
        "{}:{}",
        config.redirect_server.host, config.redirect_server.port
    );
    let redirect_listener = tokio::net::TcpListener::bind(&redirect_addr).await?;
    info!(
        "🚀 Redirect server listening on http://{} (status {})",
        redirect_addr,
        config.redirect_status.status_code().as_u16()
    );

    // Run both servers concurrently
    tokio::try_join!(
        axum::serve(api_listener, api_router),
        axum::serve(
            redirect_listener,
            redirect_router.into_make_service_with_connect_info::<SocketAddr>(),
        ),
    )?;

    Ok(())
}
