//! mistletoe server entry point.
//!
//! Starts the Axum HTTP server that receives chat platform webhooks,
//! backed by PostgreSQL.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use mistletoe::api;
use mistletoe::app_state::AppState;
use mistletoe::chat::{Membership, Messenger, RestChatClient};
use mistletoe::config::BotConfig;
use mistletoe::persistence::{EventStore, PostgresStore};
use mistletoe::service::{Closer, Notifier, Registry, Relay};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = BotConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting mistletoe");

    // Connect to PostgreSQL and run migrations
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    let store: Arc<dyn EventStore> = Arc::new(PostgresStore::new(pool));

    // Chat platform client, shared by membership lookups and DMs
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.chat_api_timeout_secs))
        .build()?;
    let chat = Arc::new(RestChatClient::new(
        http,
        config.chat_api_base_url.clone(),
        config.chat_bot_token.clone(),
    ));

    // Build service layer
    let notifier = Arc::new(Notifier::new(
        Arc::clone(&chat) as Arc<dyn Membership>,
        Arc::clone(&chat) as Arc<dyn Messenger>,
    ));
    let registry = Arc::new(Registry::new(Arc::clone(&store)));
    let closer = Arc::new(Closer::new(
        Arc::clone(&store),
        Arc::clone(&chat) as Arc<dyn Membership>,
        Arc::clone(&notifier),
    ));
    let relay = Arc::new(Relay::new(
        Arc::clone(&store),
        Arc::clone(&chat) as Arc<dyn Messenger>,
    ));

    // Build application state
    let app_state = AppState {
        registry,
        closer,
        relay,
        notifier,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
