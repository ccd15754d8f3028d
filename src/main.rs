// Chat gateway - main entry point

use anyhow::{Context, Result};
use std::sync::Arc;

use chat_gateway::config::GatewayConfig;
use chat_gateway::inference::OllamaClient;
use chat_gateway::server::{GatewayServer, GatewayState};
use chat_gateway::store::{LogStore, SqliteLogStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (structured logging).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_gateway=info,tower_http=info".into()),
        )
        .init();

    let config = GatewayConfig::from_env().context("Invalid configuration")?;

    // No inference path, no server.
    let inference = OllamaClient::new(&config.model)
        .context("Refusing to start without an inference backend")?;

    let store = SqliteLogStore::open(&config.database_url)
        .with_context(|| format!("Failed to open chat log store at {}", config.database_url))?;
    tracing::info!(
        "Chat log at {} holds {} entries",
        store.location(),
        store.count().await?
    );

    let endpoint = inference.endpoint().clone();
    let state = GatewayState::new(Arc::new(inference), Arc::new(store));

    tracing::info!(
        "chat-gateway v{} using model {} at {}",
        env!("CARGO_PKG_VERSION"),
        state.inference().model_name(),
        endpoint
    );

    GatewayServer::new(config.bind_address, state).serve().await
}
