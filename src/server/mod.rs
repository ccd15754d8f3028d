// Chat gateway - HTTP server module
// Serves /api/chat and /api/logs over the inference backend and chat log store

mod errors;
mod handlers;
mod types;

pub use errors::ApiError;
pub use handlers::{create_router, handle_chat, handle_logs, health_check, FALLBACK_REPLY};
pub use types::{ChatRequest, ChatResponse, ErrorBody, HealthResponse, LogsResponse};

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::inference::InferenceBackend;
use crate::store::LogStore;

/// Services shared by every request.
///
/// Built once at startup and read-only afterwards; cloning only bumps
/// reference counts.
#[derive(Clone)]
pub struct GatewayState {
    inference: Arc<dyn InferenceBackend>,
    store: Arc<dyn LogStore>,
}

impl GatewayState {
    pub fn new(inference: Arc<dyn InferenceBackend>, store: Arc<dyn LogStore>) -> Self {
        Self { inference, store }
    }

    /// Get reference to the inference backend
    pub fn inference(&self) -> &Arc<dyn InferenceBackend> {
        &self.inference
    }

    /// Get reference to the chat log store
    pub fn store(&self) -> &Arc<dyn LogStore> {
        &self.store
    }
}

/// Main gateway server structure
pub struct GatewayServer {
    bind_address: String,
    state: GatewayState,
}

impl GatewayServer {
    pub fn new(bind_address: impl Into<String>, state: GatewayState) -> Self {
        Self {
            bind_address: bind_address.into(),
            state,
        }
    }

    /// Start the HTTP server and run until Ctrl-C or SIGTERM.
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self
            .bind_address
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.bind_address))?;

        let app = create_router(self.state);

        tracing::info!("Starting chat gateway on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Chat gateway stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
