// HTTP handlers and routing

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::errors::ApiError;
use super::types::{ChatRequest, ChatResponse, HealthResponse, LogsResponse};
use super::GatewayState;
use crate::config::constants::MAX_REQUEST_BODY_BYTES;

/// Reply sent (and logged) when the backend has no candidate answer.
pub const FALLBACK_REPLY: &str = "I'm sorry, I don't have an answer to that.";

/// Build the Axum router with all routes and middleware.
pub fn create_router(state: GatewayState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/chat", post(handle_chat))
        .route("/api/logs", get(handle_logs))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// POST /api/chat
///
/// Validate, ask the backend, log the exchange, reply. The exchange is only
/// logged once an answer exists, and the reply is only returned once the
/// exchange is logged.
pub async fn handle_chat(
    State(state): State<GatewayState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let body = body.map_err(|e| {
        tracing::warn!(error = %e, "Rejected unreadable chat body");
        ApiError::from(e)
    })?;
    let ChatRequest { message } = ChatRequest::from_body(&body)?;

    let reply = match state.inference().answer(&message).await {
        Ok(answer) => answer.or_fallback(FALLBACK_REPLY),
        Err(e) => {
            tracing::warn!(error = %e, "Inference failed, exchange not logged");
            return Err(e.into());
        }
    };

    let entry = state
        .store()
        .append(&message, &reply)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to log chat exchange, discarding reply");
            ApiError::from(e)
        })?;

    tracing::debug!(id = %entry.id, "Chat exchange logged");

    Ok(Json(ChatResponse { reply }))
}

/// GET /api/logs
pub async fn handle_logs(State(state): State<GatewayState>) -> Result<Json<LogsResponse>, ApiError> {
    let logs = state.store().list_all().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to read chat logs");
        ApiError::from(e)
    })?;

    Ok(Json(LogsResponse { logs }))
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
