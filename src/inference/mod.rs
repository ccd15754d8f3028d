// Inference backend abstraction
//
// One query in, one answer out. The gateway only talks to
// `InferenceBackend`; `OllamaClient` is the production implementation.

mod ollama;
mod types;

pub use ollama::OllamaClient;
pub use types::{GenerateRequest, GenerateResponse};

use async_trait::async_trait;
use thiserror::Error;

/// Outcome of a successful round trip to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// The backend produced a candidate answer
    Text(String),
    /// The backend answered but had nothing to say
    Empty,
}

impl Answer {
    /// Classify raw backend output. Blank text counts as no candidate.
    pub fn from_candidate(text: Option<String>) -> Self {
        match text {
            Some(text) if !text.trim().is_empty() => Answer::Text(text),
            _ => Answer::Empty,
        }
    }

    /// The answer text, or `fallback` when the backend had none.
    pub fn or_fallback(self, fallback: &str) -> String {
        match self {
            Answer::Text(text) => text,
            Answer::Empty => fallback.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum InferenceError {
    /// The client could not be constructed; the gateway must not start.
    #[error("inference backend could not be initialized: {0}")]
    Startup(String),

    /// Network failure, timeout, error status or malformed body.
    #[error("inference backend unavailable: {0}")]
    Unavailable(String),
}

/// Trait for inference backends
///
/// Implementations send exactly one request per call: no retries,
/// no streaming.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Ask the backend for an answer to `query`.
    async fn answer(&self, query: &str) -> Result<Answer, InferenceError>;

    /// Model identifier sent with every request
    fn model_name(&self) -> &str;
}
