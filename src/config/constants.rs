// Project-wide constants
//
// Centralised here so port numbers and other magic values have one
// source of truth. Import via `use crate::config::constants::*;`.

/// Default bind address for the gateway (all interfaces).
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Default chat log database, relative to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://chat_logs.db";

/// Default inference backend host (the compose service name).
pub const DEFAULT_MODEL_HOST: &str = "ollama";

/// Default inference backend port. Ollama listens on 11434.
pub const DEFAULT_MODEL_PORT: u16 = 11434;

/// Model asked for answers unless `MODEL_NAME` says otherwise.
pub const DEFAULT_MODEL_NAME: &str = "llama3.2";

/// Upper bound on a single inference call, in seconds.
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 60;

/// Largest request body the gateway will read (1MB).
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;
