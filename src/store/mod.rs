// Chat log store
//
// Append-only record of every answered chat exchange.
// - One row per exchange, never updated or deleted
// - Ids and timestamps are assigned here, not by callers
// - Reads return entries in insertion order

mod sqlite;

pub use sqlite::{DbLocation, SqliteLogStore};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single logged exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLogEntry {
    /// Unique ID assigned on write
    pub id: String,

    /// What the user asked
    pub user_input: String,

    /// What the gateway replied (possibly the fallback text)
    pub assistant_response: String,

    /// When the entry was written; never earlier than the previous entry
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid database url {0:?}: expected sqlite://<path>, sqlite::memory: or a file path")]
    InvalidUrl(String),

    #[error("failed to prepare database directory {path}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open chat log database {location}")]
    Open {
        location: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("chat log database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("refusing to log an exchange with empty user input")]
    EmptyInput,

    #[error("chat log timestamp out of range")]
    Timestamp,
}

/// Trait for chat log persistence
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Persist a new exchange and return it with its assigned id and timestamp.
    async fn append(
        &self,
        user_input: &str,
        assistant_response: &str,
    ) -> Result<ChatLogEntry, StoreError>;

    /// Every stored exchange, oldest first.
    async fn list_all(&self) -> Result<Vec<ChatLogEntry>, StoreError>;

    /// Number of stored exchanges
    async fn count(&self) -> Result<usize, StoreError>;
}
