// SQLite-backed chat log store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{ChatLogEntry, LogStore, StoreError};

/// Where the database lives, parsed from `DATABASE_URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    Memory,
    File(PathBuf),
}

impl DbLocation {
    /// Accepts `sqlite://<path>`, `sqlite:<path>`, `sqlite::memory:`,
    /// `:memory:` or a bare file path. Other schemes are rejected.
    pub fn parse(url: &str) -> Result<Self, StoreError> {
        let url = url.trim();
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);

        if path == ":memory:" {
            return Ok(DbLocation::Memory);
        }
        if path.is_empty() || path.contains("://") {
            return Err(StoreError::InvalidUrl(url.to_string()));
        }
        Ok(DbLocation::File(PathBuf::from(path)))
    }
}

impl fmt::Display for DbLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbLocation::Memory => write!(f, ":memory:"),
            DbLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Chat log store over a single SQLite connection
pub struct SqliteLogStore {
    db: Arc<Mutex<Connection>>,
    location: DbLocation,
}

impl SqliteLogStore {
    /// Open (or create) the store described by `database_url`.
    pub fn open(database_url: &str) -> Result<Self, StoreError> {
        let location = DbLocation::parse(database_url)?;

        let conn = match &location {
            DbLocation::Memory => Connection::open_in_memory(),
            DbLocation::File(path) => {
                // Ensure directory exists
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|source| StoreError::Directory {
                        path: parent.display().to_string(),
                        source,
                    })?;
                }
                Connection::open(path)
            }
        }
        .map_err(|source| StoreError::Open {
            location: location.to_string(),
            source,
        })?;

        if matches!(location, DbLocation::File(_)) {
            // Enable WAL mode so reads don't block the writer
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        }

        conn.execute_batch(include_str!("schema.sql"))?;

        tracing::info!("Chat log store initialized: {}", location);

        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
            location,
        })
    }

    /// Private in-memory store; contents vanish on drop.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::open(":memory:")
    }

    pub fn location(&self) -> &DbLocation {
        &self.location
    }
}

#[async_trait]
impl LogStore for SqliteLogStore {
    async fn append(
        &self,
        user_input: &str,
        assistant_response: &str,
    ) -> Result<ChatLogEntry, StoreError> {
        if user_input.trim().is_empty() {
            return Err(StoreError::EmptyInput);
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now()
            .timestamp_nanos_opt()
            .ok_or(StoreError::Timestamp)?;

        let conn = self.db.lock().await;

        // Clamp to the newest stored entry so timestamps never go backwards,
        // even if the wall clock does.
        let newest: Option<i64> =
            conn.query_row("SELECT MAX(created_at) FROM chat_logs", [], |row| row.get(0))?;
        let created_at = newest.map_or(now, |newest| now.max(newest));

        conn.execute(
            "INSERT INTO chat_logs (id, user_input, assistant_response, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![&id, user_input, assistant_response, created_at],
        )?;

        tracing::debug!(id = %id, "Appended chat log entry");

        Ok(ChatLogEntry {
            id,
            user_input: user_input.to_string(),
            assistant_response: assistant_response.to_string(),
            timestamp: DateTime::from_timestamp_nanos(created_at),
        })
    }

    async fn list_all(&self) -> Result<Vec<ChatLogEntry>, StoreError> {
        let conn = self.db.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, user_input, assistant_response, created_at FROM chat_logs
             ORDER BY seq ASC",
        )?;

        let entries = stmt
            .query_map([], |row| {
                Ok(ChatLogEntry {
                    id: row.get(0)?,
                    user_input: row.get(1)?,
                    assistant_response: row.get(2)?,
                    timestamp: DateTime::from_timestamp_nanos(row.get(3)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Listed {} chat log entries", entries.len());

        Ok(entries)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let conn = self.db.lock().await;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chat_logs", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
