//! Persistent slot for the session token
//!
//! The session guard is the only caller. Implementations:
//! - [`SqliteSlot`]: on-disk, used by the CLI
//! - [`MemorySlot`]: ephemeral, used in tests

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::error::StorageError;

/// Well-known key the token lives under.
pub const SESSION_SLOT_KEY: &str = "jwt";

/// Storage capability for a single string value.
pub trait TokenSlot: Send + Sync {
    fn get(&self) -> Result<Option<String>, StorageError>;
    fn set(&self, value: &str) -> Result<(), StorageError>;
    fn remove(&self) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemorySlot {
    value: Mutex<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-filled with a raw value, as if written by an earlier session.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }
}

impl TokenSlot for MemorySlot {
    fn get(&self) -> Result<Option<String>, StorageError> {
        Ok(self.value.lock().clone())
    }

    fn set(&self, value: &str) -> Result<(), StorageError> {
        *self.value.lock() = Some(value.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        *self.value.lock() = None;
        Ok(())
    }
}

/// Slot stored in a local SQLite database.
pub struct SqliteSlot {
    conn: Mutex<Connection>,
    key: String,
}

impl SqliteSlot {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS session_slot (
                slot TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
            key: SESSION_SLOT_KEY.to_string(),
        })
    }
}

impl TokenSlot for SqliteSlot {
    fn get(&self) -> Result<Option<String>, StorageError> {
        let conn = self.conn.lock();
        let value = conn
            .query_row(
                "SELECT value FROM session_slot WHERE slot = ?1",
                params![self.key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, value: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO session_slot (slot, value, updated_at) VALUES (?1, ?2, ?3)",
            params![self.key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM session_slot WHERE slot = ?1", params![self.key])?;
        Ok(())
    }
}
