use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use std::fs::create_dir_all;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::error::StoreError;

/// Asynchronous string key-value store, the only persistence the app needs.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove_item(&self, key: &str) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            if !dir.is_dir() {
                if let Err(e) = create_dir_all(dir) {
                    log::error!("Could not create store directory {:?}: {}", dir, e);
                }
            }
        }
        log::info!("Opening key-value store at {:?}", path);
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        log::info!("Opening in-memory key-value store");
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            (),
        )?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let db = self.lock()?;
        let value = db
            .query_row("SELECT value FROM kv WHERE key = ?1", (key,), |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let db = self.lock()?;
        db.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, value),
        )?;
        log::debug!("Stored {} bytes under {}", value.len(), key);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        let db = self.lock()?;
        db.execute("DELETE FROM kv WHERE key = ?1", (key,))?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let db = self.lock()?;
        db.execute("DELETE FROM kv", ())?;
        Ok(())
    }
}
