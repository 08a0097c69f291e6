use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, params};

use crate::error::{Result, StoreError};

/// Persistent key-value capability the quota tracker and reading history
/// are built on.
///
/// Implementations must tolerate concurrent external mutation (another
/// process sharing the same file) and are allowed to fail; callers treat
/// failures as non-fatal and degrade to in-memory state.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// SQLite-backed store: one `kv` table, WAL mode, busy timeout so
/// concurrent instances coexist rather than erroring out.
pub struct SqliteKv {
    conn: Connection,
}

impl SqliteKv {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        initialize(&conn)?;
        Ok(Self { conn })
    }
}

fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;
    Ok(())
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let value = stmt.query_row([key], |row| row.get(0)).ok();
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }
}

/// In-memory store for tests and non-interactive contexts. Clones share
/// the same map, mirroring how separate browser tabs share one
/// localStorage area.
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    map: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self
            .map
            .lock()
            .map_err(|_| StoreError::InvalidData("poisoned store lock".to_string()))?;
        Ok(map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut map = self
            .map
            .lock()
            .map_err(|_| StoreError::InvalidData("poisoned store lock".to_string()))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut map = self
            .map
            .lock()
            .map_err(|_| StoreError::InvalidData("poisoned store lock".to_string()))?;
        map.remove(key);
        Ok(())
    }
}

/// A store whose every operation fails. Test double for asserting
/// degraded-persistence behavior (private browsing, quota exceeded).
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingKv;

impl KvStore for FailingKv {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(StoreError::InvalidData("storage unavailable".to_string()))
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
        Err(StoreError::InvalidData("storage unavailable".to_string()))
    }

    fn remove(&mut self, _key: &str) -> Result<()> {
        Err(StoreError::InvalidData("storage unavailable".to_string()))
    }
}
