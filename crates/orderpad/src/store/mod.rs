//! Storage layer for orderpad.
//!
//! The order list is persisted through an opaque key-value collaborator:
//! whole values are read and written as raw bytes under a string key. The
//! production backend keeps the bytes in a local `SQLite` database; an
//! in-memory implementation serves tests and throwaway sessions.

pub mod migrations;
pub mod schema;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// An opaque asynchronous key-value store.
///
/// The contract is deliberately small: no transactions spanning calls, no
/// partial-write guarantees, and no interpretation of the stored bytes.
#[async_trait]
pub trait KvStore: Send + Sync + std::fmt::Debug {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written.
    async fn set(&mut self, key: &str, value: &[u8]) -> Result<()>;
}

/// Key-value store backed by a local `SQLite` database.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    ///
    /// Wrapped in a `Mutex` so the store satisfies the `Sync` bound of
    /// [`KvStore`]; access is still serialized per operation as the design
    /// assumes, and the guard is never held across an `await`.
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get store statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StoreStats> {
        let keys: i64 = self
            .conn
            .lock()
            .expect("store mutex poisoned")
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))?;

        // Get database file size
        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StoreStats { keys, db_size_bytes })
    }
}

#[async_trait]
impl KvStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .conn
            .lock()
            .expect("store mutex poisoned")
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    async fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.conn.lock().expect("store mutex poisoned").execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        debug!("Wrote {} bytes under key '{}'", value.len(), key);
        Ok(())
    }
}

/// Statistics about a `SQLite`-backed store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of keys stored.
    pub keys: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

/// In-memory key-value store.
///
/// The reference model of the [`KvStore`] contract. Contents are discarded
/// on drop; tests and demos use this where persistence is not wanted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    async fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_open_in_memory() {
        let store = SqliteStore::open_in_memory();
        assert!(store.is_ok());
    }

    #[tokio::test]
    async fn test_sqlite_get_absent_key() {
        let store = SqliteStore::open_in_memory().unwrap();
        let value = store.get("clientes").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_sqlite_set_and_get() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        store.set("clientes", b"[]").await.unwrap();
        let value = store.get("clientes").await.unwrap();

        assert_eq!(value, Some(b"[]".to_vec()));
    }

    #[tokio::test]
    async fn test_sqlite_set_overwrites() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        store.set("clientes", b"first").await.unwrap();
        store.set("clientes", b"second").await.unwrap();

        let value = store.get("clientes").await.unwrap();
        assert_eq!(value, Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn test_sqlite_keys_are_independent() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        store.set("a", b"1").await.unwrap();
        store.set("b", b"2").await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get("b").await.unwrap(), Some(b"2".to_vec()));
    }

    #[tokio::test]
    async fn test_sqlite_empty_value() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        store.set("clientes", b"").await.unwrap();
        let value = store.get("clientes").await.unwrap();

        assert_eq!(value, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_sqlite_unicode_bytes() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let blob = r#"[{"nomeCliente":"João"}]"#.as_bytes();

        store.set("clientes", blob).await.unwrap();
        let value = store.get("clientes").await.unwrap();

        assert_eq!(value.as_deref(), Some(blob));
    }

    #[tokio::test]
    async fn test_sqlite_stats() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.stats().unwrap().keys, 0);

        store.set("clientes", b"[]").await.unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.keys, 1);
        assert_eq!(stats.db_size_bytes, 0); // in-memory database has no file
    }

    #[tokio::test]
    async fn test_sqlite_open_file_based() {
        let temp_dir = std::env::temp_dir();
        let db_path = temp_dir.join(format!("orderpad_test_{}.db", std::process::id()));

        {
            let mut store = SqliteStore::open(&db_path).unwrap();
            store.set("clientes", b"[]").await.unwrap();
            assert_eq!(store.path(), db_path);
        }

        // Reopen and verify the value survived
        let store = SqliteStore::open(&db_path).unwrap();
        assert_eq!(store.get("clientes").await.unwrap(), Some(b"[]".to_vec()));
        assert!(store.stats().unwrap().db_size_bytes > 0);

        drop(store);
        let _ = std::fs::remove_file(&db_path);
        let _ = std::fs::remove_file(db_path.with_extension("db-wal"));
        let _ = std::fs::remove_file(db_path.with_extension("db-shm"));
    }

    #[tokio::test]
    async fn test_sqlite_open_creates_parent_dirs() {
        let temp_dir = std::env::temp_dir();
        let nested_path = temp_dir.join(format!(
            "orderpad_test_{}/nested/orders.db",
            std::process::id()
        ));

        if let Some(parent) = nested_path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }

        let store = SqliteStore::open(&nested_path).unwrap();
        assert!(nested_path.exists());

        drop(store);
        if let Some(parent) = nested_path.parent() {
            let _ = std::fs::remove_dir_all(parent.parent().unwrap());
        }
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("clientes", b"[]").await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("clientes").await.unwrap(), Some(b"[]".to_vec()));
    }

    #[tokio::test]
    async fn test_memory_store_absent_key() {
        let store = MemoryStore::new();
        assert!(store.get("clientes").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_overwrites() {
        let mut store = MemoryStore::new();

        store.set("clientes", b"first").await.unwrap();
        store.set("clientes", b"second").await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("clientes").await.unwrap(), Some(b"second".to_vec()));
    }

    #[test]
    fn test_store_stats_debug() {
        let stats = StoreStats {
            keys: 1,
            db_size_bytes: 1024,
        };
        let debug_str = format!("{stats:?}");
        assert!(debug_str.contains("keys"));
        assert!(debug_str.contains("1024"));
    }
}
