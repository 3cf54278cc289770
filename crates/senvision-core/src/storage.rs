//! Key-value blob storage for the persisted cart.
//!
//! The cart only needs the browser's `localStorage` contract: read a string
//! under a key, write a string under a key. Two implementations are
//! provided:
//! - [`MemoryStore`] for tests and ephemeral sessions
//! - [`RedbStore`] for a durable single-file database

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use redb::{Database, TableDefinition};

use crate::error::{ShopError, ShopResult};

const BLOBS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("blobs");

/// Minimal string blob store (localStorage equivalent)
pub trait BlobStore {
    /// Read the value under `key`, `None` if absent.
    fn get(&self, key: &str) -> ShopResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> ShopResult<()>;
}

impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    fn get(&self, key: &str) -> ShopResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> ShopResult<()> {
        (**self).set(key, value)
    }
}

/// In-memory blob store
///
/// Can be switched into a failing mode where every read and write errors,
/// which mimics a browser with storage disabled or over quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose reads and writes always fail
    pub fn failing() -> Self {
        let store = Self::default();
        store.set_failing(true);
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Seed a raw value, bypassing the failure switch
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().insert(key.into(), value.into());
    }

    /// Peek at a raw value, bypassing the failure switch
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn check(&self) -> ShopResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ShopError::Storage("storage unavailable".to_string()));
        }
        Ok(())
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> ShopResult<Option<String>> {
        self.check()?;
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ShopResult<()> {
        self.check()?;
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Blob store backed by a redb database file
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<RwLock<Database>>,
}

impl RedbStore {
    /// Open (or create) the database at `path`.
    ///
    /// Creates parent directories and the blobs table if needed.
    pub fn open(path: impl AsRef<Path>) -> ShopResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(BLOBS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self {
            db: Arc::new(RwLock::new(db)),
        })
    }
}

impl BlobStore for RedbStore {
    fn get(&self, key: &str) -> ShopResult<Option<String>> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(BLOBS_TABLE)?;

        Ok(table.get(key)?.map(|v| v.value().to_string()))
    }

    fn set(&self, key: &str, value: &str) -> ShopResult<()> {
        let db = self.db.read();
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(BLOBS_TABLE)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (RedbStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("cart.redb");
        let store = RedbStore::open(&db_path).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_memory_store_get_and_set() {
        let store = MemoryStore::new();
        assert!(store.get("cart").unwrap().is_none());

        store.set("cart", "[]").unwrap();
        assert_eq!(store.get("cart").unwrap().as_deref(), Some("[]"));

        store.set("cart", "[1]").unwrap();
        assert_eq!(store.get("cart").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_failing_memory_store_errors() {
        let store = MemoryStore::failing();
        assert!(matches!(store.get("cart"), Err(ShopError::Storage(_))));
        assert!(store.set("cart", "[]").is_err());

        store.set_failing(false);
        store.set("cart", "[]").unwrap();
        assert_eq!(store.raw("cart").as_deref(), Some("[]"));
    }

    #[test]
    fn test_redb_store_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested/path/cart.redb");
        assert!(RedbStore::open(&db_path).is_ok());
        assert!(db_path.exists());
    }

    #[test]
    fn test_redb_store_get_and_set() {
        let (store, _temp) = create_test_store();
        assert!(store.get("senvision-cart").unwrap().is_none());

        store.set("senvision-cart", r#"[{"id":1}]"#).unwrap();
        assert_eq!(
            store.get("senvision-cart").unwrap().as_deref(),
            Some(r#"[{"id":1}]"#)
        );
    }

    #[test]
    fn test_redb_store_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("cart.redb");

        {
            let store = RedbStore::open(&db_path).unwrap();
            store.set("senvision-cart", "[]").unwrap();
        }

        {
            let store = RedbStore::open(&db_path).unwrap();
            assert_eq!(store.get("senvision-cart").unwrap().as_deref(), Some("[]"));
        }
    }
}
