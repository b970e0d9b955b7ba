//! Key-value persistence contract.
//!
//! # Responsibility
//! - Define the opaque string store the core reads from and writes to.
//! - Provide an in-memory backend and a SQLite-backed one.
//!
//! # Invariants
//! - Backends are dumb: no parsing, validation or schema knowledge of the
//!   values they hold. Serialization lives in the stores.
//! - A failed `set` leaves the previous value readable.

use crate::db::DbError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

mod sqlite;

pub use sqlite::SqliteKeyValueStore;

pub type KvResult<T> = Result<T, KvError>;

/// Storage-level failure reported by a backend.
#[derive(Debug)]
pub enum KvError {
    Db(DbError),
    /// Backend-specific failure without a richer source.
    Unavailable(String),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "key-value store unavailable: {message}"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for KvError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String key-value store used for task and profile blobs.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> KvResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> KvResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        (**self).set(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        (**self).set(key, value)
    }
}

/// Shared handle so a task store and a profile store can use one backend.
impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<RefCell<S>> {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        self.try_borrow()
            .map_err(|_| KvError::Unavailable("backend is already mutably borrowed".to_string()))?
            .get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        self.try_borrow_mut()
            .map_err(|_| KvError::Unavailable("backend is already borrowed".to_string()))?
            .set(key, value)
    }
}

/// Process-local backend; contents vanish with the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryKeyValueStore {
    entries: HashMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the raw stored value, bypassing the `Result` wrapper.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, MemoryKeyValueStore};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn memory_store_overwrites_existing_key() {
        let mut store = MemoryKeyValueStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn shared_handle_writes_are_visible_to_every_clone() {
        let shared = Rc::new(RefCell::new(MemoryKeyValueStore::new()));
        let mut writer = Rc::clone(&shared);
        let reader = Rc::clone(&shared);

        writer.set("todos", "[]").unwrap();
        assert_eq!(reader.get("todos").unwrap().as_deref(), Some("[]"));
    }
}
