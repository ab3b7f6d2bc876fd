//! Local key-value storage used by fallback mode and credential lookup.
//!
//! # Responsibility
//! - Define the string key/value capability the article fallback persists into.
//! - Provide a durable SQLite implementation and an in-process implementation.
//!
//! # Invariants
//! - `set` replaces any previous value for the same key.
//! - Values are opaque text; callers own (de)serialization.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod memory;
pub mod schema;
mod sqlite_kv;

pub use memory::MemoryKeyValueStore;
pub use sqlite_kv::{SqliteKeyValueStore, IN_MEMORY_PATH};

/// Key holding the JSON-serialized article collection.
pub const ARTICLES_KEY: &str = "devstories_articles";
/// Key holding the bearer credential attached to remote requests.
pub const TOKEN_KEY: &str = "token";

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-layer failure.
#[derive(Debug)]
pub enum StorageError {
    /// The store file could not be opened or prepared.
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    /// The file carries a layout version this build does not know.
    SchemaTooNew {
        path: PathBuf,
        found: u32,
        supported: u32,
    },
    /// A read or write against an open store failed.
    Sqlite(rusqlite::Error),
    /// The backing store lock was poisoned by a panicking writer.
    Poisoned,
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "failed to open storage `{}`: {source}", path.display())
            }
            Self::SchemaTooNew {
                path,
                found,
                supported,
            } => write!(
                f,
                "storage `{}` has layout version {found}, newer than supported {supported}",
                path.display()
            ),
            Self::Sqlite(err) => write!(f, "storage query failed: {err}"),
            Self::Poisoned => write!(f, "storage lock poisoned"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } | Self::Poisoned => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// String key/value capability.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

/// Opens SQLite storage at `path`, or an in-memory SQLite store when `None`.
pub fn open_storage(path: Option<&Path>) -> StorageResult<Arc<dyn KeyValueStore>> {
    let store = match path {
        Some(path) => SqliteKeyValueStore::open(path)?,
        None => SqliteKeyValueStore::open_in_memory()?,
    };
    Ok(Arc::new(store))
}
