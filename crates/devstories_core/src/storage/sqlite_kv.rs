//! SQLite-backed key/value store.
//!
//! # Invariants
//! - All access goes through one connection guarded by a mutex.
//! - `kv_entries.key` is the primary key; writes are upserts.
//! - No entry is read or written before `schema::prepare` succeeds.

use super::{schema, KeyValueStore, StorageError, StorageResult};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

/// Location reported for stores opened with [`SqliteKeyValueStore::open_in_memory`].
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Durable key/value store over one SQLite file.
pub struct SqliteKeyValueStore {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteKeyValueStore {
    /// Opens (or creates) the store file at `path`.
    ///
    /// # Errors
    /// - `Open` when the file cannot be opened or its table created.
    /// - `SchemaTooNew` when the file was written by a newer build.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        Self::bootstrap(path, Connection::open(path))
    }

    /// Opens a store whose entries live only as long as this value.
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::bootstrap(Path::new(IN_MEMORY_PATH), Connection::open_in_memory())
    }

    /// File backing this store, or [`IN_MEMORY_PATH`].
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn bootstrap(path: &Path, opened: rusqlite::Result<Connection>) -> StorageResult<Self> {
        let started_at = Instant::now();
        let prepared = opened
            .map_err(|source| StorageError::Open {
                path: path.to_path_buf(),
                source,
            })
            .and_then(|mut conn| schema::prepare(&mut conn, path).map(|()| conn));

        match prepared {
            Ok(conn) => {
                info!(
                    "event=storage_open module=storage status=ok path={} schema_version={} duration_ms={}",
                    path.display(),
                    schema::SCHEMA_VERSION,
                    started_at.elapsed().as_millis()
                );
                Ok(Self {
                    conn: Mutex::new(conn),
                    path: path.to_path_buf(),
                })
            }
            Err(err) => {
                error!(
                    "event=storage_open module=storage status=error path={} duration_ms={} error={}",
                    path.display(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        conn.execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}
