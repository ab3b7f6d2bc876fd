//! Layout of the SQLite key/value file.
//!
//! The file holds a single `kv_entries` table. `PRAGMA user_version` records
//! the layout so a file written by a newer build is refused instead of misread.

use super::{StorageError, StorageResult};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Layout version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_ENTRIES: &str = "
CREATE TABLE IF NOT EXISTS kv_entries (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now') * 1000)
);";

/// Creates the table on a fresh file and checks the layout of an existing one.
pub(super) fn prepare(conn: &mut Connection, path: &Path) -> StorageResult<()> {
    let open_failed = |source: rusqlite::Error| StorageError::Open {
        path: path.to_path_buf(),
        source,
    };

    conn.busy_timeout(BUSY_TIMEOUT).map_err(open_failed)?;
    let found = layout_version(conn).map_err(open_failed)?;
    if found > SCHEMA_VERSION {
        return Err(StorageError::SchemaTooNew {
            path: path.to_path_buf(),
            found,
            supported: SCHEMA_VERSION,
        });
    }
    if found == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction().map_err(open_failed)?;
    tx.execute_batch(CREATE_ENTRIES).map_err(open_failed)?;
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)
        .map_err(open_failed)?;
    tx.commit().map_err(open_failed)
}

/// `PRAGMA user_version` of `conn`; zero for a file this crate never touched.
pub fn layout_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
}
