//! SQLite-backed implementation of `SnapshotSlot`.
//!
//! One row per key in a small versioned schema. The connection is
//! synchronous and guarded by a mutex; snapshot writes are small and happen
//! on the thread that owns the product store.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::{info, warn};

use super::{check_quota, SnapshotError, SnapshotSlot};

/// Current schema version. Increment this when making schema changes and add
/// corresponding migration logic in `run_migrations()`.
const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Default database file name inside the state directory.
pub const SNAPSHOT_DB_FILE: &str = "checkmaster-snapshot.db";

pub struct SqliteSlot {
    conn: Mutex<Connection>,
    quota: Option<usize>,
}

impl SqliteSlot {
    /// Open (or create) the snapshot database at `path`.
    ///
    /// Creates the parent directory and schema if they don't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let path_ref = path.as_ref();

        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SnapshotError::storage(
                        "create snapshot directory",
                        format!("{}: {}", parent.display(), e),
                    )
                })?;
            }
        }

        let conn = Connection::open(path_ref)
            .map_err(|e| SnapshotError::storage("open database", e.to_string()))?;
        info!("Opened snapshot database {}", path_ref.display());
        Self::from_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, SnapshotError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| SnapshotError::storage("open database", e.to_string()))?;
        Self::from_connection(conn)
    }

    /// Refuse any single value longer than `quota` bytes.
    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    fn from_connection(conn: Connection) -> Result<Self, SnapshotError> {
        conn.execute_batch("PRAGMA busy_timeout = 5000;")
            .map_err(|e| SnapshotError::storage("configure pragmas", e.to_string()))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                version INTEGER NOT NULL
            );
            "#,
        )
        .map_err(|e| SnapshotError::storage("create schema_version table", e.to_string()))?;

        // 0 if the table is empty, i.e. a fresh database
        let current_version: i64 = conn
            .query_row(
                "SELECT version FROM schema_version WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| SnapshotError::storage("get schema version", e.to_string()))?
            .unwrap_or(0);

        Self::run_migrations(&conn, current_version)?;

        Ok(Self {
            conn: Mutex::new(conn),
            quota: None,
        })
    }

    /// Run migrations from `from_version` to `CURRENT_SCHEMA_VERSION`.
    fn run_migrations(conn: &Connection, from_version: i64) -> Result<(), SnapshotError> {
        if from_version > CURRENT_SCHEMA_VERSION {
            return Err(SnapshotError::storage(
                "schema version",
                format!(
                    "Snapshot schema version {} is newer than supported version {}",
                    from_version, CURRENT_SCHEMA_VERSION
                ),
            ));
        }

        if from_version == CURRENT_SCHEMA_VERSION {
            return Ok(());
        }

        if from_version < 1 {
            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS snapshot_slots (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at INTEGER NOT NULL
                );
                "#,
            )
            .map_err(|e| SnapshotError::storage("migration v1", e.to_string()))?;
        }

        conn.execute(
            "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?1)",
            params![CURRENT_SCHEMA_VERSION],
        )
        .map_err(|e| SnapshotError::storage("update schema version", e.to_string()))?;

        Ok(())
    }
}

impl SnapshotSlot for SqliteSlot {
    fn read(&self, key: &str) -> Result<Option<String>, SnapshotError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SnapshotError::storage("read", e.to_string()))?;

        conn.query_row(
            "SELECT value FROM snapshot_slots WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| SnapshotError::storage("read", e.to_string()))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SnapshotError> {
        check_quota(self.quota, value)?;

        let conn = self
            .conn
            .lock()
            .map_err(|e| SnapshotError::storage("write", e.to_string()))?;

        conn.execute(
            "INSERT INTO snapshot_slots (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = excluded.updated_at",
            params![key, value, Utc::now().timestamp()],
        )
        .map_err(|e| match e.sqlite_error_code() {
            Some(ErrorCode::DiskFull) => {
                warn!("Snapshot database is full");
                SnapshotError::QuotaExceeded {
                    needed: value.len(),
                }
            }
            _ => SnapshotError::storage("write", e.to_string()),
        })?;

        Ok(())
    }
}
