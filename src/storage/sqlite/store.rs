//! `SQLite`-backed record store.

use super::{acquire_lock, configure_connection, record_operation_metrics};
use crate::models::{Fingerprint, PostRecord, StoreStats};
use crate::storage::traits::RecordStore;
use crate::{Error, Result};
use rusqlite::{Connection, params};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use tracing::instrument;

const BACKEND: &str = "sqlite";

/// Durable record store on a single `SQLite` table.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE posts (
///     fingerprint   TEXT PRIMARY KEY,
///     item_id       TEXT NOT NULL,
///     title         TEXT NOT NULL,
///     channel       TEXT NOT NULL,
///     created_at    INTEGER NOT NULL,
///     first_seen_at INTEGER NOT NULL
/// )
/// ```
///
/// The primary key gives `exists` an indexed point lookup. Inserts use
/// `INSERT OR IGNORE`, so a repeated fingerprint is a silent no-op.
///
/// # Concurrency Model
///
/// One `Mutex<Connection>` per store. The store assumes a single writing
/// process; separate collector instances must not share a database file.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SqliteRecordStore {
    /// Opens (or creates) the store at `db_path`.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the directory, database or schema
    /// cannot be created. Callers treat this as fatal.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::operation("create_db_dir", format!("{}: {e}", parent.display())))?;
        }

        let conn = Connection::open(&db_path).map_err(|e| Error::OperationFailed {
            operation: "open_sqlite".to_string(),
            cause: format!("{}: {e}", db_path.display()),
        })?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path),
        };
        store.initialize()?;
        tracing::info!(path = ?store.db_path, "Record store opened");
        Ok(store)
    }

    /// Creates an in-memory store (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::operation("open_sqlite_in_memory", e))?;
        let store = Self {
            conn: Mutex::new(conn),
            db_path: None,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn initialize(&self) -> Result<()> {
        let conn = acquire_lock(&self.conn);
        configure_connection(&conn)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS posts (
                fingerprint TEXT PRIMARY KEY,
                item_id TEXT NOT NULL,
                title TEXT NOT NULL,
                channel TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                first_seen_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_posts_channel ON posts(channel);
            CREATE INDEX IF NOT EXISTS idx_posts_first_seen ON posts(first_seen_at);",
        )
        .map_err(|e| Error::operation("create_posts_table", e))
    }

    fn finish<T>(operation: &'static str, start: Instant, result: Result<T>) -> Result<T> {
        let status = if result.is_ok() { "success" } else { "error" };
        record_operation_metrics(BACKEND, operation, start, status);
        result
    }
}

impl RecordStore for SqliteRecordStore {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    #[instrument(skip(self), fields(fingerprint = %fingerprint.short()))]
    fn exists(&self, fingerprint: &Fingerprint) -> Result<bool> {
        let start = Instant::now();
        let result = {
            let conn = acquire_lock(&self.conn);
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM posts WHERE fingerprint = ?1)",
                params![fingerprint.as_str()],
                |row| row.get::<_, bool>(0),
            )
            .map_err(|e| Error::operation("exists_post", e))
        };
        Self::finish("exists", start, result)
    }

    #[instrument(skip(self, record), fields(fingerprint = %record.fingerprint.short(), item_id = %record.item_id))]
    fn insert(&self, record: &PostRecord) -> Result<bool> {
        let start = Instant::now();
        let result = {
            let conn = acquire_lock(&self.conn);
            conn.execute(
                "INSERT OR IGNORE INTO posts
                    (fingerprint, item_id, title, channel, created_at, first_seen_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.fingerprint.as_str(),
                    record.item_id,
                    record.title,
                    record.channel,
                    record.created_at,
                    record.first_seen_at,
                ],
            )
            .map(|changed| changed > 0)
            .map_err(|e| Error::operation("insert_post", e))
        };
        Self::finish("insert", start, result)
    }

    fn load_all_fingerprints(&self) -> Result<Vec<Fingerprint>> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);
            let mut stmt = conn
                .prepare("SELECT fingerprint FROM posts")
                .map_err(|e| Error::operation("prepare_load_fingerprints", e))?;
            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(|e| Error::operation("load_fingerprints", e))?;
            rows.map(|row| {
                row.map(Fingerprint::new)
                    .map_err(|e| Error::operation("load_fingerprints", e))
            })
            .collect::<Result<Vec<_>>>()
        })();
        Self::finish("load_all", start, result)
    }

    fn stats(&self) -> Result<StoreStats> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);
            let (total, oldest, newest) = conn
                .query_row(
                    "SELECT COUNT(*), MIN(first_seen_at), MAX(first_seen_at) FROM posts",
                    [],
                    |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, Option<i64>>(1)?,
                            row.get::<_, Option<i64>>(2)?,
                        ))
                    },
                )
                .map_err(|e| Error::operation("stats_totals", e))?;

            let mut stmt = conn
                .prepare("SELECT channel, COUNT(*) FROM posts GROUP BY channel")
                .map_err(|e| Error::operation("prepare_stats_by_channel", e))?;
            let by_channel: BTreeMap<String, u64> = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
                .map_err(|e| Error::operation("stats_by_channel", e))?
                .map(|row| {
                    row.map(|(channel, count)| (channel, u64::try_from(count).unwrap_or(0)))
                        .map_err(|e| Error::operation("stats_by_channel", e))
                })
                .collect::<Result<_>>()?;

            Ok(StoreStats {
                total: u64::try_from(total).unwrap_or(0),
                by_channel,
                oldest_first_seen: oldest,
                newest_first_seen: newest,
            })
        })();
        Self::finish("stats", start, result)
    }

    fn count(&self) -> Result<u64> {
        let start = Instant::now();
        let result = {
            let conn = acquire_lock(&self.conn);
            conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get::<_, i64>(0))
                .map(|n| u64::try_from(n).unwrap_or(0))
                .map_err(|e| Error::operation("count_posts", e))
        };
        Self::finish("count", start, result)
    }
}
