//! SQLite-backed store: one file, WAL journaling, pooled connections.

use crate::store::{join_path, parent_path, ReadTx, Store, StoreError, WriteTx};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS buckets (
    path   TEXT PRIMARY KEY,
    parent TEXT NOT NULL,
    name   TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS buckets_parent ON buckets (parent);
CREATE TABLE IF NOT EXISTS entries (
    bucket TEXT NOT NULL,
    key    TEXT NOT NULL,
    value  BLOB NOT NULL,
    PRIMARY KEY (bucket, key)
);
";

/// Store persisted to a SQLite file.
///
/// Read units run in deferred transactions, which see a stable WAL snapshot and don't
/// block the writer. Write units use `BEGIN IMMEDIATE`, so at most one is in flight.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::file(path.as_ref()).with_init(|conn| {
            conn.busy_timeout(Duration::from_secs(5))?;
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
            Ok(())
        });
        let pool = r2d2::Pool::builder().build(manager)?;
        pool.get()?.execute_batch(SCHEMA)?;
        log::debug!("opened sqlite store at {}", path.as_ref().display());
        Ok(Self { pool })
    }
}

impl Store for SqliteStore {
    fn view<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn ReadTx) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut conn = self.pool.get().map_err(StoreError::from)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Deferred)
            .map_err(StoreError::from)?;
        // Dropping the transaction rolls it back; a reader never writes.
        let reader = SqliteTx { conn: &tx };
        f(&reader)
    }

    fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn WriteTx) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut conn = self.pool.get().map_err(StoreError::from)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;
        let out = f(&mut SqliteTx { conn: &tx })?;
        tx.commit().map_err(StoreError::from)?;
        Ok(out)
    }
}

struct SqliteTx<'a> {
    conn: &'a Connection,
}

impl SqliteTx<'_> {
    fn require_bucket(&self, name: &str) -> Result<(), StoreError> {
        if self.bucket_exists(name)? {
            Ok(())
        } else {
            Err(StoreError::MissingBucket(name.to_string()))
        }
    }

    fn bucket_exists(&self, name: &str) -> Result<bool, StoreError> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM buckets WHERE path = ?1", params![name], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }
}

impl ReadTx for SqliteTx<'_> {
    fn has_bucket(&self, path: &[&str]) -> Result<bool, StoreError> {
        self.bucket_exists(&join_path(path))
    }

    fn get(&self, path: &[&str], key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let name = join_path(path);
        self.require_bucket(&name)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM entries WHERE bucket = ?1 AND key = ?2",
                params![name, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn entries(&self, path: &[&str]) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let name = join_path(path);
        self.require_bucket(&name)?;
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM entries WHERE bucket = ?1 ORDER BY key")?;
        let rows = stmt
            .query_map(params![name], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn buckets(&self, path: &[&str]) -> Result<Vec<String>, StoreError> {
        let name = join_path(path);
        if !path.is_empty() {
            self.require_bucket(&name)?;
        }
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM buckets WHERE parent = ?1 ORDER BY name")?;
        let rows = stmt
            .query_map(params![name], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
    }
}

impl WriteTx for SqliteTx<'_> {
    fn create_bucket(&mut self, path: &[&str]) -> Result<(), StoreError> {
        let name = join_path(path);
        if self.bucket_exists(&name)? {
            return Err(StoreError::BucketExists(name));
        }
        self.create_bucket_if_absent(path)
    }

    fn create_bucket_if_absent(&mut self, path: &[&str]) -> Result<(), StoreError> {
        let parent = parent_path(path).unwrap_or_default();
        if !parent.is_empty() {
            self.require_bucket(&parent)?;
        }
        let leaf = path.last().copied().unwrap_or_default();
        self.conn.execute(
            "INSERT OR IGNORE INTO buckets (path, parent, name) VALUES (?1, ?2, ?3)",
            params![join_path(path), parent, leaf],
        )?;
        Ok(())
    }

    fn put(&mut self, path: &[&str], key: &str, value: &[u8]) -> Result<(), StoreError> {
        let name = join_path(path);
        self.require_bucket(&name)?;
        self.conn.execute(
            "INSERT INTO entries (bucket, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT (bucket, key) DO UPDATE SET value = excluded.value",
            params![name, key, value],
        )?;
        Ok(())
    }
}
