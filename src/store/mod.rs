//! Transactional key-value storage over hierarchical buckets.
//!
//! A unit of work is a closure handed a transaction. `view` runs it against a consistent
//! snapshot; `update` runs it exclusively and commits only if it returns `Ok`.

mod memory;
pub mod migration;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("bucket '{0}' does not exist")]
    MissingBucket(String),
    #[error("bucket '{0}' already exists")]
    BucketExists(String),
    #[error("store lock poisoned")]
    Poisoned,
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

/// Read access inside a transaction. Bucket paths are hierarchical, e.g.
/// `["leagues", "<id>", "games"]`.
pub trait ReadTx {
    fn has_bucket(&self, path: &[&str]) -> Result<bool, StoreError>;
    fn get(&self, path: &[&str], key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    /// Every key/value pair in the bucket, ordered by key.
    fn entries(&self, path: &[&str]) -> Result<Vec<(String, Vec<u8>)>, StoreError>;
    /// Names of the bucket's direct child buckets, ordered.
    fn buckets(&self, path: &[&str]) -> Result<Vec<String>, StoreError>;
}

/// Write access inside an exclusive transaction.
pub trait WriteTx: ReadTx {
    /// Fails with `BucketExists` if present, `MissingBucket` if the parent is absent.
    fn create_bucket(&mut self, path: &[&str]) -> Result<(), StoreError>;
    fn create_bucket_if_absent(&mut self, path: &[&str]) -> Result<(), StoreError>;
    fn put(&mut self, path: &[&str], key: &str, value: &[u8]) -> Result<(), StoreError>;
}

pub trait Store: Send + Sync {
    /// Run `f` against a snapshot. Never blocks writers.
    fn view<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn ReadTx) -> Result<T, E>,
        E: From<StoreError>;

    /// Run `f` as the only writer. Commits on `Ok`; on `Err` nothing is written.
    fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn WriteTx) -> Result<T, E>,
        E: From<StoreError>;
}

pub(crate) fn join_path(path: &[&str]) -> String {
    path.join("/")
}

/// Path of the parent bucket, or None for a top-level bucket.
pub(crate) fn parent_path(path: &[&str]) -> Option<String> {
    match path.len() {
        0 | 1 => None,
        n => Some(join_path(&path[..n - 1])),
    }
}
