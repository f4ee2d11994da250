//! In-memory store with copy-on-write snapshots.

use crate::store::{join_path, parent_path, ReadTx, Store, StoreError, WriteTx};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock};

/// Bucket path -> (key -> value).
#[derive(Clone, Debug, Default)]
struct Tables(BTreeMap<String, BTreeMap<String, Vec<u8>>>);

impl Tables {
    fn bucket(&self, path: &[&str]) -> Result<&BTreeMap<String, Vec<u8>>, StoreError> {
        let name = join_path(path);
        self.0.get(&name).ok_or(StoreError::MissingBucket(name))
    }
}

impl ReadTx for Tables {
    fn has_bucket(&self, path: &[&str]) -> Result<bool, StoreError> {
        Ok(self.0.contains_key(&join_path(path)))
    }

    fn get(&self, path: &[&str], key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.bucket(path)?.get(key).cloned())
    }

    fn entries(&self, path: &[&str]) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        Ok(self
            .bucket(path)?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn buckets(&self, path: &[&str]) -> Result<Vec<String>, StoreError> {
        let prefix = if path.is_empty() {
            String::new()
        } else {
            self.bucket(path)?;
            format!("{}/", join_path(path))
        };
        Ok(self
            .0
            .keys()
            .filter_map(|name| name.strip_prefix(&prefix))
            .filter(|rest| !rest.is_empty() && !rest.contains('/'))
            .map(str::to_string)
            .collect())
    }
}

impl WriteTx for Tables {
    fn create_bucket(&mut self, path: &[&str]) -> Result<(), StoreError> {
        let name = join_path(path);
        if self.0.contains_key(&name) {
            return Err(StoreError::BucketExists(name));
        }
        self.create_bucket_if_absent(path)
    }

    fn create_bucket_if_absent(&mut self, path: &[&str]) -> Result<(), StoreError> {
        if let Some(parent) = parent_path(path) {
            if !self.0.contains_key(&parent) {
                return Err(StoreError::MissingBucket(parent));
            }
        }
        self.0.entry(join_path(path)).or_default();
        Ok(())
    }

    fn put(&mut self, path: &[&str], key: &str, value: &[u8]) -> Result<(), StoreError> {
        let name = join_path(path);
        let bucket = self
            .0
            .get_mut(&name)
            .ok_or(StoreError::MissingBucket(name))?;
        bucket.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// Store kept entirely in memory (tests, throwaway sessions).
///
/// Readers clone the committed snapshot's `Arc` and work on it without holding a lock.
/// Writers take `writer`, edit a private copy, and swap it in on success. Every write
/// copies the whole store, so keep it to tests and small sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    committed: RwLock<Arc<Tables>>,
    writer: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Result<Arc<Tables>, StoreError> {
        self.committed
            .read()
            .map(|guard| Arc::clone(&guard))
            .map_err(|_| StoreError::Poisoned)
    }
}

impl Store for MemoryStore {
    fn view<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn ReadTx) -> Result<T, E>,
        E: From<StoreError>,
    {
        let snapshot = self.snapshot()?;
        f(snapshot.as_ref())
    }

    fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn WriteTx) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _writer = self.writer.lock().map_err(|_| StoreError::Poisoned)?;
        let mut working = Tables::clone(&*self.snapshot()?);
        let out = f(&mut working)?;
        let mut committed = self.committed.write().map_err(|_| StoreError::Poisoned)?;
        *committed = Arc::new(working);
        Ok(out)
    }
}
