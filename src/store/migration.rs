//! Versioned schema migrations, run once at startup.

use crate::store::{Store, StoreError, WriteTx};

pub const META_BUCKET: &str = "meta";
pub const VERSION_KEY: &str = "version";
pub const LEAGUES_BUCKET: &str = "leagues";

type Migration = fn(&mut dyn WriteTx) -> Result<(), StoreError>;

/// Applies every migration newer than the stored version, in one write transaction.
#[derive(Clone, Copy, Debug, Default)]
pub struct Migrator;

impl Migrator {
    /// Returns the schema version after migrating.
    pub fn migrate<S: Store>(&self, store: &S) -> Result<usize, StoreError> {
        log::info!("performing migrations");
        let version = store.update(|tx| {
            tx.create_bucket_if_absent(&[META_BUCKET])?;
            let mut version = stored_version(tx)?;
            while version < MIGRATIONS.len() {
                MIGRATIONS[version](tx)?;
                version += 1;
                tx.put(&[META_BUCKET], VERSION_KEY, version.to_string().as_bytes())?;
            }
            Ok::<_, StoreError>(version)
        })?;
        log::info!("migrations complete, schema version {version}");
        Ok(version)
    }
}

const MIGRATIONS: &[Migration] = &[create_leagues_bucket];

/// 1: top-level bucket holding one child bucket per league.
fn create_leagues_bucket(tx: &mut dyn WriteTx) -> Result<(), StoreError> {
    tx.create_bucket_if_absent(&[LEAGUES_BUCKET])
}

/// Missing or unreadable version counts as 0.
fn stored_version(tx: &dyn WriteTx) -> Result<usize, StoreError> {
    let raw = tx.get(&[META_BUCKET], VERSION_KEY)?;
    Ok(raw
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0))
}
