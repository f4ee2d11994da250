//! Runtime configuration, read from environment variables.
//!
//! HOST, PORT, DATAFILE, RANDOM_SEED, REMATCH_POLICY. Missing or unparsable values fall
//! back to the defaults.

use crate::logic::RematchPolicy;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// SQLite file backing the store.
    pub datafile: PathBuf,
    pub random_seed: Option<u64>,
    pub rematch_policy: RematchPolicy,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_datafile() -> PathBuf {
    PathBuf::from("league.db")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            datafile: default_datafile(),
            random_seed: None,
            rematch_policy: RematchPolicy::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key -> value lookup (the environment, or a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("HOST").unwrap_or_else(default_host);
        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(default_port);
        let datafile = lookup("DATAFILE")
            .map(PathBuf::from)
            .unwrap_or_else(default_datafile);
        let random_seed = lookup("RANDOM_SEED").and_then(|s| s.trim().parse().ok());
        let rematch_policy = match lookup("REMATCH_POLICY") {
            Some(raw) => raw.parse().unwrap_or_else(|e: String| {
                log::warn!("{e}; using forbid");
                RematchPolicy::default()
            }),
            None => RematchPolicy::default(),
        };
        Self {
            host,
            port,
            datafile,
            random_seed,
            rematch_policy,
        }
    }
}
