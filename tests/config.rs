//! Integration tests for environment-driven configuration.

use league_scheduler::{AppConfig, RematchPolicy};
use std::collections::HashMap;
use std::path::PathBuf;

fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults_when_nothing_is_set() {
    let config = config_from(&[]);
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 8080);
    assert_eq!(config.datafile, PathBuf::from("league.db"));
    assert_eq!(config.random_seed, None);
    assert_eq!(config.rematch_policy, RematchPolicy::Forbid);
}

#[test]
fn reads_every_variable() {
    let config = config_from(&[
        ("HOST", "127.0.0.1"),
        ("PORT", "9000"),
        ("DATAFILE", "/tmp/leagues.db"),
        ("RANDOM_SEED", "1234"),
        ("REMATCH_POLICY", "allow"),
    ]);
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 9000);
    assert_eq!(config.datafile, PathBuf::from("/tmp/leagues.db"));
    assert_eq!(config.random_seed, Some(1234));
    assert_eq!(config.rematch_policy, RematchPolicy::AllowFlagged);
}

#[test]
fn bad_values_fall_back_to_defaults() {
    let config = config_from(&[("PORT", "eighty"), ("RANDOM_SEED", "-1"), ("REMATCH_POLICY", "maybe")]);
    assert_eq!(config.port, 8080);
    assert_eq!(config.random_seed, None);
    assert_eq!(config.rematch_policy, RematchPolicy::Forbid);
}
