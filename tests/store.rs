//! Integration tests for the storage contract, run against both backends.

use league_scheduler::store::migration::{Migrator, LEAGUES_BUCKET, META_BUCKET, VERSION_KEY};
use league_scheduler::{
    CreateLeagueRequest, LeagueError, LeagueService, MemoryStore, Rando, RematchPolicy, SqliteStore, Store,
    StoreError,
};
use std::path::PathBuf;
use uuid::Uuid;

/// A unique SQLite file in the temp dir, removed (with its WAL files) on drop.
struct TempDb(PathBuf);

impl TempDb {
    fn new() -> Self {
        Self(std::env::temp_dir().join(format!("league-test-{}.db", Uuid::new_v4())))
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut path = self.0.clone().into_os_string();
            path.push(suffix);
            let _ = std::fs::remove_file(path);
        }
    }
}

fn write_and_read<S: Store>(store: &S) {
    store
        .update(|tx| -> Result<(), StoreError> {
            tx.create_bucket(&["things"])?;
            tx.create_bucket(&["things", "inner"])?;
            tx.put(&["things"], "b", b"2")?;
            tx.put(&["things"], "a", b"1")?;
            tx.put(&["things"], "b", b"3")?;
            Ok(())
        })
        .unwrap();

    store
        .view(|tx| -> Result<(), StoreError> {
            assert!(tx.has_bucket(&["things"])?);
            assert!(tx.has_bucket(&["things", "inner"])?);
            assert!(!tx.has_bucket(&["nothing"])?);
            assert_eq!(tx.get(&["things"], "a")?, Some(b"1".to_vec()));
            assert_eq!(tx.get(&["things"], "zzz")?, None);
            let keys: Vec<String> = tx.entries(&["things"])?.into_iter().map(|(k, _)| k).collect();
            assert_eq!(keys, vec!["a", "b"]);
            assert_eq!(tx.entries(&["things"])?[1].1, b"3".to_vec());
            assert_eq!(tx.buckets(&["things"])?, vec!["inner"]);
            assert!(tx.entries(&["things", "inner"])?.is_empty());
            Ok(())
        })
        .unwrap();
}

fn failed_update_rolls_back<S: Store>(store: &S) {
    store
        .update(|tx| -> Result<(), StoreError> {
            tx.create_bucket(&["kept"])?;
            tx.put(&["kept"], "k", b"before")
        })
        .unwrap();

    let result = store.update(|tx| -> Result<(), StoreError> {
        tx.put(&["kept"], "k", b"after")?;
        tx.create_bucket(&["dropped"])?;
        tx.create_bucket(&["kept"])
    });
    assert!(matches!(result, Err(StoreError::BucketExists(ref name)) if name == "kept"));

    store
        .view(|tx| -> Result<(), StoreError> {
            assert_eq!(tx.get(&["kept"], "k")?, Some(b"before".to_vec()));
            assert!(!tx.has_bucket(&["dropped"])?);
            Ok(())
        })
        .unwrap();
}

fn missing_buckets_are_errors<S: Store>(store: &S) {
    let result = store.view(|tx| tx.get(&["absent"], "k"));
    assert!(matches!(result, Err(StoreError::MissingBucket(_))));

    let result = store.update(|tx| tx.create_bucket(&["absent", "child"]));
    assert!(matches!(result, Err(StoreError::MissingBucket(ref parent)) if parent == "absent"));

    let result = store.update(|tx| tx.put(&["absent"], "k", b"v"));
    assert!(matches!(result, Err(StoreError::MissingBucket(_))));
}

fn migrations_run_once<S: Store>(store: &S) {
    assert_eq!(Migrator.migrate(store).unwrap(), 1);
    assert_eq!(Migrator.migrate(store).unwrap(), 1);
    store
        .view(|tx| -> Result<(), StoreError> {
            assert!(tx.has_bucket(&[LEAGUES_BUCKET])?);
            assert_eq!(tx.get(&[META_BUCKET], VERSION_KEY)?, Some(b"1".to_vec()));
            assert!(tx.buckets(&[LEAGUES_BUCKET])?.is_empty());
            Ok(())
        })
        .unwrap();
}

#[test]
fn memory_store_contract() {
    write_and_read(&MemoryStore::new());
    failed_update_rolls_back(&MemoryStore::new());
    missing_buckets_are_errors(&MemoryStore::new());
    migrations_run_once(&MemoryStore::new());
}

#[test]
fn sqlite_store_contract() {
    let dbs: Vec<TempDb> = (0..4).map(|_| TempDb::new()).collect();
    write_and_read(&SqliteStore::open(&dbs[0].0).unwrap());
    failed_update_rolls_back(&SqliteStore::open(&dbs[1].0).unwrap());
    missing_buckets_are_errors(&SqliteStore::open(&dbs[2].0).unwrap());
    migrations_run_once(&SqliteStore::open(&dbs[3].0).unwrap());
}

#[test]
fn memory_view_sees_a_stable_snapshot() {
    let store = MemoryStore::new();
    store
        .update(|tx| -> Result<(), StoreError> {
            tx.create_bucket(&["b"])?;
            tx.put(&["b"], "k", b"old")
        })
        .unwrap();

    store
        .view(|tx| -> Result<(), StoreError> {
            store.update(|w| w.put(&["b"], "k", b"new"))?;
            assert_eq!(tx.get(&["b"], "k")?, Some(b"old".to_vec()));
            Ok(())
        })
        .unwrap();

    let now = store.view(|tx| tx.get(&["b"], "k")).unwrap();
    assert_eq!(now, Some(b"new".to_vec()));
}

#[test]
fn leagues_survive_reopening_the_sqlite_file() {
    let db = TempDb::new();
    let league_id = {
        let store = SqliteStore::open(&db.0).unwrap();
        let svc = LeagueService::new(store, Rando::from_seed(1), RematchPolicy::Forbid).unwrap();
        let league = svc
            .create_league(CreateLeagueRequest {
                name: "Persisted".into(),
                team_label: "Squad".into(),
                team_count: 4,
                round_count: 2,
            })
            .unwrap();
        let scheduled = svc.create_random_game(league.id, league.rounds[0].id).unwrap();
        svc.resolve_game(league.id, scheduled.game.id, scheduled.game.team_a.id).unwrap();
        league.id
    };

    let svc = LeagueService::new(SqliteStore::open(&db.0).unwrap(), Rando::from_seed(2), RematchPolicy::Forbid).unwrap();
    let league = svc.get_league(league_id).unwrap();
    assert_eq!(league.name, "Persisted");
    assert_eq!(league.teams.len(), 4);
    assert_eq!(league.records.values().map(|r| r.wins).sum::<u32>(), 1);

    let (round, games) = svc.get_round(league_id, league.rounds[0].id).unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(round.wins, 1);
    assert!(matches!(
        svc.get_round(league_id, Uuid::new_v4()),
        Err(LeagueError::NotFound { .. })
    ));

    // Finish the first round on the reopened file.
    let scheduled = svc.create_random_game(league_id, league.rounds[0].id).unwrap();
    assert_eq!(
        scheduled.progression,
        league_scheduler::Progression::Advanced(league.rounds[1].clone())
    );
    assert_eq!(svc.league_status(league_id).unwrap().current_round, Some(2));
}
