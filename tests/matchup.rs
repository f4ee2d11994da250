//! Integration tests for random matchup generation.

use league_scheduler::logic::generate_matchup;
use league_scheduler::{EntityKind, EntityRef, Game, LeagueError, MatchupHistory, Rando, RematchPolicy};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

fn teams(n: usize) -> Vec<EntityRef> {
    (1..=n)
        .map(|i| EntityRef::new(Uuid::new_v4(), format!("Team {i}"), EntityKind::Team))
        .collect()
}

fn round_ref() -> EntityRef {
    EntityRef::new(Uuid::new_v4(), "Round 1", EntityKind::Round)
}

fn played(history: &mut MatchupHistory, a: &EntityRef, b: &EntityRef) {
    history.record(&Game::new(round_ref(), 1, 1, a.clone(), b.clone()));
}

#[test]
fn requires_at_least_two_teams() {
    let mut rng = StdRng::seed_from_u64(1);
    let pool = teams(1);
    let result = generate_matchup(&round_ref(), 1, 1, &pool, &MatchupHistory::new(), RematchPolicy::Forbid, &mut rng);
    assert!(matches!(result, Err(LeagueError::InsufficientTeams)));

    let result = generate_matchup(&round_ref(), 1, 1, &[], &MatchupHistory::new(), RematchPolicy::Forbid, &mut rng);
    assert!(matches!(result, Err(LeagueError::InsufficientTeams)));
}

#[test]
fn picks_two_distinct_teams_and_shrinks_pool() {
    let pool = teams(6);
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let (game, remaining) =
            generate_matchup(&round_ref(), 2, 3, &pool, &MatchupHistory::new(), RematchPolicy::Forbid, &mut rng).unwrap();
        assert_ne!(game.team_a.id, game.team_b.id);
        assert!(pool.contains(&game.team_a));
        assert!(pool.contains(&game.team_b));
        assert_eq!(remaining.len(), 4);
        assert!(!remaining.iter().any(|t| game.involves(t.id)));
        assert_eq!(game.round_number, 2);
        assert_eq!(game.game_number, 3);
        assert!(game.winner.is_none());
        assert!(!game.rematch);
    }
}

#[test]
fn finds_the_only_unplayed_pair() {
    let pool = teams(4);
    let mut history = MatchupHistory::new();
    // Everything except pool[1] vs pool[2] has been played.
    for (a, b) in [(0, 1), (0, 2), (0, 3), (1, 3), (2, 3)] {
        played(&mut history, &pool[a], &pool[b]);
    }
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let (game, remaining) =
            generate_matchup(&round_ref(), 1, 1, &pool, &history, RematchPolicy::Forbid, &mut rng).unwrap();
        assert!(game.involves(pool[1].id));
        assert!(game.involves(pool[2].id));
        assert!(!game.rematch);
        assert_eq!(remaining.len(), 2);
    }
}

#[test]
fn exhausted_pool_fails_under_forbid() {
    let pool = teams(2);
    let mut history = MatchupHistory::new();
    played(&mut history, &pool[0], &pool[1]);
    let mut rng = StdRng::seed_from_u64(7);
    let result = generate_matchup(&round_ref(), 1, 1, &pool, &history, RematchPolicy::Forbid, &mut rng);
    assert!(matches!(result, Err(LeagueError::NoValidPairing)));
}

#[test]
fn exhausted_pool_flags_rematch_when_allowed() {
    let pool = teams(2);
    let mut history = MatchupHistory::new();
    played(&mut history, &pool[0], &pool[1]);
    let mut rng = StdRng::seed_from_u64(7);
    let (game, remaining) =
        generate_matchup(&round_ref(), 1, 1, &pool, &history, RematchPolicy::AllowFlagged, &mut rng).unwrap();
    assert!(game.rematch);
    assert!(game.involves(pool[0].id) && game.involves(pool[1].id));
    assert!(remaining.is_empty());
}

#[test]
fn seeded_rando_is_reproducible() {
    let pool = teams(8);
    let draw = |rando: &Rando| {
        rando
            .with_rng(|rng| {
                generate_matchup(&round_ref(), 1, 1, &pool, &MatchupHistory::new(), RematchPolicy::Forbid, rng)
            })
            .map(|(game, _)| (game.team_a.id, game.team_b.id))
            .unwrap()
    };
    let first = Rando::from_seed(42);
    let second = Rando::new(Some(42));
    for _ in 0..5 {
        assert_eq!(draw(&first), draw(&second));
    }
}

#[test]
fn rematch_policy_parses_from_config_values() {
    assert_eq!("forbid".parse::<RematchPolicy>().unwrap(), RematchPolicy::Forbid);
    assert_eq!(" Allow ".parse::<RematchPolicy>().unwrap(), RematchPolicy::AllowFlagged);
    assert_eq!("allow_flagged".parse::<RematchPolicy>().unwrap(), RematchPolicy::AllowFlagged);
    assert!("sometimes".parse::<RematchPolicy>().is_err());
    assert_eq!(RematchPolicy::default(), RematchPolicy::Forbid);
}
