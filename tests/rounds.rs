//! Integration tests for the round lifecycle: accepting games and advancing the league.

use league_scheduler::logic::rounds::{advance, append_game, ensure_accepts_game, release_teams};
use league_scheduler::logic::build_league;
use league_scheduler::{CreateLeagueRequest, Game, League, LeagueError, Progression, Round, RoundState};

fn league(team_count: u32, round_count: u32) -> (League, Vec<Round>) {
    build_league(&CreateLeagueRequest {
        name: "Thursday League".into(),
        team_label: "Team".into(),
        team_count,
        round_count,
    })
}

fn game_for(round: &Round, a: usize, b: usize) -> Game {
    Game::new(
        round.entity_ref(),
        round.round_number,
        round.games.len() as u32 + 1,
        round.all_teams[a].clone(),
        round.all_teams[b].clone(),
    )
}

#[test]
fn new_league_has_round_one_active() {
    let (league, rounds) = league(6, 3);
    assert_eq!(rounds.len(), 3);
    assert_eq!(league.teams.len(), 6);
    assert!(rounds[0].active);
    assert!(rounds[1..].iter().all(|r| !r.active));
    assert_eq!(league.active_round.as_ref().map(|r| r.id), Some(rounds[0].id));
    for (i, round) in rounds.iter().enumerate() {
        assert_eq!(round.round_number, i as u32 + 1);
        assert_eq!(round.capacity, 3);
        assert_eq!(round.all_teams.len(), 6);
        assert_eq!(round.unplayed_teams, round.all_teams);
        assert_eq!(round.state(), RoundState::Scheduling);
    }
    let mut names: Vec<&str> = league.teams.values().map(|t| t.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["Team 1", "Team 2", "Team 3", "Team 4", "Team 5", "Team 6"]);
    assert!(league.records.values().all(|r| r.wins == 0 && r.losses == 0));
}

#[test]
fn append_claims_teams_and_counts_wins() {
    let (_, mut rounds) = league(4, 1);
    let round = &mut rounds[0];
    let mut game = game_for(round, 0, 1);
    game.winner = Some(game.team_a.clone());

    append_game(round, &game).unwrap();
    assert_eq!(round.games.len(), 1);
    assert_eq!(round.wins, 1);
    assert_eq!(round.unplayed_teams.len(), 2);
    assert!(!round.unplayed_teams.iter().any(|t| game.involves(t.id)));

    release_teams(round, &game);
    assert_eq!(round.unplayed_teams.len(), 4);
    release_teams(round, &game);
    assert_eq!(round.unplayed_teams.len(), 4);
}

#[test]
fn full_round_rejects_games_and_stays_unchanged() {
    let (_, mut rounds) = league(4, 1);
    let round = &mut rounds[0];
    let g = game_for(round, 0, 1);
    append_game(round, &g).unwrap();
    let g = game_for(round, 2, 3);
    append_game(round, &g).unwrap();
    assert!(round.is_scheduled());

    let before = round.clone();
    let extra = game_for(round, 0, 2);
    assert!(matches!(append_game(round, &extra), Err(LeagueError::RoundFull { round_number: 1 })));
    assert_eq!(*round, before);
}

#[test]
fn inactive_round_rejects_games() {
    let (_, rounds) = league(4, 2);
    assert!(ensure_accepts_game(&rounds[0]).is_ok());
    assert!(matches!(
        ensure_accepts_game(&rounds[1]),
        Err(LeagueError::RoundNotActive { round_number: 2 })
    ));
}

#[test]
fn filling_a_round_activates_the_next() {
    let (mut league, mut rounds) = league(4, 2);
    let (first, rest) = rounds.split_at_mut(1);
    let round = &mut first[0];
    let next = &mut rest[0];

    let g = game_for(round, 0, 1);
    append_game(round, &g).unwrap();
    assert_eq!(advance(&mut league, round, Some(&mut *next)), Progression::Continuing);
    assert!(round.active);

    let g = game_for(round, 2, 3);
    append_game(round, &g).unwrap();
    assert_eq!(round.state(), RoundState::Scheduled);
    let progression = advance(&mut league, round, Some(&mut *next));
    assert_eq!(progression, Progression::Advanced(next.entity_ref()));
    assert!(!round.active);
    assert!(next.active);
    assert_eq!(round.state(), RoundState::Closed);
    assert_eq!(league.active_round.as_ref().map(|r| r.id), Some(next.id));
    assert!(!league.fully_scheduled);
}

#[test]
fn filling_the_last_round_finishes_scheduling() {
    let (mut league, mut rounds) = league(4, 1);
    let round = &mut rounds[0];
    let g = game_for(round, 0, 1);
    append_game(round, &g).unwrap();
    let g = game_for(round, 2, 3);
    append_game(round, &g).unwrap();

    assert_eq!(advance(&mut league, round, None), Progression::FullyScheduled);
    assert!(league.fully_scheduled);
    assert!(league.active_round.is_none());
    assert!(!round.active);
}

#[test]
fn round_is_complete_once_every_game_has_a_winner() {
    let (_, mut rounds) = league(4, 1);
    let round = &mut rounds[0];
    let mut first = game_for(round, 0, 1);
    first.winner = Some(first.team_b.clone());
    append_game(round, &first).unwrap();
    let g = game_for(round, 2, 3);
    append_game(round, &g).unwrap();
    assert!(round.is_scheduled());
    assert!(!round.is_complete());

    round.wins += 1;
    assert!(round.is_complete());
}
