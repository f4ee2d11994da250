//! Setup: build a new league (teams + rounds, round 1 active), or a reset copy of one.

use crate::logic::standings::recompute_records;
use crate::models::{new_id, CreateLeagueRequest, Game, League, MatchupHistory, Round, Team};

/// Build a league from a validated request: `team_count` teams named
/// "{team_label} {n}" and `round_count` empty rounds, the first one active.
pub fn build_league(request: &CreateLeagueRequest) -> (League, Vec<Round>) {
    let teams = (1..=request.team_count)
        .map(|n| Team::new(format!("{} {}", request.team_label, n)))
        .collect();
    assemble(&request.name, &request.team_label, teams, request.round_count)
}

/// A reset bracket with the same name, label, team names and round count as `source`,
/// but fresh ids and no games, history or records.
pub fn copy_league(source: &League) -> (League, Vec<Round>) {
    let mut source_teams: Vec<&Team> = source.teams.values().collect();
    source_teams.sort_by(|a, b| a.name.cmp(&b.name));
    let teams = source_teams
        .into_iter()
        .map(|t| Team {
            image_url: t.image_url.clone(),
            ..Team::new(t.name.clone())
        })
        .collect();
    let (mut league, rounds) = assemble(&source.name, &source.team_label, teams, source.total_rounds());
    league.image_url = source.image_url.clone();
    (league, rounds)
}

fn assemble(name: &str, team_label: &str, teams: Vec<Team>, round_count: u32) -> (League, Vec<Round>) {
    let id = new_id();
    let team_refs: Vec<_> = teams.iter().map(Team::entity_ref).collect();

    let mut rounds: Vec<Round> = (1..=round_count)
        .map(|n| Round::new(id, n, team_refs.clone()))
        .collect();
    if let Some(first) = rounds.first_mut() {
        first.active = true;
    }

    let teams = teams.into_iter().map(|t| (t.id, t)).collect();
    let records = recompute_records(std::iter::empty::<&Game>(), &teams);
    let league = League {
        id,
        name: name.to_string(),
        team_label: team_label.to_string(),
        image_url: String::new(),
        teams,
        rounds: rounds.iter().map(Round::entity_ref).collect(),
        active_round: rounds.first().map(Round::entity_ref),
        fully_scheduled: false,
        history: MatchupHistory::new(),
        records,
    };
    (league, rounds)
}
