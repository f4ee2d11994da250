//! Standings: win/loss records derived from completed games, and ranking.

use crate::models::{Game, League, Record, RecordsMap, Standing, Team, TeamId};
use std::collections::BTreeMap;

/// Build a fresh records map from `games`.
///
/// Every team in `teams` appears, with zero wins and losses if it has no completed game.
/// Only completed games count. Calling this twice on the same games gives the same map.
pub fn recompute_records<'a>(
    games: impl IntoIterator<Item = &'a Game>,
    teams: &BTreeMap<TeamId, Team>,
) -> RecordsMap {
    let mut records: RecordsMap = teams.keys().map(|id| (*id, Record::default())).collect();
    for game in games {
        if let (Some(winner), Some(loser)) = (game.winner.as_ref(), game.loser()) {
            records.entry(winner.id).or_default().wins += 1;
            records.entry(loser.id).or_default().losses += 1;
        }
    }
    records
}

/// Teams ordered by wins (desc), then losses (asc), then name, then id.
pub fn rank_teams(league: &League) -> Vec<Standing> {
    let mut standings: Vec<Standing> = league
        .teams
        .values()
        .map(|team| Standing {
            team: team.entity_ref(),
            record: league.records.get(&team.id).copied().unwrap_or_default(),
        })
        .collect();
    standings.sort_by(|a, b| {
        b.record
            .wins
            .cmp(&a.record.wins)
            .then(a.record.losses.cmp(&b.record.losses))
            .then_with(|| a.team.text.cmp(&b.team.text))
            .then(a.team.id.cmp(&b.team.id))
    });
    standings
}
