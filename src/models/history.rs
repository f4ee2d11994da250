//! Matchup history: who has faced whom, league-wide.

use crate::models::entity::{EntityRef, RefList};
use crate::models::game::Game;
use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per team, the opponents it has faced in the order the games were recorded.
///
/// Both directions are always written together, so A lists B exactly as often as B
/// lists A. Mutate only through [`MatchupHistory::record`] and [`MatchupHistory::remove`].
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchupHistory(BTreeMap<TeamId, Vec<EntityRef>>);

impl MatchupHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append each team of `game` to the other's opponent list. Call once per game.
    pub fn record(&mut self, game: &Game) {
        self.0
            .entry(game.team_a.id)
            .or_default()
            .push(game.team_b.clone());
        self.0
            .entry(game.team_b.id)
            .or_default()
            .push(game.team_a.clone());
    }

    /// Undo the most recent recording of `game`'s pairing, in both directions.
    pub fn remove(&mut self, game: &Game) {
        if let Some(opponents) = self.0.get_mut(&game.team_a.id) {
            opponents.remove_last(game.team_b.id);
        }
        if let Some(opponents) = self.0.get_mut(&game.team_b.id) {
            opponents.remove_last(game.team_a.id);
        }
    }

    pub fn has_played(&self, team_a: TeamId, team_b: TeamId) -> bool {
        self.0.get(&team_a).is_some_and(|o| o.has_id(team_b))
    }

    /// How many times `team_a` has faced `team_b`.
    pub fn times_played(&self, team_a: TeamId, team_b: TeamId) -> usize {
        self.opponents(team_a)
            .iter()
            .filter(|o| o.id == team_b)
            .count()
    }

    pub fn opponents(&self, team: TeamId) -> &[EntityRef] {
        self.0.get(&team).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Refresh every opponent snapshot of `team` after a rename.
    pub(crate) fn refresh_team(&mut self, team: &EntityRef) {
        for opponents in self.0.values_mut() {
            opponents.refresh(team);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TeamId, &Vec<EntityRef>)> {
        self.0.iter()
    }
}
