//! Round and RoundState.

use crate::models::entity::{new_id, EntityId, EntityKind, EntityRef};
use crate::models::league::LeagueId;
use serde::{Deserialize, Serialize};

/// Unique identifier for a round.
pub type RoundId = EntityId;

/// Scheduling phase of a round.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    /// Fewer games than capacity.
    Scheduling,
    /// Full, but the league has not moved on yet.
    Scheduled,
    /// Full and advanced away from; accepts no further games.
    Closed,
}

/// A scheduling batch: every team plays at most once per round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub league_id: LeagueId,
    /// 1-based, sequential within the league.
    pub round_number: u32,
    /// Games in creation order.
    pub games: Vec<EntityRef>,
    /// Number of games in this round that have a winner.
    #[serde(default)]
    pub wins: u32,
    pub active: bool,
    /// Game capacity: team count / 2.
    pub capacity: u32,
    pub all_teams: Vec<EntityRef>,
    /// Teams not yet assigned to a game this round.
    pub unplayed_teams: Vec<EntityRef>,
}

impl Round {
    /// Create an inactive, empty round for the given teams.
    pub fn new(league_id: LeagueId, round_number: u32, teams: Vec<EntityRef>) -> Self {
        let capacity = (teams.len() / 2) as u32;
        Self {
            id: new_id(),
            league_id,
            round_number,
            games: Vec::new(),
            wins: 0,
            active: false,
            capacity,
            unplayed_teams: teams.clone(),
            all_teams: teams,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.games.len() as u32 >= self.capacity
    }

    pub fn is_complete(&self) -> bool {
        self.is_scheduled() && self.wins == self.capacity
    }

    pub fn games_remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.games.len() as u32)
    }

    pub fn state(&self) -> RoundState {
        if !self.is_scheduled() {
            RoundState::Scheduling
        } else if self.active {
            RoundState::Scheduled
        } else {
            RoundState::Closed
        }
    }

    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.id, format!("Round {}", self.round_number), EntityKind::Round)
    }
}
