//! Game: one matchup between two teams within a round.

use crate::error::{LeagueError, ValidationErrors};
use crate::models::entity::{new_id, EntityId, EntityKind, EntityRef};
use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};

/// Unique identifier for a game.
pub type GameId = EntityId;

/// A scheduled (and possibly played) game. Games are corrected in place, never deleted.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    /// The round this game belongs to.
    pub round: EntityRef,
    pub round_number: u32,
    /// 1-based position within the round, in creation order.
    pub game_number: u32,
    pub team_a: EntityRef,
    pub team_b: EntityRef,
    /// None until the game has been played.
    pub winner: Option<EntityRef>,
    /// Set when the pairing had already been played earlier in the league.
    #[serde(default)]
    pub rematch: bool,
}

impl Game {
    pub fn new(round: EntityRef, round_number: u32, game_number: u32, team_a: EntityRef, team_b: EntityRef) -> Self {
        Self {
            id: new_id(),
            round,
            round_number,
            game_number,
            team_a,
            team_b,
            winner: None,
            rematch: false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.winner.is_some()
    }

    /// The team that did not win. None while the game is undecided.
    pub fn loser(&self) -> Option<&EntityRef> {
        let winner = self.winner.as_ref()?;
        if winner.id == self.team_a.id {
            Some(&self.team_b)
        } else {
            Some(&self.team_a)
        }
    }

    pub fn involves(&self, team_id: EntityId) -> bool {
        self.team_a.id == team_id || self.team_b.id == team_id
    }

    pub fn entity_ref(&self) -> EntityRef {
        let outcome = match &self.winner {
            Some(w) => format!("Winner: {}", w.text),
            None => "TBD".to_string(),
        };
        EntityRef::new(
            self.id,
            format!(
                "Game {}. {} vs {}. {}",
                self.game_number, self.team_a.text, self.team_b.text, outcome
            ),
            EntityKind::Game,
        )
    }

    /// Refresh every embedded snapshot of `team`. Returns true if the game references it.
    pub fn refresh_team(&mut self, team: &EntityRef) -> bool {
        let mut changed = false;
        for slot in [&mut self.team_a, &mut self.team_b] {
            if slot.id == team.id {
                *slot = team.clone();
                changed = true;
            }
        }
        if let Some(w) = self.winner.as_mut().filter(|w| w.id == team.id) {
            *w = team.clone();
        }
        changed
    }
}

/// Both teams for a manual game, with an optional winner.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchupRequest {
    pub team_a: TeamId,
    pub team_b: TeamId,
    #[serde(default)]
    pub winner: Option<TeamId>,
}

impl MatchupRequest {
    /// Read an optional JSON body. Empty or blank means no matchup (draw at random);
    /// anything else must parse.
    pub fn from_body(body: &[u8]) -> Result<Option<Self>, LeagueError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(body)
            .map(Some)
            .map_err(|e| LeagueError::Validation(ValidationErrors::single("body", e.to_string())))
    }
}
