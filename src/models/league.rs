//! League, creation request, records and status.

use crate::error::{LeagueError, ValidationErrors};
use crate::models::entity::{EntityId, EntityKind, EntityRef};
use crate::models::history::MatchupHistory;
use crate::models::round::RoundId;
use crate::models::team::{Team, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unique identifier for a league.
pub type LeagueId = EntityId;

pub const MIN_TEAMS: u32 = 4;
pub const MAX_TEAMS: u32 = 32;
pub const MAX_NAME_LEN: usize = 50;
pub const MAX_TEAM_LABEL_LEN: usize = 20;

/// Win/loss record of one team.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
}

/// Derived standings: team id -> record. Recomputed from the games, never patched.
pub type RecordsMap = BTreeMap<TeamId, Record>;

/// A team and its record, as shown in a ranked table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Standing {
    pub team: EntityRef,
    pub record: Record,
}

/// Full league state. Rounds and games are stored separately; the league holds references.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct League {
    pub id: LeagueId,
    pub name: String,
    /// Prefix for generated team names ("Team" -> "Team 1", "Team 2", ...).
    pub team_label: String,
    #[serde(default)]
    pub image_url: String,
    pub teams: BTreeMap<TeamId, Team>,
    /// Rounds ordered by round number.
    pub rounds: Vec<EntityRef>,
    /// None once the league is fully scheduled.
    pub active_round: Option<EntityRef>,
    /// Terminal: every round has been filled.
    #[serde(default)]
    pub fully_scheduled: bool,
    #[serde(default)]
    pub history: MatchupHistory,
    #[serde(default)]
    pub records: RecordsMap,
}

impl League {
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef {
            id: self.id,
            text: self.name.clone(),
            kind: EntityKind::League,
            image_url: self.image_url.clone(),
        }
    }

    pub fn total_rounds(&self) -> u32 {
        self.rounds.len() as u32
    }

    pub fn team(&self, id: TeamId) -> Result<&Team, LeagueError> {
        self.teams
            .get(&id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Team, id))
    }

    /// The round that follows `round_id` by round number, if any.
    pub fn next_round_after(&self, round_id: RoundId) -> Option<&EntityRef> {
        let idx = self.rounds.iter().position(|r| r.id == round_id)?;
        self.rounds.get(idx + 1)
    }

    /// 1-based number of the active round, or None when fully scheduled.
    pub fn current_round_number(&self) -> Option<u32> {
        let active = self.active_round.as_ref()?;
        self.rounds
            .iter()
            .position(|r| r.id == active.id)
            .map(|idx| idx as u32 + 1)
    }

    /// True if no team other than `team_id` is called `name`.
    pub fn name_available(&self, team_id: TeamId, name: &str) -> bool {
        !self
            .teams
            .values()
            .any(|t| t.name == name && t.id != team_id)
    }

    /// Rename a team in the source-of-truth map. Callers fan the new reference out.
    pub fn rename_team(&mut self, team_id: TeamId, name: &str) -> Result<Team, LeagueError> {
        self.team(team_id)?;
        if !self.name_available(team_id, name) {
            return Err(LeagueError::NameTaken(name.to_string()));
        }
        let team = self
            .teams
            .get_mut(&team_id)
            .ok_or_else(|| LeagueError::not_found(EntityKind::Team, team_id))?;
        team.name = name.to_string();
        Ok(team.clone())
    }
}

/// Summary of how far scheduling has progressed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct LeagueStatus {
    /// None once fully scheduled.
    pub current_round: Option<u32>,
    pub total_rounds: u32,
    pub games_remaining_in_round: u32,
    pub fully_scheduled: bool,
}

/// Input for creating a league. Normalize and validate before use.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct CreateLeagueRequest {
    pub name: String,
    pub team_label: String,
    pub team_count: u32,
    pub round_count: u32,
}

impl CreateLeagueRequest {
    /// Trim text fields and collect every violated constraint.
    pub fn validate_and_normalize(&mut self) -> Result<(), LeagueError> {
        let mut errors = ValidationErrors::new();

        self.name = self.name.trim().to_string();
        let name_len = self.name.chars().count();
        if name_len < 1 || name_len > MAX_NAME_LEN {
            errors.add(
                "name",
                format!("please select a name with between 1 and {MAX_NAME_LEN} characters"),
            );
        }
        if self.team_count < MIN_TEAMS || self.team_count > MAX_TEAMS || self.team_count % 2 != 0 {
            errors.add(
                "team_count",
                format!("please select an even number of between {MIN_TEAMS} and {MAX_TEAMS} teams"),
            );
        }
        let max_rounds = self.team_count.saturating_sub(1);
        if self.round_count < 1 || self.round_count > max_rounds {
            errors.add(
                "round_count",
                format!("please select between 1 and {max_rounds} (# of teams - 1) rounds"),
            );
        }
        self.team_label = self.team_label.trim().to_string();
        let label_len = self.team_label.chars().count();
        if label_len < 1 || label_len > MAX_TEAM_LABEL_LEN {
            errors.add(
                "team_label",
                format!("team label should be between 1 and {MAX_TEAM_LABEL_LEN} characters"),
            );
        }

        errors.into_result()
    }
}
