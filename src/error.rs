//! Errors returned by league operations.

use crate::models::EntityKind;
use crate::store::StoreError;
use serde::Serialize;
use std::collections::BTreeMap;

/// Field name -> reason, for every constraint a request violated.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, reason: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, reason);
        errors
    }

    pub fn add(&mut self, field: &str, reason: impl Into<String>) {
        self.0.insert(field.to_string(), reason.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Ok when nothing was collected.
    pub fn into_result(self) -> Result<(), LeagueError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(LeagueError::Validation(self))
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        f.write_str(&parts.join("; "))
    }
}

/// Coarse error category, used by callers to pick a user-visible response.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Scheduling,
    Storage,
}

/// Errors that can occur during league operations. Any of them aborts the
/// surrounding transaction.
#[derive(Debug, thiserror::Error)]
pub enum LeagueError {
    #[error("Invalid input: {0}")]
    Validation(ValidationErrors),
    #[error("No {kind} with id {id}")]
    NotFound { kind: EntityKind, id: String },
    #[error("The name '{0}' is already used by another team")]
    NameTaken(String),
    #[error("A team can't play itself")]
    SelfMatchup,
    #[error("Round {round_number} is already fully scheduled")]
    RoundFull { round_number: u32 },
    #[error("Round {round_number} is not the active round")]
    RoundNotActive { round_number: u32 },
    #[error("{0} already has a game this round")]
    TeamAlreadyScheduled(String),
    #[error("{team_a} and {team_b} have already played each other")]
    AlreadyPlayed { team_a: String, team_b: String },
    #[error("Need at least two unscheduled teams to create a game")]
    InsufficientTeams,
    #[error("Every remaining pairing in this round has already been played")]
    NoValidPairing,
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error("Failed to encode or decode stored data: {0}")]
    Codec(#[from] serde_json::Error),
}

impl LeagueError {
    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        LeagueError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LeagueError::Validation(_) => ErrorKind::Validation,
            LeagueError::NotFound { .. } => ErrorKind::NotFound,
            LeagueError::NameTaken(_)
            | LeagueError::SelfMatchup
            | LeagueError::RoundFull { .. }
            | LeagueError::RoundNotActive { .. }
            | LeagueError::TeamAlreadyScheduled(_)
            | LeagueError::AlreadyPlayed { .. } => ErrorKind::Conflict,
            LeagueError::InsufficientTeams | LeagueError::NoValidPairing => ErrorKind::Scheduling,
            LeagueError::Storage(_) | LeagueError::Codec(_) => ErrorKind::Storage,
        }
    }
}
