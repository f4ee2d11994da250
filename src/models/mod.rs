//! Data structures for leagues: teams, rounds, games, history and records.

mod entity;
mod game;
mod history;
mod league;
mod round;
mod team;

pub use entity::{new_id, EntityId, EntityKind, EntityRef, RefList};
pub use game::{Game, GameId, MatchupRequest};
pub use history::MatchupHistory;
pub use league::{
    CreateLeagueRequest, League, LeagueId, LeagueStatus, Record, RecordsMap, Standing,
    MAX_NAME_LEN, MAX_TEAMS, MAX_TEAM_LABEL_LEN, MIN_TEAMS,
};
pub use round::{Round, RoundId, RoundState};
pub use team::{Team, TeamId};
