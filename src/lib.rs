//! Round-robin league organizer: library with models, scheduling logic, storage and the
//! league service.

pub mod config;
pub mod error;
pub mod logic;
pub mod models;
pub mod service;
pub mod store;

pub use config::AppConfig;
pub use error::{ErrorKind, LeagueError, ValidationErrors};
pub use logic::{Progression, Rando, RematchPolicy};
pub use models::{
    CreateLeagueRequest, EntityKind, EntityRef, Game, GameId, League, LeagueId, LeagueStatus,
    MatchupHistory, MatchupRequest, Record, RecordsMap, Round, RoundId, RoundState, Standing, Team, TeamId,
};
pub use service::{LeagueService, RematchedGame, RenamedTeam, ResolvedGame, ScheduledGame};
pub use store::{MemoryStore, SqliteStore, Store, StoreError};
