//! League business logic: setup, matchups, round lifecycle, standings.

pub mod matchup;
pub mod rounds;
mod setup;
mod standings;

pub use matchup::{generate_matchup, Rando, RematchPolicy};
pub use rounds::Progression;
pub use setup::{build_league, copy_league};
pub use standings::{rank_teams, recompute_records};
