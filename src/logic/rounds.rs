//! Round lifecycle: accepting games, returning teams to the pool, and advancing the league.

use crate::error::LeagueError;
use crate::models::{EntityRef, Game, League, RefList, Round};
use serde::Serialize;

/// What happened to the league after a game was appended.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Progression {
    /// The round still has open slots.
    Continuing,
    /// The round filled up and the given round is now active.
    Advanced(EntityRef),
    /// The last round filled up; nothing is active any more.
    FullyScheduled,
}

/// A round takes new games only while it is active and below capacity.
pub fn ensure_accepts_game(round: &Round) -> Result<(), LeagueError> {
    if round.is_scheduled() {
        return Err(LeagueError::RoundFull {
            round_number: round.round_number,
        });
    }
    if !round.active {
        return Err(LeagueError::RoundNotActive {
            round_number: round.round_number,
        });
    }
    Ok(())
}

/// Append `game` to `round` and take its teams out of the unplayed pool.
pub fn append_game(round: &mut Round, game: &Game) -> Result<(), LeagueError> {
    ensure_accepts_game(round)?;
    round.games.push(game.entity_ref());
    claim_teams(round, game);
    if game.is_complete() {
        round.wins += 1;
    }
    Ok(())
}

/// Remove both teams of `game` from the round's unplayed pool.
pub fn claim_teams(round: &mut Round, game: &Game) {
    round.unplayed_teams.remove_all(game.team_a.id);
    round.unplayed_teams.remove_all(game.team_b.id);
}

/// Put both teams of `game` back into the round's unplayed pool.
pub fn release_teams(round: &mut Round, game: &Game) {
    for team in [&game.team_a, &game.team_b] {
        if !round.unplayed_teams.has_id(team.id) {
            round.unplayed_teams.push(team.clone());
        }
    }
}

/// Replace the round's reference to `game` with a fresh snapshot.
pub fn refresh_game_ref(round: &mut Round, game: &Game) {
    if let Some(slot) = round.games.iter_mut().find(|g| g.id == game.id) {
        *slot = game.entity_ref();
    }
}

/// Move the league past `round` once it is full.
///
/// `next` must be the round that follows `round` by number, or None if `round` is the last.
/// Deactivates `round`, then either activates `next` or marks the league fully scheduled.
/// Both the random and the manual scheduling paths go through here.
pub fn advance(league: &mut League, round: &mut Round, next: Option<&mut Round>) -> Progression {
    if !round.is_scheduled() {
        return Progression::Continuing;
    }
    round.active = false;
    match next {
        Some(next) => {
            next.active = true;
            let next_ref = next.entity_ref();
            league.active_round = Some(next_ref.clone());
            Progression::Advanced(next_ref)
        }
        None => {
            league.active_round = None;
            league.fully_scheduled = true;
            Progression::FullyScheduled
        }
    }
}
