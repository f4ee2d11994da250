//! Random matchup generation: pair two unscheduled teams that have not met yet.

use crate::error::LeagueError;
use crate::models::{EntityRef, Game, MatchupHistory};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// What to do when every remaining pairing has already been played.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RematchPolicy {
    /// Fail with `NoValidPairing` (random) or `AlreadyPlayed` (manual).
    #[default]
    Forbid,
    /// Schedule the rematch anyway and set `Game::rematch`.
    AllowFlagged,
}

impl std::str::FromStr for RematchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forbid" => Ok(RematchPolicy::Forbid),
            "allow" | "allow_flagged" => Ok(RematchPolicy::AllowFlagged),
            other => Err(format!("unknown rematch policy '{other}' (expected forbid or allow)")),
        }
    }
}

/// Process-wide random source for matchups. Seed it for reproducible schedules.
#[derive(Debug)]
pub struct Rando {
    rng: Mutex<StdRng>,
}

impl Rando {
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Run `f` with exclusive access to the generator.
    pub fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        // A panic elsewhere can't leave an RNG in an invalid state.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

/// Pick a random pairing from `eligible` and build the game for it.
///
/// 1. Up to `2 * eligible.len()` random draws of two distinct teams; accept the first
///    pair that has not played.
/// 2. If the draws run out, scan every remaining pair and pick a random unplayed one.
/// 3. If none exists, apply `policy`.
///
/// Returns the game (winner unset) and the pool without the two chosen teams. Pure:
/// the caller appends the game and records the history.
pub fn generate_matchup<R: Rng>(
    round: &EntityRef,
    round_number: u32,
    game_number: u32,
    eligible: &[EntityRef],
    history: &MatchupHistory,
    policy: RematchPolicy,
    rng: &mut R,
) -> Result<(Game, Vec<EntityRef>), LeagueError> {
    let n = eligible.len();
    if n < 2 {
        return Err(LeagueError::InsufficientTeams);
    }

    let unplayed = |&(a, b): &(usize, usize)| !history.has_played(eligible[a].id, eligible[b].id);

    let drawn = (0..2 * n)
        .map(|_| draw_distinct(n, rng))
        .find(|pair| unplayed(pair));

    let (a, b, rematch) = match drawn.or_else(|| scan_unplayed(n, &unplayed, rng)) {
        Some((a, b)) => (a, b, false),
        None => match policy {
            RematchPolicy::Forbid => return Err(LeagueError::NoValidPairing),
            RematchPolicy::AllowFlagged => {
                let (a, b) = draw_distinct(n, rng);
                log::warn!(
                    "no unplayed pairing left in round {round_number}; scheduling rematch {} vs {}",
                    eligible[a].text,
                    eligible[b].text
                );
                (a, b, true)
            }
        },
    };

    let team_a = eligible[a].clone();
    let team_b = eligible[b].clone();
    let remaining = eligible
        .iter()
        .filter(|t| t.id != team_a.id && t.id != team_b.id)
        .cloned()
        .collect();

    let mut game = Game::new(round.clone(), round_number, game_number, team_a, team_b);
    game.rematch = rematch;
    Ok((game, remaining))
}

/// Two distinct indices in `0..n`, uniformly. Requires `n >= 2`.
fn draw_distinct<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let a = rng.gen_range(0..n);
    let mut b = rng.gen_range(0..n - 1);
    if b >= a {
        b += 1;
    }
    (a, b)
}

fn scan_unplayed<R: Rng>(
    n: usize,
    unplayed: &impl Fn(&(usize, usize)) -> bool,
    rng: &mut R,
) -> Option<(usize, usize)> {
    let candidates: Vec<(usize, usize)> = (0..n)
        .flat_map(|a| (a + 1..n).map(move |b| (a, b)))
        .filter(|pair| unplayed(pair))
        .collect();
    let &(a, b) = candidates.choose(rng)?;
    if rng.gen_bool(0.5) {
        Some((b, a))
    } else {
        Some((a, b))
    }
}
