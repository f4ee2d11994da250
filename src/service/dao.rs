//! Load and save league entities inside a transaction.
//!
//! Layout: `leagues/<league id>/{data, rounds, games}`. The league document lives under
//! `data/league`; rounds and games are keyed by their id.

use crate::error::LeagueError;
use crate::models::{EntityKind, EntityRef, Game, GameId, League, LeagueId, Round, RoundId};
use crate::store::migration::LEAGUES_BUCKET;
use crate::store::{ReadTx, WriteTx};
use serde::de::DeserializeOwned;
use serde::Serialize;

const DATA_BUCKET: &str = "data";
const ROUNDS_BUCKET: &str = "rounds";
const GAMES_BUCKET: &str = "games";
const LEAGUE_KEY: &str = "league";

/// Bucket paths for one league.
struct Buckets {
    id: String,
}

impl Buckets {
    fn new(league_id: LeagueId) -> Self {
        Self {
            id: league_id.to_string(),
        }
    }

    fn root(&self) -> [&str; 2] {
        [LEAGUES_BUCKET, &self.id]
    }

    fn data(&self) -> [&str; 3] {
        [LEAGUES_BUCKET, &self.id, DATA_BUCKET]
    }

    fn rounds(&self) -> [&str; 3] {
        [LEAGUES_BUCKET, &self.id, ROUNDS_BUCKET]
    }

    fn games(&self) -> [&str; 3] {
        [LEAGUES_BUCKET, &self.id, GAMES_BUCKET]
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LeagueError> {
    Ok(serde_json::to_vec(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LeagueError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Create the league's buckets and write the league with all of its rounds.
pub(crate) fn insert_league<W: WriteTx + ?Sized>(
    tx: &mut W,
    league: &League,
    rounds: &[Round],
) -> Result<(), LeagueError> {
    let b = Buckets::new(league.id);
    tx.create_bucket(&b.root())?;
    tx.create_bucket(&b.data())?;
    tx.create_bucket(&b.rounds())?;
    tx.create_bucket(&b.games())?;
    for round in rounds {
        save_round(tx, round)?;
    }
    save_league(tx, league)
}

pub(crate) fn list_leagues<R: ReadTx + ?Sized>(tx: &R) -> Result<Vec<EntityRef>, LeagueError> {
    tx.buckets(&[LEAGUES_BUCKET])?
        .into_iter()
        .map(|id| -> Result<EntityRef, LeagueError> {
            let bytes = tx
                .get(&[LEAGUES_BUCKET, id.as_str(), DATA_BUCKET], LEAGUE_KEY)?
                .ok_or_else(|| LeagueError::not_found(EntityKind::League, &id))?;
            Ok(decode::<League>(&bytes)?.entity_ref())
        })
        .collect()
}

pub(crate) fn load_league<R: ReadTx + ?Sized>(tx: &R, league_id: LeagueId) -> Result<League, LeagueError> {
    let b = Buckets::new(league_id);
    let missing = || LeagueError::not_found(EntityKind::League, league_id);
    if !tx.has_bucket(&b.data())? {
        return Err(missing());
    }
    let bytes = tx.get(&b.data(), LEAGUE_KEY)?.ok_or_else(missing)?;
    decode(&bytes)
}

pub(crate) fn load_round<R: ReadTx + ?Sized>(
    tx: &R,
    league_id: LeagueId,
    round_id: RoundId,
) -> Result<Round, LeagueError> {
    let bytes = tx
        .get(&Buckets::new(league_id).rounds(), &round_id.to_string())?
        .ok_or_else(|| LeagueError::not_found(EntityKind::Round, round_id))?;
    decode(&bytes)
}

pub(crate) fn load_game<R: ReadTx + ?Sized>(
    tx: &R,
    league_id: LeagueId,
    game_id: GameId,
) -> Result<Game, LeagueError> {
    let bytes = tx
        .get(&Buckets::new(league_id).games(), &game_id.to_string())?
        .ok_or_else(|| LeagueError::not_found(EntityKind::Game, game_id))?;
    decode(&bytes)
}

/// Every game of the league, in key order.
pub(crate) fn load_games<R: ReadTx + ?Sized>(tx: &R, league_id: LeagueId) -> Result<Vec<Game>, LeagueError> {
    tx.entries(&Buckets::new(league_id).games())?
        .iter()
        .map(|(_, bytes)| decode(bytes))
        .collect()
}

/// The round's games in creation order.
pub(crate) fn load_round_games<R: ReadTx + ?Sized>(tx: &R, round: &Round) -> Result<Vec<Game>, LeagueError> {
    round
        .games
        .iter()
        .map(|g| load_game(tx, round.league_id, g.id))
        .collect()
}

pub(crate) fn save_league<W: WriteTx + ?Sized>(tx: &mut W, league: &League) -> Result<(), LeagueError> {
    let bytes = encode(league)?;
    tx.put(&Buckets::new(league.id).data(), LEAGUE_KEY, &bytes)?;
    Ok(())
}

pub(crate) fn save_round<W: WriteTx + ?Sized>(tx: &mut W, round: &Round) -> Result<(), LeagueError> {
    let bytes = encode(round)?;
    tx.put(&Buckets::new(round.league_id).rounds(), &round.id.to_string(), &bytes)?;
    Ok(())
}

pub(crate) fn save_game<W: WriteTx + ?Sized>(
    tx: &mut W,
    league_id: LeagueId,
    game: &Game,
) -> Result<(), LeagueError> {
    let bytes = encode(game)?;
    tx.put(&Buckets::new(league_id).games(), &game.id.to_string(), &bytes)?;
    Ok(())
}
