//! League service: every operation is one unit of work against the store.
//!
//! Mutating operations load the league and the affected rounds/games, change them in
//! memory with the `logic` functions, and write everything back in the same transaction.
//! Any error discards the whole transaction.

mod dao;

use crate::error::{LeagueError, ValidationErrors};
use crate::logic::rounds::{self, Progression};
use crate::logic::{build_league, copy_league, generate_matchup, rank_teams, recompute_records, Rando, RematchPolicy};
use crate::models::{
    CreateLeagueRequest, EntityKind, EntityRef, Game, GameId, League, LeagueId, LeagueStatus,
    MatchupHistory, MatchupRequest, RecordsMap, RefList, Round, RoundId, Standing, Team, TeamId, MAX_NAME_LEN,
};
use crate::store::migration::Migrator;
use crate::store::{Store, WriteTx};
use serde::Serialize;

/// Result of scheduling a game (random or manual).
#[derive(Clone, Debug, Serialize)]
pub struct ScheduledGame {
    pub game: Game,
    pub round: Round,
    pub progression: Progression,
}

/// Result of resolving a game.
#[derive(Clone, Debug, Serialize)]
pub struct ResolvedGame {
    pub game: Game,
    /// Both teams of the game.
    pub teams: Vec<Team>,
    pub records: RecordsMap,
}

/// Result of changing which teams play a game.
#[derive(Clone, Debug, Serialize)]
pub struct RematchedGame {
    pub game: Game,
    pub round: Round,
    pub records: RecordsMap,
}

/// Result of renaming a team, with every game snapshot that was refreshed.
#[derive(Clone, Debug, Serialize)]
pub struct RenamedTeam {
    pub team: Team,
    pub games: Vec<Game>,
    pub active_round: Option<Round>,
}

/// The scheduling and standings service over a store.
pub struct LeagueService<S> {
    store: S,
    rando: Rando,
    policy: RematchPolicy,
}

impl<S: Store> LeagueService<S> {
    /// Wrap `store`, running pending migrations first.
    pub fn new(store: S, rando: Rando, policy: RematchPolicy) -> Result<Self, LeagueError> {
        Migrator.migrate(&store)?;
        Ok(Self { store, rando, policy })
    }

    /// Validate the request, then create the league, its teams and rounds (round 1 active).
    pub fn create_league(&self, mut request: CreateLeagueRequest) -> Result<League, LeagueError> {
        request.validate_and_normalize()?;
        let (league, rounds) = build_league(&request);
        self.store.update(|tx| -> Result<(), LeagueError> {
            dao::insert_league(tx, &league, &rounds)
        })?;
        log::info!(
            "created league '{}' ({}) with {} teams and {} rounds",
            league.name,
            league.id,
            league.teams.len(),
            rounds.len()
        );
        Ok(league)
    }

    /// A fresh bracket with the same teams and round structure as `league_id`.
    pub fn copy_league(&self, league_id: LeagueId) -> Result<League, LeagueError> {
        let league = self.store.update(|tx| -> Result<League, LeagueError> {
            let source = dao::load_league(&*tx, league_id)?;
            let (league, rounds) = copy_league(&source);
            dao::insert_league(tx, &league, &rounds)?;
            Ok(league)
        })?;
        log::info!("copied league {league_id} into {}", league.id);
        Ok(league)
    }

    /// Schedule the given matchup, or a random one when there is none.
    pub fn create_game(
        &self,
        league_id: LeagueId,
        round_id: RoundId,
        matchup: Option<MatchupRequest>,
    ) -> Result<ScheduledGame, LeagueError> {
        match matchup {
            Some(m) => self.record_matchup(league_id, round_id, m.team_a, m.team_b, m.winner),
            None => self.create_random_game(league_id, round_id),
        }
    }

    /// Pair two random unscheduled teams of the round that have not met yet.
    pub fn create_random_game(&self, league_id: LeagueId, round_id: RoundId) -> Result<ScheduledGame, LeagueError> {
        let scheduled = self.store.update(|tx| -> Result<ScheduledGame, LeagueError> {
            let mut league = dao::load_league(&*tx, league_id)?;
            let mut round = dao::load_round(&*tx, league_id, round_id)?;
            rounds::ensure_accepts_game(&round)?;

            let game_number = round.games.len() as u32 + 1;
            let (game, remaining) = self.rando.with_rng(|rng| {
                generate_matchup(
                    &round.entity_ref(),
                    round.round_number,
                    game_number,
                    &round.unplayed_teams,
                    &league.history,
                    self.policy,
                    rng,
                )
            })?;
            round.unplayed_teams = remaining;

            let progression = schedule_game(tx, &mut league, &mut round, &game)?;
            Ok(ScheduledGame {
                game,
                round,
                progression,
            })
        })?;
        log::info!(
            "league {league_id}: scheduled random game {} in round {} ({} vs {})",
            scheduled.game.game_number,
            scheduled.round.round_number,
            scheduled.game.team_a.text,
            scheduled.game.team_b.text
        );
        Ok(scheduled)
    }

    /// Schedule an explicit matchup, optionally already decided.
    pub fn record_matchup(
        &self,
        league_id: LeagueId,
        round_id: RoundId,
        team_a: TeamId,
        team_b: TeamId,
        winner: Option<TeamId>,
    ) -> Result<ScheduledGame, LeagueError> {
        let scheduled = self.store.update(|tx| -> Result<ScheduledGame, LeagueError> {
            let mut league = dao::load_league(&*tx, league_id)?;
            let mut round = dao::load_round(&*tx, league_id, round_id)?;
            rounds::ensure_accepts_game(&round)?;
            if team_a == team_b {
                return Err(LeagueError::SelfMatchup);
            }
            let a = league.team(team_a)?.entity_ref();
            let b = league.team(team_b)?.entity_ref();
            ensure_unplayed(&round, &[&a, &b])?;
            let rematch = self.check_rematch(&league.history, &a, &b)?;

            let game_number = round.games.len() as u32 + 1;
            let mut game = Game::new(round.entity_ref(), round.round_number, game_number, a, b);
            game.rematch = rematch;
            if let Some(winner) = winner {
                game.winner = Some(winner_ref(&game, winner)?);
            }

            let progression = schedule_game(tx, &mut league, &mut round, &game)?;
            Ok(ScheduledGame {
                game,
                round,
                progression,
            })
        })?;
        log::info!(
            "league {league_id}: recorded game {} in round {} ({} vs {})",
            scheduled.game.game_number,
            scheduled.round.round_number,
            scheduled.game.team_a.text,
            scheduled.game.team_b.text
        );
        Ok(scheduled)
    }

    /// Set (or change) the winner of a game and recompute the standings.
    pub fn resolve_game(&self, league_id: LeagueId, game_id: GameId, winner_id: TeamId) -> Result<ResolvedGame, LeagueError> {
        let resolved = self.store.update(|tx| -> Result<ResolvedGame, LeagueError> {
            let mut league = dao::load_league(&*tx, league_id)?;
            let mut game = dao::load_game(&*tx, league_id, game_id)?;
            let mut round = dao::load_round(&*tx, league_id, game.round.id)?;

            let winner = winner_ref(&game, winner_id)?;
            if !game.is_complete() {
                round.wins += 1;
            }
            game.winner = Some(winner);
            rounds::refresh_game_ref(&mut round, &game);

            dao::save_game(tx, league_id, &game)?;
            dao::save_round(tx, &round)?;
            refresh_records(tx, &mut league)?;
            dao::save_league(tx, &league)?;

            let teams = vec![
                league.team(game.team_a.id)?.clone(),
                league.team(game.team_b.id)?.clone(),
            ];
            Ok(ResolvedGame {
                game,
                teams,
                records: league.records,
            })
        })?;
        log::info!(
            "league {league_id}: game {game_id} won by {}",
            resolved.game.winner.as_ref().map_or("?", |w| w.text.as_str())
        );
        Ok(resolved)
    }

    /// Change which teams play a game. Clears any recorded winner. Naming the same two
    /// teams, in either order, leaves the game as it is.
    ///
    /// The old pairing is taken out of the history and its teams go back to the round's
    /// pool before the new pairing is checked, recorded and claimed.
    pub fn rematch_game(
        &self,
        league_id: LeagueId,
        round_id: RoundId,
        game_id: GameId,
        new_team_a: TeamId,
        new_team_b: TeamId,
    ) -> Result<RematchedGame, LeagueError> {
        let rematched = self.store.update(|tx| -> Result<RematchedGame, LeagueError> {
            let mut league = dao::load_league(&*tx, league_id)?;
            let mut round = dao::load_round(&*tx, league_id, round_id)?;
            let mut game = dao::load_game(&*tx, league_id, game_id)?;
            if game.round.id != round.id {
                return Err(LeagueError::not_found(EntityKind::Game, game_id));
            }
            let unchanged = (game.team_a.id == new_team_a && game.team_b.id == new_team_b)
                || (game.team_a.id == new_team_b && game.team_b.id == new_team_a);
            if unchanged {
                return Ok(RematchedGame {
                    game,
                    round,
                    records: league.records,
                });
            }
            if new_team_a == new_team_b {
                return Err(LeagueError::SelfMatchup);
            }
            let a = league.team(new_team_a)?.entity_ref();
            let b = league.team(new_team_b)?.entity_ref();

            rounds::release_teams(&mut round, &game);
            league.history.remove(&game);
            if game.is_complete() {
                round.wins = round.wins.saturating_sub(1);
                game.winner = None;
            }

            ensure_unplayed(&round, &[&a, &b])?;
            game.rematch = self.check_rematch(&league.history, &a, &b)?;
            game.team_a = a;
            game.team_b = b;
            league.history.record(&game);
            rounds::claim_teams(&mut round, &game);
            rounds::refresh_game_ref(&mut round, &game);

            dao::save_game(tx, league_id, &game)?;
            dao::save_round(tx, &round)?;
            refresh_records(tx, &mut league)?;
            dao::save_league(tx, &league)?;
            Ok(RematchedGame {
                game,
                round,
                records: league.records,
            })
        })?;
        log::info!(
            "league {league_id}: game {game_id} is now {} vs {}",
            rematched.game.team_a.text,
            rematched.game.team_b.text
        );
        Ok(rematched)
    }

    /// Rename a team and refresh its snapshot in every game, round and history entry.
    pub fn rename_team(&self, league_id: LeagueId, team_id: TeamId, name: &str) -> Result<RenamedTeam, LeagueError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LeagueError::Validation(ValidationErrors::single("name", "name cannot be empty")));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(LeagueError::Validation(ValidationErrors::single(
                "name",
                format!("name can be at most {MAX_NAME_LEN} characters"),
            )));
        }

        let renamed = self.store.update(|tx| -> Result<RenamedTeam, LeagueError> {
            let mut league = dao::load_league(&*tx, league_id)?;
            let team = league.rename_team(team_id, name)?;
            let team_ref = team.entity_ref();
            league.history.refresh_team(&team_ref);

            let mut games = Vec::new();
            for mut game in dao::load_games(&*tx, league_id)? {
                if game.refresh_team(&team_ref) {
                    dao::save_game(tx, league_id, &game)?;
                    games.push(game);
                }
            }

            let mut active_round = None;
            for round_ref in &league.rounds {
                let mut round = dao::load_round(&*tx, league_id, round_ref.id)?;
                round.all_teams.refresh(&team_ref);
                round.unplayed_teams.refresh(&team_ref);
                let round_id = round.id;
                for game in games.iter().filter(|g| g.round.id == round_id) {
                    rounds::refresh_game_ref(&mut round, game);
                }
                dao::save_round(tx, &round)?;
                if round.active {
                    active_round = Some(round);
                }
            }

            dao::save_league(tx, &league)?;
            Ok(RenamedTeam {
                team,
                games,
                active_round,
            })
        })?;
        log::info!(
            "league {league_id}: team {team_id} renamed to '{}', {} game(s) refreshed",
            renamed.team.name,
            renamed.games.len()
        );
        Ok(renamed)
    }

    pub fn list_leagues(&self) -> Result<Vec<EntityRef>, LeagueError> {
        self.store
            .view(|tx| -> Result<Vec<EntityRef>, LeagueError> { dao::list_leagues(tx) })
    }

    pub fn get_league(&self, league_id: LeagueId) -> Result<League, LeagueError> {
        self.store
            .view(|tx| -> Result<League, LeagueError> { dao::load_league(tx, league_id) })
    }

    /// The round and its games in creation order.
    pub fn get_round(&self, league_id: LeagueId, round_id: RoundId) -> Result<(Round, Vec<Game>), LeagueError> {
        self.store.view(|tx| -> Result<(Round, Vec<Game>), LeagueError> {
            dao::load_league(tx, league_id)?;
            let round = dao::load_round(tx, league_id, round_id)?;
            let games = dao::load_round_games(tx, &round)?;
            Ok((round, games))
        })
    }

    pub fn get_game(&self, league_id: LeagueId, game_id: GameId) -> Result<Game, LeagueError> {
        self.store.view(|tx| -> Result<Game, LeagueError> {
            dao::load_league(tx, league_id)?;
            dao::load_game(tx, league_id, game_id)
        })
    }

    /// Every game of the league.
    pub fn get_games(&self, league_id: LeagueId) -> Result<Vec<Game>, LeagueError> {
        self.store.view(|tx| -> Result<Vec<Game>, LeagueError> {
            dao::load_league(tx, league_id)?;
            dao::load_games(tx, league_id)
        })
    }

    pub fn standings(&self, league_id: LeagueId) -> Result<Vec<Standing>, LeagueError> {
        Ok(rank_teams(&self.get_league(league_id)?))
    }

    pub fn league_status(&self, league_id: LeagueId) -> Result<LeagueStatus, LeagueError> {
        self.store.view(|tx| -> Result<LeagueStatus, LeagueError> {
            let league = dao::load_league(tx, league_id)?;
            let games_remaining_in_round = match &league.active_round {
                Some(active) => dao::load_round(tx, league_id, active.id)?.games_remaining(),
                None => 0,
            };
            Ok(LeagueStatus {
                current_round: league.current_round_number(),
                total_rounds: league.total_rounds(),
                games_remaining_in_round,
                fully_scheduled: league.fully_scheduled,
            })
        })
    }

    /// Whether pairing `a` with `b` is a rematch, or an error if the policy forbids it.
    fn check_rematch(&self, history: &MatchupHistory, a: &EntityRef, b: &EntityRef) -> Result<bool, LeagueError> {
        if !history.has_played(a.id, b.id) {
            return Ok(false);
        }
        match self.policy {
            RematchPolicy::Forbid => Err(LeagueError::AlreadyPlayed {
                team_a: a.text.clone(),
                team_b: b.text.clone(),
            }),
            RematchPolicy::AllowFlagged => {
                log::warn!("accepting rematch {} vs {}", a.text, b.text);
                Ok(true)
            }
        }
    }
}

/// Append `game` to `round`, record the pairing, advance the league if the round filled
/// up, and write everything. The single place scheduling progresses.
fn schedule_game<W: WriteTx + ?Sized>(
    tx: &mut W,
    league: &mut League,
    round: &mut Round,
    game: &Game,
) -> Result<Progression, LeagueError> {
    rounds::append_game(round, game)?;
    league.history.record(game);

    let mut next = match league.next_round_after(round.id).filter(|_| round.is_scheduled()) {
        Some(next_ref) => Some(dao::load_round(&*tx, league.id, next_ref.id)?),
        None => None,
    };
    let progression = rounds::advance(league, round, next.as_mut());

    dao::save_game(tx, league.id, game)?;
    dao::save_round(tx, round)?;
    if let Some(next) = &next {
        dao::save_round(tx, next)?;
    }
    if game.is_complete() {
        refresh_records(tx, league)?;
    }
    dao::save_league(tx, league)?;
    Ok(progression)
}

/// Recompute the league's records from every stored game.
fn refresh_records<W: WriteTx + ?Sized>(tx: &mut W, league: &mut League) -> Result<(), LeagueError> {
    let games = dao::load_games(&*tx, league.id)?;
    league.records = recompute_records(&games, &league.teams);
    Ok(())
}

fn ensure_unplayed(round: &Round, teams: &[&EntityRef]) -> Result<(), LeagueError> {
    match teams.iter().find(|t| !round.unplayed_teams.has_id(t.id)) {
        Some(team) => Err(LeagueError::TeamAlreadyScheduled(team.text.clone())),
        None => Ok(()),
    }
}

/// The game's own snapshot of `winner_id`, which must be one of its two teams.
fn winner_ref(game: &Game, winner_id: TeamId) -> Result<EntityRef, LeagueError> {
    [&game.team_a, &game.team_b]
        .into_iter()
        .find(|t| t.id == winner_id)
        .cloned()
        .ok_or_else(|| {
            LeagueError::Validation(ValidationErrors::single(
                "winner",
                "the winner must be one of the game's two teams",
            ))
        })
}
