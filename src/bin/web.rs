//! JSON API over the league service, backed by the SQLite store.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, DATAFILE, RANDOM_SEED, REMATCH_POLICY.

use actix_web::{
    get, post, put,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use league_scheduler::{
    AppConfig, CreateLeagueRequest, ErrorKind, GameId, LeagueError, LeagueId, LeagueService,
    MatchupRequest, Rando, RoundId, SqliteStore, TeamId,
};
use serde::{Deserialize, Serialize};

type Service = Data<LeagueService<SqliteStore>>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct WinnerBody {
    winner: TeamId,
}

#[derive(Deserialize)]
struct RematchBody {
    team_a: TeamId,
    team_b: TeamId,
}

#[derive(Deserialize)]
struct RenameBody {
    name: String,
}

#[derive(Deserialize)]
struct LeaguePath {
    id: LeagueId,
}

#[derive(Deserialize)]
struct RoundPath {
    id: LeagueId,
    round_id: RoundId,
}

#[derive(Deserialize)]
struct GamePath {
    id: LeagueId,
    game_id: GameId,
}

#[derive(Deserialize)]
struct RoundGamePath {
    id: LeagueId,
    round_id: RoundId,
    game_id: GameId,
}

#[derive(Deserialize)]
struct TeamPath {
    id: LeagueId,
    team_id: TeamId,
}

#[derive(Serialize)]
struct RoundDetail {
    round: league_scheduler::Round,
    games: Vec<league_scheduler::Game>,
}

fn error_response(err: &LeagueError) -> HttpResponse {
    let message = serde_json::json!({ "error": err.to_string() });
    match (err, err.kind()) {
        (LeagueError::Validation(errors), _) => HttpResponse::BadRequest().json(errors),
        (LeagueError::NameTaken(_), _) => {
            HttpResponse::Conflict().json(serde_json::json!({ "name": err.to_string() }))
        }
        (_, ErrorKind::Validation) => HttpResponse::BadRequest().json(message),
        (_, ErrorKind::NotFound) => HttpResponse::NotFound().json(message),
        (_, ErrorKind::Conflict) => HttpResponse::Conflict().json(message),
        (_, ErrorKind::Scheduling) => HttpResponse::UnprocessableEntity().json(message),
        (_, ErrorKind::Storage) => {
            log::error!("storage failure: {err}");
            HttpResponse::InternalServerError().json(message)
        }
    }
}

/// Run a blocking service call off the async workers and render its result.
async fn run<T, F>(service: Service, f: F) -> HttpResponse
where
    T: Serialize + Send + 'static,
    F: FnOnce(&LeagueService<SqliteStore>) -> Result<T, LeagueError> + Send + 'static,
{
    match web::block(move || f(&service)).await {
        Ok(Ok(value)) => HttpResponse::Ok().json(value),
        Ok(Err(e)) => error_response(&e),
        Err(e) => {
            log::error!("blocking task failed: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": "internal error" }))
        }
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "league-scheduler",
    })
}

#[get("/api/leagues")]
async fn api_list_leagues(service: Service) -> HttpResponse {
    run(service, |s| s.list_leagues()).await
}

#[post("/api/leagues")]
async fn api_create_league(service: Service, body: Json<CreateLeagueRequest>) -> HttpResponse {
    let request = body.into_inner();
    run(service, move |s| s.create_league(request)).await
}

#[get("/api/leagues/{id}")]
async fn api_get_league(service: Service, path: Path<LeaguePath>) -> HttpResponse {
    let id = path.id;
    run(service, move |s| s.get_league(id)).await
}

/// Start a fresh bracket with the same teams and rounds.
#[post("/api/leagues/{id}/copy")]
async fn api_copy_league(service: Service, path: Path<LeaguePath>) -> HttpResponse {
    let id = path.id;
    run(service, move |s| s.copy_league(id)).await
}

#[get("/api/leagues/{id}/standings")]
async fn api_standings(service: Service, path: Path<LeaguePath>) -> HttpResponse {
    let id = path.id;
    run(service, move |s| s.standings(id)).await
}

#[get("/api/leagues/{id}/status")]
async fn api_league_status(service: Service, path: Path<LeaguePath>) -> HttpResponse {
    let id = path.id;
    run(service, move |s| s.league_status(id)).await
}

#[get("/api/leagues/{id}/rounds/{round_id}")]
async fn api_get_round(service: Service, path: Path<RoundPath>) -> HttpResponse {
    let RoundPath { id, round_id } = path.into_inner();
    run(service, move |s| {
        let (round, games) = s.get_round(id, round_id)?;
        Ok(RoundDetail { round, games })
    })
    .await
}

/// Create a game in the round: random with an empty body, the given matchup otherwise.
#[post("/api/leagues/{id}/rounds/{round_id}/games")]
async fn api_create_game(service: Service, path: Path<RoundPath>, body: web::Bytes) -> HttpResponse {
    let RoundPath { id, round_id } = path.into_inner();
    let matchup = match MatchupRequest::from_body(&body) {
        Ok(m) => m,
        Err(e) => return error_response(&e),
    };
    run(service, move |s| s.create_game(id, round_id, matchup)).await
}

/// Replace the teams of a game already in the round.
#[put("/api/leagues/{id}/rounds/{round_id}/games/{game_id}")]
async fn api_rematch_game(
    service: Service,
    path: Path<RoundGamePath>,
    body: Json<RematchBody>,
) -> HttpResponse {
    let RoundGamePath { id, round_id, game_id } = path.into_inner();
    let RematchBody { team_a, team_b } = body.into_inner();
    run(service, move |s| s.rematch_game(id, round_id, game_id, team_a, team_b)).await
}

#[get("/api/leagues/{id}/games/{game_id}")]
async fn api_get_game(service: Service, path: Path<GamePath>) -> HttpResponse {
    let GamePath { id, game_id } = path.into_inner();
    run(service, move |s| s.get_game(id, game_id)).await
}

#[put("/api/leagues/{id}/games/{game_id}/winner")]
async fn api_resolve_game(service: Service, path: Path<GamePath>, body: Json<WinnerBody>) -> HttpResponse {
    let GamePath { id, game_id } = path.into_inner();
    let winner = body.winner;
    run(service, move |s| s.resolve_game(id, game_id, winner)).await
}

#[put("/api/leagues/{id}/teams/{team_id}")]
async fn api_rename_team(service: Service, path: Path<TeamPath>, body: Json<RenameBody>) -> HttpResponse {
    let TeamPath { id, team_id } = path.into_inner();
    let name = body.into_inner().name;
    run(service, move |s| s.rename_team(id, team_id, &name)).await
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env();
    log::info!(
        "opening store at {} (rematch policy {:?})",
        config.datafile.display(),
        config.rematch_policy
    );
    let store = SqliteStore::open(&config.datafile).map_err(std::io::Error::other)?;
    let service = LeagueService::new(store, Rando::new(config.random_seed), config.rematch_policy)
        .map_err(std::io::Error::other)?;
    let service = Data::new(service);

    let bind = (config.host.as_str(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .service(api_health)
            .service(api_list_leagues)
            .service(api_create_league)
            .service(api_get_league)
            .service(api_copy_league)
            .service(api_standings)
            .service(api_league_status)
            .service(api_get_round)
            .service(api_create_game)
            .service(api_rematch_game)
            .service(api_get_game)
            .service(api_resolve_game)
            .service(api_rename_team)
    })
    .bind(bind)?
    .run()
    .await
}
