use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::backend::{BackendError, LeagueStatsData, StatsBackend};
use crate::box_score::BoxScoreData;
use crate::http_client::{post_json, snippet};
use crate::model::{
    Game, GameId, GameStatus, League, LeagueId, LeaguePatch, NewGame, NewLeague, NewPlayer,
    NewTeam, PlayEvent, Player, PlayerId, PlayerPatch, ScoringPoint, Shot, Team, TeamId,
    TeamPatch,
};
use crate::scorekeeper::SessionSnapshot;

#[derive(Debug, Serialize)]
struct CallBody<'a> {
    path: &'a str,
    args: Value,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum CallReply {
    Success {
        #[serde(default)]
        value: Value,
    },
    Error {
        #[serde(rename = "errorMessage", default)]
        error_message: String,
        #[serde(rename = "errorData", default)]
        error_data: Option<ErrorData>,
    },
}

/// Optional machine-readable tag a server attaches to an error reply.
#[derive(Debug, Deserialize)]
struct ErrorData {
    kind: String,
}

#[derive(Debug, Clone, Copy)]
enum Endpoint {
    Query,
    Mutation,
}

impl Endpoint {
    fn route(self) -> &'static str {
        match self {
            Endpoint::Query => "api/query",
            Endpoint::Mutation => "api/mutation",
        }
    }
}

/// Talks to a hosted query/mutation API. Each call is one blocking POST.
pub struct RemoteBackend {
    base_url: String,
    token: Option<String>,
}

impl RemoteBackend {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn call<T: DeserializeOwned>(&self, endpoint: Endpoint, path: &str, args: Value) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint.route());
        debug!(path, "remote call");
        let body = CallBody {
            path,
            args,
            format: "json",
        };
        let (status, text) = post_json(&url, self.token.as_deref(), &body)?;
        let reply = serde_json::from_str::<CallReply>(&text);
        if !status.is_success() {
            let err = match reply {
                Ok(CallReply::Error {
                    error_message,
                    error_data,
                }) => remote_error(error_message, error_data),
                _ => BackendError::Remote(format!("{status}: {}", snippet(&text))),
            };
            warn!(path, %status, error = %err, "remote call rejected");
            return Err(err.into());
        }
        match reply.with_context(|| format!("invalid json from {url}"))? {
            CallReply::Success { value } => serde_json::from_value(value)
                .with_context(|| format!("decode {path} result")),
            CallReply::Error {
                error_message,
                error_data,
            } => {
                warn!(path, error = %error_message, "remote call failed");
                Err(remote_error(error_message, error_data).into())
            }
        }
    }

    fn query<T: DeserializeOwned>(&self, path: &str, args: Value) -> Result<T> {
        self.call(Endpoint::Query, path, args)
    }

    fn mutation<T: DeserializeOwned>(&self, path: &str, args: Value) -> Result<T> {
        self.call(Endpoint::Mutation, path, args)
    }
}

fn remote_error(message: String, data: Option<ErrorData>) -> BackendError {
    match data.as_ref().map(|d| d.kind.as_str()) {
        Some("conflict") => BackendError::Conflict(message),
        Some("invalidInviteCode") => BackendError::InvalidInviteCode(message),
        _ => BackendError::Remote(message),
    }
}

impl StatsBackend for RemoteBackend {
    fn describe(&self) -> String {
        format!("remote:{}", self.base_url)
    }

    fn list_leagues(&self, user: &str) -> Result<Vec<League>> {
        self.query("leagues:list", json!({ "user": user }))
    }

    fn get_league(&self, id: LeagueId) -> Result<League> {
        self.query("leagues:get", json!({ "id": id }))
    }

    fn list_teams(&self, league_id: LeagueId) -> Result<Vec<Team>> {
        self.query("teams:list", json!({ "leagueId": league_id }))
    }

    fn list_players(&self, team_id: TeamId) -> Result<Vec<Player>> {
        self.query("players:listByTeam", json!({ "teamId": team_id }))
    }

    fn list_games(&self, league_id: LeagueId) -> Result<Vec<Game>> {
        self.query("games:list", json!({ "leagueId": league_id }))
    }

    fn get_game(&self, id: GameId) -> Result<Game> {
        self.query("games:get", json!({ "id": id }))
    }

    fn get_box_score(&self, game_id: GameId) -> Result<BoxScoreData> {
        self.query("games:getBoxScore", json!({ "gameId": game_id }))
    }

    fn get_scoring_timeline(&self, game_id: GameId) -> Result<Vec<ScoringPoint>> {
        self.query("games:getScoringTimeline", json!({ "gameId": game_id }))
    }

    fn get_play_by_play(&self, game_id: GameId) -> Result<Vec<PlayEvent>> {
        self.query("games:getPlayByPlay", json!({ "gameId": game_id }))
    }

    fn get_shots(&self, game_id: GameId) -> Result<Vec<Shot>> {
        self.query("games:getShots", json!({ "gameId": game_id }))
    }

    fn get_league_stats(&self, league_id: LeagueId) -> Result<LeagueStatsData> {
        self.query("stats:getLeagueStats", json!({ "leagueId": league_id }))
    }

    fn create_league(&mut self, input: &NewLeague, owner: &str) -> Result<League> {
        self.mutation("leagues:create", json!({ "input": input, "owner": owner }))
    }

    fn update_league(&mut self, id: LeagueId, patch: &LeaguePatch) -> Result<League> {
        self.mutation("leagues:update", json!({ "id": id, "patch": patch }))
    }

    fn delete_league(&mut self, id: LeagueId) -> Result<()> {
        self.mutation::<Value>("leagues:remove", json!({ "id": id }))
            .map(|_| ())
    }

    fn join_league_by_invite_code(&mut self, code: &str, user: &str) -> Result<League> {
        self.mutation(
            "leagues:joinByInviteCode",
            json!({ "inviteCode": code, "user": user }),
        )
    }

    fn regenerate_invite_code(&mut self, id: LeagueId) -> Result<String> {
        self.mutation("leagues:regenerateInviteCode", json!({ "id": id }))
    }

    fn create_team(&mut self, input: &NewTeam) -> Result<Team> {
        self.mutation("teams:create", json!({ "input": input }))
    }

    fn update_team(&mut self, id: TeamId, patch: &TeamPatch) -> Result<Team> {
        self.mutation("teams:update", json!({ "id": id, "patch": patch }))
    }

    fn delete_team(&mut self, id: TeamId) -> Result<()> {
        self.mutation::<Value>("teams:remove", json!({ "id": id }))
            .map(|_| ())
    }

    fn create_player(&mut self, input: &NewPlayer) -> Result<Player> {
        self.mutation("players:create", json!({ "input": input }))
    }

    fn update_player(&mut self, id: PlayerId, patch: &PlayerPatch) -> Result<Player> {
        self.mutation("players:update", json!({ "id": id, "patch": patch }))
    }

    fn delete_player(&mut self, id: PlayerId) -> Result<()> {
        self.mutation::<Value>("players:remove", json!({ "id": id }))
            .map(|_| ())
    }

    fn create_game(&mut self, input: &NewGame) -> Result<Game> {
        self.mutation("games:create", json!({ "input": input }))
    }

    fn set_game_status(&mut self, id: GameId, status: GameStatus) -> Result<Game> {
        self.mutation(
            "games:setStatus",
            json!({ "id": id, "status": status.as_db() }),
        )
    }

    fn delete_game(&mut self, id: GameId) -> Result<()> {
        self.mutation::<Value>("games:remove", json!({ "id": id }))
            .map(|_| ())
    }

    fn save_session(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
        self.mutation::<Value>("games:saveSession", json!({ "snapshot": snapshot }))
            .map(|_| ())
    }
}
