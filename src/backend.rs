//! Query/mutation surface the UI talks to.
//!
//! The terminal never touches storage directly: every read and write goes
//! through [`StatsBackend`], which is implemented locally on SQLite and
//! remotely over an HTTP query/mutation API.

use anyhow::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::box_score::BoxScoreData;
use crate::model::{
    Game, GameId, GameStatus, League, LeagueId, LeaguePatch, NewGame, NewLeague, NewPlayer,
    NewTeam, PlayEvent, Player, PlayerGameStats, PlayerId, PlayerPatch, REGULATION_PERIODS,
    ScoringPoint, Shot, Team, TeamId, TeamPatch,
};
use crate::scorekeeper::{ScoreError, SessionSnapshot};
use crate::validation::{INVITE_ALPHABET, INVITE_CODE_LEN, ValidationError};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("{0}")]
    Conflict(String),
    #[error("no league uses invite code {0}")]
    InvalidInviteCode(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("backend error: {0}")]
    Remote(String),
}

impl BackendError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        BackendError::NotFound { entity, id }
    }
}

/// Everything the leaders, standings and comparison screens need for a league.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueStatsData {
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub games: Vec<Game>,
    pub stats: Vec<PlayerGameStats>,
}

pub trait StatsBackend: Send {
    fn describe(&self) -> String;

    // Queries.
    fn list_leagues(&self, user: &str) -> Result<Vec<League>>;
    fn get_league(&self, id: LeagueId) -> Result<League>;
    fn list_teams(&self, league_id: LeagueId) -> Result<Vec<Team>>;
    fn list_players(&self, team_id: TeamId) -> Result<Vec<Player>>;
    fn list_games(&self, league_id: LeagueId) -> Result<Vec<Game>>;
    fn get_game(&self, id: GameId) -> Result<Game>;
    fn get_box_score(&self, game_id: GameId) -> Result<BoxScoreData>;
    fn get_scoring_timeline(&self, game_id: GameId) -> Result<Vec<ScoringPoint>>;
    fn get_play_by_play(&self, game_id: GameId) -> Result<Vec<PlayEvent>>;
    fn get_shots(&self, game_id: GameId) -> Result<Vec<Shot>>;
    fn get_league_stats(&self, league_id: LeagueId) -> Result<LeagueStatsData>;

    // Mutations.
    fn create_league(&mut self, input: &NewLeague, owner: &str) -> Result<League>;
    fn update_league(&mut self, id: LeagueId, patch: &LeaguePatch) -> Result<League>;
    fn delete_league(&mut self, id: LeagueId) -> Result<()>;
    fn join_league_by_invite_code(&mut self, code: &str, user: &str) -> Result<League>;
    fn regenerate_invite_code(&mut self, id: LeagueId) -> Result<String>;
    fn create_team(&mut self, input: &NewTeam) -> Result<Team>;
    fn update_team(&mut self, id: TeamId, patch: &TeamPatch) -> Result<Team>;
    fn delete_team(&mut self, id: TeamId) -> Result<()>;
    fn create_player(&mut self, input: &NewPlayer) -> Result<Player>;
    fn update_player(&mut self, id: PlayerId, patch: &PlayerPatch) -> Result<Player>;
    fn delete_player(&mut self, id: PlayerId) -> Result<()>;
    fn create_game(&mut self, input: &NewGame) -> Result<Game>;
    fn set_game_status(&mut self, id: GameId, status: GameStatus) -> Result<Game>;
    fn delete_game(&mut self, id: GameId) -> Result<()>;
    fn save_session(&mut self, snapshot: &SessionSnapshot) -> Result<()>;
}

/// One game's records, fetched together for the analytics tabs, reports and export.
#[derive(Debug, Clone, PartialEq)]
pub struct GameBundle {
    pub data: BoxScoreData,
    pub timeline: Vec<ScoringPoint>,
    pub events: Vec<PlayEvent>,
    pub shots: Vec<Shot>,
}

impl GameBundle {
    pub fn fetch(backend: &dyn StatsBackend, game_id: GameId) -> Result<Self> {
        Ok(Self {
            data: backend.get_box_score(game_id)?,
            timeline: backend.get_scoring_timeline(game_id)?,
            events: backend.get_play_by_play(game_id)?,
            shots: backend.get_shots(game_id)?,
        })
    }

    /// Periods actually played, never fewer than regulation.
    pub fn periods(&self) -> u8 {
        self.events
            .iter()
            .map(|e| e.quarter)
            .chain(std::iter::once(self.data.game.quarter))
            .max()
            .unwrap_or(0)
            .max(REGULATION_PERIODS)
    }
}

pub fn generate_invite_code(rng: &mut impl Rng) -> String {
    (0..INVITE_CODE_LEN)
        .map(|_| INVITE_ALPHABET[rng.gen_range(0..INVITE_ALPHABET.len())] as char)
        .collect()
}

/// Short text for a toast, picking the most specific error in the chain.
pub fn user_message(err: &anyhow::Error) -> String {
    if let Some(err) = err.downcast_ref::<BackendError>() {
        return match err {
            BackendError::NotFound { entity, .. } => format!("That {entity} no longer exists"),
            BackendError::InvalidInviteCode(_) => "Invalid invite code".to_string(),
            other => other.to_string(),
        };
    }
    if let Some(err) = err.downcast_ref::<ValidationError>() {
        return err.to_string();
    }
    if let Some(err) = err.downcast_ref::<ScoreError>() {
        return err.to_string();
    }
    format!("{err:#}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn invite_codes_use_unambiguous_alphabet() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let code = generate_invite_code(&mut rng);
            assert_eq!(code.len(), INVITE_CODE_LEN);
            assert!(!code.contains('O') && !code.contains('0') && !code.contains('I'));
        }
    }

    #[test]
    fn user_message_prefers_typed_errors() {
        let err = anyhow::Error::new(BackendError::InvalidInviteCode("ABCDEFGH".to_string()));
        assert_eq!(user_message(&err), "Invalid invite code");
        let err = anyhow::Error::new(BackendError::not_found("team", 4));
        assert_eq!(user_message(&err), "That team no longer exists");
    }
}
