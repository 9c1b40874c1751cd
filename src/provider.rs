use std::path::Path;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use anyhow::{Result, bail};
use tracing::{debug, info, warn};

use crate::backend::{BackendError, GameBundle, StatsBackend, user_message};
use crate::config::Config;
use crate::export::export_game_workbook;
use crate::leaderboard::season_lines;
use crate::model::{GameId, GameStatus, LeagueId, TeamId};
use crate::scorekeeper::{GameSession, Rules};
use crate::state::{Delta, LoadTarget, ProviderCommand, ToastLevel};
use crate::validation::{FieldError, ValidationError};

/// Executes UI commands against a backend and reports back through deltas.
pub struct Provider {
    backend: Box<dyn StatsBackend>,
    tx: Sender<Delta>,
    user: String,
    pool: Option<rayon::ThreadPool>,
}

pub fn spawn_provider(
    backend: Box<dyn StatsBackend>,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    config: &Config,
) -> JoinHandle<()> {
    let user = config.user.clone();
    let threads = config.stats_threads;
    thread::spawn(move || {
        let mut provider = Provider::new(backend, tx, user, threads);
        info!(backend = %provider.backend.describe(), "provider started");
        while let Ok(cmd) = cmd_rx.recv() {
            provider.handle(cmd);
        }
        info!("provider stopped");
    })
}

fn build_stats_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
        .ok()
}

fn with_stats_pool<T>(pool: &Option<rayon::ThreadPool>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    if let Some(pool) = pool.as_ref() {
        pool.install(action)
    } else {
        action()
    }
}

impl Provider {
    pub fn new(
        backend: Box<dyn StatsBackend>,
        tx: Sender<Delta>,
        user: impl Into<String>,
        stats_threads: usize,
    ) -> Self {
        Self {
            backend,
            tx,
            user: user.into(),
            pool: build_stats_pool(stats_threads),
        }
    }

    pub fn backend(&self) -> &dyn StatsBackend {
        self.backend.as_ref()
    }

    /// Runs one command to completion. Failures never escape: they become
    /// form errors, a failed load, or an error toast.
    pub fn handle(&mut self, cmd: ProviderCommand) {
        let name = command_name(&cmd);
        let target = load_target(&cmd);
        let form_field = form_field(&cmd);
        debug!(command = name, "handling command");

        let Err(err) = self.run(cmd) else {
            return;
        };
        let message = user_message(&err);
        warn!(command = name, error = %format!("{err:#}"), "command failed");
        self.send(Delta::Log(format!("[WARN] {name}: {message}")));

        if let Some(field) = form_field
            && let Some(errors) = form_errors(&err, field)
        {
            self.send(Delta::FormErrors(errors));
            return;
        }
        match target {
            Some(target) => self.send(Delta::LoadFailed { target, message }),
            None => self.send(Delta::Toast {
                level: ToastLevel::Error,
                message,
            }),
        }
    }

    fn send(&self, delta: Delta) {
        let _ = self.tx.send(delta);
    }

    fn success(&self, message: impl Into<String>) {
        self.send(Delta::Toast {
            level: ToastLevel::Success,
            message: message.into(),
        });
    }

    fn run(&mut self, cmd: ProviderCommand) -> Result<()> {
        match cmd {
            ProviderCommand::LoadLeagues { user } => {
                self.user = user;
                self.reload_leagues()
            }
            ProviderCommand::LoadTeams { league_id } => self.reload_teams(league_id),
            ProviderCommand::LoadRoster { team_id } => self.reload_roster(team_id),
            ProviderCommand::LoadGames { league_id } => self.reload_games(league_id),
            ProviderCommand::LoadGame { game_id } => self.reload_game(game_id),
            ProviderCommand::LoadLeagueStats { league_id } => {
                let data = self.backend.get_league_stats(league_id)?;
                let seasons = with_stats_pool(&self.pool, || {
                    season_lines(&data.players, &data.stats)
                });
                debug!(league_id, players = seasons.len(), "league stats aggregated");
                self.send(Delta::LeagueStats {
                    league_id,
                    data,
                    seasons,
                });
                Ok(())
            }
            ProviderCommand::CreateLeague { input, owner } => {
                let league = self.backend.create_league(&input, &owner)?;
                info!(league_id = league.id, "league created");
                self.send(Delta::FormDone);
                self.success(format!(
                    "Created {} (invite code {})",
                    league.name, league.invite_code
                ));
                self.reload_leagues()
            }
            ProviderCommand::UpdateLeague { id, patch } => {
                let league = self.backend.update_league(id, &patch)?;
                self.send(Delta::FormDone);
                self.success(format!("Saved {}", league.name));
                self.reload_leagues()
            }
            ProviderCommand::DeleteLeague { id } => {
                self.backend.delete_league(id)?;
                info!(league_id = id, "league deleted");
                self.success("League deleted");
                self.reload_leagues()
            }
            ProviderCommand::JoinLeague { code, user } => {
                let league = self.backend.join_league_by_invite_code(&code, &user)?;
                let league_id = league.id;
                info!(league_id, user = %user, "joined league");
                self.send(Delta::FormDone);
                self.send(Delta::LeagueJoined(league));
                self.reload_leagues()?;
                self.reload_teams(league_id)?;
                self.reload_games(league_id)
            }
            ProviderCommand::RegenerateInviteCode { id } => {
                let code = self.backend.regenerate_invite_code(id)?;
                self.success(format!("New invite code: {code}"));
                self.send(Delta::InviteCode {
                    league_id: id,
                    code,
                });
                Ok(())
            }
            ProviderCommand::CreateTeam(input) => {
                let team = self.backend.create_team(&input)?;
                self.send(Delta::FormDone);
                self.success(format!("Added {}", team.name));
                self.reload_teams(team.league_id)
            }
            ProviderCommand::UpdateTeam { id, patch } => {
                let team = self.backend.update_team(id, &patch)?;
                self.send(Delta::FormDone);
                self.success(format!("Saved {}", team.name));
                self.reload_teams(team.league_id)
            }
            ProviderCommand::DeleteTeam { id, league_id } => {
                self.backend.delete_team(id)?;
                self.success("Team deleted");
                self.reload_teams(league_id)
            }
            ProviderCommand::CreatePlayer(input) => {
                let player = self.backend.create_player(&input)?;
                self.send(Delta::FormDone);
                self.success(format!("Added #{} {}", player.number, player.name));
                self.reload_roster(player.team_id)
            }
            ProviderCommand::UpdatePlayer { id, patch } => {
                let player = self.backend.update_player(id, &patch)?;
                self.send(Delta::FormDone);
                self.success(format!("Saved {}", player.name));
                self.reload_roster(player.team_id)
            }
            ProviderCommand::DeletePlayer { id, team_id } => {
                self.backend.delete_player(id)?;
                self.success("Player removed");
                self.reload_roster(team_id)
            }
            ProviderCommand::CreateGame(input) => {
                let game = self.backend.create_game(&input)?;
                info!(game_id = game.id, "game scheduled");
                self.send(Delta::FormDone);
                self.success("Game scheduled");
                self.reload_games(game.league_id)
            }
            ProviderCommand::DeleteGame { id, league_id } => {
                self.backend.delete_game(id)?;
                self.success("Game deleted");
                self.reload_games(league_id)
            }
            ProviderCommand::OpenSession { game_id, rules } => {
                let session = self.open_session(game_id, rules)?;
                self.send(Delta::SessionReady(Box::new(session)));
                self.reload_game(game_id)
            }
            ProviderCommand::SaveSession(snapshot) => {
                let game_id = snapshot.game.id;
                let league_id = snapshot.game.league_id;
                let status = snapshot.game.status;
                self.backend.save_session(&snapshot)?;
                debug!(game_id, events = snapshot.events.len(), "session saved");
                self.send(Delta::SessionSaved { game_id, status });
                if status == GameStatus::Final {
                    self.success(format!(
                        "Final: {}-{}",
                        snapshot.game.home_score, snapshot.game.away_score
                    ));
                    self.reload_games(league_id)?;
                }
                self.reload_game(game_id)
            }
            ProviderCommand::ExportGame {
                game_id,
                path,
                quarter_minutes,
                run_threshold,
            } => {
                let bundle = GameBundle::fetch(self.backend.as_ref(), game_id)?;
                let report =
                    export_game_workbook(Path::new(&path), &bundle, quarter_minutes, run_threshold)?;
                info!(
                    game_id,
                    path = %path,
                    rows = report.box_rows,
                    events = report.events,
                    shots = report.shots,
                    "game exported"
                );
                self.send(Delta::ExportFinished { path });
                Ok(())
            }
        }
    }

    fn open_session(&self, game_id: GameId, rules: Rules) -> Result<GameSession> {
        let game = self.backend.get_game(game_id)?;
        if game.status == GameStatus::Final {
            bail!(BackendError::Conflict("Game is already final".to_string()));
        }
        let home = self.backend.list_players(game.home_team_id)?;
        let away = self.backend.list_players(game.away_team_id)?;
        let bundle = GameBundle::fetch(self.backend.as_ref(), game_id)?;
        Ok(GameSession::resume(
            game,
            home,
            away,
            rules,
            &bundle.data.stats,
            bundle.events,
            bundle.shots,
        ))
    }

    fn reload_leagues(&self) -> Result<()> {
        let leagues = self.backend.list_leagues(&self.user)?;
        self.send(Delta::Leagues(leagues));
        Ok(())
    }

    fn reload_teams(&self, league_id: LeagueId) -> Result<()> {
        let teams = self.backend.list_teams(league_id)?;
        self.send(Delta::Teams { league_id, teams });
        Ok(())
    }

    fn reload_roster(&self, team_id: TeamId) -> Result<()> {
        let players = self.backend.list_players(team_id)?;
        self.send(Delta::Roster { team_id, players });
        Ok(())
    }

    fn reload_games(&self, league_id: LeagueId) -> Result<()> {
        let games = self.backend.list_games(league_id)?;
        self.send(Delta::Games { league_id, games });
        Ok(())
    }

    fn reload_game(&self, game_id: GameId) -> Result<()> {
        let bundle = GameBundle::fetch(self.backend.as_ref(), game_id)?;
        self.send(Delta::BoxScore {
            game_id,
            data: Box::new(bundle.data),
        });
        self.send(Delta::Timeline {
            game_id,
            points: bundle.timeline,
        });
        self.send(Delta::PlayByPlay {
            game_id,
            events: bundle.events,
        });
        self.send(Delta::Shots {
            game_id,
            shots: bundle.shots,
        });
        Ok(())
    }
}

fn command_name(cmd: &ProviderCommand) -> &'static str {
    match cmd {
        ProviderCommand::LoadLeagues { .. } => "load leagues",
        ProviderCommand::LoadTeams { .. } => "load teams",
        ProviderCommand::LoadRoster { .. } => "load roster",
        ProviderCommand::LoadGames { .. } => "load games",
        ProviderCommand::LoadGame { .. } => "load game",
        ProviderCommand::LoadLeagueStats { .. } => "load league stats",
        ProviderCommand::CreateLeague { .. } => "create league",
        ProviderCommand::UpdateLeague { .. } => "update league",
        ProviderCommand::DeleteLeague { .. } => "delete league",
        ProviderCommand::JoinLeague { .. } => "join league",
        ProviderCommand::RegenerateInviteCode { .. } => "regenerate invite code",
        ProviderCommand::CreateTeam(_) => "create team",
        ProviderCommand::UpdateTeam { .. } => "update team",
        ProviderCommand::DeleteTeam { .. } => "delete team",
        ProviderCommand::CreatePlayer(_) => "create player",
        ProviderCommand::UpdatePlayer { .. } => "update player",
        ProviderCommand::DeletePlayer { .. } => "delete player",
        ProviderCommand::CreateGame(_) => "create game",
        ProviderCommand::DeleteGame { .. } => "delete game",
        ProviderCommand::OpenSession { .. } => "open scorekeeper",
        ProviderCommand::SaveSession(_) => "save game",
        ProviderCommand::ExportGame { .. } => "export game",
    }
}

/// Loading flag a command raises while it is in flight.
pub fn load_target(cmd: &ProviderCommand) -> Option<LoadTarget> {
    match cmd {
        ProviderCommand::LoadLeagues { .. } => Some(LoadTarget::Leagues),
        ProviderCommand::LoadTeams { .. } => Some(LoadTarget::Teams),
        ProviderCommand::LoadRoster { .. } => Some(LoadTarget::Roster),
        ProviderCommand::LoadGames { .. } => Some(LoadTarget::Games),
        ProviderCommand::LoadGame { .. } => Some(LoadTarget::Game),
        ProviderCommand::LoadLeagueStats { .. } => Some(LoadTarget::LeagueStats),
        ProviderCommand::OpenSession { .. } => Some(LoadTarget::Session),
        _ => None,
    }
}

/// Commands submitted from a form, with the field that catches errors that
/// are not tied to a specific input.
fn form_field(cmd: &ProviderCommand) -> Option<&'static str> {
    match cmd {
        ProviderCommand::CreateLeague { .. } | ProviderCommand::UpdateLeague { .. } => Some("name"),
        ProviderCommand::JoinLeague { .. } => Some("invite_code"),
        ProviderCommand::CreateTeam(_) | ProviderCommand::UpdateTeam { .. } => Some("abbreviation"),
        ProviderCommand::CreatePlayer(_) | ProviderCommand::UpdatePlayer { .. } => Some("number"),
        ProviderCommand::CreateGame(_) => Some("away_team"),
        _ => None,
    }
}

fn form_errors(err: &anyhow::Error, fallback_field: &'static str) -> Option<Vec<FieldError>> {
    if let Some(err) = err.downcast_ref::<ValidationError>() {
        return Some(err.0.clone());
    }
    match err.downcast_ref::<BackendError>()? {
        BackendError::Validation(v) => Some(v.0.clone()),
        BackendError::InvalidInviteCode(_) => Some(vec![FieldError::new(
            fallback_field,
            "No league uses that invite code",
        )]),
        BackendError::Conflict(msg) => Some(vec![FieldError::new(fallback_field, msg.clone())]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_are_routed_to_their_flag() {
        assert_eq!(
            load_target(&ProviderCommand::LoadGames { league_id: 1 }),
            Some(LoadTarget::Games)
        );
        assert_eq!(load_target(&ProviderCommand::DeleteGame { id: 1, league_id: 1 }), None);
    }

    #[test]
    fn conflicts_land_on_the_form() {
        let err = anyhow::Error::new(BackendError::Conflict("already a member of Rec".to_string()));
        let errors = form_errors(&err, "invite_code").expect("form errors");
        assert_eq!(errors[0].field, "invite_code");
        assert_eq!(errors[0].message, "already a member of Rec");
    }

    #[test]
    fn remote_failures_stay_toasts() {
        let err = anyhow::Error::new(BackendError::Remote("503".to_string()));
        assert!(form_errors(&err, "name").is_none());
    }
}
