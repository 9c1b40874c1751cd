use std::io;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;

use hoops_terminal::backend::StatsBackend;
use hoops_terminal::config::{Config, init_logging};
use hoops_terminal::model::GameStatus;
use hoops_terminal::persist;
use hoops_terminal::play_by_play::{PbpSort, next_quarter_filter, quarters_present};
use hoops_terminal::provider::{load_target, spawn_provider};
use hoops_terminal::remote_backend::RemoteBackend;
use hoops_terminal::scorekeeper::{Recording, ScoreError, StatAction};
use hoops_terminal::sqlite_backend::SqliteBackend;
use hoops_terminal::state::{
    AppState, ConfirmState, Delta, FormState, ProviderCommand, Screen, ShotSpot, ToastLevel,
    apply_delta,
};

mod ui;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    refresh: Duration,
    last_save: Instant,
    last_clock: Instant,
    last_refresh: Instant,
}

impl App {
    fn new(state: AppState, cmd_tx: Option<mpsc::Sender<ProviderCommand>>, refresh: Duration) -> Self {
        Self {
            state,
            should_quit: false,
            cmd_tx,
            refresh,
            last_save: Instant::now(),
            last_clock: Instant::now(),
            last_refresh: Instant::now(),
        }
    }

    fn request(&mut self, cmd: ProviderCommand) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[WARN] Backend unavailable");
            return;
        };
        let target = load_target(&cmd);
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Backend worker stopped");
            return;
        }
        if let Some(target) = target {
            self.state.loading.set(target, true);
        }
    }

    fn load_league(&mut self) {
        let Some(league_id) = self.state.current_league else {
            return;
        };
        self.request(ProviderCommand::LoadTeams { league_id });
        self.request(ProviderCommand::LoadGames { league_id });
    }

    fn goto(&mut self, screen: Screen) {
        if screen == self.state.screen {
            return;
        }
        if self.state.screen == Screen::Scorekeeper {
            self.save_session();
        }
        self.state.screen = screen;
        match screen {
            Screen::Leagues => self.request(ProviderCommand::LoadLeagues {
                user: self.state.user.clone(),
            }),
            Screen::Teams => {
                if let Some(league_id) = self.state.current_league {
                    self.request(ProviderCommand::LoadTeams { league_id });
                }
            }
            Screen::Roster => {
                if let Some(team_id) = self.state.roster_team {
                    self.request(ProviderCommand::LoadRoster { team_id });
                }
            }
            Screen::Games => {
                if let Some(league_id) = self.state.current_league {
                    self.request(ProviderCommand::LoadGames { league_id });
                }
            }
            Screen::Compare | Screen::Leaders => {
                if let Some(league_id) = self.state.current_league {
                    self.request(ProviderCommand::LoadLeagueStats { league_id });
                }
            }
            _ => {}
        }
    }

    fn refresh_screen(&mut self) {
        match self.state.screen {
            Screen::Leagues => self.request(ProviderCommand::LoadLeagues {
                user: self.state.user.clone(),
            }),
            Screen::Teams | Screen::Games => self.load_league(),
            Screen::Roster => {
                if let Some(team_id) = self.state.roster_team {
                    self.request(ProviderCommand::LoadRoster { team_id });
                }
            }
            Screen::Compare | Screen::Leaders => {
                if let Some(league_id) = self.state.current_league {
                    self.request(ProviderCommand::LoadLeagueStats { league_id });
                }
            }
            Screen::Scorekeeper => self.save_session(),
            _ => {
                if let Some(game_id) = self.state.game_view.game_id {
                    self.request(ProviderCommand::LoadGame { game_id });
                }
            }
        }
        self.last_refresh = Instant::now();
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.confirm.is_some() {
            self.on_confirm_key(key);
            return;
        }
        if self.state.form.is_some() {
            self.on_form_key(key);
            return;
        }
        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.state.help_overlay = false;
            }
            return;
        }
        if self.on_screen_key(key) {
            return;
        }
        match key.code {
            KeyCode::Char('q') => {
                self.save_session();
                self.should_quit = true;
            }
            KeyCode::Char('?') => self.state.help_overlay = true,
            KeyCode::Char('1') => self.goto(Screen::Leagues),
            KeyCode::Char('2') => self.goto(Screen::Teams),
            KeyCode::Char('3') => self.goto(Screen::Roster),
            KeyCode::Char('4') => self.goto(Screen::Games),
            KeyCode::Char('5') => self.goto(Screen::Scorekeeper),
            KeyCode::Char('c') => self.goto(Screen::Compare),
            KeyCode::Char('L') => self.goto(Screen::Leaders),
            KeyCode::Tab => self.cycle_game_tab(true),
            KeyCode::BackTab => self.cycle_game_tab(false),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('r') => self.refresh_screen(),
            KeyCode::Char('X') => self.export_game(),
            KeyCode::Esc | KeyCode::Char('b') => self.back(),
            _ => {}
        }
    }

    fn back(&mut self) {
        let target = match self.state.screen {
            Screen::Leagues => return,
            Screen::Roster => Screen::Teams,
            s if s.is_game_screen() => Screen::Games,
            _ => Screen::Leagues,
        };
        self.goto(target);
    }

    fn cycle_game_tab(&mut self, forward: bool) {
        if self.state.game_view.game_id.is_none() {
            self.state.push_log("[INFO] Open a game first");
            return;
        }
        let tabs = Screen::GAME_TABS;
        let next = match tabs.iter().position(|s| *s == self.state.screen) {
            Some(idx) if forward => tabs[(idx + 1) % tabs.len()],
            Some(idx) => tabs[(idx + tabs.len() - 1) % tabs.len()],
            None => tabs[0],
        };
        self.goto(next);
    }

    fn on_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(confirm) = self.state.confirm.take() {
                    self.request(confirm.command);
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state.confirm = None;
            }
            _ => {}
        }
    }

    fn on_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.state.form.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.state.form = None,
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Char(c) => form.input(c),
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let Some(form) = self.state.form.as_ref() else {
            return;
        };
        if form.pending {
            return;
        }
        match form.build_command(&self.state) {
            Ok(cmd) => {
                if let Some(form) = self.state.form.as_mut() {
                    form.errors.clear();
                    form.pending = true;
                }
                self.request(cmd);
            }
            Err(errors) => {
                if let Some(form) = self.state.form.as_mut() {
                    form.errors = errors;
                }
            }
        }
    }

    fn confirm(&mut self, prompt: String, command: ProviderCommand) {
        self.state.confirm = Some(ConfirmState { prompt, command });
    }

    /// Keys that mean something only on the current screen. Returns false to
    /// fall through to the global bindings.
    fn on_screen_key(&mut self, key: KeyEvent) -> bool {
        match self.state.screen {
            Screen::Leagues => self.on_leagues_key(key),
            Screen::Teams => self.on_teams_key(key),
            Screen::Roster => self.on_roster_key(key),
            Screen::Games => self.on_games_key(key),
            Screen::Scorekeeper => self.on_scorekeeper_key(key),
            Screen::BoxScore => match key.code {
                KeyCode::Char('o') => {
                    self.state.box_sort = self.state.box_sort.next();
                    true
                }
                KeyCode::Char('D') => {
                    self.state.include_dnp = !self.state.include_dnp;
                    true
                }
                _ => false,
            },
            Screen::ShotChart => match key.code {
                KeyCode::Char('t') => {
                    self.cycle_shot_team();
                    true
                }
                KeyCode::Char('p') => {
                    self.cycle_shot_player();
                    true
                }
                _ => false,
            },
            Screen::PlayByPlay => self.on_pbp_key(key),
            Screen::Compare => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.state.toggle_compare();
                    true
                }
                _ => false,
            },
            Screen::Leaders => match key.code {
                KeyCode::Char('o') => {
                    self.state.leader_category = self.state.leader_category.next();
                    true
                }
                _ => false,
            },
            Screen::FourFactors | Screen::GameFlow => false,
        }
    }

    fn on_leagues_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Enter => {
                if let Some(id) = self.state.selected_league().map(|l| l.id) {
                    self.state.enter_league(id);
                    self.load_league();
                    self.goto(Screen::Teams);
                }
            }
            KeyCode::Char('n') => self.state.form = Some(FormState::new_league()),
            KeyCode::Char('J') => self.state.form = Some(FormState::join_league()),
            KeyCode::Char('e') => {
                if let Some(league) = self.state.selected_league() {
                    self.state.form = Some(FormState::edit_league(league));
                }
            }
            KeyCode::Char('i') => {
                if let Some(id) = self.state.selected_league().map(|l| l.id) {
                    self.request(ProviderCommand::RegenerateInviteCode { id });
                }
            }
            KeyCode::Char('x') => {
                if let Some(league) = self.state.selected_league() {
                    let prompt = format!("Delete league {} and everything in it?", league.name);
                    let command = ProviderCommand::DeleteLeague { id: league.id };
                    self.confirm(prompt, command);
                }
            }
            _ => return false,
        }
        true
    }

    fn on_teams_key(&mut self, key: KeyEvent) -> bool {
        let Some(league_id) = self.state.current_league else {
            return false;
        };
        match key.code {
            KeyCode::Enter => {
                if let Some(id) = self.state.selected_team().map(|t| t.id) {
                    if self.state.roster_team != Some(id) {
                        self.state.roster.clear();
                        self.state.roster_selected = 0;
                    }
                    self.state.roster_team = Some(id);
                    self.goto(Screen::Roster);
                }
            }
            KeyCode::Char('n') => self.state.form = Some(FormState::new_team(league_id)),
            KeyCode::Char('e') => {
                if let Some(team) = self.state.selected_team() {
                    self.state.form = Some(FormState::edit_team(team));
                }
            }
            KeyCode::Char('x') => {
                if let Some(team) = self.state.selected_team() {
                    let prompt = format!("Delete team {}?", team.name);
                    let command = ProviderCommand::DeleteTeam {
                        id: team.id,
                        league_id,
                    };
                    self.confirm(prompt, command);
                }
            }
            _ => return false,
        }
        true
    }

    fn on_roster_key(&mut self, key: KeyEvent) -> bool {
        let Some(team_id) = self.state.roster_team else {
            return false;
        };
        match key.code {
            KeyCode::Char('n') => self.state.form = Some(FormState::new_player(team_id)),
            KeyCode::Char('e') => {
                if let Some(player) = self.state.selected_player() {
                    self.state.form = Some(FormState::edit_player(player));
                }
            }
            KeyCode::Char('x') => {
                if let Some(player) = self.state.selected_player() {
                    let prompt = format!("Remove #{} {}?", player.number, player.name);
                    let command = ProviderCommand::DeletePlayer {
                        id: player.id,
                        team_id,
                    };
                    self.confirm(prompt, command);
                }
            }
            _ => return false,
        }
        true
    }

    fn on_games_key(&mut self, key: KeyEvent) -> bool {
        let Some(league_id) = self.state.current_league else {
            return false;
        };
        match key.code {
            KeyCode::Enter => {
                if let Some(game_id) = self.state.selected_game().map(|g| g.id) {
                    self.state.open_game(game_id);
                    self.request(ProviderCommand::LoadGame { game_id });
                    self.goto(Screen::BoxScore);
                }
            }
            KeyCode::Char('s') => {
                let Some(game) = self.state.selected_game() else {
                    return true;
                };
                if game.status == GameStatus::Final {
                    self.state
                        .push_toast(ToastLevel::Info, "Game is final; open it with Enter instead");
                    return true;
                }
                let game_id = game.id;
                let rules = self.state.rules;
                self.state.session = None;
                self.request(ProviderCommand::OpenSession { game_id, rules });
                self.state.screen = Screen::Scorekeeper;
            }
            KeyCode::Char('n') => {
                if self.state.teams.len() < 2 {
                    self.state
                        .push_toast(ToastLevel::Info, "Add at least two teams first");
                } else {
                    self.state.form = Some(FormState::new_game(league_id, &self.state.teams));
                }
            }
            KeyCode::Char('x') => {
                if let Some(game) = self.state.selected_game() {
                    let prompt = format!(
                        "Delete {} vs {} ({})?",
                        self.state.team_abbr(game.home_team_id),
                        self.state.team_abbr(game.away_team_id),
                        game.scheduled_at
                    );
                    let command = ProviderCommand::DeleteGame {
                        id: game.id,
                        league_id,
                    };
                    self.confirm(prompt, command);
                }
            }
            _ => return false,
        }
        true
    }

    fn on_pbp_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('f') => {
                let quarters = self
                    .state
                    .game_view
                    .events
                    .as_deref()
                    .map(quarters_present)
                    .unwrap_or_default();
                self.state.pbp_filter.quarter =
                    next_quarter_filter(self.state.pbp_filter.quarter, &quarters);
                self.state.pbp_scroll = 0;
            }
            KeyCode::Char('s') => {
                self.state.pbp_sort = match self.state.pbp_sort {
                    PbpSort::Chronological => PbpSort::NewestFirst,
                    PbpSort::NewestFirst => PbpSort::Chronological,
                };
                self.state.pbp_scroll = 0;
            }
            KeyCode::Char('g') => {
                self.state.pbp_filter.scoring_only = !self.state.pbp_filter.scoring_only;
                self.state.pbp_scroll = 0;
            }
            KeyCode::Char('t') => {
                self.state.pbp_filter.team = self.next_team_filter(self.state.pbp_filter.team);
                self.state.pbp_scroll = 0;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.state.pbp_scroll = self.state.pbp_scroll.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.pbp_scroll = self.state.pbp_scroll.saturating_sub(1);
            }
            _ => return false,
        }
        true
    }

    /// All teams, then home, then away.
    fn next_team_filter(&self, current: Option<i64>) -> Option<i64> {
        let Some(data) = self.state.game_view.box_data.as_ref() else {
            return None;
        };
        let (home, away) = (data.game.home_team_id, data.game.away_team_id);
        match current {
            None => Some(home),
            Some(id) if id == home => Some(away),
            _ => None,
        }
    }

    fn cycle_shot_team(&mut self) {
        self.state.shot_filter.team = self.next_team_filter(self.state.shot_filter.team);
        self.state.shot_filter.player = None;
    }

    fn cycle_shot_player(&mut self) {
        let Some(shots) = self.state.game_view.shots.as_ref() else {
            return;
        };
        let mut shooters = shots
            .iter()
            .filter(|s| self.state.shot_filter.team.is_none_or(|t| s.team_id == t))
            .map(|s| s.player_id)
            .collect::<Vec<_>>();
        shooters.sort_unstable();
        shooters.dedup();
        let next = match self.state.shot_filter.player {
            None => shooters.first().copied(),
            Some(id) => shooters
                .iter()
                .position(|p| *p == id)
                .and_then(|idx| shooters.get(idx + 1).copied()),
        };
        self.state.shot_filter.player = next;
    }

    fn on_scorekeeper_key(&mut self, key: KeyEvent) -> bool {
        if self.state.session.is_none() {
            return false;
        }
        let action = match key.code {
            KeyCode::Char('2') => Some(StatAction::Made2),
            KeyCode::Char('3') => Some(StatAction::Made3),
            KeyCode::Char('m') => Some(StatAction::Miss2),
            KeyCode::Char('M') => Some(StatAction::Miss3),
            KeyCode::Char('f') => Some(StatAction::FtMade),
            KeyCode::Char('F') => Some(StatAction::FtMiss),
            KeyCode::Char('o') => Some(StatAction::OffRebound),
            KeyCode::Char('d') => Some(StatAction::DefRebound),
            KeyCode::Char('a') => Some(StatAction::Assist),
            KeyCode::Char('s') => Some(StatAction::Steal),
            KeyCode::Char('B') => Some(StatAction::Block),
            KeyCode::Char('t') => Some(StatAction::Turnover),
            KeyCode::Char('p') => Some(StatAction::Foul),
            _ => None,
        };
        if let Some(action) = action {
            self.record(action);
            return true;
        }

        let rows = self.state.scorekeeper_rows().len();
        match key.code {
            KeyCode::Char(' ') => {
                let result = self.state.session.as_mut().map(|session| {
                    if session.game().status == GameStatus::Live {
                        session.pause();
                        Ok(())
                    } else {
                        session.start()
                    }
                });
                self.after_session_change(result);
                self.last_clock = Instant::now();
            }
            KeyCode::Tab => {
                self.state.scorekeeper.side ^= 1;
                self.state.scorekeeper.cursor = 0;
                self.state.scorekeeper.sub_out = None;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if rows > 0 {
                    self.state.scorekeeper.cursor = (self.state.scorekeeper.cursor + 1) % rows;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if rows > 0 {
                    self.state.scorekeeper.cursor =
                        (self.state.scorekeeper.cursor + rows - 1) % rows;
                }
            }
            KeyCode::Char('z') => {
                self.state.scorekeeper.spot = self.state.scorekeeper.spot.next();
            }
            KeyCode::Char('S') => self.substitution(),
            KeyCode::Char('T') => {
                let side = self.state.scorekeeper.side;
                let result = self.state.session.as_mut().map(|session| {
                    let game = session.game();
                    let team = if side == 0 {
                        game.home_team_id
                    } else {
                        game.away_team_id
                    };
                    session.timeout(team).map(|_| ())
                });
                self.after_session_change(result);
            }
            KeyCode::Char('u') => {
                let result = self.state.session.as_mut().map(|session| session.undo());
                self.after_session_change(result);
            }
            KeyCode::Char('N') => {
                let result = self
                    .state
                    .session
                    .as_mut()
                    .map(|session| session.advance_quarter());
                if self.after_session_change(result) {
                    self.save_session();
                }
            }
            KeyCode::Char('E') => {
                let result = self.state.session.as_mut().map(|session| session.finish());
                if self.after_session_change(result) {
                    self.save_session();
                }
            }
            _ => return false,
        }
        true
    }

    /// Marks the session dirty on success or shows the rule that blocked the
    /// action. Returns whether the action went through.
    fn after_session_change(&mut self, result: Option<Result<(), ScoreError>>) -> bool {
        match result {
            Some(Ok(())) => {
                self.state.scorekeeper.dirty = true;
                true
            }
            Some(Err(err)) => {
                self.state.push_toast(ToastLevel::Error, err.to_string());
                false
            }
            None => false,
        }
    }

    fn record(&mut self, action: StatAction) {
        let Some((player, _)) = self.state.scorekeeper_player() else {
            self.state.push_toast(ToastLevel::Info, "No player selected");
            return;
        };
        let mut rec = Recording::new(player.id, action);
        if action.is_field_goal() {
            let three = matches!(action, StatAction::Made3 | StatAction::Miss3);
            let (x, y) = shot_location(self.state.scorekeeper.spot, three);
            rec = rec.at(x, y);
        }
        let result = self
            .state
            .session
            .as_mut()
            .map(|session| session.record(rec).map(|_| ()));
        self.after_session_change(result);
    }

    fn substitution(&mut self) {
        let Some((player, on_court)) = self.state.scorekeeper_player() else {
            return;
        };
        match (self.state.scorekeeper.sub_out, on_court) {
            (None, true) => {
                self.state.scorekeeper.sub_out = Some(player.id);
                self.state
                    .push_log(format!("[INFO] {} to the bench; pick a sub", player.short_name()));
            }
            (None, false) => {
                self.state
                    .push_toast(ToastLevel::Info, "Pick the player leaving the court first");
            }
            (Some(out_id), false) => {
                self.state.scorekeeper.sub_out = None;
                let result = self
                    .state
                    .session
                    .as_mut()
                    .map(|session| session.substitute(out_id, player.id).map(|_| ()));
                self.after_session_change(result);
            }
            (Some(_), true) => {
                // Picking another on-court player changes who goes out.
                self.state.scorekeeper.sub_out = Some(player.id);
            }
        }
    }

    fn save_session(&mut self) {
        if !self.state.scorekeeper.dirty {
            return;
        }
        let Some(snapshot) = self.state.session.as_ref().map(|s| s.snapshot()) else {
            return;
        };
        self.state.scorekeeper.dirty = false;
        self.last_save = Instant::now();
        self.request(ProviderCommand::SaveSession(Box::new(snapshot)));
    }

    fn export_game(&mut self) {
        let Some(game_id) = self.state.game_view.game_id else {
            self.state.push_toast(ToastLevel::Info, "Open a game to export it");
            return;
        };
        let path = format!("hoops_game_{game_id}.xlsx");
        self.state.push_log(format!("[INFO] Exporting game {game_id} to {path}"));
        self.request(ProviderCommand::ExportGame {
            game_id,
            path,
            quarter_minutes: self.state.rules.quarter_minutes,
            run_threshold: self.state.run_threshold,
        });
    }

    /// Runs the game clock, saves live sessions, and keeps viewed games fresh.
    fn on_tick(&mut self) {
        self.state.expire_toasts(Instant::now());

        let elapsed = self.last_clock.elapsed().as_secs() as u32;
        if elapsed >= 1 {
            self.last_clock += Duration::from_secs(elapsed as u64);
            let expired = self.state.session.as_mut().and_then(|session| {
                if session.game().status != GameStatus::Live {
                    return None;
                }
                Some((session.tick(elapsed), session.period_label()))
            });
            if let Some((expired, period)) = expired {
                self.state.scorekeeper.dirty = true;
                if expired {
                    self.state
                        .push_toast(ToastLevel::Info, format!("End of {period}"));
                    self.save_session();
                }
            }
        }

        if self.state.scorekeeper.dirty && self.last_save.elapsed() >= self.refresh {
            self.save_session();
        }

        let watching_live = self.state.screen.is_game_screen()
            && self.state.screen != Screen::Scorekeeper
            && self
                .state
                .game_view
                .box_data
                .as_ref()
                .is_some_and(|d| d.game.status == GameStatus::Live);
        if watching_live && self.last_refresh.elapsed() >= self.refresh {
            self.refresh_screen();
        }
    }
}

/// Keeps the tagged location consistent with the shot value: a three from an
/// inside spot goes to the top of the key, a two from outside to the elbow.
fn shot_location(spot: ShotSpot, three: bool) -> (f32, f32) {
    let outside = matches!(
        spot,
        ShotSpot::LeftCorner | ShotSpot::RightCorner | ShotSpot::TopOfKey
    );
    let spot = match (three, outside) {
        (true, false) => ShotSpot::TopOfKey,
        (false, true) if spot == ShotSpot::LeftCorner => ShotSpot::LeftElbow,
        (false, true) if spot == ShotSpot::RightCorner => ShotSpot::RightElbow,
        (false, true) => ShotSpot::Paint,
        _ => spot,
    };
    spot.location()
}

fn open_backend(config: &Config) -> anyhow::Result<Box<dyn StatsBackend>> {
    if let Some(url) = config.backend_url.as_deref() {
        return Ok(Box::new(RemoteBackend::new(url, config.backend_token.clone())));
    }
    let backend = match config.db_path.as_deref() {
        Some(path) => SqliteBackend::open(path)?,
        None => SqliteBackend::open_in_memory()?,
    };
    Ok(Box::new(backend))
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = Config::from_env();
    if let Err(err) = init_logging(&config) {
        eprintln!("warning: logging disabled: {err:#}");
    }
    let backend = match open_backend(&config) {
        Ok(backend) => backend,
        Err(err) => {
            eprintln!("error: {err:#}");
            return Ok(());
        }
    };

    let mut state = AppState::with_config(&config);
    state.backend_label = backend.describe();
    persist::load_into_state(&mut state);

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let worker = spawn_provider(backend, tx, cmd_rx, &config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let term_backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(term_backend)?;

    let mut app = App::new(state, Some(cmd_tx), config.refresh);
    app.request(ProviderCommand::LoadLeagues {
        user: app.state.user.clone(),
    });
    app.load_league();
    if matches!(app.state.screen, Screen::Compare | Screen::Leaders)
        && let Some(league_id) = app.state.current_league
    {
        app.request(ProviderCommand::LoadLeagueStats { league_id });
    }

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    persist::save_from_state(&app.state);
    shutdown(app, worker);

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

/// Lets the worker drain queued saves before the process exits.
fn shutdown(app: App, worker: JoinHandle<()>) {
    drop(app.cmd_tx);
    let _ = worker.join();
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui::ui(f, &app.state))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
