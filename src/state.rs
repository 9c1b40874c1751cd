use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::backend::LeagueStatsData;
use crate::box_score::{BoxScoreData, BoxSort};
use crate::compare::PlayerSeason;
use crate::config::Config;
use crate::leaderboard::LeaderCategory;
use crate::model::{
    Game, GameId, GameStatus, League, LeagueId, LeaguePatch, NewGame, NewLeague, NewPlayer,
    NewTeam, PlayEvent, Player, PlayerId, PlayerPatch, Position, ScoringPoint, Shot, Team, TeamId,
    TeamPatch,
};
use crate::play_by_play::{PbpFilter, PbpSort};
use crate::scorekeeper::{GameSession, Rules, SessionSnapshot};
use crate::shot_chart::ShotFilter;
use crate::validation::{
    FieldError, parse_jersey, validate_game, validate_invite_code, validate_league,
    validate_player, validate_team,
};

const MAX_LOGS: usize = 200;
const MAX_TOASTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Leagues,
    Teams,
    Roster,
    Games,
    Scorekeeper,
    BoxScore,
    ShotChart,
    FourFactors,
    GameFlow,
    PlayByPlay,
    Compare,
    Leaders,
}

impl Screen {
    pub const ALL: [Screen; 12] = [
        Screen::Leagues,
        Screen::Teams,
        Screen::Roster,
        Screen::Games,
        Screen::Scorekeeper,
        Screen::BoxScore,
        Screen::ShotChart,
        Screen::FourFactors,
        Screen::GameFlow,
        Screen::PlayByPlay,
        Screen::Compare,
        Screen::Leaders,
    ];

    /// Analytics tabs cycled with Tab once a game is open.
    pub const GAME_TABS: [Screen; 5] = [
        Screen::BoxScore,
        Screen::ShotChart,
        Screen::FourFactors,
        Screen::GameFlow,
        Screen::PlayByPlay,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Screen::Leagues => "LEAGUES",
            Screen::Teams => "TEAMS",
            Screen::Roster => "ROSTER",
            Screen::Games => "GAMES",
            Screen::Scorekeeper => "SCOREKEEPER",
            Screen::BoxScore => "BOX SCORE",
            Screen::ShotChart => "SHOT CHART",
            Screen::FourFactors => "FOUR FACTORS",
            Screen::GameFlow => "GAME FLOW",
            Screen::PlayByPlay => "PLAY-BY-PLAY",
            Screen::Compare => "COMPARE",
            Screen::Leaders => "LEADERS",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Screen::Leagues => "leagues",
            Screen::Teams => "teams",
            Screen::Roster => "roster",
            Screen::Games => "games",
            Screen::Scorekeeper => "scorekeeper",
            Screen::BoxScore => "box_score",
            Screen::ShotChart => "shot_chart",
            Screen::FourFactors => "four_factors",
            Screen::GameFlow => "game_flow",
            Screen::PlayByPlay => "play_by_play",
            Screen::Compare => "compare",
            Screen::Leaders => "leaders",
        }
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == raw)
    }

    pub fn is_game_screen(self) -> bool {
        Self::GAME_TABS.contains(&self) || self == Screen::Scorekeeper
    }

    pub fn needs_league(self) -> bool {
        !matches!(self, Screen::Leagues)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    pub created: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTarget {
    Leagues,
    Teams,
    Roster,
    Games,
    Game,
    LeagueStats,
    Session,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Loading {
    pub leagues: bool,
    pub teams: bool,
    pub roster: bool,
    pub games: bool,
    pub game: bool,
    pub league_stats: bool,
    pub session: bool,
}

impl Loading {
    pub fn set(&mut self, target: LoadTarget, value: bool) {
        let flag = match target {
            LoadTarget::Leagues => &mut self.leagues,
            LoadTarget::Teams => &mut self.teams,
            LoadTarget::Roster => &mut self.roster,
            LoadTarget::Games => &mut self.games,
            LoadTarget::Game => &mut self.game,
            LoadTarget::LeagueStats => &mut self.league_stats,
            LoadTarget::Session => &mut self.session,
        };
        *flag = value;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    League,
    JoinLeague,
    Team,
    Player,
    Game,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
}

/// An open create/edit dialog. `parent` is the owning league or team id.
#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: FormKind,
    pub mode: FormMode,
    pub parent: i64,
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub errors: Vec<FieldError>,
    pub pending: bool,
}

fn field(key: &'static str, label: &'static str, value: impl Into<String>) -> FormField {
    FormField {
        key,
        label,
        value: value.into(),
    }
}

impl FormState {
    fn new(kind: FormKind, mode: FormMode, parent: i64, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            mode,
            parent,
            fields,
            focus: 0,
            errors: Vec::new(),
            pending: false,
        }
    }

    pub fn new_league() -> Self {
        let season = chrono::Local::now().format("%Y").to_string();
        Self::new(
            FormKind::League,
            FormMode::Create,
            0,
            vec![
                field("name", "Name", ""),
                field("season", "Season", season),
                field("description", "Description", ""),
                field("is_public", "Public (y/n)", "n"),
            ],
        )
    }

    pub fn edit_league(league: &League) -> Self {
        Self::new(
            FormKind::League,
            FormMode::Edit(league.id),
            0,
            vec![
                field("name", "Name", league.name.clone()),
                field("season", "Season", league.season.clone()),
                field("description", "Description", league.description.clone()),
                field("is_public", "Public (y/n)", if league.is_public { "y" } else { "n" }),
            ],
        )
    }

    pub fn join_league() -> Self {
        Self::new(
            FormKind::JoinLeague,
            FormMode::Create,
            0,
            vec![field("invite_code", "Invite code", "")],
        )
    }

    pub fn new_team(league_id: LeagueId) -> Self {
        Self::new(
            FormKind::Team,
            FormMode::Create,
            league_id,
            vec![
                field("name", "Name", ""),
                field("city", "City", ""),
                field("abbreviation", "Abbreviation", ""),
            ],
        )
    }

    pub fn edit_team(team: &Team) -> Self {
        Self::new(
            FormKind::Team,
            FormMode::Edit(team.id),
            team.league_id,
            vec![
                field("name", "Name", team.name.clone()),
                field("city", "City", team.city.clone()),
                field("abbreviation", "Abbreviation", team.abbreviation.clone()),
            ],
        )
    }

    pub fn new_player(team_id: TeamId) -> Self {
        Self::new(
            FormKind::Player,
            FormMode::Create,
            team_id,
            vec![
                field("name", "Name", ""),
                field("number", "Jersey #", ""),
                field("position", "Position", "PG"),
            ],
        )
    }

    pub fn edit_player(player: &Player) -> Self {
        Self::new(
            FormKind::Player,
            FormMode::Edit(player.id),
            player.team_id,
            vec![
                field("name", "Name", player.name.clone()),
                field("number", "Jersey #", player.number.to_string()),
                field("position", "Position", player.position.label()),
            ],
        )
    }

    pub fn new_game(league_id: LeagueId, teams: &[Team]) -> Self {
        let abbr = |idx: usize| {
            teams
                .get(idx)
                .map(|t| t.abbreviation.clone())
                .unwrap_or_default()
        };
        Self::new(
            FormKind::Game,
            FormMode::Create,
            league_id,
            vec![
                field("home", "Home (abbr)", abbr(0)),
                field("away", "Away (abbr)", abbr(1)),
                field(
                    "scheduled_at",
                    "Date",
                    chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
                ),
            ],
        )
    }

    pub fn title(&self) -> &'static str {
        match (self.kind, self.mode) {
            (FormKind::League, FormMode::Create) => "New league",
            (FormKind::League, FormMode::Edit(_)) => "Edit league",
            (FormKind::JoinLeague, _) => "Join league",
            (FormKind::Team, FormMode::Create) => "New team",
            (FormKind::Team, FormMode::Edit(_)) => "Edit team",
            (FormKind::Player, FormMode::Create) => "New player",
            (FormKind::Player, FormMode::Edit(_)) => "Edit player",
            (FormKind::Game, _) => "Schedule game",
        }
    }

    pub fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        if let Some(f) = self.fields.iter_mut().find(|f| f.key == key) {
            f.value = value.into();
        }
    }

    pub fn error_for(&self, key: &str) -> Option<&str> {
        // Game validation reports the pairing under "away_team".
        let key = if key == "away" { "away_team" } else { key };
        self.errors
            .iter()
            .find(|e| e.field == key)
            .map(|e| e.message.as_str())
    }

    pub fn input(&mut self, c: char) {
        if let Some(f) = self.fields.get_mut(self.focus) {
            f.value.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(f) = self.fields.get_mut(self.focus) {
            f.value.pop();
        }
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if self.fields.is_empty() {
            return;
        }
        self.focus = if self.focus == 0 {
            self.fields.len() - 1
        } else {
            self.focus - 1
        };
    }

    /// Validates locally and turns the form into a backend command. The same
    /// checks run again in the backend, so this only saves a round trip.
    pub fn build_command(&self, state: &AppState) -> Result<ProviderCommand, Vec<FieldError>> {
        let editing = match self.mode {
            FormMode::Create => None,
            FormMode::Edit(id) => Some(id),
        };
        match self.kind {
            FormKind::League => {
                let input = NewLeague {
                    name: self.value("name").trim().to_string(),
                    description: self.value("description").trim().to_string(),
                    season: self.value("season").trim().to_string(),
                    is_public: parse_yes(self.value("is_public")),
                };
                validate_league(&input).map_err(|e| e.0)?;
                Ok(match editing {
                    None => ProviderCommand::CreateLeague {
                        input,
                        owner: state.user.clone(),
                    },
                    Some(id) => ProviderCommand::UpdateLeague {
                        id,
                        patch: LeaguePatch {
                            name: Some(input.name),
                            description: Some(input.description),
                            season: Some(input.season),
                            is_public: Some(input.is_public),
                        },
                    },
                })
            }
            FormKind::JoinLeague => {
                let code = validate_invite_code(self.value("invite_code")).map_err(|e| e.0)?;
                Ok(ProviderCommand::JoinLeague {
                    code,
                    user: state.user.clone(),
                })
            }
            FormKind::Team => {
                let input = NewTeam {
                    league_id: self.parent,
                    name: self.value("name").trim().to_string(),
                    city: self.value("city").trim().to_string(),
                    abbreviation: self.value("abbreviation").trim().to_ascii_uppercase(),
                };
                validate_team(&input, &state.teams, editing).map_err(|e| e.0)?;
                Ok(match editing {
                    None => ProviderCommand::CreateTeam(input),
                    Some(id) => ProviderCommand::UpdateTeam {
                        id,
                        patch: TeamPatch {
                            name: Some(input.name),
                            city: Some(input.city),
                            abbreviation: Some(input.abbreviation),
                        },
                    },
                })
            }
            FormKind::Player => {
                let mut errors = Vec::new();
                let number = parse_jersey(self.value("number")).unwrap_or_else(|e| {
                    errors.push(e);
                    0
                });
                let position = Position::parse(self.value("position")).unwrap_or_else(|| {
                    errors.push(FieldError::new(
                        "position",
                        "Position must be PG, SG, SF, PF or C",
                    ));
                    Position::PG
                });
                let input = NewPlayer {
                    team_id: self.parent,
                    name: self.value("name").trim().to_string(),
                    number,
                    position,
                };
                if let Err(err) = validate_player(&input, &state.roster, editing) {
                    // Keep the jersey parse error when both complain about the number.
                    for e in err.0 {
                        if !errors.iter().any(|x: &FieldError| x.field == e.field) {
                            errors.push(e);
                        }
                    }
                }
                if !errors.is_empty() {
                    return Err(errors);
                }
                Ok(match editing {
                    None => ProviderCommand::CreatePlayer(input),
                    Some(id) => ProviderCommand::UpdatePlayer {
                        id,
                        patch: PlayerPatch {
                            name: Some(input.name),
                            number: Some(input.number),
                            position: Some(input.position),
                            active: None,
                        },
                    },
                })
            }
            FormKind::Game => {
                let mut errors = Vec::new();
                let mut resolve = |key: &'static str| {
                    let abbr = self.value(key).trim().to_ascii_uppercase();
                    match state.teams.iter().find(|t| t.abbreviation == abbr) {
                        Some(team) => team.id,
                        None => {
                            errors.push(FieldError::new(key, format!("No team with abbreviation '{abbr}'")));
                            0
                        }
                    }
                };
                let home_team_id = resolve("home");
                let away_team_id = resolve("away");
                if !errors.is_empty() {
                    return Err(errors);
                }
                let input = NewGame {
                    league_id: self.parent,
                    home_team_id,
                    away_team_id,
                    scheduled_at: self.value("scheduled_at").trim().to_string(),
                };
                validate_game(&input).map_err(|e| e.0)?;
                Ok(ProviderCommand::CreateGame(input))
            }
        }
    }
}

fn parse_yes(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "y" | "yes" | "true" | "1"
    )
}

/// A destructive command waiting for y/n.
#[derive(Debug, Clone)]
pub struct ConfirmState {
    pub prompt: String,
    pub command: ProviderCommand,
}

/// Everything fetched for the game currently open in the analytics tabs.
#[derive(Debug, Clone, Default)]
pub struct GameView {
    pub game_id: Option<GameId>,
    pub box_data: Option<BoxScoreData>,
    pub timeline: Option<Vec<ScoringPoint>>,
    pub events: Option<Vec<PlayEvent>>,
    pub shots: Option<Vec<Shot>>,
}

impl GameView {
    fn for_game(game_id: GameId) -> Self {
        Self {
            game_id: Some(game_id),
            ..Self::default()
        }
    }
}

/// Preset court spots for tagging field goal attempts from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotSpot {
    Rim,
    Paint,
    LeftElbow,
    RightElbow,
    LeftCorner,
    RightCorner,
    TopOfKey,
}

impl ShotSpot {
    pub const ALL: [ShotSpot; 7] = [
        ShotSpot::Rim,
        ShotSpot::Paint,
        ShotSpot::LeftElbow,
        ShotSpot::RightElbow,
        ShotSpot::LeftCorner,
        ShotSpot::RightCorner,
        ShotSpot::TopOfKey,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ShotSpot::Rim => "Rim",
            ShotSpot::Paint => "Paint",
            ShotSpot::LeftElbow => "L elbow",
            ShotSpot::RightElbow => "R elbow",
            ShotSpot::LeftCorner => "L corner",
            ShotSpot::RightCorner => "R corner",
            ShotSpot::TopOfKey => "Top",
        }
    }

    /// Court position in feet; corners and top sit beyond the arc.
    pub fn location(self) -> (f32, f32) {
        match self {
            ShotSpot::Rim => (0.0, 6.0),
            ShotSpot::Paint => (3.0, 12.0),
            ShotSpot::LeftElbow => (-12.0, 19.0),
            ShotSpot::RightElbow => (12.0, 19.0),
            ShotSpot::LeftCorner => (-22.5, 4.0),
            ShotSpot::RightCorner => (22.5, 4.0),
            ShotSpot::TopOfKey => (0.0, 29.5),
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Cursor state of the scorekeeping screen.
#[derive(Debug, Clone)]
pub struct ScorekeeperUi {
    pub side: usize,
    pub cursor: usize,
    pub spot: ShotSpot,
    pub sub_out: Option<PlayerId>,
    pub dirty: bool,
}

impl Default for ScorekeeperUi {
    fn default() -> Self {
        Self {
            side: 0,
            cursor: 0,
            spot: ShotSpot::Rim,
            sub_out: None,
            dirty: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub user: String,
    pub rules: Rules,
    pub run_threshold: u32,
    pub toast_secs: u64,
    pub backend_label: String,

    pub leagues: Vec<League>,
    pub league_selected: usize,
    pub current_league: Option<LeagueId>,
    pub last_invite: Option<(LeagueId, String)>,

    pub teams: Vec<Team>,
    pub team_selected: usize,

    pub roster: Vec<Player>,
    pub roster_team: Option<TeamId>,
    pub roster_selected: usize,

    pub games: Vec<Game>,
    pub game_selected: usize,

    pub game_view: GameView,
    pub box_sort: BoxSort,
    pub include_dnp: bool,
    pub pbp_filter: PbpFilter,
    pub pbp_sort: PbpSort,
    pub pbp_scroll: u16,
    pub shot_filter: ShotFilter,

    pub league_stats: Option<LeagueStatsData>,
    pub seasons: Vec<PlayerSeason>,
    pub leader_category: LeaderCategory,
    pub compare_ids: [Option<PlayerId>; 2],
    pub compare_selected: usize,

    pub session: Option<GameSession>,
    pub scorekeeper: ScorekeeperUi,

    pub form: Option<FormState>,
    pub confirm: Option<ConfirmState>,
    pub toasts: VecDeque<Toast>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub loading: Loading,
    pub export_path: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Leagues,
            user: "local".to_string(),
            rules: Rules::default(),
            run_threshold: 8,
            toast_secs: 4,
            backend_label: String::new(),
            leagues: Vec::new(),
            league_selected: 0,
            current_league: None,
            last_invite: None,
            teams: Vec::new(),
            team_selected: 0,
            roster: Vec::new(),
            roster_team: None,
            roster_selected: 0,
            games: Vec::new(),
            game_selected: 0,
            game_view: GameView::default(),
            box_sort: BoxSort::Number,
            include_dnp: false,
            pbp_filter: PbpFilter::default(),
            pbp_sort: PbpSort::Chronological,
            pbp_scroll: 0,
            shot_filter: ShotFilter::default(),
            league_stats: None,
            seasons: Vec::new(),
            leader_category: LeaderCategory::Points,
            compare_ids: [None, None],
            compare_selected: 0,
            session: None,
            scorekeeper: ScorekeeperUi::default(),
            form: None,
            confirm: None,
            toasts: VecDeque::with_capacity(MAX_TOASTS),
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
            loading: Loading::default(),
            export_path: None,
        }
    }

    pub fn with_config(config: &Config) -> Self {
        Self {
            user: config.user.clone(),
            rules: config.rules,
            run_threshold: config.run_threshold,
            toast_secs: config.toast_secs,
            ..Self::new()
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn push_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        let message = message.into();
        let tag = match level {
            ToastLevel::Info | ToastLevel::Success => "[INFO]",
            ToastLevel::Error => "[ERR]",
        };
        self.push_log(format!("{tag} {message}"));
        self.toasts.push_back(Toast {
            level,
            message,
            created: Instant::now(),
        });
        while self.toasts.len() > MAX_TOASTS {
            self.toasts.pop_front();
        }
    }

    pub fn expire_toasts(&mut self, now: Instant) {
        let ttl = Duration::from_secs(self.toast_secs);
        self.toasts
            .retain(|t| now.saturating_duration_since(t.created) < ttl);
    }

    pub fn current_league(&self) -> Option<&League> {
        let id = self.current_league?;
        self.leagues.iter().find(|l| l.id == id)
    }

    pub fn selected_league(&self) -> Option<&League> {
        self.leagues.get(self.league_selected)
    }

    pub fn selected_team(&self) -> Option<&Team> {
        self.teams.get(self.team_selected)
    }

    pub fn selected_player(&self) -> Option<&Player> {
        self.roster.get(self.roster_selected)
    }

    pub fn selected_game(&self) -> Option<&Game> {
        self.games.get(self.game_selected)
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn team_abbr(&self, id: TeamId) -> String {
        self.team(id)
            .map(|t| t.abbreviation.clone())
            .unwrap_or_else(|| format!("#{id}"))
    }

    pub fn roster_team(&self) -> Option<&Team> {
        self.roster_team.and_then(|id| self.team(id))
    }

    /// Sets the league every other screen scopes to, dropping data from the previous one.
    pub fn enter_league(&mut self, league_id: LeagueId) {
        if self.current_league == Some(league_id) {
            return;
        }
        self.current_league = Some(league_id);
        if let Some(idx) = self.leagues.iter().position(|l| l.id == league_id) {
            self.league_selected = idx;
        }
        self.teams.clear();
        self.team_selected = 0;
        self.roster.clear();
        self.roster_team = None;
        self.roster_selected = 0;
        self.games.clear();
        self.game_selected = 0;
        self.game_view = GameView::default();
        self.league_stats = None;
        self.seasons.clear();
        self.session = None;
    }

    pub fn open_game(&mut self, game_id: GameId) {
        if self.game_view.game_id != Some(game_id) {
            self.game_view = GameView::for_game(game_id);
            self.pbp_scroll = 0;
            self.shot_filter = ShotFilter::default();
            self.pbp_filter.team = None;
        }
    }

    fn list_len(&self) -> usize {
        match self.screen {
            Screen::Leagues => self.leagues.len(),
            Screen::Teams => self.teams.len(),
            Screen::Roster => self.roster.len(),
            Screen::Games => self.games.len(),
            Screen::Compare => self.seasons.len(),
            _ => 0,
        }
    }

    fn cursor_mut(&mut self) -> Option<&mut usize> {
        match self.screen {
            Screen::Leagues => Some(&mut self.league_selected),
            Screen::Teams => Some(&mut self.team_selected),
            Screen::Roster => Some(&mut self.roster_selected),
            Screen::Games => Some(&mut self.game_selected),
            Screen::Compare => Some(&mut self.compare_selected),
            _ => None,
        }
    }

    pub fn select_next(&mut self) {
        let total = self.list_len();
        if let Some(cursor) = self.cursor_mut() {
            *cursor = if total == 0 { 0 } else { (*cursor + 1) % total };
        }
    }

    pub fn select_prev(&mut self) {
        let total = self.list_len();
        if let Some(cursor) = self.cursor_mut() {
            *cursor = match (total, *cursor) {
                (0, _) => 0,
                (_, 0) => total - 1,
                (_, c) => c - 1,
            };
        }
    }

    pub fn clamp_selection(&mut self) {
        fn clamp(cursor: &mut usize, total: usize) {
            if total == 0 {
                *cursor = 0;
            } else if *cursor >= total {
                *cursor = total - 1;
            }
        }
        clamp(&mut self.league_selected, self.leagues.len());
        clamp(&mut self.team_selected, self.teams.len());
        clamp(&mut self.roster_selected, self.roster.len());
        clamp(&mut self.game_selected, self.games.len());
        clamp(&mut self.compare_selected, self.seasons.len());
    }

    /// Players on the scorekeeper's highlighted side: on court first, then the bench.
    pub fn scorekeeper_rows(&self) -> Vec<(Player, bool)> {
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };
        let game = session.game();
        let team_id = if self.scorekeeper.side == 0 {
            game.home_team_id
        } else {
            game.away_team_id
        };
        let on_court = session.on_court(team_id);
        let roster = session.roster(team_id);
        let mut rows = on_court
            .iter()
            .filter_map(|id| roster.iter().find(|p| p.id == *id))
            .map(|p| (p.clone(), true))
            .collect::<Vec<_>>();
        rows.extend(
            roster
                .iter()
                .filter(|p| p.active && !on_court.contains(&p.id))
                .map(|p| (p.clone(), false)),
        );
        rows
    }

    pub fn scorekeeper_player(&self) -> Option<(Player, bool)> {
        self.scorekeeper_rows()
            .into_iter()
            .nth(self.scorekeeper.cursor)
    }

    pub fn toggle_compare(&mut self) {
        let Some(id) = self.seasons.get(self.compare_selected).map(|s| s.player.id) else {
            return;
        };
        if let Some(slot) = self.compare_ids.iter_mut().find(|s| **s == Some(id)) {
            *slot = None;
            return;
        }
        match self.compare_ids {
            [None, _] => self.compare_ids[0] = Some(id),
            [Some(_), None] => self.compare_ids[1] = Some(id),
            [Some(_), Some(_)] => self.compare_ids = [self.compare_ids[1], Some(id)],
        }
    }

    pub fn compare_pair(&self) -> Option<(&PlayerSeason, &PlayerSeason)> {
        let find = |id: Option<PlayerId>| {
            let id = id?;
            self.seasons.iter().find(|s| s.player.id == id)
        };
        Some((find(self.compare_ids[0])?, find(self.compare_ids[1])?))
    }

    /// Placeholder shown instead of a screen's content when there is nothing to draw.
    pub fn empty_state(&self) -> Option<String> {
        let need_league = "Select a league first (1)".to_string();
        let need_game = "Open a game from the Games screen (4)".to_string();
        let text = match self.screen {
            Screen::Leagues if self.loading.leagues && self.leagues.is_empty() => {
                "Loading leagues...".to_string()
            }
            Screen::Leagues if self.leagues.is_empty() => {
                "No leagues yet. Press n to create one or J to join with an invite code".to_string()
            }
            s if s.needs_league() && self.current_league.is_none() => need_league,
            Screen::Teams if self.loading.teams && self.teams.is_empty() => {
                "Loading teams...".to_string()
            }
            Screen::Teams if self.teams.is_empty() => {
                "No teams yet. Press n to add one".to_string()
            }
            Screen::Roster if self.roster_team.is_none() => {
                "Pick a team on the Teams screen (2) and press Enter".to_string()
            }
            Screen::Roster if self.loading.roster && self.roster.is_empty() => {
                "Loading roster...".to_string()
            }
            Screen::Roster if self.roster.is_empty() => {
                "No players yet. Press n to add one".to_string()
            }
            Screen::Games if self.loading.games && self.games.is_empty() => {
                "Loading games...".to_string()
            }
            Screen::Games if self.games.is_empty() => {
                "No games scheduled. Press n to schedule one".to_string()
            }
            Screen::Scorekeeper if self.session.is_none() && self.loading.session => {
                "Opening scorekeeper...".to_string()
            }
            Screen::Scorekeeper if self.session.is_none() => {
                "Select a game and press s to keep score".to_string()
            }
            s if s.is_game_screen() && s != Screen::Scorekeeper && self.game_view.game_id.is_none() => {
                need_game
            }
            Screen::BoxScore => match &self.game_view.box_data {
                None if self.loading.game => "Loading box score...".to_string(),
                None => "No box score yet".to_string(),
                Some(data) if data.stats.is_empty() => "No stats yet".to_string(),
                Some(_) => return None,
            },
            Screen::FourFactors => match &self.game_view.box_data {
                None if self.loading.game => "Loading...".to_string(),
                Some(data) if !data.stats.is_empty() => return None,
                _ => "No stats yet".to_string(),
            },
            Screen::ShotChart => match &self.game_view.shots {
                None if self.loading.game => "Loading shots...".to_string(),
                Some(shots) if !shots.is_empty() => return None,
                _ => "No shots recorded yet".to_string(),
            },
            Screen::GameFlow => match &self.game_view.timeline {
                None if self.loading.game => "Loading timeline...".to_string(),
                Some(points) if !points.is_empty() => return None,
                _ => "No scoring yet".to_string(),
            },
            Screen::PlayByPlay => match &self.game_view.events {
                None if self.loading.game => "Loading plays...".to_string(),
                Some(events) if !events.is_empty() => return None,
                _ => "No plays yet".to_string(),
            },
            Screen::Compare | Screen::Leaders => match &self.league_stats {
                None if self.loading.league_stats => "Loading season stats...".to_string(),
                Some(_) if !self.seasons.is_empty() => return None,
                Some(data) if !data.games.is_empty() && self.screen == Screen::Leaders => {
                    return None;
                }
                _ => "No games played yet".to_string(),
            },
            _ => return None,
        };
        Some(text)
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    Leagues(Vec<League>),
    Teams {
        league_id: LeagueId,
        teams: Vec<Team>,
    },
    Roster {
        team_id: TeamId,
        players: Vec<Player>,
    },
    Games {
        league_id: LeagueId,
        games: Vec<Game>,
    },
    BoxScore {
        game_id: GameId,
        data: Box<BoxScoreData>,
    },
    Timeline {
        game_id: GameId,
        points: Vec<ScoringPoint>,
    },
    PlayByPlay {
        game_id: GameId,
        events: Vec<PlayEvent>,
    },
    Shots {
        game_id: GameId,
        shots: Vec<Shot>,
    },
    LeagueStats {
        league_id: LeagueId,
        data: LeagueStatsData,
        seasons: Vec<PlayerSeason>,
    },
    SessionReady(Box<GameSession>),
    SessionSaved {
        game_id: GameId,
        status: GameStatus,
    },
    LeagueJoined(League),
    InviteCode {
        league_id: LeagueId,
        code: String,
    },
    LoadFailed {
        target: LoadTarget,
        message: String,
    },
    FormErrors(Vec<FieldError>),
    FormDone,
    Toast {
        level: ToastLevel,
        message: String,
    },
    ExportFinished {
        path: String,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    LoadLeagues {
        user: String,
    },
    LoadTeams {
        league_id: LeagueId,
    },
    LoadRoster {
        team_id: TeamId,
    },
    LoadGames {
        league_id: LeagueId,
    },
    LoadGame {
        game_id: GameId,
    },
    LoadLeagueStats {
        league_id: LeagueId,
    },
    CreateLeague {
        input: NewLeague,
        owner: String,
    },
    UpdateLeague {
        id: LeagueId,
        patch: LeaguePatch,
    },
    DeleteLeague {
        id: LeagueId,
    },
    JoinLeague {
        code: String,
        user: String,
    },
    RegenerateInviteCode {
        id: LeagueId,
    },
    CreateTeam(NewTeam),
    UpdateTeam {
        id: TeamId,
        patch: TeamPatch,
    },
    DeleteTeam {
        id: TeamId,
        league_id: LeagueId,
    },
    CreatePlayer(NewPlayer),
    UpdatePlayer {
        id: PlayerId,
        patch: PlayerPatch,
    },
    DeletePlayer {
        id: PlayerId,
        team_id: TeamId,
    },
    CreateGame(NewGame),
    DeleteGame {
        id: GameId,
        league_id: LeagueId,
    },
    OpenSession {
        game_id: GameId,
        rules: Rules,
    },
    SaveSession(Box<SessionSnapshot>),
    ExportGame {
        game_id: GameId,
        path: String,
        quarter_minutes: u32,
        run_threshold: u32,
    },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::Leagues(leagues) => {
            let selected = state.selected_league().map(|l| l.id);
            state.leagues = leagues;
            state.loading.leagues = false;
            if let Some(current) = state.current_league
                && !state.leagues.iter().any(|l| l.id == current)
            {
                // League vanished (deleted elsewhere); fall back to the list.
                state.current_league = None;
                state.teams.clear();
                state.games.clear();
                state.roster.clear();
                state.roster_team = None;
                state.game_view = GameView::default();
                state.league_stats = None;
                state.seasons.clear();
            }
            if let Some(id) = selected.or(state.current_league)
                && let Some(idx) = state.leagues.iter().position(|l| l.id == id)
            {
                state.league_selected = idx;
            }
            state.clamp_selection();
        }
        Delta::Teams { league_id, teams } => {
            if state.current_league != Some(league_id) {
                return;
            }
            state.teams = teams;
            state.loading.teams = false;
            if let Some(team_id) = state.roster_team
                && !state.teams.iter().any(|t| t.id == team_id)
            {
                state.roster_team = None;
                state.roster.clear();
            }
            state.clamp_selection();
        }
        Delta::Roster { team_id, players } => {
            // Only update the visible roster if this is still the team the user picked.
            if state.roster_team != Some(team_id) {
                return;
            }
            state.roster = players;
            state.loading.roster = false;
            state.clamp_selection();
        }
        Delta::Games { league_id, games } => {
            if state.current_league != Some(league_id) {
                return;
            }
            let selected = state.selected_game().map(|g| g.id);
            state.games = games;
            state.loading.games = false;
            if let Some(id) = selected
                && let Some(idx) = state.games.iter().position(|g| g.id == id)
            {
                state.game_selected = idx;
            }
            state.clamp_selection();
        }
        Delta::BoxScore { game_id, data } => {
            if state.game_view.game_id != Some(game_id) {
                return;
            }
            state.game_view.box_data = Some(*data);
            state.loading.game = false;
        }
        Delta::Timeline { game_id, points } => {
            if state.game_view.game_id == Some(game_id) {
                state.game_view.timeline = Some(points);
            }
        }
        Delta::PlayByPlay { game_id, events } => {
            if state.game_view.game_id == Some(game_id) {
                state.game_view.events = Some(events);
            }
        }
        Delta::Shots { game_id, shots } => {
            if state.game_view.game_id == Some(game_id) {
                state.game_view.shots = Some(shots);
            }
        }
        Delta::LeagueStats {
            league_id,
            data,
            seasons,
        } => {
            if state.current_league != Some(league_id) {
                return;
            }
            state.league_stats = Some(data);
            state.seasons = seasons;
            state.loading.league_stats = false;
            let known = |id: Option<PlayerId>| {
                id.filter(|id| state.seasons.iter().any(|s| s.player.id == *id))
            };
            state.compare_ids = [known(state.compare_ids[0]), known(state.compare_ids[1])];
            state.clamp_selection();
        }
        Delta::SessionReady(session) => {
            state.loading.session = false;
            state.scorekeeper = ScorekeeperUi::default();
            let game_id = session.game().id;
            state.session = Some(*session);
            state.open_game(game_id);
            state.screen = Screen::Scorekeeper;
            state.push_log(format!("[INFO] Scorekeeper opened for game {game_id}"));
        }
        Delta::SessionSaved { game_id, status } => {
            if let Some(game) = state.games.iter_mut().find(|g| g.id == game_id) {
                game.status = status;
            }
            state.push_log(format!("[INFO] Game {game_id} saved"));
        }
        Delta::LeagueJoined(league) => {
            let id = league.id;
            let name = league.name.clone();
            if !state.leagues.iter().any(|l| l.id == id) {
                state.leagues.push(league);
            }
            state.enter_league(id);
            state.push_toast(ToastLevel::Success, format!("Joined {name}"));
        }
        Delta::InviteCode { league_id, code } => {
            if let Some(league) = state.leagues.iter_mut().find(|l| l.id == league_id) {
                league.invite_code = code.clone();
            }
            state.last_invite = Some((league_id, code));
        }
        Delta::LoadFailed { target, message } => {
            state.loading.set(target, false);
            state.push_toast(ToastLevel::Error, message);
        }
        Delta::FormErrors(errors) => {
            if let Some(form) = state.form.as_mut() {
                form.errors = errors;
                form.pending = false;
            }
        }
        Delta::FormDone => {
            state.form = None;
        }
        Delta::Toast { level, message } => {
            if level == ToastLevel::Error
                && let Some(form) = state.form.as_mut()
            {
                form.pending = false;
            }
            state.push_toast(level, message);
        }
        Delta::ExportFinished { path } => {
            state.push_toast(ToastLevel::Success, format!("Exported {path}"));
            state.export_path = Some(path);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
