use hoops_terminal::backend::LeagueStatsData;
use hoops_terminal::compare::PlayerSeason;
use hoops_terminal::model::{Game, GameStatus, League, Player, Position, StatLine, Team};
use hoops_terminal::scorekeeper::{GameSession, Rules};
use hoops_terminal::state::{
    AppState, Delta, FormState, LoadTarget, ProviderCommand, Screen, ToastLevel, apply_delta,
};
use hoops_terminal::validation::FieldError;

fn league(id: i64, name: &str) -> League {
    League {
        id,
        name: name.to_string(),
        description: String::new(),
        season: "2026".to_string(),
        invite_code: "ABCD2345".to_string(),
        owner: "local".to_string(),
        is_public: false,
        created_at: "2026-01-01 00:00:00".to_string(),
    }
}

fn team(id: i64, league_id: i64, abbr: &str) -> Team {
    Team {
        id,
        league_id,
        name: format!("{abbr} Club"),
        city: "Town".to_string(),
        abbreviation: abbr.to_string(),
    }
}

fn player(id: i64, team_id: i64, number: u8) -> Player {
    Player {
        id,
        team_id,
        name: format!("Player {id}"),
        number,
        position: Position::ALL[(id as usize) % Position::ALL.len()],
        active: true,
    }
}

fn game(id: i64, league_id: i64, status: GameStatus) -> Game {
    Game {
        id,
        league_id,
        home_team_id: 10,
        away_team_id: 20,
        scheduled_at: "2026-02-01 19:00".to_string(),
        status,
        quarter: 0,
        clock_secs: 600,
        home_score: 0,
        away_score: 0,
    }
}

fn season(id: i64, games: u32, pts: u32) -> PlayerSeason {
    PlayerSeason {
        player: player(id, 10, id as u8),
        games,
        totals: StatLine {
            pts,
            ..StatLine::default()
        },
    }
}

fn state_in_league(league_id: i64) -> AppState {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::Leagues(vec![league(1, "Alpha"), league(2, "Bravo")]),
    );
    state.enter_league(league_id);
    state
}

#[test]
fn leagues_delta_keeps_selection_by_id() {
    let mut state = AppState::new();
    state.loading.leagues = true;
    apply_delta(
        &mut state,
        Delta::Leagues(vec![league(1, "Alpha"), league(2, "Bravo")]),
    );
    state.league_selected = 1;
    assert!(!state.loading.leagues);

    apply_delta(
        &mut state,
        Delta::Leagues(vec![league(0, "Aardvark"), league(1, "Alpha"), league(2, "Bravo")]),
    );
    assert_eq!(state.league_selected, 2);
    assert_eq!(state.selected_league().map(|l| l.id), Some(2));
}

#[test]
fn vanished_league_clears_scoped_data() {
    let mut state = state_in_league(2);
    apply_delta(
        &mut state,
        Delta::Teams {
            league_id: 2,
            teams: vec![team(10, 2, "HOM")],
        },
    );
    assert_eq!(state.teams.len(), 1);

    apply_delta(&mut state, Delta::Leagues(vec![league(1, "Alpha")]));
    assert_eq!(state.current_league, None);
    assert!(state.teams.is_empty());
    assert_eq!(state.league_selected, 0);
}

#[test]
fn deltas_for_another_league_are_ignored() {
    let mut state = state_in_league(1);
    state.loading.teams = true;
    apply_delta(
        &mut state,
        Delta::Teams {
            league_id: 2,
            teams: vec![team(30, 2, "OTH")],
        },
    );
    assert!(state.teams.is_empty());
    assert!(state.loading.teams);

    apply_delta(
        &mut state,
        Delta::Games {
            league_id: 2,
            games: vec![game(5, 2, GameStatus::Scheduled)],
        },
    );
    assert!(state.games.is_empty());

    apply_delta(
        &mut state,
        Delta::LeagueStats {
            league_id: 2,
            data: LeagueStatsData::default(),
            seasons: vec![season(1, 1, 10)],
        },
    );
    assert!(state.league_stats.is_none());
    assert!(state.seasons.is_empty());
}

#[test]
fn roster_delta_only_applies_to_the_picked_team() {
    let mut state = state_in_league(1);
    state.roster_team = Some(10);
    apply_delta(
        &mut state,
        Delta::Roster {
            team_id: 20,
            players: vec![player(200, 20, 4)],
        },
    );
    assert!(state.roster.is_empty());

    apply_delta(
        &mut state,
        Delta::Roster {
            team_id: 10,
            players: vec![player(100, 10, 3), player(101, 10, 8)],
        },
    );
    assert_eq!(state.roster.len(), 2);
}

#[test]
fn removed_roster_team_drops_the_roster() {
    let mut state = state_in_league(1);
    apply_delta(
        &mut state,
        Delta::Teams {
            league_id: 1,
            teams: vec![team(10, 1, "HOM"), team(20, 1, "AWY")],
        },
    );
    state.roster_team = Some(20);
    state.roster = vec![player(200, 20, 4)];
    state.team_selected = 1;

    apply_delta(
        &mut state,
        Delta::Teams {
            league_id: 1,
            teams: vec![team(10, 1, "HOM")],
        },
    );
    assert_eq!(state.roster_team, None);
    assert!(state.roster.is_empty());
    assert_eq!(state.team_selected, 0);
}

#[test]
fn stale_game_deltas_are_ignored() {
    let mut state = state_in_league(1);
    state.open_game(7);

    apply_delta(
        &mut state,
        Delta::Timeline {
            game_id: 6,
            points: Vec::new(),
        },
    );
    apply_delta(
        &mut state,
        Delta::Shots {
            game_id: 6,
            shots: Vec::new(),
        },
    );
    assert!(state.game_view.timeline.is_none());
    assert!(state.game_view.shots.is_none());

    apply_delta(
        &mut state,
        Delta::PlayByPlay {
            game_id: 7,
            events: Vec::new(),
        },
    );
    assert_eq!(state.game_view.events.as_ref().map(Vec::len), Some(0));
}

#[test]
fn session_ready_switches_to_scorekeeper() {
    let mut state = state_in_league(1);
    let home = (0..5).map(|i| player(100 + i, 10, i as u8)).collect();
    let away = (0..5).map(|i| player(200 + i, 20, i as u8)).collect();
    let session = GameSession::new(game(9, 1, GameStatus::Scheduled), home, away, Rules::default());
    state.loading.session = true;
    state.scorekeeper.cursor = 3;

    apply_delta(&mut state, Delta::SessionReady(Box::new(session)));
    assert_eq!(state.screen, Screen::Scorekeeper);
    assert!(!state.loading.session);
    assert_eq!(state.scorekeeper.cursor, 0);
    assert_eq!(state.game_view.game_id, Some(9));
    assert_eq!(state.scorekeeper_rows().len(), 5);
    assert!(state.scorekeeper_rows().iter().all(|(_, on_court)| *on_court));
}

#[test]
fn session_saved_updates_game_status() {
    let mut state = state_in_league(1);
    apply_delta(
        &mut state,
        Delta::Games {
            league_id: 1,
            games: vec![game(4, 1, GameStatus::Live)],
        },
    );
    apply_delta(
        &mut state,
        Delta::SessionSaved {
            game_id: 4,
            status: GameStatus::Final,
        },
    );
    assert_eq!(state.games[0].status, GameStatus::Final);
}

#[test]
fn joined_league_is_entered_and_announced() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::LeagueJoined(league(3, "Charlie")));
    assert_eq!(state.current_league, Some(3));
    assert_eq!(state.leagues.len(), 1);
    let toast = state.toasts.back().expect("toast");
    assert_eq!(toast.level, ToastLevel::Success);
    assert_eq!(toast.message, "Joined Charlie");
}

#[test]
fn invite_code_delta_updates_league() {
    let mut state = state_in_league(1);
    apply_delta(
        &mut state,
        Delta::InviteCode {
            league_id: 1,
            code: "ZXCV7788".to_string(),
        },
    );
    assert_eq!(state.leagues[0].invite_code, "ZXCV7788");
    assert_eq!(state.last_invite, Some((1, "ZXCV7788".to_string())));
}

#[test]
fn form_errors_stay_on_the_open_form() {
    let mut state = AppState::new();
    let mut form = FormState::new_league();
    form.pending = true;
    state.form = Some(form);

    apply_delta(
        &mut state,
        Delta::FormErrors(vec![FieldError::new("name", "Name is required")]),
    );
    let form = state.form.as_ref().expect("form");
    assert!(!form.pending);
    assert_eq!(form.error_for("name"), Some("Name is required"));

    apply_delta(&mut state, Delta::FormDone);
    assert!(state.form.is_none());
}

#[test]
fn load_failure_clears_flag_and_toasts() {
    let mut state = AppState::new();
    state.loading.game = true;
    apply_delta(
        &mut state,
        Delta::LoadFailed {
            target: LoadTarget::Game,
            message: "game 3 not found".to_string(),
        },
    );
    assert!(!state.loading.game);
    assert_eq!(state.toasts.len(), 1);
    assert_eq!(state.toasts[0].level, ToastLevel::Error);
    assert_eq!(state.logs.back().map(String::as_str), Some("[ERR] game 3 not found"));
}

#[test]
fn toasts_are_capped() {
    let mut state = AppState::new();
    for idx in 0..7 {
        apply_delta(
            &mut state,
            Delta::Toast {
                level: ToastLevel::Info,
                message: format!("toast {idx}"),
            },
        );
    }
    assert_eq!(state.toasts.len(), 4);
    assert_eq!(state.toasts[0].message, "toast 3");
    assert_eq!(state.logs.len(), 7);
}

#[test]
fn compare_toggle_keeps_two_slots() {
    let mut state = state_in_league(1);
    apply_delta(
        &mut state,
        Delta::LeagueStats {
            league_id: 1,
            data: LeagueStatsData::default(),
            seasons: vec![season(1, 2, 30), season(2, 2, 20), season(3, 1, 8)],
        },
    );
    state.screen = Screen::Compare;

    state.toggle_compare();
    state.select_next();
    state.toggle_compare();
    assert_eq!(state.compare_ids, [Some(1), Some(2)]);
    let (a, b) = state.compare_pair().expect("pair");
    assert_eq!((a.player.id, b.player.id), (1, 2));

    state.select_next();
    state.toggle_compare();
    assert_eq!(state.compare_ids, [Some(2), Some(3)]);

    state.toggle_compare();
    assert_eq!(state.compare_ids, [Some(2), None]);
    assert!(state.compare_pair().is_none());
}

#[test]
fn league_stats_drop_unknown_compare_ids() {
    let mut state = state_in_league(1);
    state.compare_ids = [Some(1), Some(9)];
    apply_delta(
        &mut state,
        Delta::LeagueStats {
            league_id: 1,
            data: LeagueStatsData::default(),
            seasons: vec![season(1, 2, 30)],
        },
    );
    assert_eq!(state.compare_ids, [Some(1), None]);
}

#[test]
fn empty_states_guide_the_user() {
    let mut state = AppState::new();
    assert!(
        state
            .empty_state()
            .is_some_and(|t| t.starts_with("No leagues yet"))
    );

    state.screen = Screen::Teams;
    assert_eq!(
        state.empty_state().as_deref(),
        Some("Select a league first (1)")
    );

    let mut state = state_in_league(1);
    state.screen = Screen::BoxScore;
    assert_eq!(
        state.empty_state().as_deref(),
        Some("Open a game from the Games screen (4)")
    );
    state.open_game(2);
    state.loading.game = true;
    assert_eq!(state.empty_state().as_deref(), Some("Loading box score..."));

    state.screen = Screen::Leagues;
    assert!(state.empty_state().is_none());
}

#[test]
fn screen_keys_round_trip() {
    for screen in Screen::ALL {
        assert_eq!(Screen::from_key(screen.key()), Some(screen));
    }
    assert_eq!(Screen::from_key("nope"), None);
}

#[test]
fn game_form_resolves_abbreviations() {
    let mut state = state_in_league(1);
    state.teams = vec![team(10, 1, "HOM"), team(20, 1, "AWY")];
    let form = FormState::new_game(1, &state.teams);
    match form.build_command(&state) {
        Ok(ProviderCommand::CreateGame(input)) => {
            assert_eq!((input.home_team_id, input.away_team_id), (10, 20));
        }
        other => panic!("unexpected {other:?}"),
    }

    let mut form = FormState::new_game(1, &state.teams);
    form.set("away", "zzz");
    let errors = form.build_command(&state).expect_err("unknown team");
    assert_eq!(errors[0].field, "away");

    let mut form = FormState::new_game(1, &state.teams);
    form.set("away", "hom");
    let errors = form.build_command(&state).expect_err("same team");
    assert!(form.error_for("away").is_none());
    assert!(!errors.is_empty());
    state.form = Some(FormState {
        errors,
        ..form
    });
    assert!(state.form.as_ref().and_then(|f| f.error_for("away")).is_some());
}

#[test]
fn player_form_reports_jersey_and_position() {
    let mut state = state_in_league(1);
    state.roster = vec![player(100, 10, 23)];
    let mut form = FormState::new_player(10);
    form.set("name", "New Guy");
    form.set("number", "23");
    form.set("position", "QB");
    let errors = form.build_command(&state).expect_err("invalid player");
    let fields = errors.iter().map(|e| e.field).collect::<Vec<_>>();
    assert!(fields.contains(&"number"));
    assert!(fields.contains(&"position"));

    form.set("number", "24");
    form.set("position", "c");
    match form.build_command(&state) {
        Ok(ProviderCommand::CreatePlayer(input)) => {
            assert_eq!(input.number, 24);
            assert_eq!(input.position, Position::C);
            assert_eq!(input.team_id, 10);
        }
        other => panic!("unexpected {other:?}"),
    }
}
