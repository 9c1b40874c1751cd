use std::sync::mpsc::{self, Receiver};

use hoops_terminal::backend::StatsBackend;
use hoops_terminal::model::{
    Game, GameStatus, League, NewGame, NewLeague, NewPlayer, NewTeam, Position, Team,
};
use hoops_terminal::provider::Provider;
use hoops_terminal::scorekeeper::{Rules, SessionSnapshot};
use hoops_terminal::sqlite_backend::SqliteBackend;
use hoops_terminal::state::{Delta, LoadTarget, ProviderCommand, ToastLevel};

struct Fixture {
    backend: SqliteBackend,
    league: League,
    home: Team,
    away: Team,
    game: Game,
}

fn fixture() -> Fixture {
    let mut backend = SqliteBackend::open_in_memory().expect("open sqlite");
    let league = backend
        .create_league(
            &NewLeague {
                name: "Rec League".to_string(),
                description: String::new(),
                season: "2026".to_string(),
                is_public: false,
            },
            "alice",
        )
        .expect("league");
    let mut teams = Vec::new();
    for (name, abbr) in [("Home Club", "HOM"), ("Away Club", "AWY")] {
        let team = backend
            .create_team(&NewTeam {
                league_id: league.id,
                name: name.to_string(),
                city: "Town".to_string(),
                abbreviation: abbr.to_string(),
            })
            .expect("team");
        for number in 0..5u8 {
            backend
                .create_player(&NewPlayer {
                    team_id: team.id,
                    name: format!("{abbr} Player {number}"),
                    number,
                    position: Position::ALL[number as usize],
                })
                .expect("player");
        }
        teams.push(team);
    }
    let away = teams.pop().expect("away");
    let home = teams.pop().expect("home");
    let game = backend
        .create_game(&NewGame {
            league_id: league.id,
            home_team_id: home.id,
            away_team_id: away.id,
            scheduled_at: "2026-03-01 18:00".to_string(),
        })
        .expect("game");
    Fixture {
        backend,
        league,
        home,
        away,
        game,
    }
}

fn provider_for(backend: SqliteBackend, user: &str) -> (Provider, Receiver<Delta>) {
    let (tx, rx) = mpsc::channel();
    (Provider::new(Box::new(backend), tx, user, 1), rx)
}

fn drain(rx: &Receiver<Delta>) -> Vec<Delta> {
    rx.try_iter().collect()
}

#[test]
fn create_league_closes_form_and_reloads() {
    let backend = SqliteBackend::open_in_memory().expect("open sqlite");
    let (mut provider, rx) = provider_for(backend, "alice");
    provider.handle(ProviderCommand::CreateLeague {
        input: NewLeague {
            name: "Tuesday Night".to_string(),
            description: "Pickup runs".to_string(),
            season: "2026".to_string(),
            is_public: false,
        },
        owner: "alice".to_string(),
    });

    let deltas = drain(&rx);
    assert!(matches!(deltas[0], Delta::FormDone));
    assert!(matches!(
        &deltas[1],
        Delta::Toast { level: ToastLevel::Success, message } if message.starts_with("Created Tuesday Night")
    ));
    match &deltas[2] {
        Delta::Leagues(leagues) => {
            assert_eq!(leagues.len(), 1);
            assert_eq!(leagues[0].owner, "alice");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn invalid_league_reports_field_errors() {
    let backend = SqliteBackend::open_in_memory().expect("open sqlite");
    let (mut provider, rx) = provider_for(backend, "alice");
    provider.handle(ProviderCommand::CreateLeague {
        input: NewLeague {
            name: "  ".to_string(),
            description: String::new(),
            season: "2026".to_string(),
            is_public: false,
        },
        owner: "alice".to_string(),
    });

    let deltas = drain(&rx);
    assert!(matches!(deltas[0], Delta::Log(_)));
    match &deltas[1] {
        Delta::FormErrors(errors) => assert!(errors.iter().any(|e| e.field == "name")),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(deltas.len(), 2);
}

#[test]
fn joining_by_invite_code_enters_the_league() {
    let fx = fixture();
    let code = fx.league.invite_code.to_ascii_lowercase();
    let (mut provider, rx) = provider_for(fx.backend, "bob");
    provider.handle(ProviderCommand::JoinLeague {
        code: code.clone(),
        user: "bob".to_string(),
    });

    let deltas = drain(&rx);
    assert!(matches!(deltas[0], Delta::FormDone));
    assert!(matches!(&deltas[1], Delta::LeagueJoined(l) if l.id == fx.league.id));
    assert!(matches!(&deltas[2], Delta::Leagues(l) if l.len() == 1));
    assert!(matches!(&deltas[3], Delta::Teams { teams, .. } if teams.len() == 2));
    assert!(matches!(&deltas[4], Delta::Games { games, .. } if games.len() == 1));

    provider.handle(ProviderCommand::JoinLeague {
        code,
        user: "bob".to_string(),
    });
    let deltas = drain(&rx);
    match deltas.last() {
        Some(Delta::FormErrors(errors)) => {
            assert_eq!(errors[0].field, "invite_code");
            assert_eq!(errors[0].message, "already a member of Rec League");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unknown_invite_code_lands_on_the_form() {
    let fx = fixture();
    let (mut provider, rx) = provider_for(fx.backend, "bob");
    provider.handle(ProviderCommand::JoinLeague {
        code: "ZZZZ2222".to_string(),
        user: "bob".to_string(),
    });

    match drain(&rx).last() {
        Some(Delta::FormErrors(errors)) => {
            assert_eq!(errors[0].field, "invite_code");
            assert_eq!(errors[0].message, "No league uses that invite code");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn missing_game_fails_the_game_load() {
    let fx = fixture();
    let (mut provider, rx) = provider_for(fx.backend, "alice");
    provider.handle(ProviderCommand::LoadGame { game_id: 999 });

    match drain(&rx).last() {
        Some(Delta::LoadFailed { target, message }) => {
            assert_eq!(*target, LoadTarget::Game);
            assert_eq!(message, "That game no longer exists");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn load_game_sends_every_view() {
    let fx = fixture();
    let game_id = fx.game.id;
    let (mut provider, rx) = provider_for(fx.backend, "alice");
    provider.handle(ProviderCommand::LoadGame { game_id });

    let deltas = drain(&rx);
    assert_eq!(deltas.len(), 4);
    match &deltas[0] {
        Delta::BoxScore { game_id: id, data } => {
            assert_eq!(*id, game_id);
            assert_eq!(data.home_team.abbreviation, "HOM");
            assert_eq!(data.players.len(), 10);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(deltas[1], Delta::Timeline { .. }));
    assert!(matches!(deltas[2], Delta::PlayByPlay { .. }));
    assert!(matches!(deltas[3], Delta::Shots { .. }));
}

#[test]
fn open_session_resumes_a_scheduled_game() {
    let fx = fixture();
    let game_id = fx.game.id;
    let home_id = fx.home.id;
    let (mut provider, rx) = provider_for(fx.backend, "alice");
    provider.handle(ProviderCommand::OpenSession {
        game_id,
        rules: Rules::default(),
    });

    let deltas = drain(&rx);
    match &deltas[0] {
        Delta::SessionReady(session) => {
            assert_eq!(session.game().id, game_id);
            assert_eq!(session.on_court(home_id).len(), 5);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(deltas[1], Delta::BoxScore { .. }));
}

#[test]
fn final_games_cannot_be_reopened() {
    let mut fx = fixture();
    let mut game = fx.game.clone();
    game.status = GameStatus::Final;
    game.quarter = 4;
    game.clock_secs = 0;
    game.home_score = 2;
    fx.backend
        .save_session(&SessionSnapshot {
            game,
            stats: Vec::new(),
            events: Vec::new(),
            shots: Vec::new(),
        })
        .expect("save final");

    let (mut provider, rx) = provider_for(fx.backend, "alice");
    provider.handle(ProviderCommand::OpenSession {
        game_id: fx.game.id,
        rules: Rules::default(),
    });

    let deltas = drain(&rx);
    assert!(!deltas.iter().any(|d| matches!(d, Delta::SessionReady(_))));
    match deltas.last() {
        Some(Delta::LoadFailed { target, message }) => {
            assert_eq!(*target, LoadTarget::Session);
            assert_eq!(message, "Game is already final");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn deleting_a_team_with_games_is_a_toast() {
    let fx = fixture();
    let (mut provider, rx) = provider_for(fx.backend, "alice");
    provider.handle(ProviderCommand::DeleteTeam {
        id: fx.away.id,
        league_id: fx.league.id,
    });

    match drain(&rx).last() {
        Some(Delta::Toast { level, .. }) => assert_eq!(*level, ToastLevel::Error),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(
        provider.backend().list_teams(fx.league.id).expect("teams").len(),
        2
    );
}

#[test]
fn league_stats_include_every_rostered_player() {
    let fx = fixture();
    let (mut provider, rx) = provider_for(fx.backend, "alice");
    provider.handle(ProviderCommand::LoadLeagueStats {
        league_id: fx.league.id,
    });

    match drain(&rx).pop() {
        Some(Delta::LeagueStats {
            league_id,
            data,
            seasons,
        }) => {
            assert_eq!(league_id, fx.league.id);
            assert_eq!(data.teams.len(), 2);
            assert!(seasons.iter().all(|s| s.games == 0));
        }
        other => panic!("unexpected {other:?}"),
    }
}
