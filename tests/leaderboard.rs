use hoops_terminal::compare::{Leader, compare, format_value};
use hoops_terminal::leaderboard::{LeaderCategory, leaders, season_lines, standings};
use hoops_terminal::model::{Game, GameStatus, Player, PlayerGameStats, Position, StatLine, Team};

fn player(id: i64, name: &str) -> Player {
    Player {
        id,
        team_id: 10,
        name: name.to_string(),
        number: id as u8,
        position: Position::SF,
        active: true,
    }
}

fn row(game_id: i64, player_id: i64, line: StatLine) -> PlayerGameStats {
    PlayerGameStats {
        game_id,
        player_id,
        team_id: 10,
        line,
    }
}

fn fixture() -> (Vec<Player>, Vec<PlayerGameStats>) {
    let players = vec![player(1, "Ann Lee"), player(2, "Ben Ortiz"), player(3, "Cal Young")];
    let rows = vec![
        row(
            1,
            1,
            StatLine {
                pts: 20,
                fgm: 8,
                fga: 15,
                ftm: 4,
                fta: 4,
                orb: 2,
                drb: 4,
                ast: 3,
                tov: 1,
                ..StatLine::default()
            },
        ),
        row(
            2,
            1,
            StatLine {
                pts: 10,
                fgm: 5,
                fga: 9,
                ast: 5,
                tov: 1,
                ..StatLine::default()
            },
        ),
        row(
            1,
            2,
            StatLine {
                pts: 16,
                fgm: 6,
                fga: 10,
                fg3m: 4,
                fg3a: 6,
                drb: 3,
                tov: 3,
                ..StatLine::default()
            },
        ),
    ];
    (players, rows)
}

fn team(id: i64, name: &str) -> Team {
    Team {
        id,
        league_id: 1,
        name: name.to_string(),
        city: String::new(),
        abbreviation: name[..3].to_ascii_uppercase(),
    }
}

fn game(id: i64, date: &str, home: i64, away: i64, score: (u32, u32), status: GameStatus) -> Game {
    Game {
        id,
        league_id: 1,
        home_team_id: home,
        away_team_id: away,
        scheduled_at: date.to_string(),
        status,
        quarter: 4,
        clock_secs: 0,
        home_score: score.0,
        away_score: score.1,
    }
}

#[test]
fn season_lines_skip_players_without_games() {
    let (players, rows) = fixture();
    let seasons = season_lines(&players, &rows);
    assert_eq!(seasons.len(), 2);
    assert_eq!(seasons[0].player.id, 1);
    assert_eq!(seasons[0].games, 2);
    assert_eq!(seasons[0].totals.pts, 30);
    assert_eq!(seasons[0].totals.reb(), 6);
    assert!((seasons[0].ppg() - 15.0).abs() < 1e-9);
    assert!((seasons[0].apg() - 4.0).abs() < 1e-9);
}

#[test]
fn leaders_respect_minimum_games() {
    let (players, rows) = fixture();
    let seasons = season_lines(&players, &rows);

    let top = leaders(&seasons, LeaderCategory::Points, 0, 5);
    let names = top.iter().map(|(s, _)| s.player.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["Ben Ortiz", "Ann Lee"]);
    assert!((top[0].1 - 16.0).abs() < 1e-9);

    let qualified = leaders(&seasons, LeaderCategory::Points, 2, 5);
    assert_eq!(qualified.len(), 1);
    assert_eq!(qualified[0].0.player.id, 1);

    let one = leaders(&seasons, LeaderCategory::Assists, 1, 1);
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].0.player.id, 1);
}

#[test]
fn categories_cycle() {
    let mut category = LeaderCategory::Points;
    for _ in 0..LeaderCategory::ALL.len() {
        category = category.next();
    }
    assert_eq!(category, LeaderCategory::Points);
    assert_eq!(LeaderCategory::Efficiency.label(), "EFF");
}

#[test]
fn standings_order_by_record_with_games_back_and_streaks() {
    let teams = vec![team(10, "Alpha"), team(20, "Bravo"), team(30, "Charlie")];
    let games = vec![
        game(3, "2026-01-03 19:00", 10, 30, (70, 72), GameStatus::Final),
        game(1, "2026-01-01 19:00", 10, 20, (80, 70), GameStatus::Final),
        game(2, "2026-01-02 19:00", 20, 30, (60, 65), GameStatus::Final),
        game(4, "2026-01-04 19:00", 20, 10, (0, 0), GameStatus::Scheduled),
    ];
    let table = standings(&games, &teams);

    let order = table.iter().map(|s| s.team.name.as_str()).collect::<Vec<_>>();
    assert_eq!(order, vec!["Charlie", "Alpha", "Bravo"]);

    let alpha = &table[1];
    assert_eq!((alpha.wins, alpha.losses), (1, 1));
    assert_eq!(alpha.point_diff(), 8);
    assert!((alpha.games_back - 1.0).abs() < 1e-9);
    assert_eq!(alpha.streak_label(), "L1");

    assert_eq!(table[0].streak_label(), "W2");
    assert!((table[0].win_pct - 1.0).abs() < 1e-9);
    assert!((table[2].games_back - 2.0).abs() < 1e-9);
    assert_eq!(table[2].streak_label(), "L2");
}

#[test]
fn standings_without_finals_are_all_even() {
    let teams = vec![team(10, "Alpha"), team(20, "Bravo")];
    let table = standings(&[], &teams);
    assert_eq!(table.len(), 2);
    assert!(table.iter().all(|s| s.wins == 0 && s.games_back == 0.0));
    assert_eq!(table[0].streak_label(), "-");
}

#[test]
fn comparison_marks_the_better_side() {
    let (players, rows) = fixture();
    let seasons = season_lines(&players, &rows);
    let rows = compare(&seasons[0], &seasons[1]);

    let find = |label: &str| rows.iter().find(|r| r.label == label).expect("row");
    assert_eq!(find("PPG").leader, Leader::Right);
    assert_eq!(find("APG").leader, Leader::Left);
    // Fewer turnovers wins.
    assert_eq!(find("TOV").leader, Leader::Left);
    assert!(find("3P%").percent);
    assert_eq!(find("3P%").leader, Leader::Right);
    assert_eq!(find("SPG").leader, Leader::Even);
}

#[test]
fn values_format_with_one_decimal() {
    assert_eq!(format_value(52.345, true), "52.3%");
    assert_eq!(format_value(7.0, false), "7.0");
}
