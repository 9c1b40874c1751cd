use std::fs;
use std::path::PathBuf;

use hoops_terminal::box_score::{
    BOX_COLUMNS, BoxScoreData, BoxSort, build_box_score, line_cells, sort_box_score, stat_cells,
    top_performers,
};
use hoops_terminal::model::{PlayerGameStats, StatLine};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn fixture() -> BoxScoreData {
    serde_json::from_str(&read_fixture("box_score.json")).expect("fixture should parse")
}

#[test]
fn totals_sum_player_lines_for_this_game_only() {
    let box_score = build_box_score(&fixture(), false);

    let home = &box_score.home.totals;
    assert_eq!(home.pts, 30);
    assert_eq!(home.fgm, 12);
    assert_eq!(home.fga, 25);
    assert_eq!(home.fta, 6);
    assert_eq!(home.reb(), 11);
    assert_eq!(home.minutes, 55);
    assert_eq!(home.plus_minus, 0);

    let away = &box_score.away.totals;
    assert_eq!(away.pts, 26);
    assert_eq!(away.tov, 5);
    assert_eq!(away.reb(), 12);

    assert_eq!(home.pts, box_score.game.home_score);
    assert_eq!(away.pts, box_score.game.away_score);
}

#[test]
fn rows_follow_their_recorded_team_even_without_a_player() {
    let mut data = fixture();
    data.stats.push(PlayerGameStats {
        game_id: 1,
        player_id: 299,
        team_id: 20,
        line: StatLine {
            minutes: 6,
            pts: 4,
            fgm: 2,
            fga: 3,
            ..StatLine::default()
        },
    });
    // Traded since the game: the row still belongs to the home side.
    if let Some(player) = data.players.iter_mut().find(|p| p.id == 102) {
        player.team_id = 20;
    }
    data.game.away_score += 4;

    let box_score = build_box_score(&data, false);
    assert_eq!(box_score.home.totals.pts, box_score.game.home_score);
    assert_eq!(box_score.away.totals.pts, box_score.game.away_score);
    assert!(box_score.home.lines.iter().any(|l| l.player.id == 102));
    assert!(box_score.away.lines.iter().all(|l| l.player.id != 102));

    let orphan = box_score
        .away
        .lines
        .iter()
        .find(|l| l.player.id == 299)
        .expect("orphan row kept");
    assert_eq!(orphan.player.name, "Unknown #299");
    assert_eq!(orphan.line.pts, 4);
}

#[test]
fn dnp_rows_only_when_requested_and_always_last() {
    let data = fixture();
    let without = build_box_score(&data, false);
    assert_eq!(without.home.lines.len(), 2);
    assert!(without.home.lines.iter().all(|l| !l.dnp));

    let mut with = build_box_score(&data, true);
    assert_eq!(with.home.lines.len(), 3);
    sort_box_score(&mut with, BoxSort::Points);
    let last = with.home.lines.last().expect("dnp row");
    assert!(last.dnp);
    assert_eq!(last.player.number, 12);
    assert_eq!(with.home.played().count(), 2);
}

#[test]
fn sorting_by_points_puts_leading_scorer_first() {
    let mut box_score = build_box_score(&fixture(), false);
    sort_box_score(&mut box_score, BoxSort::Points);
    assert_eq!(box_score.home.lines[0].player.id, 101);
    assert_eq!(box_score.away.lines[0].player.id, 201);

    sort_box_score(&mut box_score, BoxSort::Rebounds);
    assert_eq!(box_score.away.lines[0].player.id, 201);

    sort_box_score(&mut box_score, BoxSort::Number);
    let numbers = box_score
        .home
        .lines
        .iter()
        .map(|l| l.player.number)
        .collect::<Vec<_>>();
    assert_eq!(numbers, vec![1, 7]);
}

#[test]
fn efficiency_and_top_performers() {
    let box_score = build_box_score(&fixture(), true);
    let eff = |id| {
        box_score
            .lines()
            .find(|l| l.player.id == id)
            .map(|l| l.efficiency)
            .expect("player line")
    };
    assert_eq!(eff(101), 22);
    assert_eq!(eff(102), 9);
    assert_eq!(eff(201), 16);
    assert_eq!(eff(202), 10);

    let top = top_performers(&box_score, 2);
    let ids = top.iter().map(|l| l.player.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![101, 201]);
}

#[test]
fn cells_line_up_with_columns() {
    let box_score = build_box_score(&fixture(), true);
    for line in box_score.lines() {
        assert_eq!(line_cells(line).len(), BOX_COLUMNS.len());
    }
    let dnp = box_score
        .home
        .lines
        .iter()
        .find(|l| l.dnp)
        .expect("dnp row");
    let cells = line_cells(dnp);
    assert_eq!(cells[1], "C. Dunn");
    assert_eq!(cells[2], "DNP");

    let totals = stat_cells(&box_score.home.totals);
    assert_eq!(totals.len(), BOX_COLUMNS.len() - 2);
    assert_eq!(totals[2], "12-25");
}

#[test]
fn empty_game_has_no_played_lines() {
    let mut data = fixture();
    data.stats.clear();
    let box_score = build_box_score(&data, true);
    assert!(box_score.is_empty());
    assert_eq!(box_score.home.totals.pts, 0);
}
