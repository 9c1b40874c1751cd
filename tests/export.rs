use std::fs;
use std::path::PathBuf;

use hoops_terminal::backend::GameBundle;
use hoops_terminal::box_score::BoxScoreData;
use hoops_terminal::export::export_game_workbook;
use hoops_terminal::model::{EventKind, PlayEvent, Shot, scoring_timeline};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn event(seq: u32, clock_secs: u32, kind: EventKind, team_id: i64, score: (u32, u32)) -> PlayEvent {
    PlayEvent {
        id: seq as i64,
        game_id: 1,
        seq,
        quarter: 1,
        clock_secs,
        kind,
        team_id: Some(team_id),
        player_id: Some(if team_id == 10 { 101 } else { 201 }),
        points: kind.points(),
        home_score: score.0,
        away_score: score.1,
        description: String::new(),
    }
}

fn shot(id: i64, player_id: i64, team_id: i64, x: f32, y: f32, made: bool, is_three: bool) -> Shot {
    Shot {
        id,
        game_id: 1,
        player_id,
        team_id,
        quarter: 1,
        clock_secs: 500,
        x,
        y,
        made,
        is_three,
    }
}

fn bundle() -> GameBundle {
    let data: BoxScoreData =
        serde_json::from_str(&read_fixture("box_score.json")).expect("fixture should parse");
    let events = vec![
        event(1, 580, EventKind::Made2, 10, (2, 0)),
        event(2, 550, EventKind::Made3, 10, (5, 0)),
        event(3, 520, EventKind::DefRebound, 20, (5, 0)),
        event(4, 500, EventKind::Made2, 20, (5, 2)),
    ];
    GameBundle {
        data,
        timeline: scoring_timeline(&events),
        events,
        shots: vec![
            shot(1, 101, 10, 0.0, 6.0, true, false),
            shot(2, 101, 10, 22.5, 4.0, true, true),
            shot(3, 201, 20, -3.0, 10.0, true, false),
        ],
    }
}

#[test]
fn workbook_is_written_with_every_view() {
    let dir = std::env::temp_dir().join(format!("hoops_export_{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("game_1.xlsx");

    let report = export_game_workbook(&path, &bundle(), 10, 5).expect("export");

    // Three home players (one DNP) and two away players plus a totals row per team.
    assert_eq!(report.box_rows, 7);
    assert_eq!(report.events, 4);
    assert_eq!(report.shots, 3);
    assert_eq!(report.runs, 1);

    let written = fs::metadata(&path).expect("workbook exists");
    assert!(written.len() > 0);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_directory_is_an_error() {
    let path = std::env::temp_dir()
        .join(format!("hoops_missing_{}", std::process::id()))
        .join("nested")
        .join("game.xlsx");
    let err = export_game_workbook(&path, &bundle(), 10, 8).expect_err("no parent dir");
    assert!(format!("{err:#}").contains("failed writing workbook"));
}
