use std::fs;
use std::path::PathBuf;

use hoops_terminal::box_score::{BoxScoreData, build_box_score};
use hoops_terminal::four_factors::{Edge, FACTOR_WEIGHTS, analyze, analyze_totals, edge_label};
use hoops_terminal::model::StatLine;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 0.01
}

#[test]
fn factors_from_fixture_totals() {
    let data: BoxScoreData =
        serde_json::from_str(&read_fixture("box_score.json")).expect("fixture should parse");
    let report = analyze(&build_box_score(&data, false), 40);

    assert!(approx(report.home.efg_pct, 52.0));
    assert!(approx(report.away.efg_pct, 47.83));
    assert!(approx(report.home.tov_pct, 9.79));
    assert!(approx(report.away.tov_pct, 16.56));
    assert!(approx(report.home.orb_pct, 28.57));
    assert!(approx(report.away.orb_pct, 22.22));
    assert!(approx(report.home.ft_rate, 24.0));
    assert!(approx(report.away.ft_rate, 21.74));

    assert_eq!(report.rows.len(), 4);
    assert!(report.rows.iter().all(|r| r.edge == Edge::Home));
    assert!(report.composite > 0.0);
    let weights = report.rows.iter().map(|r| r.weight).collect::<Vec<_>>();
    assert_eq!(weights, FACTOR_WEIGHTS.to_vec());
}

#[test]
fn both_teams_share_possessions_and_pace() {
    let data: BoxScoreData =
        serde_json::from_str(&read_fixture("box_score.json")).expect("fixture should parse");
    let report = analyze(&build_box_score(&data, false), 40);

    assert!(approx(report.home_eff.possessions, 27.42));
    assert_eq!(report.home_eff.possessions, report.away_eff.possessions);
    assert!(approx(report.home_eff.off_rating, 109.41));
    assert!(approx(report.home_eff.def_rating, report.away_eff.off_rating));
    assert!(approx(report.home_eff.net_rating, -report.away_eff.net_rating));
    assert!(approx(report.home_eff.pace, 32.90));
}

#[test]
fn lower_turnover_rate_wins_the_edge() {
    let home = StatLine {
        fga: 50,
        fgm: 20,
        tov: 20,
        ..StatLine::default()
    };
    let away = StatLine {
        fga: 50,
        fgm: 20,
        tov: 5,
        ..StatLine::default()
    };
    let report = analyze_totals(&home, &away, 48);
    assert_eq!(report.rows[0].edge, Edge::Even);
    assert_eq!(report.rows[1].edge, Edge::Away);
    assert!(report.composite < 0.0);
    assert_eq!(edge_label(report.rows[1].edge), "AWAY");
}

#[test]
fn empty_totals_stay_finite() {
    let report = analyze_totals(&StatLine::default(), &StatLine::default(), 0);
    assert_eq!(report.composite, 0.0);
    assert_eq!(report.home_eff.pace, 0.0);
    assert_eq!(report.home_eff.off_rating, 0.0);
    assert!(report.rows.iter().all(|r| r.edge == Edge::Even));
}
