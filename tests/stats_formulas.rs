use hoops_terminal::model::StatLine;
use hoops_terminal::stats::{
    assist_turnover_ratio, defensive_rebound_pct, effective_fg_pct, fg_pct, free_throw_rate,
    game_efficiency, game_score, net_rating, offensive_rating, per_36, per_game, possessions,
    three_pct, true_shooting_pct, turnover_rate,
};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 0.01
}

fn sample_line() -> StatLine {
    StatLine {
        minutes: 30,
        pts: 20,
        fgm: 8,
        fga: 15,
        fg3m: 2,
        fg3a: 5,
        ftm: 2,
        fta: 2,
        orb: 1,
        drb: 5,
        ast: 4,
        stl: 1,
        blk: 0,
        tov: 2,
        pf: 2,
        plus_minus: 6,
    }
}

#[test]
fn shooting_percentages() {
    let line = sample_line();
    assert!(approx(fg_pct(&line), 53.33));
    assert!(approx(three_pct(&line), 40.0));
    assert!(approx(effective_fg_pct(8, 2, 15), 60.0));
    assert!(approx(true_shooting_pct(20, 15, 2), 62.97));
}

#[test]
fn zero_denominators_yield_zero() {
    let empty = StatLine::default();
    assert_eq!(fg_pct(&empty), 0.0);
    assert_eq!(three_pct(&empty), 0.0);
    assert_eq!(effective_fg_pct(0, 0, 0), 0.0);
    assert_eq!(true_shooting_pct(0, 0, 0), 0.0);
    assert_eq!(turnover_rate(0, 0, 0), 0.0);
    assert_eq!(defensive_rebound_pct(0, 0), 0.0);
    assert_eq!(free_throw_rate(3, 0), 0.0);
    assert_eq!(offensive_rating(10, 0.0), 0.0);
    assert_eq!(per_game(10, 0), 0.0);
    assert_eq!(per_36(10, 0), 0.0);
}

#[test]
fn free_throw_rate_is_a_percentage() {
    assert!(approx(free_throw_rate(6, 25), 24.0));
}

#[test]
fn possessions_never_go_negative() {
    assert!(approx(possessions(25, 6, 4, 3), 26.64));
    assert_eq!(possessions(1, 0, 5, 0), 0.0);
}

#[test]
fn ratings_are_per_hundred_possessions() {
    assert!(approx(offensive_rating(110, 100.0), 110.0));
    assert!(approx(net_rating(110, 100, 100.0), 10.0));
}

#[test]
fn efficiency_and_game_score() {
    let line = sample_line();
    assert_eq!(game_efficiency(&line), 22);
    // 20 + 3.2 - 10.5 - 0 + 0.7 + 1.5 + 1 + 2.8 + 0 - 0.8 - 2
    assert!(approx(game_score(&line), 15.9));
    assert_eq!(game_efficiency(&StatLine::default()), 0);
}

#[test]
fn assist_turnover_ratio_without_turnovers_is_assists() {
    assert_eq!(assist_turnover_ratio(7, 0), 7.0);
    assert!(approx(assist_turnover_ratio(6, 4), 1.5));
}

#[test]
fn per_36_scales_by_minutes() {
    assert!(approx(per_36(20, 30), 24.0));
}
