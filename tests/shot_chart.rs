use hoops_terminal::model::Shot;
use hoops_terminal::shot_chart::{
    GridCell, ShotFilter, ShotZone, cell_glyph, classify, density_grid, filter_shots,
    zone_summary,
};

fn shot(player_id: i64, team_id: i64, x: f32, y: f32, made: bool, is_three: bool) -> Shot {
    Shot {
        id: 0,
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

#[test]
fn zones_follow_court_geometry() {
    assert_eq!(classify(&shot(1, 10, 0.0, 6.0, true, false)), ShotZone::RestrictedArea);
    assert_eq!(classify(&shot(1, 10, 3.0, 12.0, true, false)), ShotZone::Paint);
    assert_eq!(classify(&shot(1, 10, 12.0, 19.0, false, false)), ShotZone::MidRange);
    assert_eq!(classify(&shot(1, 10, -22.5, 4.0, true, true)), ShotZone::LeftCorner3);
    assert_eq!(classify(&shot(1, 10, 22.5, 4.0, false, true)), ShotZone::RightCorner3);
    assert_eq!(classify(&shot(1, 10, 0.0, 29.5, true, true)), ShotZone::AboveBreak3);
}

#[test]
fn three_point_flag_wins_over_coordinates() {
    // Tagged as a two from a spot behind the arc: still a two.
    assert_eq!(classify(&shot(1, 10, 0.0, 30.0, true, false)), ShotZone::MidRange);
    // Out-of-bounds coordinates are clamped, not rejected.
    assert_eq!(classify(&shot(1, 10, -40.0, -3.0, true, true)), ShotZone::LeftCorner3);
}

#[test]
fn zone_summary_reports_every_zone() {
    let shots = vec![
        shot(1, 10, 0.0, 6.0, true, false),
        shot(1, 10, 0.5, 5.0, false, false),
        shot(2, 10, 0.0, 29.5, true, true),
        shot(2, 10, 0.0, 29.5, false, true),
    ];
    let zones = zone_summary(&shots);
    assert_eq!(zones.len(), ShotZone::ALL.len());

    let ra = zones[0];
    assert_eq!(ra.zone, ShotZone::RestrictedArea);
    assert_eq!((ra.made, ra.attempts), (1, 2));
    assert_eq!(ra.pct, 50.0);
    assert_eq!(ra.points_per_shot, 1.0);

    let above = zones
        .iter()
        .find(|z| z.zone == ShotZone::AboveBreak3)
        .expect("above the break");
    assert_eq!(above.points_per_shot, 1.5);

    let mid = zones
        .iter()
        .find(|z| z.zone == ShotZone::MidRange)
        .expect("mid-range");
    assert_eq!(mid.attempts, 0);
    assert_eq!(mid.pct, 0.0);
}

#[test]
fn filters_by_team_and_player() {
    let shots = vec![
        shot(1, 10, 0.0, 6.0, true, false),
        shot(2, 10, 0.0, 6.0, true, false),
        shot(3, 20, 0.0, 6.0, true, false),
    ];
    let team = ShotFilter {
        team: Some(10),
        player: None,
    };
    assert_eq!(filter_shots(&shots, &team).len(), 2);
    let player = ShotFilter {
        team: Some(10),
        player: Some(2),
    };
    assert_eq!(filter_shots(&shots, &player).len(), 1);
    assert_eq!(filter_shots(&shots, &ShotFilter::default()).len(), 3);
}

#[test]
fn density_grid_bins_corners_and_clamps() {
    let shots = vec![
        shot(1, 10, -25.0, 0.0, true, true),
        shot(1, 10, 25.0, 47.0, false, true),
        shot(1, 10, 99.0, 99.0, false, true),
    ];
    let grid = density_grid(&shots, 10, 5);
    assert_eq!(grid.len(), 5);
    assert_eq!(grid[0].len(), 10);
    assert_eq!(grid[0][0], GridCell { made: 1, missed: 0 });
    assert_eq!(grid[4][9], GridCell { made: 0, missed: 2 });

    assert!(density_grid(&shots, 0, 0).is_empty());
}

#[test]
fn glyphs_distinguish_makes_and_misses() {
    assert_eq!(cell_glyph(GridCell::default()), ' ');
    assert_eq!(cell_glyph(GridCell { made: 0, missed: 2 }), 'x');
    assert_eq!(cell_glyph(GridCell { made: 2, missed: 0 }), 'o');
    assert_eq!(cell_glyph(GridCell { made: 2, missed: 1 }), 'O');
    assert_eq!(cell_glyph(GridCell { made: 1, missed: 3 }), 'X');
}
