use serde::{Deserialize, Serialize};

use crate::model::{PlayerId, Shot, TeamId};
use crate::stats;

// Half-court coordinates in feet: x runs sideline to sideline, y out from the baseline.
pub const COURT_HALF_WIDTH: f32 = 25.0;
pub const COURT_LENGTH: f32 = 47.0;
pub const RIM_Y: f32 = 5.25;

const RESTRICTED_RADIUS: f32 = 4.0;
const PAINT_HALF_WIDTH: f32 = 8.0;
const PAINT_DEPTH: f32 = 19.0;
const CORNER_THREE_DEPTH: f32 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotZone {
    RestrictedArea,
    Paint,
    MidRange,
    LeftCorner3,
    RightCorner3,
    AboveBreak3,
}

impl ShotZone {
    pub const ALL: [ShotZone; 6] = [
        ShotZone::RestrictedArea,
        ShotZone::Paint,
        ShotZone::MidRange,
        ShotZone::LeftCorner3,
        ShotZone::RightCorner3,
        ShotZone::AboveBreak3,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ShotZone::RestrictedArea => "Restricted Area",
            ShotZone::Paint => "Paint (Non-RA)",
            ShotZone::MidRange => "Mid-Range",
            ShotZone::LeftCorner3 => "Left Corner 3",
            ShotZone::RightCorner3 => "Right Corner 3",
            ShotZone::AboveBreak3 => "Above the Break 3",
        }
    }

    pub fn is_three(self) -> bool {
        matches!(
            self,
            ShotZone::LeftCorner3 | ShotZone::RightCorner3 | ShotZone::AboveBreak3
        )
    }
}

pub fn distance_to_rim(x: f32, y: f32) -> f32 {
    (x * x + (y - RIM_Y) * (y - RIM_Y)).sqrt()
}

/// The three-point flag recorded by the scorekeeper decides twos vs threes;
/// coordinates only pick the zone within that class.
pub fn classify(shot: &Shot) -> ShotZone {
    let x = shot.x.clamp(-COURT_HALF_WIDTH, COURT_HALF_WIDTH);
    let y = shot.y.clamp(0.0, COURT_LENGTH);
    if shot.is_three {
        if y <= CORNER_THREE_DEPTH {
            if x < 0.0 {
                return ShotZone::LeftCorner3;
            }
            return ShotZone::RightCorner3;
        }
        return ShotZone::AboveBreak3;
    }
    if distance_to_rim(x, y) <= RESTRICTED_RADIUS {
        return ShotZone::RestrictedArea;
    }
    if x.abs() <= PAINT_HALF_WIDTH && y <= PAINT_DEPTH {
        return ShotZone::Paint;
    }
    ShotZone::MidRange
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneStat {
    pub zone: ShotZone,
    pub made: u32,
    pub attempts: u32,
    pub pct: f64,
    pub points_per_shot: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShotFilter {
    pub team: Option<TeamId>,
    pub player: Option<PlayerId>,
}

impl ShotFilter {
    pub fn matches(&self, shot: &Shot) -> bool {
        self.team.is_none_or(|t| shot.team_id == t)
            && self.player.is_none_or(|p| shot.player_id == p)
    }
}

pub fn filter_shots<'a>(shots: &'a [Shot], filter: &ShotFilter) -> Vec<&'a Shot> {
    shots.iter().filter(|s| filter.matches(s)).collect()
}

/// One row per zone, in `ShotZone::ALL` order, including empty zones.
pub fn zone_summary<'a>(shots: impl IntoIterator<Item = &'a Shot>) -> Vec<ZoneStat> {
    let mut made = [0u32; 6];
    let mut attempts = [0u32; 6];
    for shot in shots {
        let zone = classify(shot);
        let idx = ShotZone::ALL
            .iter()
            .position(|z| *z == zone)
            .unwrap_or(0);
        attempts[idx] += 1;
        if shot.made {
            made[idx] += 1;
        }
    }
    ShotZone::ALL
        .into_iter()
        .enumerate()
        .map(|(idx, zone)| {
            let value = if zone.is_three() { 3 } else { 2 };
            ZoneStat {
                zone,
                made: made[idx],
                attempts: attempts[idx],
                pct: stats::pct(made[idx], attempts[idx]),
                points_per_shot: stats::per_game(made[idx] * value, attempts[idx]),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridCell {
    pub made: u32,
    pub missed: u32,
}

/// Bins shots into a `rows` x `cols` grid. Row 0 is the baseline.
pub fn density_grid<'a>(
    shots: impl IntoIterator<Item = &'a Shot>,
    cols: usize,
    rows: usize,
) -> Vec<Vec<GridCell>> {
    let mut grid = vec![vec![GridCell::default(); cols]; rows];
    if cols == 0 || rows == 0 {
        return grid;
    }
    for shot in shots {
        let fx = (shot.x.clamp(-COURT_HALF_WIDTH, COURT_HALF_WIDTH) + COURT_HALF_WIDTH)
            / (2.0 * COURT_HALF_WIDTH);
        let fy = shot.y.clamp(0.0, COURT_LENGTH) / COURT_LENGTH;
        let col = ((fx * cols as f32) as usize).min(cols - 1);
        let row = ((fy * rows as f32) as usize).min(rows - 1);
        let cell = &mut grid[row][col];
        if shot.made {
            cell.made += 1;
        } else {
            cell.missed += 1;
        }
    }
    grid
}

/// Glyph for a grid cell: blank, a miss marker, a make marker, or a mixed marker.
pub fn cell_glyph(cell: GridCell) -> char {
    match (cell.made, cell.missed) {
        (0, 0) => ' ',
        (0, _) => 'x',
        (_, 0) => 'o',
        (m, x) if m >= x => 'O',
        _ => 'X',
    }
}
