use crate::model::{Player, PlayerGameStats, StatLine};
use crate::stats;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSeason {
    pub player: Player,
    pub games: u32,
    pub totals: StatLine,
}

impl PlayerSeason {
    pub fn from_rows<'a>(
        player: &Player,
        rows: impl IntoIterator<Item = &'a PlayerGameStats>,
    ) -> Self {
        let mut totals = StatLine::default();
        let mut games = 0u32;
        for row in rows.into_iter().filter(|r| r.player_id == player.id) {
            totals.add(&row.line);
            games += 1;
        }
        Self {
            player: player.clone(),
            games,
            totals,
        }
    }

    pub fn ppg(&self) -> f64 {
        stats::per_game(self.totals.pts, self.games)
    }

    pub fn rpg(&self) -> f64 {
        stats::per_game(self.totals.reb(), self.games)
    }

    pub fn apg(&self) -> f64 {
        stats::per_game(self.totals.ast, self.games)
    }

    pub fn efficiency_per_game(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        stats::game_efficiency(&self.totals) as f64 / self.games as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leader {
    Left,
    Right,
    Even,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub label: &'static str,
    pub a: f64,
    pub b: f64,
    pub percent: bool,
    pub leader: Leader,
}

impl ComparisonRow {
    fn new(label: &'static str, a: f64, b: f64, percent: bool, lower_better: bool) -> Self {
        let leader = if (a - b).abs() < 0.05 {
            Leader::Even
        } else if (a > b) != lower_better {
            Leader::Left
        } else {
            Leader::Right
        };
        Self {
            label,
            a,
            b,
            percent,
            leader,
        }
    }
}

pub fn compare(a: &PlayerSeason, b: &PlayerSeason) -> Vec<ComparisonRow> {
    let pg = |s: &PlayerSeason, v: u32| stats::per_game(v, s.games);
    vec![
        ComparisonRow::new("PPG", a.ppg(), b.ppg(), false, false),
        ComparisonRow::new("RPG", a.rpg(), b.rpg(), false, false),
        ComparisonRow::new("APG", a.apg(), b.apg(), false, false),
        ComparisonRow::new("SPG", pg(a, a.totals.stl), pg(b, b.totals.stl), false, false),
        ComparisonRow::new("BPG", pg(a, a.totals.blk), pg(b, b.totals.blk), false, false),
        ComparisonRow::new("TOV", pg(a, a.totals.tov), pg(b, b.totals.tov), false, true),
        ComparisonRow::new(
            "FG%",
            stats::fg_pct(&a.totals),
            stats::fg_pct(&b.totals),
            true,
            false,
        ),
        ComparisonRow::new(
            "3P%",
            stats::three_pct(&a.totals),
            stats::three_pct(&b.totals),
            true,
            false,
        ),
        ComparisonRow::new(
            "FT%",
            stats::ft_pct(&a.totals),
            stats::ft_pct(&b.totals),
            true,
            false,
        ),
        ComparisonRow::new(
            "TS%",
            stats::line_ts_pct(&a.totals),
            stats::line_ts_pct(&b.totals),
            true,
            false,
        ),
        ComparisonRow::new(
            "eFG%",
            stats::line_efg_pct(&a.totals),
            stats::line_efg_pct(&b.totals),
            true,
            false,
        ),
        ComparisonRow::new(
            "EFF",
            a.efficiency_per_game(),
            b.efficiency_per_game(),
            false,
            false,
        ),
    ]
}

pub fn format_value(row_value: f64, percent: bool) -> String {
    if percent {
        format!("{row_value:.1}%")
    } else {
        format!("{row_value:.1}")
    }
}
