use crate::box_score::BoxScore;
use crate::model::StatLine;
use crate::stats;

/// Dean Oliver's weights for shooting, turnovers, rebounding and free throws.
pub const FACTOR_WEIGHTS: [f64; 4] = [0.40, 0.25, 0.20, 0.15];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FourFactors {
    pub efg_pct: f64,
    pub tov_pct: f64,
    pub orb_pct: f64,
    pub ft_rate: f64,
}

impl FourFactors {
    pub fn from_totals(team: &StatLine, opp: &StatLine) -> Self {
        Self {
            efg_pct: stats::effective_fg_pct(team.fgm, team.fg3m, team.fga),
            tov_pct: stats::turnover_rate(team.tov, team.fga, team.fta),
            orb_pct: stats::offensive_rebound_pct(team.orb, opp.drb),
            ft_rate: stats::free_throw_rate(team.fta, team.fga),
        }
    }

    fn values(&self) -> [f64; 4] {
        [self.efg_pct, self.tov_pct, self.orb_pct, self.ft_rate]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TeamEfficiency {
    pub possessions: f64,
    pub off_rating: f64,
    pub def_rating: f64,
    pub net_rating: f64,
    pub pace: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Home,
    Away,
    Even,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FactorRow {
    pub label: &'static str,
    pub home: f64,
    pub away: f64,
    pub edge: Edge,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FourFactorsReport {
    pub home: FourFactors,
    pub away: FourFactors,
    pub home_eff: TeamEfficiency,
    pub away_eff: TeamEfficiency,
    pub rows: Vec<FactorRow>,
    /// Weighted sum of factor differences from the home side's view.
    /// Positive favours home.
    pub composite: f64,
}

const LABELS: [&str; 4] = ["eFG%", "TOV%", "ORB%", "FT Rate"];
const EVEN_EPSILON: f64 = 0.05;

pub fn analyze(box_score: &BoxScore, game_minutes: u32) -> FourFactorsReport {
    analyze_totals(&box_score.home.totals, &box_score.away.totals, game_minutes)
}

pub fn analyze_totals(home: &StatLine, away: &StatLine, game_minutes: u32) -> FourFactorsReport {
    let home_ff = FourFactors::from_totals(home, away);
    let away_ff = FourFactors::from_totals(away, home);

    // Both teams get the same possession count: the average of the two estimates.
    let poss = (stats::line_possessions(home) + stats::line_possessions(away)) / 2.0;
    let pace = if game_minutes == 0 {
        0.0
    } else {
        poss * 48.0 / game_minutes as f64
    };
    let home_eff = efficiency(home.pts, away.pts, poss, pace);
    let away_eff = efficiency(away.pts, home.pts, poss, pace);

    let mut rows = Vec::with_capacity(4);
    let mut composite = 0.0;
    for (idx, (h, a)) in home_ff
        .values()
        .into_iter()
        .zip(away_ff.values())
        .enumerate()
    {
        // Turnover rate is the only factor where lower is better.
        let diff = if idx == 1 { a - h } else { h - a };
        let edge = if diff.abs() < EVEN_EPSILON {
            Edge::Even
        } else if diff > 0.0 {
            Edge::Home
        } else {
            Edge::Away
        };
        composite += FACTOR_WEIGHTS[idx] * diff;
        rows.push(FactorRow {
            label: LABELS[idx],
            home: h,
            away: a,
            edge,
            weight: FACTOR_WEIGHTS[idx],
        });
    }

    FourFactorsReport {
        home: home_ff,
        away: away_ff,
        home_eff,
        away_eff,
        rows,
        composite,
    }
}

fn efficiency(pts: u32, opp_pts: u32, poss: f64, pace: f64) -> TeamEfficiency {
    TeamEfficiency {
        possessions: poss,
        off_rating: stats::offensive_rating(pts, poss),
        def_rating: stats::defensive_rating(opp_pts, poss),
        net_rating: stats::net_rating(pts, opp_pts, poss),
        pace,
    }
}

pub fn edge_label(edge: Edge) -> &'static str {
    match edge {
        Edge::Home => "HOME",
        Edge::Away => "AWAY",
        Edge::Even => "EVEN",
    }
}
