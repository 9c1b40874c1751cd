//! Derived basketball statistics.
//!
//! Every percentage is on a 0-100 scale. A zero denominator yields 0, never
//! NaN or infinity, so callers can render results without further checks.

use crate::model::StatLine;

const FTA_WEIGHT: f64 = 0.44;

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den <= 0.0 {
        return 0.0;
    }
    finite_or_zero(num / den)
}

pub fn pct(made: u32, att: u32) -> f64 {
    ratio(made as f64, att as f64) * 100.0
}

pub fn fg_pct(line: &StatLine) -> f64 {
    pct(line.fgm, line.fga)
}

pub fn three_pct(line: &StatLine) -> f64 {
    pct(line.fg3m, line.fg3a)
}

pub fn ft_pct(line: &StatLine) -> f64 {
    pct(line.ftm, line.fta)
}

pub fn effective_fg_pct(fgm: u32, fg3m: u32, fga: u32) -> f64 {
    ratio(fgm as f64 + 0.5 * fg3m as f64, fga as f64) * 100.0
}

pub fn true_shooting_pct(pts: u32, fga: u32, fta: u32) -> f64 {
    ratio(pts as f64, 2.0 * (fga as f64 + FTA_WEIGHT * fta as f64)) * 100.0
}

pub fn turnover_rate(tov: u32, fga: u32, fta: u32) -> f64 {
    ratio(
        tov as f64,
        fga as f64 + FTA_WEIGHT * fta as f64 + tov as f64,
    ) * 100.0
}

pub fn offensive_rebound_pct(orb: u32, opp_drb: u32) -> f64 {
    ratio(orb as f64, (orb + opp_drb) as f64) * 100.0
}

pub fn defensive_rebound_pct(drb: u32, opp_orb: u32) -> f64 {
    ratio(drb as f64, (drb + opp_orb) as f64) * 100.0
}

/// Free throw attempts per field goal attempt, as a percentage.
pub fn free_throw_rate(fta: u32, fga: u32) -> f64 {
    ratio(fta as f64, fga as f64) * 100.0
}

/// Basic possession estimate. Floored at zero for tiny samples where
/// offensive rebounds outnumber the rest.
pub fn possessions(fga: u32, fta: u32, orb: u32, tov: u32) -> f64 {
    let poss = fga as f64 + FTA_WEIGHT * fta as f64 - orb as f64 + tov as f64;
    finite_or_zero(poss).max(0.0)
}

pub fn line_possessions(line: &StatLine) -> f64 {
    possessions(line.fga, line.fta, line.orb, line.tov)
}

/// Points scored per 100 possessions.
pub fn offensive_rating(pts: u32, poss: f64) -> f64 {
    ratio(pts as f64, poss) * 100.0
}

/// Points allowed per 100 possessions.
pub fn defensive_rating(opp_pts: u32, poss: f64) -> f64 {
    ratio(opp_pts as f64, poss) * 100.0
}

pub fn net_rating(pts: u32, opp_pts: u32, poss: f64) -> f64 {
    offensive_rating(pts, poss) - defensive_rating(opp_pts, poss)
}

/// EFF: the box-score efficiency total (positive counters minus misses and turnovers).
pub fn game_efficiency(line: &StatLine) -> i32 {
    let positive = line.pts + line.reb() + line.ast + line.stl + line.blk;
    let missed_fg = line.fga.saturating_sub(line.fgm);
    let missed_ft = line.fta.saturating_sub(line.ftm);
    positive as i32 - missed_fg as i32 - missed_ft as i32 - line.tov as i32
}

/// Hollinger game score.
pub fn game_score(line: &StatLine) -> f64 {
    let missed_ft = line.fta.saturating_sub(line.ftm) as f64;
    let gs = line.pts as f64 + 0.4 * line.fgm as f64 - 0.7 * line.fga as f64 - 0.4 * missed_ft
        + 0.7 * line.orb as f64
        + 0.3 * line.drb as f64
        + line.stl as f64
        + 0.7 * line.ast as f64
        + 0.7 * line.blk as f64
        - 0.4 * line.pf as f64
        - line.tov as f64;
    finite_or_zero(gs)
}

pub fn assist_turnover_ratio(ast: u32, tov: u32) -> f64 {
    if tov == 0 {
        return ast as f64;
    }
    ratio(ast as f64, tov as f64)
}

pub fn per_game(total: u32, games: u32) -> f64 {
    ratio(total as f64, games as f64)
}

pub fn per_36(total: u32, minutes: u32) -> f64 {
    ratio(total as f64 * 36.0, minutes as f64)
}

pub fn line_ts_pct(line: &StatLine) -> f64 {
    true_shooting_pct(line.pts, line.fga, line.fta)
}

pub fn line_efg_pct(line: &StatLine) -> f64 {
    effective_fg_pct(line.fgm, line.fg3m, line.fga)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_guards_zero_and_negative_denominators() {
        assert_eq!(ratio(3.0, 0.0), 0.0);
        assert_eq!(ratio(3.0, -1.0), 0.0);
        assert_eq!(ratio(1.0, 4.0), 0.25);
    }

    #[test]
    fn finite_or_zero_drops_nan() {
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
        assert_eq!(finite_or_zero(1.5), 1.5);
    }
}
