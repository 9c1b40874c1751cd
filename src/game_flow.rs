use serde::{Deserialize, Serialize};

use crate::model::{REGULATION_PERIODS, ScoringPoint, period_secs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowPoint {
    pub elapsed_secs: u32,
    pub home: u32,
    pub away: u32,
    /// Home minus away.
    pub margin: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRun {
    pub side: Side,
    pub points: u32,
    pub start_secs: u32,
    pub end_secs: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LargestLead {
    pub points: u32,
    pub at_secs: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowSummary {
    pub lead_changes: u32,
    pub times_tied: u32,
    pub largest_lead_home: LargestLead,
    pub largest_lead_away: LargestLead,
    pub runs: Vec<ScoringRun>,
    pub time_leading_home_secs: u32,
    pub time_leading_away_secs: u32,
    /// Points per period, index 0 is the first quarter.
    pub linescore_home: Vec<u32>,
    pub linescore_away: Vec<u32>,
}

/// Seconds elapsed since tip-off at the given period and remaining clock.
pub fn elapsed_at(quarter: u8, clock_secs: u32, quarter_minutes: u32) -> u32 {
    let q = quarter.max(1);
    let before = (1..q)
        .map(|p| period_secs(p, quarter_minutes))
        .sum::<u32>();
    before + period_secs(q, quarter_minutes).saturating_sub(clock_secs)
}

pub fn flow_points(points: &[ScoringPoint], quarter_minutes: u32) -> Vec<FlowPoint> {
    let mut out = points
        .iter()
        .map(|p| FlowPoint {
            elapsed_secs: elapsed_at(p.quarter, p.clock_secs, quarter_minutes),
            home: p.home_score,
            away: p.away_score,
            margin: p.home_score as i32 - p.away_score as i32,
        })
        .collect::<Vec<_>>();
    out.sort_by_key(|p| (p.elapsed_secs, p.home + p.away));
    out
}

fn leader(margin: i32) -> Option<Side> {
    match margin.signum() {
        1 => Some(Side::Home),
        -1 => Some(Side::Away),
        _ => None,
    }
}

pub fn summarize(
    points: &[ScoringPoint],
    quarter_minutes: u32,
    run_threshold: u32,
) -> FlowSummary {
    let flow = flow_points(points, quarter_minutes);
    let mut summary = FlowSummary::default();
    if flow.is_empty() {
        return summary;
    }

    // Lead changes count flips of the last non-tied leader, so a tie in between
    // still yields exactly one change.
    let mut last_leader: Option<Side> = None;
    let mut prev_margin = 0i32;
    let mut prev_elapsed = 0u32;
    for p in &flow {
        let span = p.elapsed_secs.saturating_sub(prev_elapsed);
        match leader(prev_margin) {
            Some(Side::Home) => summary.time_leading_home_secs += span,
            Some(Side::Away) => summary.time_leading_away_secs += span,
            None => {}
        }

        let now = leader(p.margin);
        if now.is_none() && prev_margin != 0 {
            summary.times_tied += 1;
        }
        if let Some(side) = now {
            if last_leader.is_some_and(|prev| prev != side) {
                summary.lead_changes += 1;
            }
            last_leader = Some(side);
        }

        if p.margin > 0 && p.margin as u32 > summary.largest_lead_home.points {
            summary.largest_lead_home = LargestLead {
                points: p.margin as u32,
                at_secs: p.elapsed_secs,
            };
        }
        if p.margin < 0 && p.margin.unsigned_abs() > summary.largest_lead_away.points {
            summary.largest_lead_away = LargestLead {
                points: p.margin.unsigned_abs(),
                at_secs: p.elapsed_secs,
            };
        }

        prev_margin = p.margin;
        prev_elapsed = p.elapsed_secs;
    }

    summary.runs = scoring_runs(&flow, run_threshold);
    let (home, away) = linescore(points);
    summary.linescore_home = home;
    summary.linescore_away = away;
    summary
}

/// Maximal stretches where only one side scored, kept when they reach `threshold`.
pub fn scoring_runs(flow: &[FlowPoint], threshold: u32) -> Vec<ScoringRun> {
    let mut runs = Vec::new();
    let mut current: Option<ScoringRun> = None;
    let mut prev_home = 0u32;
    let mut prev_away = 0u32;

    for p in flow {
        let home_delta = p.home.saturating_sub(prev_home);
        let away_delta = p.away.saturating_sub(prev_away);
        prev_home = p.home;
        prev_away = p.away;

        let (side, delta) = match (home_delta, away_delta) {
            (0, 0) => continue,
            (h, 0) => (Side::Home, h),
            (0, a) => (Side::Away, a),
            // Both moved in one sample; treat it as breaking any run.
            _ => {
                if let Some(run) = current.take()
                    && run.points >= threshold
                {
                    runs.push(run);
                }
                continue;
            }
        };

        match current.as_mut() {
            Some(run) if run.side == side => {
                run.points += delta;
                run.end_secs = p.elapsed_secs;
            }
            _ => {
                if let Some(run) = current.take()
                    && run.points >= threshold
                {
                    runs.push(run);
                }
                current = Some(ScoringRun {
                    side,
                    points: delta,
                    start_secs: p.elapsed_secs,
                    end_secs: p.elapsed_secs,
                });
            }
        }
    }
    if let Some(run) = current
        && run.points >= threshold
    {
        runs.push(run);
    }
    runs
}

pub fn linescore(points: &[ScoringPoint]) -> (Vec<u32>, Vec<u32>) {
    let periods = points
        .iter()
        .map(|p| p.quarter)
        .max()
        .unwrap_or(0)
        .max(REGULATION_PERIODS) as usize;
    let mut home = vec![0u32; periods];
    let mut away = vec![0u32; periods];

    let mut ordered = points.to_vec();
    ordered.sort_by(|a, b| {
        a.quarter
            .cmp(&b.quarter)
            .then(b.clock_secs.cmp(&a.clock_secs))
            .then(a.seq.cmp(&b.seq))
    });
    let mut prev_home = 0u32;
    let mut prev_away = 0u32;
    for p in ordered {
        let idx = (p.quarter.max(1) - 1) as usize;
        home[idx] += p.home_score.saturating_sub(prev_home);
        away[idx] += p.away_score.saturating_sub(prev_away);
        prev_home = p.home_score;
        prev_away = p.away_score;
    }
    (home, away)
}

/// Margin series resampled to `width` columns for a terminal sparkline. Each
/// column carries the margin of the last scoring play at or before its time.
pub fn sparkline(flow: &[FlowPoint], total_secs: u32, width: usize) -> Vec<i32> {
    if width == 0 {
        return Vec::new();
    }
    let total = total_secs.max(flow.last().map(|p| p.elapsed_secs).unwrap_or(0)).max(1);
    let mut out = Vec::with_capacity(width);
    let mut idx = 0usize;
    let mut margin = 0i32;
    for col in 0..width {
        let t = ((col as u64 + 1) * total as u64 / width as u64) as u32;
        while idx < flow.len() && flow[idx].elapsed_secs <= t {
            margin = flow[idx].margin;
            idx += 1;
        }
        out.push(margin);
    }
    out
}

pub fn game_length_secs(quarters_played: u8, quarter_minutes: u32) -> u32 {
    (1..=quarters_played.max(REGULATION_PERIODS))
        .map(|q| period_secs(q, quarter_minutes))
        .sum()
}

pub fn side_label(side: Side) -> &'static str {
    match side {
        Side::Home => "HOME",
        Side::Away => "AWAY",
    }
}
