use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::{EventKind, PlayEvent, Player, PlayerId, TeamId, quarter_label};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuarterFilter {
    #[default]
    All,
    Quarter(u8),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PbpSort {
    #[default]
    Chronological,
    NewestFirst,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PbpFilter {
    pub quarter: QuarterFilter,
    pub team: Option<TeamId>,
    pub scoring_only: bool,
}

impl PbpFilter {
    pub fn matches(&self, event: &PlayEvent) -> bool {
        if let QuarterFilter::Quarter(q) = self.quarter
            && event.quarter != q
        {
            return false;
        }
        if let Some(team) = self.team
            && event.team_id != Some(team)
        {
            return false;
        }
        if self.scoring_only && !event.kind.is_scoring() {
            return false;
        }
        true
    }
}

/// Quarter ascending, game clock counting down, then insertion order.
pub fn chronological_cmp(a: &PlayEvent, b: &PlayEvent) -> std::cmp::Ordering {
    a.quarter
        .cmp(&b.quarter)
        .then(b.clock_secs.cmp(&a.clock_secs))
        .then(a.seq.cmp(&b.seq))
}

pub fn filter_and_sort<'a>(
    events: &'a [PlayEvent],
    filter: &PbpFilter,
    sort: PbpSort,
) -> Vec<&'a PlayEvent> {
    let mut out = events.iter().filter(|e| filter.matches(e)).collect::<Vec<_>>();
    out.sort_by(|a, b| chronological_cmp(a, b));
    if sort == PbpSort::NewestFirst {
        out.reverse();
    }
    out
}

pub fn quarters_present(events: &[PlayEvent]) -> Vec<u8> {
    events
        .iter()
        .map(|e| e.quarter)
        .filter(|q| *q > 0)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Steps the quarter filter through All -> Q1 -> ... -> last quarter -> All.
pub fn next_quarter_filter(current: QuarterFilter, quarters: &[u8]) -> QuarterFilter {
    match current {
        QuarterFilter::All => quarters
            .first()
            .map(|q| QuarterFilter::Quarter(*q))
            .unwrap_or(QuarterFilter::All),
        QuarterFilter::Quarter(q) => quarters
            .iter()
            .find(|candidate| **candidate > q)
            .map(|next| QuarterFilter::Quarter(*next))
            .unwrap_or(QuarterFilter::All),
    }
}

pub fn quarter_filter_label(filter: QuarterFilter) -> String {
    match filter {
        QuarterFilter::All => "ALL".to_string(),
        QuarterFilter::Quarter(q) => quarter_label(q),
    }
}

pub fn describe(event: &PlayEvent, roster: &HashMap<PlayerId, Player>) -> String {
    if !event.description.is_empty() {
        return event.description.clone();
    }
    let who = event
        .player_id
        .and_then(|id| roster.get(&id))
        .map(|p| format!("#{} {}", p.number, p.short_name()))
        .unwrap_or_else(|| "Team".to_string());
    let what = match event.kind {
        EventKind::Made2 => "made 2-pt shot",
        EventKind::Made3 => "made 3-pt shot",
        EventKind::Miss2 => "missed 2-pt shot",
        EventKind::Miss3 => "missed 3-pt shot",
        EventKind::FtMade => "made free throw",
        EventKind::FtMiss => "missed free throw",
        EventKind::OffRebound => "offensive rebound",
        EventKind::DefRebound => "defensive rebound",
        EventKind::Assist => "assist",
        EventKind::Steal => "steal",
        EventKind::Block => "block",
        EventKind::Turnover => "turnover",
        EventKind::Foul => "personal foul",
        EventKind::Substitution => "substitution",
        EventKind::Timeout => return "Timeout".to_string(),
        EventKind::QuarterStart => return format!("Start of {}", quarter_label(event.quarter)),
        EventKind::QuarterEnd => return format!("End of {}", quarter_label(event.quarter)),
    };
    format!("{who} {what}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreMismatch {
    pub seq: u32,
    pub expected_home: u32,
    pub expected_away: u32,
    pub home_score: u32,
    pub away_score: u32,
}

/// Replays scoring events in chronological order and reports the first one whose
/// recorded running score disagrees with the accumulated points. A scoring event
/// with no team is reported as well.
pub fn validate_running_score(
    events: &[PlayEvent],
    home_team_id: TeamId,
) -> Option<ScoreMismatch> {
    let mut ordered = events.iter().collect::<Vec<_>>();
    ordered.sort_by(|a, b| chronological_cmp(a, b));

    let mut home = 0u32;
    let mut away = 0u32;
    for event in ordered {
        if !event.kind.is_scoring() {
            continue;
        }
        // Points that belong to neither side cannot be replayed.
        let credited = match event.team_id {
            Some(team_id) if team_id == home_team_id => {
                home += event.points;
                true
            }
            Some(_) => {
                away += event.points;
                true
            }
            None => false,
        };
        if !credited || event.home_score != home || event.away_score != away {
            return Some(ScoreMismatch {
                seq: event.seq,
                expected_home: home,
                expected_away: away,
                home_score: event.home_score,
                away_score: event.away_score,
            });
        }
    }
    None
}
