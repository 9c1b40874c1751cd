use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::backend::GameBundle;
use crate::box_score::{BOX_COLUMNS, TeamBox, build_box_score, line_cells, stat_cells};
use crate::four_factors::{self, edge_label};
use crate::game_flow::{self, game_length_secs, side_label};
use crate::model::{Player, PlayerId, format_clock, quarter_label};
use crate::play_by_play::{PbpFilter, PbpSort, describe, filter_and_sort};
use crate::shot_chart::{classify, zone_summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportReport {
    pub box_rows: usize,
    pub events: usize,
    pub shots: usize,
    pub runs: usize,
}

enum Cell {
    Text(String),
    Num(f64),
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Num(value)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Num(value as f64)
    }
}

type Row = Vec<Cell>;

fn header(cols: &[&str]) -> Row {
    cols.iter().map(|c| Cell::from(*c)).collect()
}

/// Writes one game to an `.xlsx` workbook with a sheet per analytics view.
pub fn export_game_workbook(
    path: &Path,
    bundle: &GameBundle,
    quarter_minutes: u32,
    run_threshold: u32,
) -> Result<ExportReport> {
    let box_score = build_box_score(&bundle.data, true);
    let minutes = game_length_secs(bundle.periods(), quarter_minutes) / 60;
    let factors = four_factors::analyze(&box_score, minutes);
    let summary = game_flow::summarize(&bundle.timeline, quarter_minutes, run_threshold);
    let flow = game_flow::flow_points(&bundle.timeline, quarter_minutes);
    let roster: HashMap<PlayerId, Player> = bundle
        .data
        .players
        .iter()
        .map(|p| (p.id, p.clone()))
        .collect();

    let mut box_rows = Vec::new();
    let mut cols = vec!["Team"];
    cols.extend(BOX_COLUMNS);
    box_rows.push(header(&cols));
    for team in [&box_score.home, &box_score.away] {
        push_team_rows(&mut box_rows, team);
    }

    let mut factor_rows = vec![header(&[
        "Factor",
        box_score.home.team.abbreviation.as_str(),
        box_score.away.team.abbreviation.as_str(),
        "Edge",
        "Weight",
    ])];
    for row in &factors.rows {
        factor_rows.push(vec![
            row.label.into(),
            row.home.into(),
            row.away.into(),
            edge_label(row.edge).into(),
            row.weight.into(),
        ]);
    }
    for (label, home, away) in [
        ("Possessions", factors.home_eff.possessions, factors.away_eff.possessions),
        ("Off Rating", factors.home_eff.off_rating, factors.away_eff.off_rating),
        ("Def Rating", factors.home_eff.def_rating, factors.away_eff.def_rating),
        ("Net Rating", factors.home_eff.net_rating, factors.away_eff.net_rating),
        ("Pace", factors.home_eff.pace, factors.away_eff.pace),
    ] {
        factor_rows.push(vec![label.into(), home.into(), away.into()]);
    }
    factor_rows.push(vec!["Composite".into(), factors.composite.into()]);

    let mut flow_rows = vec![header(&["Elapsed", "Home", "Away", "Margin"])];
    for p in &flow {
        flow_rows.push(vec![
            format_clock(p.elapsed_secs).into(),
            p.home.into(),
            p.away.into(),
            (p.margin as f64).into(),
        ]);
    }
    flow_rows.push(Vec::new());
    flow_rows.push(vec!["Lead changes".into(), summary.lead_changes.into()]);
    flow_rows.push(vec!["Times tied".into(), summary.times_tied.into()]);
    flow_rows.push(vec![
        "Largest lead (home)".into(),
        summary.largest_lead_home.points.into(),
    ]);
    flow_rows.push(vec![
        "Largest lead (away)".into(),
        summary.largest_lead_away.points.into(),
    ]);
    flow_rows.push(Vec::new());
    flow_rows.push(header(&["Run", "Points", "From", "To"]));
    for run in &summary.runs {
        flow_rows.push(vec![
            side_label(run.side).into(),
            run.points.into(),
            format_clock(run.start_secs).into(),
            format_clock(run.end_secs).into(),
        ]);
    }

    let mut pbp_rows = vec![header(&["Seq", "Period", "Clock", "Team", "Play", "Score"])];
    let events = filter_and_sort(&bundle.events, &PbpFilter::default(), PbpSort::Chronological);
    for e in &events {
        let team = e
            .team_id
            .map(|id| {
                if id == box_score.home.team.id {
                    box_score.home.team.abbreviation.clone()
                } else {
                    box_score.away.team.abbreviation.clone()
                }
            })
            .unwrap_or_default();
        pbp_rows.push(vec![
            e.seq.into(),
            quarter_label(e.quarter).into(),
            format_clock(e.clock_secs).into(),
            team.into(),
            describe(e, &roster).into(),
            format!("{}-{}", e.home_score, e.away_score).into(),
        ]);
    }

    let mut shot_rows = vec![header(&[
        "Player", "Period", "Clock", "X", "Y", "Zone", "Made", "3PT",
    ])];
    for s in &bundle.shots {
        let name = roster
            .get(&s.player_id)
            .map(|p| p.short_name())
            .unwrap_or_else(|| s.player_id.to_string());
        shot_rows.push(vec![
            name.into(),
            quarter_label(s.quarter).into(),
            format_clock(s.clock_secs).into(),
            (s.x as f64).into(),
            (s.y as f64).into(),
            classify(s).label().into(),
            yes_no(s.made).into(),
            yes_no(s.is_three).into(),
        ]);
    }
    shot_rows.push(Vec::new());
    shot_rows.push(header(&["Zone", "Made", "Att", "Pct", "Pts/Shot"]));
    for z in zone_summary(&bundle.shots) {
        shot_rows.push(vec![
            z.zone.label().into(),
            z.made.into(),
            z.attempts.into(),
            z.pct.into(),
            z.points_per_shot.into(),
        ]);
    }

    let bold = Format::new().set_bold();
    let mut workbook = Workbook::new();
    for (name, rows) in [
        ("BoxScore", &box_rows),
        ("FourFactors", &factor_rows),
        ("GameFlow", &flow_rows),
        ("PlayByPlay", &pbp_rows),
        ("Shots", &shot_rows),
    ] {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name)?;
        write_rows(sheet, rows, &bold)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        box_rows: box_rows.len().saturating_sub(1),
        events: events.len(),
        shots: bundle.shots.len(),
        runs: summary.runs.len(),
    })
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Y" } else { "N" }
}

fn push_team_rows(rows: &mut Vec<Row>, team: &TeamBox) {
    for line in &team.lines {
        let mut row: Row = vec![team.team.abbreviation.clone().into()];
        row.extend(line_cells(line).into_iter().map(Cell::from));
        rows.push(row);
    }
    let mut totals: Row = vec![
        team.team.abbreviation.clone().into(),
        "".into(),
        "TOTAL".into(),
    ];
    totals.extend(stat_cells(&team.totals).into_iter().map(Cell::from));
    rows.push(totals);
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Row], bold: &Format) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        let r = row_idx as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let c = col_idx as u16;
            match cell {
                Cell::Text(value) if row_idx == 0 => worksheet
                    .write_string_with_format(r, c, value, bold)
                    .map(|_| ()),
                Cell::Text(value) => worksheet.write_string(r, c, value).map(|_| ()),
                Cell::Num(value) => worksheet.write_number(r, c, *value).map(|_| ()),
            }
            .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
