use std::collections::HashMap;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Sparkline, Table, Wrap};

use hoops_terminal::box_score::{
    BOX_COLUMNS, TeamBox, build_box_score, line_cells, sort_box_score, stat_cells, top_performers,
};
use hoops_terminal::compare::{Leader, compare, format_value};
use hoops_terminal::four_factors::{self, edge_label};
use hoops_terminal::game_flow::{self, Side, game_length_secs};
use hoops_terminal::leaderboard::{leaders, standings};
use hoops_terminal::model::{
    GameStatus, Player, PlayerId, REGULATION_PERIODS, format_clock, quarter_label,
};
use hoops_terminal::play_by_play::{
    describe, filter_and_sort, quarter_filter_label, validate_running_score,
};
use hoops_terminal::shot_chart::{cell_glyph, density_grid, zone_summary};
use hoops_terminal::state::{AppState, FormState, Screen, ToastLevel};

const DIM: Color = Color::DarkGray;

pub fn ui(frame: &mut Frame, state: &AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(header_text(state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(5)])
        .split(chunks[1]);

    let main = Block::default()
        .title(state.screen.label())
        .borders(Borders::ALL);
    let inner = main.inner(body[0]);
    frame.render_widget(main, body[0]);
    match state.empty_state() {
        Some(text) => render_empty(frame, inner, &text),
        None => render_screen(frame, inner, state),
    }

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, body[1]);

    let footer = Paragraph::new(footer_text(state)).style(Style::default().fg(DIM));
    frame.render_widget(footer, chunks[2]);

    if !state.toasts.is_empty() {
        render_toasts(frame, area, state);
    }
    if let Some(form) = state.form.as_ref() {
        render_form(frame, area, form);
    }
    if let Some(confirm) = state.confirm.as_ref() {
        render_confirm(frame, area, &confirm.prompt);
    }
    if state.help_overlay {
        render_help_overlay(frame, area);
    }
}

fn render_screen(frame: &mut Frame, area: Rect, state: &AppState) {
    match state.screen {
        Screen::Leagues => render_leagues(frame, area, state),
        Screen::Teams => render_teams(frame, area, state),
        Screen::Roster => render_roster(frame, area, state),
        Screen::Games => render_games(frame, area, state),
        Screen::Scorekeeper => render_scorekeeper(frame, area, state),
        Screen::BoxScore => render_box_score(frame, area, state),
        Screen::ShotChart => render_shot_chart(frame, area, state),
        Screen::FourFactors => render_four_factors(frame, area, state),
        Screen::GameFlow => render_game_flow(frame, area, state),
        Screen::PlayByPlay => render_play_by_play(frame, area, state),
        Screen::Compare => render_compare(frame, area, state),
        Screen::Leaders => render_leaders(frame, area, state),
    }
}

fn render_empty(frame: &mut Frame, area: Rect, text: &str) {
    let empty = Paragraph::new(text.to_string()).style(Style::default().fg(DIM));
    frame.render_widget(empty, area);
}

fn header_text(state: &AppState) -> String {
    let league = state
        .current_league()
        .map(|l| format!("{} {}", l.name, l.season))
        .unwrap_or_else(|| "no league".to_string());
    let line1 = format!(
        "  (O)  HOOPS TERMINAL | {} | {} | {}",
        state.screen.label(),
        league,
        state.backend_label
    );
    let tabs = Screen::ALL
        .iter()
        .map(|s| {
            if *s == state.screen {
                format!("[{}]", s.label())
            } else {
                s.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!("{line1}\n {tabs}\n")
}

fn footer_text(state: &AppState) -> String {
    let screen = match state.screen {
        Screen::Leagues => "Enter Open | n New | J Join | e Edit | i New invite | x Delete",
        Screen::Teams => "Enter Roster | n New | e Edit | x Delete",
        Screen::Roster => "n New | e Edit | x Remove",
        Screen::Games => "Enter Analyze | s Keep score | n Schedule | x Delete",
        Screen::Scorekeeper => {
            "Space Clock | 2/3 Make | m/M Miss | f/F FT | o/d Reb | a s B t p | S Sub | T Timeout | u Undo | N Next | E End"
        }
        Screen::BoxScore => "o Sort | D DNP | Tab Next tab | X Export",
        Screen::ShotChart => "t Team | p Player | Tab Next tab",
        Screen::FourFactors | Screen::GameFlow => "Tab Next tab | X Export",
        Screen::PlayByPlay => "f Quarter | t Team | g Scoring | s Sort | j/k Scroll",
        Screen::Compare => "Enter Pick player",
        Screen::Leaders => "o Category",
    };
    format!("{screen} | 1-5 Screens | c Compare | L Leaders | r Refresh | ? Help | q Quit")
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn selected_style(selected: bool) -> Style {
    if selected {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    } else {
        Style::default()
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn header_row<'a>(cols: &[&'a str]) -> Row<'a> {
    Row::new(cols.iter().map(|c| Cell::from(*c))).style(bold())
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

/// Renders a selectable list as a table, scrolled so the cursor stays visible.
fn render_list(
    frame: &mut Frame,
    area: Rect,
    columns: &[&str],
    widths: &[Constraint],
    rows: Vec<Vec<String>>,
    selected: usize,
) {
    let visible = area.height.saturating_sub(1) as usize;
    let (start, end) = visible_range(selected, rows.len(), visible);
    let body = rows
        .into_iter()
        .enumerate()
        .skip(start)
        .take(end - start)
        .map(|(idx, cells)| Row::new(cells).style(selected_style(idx == selected)));
    let table = Table::new(body, widths.to_vec()).header(header_row(columns));
    frame.render_widget(table, area);
}

fn render_leagues(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = state
        .leagues
        .iter()
        .map(|l| {
            let marker = if state.current_league == Some(l.id) { "*" } else { "" };
            vec![
                marker.to_string(),
                l.name.clone(),
                l.season.clone(),
                if l.is_public { "public" } else { "private" }.to_string(),
                l.owner.clone(),
                l.invite_code.clone(),
            ]
        })
        .collect();
    render_list(
        frame,
        area,
        &["", "League", "Season", "Access", "Owner", "Invite"],
        &[
            Constraint::Length(1),
            Constraint::Min(20),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(14),
            Constraint::Length(10),
        ],
        rows,
        state.league_selected,
    );
}

fn render_teams(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = state
        .teams
        .iter()
        .map(|t| vec![t.abbreviation.clone(), t.name.clone(), t.city.clone()])
        .collect();
    render_list(
        frame,
        area,
        &["Abbr", "Team", "City"],
        &[
            Constraint::Length(6),
            Constraint::Min(20),
            Constraint::Min(12),
        ],
        rows,
        state.team_selected,
    );
}

fn render_roster(frame: &mut Frame, area: Rect, state: &AppState) {
    let team = state
        .roster_team()
        .map(|t| t.name.clone())
        .unwrap_or_default();
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);
    frame.render_widget(Paragraph::new(team).style(bold()), sections[0]);
    let rows = state
        .roster
        .iter()
        .map(|p| {
            vec![
                p.number.to_string(),
                p.name.clone(),
                p.position.label().to_string(),
                if p.active { "" } else { "inactive" }.to_string(),
            ]
        })
        .collect();
    render_list(
        frame,
        sections[1],
        &["#", "Player", "Pos", ""],
        &[
            Constraint::Length(4),
            Constraint::Min(20),
            Constraint::Length(4),
            Constraint::Length(9),
        ],
        rows,
        state.roster_selected,
    );
}

fn render_games(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = state
        .games
        .iter()
        .map(|g| {
            let score = match g.status {
                GameStatus::Scheduled => "-".to_string(),
                _ => format!("{}-{}", g.home_score, g.away_score),
            };
            let period = match g.status {
                GameStatus::Live | GameStatus::Paused => {
                    format!("{} {}", quarter_label(g.quarter), format_clock(g.clock_secs))
                }
                _ => String::new(),
            };
            vec![
                g.scheduled_at.clone(),
                format!(
                    "{} vs {}",
                    state.team_abbr(g.home_team_id),
                    state.team_abbr(g.away_team_id)
                ),
                g.status.label().to_string(),
                score,
                period,
            ]
        })
        .collect();
    render_list(
        frame,
        area,
        &["Date", "Matchup", "Status", "Score", "Period"],
        &[
            Constraint::Length(17),
            Constraint::Min(12),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(12),
        ],
        rows,
        state.game_selected,
    );
}

fn render_scorekeeper(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(session) = state.session.as_ref() else {
        return;
    };
    let game = session.game();
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let home = state.team_abbr(game.home_team_id);
    let away = state.team_abbr(game.away_team_id);
    let bonus = |team| if session.in_bonus(team) { " BONUS" } else { "" };
    let scoreboard = format!(
        "{home} {:>3}  -  {:<3} {away}    {} {}  [{}]\nFouls {home} {}{}  {away} {}{}    Spot: {}{}",
        game.home_score,
        game.away_score,
        session.period_label(),
        format_clock(game.clock_secs),
        game.status.label(),
        session.team_fouls(game.home_team_id),
        bonus(game.home_team_id),
        session.team_fouls(game.away_team_id),
        bonus(game.away_team_id),
        state.scorekeeper.spot.label(),
        if session.can_undo() { "   (u undo)" } else { "" },
    );
    frame.render_widget(Paragraph::new(scoreboard).style(bold()), sections[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(sections[1]);

    let side_team = if state.scorekeeper.side == 0 {
        game.home_team_id
    } else {
        game.away_team_id
    };
    let rows = state
        .scorekeeper_rows()
        .into_iter()
        .enumerate()
        .map(|(idx, (player, on_court))| {
            let line = session.line(player.id);
            let mut style = selected_style(idx == state.scorekeeper.cursor);
            if session.fouled_out(player.id) {
                style = style.fg(Color::Red);
            } else if state.scorekeeper.sub_out == Some(player.id) {
                style = style.fg(Color::Yellow);
            }
            Row::new(vec![
                if on_court { "*" } else { "" }.to_string(),
                player.number.to_string(),
                player.short_name(),
                line.pts.to_string(),
                format!("{}-{}", line.fgm, line.fga),
                line.reb().to_string(),
                line.ast.to_string(),
                line.pf.to_string(),
                session.minutes_played(player.id).to_string(),
            ])
            .style(style)
        })
        .collect::<Vec<_>>();
    let table = Table::new(
        rows,
        [
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Length(4),
            Constraint::Length(6),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(4),
        ],
    )
    .header(header_row(&["", "#", "Player", "PTS", "FG", "REB", "AST", "PF", "MIN"]))
    .block(
        Block::default()
            .title(format!("{} (Tab to switch)", state.team_abbr(side_team)))
            .borders(Borders::ALL),
    );
    frame.render_widget(table, columns[0]);

    let roster = session
        .roster(game.home_team_id)
        .iter()
        .chain(session.roster(game.away_team_id))
        .map(|p| (p.id, p.clone()))
        .collect::<HashMap<PlayerId, Player>>();
    let visible = columns[1].height.saturating_sub(2) as usize;
    let recent = session
        .events()
        .iter()
        .rev()
        .take(visible)
        .map(|e| {
            format!(
                "{} {} {}",
                quarter_label(e.quarter),
                format_clock(e.clock_secs),
                describe(e, &roster)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let feed = Paragraph::new(recent)
        .block(Block::default().title("Plays").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(feed, columns[1]);
}

fn team_box_table<'a>(team: &TeamBox) -> Table<'a> {
    let mut rows = team
        .lines
        .iter()
        .map(|line| {
            let style = if line.dnp {
                Style::default().fg(DIM)
            } else {
                Style::default()
            };
            Row::new(line_cells(line)).style(style)
        })
        .collect::<Vec<_>>();
    let mut totals = vec![String::new(), "TOTAL".to_string()];
    totals.extend(stat_cells(&team.totals));
    rows.push(Row::new(totals).style(bold()));

    let mut widths = vec![Constraint::Length(3), Constraint::Min(14)];
    widths.extend(std::iter::repeat_n(Constraint::Length(5), BOX_COLUMNS.len() - 2));
    Table::new(rows, widths)
        .header(header_row(&BOX_COLUMNS))
        .block(
            Block::default()
                .title(format!("{} {}", team.team.abbreviation, team.team.name))
                .borders(Borders::TOP),
        )
}

fn render_box_score(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(data) = state.game_view.box_data.as_ref() else {
        return;
    };
    let mut box_score = build_box_score(data, state.include_dnp);
    sort_box_score(&mut box_score, state.box_sort);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Percentage(50),
            Constraint::Percentage(50),
        ])
        .split(area);

    let top = top_performers(&box_score, 3)
        .iter()
        .map(|l| format!("{} {}p/{}r/{}a", l.player.short_name(), l.line.pts, l.line.reb(), l.line.ast))
        .collect::<Vec<_>>()
        .join("  ");
    let summary = format!(
        "{} {}-{} {}  | Sort: {}{} | Top: {}",
        box_score.home.team.abbreviation,
        box_score.game.home_score,
        box_score.game.away_score,
        box_score.away.team.abbreviation,
        state.box_sort.label(),
        if state.include_dnp { " +DNP" } else { "" },
        top
    );
    frame.render_widget(Paragraph::new(summary).style(bold()), sections[0]);
    frame.render_widget(team_box_table(&box_score.home), sections[1]);
    frame.render_widget(team_box_table(&box_score.away), sections[2]);
}

fn render_shot_chart(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(shots) = state.game_view.shots.as_ref() else {
        return;
    };
    let filter = state.shot_filter;
    let filtered = shots.iter().filter(|s| filter.matches(s)).collect::<Vec<_>>();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(44)])
        .split(area);

    let court = Block::default().title(shot_filter_label(state)).borders(Borders::ALL);
    let inner = court.inner(columns[0]);
    frame.render_widget(court, columns[0]);
    let grid = density_grid(
        filtered.iter().copied(),
        inner.width as usize,
        inner.height as usize,
    );
    // Row 0 is the baseline; draw it at the bottom so the rim sits low.
    let text = grid
        .iter()
        .rev()
        .map(|row| row.iter().map(|c| cell_glyph(*c)).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n");
    frame.render_widget(Paragraph::new(text).style(Style::default().fg(Color::Yellow)), inner);

    let rows = zone_summary(filtered.iter().copied())
        .into_iter()
        .map(|z| {
            Row::new(vec![
                z.zone.label().to_string(),
                format!("{}/{}", z.made, z.attempts),
                format!("{:.1}", z.pct),
                format!("{:.2}", z.points_per_shot),
            ])
        })
        .collect::<Vec<_>>();
    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Length(7),
            Constraint::Length(6),
            Constraint::Length(6),
        ],
    )
    .header(header_row(&["Zone", "FG", "Pct", "PPS"]))
    .block(Block::default().title("Zones (o make, x miss)").borders(Borders::ALL));
    frame.render_widget(table, columns[1]);
}

fn shot_filter_label(state: &AppState) -> String {
    let team = state
        .shot_filter
        .team
        .map(|id| state.team_abbr(id))
        .unwrap_or_else(|| "All teams".to_string());
    let player = state.shot_filter.player.and_then(|id| {
        state
            .game_view
            .box_data
            .as_ref()
            .and_then(|d| d.players.iter().find(|p| p.id == id))
            .map(|p| p.short_name())
    });
    match player {
        Some(name) => format!("{team} | {name}"),
        None => team,
    }
}

fn periods_played(state: &AppState) -> u8 {
    let from_events = state
        .game_view
        .events
        .as_ref()
        .and_then(|events| events.iter().map(|e| e.quarter).max())
        .unwrap_or(0);
    let from_game = state
        .game_view
        .box_data
        .as_ref()
        .map(|d| d.game.quarter)
        .unwrap_or(0);
    from_events.max(from_game).max(REGULATION_PERIODS)
}

fn render_four_factors(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(data) = state.game_view.box_data.as_ref() else {
        return;
    };
    let box_score = build_box_score(data, false);
    let minutes = game_length_secs(periods_played(state), state.rules.quarter_minutes) / 60;
    let report = four_factors::analyze(&box_score, minutes);
    let home = box_score.home.team.abbreviation.clone();
    let away = box_score.away.team.abbreviation.clone();

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Length(8), Constraint::Min(1)])
        .split(area);

    let rows = report
        .rows
        .iter()
        .map(|r| {
            Row::new(vec![
                r.label.to_string(),
                format!("{:.1}", r.home),
                format!("{:.1}", r.away),
                edge_label(r.edge).to_string(),
                format!("{:.0}%", r.weight * 100.0),
            ])
        })
        .collect::<Vec<_>>();
    let widths = [
        Constraint::Length(14),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
    ];
    let factors = Table::new(rows, widths)
        .header(header_row(&["Factor", home.as_str(), away.as_str(), "Edge", "Weight"]))
        .block(Block::default().title("Four factors").borders(Borders::BOTTOM));
    frame.render_widget(factors, sections[0]);

    let eff = [
        ("Possessions", report.home_eff.possessions, report.away_eff.possessions),
        ("Off rating", report.home_eff.off_rating, report.away_eff.off_rating),
        ("Def rating", report.home_eff.def_rating, report.away_eff.def_rating),
        ("Net rating", report.home_eff.net_rating, report.away_eff.net_rating),
        ("Pace", report.home_eff.pace, report.away_eff.pace),
    ]
    .into_iter()
    .map(|(label, h, a)| Row::new(vec![label.to_string(), format!("{h:.1}"), format!("{a:.1}")]))
    .collect::<Vec<_>>();
    let efficiency = Table::new(eff, [Constraint::Length(14), Constraint::Length(8), Constraint::Length(8)])
        .header(header_row(&["Efficiency", home.as_str(), away.as_str()]))
        .block(Block::default().title("Ratings").borders(Borders::BOTTOM));
    frame.render_widget(efficiency, sections[1]);

    let leader = if report.composite > 0.0 {
        home
    } else if report.composite < 0.0 {
        away
    } else {
        "nobody".to_string()
    };
    let verdict = format!(
        "Weighted composite {:+.2}: factors favour {leader}",
        report.composite
    );
    frame.render_widget(Paragraph::new(verdict), sections[2]);
}

fn render_game_flow(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(points) = state.game_view.timeline.as_ref() else {
        return;
    };
    let qmin = state.rules.quarter_minutes;
    let summary = game_flow::summarize(points, qmin, state.run_threshold);
    let flow = game_flow::flow_points(points, qmin);
    let (home, away) = match state.game_view.box_data.as_ref() {
        Some(d) => (d.home_team.abbreviation.clone(), d.away_team.abbreviation.clone()),
        None => ("HOME".to_string(), "AWAY".to_string()),
    };

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Min(1),
        ])
        .split(area);

    let periods = summary.linescore_home.len();
    let mut cols = vec!["Team".to_string()];
    cols.extend((1..=periods).map(|q| quarter_label(q as u8)));
    cols.push("T".to_string());
    let line = |abbr: &str, scores: &[u32]| {
        let mut cells = vec![abbr.to_string()];
        cells.extend(scores.iter().map(|s| s.to_string()));
        cells.push(scores.iter().sum::<u32>().to_string());
        Row::new(cells)
    };
    let mut widths = vec![Constraint::Length(6)];
    widths.extend(std::iter::repeat_n(Constraint::Length(5), periods + 1));
    let linescore = Table::new(
        vec![
            line(&home, &summary.linescore_home[..]),
            line(&away, &summary.linescore_away[..]),
        ],
        widths,
    )
    .header(Row::new(cols).style(bold()))
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(linescore, sections[0]);

    let text = format!(
        "Lead changes {}  Times tied {}\nLargest lead {home} {} ({})  {away} {} ({})\nTime leading {home} {}  {away} {}",
        summary.lead_changes,
        summary.times_tied,
        summary.largest_lead_home.points,
        format_clock(summary.largest_lead_home.at_secs),
        summary.largest_lead_away.points,
        format_clock(summary.largest_lead_away.at_secs),
        format_clock(summary.time_leading_home_secs),
        format_clock(summary.time_leading_away_secs),
    );
    frame.render_widget(Paragraph::new(text), sections[1]);

    let total = game_length_secs(periods as u8, qmin);
    let margins = game_flow::sparkline(&flow, total, sections[2].width as usize);
    let home_leads = margins.iter().map(|m| (*m).max(0) as u64).collect::<Vec<_>>();
    let away_leads = margins.iter().map(|m| (-*m).max(0) as u64).collect::<Vec<_>>();
    let max = margins.iter().map(|m| m.unsigned_abs() as u64).max().unwrap_or(1).max(1);
    let spark_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(sections[2]);
    frame.render_widget(
        Sparkline::default()
            .data(&home_leads)
            .max(max)
            .style(Style::default().fg(Color::Green)),
        spark_rows[0],
    );
    frame.render_widget(
        Sparkline::default()
            .data(&away_leads)
            .max(max)
            .style(Style::default().fg(Color::Red)),
        spark_rows[1],
    );

    let runs = if summary.runs.is_empty() {
        format!("No runs of {}+ points", state.run_threshold)
    } else {
        summary
            .runs
            .iter()
            .map(|r| {
                let abbr = match r.side {
                    Side::Home => home.as_str(),
                    Side::Away => away.as_str(),
                };
                format!(
                    "{abbr} {}-0 run  {} - {}",
                    r.points,
                    format_clock(r.start_secs),
                    format_clock(r.end_secs)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let runs = Paragraph::new(runs).block(Block::default().title("Runs").borders(Borders::TOP));
    frame.render_widget(runs, sections[3]);
}

fn render_play_by_play(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(events) = state.game_view.events.as_ref() else {
        return;
    };
    let roster = state
        .game_view
        .box_data
        .as_ref()
        .map(|d| {
            d.players
                .iter()
                .map(|p| (p.id, p.clone()))
                .collect::<HashMap<PlayerId, Player>>()
        })
        .unwrap_or_default();
    let shown = filter_and_sort(events, &state.pbp_filter, state.pbp_sort);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);
    let team = state
        .pbp_filter
        .team
        .map(|id| state.team_abbr(id))
        .unwrap_or_else(|| "ALL".to_string());
    let mut status = format!(
        "Period {} | Team {} | {} | {:?} | {} plays",
        quarter_filter_label(state.pbp_filter.quarter),
        team,
        if state.pbp_filter.scoring_only { "scoring only" } else { "all plays" },
        state.pbp_sort,
        shown.len()
    );
    if let Some(data) = state.game_view.box_data.as_ref()
        && let Some(bad) = validate_running_score(events, data.game.home_team_id)
    {
        status.push_str(&format!(
            " | score mismatch at #{}: {}-{} vs {}-{}",
            bad.seq, bad.home_score, bad.away_score, bad.expected_home, bad.expected_away
        ));
    }
    frame.render_widget(Paragraph::new(status).style(bold()), sections[0]);

    let visible = sections[1].height as usize;
    let start = (state.pbp_scroll as usize).min(shown.len().saturating_sub(visible));
    let rows = shown
        .iter()
        .skip(start)
        .take(visible)
        .map(|e| {
            let style = if e.kind.is_scoring() {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            Row::new(vec![
                quarter_label(e.quarter),
                format_clock(e.clock_secs),
                e.team_id.map(|id| state.team_abbr(id)).unwrap_or_default(),
                describe(e, &roster),
                format!("{}-{}", e.home_score, e.away_score),
            ])
            .style(style)
        })
        .collect::<Vec<_>>();
    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(6),
            Constraint::Length(5),
            Constraint::Min(20),
            Constraint::Length(8),
        ],
    );
    frame.render_widget(table, sections[1]);
}

fn render_compare(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(30)])
        .split(area);

    let rows = state
        .seasons
        .iter()
        .map(|s| {
            let slot = state
                .compare_ids
                .iter()
                .position(|id| *id == Some(s.player.id))
                .map(|i| if i == 0 { "A" } else { "B" })
                .unwrap_or("");
            vec![
                slot.to_string(),
                s.player.short_name(),
                state.team_abbr(s.player.team_id),
                s.games.to_string(),
            ]
        })
        .collect();
    render_list(
        frame,
        columns[0],
        &["", "Player", "Team", "GP"],
        &[
            Constraint::Length(1),
            Constraint::Min(14),
            Constraint::Length(5),
            Constraint::Length(3),
        ],
        rows,
        state.compare_selected,
    );

    let Some((a, b)) = state.compare_pair() else {
        render_empty(frame, columns[1], "Pick two players with Enter to compare them");
        return;
    };
    let highlight = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
    let rows = compare(a, b)
        .into_iter()
        .map(|row| {
            let (sa, sb) = match row.leader {
                Leader::Left => (highlight, Style::default()),
                Leader::Right => (Style::default(), highlight),
                Leader::Even => (Style::default(), Style::default()),
            };
            Row::new(vec![
                Cell::from(row.label),
                Cell::from(format_value(row.a, row.percent)).style(sa),
                Cell::from(format_value(row.b, row.percent)).style(sb),
            ])
        })
        .collect::<Vec<_>>();
    let table = Table::new(
        rows,
        [Constraint::Length(6), Constraint::Length(16), Constraint::Length(16)],
    )
    .header(Row::new(vec![String::new(), a.player.short_name(), b.player.short_name()]).style(bold()))
    .block(Block::default().borders(Borders::LEFT));
    frame.render_widget(table, columns[1]);
}

fn render_leaders(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(data) = state.league_stats.as_ref() else {
        return;
    };
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let category = state.leader_category;
    let rows = leaders(&state.seasons, category, 1, columns[0].height as usize)
        .into_iter()
        .enumerate()
        .map(|(idx, (season, value))| {
            Row::new(vec![
                (idx + 1).to_string(),
                season.player.short_name(),
                state.team_abbr(season.player.team_id),
                format!("{value:.1}"),
            ])
        })
        .collect::<Vec<_>>();
    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Min(14),
            Constraint::Length(5),
            Constraint::Length(6),
        ],
    )
    .header(header_row(&["", "Player", "Team", category.label()]))
    .block(Block::default().title(format!("Leaders: {}", category.label())).borders(Borders::RIGHT));
    frame.render_widget(table, columns[0]);

    let rows = standings(&data.games, &data.teams)
        .into_iter()
        .map(|s| {
            Row::new(vec![
                s.team.abbreviation.clone(),
                s.wins.to_string(),
                s.losses.to_string(),
                format!("{:.3}", s.win_pct),
                if s.games_back == 0.0 {
                    "-".to_string()
                } else {
                    format!("{:.1}", s.games_back)
                },
                format!("{:+}", s.point_diff()),
                s.streak_label(),
            ])
        })
        .collect::<Vec<_>>();
    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Length(5),
            Constraint::Length(6),
            Constraint::Length(5),
        ],
    )
    .header(header_row(&["Team", "W", "L", "PCT", "GB", "DIFF", "STRK"]))
    .block(Block::default().title("Standings"));
    frame.render_widget(table, columns[1]);
}

fn render_toasts(frame: &mut Frame, area: Rect, state: &AppState) {
    let width = 48.min(area.width);
    let height = (state.toasts.len() as u16 + 2).min(area.height);
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + 1,
        width,
        height,
    };
    frame.render_widget(Clear, rect);
    let lines = state
        .toasts
        .iter()
        .map(|t| {
            let color = match t.level {
                ToastLevel::Info => Color::Cyan,
                ToastLevel::Success => Color::Green,
                ToastLevel::Error => Color::Red,
            };
            Line::from(Span::styled(t.message.clone(), Style::default().fg(color)))
        })
        .collect::<Vec<_>>();
    let toast = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(toast, rect);
}

fn render_form(frame: &mut Frame, area: Rect, form: &FormState) {
    let popup_area = centered_rect(60, 50, area);
    frame.render_widget(Clear, popup_area);

    let mut lines = Vec::new();
    for (idx, field) in form.fields.iter().enumerate() {
        let focused = idx == form.focus;
        let cursor = if focused { "_" } else { "" };
        let style = if focused {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:>14}: ", field.label), Style::default().fg(DIM)),
            Span::styled(format!("{}{cursor}", field.value), style),
        ]));
        if let Some(err) = form.error_for(field.key) {
            lines.push(Line::from(Span::styled(
                format!("{:>16}{err}", ""),
                Style::default().fg(Color::Red),
            )));
        }
    }
    lines.push(Line::from(""));
    let hint = if form.pending {
        "Saving..."
    } else {
        "Enter Save | Tab Next field | Esc Cancel"
    };
    lines.push(Line::from(Span::styled(hint, Style::default().fg(DIM))));

    let popup = Paragraph::new(lines)
        .block(Block::default().title(form.title()).borders(Borders::ALL));
    frame.render_widget(popup, popup_area);
}

fn render_confirm(frame: &mut Frame, area: Rect, prompt: &str) {
    let popup_area = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup_area);
    let popup = Paragraph::new(format!("{prompt}\n\ny Confirm | n Cancel"))
        .block(Block::default().title("Confirm").borders(Borders::ALL))
        .style(Style::default().fg(Color::Yellow))
        .wrap(Wrap { trim: true });
    frame.render_widget(popup, popup_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 80, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Hoops Terminal - Help",
        "",
        "Global:",
        "  1-5          Leagues / Teams / Roster / Games / Scorekeeper",
        "  Tab          Next game tab (box, shots, factors, flow, plays)",
        "  c / L        Compare / Leaders",
        "  j/k or ↑/↓   Move",
        "  r            Refresh",
        "  X            Export open game to .xlsx",
        "  b / Esc      Back",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Lists:",
        "  n / e / x    New / Edit / Delete",
        "  J / i        Join with invite code / New invite code",
        "",
        "Scorekeeper:",
        "  Space        Start or pause the clock",
        "  2 3 m M      Made 2 / made 3 / missed 2 / missed 3",
        "  f F          Free throw made / missed",
        "  o d          Offensive / defensive rebound",
        "  a s B t p    Assist / steal / block / turnover / foul",
        "  z            Cycle shot spot",
        "  S            Substitute (on-court player, then bench player)",
        "  T u          Timeout / undo",
        "  N E          Next period / end game",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
