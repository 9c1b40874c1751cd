use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use hoops_terminal::backend::{GameBundle, StatsBackend};
use hoops_terminal::box_score::{BOX_COLUMNS, TeamBox, build_box_score, line_cells, stat_cells};
use hoops_terminal::config::Config;
use hoops_terminal::four_factors::{self, edge_label};
use hoops_terminal::game_flow::{self, Side, game_length_secs};
use hoops_terminal::model::{GameId, format_clock, quarter_label};
use hoops_terminal::remote_backend::RemoteBackend;
use hoops_terminal::sqlite_backend::SqliteBackend;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let game_id = parse_game_id_arg().ok_or_else(|| anyhow!("usage: game_report <game_id> [--db path]"))?;

    let backend: Box<dyn StatsBackend> = match (parse_db_path_arg(), config.backend_url.as_deref()) {
        (Some(path), _) => Box::new(SqliteBackend::open(&path)?),
        (None, Some(url)) => Box::new(RemoteBackend::new(url, config.backend_token.clone())),
        (None, None) => {
            let path = config.db_path.clone().context("unable to resolve sqlite path")?;
            Box::new(SqliteBackend::open(&path)?)
        }
    };

    let bundle = GameBundle::fetch(backend.as_ref(), game_id)
        .with_context(|| format!("load game {game_id}"))?;
    let box_score = build_box_score(&bundle.data, false);
    let game = &bundle.data.game;
    let home = &bundle.data.home_team.abbreviation;
    let away = &bundle.data.away_team.abbreviation;

    println!(
        "{} {} - {} {}  [{} {}]",
        home,
        game.home_score,
        game.away_score,
        away,
        game.status.label(),
        game.scheduled_at
    );
    println!("Source: {}", backend.describe());

    for team in [&box_score.home, &box_score.away] {
        println!();
        print_team(team);
    }

    let periods = bundle.periods();
    let qmin = config.rules.quarter_minutes;
    let report = four_factors::analyze(&box_score, game_length_secs(periods, qmin) / 60);
    println!();
    println!("Four factors         {home:>8} {away:>8}  edge");
    for row in &report.rows {
        println!(
            "{:<20} {:>8.1} {:>8.1}  {}",
            row.label,
            row.home,
            row.away,
            edge_label(row.edge)
        );
    }
    println!(
        "{:<20} {:>8.1} {:>8.1}",
        "Off rating", report.home_eff.off_rating, report.away_eff.off_rating
    );
    println!(
        "{:<20} {:>8.1} {:>8.1}",
        "Pace", report.home_eff.pace, report.away_eff.pace
    );
    println!("Composite {:+.2}", report.composite);

    let summary = game_flow::summarize(&bundle.timeline, qmin, config.run_threshold);
    println!();
    let header = (1..=summary.linescore_home.len())
        .map(|q| format!("{:>4}", quarter_label(q as u8)))
        .collect::<String>();
    println!("{:<6}{header}", "");
    for (abbr, scores) in [(home, &summary.linescore_home), (away, &summary.linescore_away)] {
        let cells = scores.iter().map(|s| format!("{s:>4}")).collect::<String>();
        println!("{abbr:<6}{cells}");
    }
    println!(
        "Lead changes {}  Times tied {}",
        summary.lead_changes, summary.times_tied
    );
    println!(
        "Largest lead {home} {} at {}, {away} {} at {}",
        summary.largest_lead_home.points,
        format_clock(summary.largest_lead_home.at_secs),
        summary.largest_lead_away.points,
        format_clock(summary.largest_lead_away.at_secs)
    );
    for run in &summary.runs {
        let abbr = match run.side {
            Side::Home => home,
            Side::Away => away,
        };
        println!(
            "  {abbr} {}-0 run {} to {}",
            run.points,
            format_clock(run.start_secs),
            format_clock(run.end_secs)
        );
    }

    Ok(())
}

fn print_team(team: &TeamBox) {
    println!("{} {}", team.team.abbreviation, team.team.name);
    println!("{}", BOX_COLUMNS.join("\t"));
    for line in &team.lines {
        println!("{}", line_cells(line).join("\t"));
    }
    let mut totals = vec![String::new(), "TOTAL".to_string()];
    totals.extend(stat_cells(&team.totals));
    println!("{}", totals.join("\t"));
}

fn parse_game_id_arg() -> Option<GameId> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut skip_next = false;
    for arg in &args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--db" {
            skip_next = true;
            continue;
        }
        if let Ok(id) = arg.trim().parse::<GameId>() {
            return Some(id);
        }
    }
    None
}

fn parse_db_path_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix("--db=") {
            let value = value.trim();
            if !value.is_empty() {
                return Some(PathBuf::from(value));
            }
        }
        if arg == "--db"
            && let Some(value) = args.get(idx + 1)
        {
            let value = value.trim();
            if !value.is_empty() {
                return Some(PathBuf::from(value));
            }
        }
    }
    None
}
