use std::cmp::Reverse;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Game, Player, PlayerGameStats, PlayerId, Position, StatLine, Team, TeamId};
use crate::stats;

/// Raw records the backend returns for one game's box score query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxScoreData {
    pub game: Game,
    pub home_team: Team,
    pub away_team: Team,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub stats: Vec<PlayerGameStats>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxLine {
    pub player: Player,
    pub line: StatLine,
    pub efficiency: i32,
    pub ts_pct: f64,
    pub efg_pct: f64,
    pub dnp: bool,
}

impl BoxLine {
    fn new(player: Player, line: StatLine, dnp: bool) -> Self {
        Self {
            efficiency: stats::game_efficiency(&line),
            ts_pct: stats::line_ts_pct(&line),
            efg_pct: stats::line_efg_pct(&line),
            player,
            line,
            dnp,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamBox {
    pub team: Team,
    pub lines: Vec<BoxLine>,
    pub totals: StatLine,
}

impl TeamBox {
    pub fn played(&self) -> impl Iterator<Item = &BoxLine> {
        self.lines.iter().filter(|l| !l.dnp)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxScore {
    pub game: Game,
    pub home: TeamBox,
    pub away: TeamBox,
}

impl BoxScore {
    pub fn is_empty(&self) -> bool {
        self.home.played().next().is_none() && self.away.played().next().is_none()
    }

    pub fn lines(&self) -> impl Iterator<Item = &BoxLine> {
        self.home.lines.iter().chain(self.away.lines.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoxSort {
    Number,
    Points,
    Rebounds,
    Assists,
    Minutes,
    Efficiency,
}

impl BoxSort {
    pub fn next(self) -> Self {
        match self {
            BoxSort::Number => BoxSort::Points,
            BoxSort::Points => BoxSort::Rebounds,
            BoxSort::Rebounds => BoxSort::Assists,
            BoxSort::Assists => BoxSort::Minutes,
            BoxSort::Minutes => BoxSort::Efficiency,
            BoxSort::Efficiency => BoxSort::Number,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BoxSort::Number => "#",
            BoxSort::Points => "PTS",
            BoxSort::Rebounds => "REB",
            BoxSort::Assists => "AST",
            BoxSort::Minutes => "MIN",
            BoxSort::Efficiency => "EFF",
        }
    }
}

pub fn build_box_score(data: &BoxScoreData, include_dnp: bool) -> BoxScore {
    let mut by_player: HashMap<(TeamId, PlayerId), StatLine> =
        HashMap::with_capacity(data.stats.len());
    for row in &data.stats {
        if row.game_id != data.game.id {
            continue;
        }
        by_player
            .entry((row.team_id, row.player_id))
            .or_default()
            .add(&row.line);
    }

    let home = team_box(&data.home_team, &data.players, &by_player, include_dnp);
    let away = team_box(&data.away_team, &data.players, &by_player, include_dnp);

    BoxScore {
        game: data.game.clone(),
        home,
        away,
    }
}

/// Stands in for a stat row whose player is no longer on file.
fn unknown_player(id: PlayerId, team_id: TeamId) -> Player {
    Player {
        id,
        team_id,
        name: format!("Unknown #{id}"),
        number: 0,
        position: Position::SF,
        active: false,
    }
}

fn team_box(
    team: &Team,
    players: &[Player],
    by_player: &HashMap<(TeamId, PlayerId), StatLine>,
    include_dnp: bool,
) -> TeamBox {
    let mut lines = Vec::new();
    let mut totals = StatLine::default();

    // Rows are bucketed by the team they were recorded for, not the player's current team.
    let mut played = by_player
        .iter()
        .filter(|((team_id, _), _)| *team_id == team.id)
        .map(|((_, player_id), line)| (*player_id, *line))
        .collect::<Vec<_>>();
    played.sort_by_key(|(player_id, _)| *player_id);
    for (player_id, line) in played {
        let player = players
            .iter()
            .find(|p| p.id == player_id)
            .cloned()
            .unwrap_or_else(|| unknown_player(player_id, team.id));
        totals.add(&line);
        lines.push(BoxLine::new(player, line, false));
    }

    if include_dnp {
        for player in players.iter().filter(|p| p.team_id == team.id) {
            if !by_player.contains_key(&(team.id, player.id)) {
                lines.push(BoxLine::new(player.clone(), StatLine::default(), true));
            }
        }
    }

    // Plus-minus does not sum meaningfully across a roster.
    totals.plus_minus = 0;
    sort_lines(&mut lines, BoxSort::Number);
    TeamBox {
        team: team.clone(),
        lines,
        totals,
    }
}

pub fn sort_lines(lines: &mut [BoxLine], sort: BoxSort) {
    // DNP rows always sink to the bottom; ties fall back to jersey number.
    lines.sort_by(|a, b| {
        a.dnp
            .cmp(&b.dnp)
            .then_with(|| match sort {
                BoxSort::Number => std::cmp::Ordering::Equal,
                BoxSort::Points => b.line.pts.cmp(&a.line.pts),
                BoxSort::Rebounds => b.line.reb().cmp(&a.line.reb()),
                BoxSort::Assists => b.line.ast.cmp(&a.line.ast),
                BoxSort::Minutes => b.line.minutes.cmp(&a.line.minutes),
                BoxSort::Efficiency => b.efficiency.cmp(&a.efficiency),
            })
            .then(a.player.number.cmp(&b.player.number))
    });
}

pub fn sort_box_score(box_score: &mut BoxScore, sort: BoxSort) {
    sort_lines(&mut box_score.home.lines, sort);
    sort_lines(&mut box_score.away.lines, sort);
}

pub fn top_performers(box_score: &BoxScore, n: usize) -> Vec<&BoxLine> {
    let mut lines = box_score.lines().filter(|l| !l.dnp).collect::<Vec<_>>();
    lines.sort_by_key(|l| (Reverse(l.efficiency), Reverse(l.line.pts), l.player.number));
    lines.truncate(n);
    lines
}

/// Column headers and cell text for one box-score row, shared by the
/// terminal table and the spreadsheet export.
pub const BOX_COLUMNS: [&str; 16] = [
    "#", "Player", "MIN", "PTS", "FG", "3PT", "FT", "OREB", "DREB", "REB", "AST", "STL", "BLK",
    "TO", "PF", "+/-",
];

pub fn line_cells(line: &BoxLine) -> Vec<String> {
    if line.dnp {
        let mut cells = vec![line.player.number.to_string(), line.player.short_name()];
        cells.push("DNP".to_string());
        cells.resize(BOX_COLUMNS.len(), String::new());
        return cells;
    }
    let mut cells = vec![line.player.number.to_string(), line.player.short_name()];
    cells.extend(stat_cells(&line.line));
    cells
}

pub fn stat_cells(l: &StatLine) -> Vec<String> {
    vec![
        l.minutes.to_string(),
        l.pts.to_string(),
        format!("{}-{}", l.fgm, l.fga),
        format!("{}-{}", l.fg3m, l.fg3a),
        format!("{}-{}", l.ftm, l.fta),
        l.orb.to_string(),
        l.drb.to_string(),
        l.reb().to_string(),
        l.ast.to_string(),
        l.stl.to_string(),
        l.blk.to_string(),
        l.tov.to_string(),
        l.pf.to_string(),
        format!("{:+}", l.plus_minus),
    ]
}
