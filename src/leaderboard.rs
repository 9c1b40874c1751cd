use std::cmp::Ordering;
use std::collections::HashMap;

use rayon::prelude::*;

use crate::compare::PlayerSeason;
use crate::model::{Game, GameStatus, Player, PlayerGameStats, PlayerId, Team, TeamId};
use crate::stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderCategory {
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
    Efficiency,
}

impl LeaderCategory {
    pub const ALL: [LeaderCategory; 6] = [
        LeaderCategory::Points,
        LeaderCategory::Rebounds,
        LeaderCategory::Assists,
        LeaderCategory::Steals,
        LeaderCategory::Blocks,
        LeaderCategory::Efficiency,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LeaderCategory::Points => "PPG",
            LeaderCategory::Rebounds => "RPG",
            LeaderCategory::Assists => "APG",
            LeaderCategory::Steals => "SPG",
            LeaderCategory::Blocks => "BPG",
            LeaderCategory::Efficiency => "EFF",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn value(self, season: &PlayerSeason) -> f64 {
        let t = &season.totals;
        match self {
            LeaderCategory::Points => season.ppg(),
            LeaderCategory::Rebounds => season.rpg(),
            LeaderCategory::Assists => season.apg(),
            LeaderCategory::Steals => stats::per_game(t.stl, season.games),
            LeaderCategory::Blocks => stats::per_game(t.blk, season.games),
            LeaderCategory::Efficiency => season.efficiency_per_game(),
        }
    }
}

/// Season totals for every player that appears in `stats`.
pub fn season_lines(players: &[Player], rows: &[PlayerGameStats]) -> Vec<PlayerSeason> {
    let mut by_player: HashMap<PlayerId, Vec<&PlayerGameStats>> = HashMap::new();
    for row in rows {
        by_player.entry(row.player_id).or_default().push(row);
    }
    let mut out = players
        .par_iter()
        .filter_map(|player| {
            let rows = by_player.get(&player.id)?;
            Some(PlayerSeason::from_rows(player, rows.iter().copied()))
        })
        .collect::<Vec<_>>();
    out.sort_by_key(|s| s.player.id);
    out
}

pub fn leaders(
    seasons: &[PlayerSeason],
    category: LeaderCategory,
    min_games: u32,
    n: usize,
) -> Vec<(&PlayerSeason, f64)> {
    let mut rows = seasons
        .iter()
        .filter(|s| s.games >= min_games.max(1))
        .map(|s| (s, category.value(s)))
        .collect::<Vec<_>>();
    rows.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.player.name.cmp(&b.0.player.name))
    });
    rows.truncate(n);
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    pub team: Team,
    pub wins: u32,
    pub losses: u32,
    pub win_pct: f64,
    pub games_back: f64,
    pub points_for: u32,
    pub points_against: u32,
    /// Positive for a winning streak, negative for a losing one.
    pub streak: i32,
}

impl Standing {
    pub fn point_diff(&self) -> i64 {
        self.points_for as i64 - self.points_against as i64
    }

    pub fn streak_label(&self) -> String {
        match self.streak.signum() {
            1 => format!("W{}", self.streak),
            -1 => format!("L{}", -self.streak),
            _ => "-".to_string(),
        }
    }
}

pub fn standings(games: &[Game], teams: &[Team]) -> Vec<Standing> {
    let mut finals = games
        .iter()
        .filter(|g| g.status == GameStatus::Final)
        .collect::<Vec<_>>();
    finals.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at).then(a.id.cmp(&b.id)));

    let mut table: HashMap<TeamId, Standing> = teams
        .iter()
        .map(|t| {
            (
                t.id,
                Standing {
                    team: t.clone(),
                    wins: 0,
                    losses: 0,
                    win_pct: 0.0,
                    games_back: 0.0,
                    points_for: 0,
                    points_against: 0,
                    streak: 0,
                },
            )
        })
        .collect();

    for game in finals {
        let Some(winner) = game.winner() else {
            continue;
        };
        for (team_id, scored, allowed) in [
            (game.home_team_id, game.home_score, game.away_score),
            (game.away_team_id, game.away_score, game.home_score),
        ] {
            let Some(row) = table.get_mut(&team_id) else {
                continue;
            };
            row.points_for += scored;
            row.points_against += allowed;
            if team_id == winner {
                row.wins += 1;
                row.streak = if row.streak > 0 { row.streak + 1 } else { 1 };
            } else {
                row.losses += 1;
                row.streak = if row.streak < 0 { row.streak - 1 } else { -1 };
            }
        }
    }

    let mut rows = table.into_values().collect::<Vec<_>>();
    for row in &mut rows {
        row.win_pct = stats::per_game(row.wins, row.wins + row.losses);
    }
    rows.sort_by(|a, b| {
        b.win_pct
            .partial_cmp(&a.win_pct)
            .unwrap_or(Ordering::Equal)
            .then(b.point_diff().cmp(&a.point_diff()))
            .then(a.team.name.cmp(&b.team.name))
    });

    if let Some((lead_w, lead_l)) = rows.first().map(|r| (r.wins as f64, r.losses as f64)) {
        for row in &mut rows {
            row.games_back = ((lead_w - row.wins as f64) + (row.losses as f64 - lead_l)) / 2.0;
        }
    }
    rows
}
