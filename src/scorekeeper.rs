use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    EventKind, Game, GameStatus, PlayEvent, Player, PlayerGameStats, PlayerId, REGULATION_PERIODS,
    Shot, StatLine, TeamId, period_secs, quarter_label,
};

pub const LINEUP_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    pub quarter_minutes: u32,
    pub foul_limit: u32,
    /// Team fouls in a period after which the opponent shoots bonus free throws.
    pub bonus_fouls: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            quarter_minutes: 10,
            foul_limit: 5,
            bonus_fouls: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatAction {
    Made2,
    Made3,
    Miss2,
    Miss3,
    FtMade,
    FtMiss,
    OffRebound,
    DefRebound,
    Assist,
    Steal,
    Block,
    Turnover,
    Foul,
}

impl StatAction {
    pub fn kind(self) -> EventKind {
        match self {
            StatAction::Made2 => EventKind::Made2,
            StatAction::Made3 => EventKind::Made3,
            StatAction::Miss2 => EventKind::Miss2,
            StatAction::Miss3 => EventKind::Miss3,
            StatAction::FtMade => EventKind::FtMade,
            StatAction::FtMiss => EventKind::FtMiss,
            StatAction::OffRebound => EventKind::OffRebound,
            StatAction::DefRebound => EventKind::DefRebound,
            StatAction::Assist => EventKind::Assist,
            StatAction::Steal => EventKind::Steal,
            StatAction::Block => EventKind::Block,
            StatAction::Turnover => EventKind::Turnover,
            StatAction::Foul => EventKind::Foul,
        }
    }

    pub fn is_field_goal(self) -> bool {
        matches!(
            self,
            StatAction::Made2 | StatAction::Made3 | StatAction::Miss2 | StatAction::Miss3
        )
    }

    pub fn is_free_throw(self) -> bool {
        matches!(self, StatAction::FtMade | StatAction::FtMiss)
    }

    fn apply(self, line: &mut StatLine) {
        match self {
            StatAction::Made2 => {
                line.fgm += 1;
                line.fga += 1;
                line.pts += 2;
            }
            StatAction::Made3 => {
                line.fgm += 1;
                line.fga += 1;
                line.fg3m += 1;
                line.fg3a += 1;
                line.pts += 3;
            }
            StatAction::Miss2 => line.fga += 1,
            StatAction::Miss3 => {
                line.fga += 1;
                line.fg3a += 1;
            }
            StatAction::FtMade => {
                line.ftm += 1;
                line.fta += 1;
                line.pts += 1;
            }
            StatAction::FtMiss => line.fta += 1,
            StatAction::OffRebound => line.orb += 1,
            StatAction::DefRebound => line.drb += 1,
            StatAction::Assist => line.ast += 1,
            StatAction::Steal => line.stl += 1,
            StatAction::Block => line.blk += 1,
            StatAction::Turnover => line.tov += 1,
            StatAction::Foul => line.pf += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recording {
    pub player_id: PlayerId,
    pub action: StatAction,
    /// Court location in feet, only kept for field goal attempts.
    pub location: Option<(f32, f32)>,
}

impl Recording {
    pub fn new(player_id: PlayerId, action: StatAction) -> Self {
        Self {
            player_id,
            action,
            location: None,
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.location = Some((x, y));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("game is not live")]
    NotLive,
    #[error("game is already final")]
    AlreadyFinal,
    #[error("player {0} is not on either roster")]
    UnknownPlayer(PlayerId),
    #[error("team {0} is not playing in this game")]
    UnknownTeam(TeamId),
    #[error("player {0} has fouled out")]
    FouledOut(PlayerId),
    #[error("player {0} is not on the court")]
    NotOnCourt(PlayerId),
    #[error("player {0} is already on the court")]
    AlreadyOnCourt(PlayerId),
    #[error("substitution must swap players from the same team")]
    CrossTeamSubstitution,
    #[error("game clock has expired for this period")]
    ClockExpired,
    #[error("regulation is complete and the score is not tied")]
    RegulationComplete,
    #[error("cannot finish: {0}")]
    CannotFinish(&'static str),
    #[error("nothing to undo")]
    NothingToUndo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub game: Game,
    pub stats: Vec<PlayerGameStats>,
    pub events: Vec<PlayEvent>,
    pub shots: Vec<Shot>,
}

#[derive(Debug, Clone)]
struct UndoEntry {
    home_score: u32,
    away_score: u32,
    lines: HashMap<PlayerId, StatLine>,
    team_fouls: [u32; 2],
    on_court: [Vec<PlayerId>; 2],
    events_len: usize,
    shots_len: usize,
    next_seq: u32,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    game: Game,
    rosters: [Vec<Player>; 2],
    rules: Rules,
    lines: HashMap<PlayerId, StatLine>,
    secs_played: HashMap<PlayerId, u32>,
    on_court: [Vec<PlayerId>; 2],
    team_fouls: [u32; 2],
    events: Vec<PlayEvent>,
    shots: Vec<Shot>,
    next_seq: u32,
    history: Vec<UndoEntry>,
}

impl GameSession {
    pub fn new(game: Game, home_roster: Vec<Player>, away_roster: Vec<Player>, rules: Rules) -> Self {
        let on_court = [
            default_lineup(&home_roster),
            default_lineup(&away_roster),
        ];
        Self {
            game,
            rosters: [home_roster, away_roster],
            rules,
            lines: HashMap::new(),
            secs_played: HashMap::new(),
            on_court,
            team_fouls: [0, 0],
            events: Vec::new(),
            shots: Vec::new(),
            next_seq: 1,
            history: Vec::new(),
        }
    }

    /// Rebuilds a session from previously saved rows so a live game can be continued.
    pub fn resume(
        game: Game,
        home_roster: Vec<Player>,
        away_roster: Vec<Player>,
        rules: Rules,
        stats: &[PlayerGameStats],
        events: Vec<PlayEvent>,
        shots: Vec<Shot>,
    ) -> Self {
        let game_id = game.id;
        let mut session = Self::new(game, home_roster, away_roster, rules);
        for row in stats.iter().filter(|r| r.game_id == game_id) {
            let mut line = row.line;
            session
                .secs_played
                .insert(row.player_id, line.minutes * 60);
            line.minutes = 0;
            session.lines.insert(row.player_id, line);
        }
        let quarter = session.game.quarter;
        for event in events.iter().filter(|e| e.quarter == quarter && e.kind == EventKind::Foul) {
            if let Some(side) = event.team_id.and_then(|t| session.side_of_team(t)) {
                session.team_fouls[side] += 1;
            }
        }
        session.next_seq = events.iter().map(|e| e.seq).max().unwrap_or(0) + 1;
        session.events = events;
        session.shots = shots;
        session
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    pub fn events(&self) -> &[PlayEvent] {
        &self.events
    }

    pub fn shots(&self) -> &[Shot] {
        &self.shots
    }

    pub fn roster(&self, team_id: TeamId) -> &[Player] {
        match self.side_of_team(team_id) {
            Some(side) => &self.rosters[side],
            None => &[],
        }
    }

    pub fn on_court(&self, team_id: TeamId) -> &[PlayerId] {
        match self.side_of_team(team_id) {
            Some(side) => &self.on_court[side],
            None => &[],
        }
    }

    pub fn line(&self, player_id: PlayerId) -> StatLine {
        let mut line = self.lines.get(&player_id).copied().unwrap_or_default();
        line.minutes = self.minutes_played(player_id);
        line
    }

    pub fn minutes_played(&self, player_id: PlayerId) -> u32 {
        let secs = self.secs_played.get(&player_id).copied().unwrap_or(0);
        (secs + 30) / 60
    }

    pub fn team_fouls(&self, team_id: TeamId) -> u32 {
        self.side_of_team(team_id)
            .map(|side| self.team_fouls[side])
            .unwrap_or(0)
    }

    /// A team is in the bonus once its opponent reaches the team-foul threshold.
    pub fn in_bonus(&self, team_id: TeamId) -> bool {
        match self.side_of_team(team_id) {
            Some(side) => self.team_fouls[1 - side] >= self.rules.bonus_fouls,
            None => false,
        }
    }

    pub fn fouled_out(&self, player_id: PlayerId) -> bool {
        self.lines
            .get(&player_id)
            .is_some_and(|l| l.pf >= self.rules.foul_limit)
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn team_points(&self, team_id: TeamId) -> u32 {
        self.roster(team_id)
            .iter()
            .filter_map(|p| self.lines.get(&p.id))
            .map(|l| l.pts)
            .sum()
    }

    fn side_of_team(&self, team_id: TeamId) -> Option<usize> {
        if team_id == self.game.home_team_id {
            Some(0)
        } else if team_id == self.game.away_team_id {
            Some(1)
        } else {
            None
        }
    }

    fn side_of_player(&self, player_id: PlayerId) -> Option<usize> {
        self.rosters
            .iter()
            .position(|roster| roster.iter().any(|p| p.id == player_id))
    }

    fn side_team(&self, side: usize) -> TeamId {
        if side == 0 {
            self.game.home_team_id
        } else {
            self.game.away_team_id
        }
    }

    fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.rosters.iter().flatten().find(|p| p.id == player_id)
    }

    fn push_undo(&mut self) {
        self.history.push(UndoEntry {
            home_score: self.game.home_score,
            away_score: self.game.away_score,
            lines: self.lines.clone(),
            team_fouls: self.team_fouls,
            on_court: self.on_court.clone(),
            events_len: self.events.len(),
            shots_len: self.shots.len(),
            next_seq: self.next_seq,
        });
    }

    fn push_event(
        &mut self,
        kind: EventKind,
        side: Option<usize>,
        player_id: Option<PlayerId>,
        points: u32,
        description: String,
    ) -> PlayEvent {
        let event = PlayEvent {
            id: self.next_seq as i64,
            game_id: self.game.id,
            seq: self.next_seq,
            quarter: self.game.quarter,
            clock_secs: self.game.clock_secs,
            kind,
            team_id: side.map(|s| self.side_team(s)),
            player_id,
            points,
            home_score: self.game.home_score,
            away_score: self.game.away_score,
            description,
        };
        self.next_seq += 1;
        self.events.push(event.clone());
        event
    }

    pub fn record(&mut self, rec: Recording) -> Result<PlayEvent, ScoreError> {
        match self.game.status {
            GameStatus::Live => {}
            GameStatus::Final => return Err(ScoreError::AlreadyFinal),
            _ => return Err(ScoreError::NotLive),
        }
        // Free throws are still shot after the buzzer; nothing else is.
        if self.game.clock_secs == 0 && !rec.action.is_free_throw() {
            return Err(ScoreError::ClockExpired);
        }
        let side = self
            .side_of_player(rec.player_id)
            .ok_or(ScoreError::UnknownPlayer(rec.player_id))?;
        if self.fouled_out(rec.player_id) {
            return Err(ScoreError::FouledOut(rec.player_id));
        }
        if !self.on_court[side].contains(&rec.player_id) {
            return Err(ScoreError::NotOnCourt(rec.player_id));
        }

        self.push_undo();

        let line = self.lines.entry(rec.player_id).or_default();
        rec.action.apply(line);
        let fouled_out = line.pf >= self.rules.foul_limit;

        let points = rec.action.kind().points();
        if points > 0 {
            if side == 0 {
                self.game.home_score += points;
            } else {
                self.game.away_score += points;
            }
            for (s, sign) in [(side, 1i32), (1 - side, -1i32)] {
                for id in &self.on_court[s] {
                    self.lines.entry(*id).or_default().plus_minus += sign * points as i32;
                }
            }
        }

        if rec.action == StatAction::Foul {
            self.team_fouls[side] += 1;
        }

        if rec.action.is_field_goal()
            && let Some((x, y)) = rec.location
        {
            self.shots.push(Shot {
                id: self.shots.len() as i64 + 1,
                game_id: self.game.id,
                player_id: rec.player_id,
                team_id: self.side_team(side),
                quarter: self.game.quarter,
                clock_secs: self.game.clock_secs,
                x,
                y,
                made: points > 0,
                is_three: matches!(rec.action, StatAction::Made3 | StatAction::Miss3),
            });
        }

        let description = if rec.action == StatAction::Foul && fouled_out {
            let name = self
                .player(rec.player_id)
                .map(|p| format!("#{} {}", p.number, p.short_name()))
                .unwrap_or_default();
            format!("{name} personal foul (fouled out)")
        } else {
            String::new()
        };

        let event = self.push_event(
            rec.action.kind(),
            Some(side),
            Some(rec.player_id),
            points,
            description,
        );
        debug_assert_eq!(self.team_points(self.game.home_team_id), self.game.home_score);
        debug_assert_eq!(self.team_points(self.game.away_team_id), self.game.away_score);
        Ok(event)
    }

    pub fn substitute(
        &mut self,
        out_id: PlayerId,
        in_id: PlayerId,
    ) -> Result<PlayEvent, ScoreError> {
        if self.game.status == GameStatus::Final {
            return Err(ScoreError::AlreadyFinal);
        }
        let side = self
            .side_of_player(out_id)
            .ok_or(ScoreError::UnknownPlayer(out_id))?;
        let in_side = self
            .side_of_player(in_id)
            .ok_or(ScoreError::UnknownPlayer(in_id))?;
        if side != in_side {
            return Err(ScoreError::CrossTeamSubstitution);
        }
        if !self.on_court[side].contains(&out_id) {
            return Err(ScoreError::NotOnCourt(out_id));
        }
        if self.on_court[side].contains(&in_id) {
            return Err(ScoreError::AlreadyOnCourt(in_id));
        }
        if self.fouled_out(in_id) {
            return Err(ScoreError::FouledOut(in_id));
        }

        self.push_undo();
        for slot in self.on_court[side].iter_mut() {
            if *slot == out_id {
                *slot = in_id;
            }
        }
        let name = |id: PlayerId| {
            self.player(id)
                .map(|p| p.short_name())
                .unwrap_or_else(|| id.to_string())
        };
        let description = format!("SUB: {} in for {}", name(in_id), name(out_id));
        Ok(self.push_event(EventKind::Substitution, Some(side), Some(in_id), 0, description))
    }

    pub fn timeout(&mut self, team_id: TeamId) -> Result<PlayEvent, ScoreError> {
        let side = self
            .side_of_team(team_id)
            .ok_or(ScoreError::UnknownTeam(team_id))?;
        if self.game.status != GameStatus::Live && self.game.status != GameStatus::Paused {
            return Err(ScoreError::NotLive);
        }
        self.push_undo();
        self.game.status = GameStatus::Paused;
        Ok(self.push_event(EventKind::Timeout, Some(side), None, 0, String::new()))
    }

    /// Reverts the last recorded action. The clock, period and status stay where they are.
    pub fn undo(&mut self) -> Result<(), ScoreError> {
        let entry = self.history.pop().ok_or(ScoreError::NothingToUndo)?;
        self.game.home_score = entry.home_score;
        self.game.away_score = entry.away_score;
        self.lines = entry.lines;
        self.team_fouls = entry.team_fouls;
        self.on_court = entry.on_court;
        self.events.truncate(entry.events_len);
        self.shots.truncate(entry.shots_len);
        self.next_seq = entry.next_seq;
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), ScoreError> {
        match self.game.status {
            GameStatus::Final => Err(ScoreError::AlreadyFinal),
            GameStatus::Live => Ok(()),
            GameStatus::Scheduled => {
                self.game.status = GameStatus::Live;
                self.game.quarter = 1;
                self.game.clock_secs = period_secs(1, self.rules.quarter_minutes);
                self.push_event(EventKind::QuarterStart, None, None, 0, String::new());
                Ok(())
            }
            GameStatus::Paused => {
                self.game.status = GameStatus::Live;
                Ok(())
            }
        }
    }

    pub fn pause(&mut self) {
        if self.game.status == GameStatus::Live {
            self.game.status = GameStatus::Paused;
        }
    }

    /// Runs the game clock down. Returns true once the period has expired.
    pub fn tick(&mut self, secs: u32) -> bool {
        if self.game.status != GameStatus::Live {
            return self.game.clock_secs == 0;
        }
        let run = secs.min(self.game.clock_secs);
        self.game.clock_secs -= run;
        for id in self.on_court.iter().flatten() {
            *self.secs_played.entry(*id).or_default() += run;
        }
        if self.game.clock_secs == 0 {
            self.game.status = GameStatus::Paused;
            return true;
        }
        false
    }

    pub fn advance_quarter(&mut self) -> Result<(), ScoreError> {
        match self.game.status {
            GameStatus::Final => return Err(ScoreError::AlreadyFinal),
            GameStatus::Scheduled => return Err(ScoreError::NotLive),
            _ => {}
        }
        if self.game.quarter >= REGULATION_PERIODS && self.game.home_score != self.game.away_score {
            return Err(ScoreError::RegulationComplete);
        }
        self.game.clock_secs = 0;
        self.push_event(EventKind::QuarterEnd, None, None, 0, String::new());
        self.game.quarter += 1;
        self.game.clock_secs = period_secs(self.game.quarter, self.rules.quarter_minutes);
        self.game.status = GameStatus::Paused;
        self.team_fouls = [0, 0];
        self.push_event(EventKind::QuarterStart, None, None, 0, String::new());
        // Undo never crosses a period boundary.
        self.history.clear();
        Ok(())
    }

    pub fn finish(&mut self) -> Result<(), ScoreError> {
        if self.game.status == GameStatus::Final {
            return Err(ScoreError::AlreadyFinal);
        }
        if self.game.quarter < REGULATION_PERIODS {
            return Err(ScoreError::CannotFinish("regulation is not complete"));
        }
        if self.game.home_score == self.game.away_score {
            return Err(ScoreError::CannotFinish("score is tied"));
        }
        if self.game.clock_secs > 0 {
            return Err(ScoreError::CannotFinish("period is still running"));
        }
        self.push_event(EventKind::QuarterEnd, None, None, 0, String::new());
        self.game.status = GameStatus::Final;
        self.history.clear();
        Ok(())
    }

    pub fn period_label(&self) -> String {
        quarter_label(self.game.quarter)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut stats = Vec::new();
        for (side, roster) in self.rosters.iter().enumerate() {
            for player in roster {
                let line = self.line(player.id);
                if line.is_empty() {
                    continue;
                }
                stats.push(PlayerGameStats {
                    game_id: self.game.id,
                    player_id: player.id,
                    team_id: self.side_team(side),
                    line,
                });
            }
        }
        SessionSnapshot {
            game: self.game.clone(),
            stats,
            events: self.events.clone(),
            shots: self.shots.clone(),
        }
    }
}

fn default_lineup(roster: &[Player]) -> Vec<PlayerId> {
    roster
        .iter()
        .filter(|p| p.active)
        .take(LINEUP_SIZE)
        .map(|p| p.id)
        .collect()
}
