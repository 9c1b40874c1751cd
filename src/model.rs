use serde::{Deserialize, Serialize};

pub type LeagueId = i64;
pub type TeamId = i64;
pub type PlayerId = i64;
pub type GameId = i64;

pub const REGULATION_PERIODS: u8 = 4;
pub const OVERTIME_SECS: u32 = 5 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct League {
    pub id: LeagueId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub season: String,
    pub invite_code: String,
    pub owner: String,
    #[serde(default)]
    pub is_public: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberRole {
    Owner,
    Member,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueMember {
    pub league_id: LeagueId,
    pub user: String,
    pub role: MemberRole,
    pub joined_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub league_id: LeagueId,
    pub name: String,
    #[serde(default)]
    pub city: String,
    pub abbreviation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    PG,
    SG,
    SF,
    PF,
    C,
}

impl Position {
    pub const ALL: [Position; 5] = [
        Position::PG,
        Position::SG,
        Position::SF,
        Position::PF,
        Position::C,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Position::PG => "PG",
            Position::SG => "SG",
            Position::SF => "SF",
            Position::PF => "PF",
            Position::C => "C",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(raw))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub team_id: TeamId,
    pub name: String,
    pub number: u8,
    pub position: Position,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Player {
    /// "L. James" style name for narrow columns.
    pub fn short_name(&self) -> String {
        let mut parts = self.name.split_whitespace();
        let Some(first) = parts.next() else {
            return String::new();
        };
        let rest = parts.collect::<Vec<_>>().join(" ");
        if rest.is_empty() {
            return first.to_string();
        }
        match first.chars().next() {
            Some(initial) => format!("{initial}. {rest}"),
            None => rest,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Scheduled,
    Live,
    Paused,
    Final,
}

impl GameStatus {
    pub fn label(self) -> &'static str {
        match self {
            GameStatus::Scheduled => "SCHEDULED",
            GameStatus::Live => "LIVE",
            GameStatus::Paused => "PAUSED",
            GameStatus::Final => "FINAL",
        }
    }

    pub fn as_db(self) -> &'static str {
        match self {
            GameStatus::Scheduled => "scheduled",
            GameStatus::Live => "live",
            GameStatus::Paused => "paused",
            GameStatus::Final => "final",
        }
    }

    pub fn from_db(raw: &str) -> Option<Self> {
        match raw {
            "scheduled" => Some(GameStatus::Scheduled),
            "live" => Some(GameStatus::Live),
            "paused" => Some(GameStatus::Paused),
            "final" => Some(GameStatus::Final),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: GameId,
    pub league_id: LeagueId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub scheduled_at: String,
    pub status: GameStatus,
    pub quarter: u8,
    pub clock_secs: u32,
    pub home_score: u32,
    pub away_score: u32,
}

impl Game {
    pub fn involves(&self, team_id: TeamId) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    pub fn winner(&self) -> Option<TeamId> {
        if self.status != GameStatus::Final || self.home_score == self.away_score {
            return None;
        }
        if self.home_score > self.away_score {
            Some(self.home_team_id)
        } else {
            Some(self.away_team_id)
        }
    }
}

/// Aggregated box-score counters for one player (or a whole team).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatLine {
    pub minutes: u32,
    pub pts: u32,
    pub fgm: u32,
    pub fga: u32,
    pub fg3m: u32,
    pub fg3a: u32,
    pub ftm: u32,
    pub fta: u32,
    pub orb: u32,
    pub drb: u32,
    pub ast: u32,
    pub stl: u32,
    pub blk: u32,
    pub tov: u32,
    pub pf: u32,
    pub plus_minus: i32,
}

impl StatLine {
    pub fn reb(&self) -> u32 {
        self.orb + self.drb
    }

    pub fn add(&mut self, other: &StatLine) {
        self.minutes += other.minutes;
        self.pts += other.pts;
        self.fgm += other.fgm;
        self.fga += other.fga;
        self.fg3m += other.fg3m;
        self.fg3a += other.fg3a;
        self.ftm += other.ftm;
        self.fta += other.fta;
        self.orb += other.orb;
        self.drb += other.drb;
        self.ast += other.ast;
        self.stl += other.stl;
        self.blk += other.blk;
        self.tov += other.tov;
        self.pf += other.pf;
        self.plus_minus += other.plus_minus;
    }

    pub fn is_empty(&self) -> bool {
        *self == StatLine::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerGameStats {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub line: StatLine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shot {
    pub id: i64,
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub quarter: u8,
    pub clock_secs: u32,
    pub x: f32,
    pub y: f32,
    pub made: bool,
    pub is_three: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
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
    Substitution,
    Timeout,
    QuarterStart,
    QuarterEnd,
}

impl EventKind {
    pub fn points(self) -> u32 {
        match self {
            EventKind::Made2 => 2,
            EventKind::Made3 => 3,
            EventKind::FtMade => 1,
            _ => 0,
        }
    }

    pub fn is_scoring(self) -> bool {
        self.points() > 0
    }

    pub fn as_db(self) -> &'static str {
        match self {
            EventKind::Made2 => "made2",
            EventKind::Made3 => "made3",
            EventKind::Miss2 => "miss2",
            EventKind::Miss3 => "miss3",
            EventKind::FtMade => "ft_made",
            EventKind::FtMiss => "ft_miss",
            EventKind::OffRebound => "off_rebound",
            EventKind::DefRebound => "def_rebound",
            EventKind::Assist => "assist",
            EventKind::Steal => "steal",
            EventKind::Block => "block",
            EventKind::Turnover => "turnover",
            EventKind::Foul => "foul",
            EventKind::Substitution => "substitution",
            EventKind::Timeout => "timeout",
            EventKind::QuarterStart => "quarter_start",
            EventKind::QuarterEnd => "quarter_end",
        }
    }

    pub fn from_db(raw: &str) -> Option<Self> {
        const ALL: [EventKind; 17] = [
            EventKind::Made2,
            EventKind::Made3,
            EventKind::Miss2,
            EventKind::Miss3,
            EventKind::FtMade,
            EventKind::FtMiss,
            EventKind::OffRebound,
            EventKind::DefRebound,
            EventKind::Assist,
            EventKind::Steal,
            EventKind::Block,
            EventKind::Turnover,
            EventKind::Foul,
            EventKind::Substitution,
            EventKind::Timeout,
            EventKind::QuarterStart,
            EventKind::QuarterEnd,
        ];
        ALL.into_iter().find(|k| k.as_db() == raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayEvent {
    pub id: i64,
    pub game_id: GameId,
    pub seq: u32,
    pub quarter: u8,
    pub clock_secs: u32,
    pub kind: EventKind,
    pub team_id: Option<TeamId>,
    pub player_id: Option<PlayerId>,
    pub points: u32,
    pub home_score: u32,
    pub away_score: u32,
    #[serde(default)]
    pub description: String,
}

/// One sample of the running score, taken after each scoring play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringPoint {
    pub seq: u32,
    pub quarter: u8,
    pub clock_secs: u32,
    pub home_score: u32,
    pub away_score: u32,
}

impl From<&PlayEvent> for ScoringPoint {
    fn from(event: &PlayEvent) -> Self {
        Self {
            seq: event.seq,
            quarter: event.quarter,
            clock_secs: event.clock_secs,
            home_score: event.home_score,
            away_score: event.away_score,
        }
    }
}

pub fn scoring_timeline(events: &[PlayEvent]) -> Vec<ScoringPoint> {
    let mut out = events
        .iter()
        .filter(|e| e.kind.is_scoring())
        .map(ScoringPoint::from)
        .collect::<Vec<_>>();
    out.sort_by(|a, b| {
        a.quarter
            .cmp(&b.quarter)
            .then(b.clock_secs.cmp(&a.clock_secs))
            .then(a.seq.cmp(&b.seq))
    });
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLeague {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub season: String,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaguePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub season: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeam {
    pub league_id: LeagueId,
    pub name: String,
    #[serde(default)]
    pub city: String,
    pub abbreviation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPatch {
    pub name: Option<String>,
    pub city: Option<String>,
    pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayer {
    pub team_id: TeamId,
    pub name: String,
    pub number: u8,
    pub position: Position,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPatch {
    pub name: Option<String>,
    pub number: Option<u8>,
    pub position: Option<Position>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGame {
    pub league_id: LeagueId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub scheduled_at: String,
}

pub fn quarter_label(quarter: u8) -> String {
    if quarter == 0 {
        return "-".to_string();
    }
    if quarter <= REGULATION_PERIODS {
        format!("Q{quarter}")
    } else {
        format!("OT{}", quarter - REGULATION_PERIODS)
    }
}

pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Length of a period in seconds; overtime periods are always five minutes.
pub fn period_secs(quarter: u8, quarter_minutes: u32) -> u32 {
    if quarter > REGULATION_PERIODS {
        OVERTIME_SECS
    } else {
        quarter_minutes * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_labels_roll_into_overtime() {
        assert_eq!(quarter_label(1), "Q1");
        assert_eq!(quarter_label(4), "Q4");
        assert_eq!(quarter_label(5), "OT1");
        assert_eq!(quarter_label(7), "OT3");
    }

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(600), "10:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(0), "00:00");
    }

    #[test]
    fn short_name_uses_initial() {
        let player = Player {
            id: 1,
            team_id: 1,
            name: "Stephen Curry".to_string(),
            number: 30,
            position: Position::PG,
            active: true,
        };
        assert_eq!(player.short_name(), "S. Curry");
    }
}
