use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params};
use tracing::{debug, info};

use crate::backend::{BackendError, LeagueStatsData, StatsBackend, generate_invite_code};
use crate::box_score::BoxScoreData;
use crate::model::{
    EventKind, Game, GameId, GameStatus, League, LeagueId, LeaguePatch, NewGame, NewLeague,
    NewPlayer, NewTeam, PlayEvent, Player, PlayerGameStats, PlayerId, PlayerPatch, Position,
    ScoringPoint, Shot, StatLine, Team, TeamId, TeamPatch, scoring_timeline,
};
use crate::scorekeeper::SessionSnapshot;
use crate::validation::{
    validate_invite_code, validate_game, validate_league, validate_player, validate_team,
};

const LEAGUE_COLS: &str = "id, name, description, season, invite_code, owner, is_public, created_at";
const TEAM_COLS: &str = "id, league_id, name, city, abbreviation";
const PLAYER_COLS: &str = "id, team_id, name, number, position, active";
const GAME_COLS: &str = "id, league_id, home_team_id, away_team_id, scheduled_at, status, quarter, clock_secs, home_score, away_score";
const STAT_COLS: &str = "minutes, pts, fgm, fga, fg3m, fg3a, ftm, fta, orb, drb, ast, stl, blk, tov, pf, plus_minus";
const EVENT_COLS: &str = "id, game_id, seq, quarter, clock_secs, kind, team_id, player_id, points, home_score, away_score, description";
const SHOT_COLS: &str = "id, game_id, player_id, team_id, quarter, clock_secs, x, y, made, is_three";

const INVITE_ATTEMPTS: usize = 16;

pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create db dir {}", parent.display()))?;
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        init_schema(&conn)?;
        info!(path = %path.display(), "opened sqlite backend");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA foreign_keys = ON;
        CREATE TABLE IF NOT EXISTS leagues (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            season TEXT NOT NULL,
            invite_code TEXT NOT NULL UNIQUE,
            owner TEXT NOT NULL,
            is_public INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS league_members (
            league_id INTEGER NOT NULL REFERENCES leagues(id) ON DELETE CASCADE,
            user TEXT NOT NULL,
            role TEXT NOT NULL,
            joined_at TEXT NOT NULL,
            PRIMARY KEY (league_id, user)
        );
        CREATE TABLE IF NOT EXISTS teams (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            league_id INTEGER NOT NULL REFERENCES leagues(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            city TEXT NOT NULL DEFAULT '',
            abbreviation TEXT NOT NULL,
            UNIQUE (league_id, abbreviation)
        );
        CREATE TABLE IF NOT EXISTS players (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            number INTEGER NOT NULL,
            position TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1
        );
        CREATE TABLE IF NOT EXISTS games (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            league_id INTEGER NOT NULL REFERENCES leagues(id) ON DELETE CASCADE,
            home_team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
            away_team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
            scheduled_at TEXT NOT NULL,
            status TEXT NOT NULL,
            quarter INTEGER NOT NULL DEFAULT 0,
            clock_secs INTEGER NOT NULL DEFAULT 0,
            home_score INTEGER NOT NULL DEFAULT 0,
            away_score INTEGER NOT NULL DEFAULT 0
        );
        CREATE TABLE IF NOT EXISTS player_game_stats (
            game_id INTEGER NOT NULL REFERENCES games(id) ON DELETE CASCADE,
            player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
            team_id INTEGER NOT NULL,
            minutes INTEGER NOT NULL, pts INTEGER NOT NULL,
            fgm INTEGER NOT NULL, fga INTEGER NOT NULL,
            fg3m INTEGER NOT NULL, fg3a INTEGER NOT NULL,
            ftm INTEGER NOT NULL, fta INTEGER NOT NULL,
            orb INTEGER NOT NULL, drb INTEGER NOT NULL,
            ast INTEGER NOT NULL, stl INTEGER NOT NULL, blk INTEGER NOT NULL,
            tov INTEGER NOT NULL, pf INTEGER NOT NULL, plus_minus INTEGER NOT NULL,
            PRIMARY KEY (game_id, player_id)
        );
        CREATE TABLE IF NOT EXISTS play_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            game_id INTEGER NOT NULL REFERENCES games(id) ON DELETE CASCADE,
            seq INTEGER NOT NULL,
            quarter INTEGER NOT NULL,
            clock_secs INTEGER NOT NULL,
            kind TEXT NOT NULL,
            team_id INTEGER NULL,
            player_id INTEGER NULL,
            points INTEGER NOT NULL,
            home_score INTEGER NOT NULL,
            away_score INTEGER NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            UNIQUE (game_id, seq)
        );
        CREATE TABLE IF NOT EXISTS shots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            game_id INTEGER NOT NULL REFERENCES games(id) ON DELETE CASCADE,
            player_id INTEGER NOT NULL,
            team_id INTEGER NOT NULL,
            quarter INTEGER NOT NULL,
            clock_secs INTEGER NOT NULL,
            x REAL NOT NULL,
            y REAL NOT NULL,
            made INTEGER NOT NULL,
            is_three INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_teams_league ON teams(league_id);
        CREATE INDEX IF NOT EXISTS idx_players_team ON players(team_id);
        CREATE INDEX IF NOT EXISTS idx_games_league ON games(league_id);
        CREATE INDEX IF NOT EXISTS idx_events_game ON play_events(game_id);
        CREATE INDEX IF NOT EXISTS idx_shots_game ON shots(game_id);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

fn conversion_error(idx: usize, what: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, format!("unknown {what}").into())
}

fn league_from_row(row: &Row) -> rusqlite::Result<League> {
    Ok(League {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        season: row.get(3)?,
        invite_code: row.get(4)?,
        owner: row.get(5)?,
        is_public: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn team_from_row(row: &Row) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(0)?,
        league_id: row.get(1)?,
        name: row.get(2)?,
        city: row.get(3)?,
        abbreviation: row.get(4)?,
    })
}

fn player_from_row(row: &Row) -> rusqlite::Result<Player> {
    let position: String = row.get(4)?;
    Ok(Player {
        id: row.get(0)?,
        team_id: row.get(1)?,
        name: row.get(2)?,
        number: row.get(3)?,
        position: Position::parse(&position).ok_or_else(|| conversion_error(4, "position"))?,
        active: row.get(5)?,
    })
}

fn game_from_row(row: &Row) -> rusqlite::Result<Game> {
    let status: String = row.get(5)?;
    Ok(Game {
        id: row.get(0)?,
        league_id: row.get(1)?,
        home_team_id: row.get(2)?,
        away_team_id: row.get(3)?,
        scheduled_at: row.get(4)?,
        status: GameStatus::from_db(&status).ok_or_else(|| conversion_error(5, "game status"))?,
        quarter: row.get(6)?,
        clock_secs: row.get(7)?,
        home_score: row.get(8)?,
        away_score: row.get(9)?,
    })
}

fn stat_line_from_row(row: &Row, offset: usize) -> rusqlite::Result<StatLine> {
    Ok(StatLine {
        minutes: row.get(offset)?,
        pts: row.get(offset + 1)?,
        fgm: row.get(offset + 2)?,
        fga: row.get(offset + 3)?,
        fg3m: row.get(offset + 4)?,
        fg3a: row.get(offset + 5)?,
        ftm: row.get(offset + 6)?,
        fta: row.get(offset + 7)?,
        orb: row.get(offset + 8)?,
        drb: row.get(offset + 9)?,
        ast: row.get(offset + 10)?,
        stl: row.get(offset + 11)?,
        blk: row.get(offset + 12)?,
        tov: row.get(offset + 13)?,
        pf: row.get(offset + 14)?,
        plus_minus: row.get(offset + 15)?,
    })
}

fn stats_from_row(row: &Row) -> rusqlite::Result<PlayerGameStats> {
    Ok(PlayerGameStats {
        game_id: row.get(0)?,
        player_id: row.get(1)?,
        team_id: row.get(2)?,
        line: stat_line_from_row(row, 3)?,
    })
}

fn event_from_row(row: &Row) -> rusqlite::Result<PlayEvent> {
    let kind: String = row.get(5)?;
    Ok(PlayEvent {
        id: row.get(0)?,
        game_id: row.get(1)?,
        seq: row.get(2)?,
        quarter: row.get(3)?,
        clock_secs: row.get(4)?,
        kind: EventKind::from_db(&kind).ok_or_else(|| conversion_error(5, "event kind"))?,
        team_id: row.get(6)?,
        player_id: row.get(7)?,
        points: row.get(8)?,
        home_score: row.get(9)?,
        away_score: row.get(10)?,
        description: row.get(11)?,
    })
}

fn shot_from_row(row: &Row) -> rusqlite::Result<Shot> {
    Ok(Shot {
        id: row.get(0)?,
        game_id: row.get(1)?,
        player_id: row.get(2)?,
        team_id: row.get(3)?,
        quarter: row.get(4)?,
        clock_secs: row.get(5)?,
        x: row.get::<_, f64>(6)? as f32,
        y: row.get::<_, f64>(7)? as f32,
        made: row.get(8)?,
        is_three: row.get(9)?,
    })
}

fn collect<T>(
    conn: &Connection,
    sql: &str,
    args: impl rusqlite::Params,
    map: impl FnMut(&Row) -> rusqlite::Result<T>,
    what: &str,
) -> Result<Vec<T>> {
    let mut stmt = conn
        .prepare(sql)
        .with_context(|| format!("prepare {what} query"))?;
    let rows = stmt
        .query_map(args, map)
        .with_context(|| format!("query {what}"))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.with_context(|| format!("decode {what} row"))?);
    }
    Ok(out)
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

impl SqliteBackend {
    fn find_league(&self, id: LeagueId) -> Result<Option<League>> {
        self.conn
            .query_row(
                &format!("SELECT {LEAGUE_COLS} FROM leagues WHERE id = ?1"),
                params![id],
                league_from_row,
            )
            .optional()
            .context("query league")
    }

    fn find_team(&self, id: TeamId) -> Result<Option<Team>> {
        self.conn
            .query_row(
                &format!("SELECT {TEAM_COLS} FROM teams WHERE id = ?1"),
                params![id],
                team_from_row,
            )
            .optional()
            .context("query team")
    }

    fn find_player(&self, id: PlayerId) -> Result<Option<Player>> {
        self.conn
            .query_row(
                &format!("SELECT {PLAYER_COLS} FROM players WHERE id = ?1"),
                params![id],
                player_from_row,
            )
            .optional()
            .context("query player")
    }

    fn find_game(&self, id: GameId) -> Result<Option<Game>> {
        self.conn
            .query_row(
                &format!("SELECT {GAME_COLS} FROM games WHERE id = ?1"),
                params![id],
                game_from_row,
            )
            .optional()
            .context("query game")
    }

    fn team(&self, id: TeamId) -> Result<Team> {
        Ok(self
            .find_team(id)?
            .ok_or(BackendError::not_found("team", id))?)
    }

    fn unused_invite_code(&self) -> Result<String> {
        let mut rng = rand::thread_rng();
        for _ in 0..INVITE_ATTEMPTS {
            let code = generate_invite_code(&mut rng);
            let taken = self
                .conn
                .query_row(
                    "SELECT 1 FROM leagues WHERE invite_code = ?1",
                    params![code],
                    |_| Ok(()),
                )
                .optional()
                .context("check invite code")?
                .is_some();
            if !taken {
                return Ok(code);
            }
        }
        Err(BackendError::Conflict("could not allocate a unique invite code".to_string()).into())
    }

    fn players_for_teams(&self, team_ids: &[TeamId]) -> Result<Vec<Player>> {
        let mut out = Vec::new();
        for team_id in team_ids {
            out.extend(self.list_players(*team_id)?);
        }
        Ok(out)
    }
}

fn insert_snapshot_rows(tx: &Transaction, snapshot: &SessionSnapshot) -> Result<()> {
    let game_id = snapshot.game.id;
    for table in ["player_game_stats", "play_events", "shots"] {
        tx.execute(
            &format!("DELETE FROM {table} WHERE game_id = ?1"),
            params![game_id],
        )
        .with_context(|| format!("clear {table}"))?;
    }

    let mut stmt = tx
        .prepare(&format!(
            "INSERT INTO player_game_stats(game_id, player_id, team_id, {STAT_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
        ))
        .context("prepare stats insert")?;
    for row in snapshot.stats.iter().filter(|r| r.game_id == game_id) {
        let l = &row.line;
        stmt.execute(params![
            game_id,
            row.player_id,
            row.team_id,
            l.minutes,
            l.pts,
            l.fgm,
            l.fga,
            l.fg3m,
            l.fg3a,
            l.ftm,
            l.fta,
            l.orb,
            l.drb,
            l.ast,
            l.stl,
            l.blk,
            l.tov,
            l.pf,
            l.plus_minus
        ])
        .context("insert player stats")?;
    }

    let mut stmt = tx
        .prepare(
            "INSERT INTO play_events(game_id, seq, quarter, clock_secs, kind, team_id, player_id, points, home_score, away_score, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .context("prepare event insert")?;
    for e in &snapshot.events {
        stmt.execute(params![
            game_id,
            e.seq,
            e.quarter,
            e.clock_secs,
            e.kind.as_db(),
            e.team_id,
            e.player_id,
            e.points,
            e.home_score,
            e.away_score,
            e.description
        ])
        .context("insert play event")?;
    }

    let mut stmt = tx
        .prepare(
            "INSERT INTO shots(game_id, player_id, team_id, quarter, clock_secs, x, y, made, is_three)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .context("prepare shot insert")?;
    for s in &snapshot.shots {
        stmt.execute(params![
            game_id,
            s.player_id,
            s.team_id,
            s.quarter,
            s.clock_secs,
            s.x as f64,
            s.y as f64,
            s.made,
            s.is_three
        ])
        .context("insert shot")?;
    }
    Ok(())
}

impl StatsBackend for SqliteBackend {
    fn describe(&self) -> String {
        match self.conn.path() {
            Some(path) if !path.is_empty() => format!("sqlite:{path}"),
            _ => "sqlite:memory".to_string(),
        }
    }

    fn list_leagues(&self, user: &str) -> Result<Vec<League>> {
        collect(
            &self.conn,
            &format!(
                "SELECT {LEAGUE_COLS} FROM leagues
                 WHERE is_public = 1 OR owner = ?1
                    OR id IN (SELECT league_id FROM league_members WHERE user = ?1)
                 ORDER BY name COLLATE NOCASE, id"
            ),
            params![user],
            league_from_row,
            "leagues",
        )
    }

    fn get_league(&self, id: LeagueId) -> Result<League> {
        Ok(self
            .find_league(id)?
            .ok_or(BackendError::not_found("league", id))?)
    }

    fn list_teams(&self, league_id: LeagueId) -> Result<Vec<Team>> {
        collect(
            &self.conn,
            &format!("SELECT {TEAM_COLS} FROM teams WHERE league_id = ?1 ORDER BY name COLLATE NOCASE, id"),
            params![league_id],
            team_from_row,
            "teams",
        )
    }

    fn list_players(&self, team_id: TeamId) -> Result<Vec<Player>> {
        collect(
            &self.conn,
            &format!("SELECT {PLAYER_COLS} FROM players WHERE team_id = ?1 ORDER BY number, id"),
            params![team_id],
            player_from_row,
            "players",
        )
    }

    fn list_games(&self, league_id: LeagueId) -> Result<Vec<Game>> {
        collect(
            &self.conn,
            &format!("SELECT {GAME_COLS} FROM games WHERE league_id = ?1 ORDER BY scheduled_at DESC, id DESC"),
            params![league_id],
            game_from_row,
            "games",
        )
    }

    fn get_game(&self, id: GameId) -> Result<Game> {
        Ok(self
            .find_game(id)?
            .ok_or(BackendError::not_found("game", id))?)
    }

    fn get_box_score(&self, game_id: GameId) -> Result<BoxScoreData> {
        let game = self.get_game(game_id)?;
        let home_team = self.team(game.home_team_id)?;
        let away_team = self.team(game.away_team_id)?;
        let players = self.players_for_teams(&[home_team.id, away_team.id])?;
        let stats = collect(
            &self.conn,
            &format!("SELECT game_id, player_id, team_id, {STAT_COLS} FROM player_game_stats WHERE game_id = ?1"),
            params![game_id],
            stats_from_row,
            "player stats",
        )?;
        Ok(BoxScoreData {
            game,
            home_team,
            away_team,
            players,
            stats,
        })
    }

    fn get_scoring_timeline(&self, game_id: GameId) -> Result<Vec<ScoringPoint>> {
        Ok(scoring_timeline(&self.get_play_by_play(game_id)?))
    }

    fn get_play_by_play(&self, game_id: GameId) -> Result<Vec<PlayEvent>> {
        collect(
            &self.conn,
            &format!("SELECT {EVENT_COLS} FROM play_events WHERE game_id = ?1 ORDER BY seq"),
            params![game_id],
            event_from_row,
            "play events",
        )
    }

    fn get_shots(&self, game_id: GameId) -> Result<Vec<Shot>> {
        collect(
            &self.conn,
            &format!("SELECT {SHOT_COLS} FROM shots WHERE game_id = ?1 ORDER BY id"),
            params![game_id],
            shot_from_row,
            "shots",
        )
    }

    fn get_league_stats(&self, league_id: LeagueId) -> Result<LeagueStatsData> {
        let teams = self.list_teams(league_id)?;
        let team_ids = teams.iter().map(|t| t.id).collect::<Vec<_>>();
        let players = self.players_for_teams(&team_ids)?;
        let games = self.list_games(league_id)?;
        let stats = collect(
            &self.conn,
            &format!(
                "SELECT s.game_id, s.player_id, s.team_id, {}
                 FROM player_game_stats s JOIN games g ON g.id = s.game_id
                 WHERE g.league_id = ?1",
                STAT_COLS
                    .split(", ")
                    .map(|c| format!("s.{c}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            params![league_id],
            stats_from_row,
            "league stats",
        )?;
        Ok(LeagueStatsData {
            teams,
            players,
            games,
            stats,
        })
    }

    fn create_league(&mut self, input: &NewLeague, owner: &str) -> Result<League> {
        validate_league(input).map_err(BackendError::from)?;
        let code = self.unused_invite_code()?;
        let created_at = now_rfc3339();
        let tx = self.conn.transaction().context("begin create league")?;
        tx.execute(
            "INSERT INTO leagues(name, description, season, invite_code, owner, is_public, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                input.name.trim(),
                input.description.trim(),
                input.season.trim(),
                code,
                owner,
                input.is_public,
                created_at
            ],
        )
        .context("insert league")?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO league_members(league_id, user, role, joined_at) VALUES (?1, ?2, 'owner', ?3)",
            params![id, owner, created_at],
        )
        .context("insert league owner")?;
        tx.commit().context("commit create league")?;
        info!(league_id = id, "league created");
        self.get_league(id)
    }

    fn update_league(&mut self, id: LeagueId, patch: &LeaguePatch) -> Result<League> {
        let current = self.get_league(id)?;
        let merged = NewLeague {
            name: patch.name.clone().unwrap_or(current.name),
            description: patch.description.clone().unwrap_or(current.description),
            season: patch.season.clone().unwrap_or(current.season),
            is_public: patch.is_public.unwrap_or(current.is_public),
        };
        validate_league(&merged).map_err(BackendError::from)?;
        self.conn
            .execute(
                "UPDATE leagues SET name = ?1, description = ?2, season = ?3, is_public = ?4 WHERE id = ?5",
                params![
                    merged.name.trim(),
                    merged.description.trim(),
                    merged.season.trim(),
                    merged.is_public,
                    id
                ],
            )
            .context("update league")?;
        self.get_league(id)
    }

    fn delete_league(&mut self, id: LeagueId) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM leagues WHERE id = ?1", params![id])
            .context("delete league")?;
        if n == 0 {
            return Err(BackendError::not_found("league", id).into());
        }
        info!(league_id = id, "league deleted");
        Ok(())
    }

    fn join_league_by_invite_code(&mut self, code: &str, user: &str) -> Result<League> {
        let code = validate_invite_code(code).map_err(BackendError::from)?;
        let league = self
            .conn
            .query_row(
                &format!("SELECT {LEAGUE_COLS} FROM leagues WHERE invite_code = ?1"),
                params![code],
                league_from_row,
            )
            .optional()
            .context("query league by invite code")?
            .ok_or_else(|| BackendError::InvalidInviteCode(code.clone()))?;

        let member = self
            .conn
            .query_row(
                "SELECT 1 FROM league_members WHERE league_id = ?1 AND user = ?2",
                params![league.id, user],
                |_| Ok(()),
            )
            .optional()
            .context("query membership")?
            .is_some();
        if member || league.owner == user {
            return Err(BackendError::Conflict(format!("already a member of {}", league.name)).into());
        }
        self.conn
            .execute(
                "INSERT INTO league_members(league_id, user, role, joined_at) VALUES (?1, ?2, 'member', ?3)",
                params![league.id, user, now_rfc3339()],
            )
            .context("insert membership")?;
        info!(league_id = league.id, user, "joined league");
        Ok(league)
    }

    fn regenerate_invite_code(&mut self, id: LeagueId) -> Result<String> {
        self.get_league(id)?;
        let code = self.unused_invite_code()?;
        self.conn
            .execute(
                "UPDATE leagues SET invite_code = ?1 WHERE id = ?2",
                params![code, id],
            )
            .context("update invite code")?;
        Ok(code)
    }

    fn create_team(&mut self, input: &NewTeam) -> Result<Team> {
        self.get_league(input.league_id)?;
        let existing = self.list_teams(input.league_id)?;
        validate_team(input, &existing, None).map_err(BackendError::from)?;
        self.conn
            .execute(
                "INSERT INTO teams(league_id, name, city, abbreviation) VALUES (?1, ?2, ?3, ?4)",
                params![
                    input.league_id,
                    input.name.trim(),
                    input.city.trim(),
                    input.abbreviation.trim()
                ],
            )
            .context("insert team")?;
        let id = self.conn.last_insert_rowid();
        debug!(team_id = id, "team created");
        self.team(id)
    }

    fn update_team(&mut self, id: TeamId, patch: &TeamPatch) -> Result<Team> {
        let current = self.team(id)?;
        let merged = NewTeam {
            league_id: current.league_id,
            name: patch.name.clone().unwrap_or(current.name),
            city: patch.city.clone().unwrap_or(current.city),
            abbreviation: patch.abbreviation.clone().unwrap_or(current.abbreviation),
        };
        let existing = self.list_teams(current.league_id)?;
        validate_team(&merged, &existing, Some(id)).map_err(BackendError::from)?;
        self.conn
            .execute(
                "UPDATE teams SET name = ?1, city = ?2, abbreviation = ?3 WHERE id = ?4",
                params![
                    merged.name.trim(),
                    merged.city.trim(),
                    merged.abbreviation.trim(),
                    id
                ],
            )
            .context("update team")?;
        self.team(id)
    }

    fn delete_team(&mut self, id: TeamId) -> Result<()> {
        let team = self.team(id)?;
        let games: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM games WHERE home_team_id = ?1 OR away_team_id = ?1",
                params![id],
                |row| row.get(0),
            )
            .context("count team games")?;
        if games > 0 {
            return Err(BackendError::Conflict(format!(
                "{} has {games} game(s); delete those first",
                team.name
            ))
            .into());
        }
        self.conn
            .execute("DELETE FROM teams WHERE id = ?1", params![id])
            .context("delete team")?;
        Ok(())
    }

    fn create_player(&mut self, input: &NewPlayer) -> Result<Player> {
        self.team(input.team_id)?;
        let roster = self.list_players(input.team_id)?;
        validate_player(input, &roster, None).map_err(BackendError::from)?;
        self.conn
            .execute(
                "INSERT INTO players(team_id, name, number, position, active) VALUES (?1, ?2, ?3, ?4, 1)",
                params![
                    input.team_id,
                    input.name.trim(),
                    input.number,
                    input.position.label()
                ],
            )
            .context("insert player")?;
        let id = self.conn.last_insert_rowid();
        Ok(self
            .find_player(id)?
            .ok_or(BackendError::not_found("player", id))?)
    }

    fn update_player(&mut self, id: PlayerId, patch: &PlayerPatch) -> Result<Player> {
        let current = self
            .find_player(id)?
            .ok_or(BackendError::not_found("player", id))?;
        let merged = NewPlayer {
            team_id: current.team_id,
            name: patch.name.clone().unwrap_or(current.name),
            number: patch.number.unwrap_or(current.number),
            position: patch.position.unwrap_or(current.position),
        };
        let active = patch.active.unwrap_or(current.active);
        if active {
            let roster = self.list_players(current.team_id)?;
            validate_player(&merged, &roster, Some(id)).map_err(BackendError::from)?;
        }
        self.conn
            .execute(
                "UPDATE players SET name = ?1, number = ?2, position = ?3, active = ?4 WHERE id = ?5",
                params![
                    merged.name.trim(),
                    merged.number,
                    merged.position.label(),
                    active,
                    id
                ],
            )
            .context("update player")?;
        Ok(self
            .find_player(id)?
            .ok_or(BackendError::not_found("player", id))?)
    }

    fn delete_player(&mut self, id: PlayerId) -> Result<()> {
        self.find_player(id)?
            .ok_or(BackendError::not_found("player", id))?;
        let has_stats = self
            .conn
            .query_row(
                "SELECT 1 FROM player_game_stats WHERE player_id = ?1 LIMIT 1",
                params![id],
                |_| Ok(()),
            )
            .optional()
            .context("query player stats")?
            .is_some();
        // Players with recorded games are retired instead so old box scores stay whole.
        if has_stats {
            self.conn
                .execute("UPDATE players SET active = 0 WHERE id = ?1", params![id])
                .context("deactivate player")?;
        } else {
            self.conn
                .execute("DELETE FROM players WHERE id = ?1", params![id])
                .context("delete player")?;
        }
        Ok(())
    }

    fn create_game(&mut self, input: &NewGame) -> Result<Game> {
        validate_game(input).map_err(BackendError::from)?;
        for team_id in [input.home_team_id, input.away_team_id] {
            let team = self.team(team_id)?;
            if team.league_id != input.league_id {
                return Err(BackendError::Conflict(format!(
                    "{} does not belong to this league",
                    team.name
                ))
                .into());
            }
        }
        self.conn
            .execute(
                "INSERT INTO games(league_id, home_team_id, away_team_id, scheduled_at, status)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    input.league_id,
                    input.home_team_id,
                    input.away_team_id,
                    input.scheduled_at.trim(),
                    GameStatus::Scheduled.as_db()
                ],
            )
            .context("insert game")?;
        let id = self.conn.last_insert_rowid();
        self.get_game(id)
    }

    fn set_game_status(&mut self, id: GameId, status: GameStatus) -> Result<Game> {
        let n = self
            .conn
            .execute(
                "UPDATE games SET status = ?1 WHERE id = ?2",
                params![status.as_db(), id],
            )
            .context("update game status")?;
        if n == 0 {
            return Err(BackendError::not_found("game", id).into());
        }
        self.get_game(id)
    }

    fn delete_game(&mut self, id: GameId) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM games WHERE id = ?1", params![id])
            .context("delete game")?;
        if n == 0 {
            return Err(BackendError::not_found("game", id).into());
        }
        Ok(())
    }

    fn save_session(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
        let game = &snapshot.game;
        self.get_game(game.id)?;
        let tx = self.conn.transaction().context("begin save session")?;
        tx.execute(
            "UPDATE games SET status = ?1, quarter = ?2, clock_secs = ?3, home_score = ?4, away_score = ?5
             WHERE id = ?6",
            params![
                game.status.as_db(),
                game.quarter,
                game.clock_secs,
                game.home_score,
                game.away_score,
                game.id
            ],
        )
        .context("update game from session")?;
        insert_snapshot_rows(&tx, snapshot)?;
        tx.commit().context("commit save session")?;
        debug!(
            game_id = game.id,
            events = snapshot.events.len(),
            "session saved"
        );
        Ok(())
    }
}
