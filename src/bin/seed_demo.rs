use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use hoops_terminal::backend::StatsBackend;
use hoops_terminal::config::Config;
use hoops_terminal::model::{
    Game, GameStatus, NewGame, NewLeague, NewPlayer, NewTeam, Player, PlayerId, Position,
    REGULATION_PERIODS, TeamId,
};
use hoops_terminal::scorekeeper::{GameSession, Recording, Rules, ScoreError, StatAction};
use hoops_terminal::shot_chart::{COURT_HALF_WIDTH, RIM_Y};
use hoops_terminal::sqlite_backend::SqliteBackend;

const TEAMS: [(&str, &str, &str); 4] = [
    ("Harbor Hawks", "Portside", "HAR"),
    ("Ridge Runners", "Highland", "RDG"),
    ("Foundry Flames", "Ironton", "FND"),
    ("Lakeshore Lights", "Bayview", "LKS"),
];
const FIRST_NAMES: [&str; 16] = [
    "Marcus", "Devin", "Andre", "Tyler", "Jalen", "Chris", "Omar", "Luca", "Noah", "Isaiah",
    "Kevin", "Darius", "Malik", "Sam", "Theo", "Jordan",
];
const LAST_NAMES: [&str; 16] = [
    "Reed", "Brooks", "Carter", "Hayes", "Price", "Mason", "Ellis", "Grant", "Shaw", "Porter",
    "Wells", "Fisher", "Hardy", "Lowe", "Pierce", "Nash",
];
const PLAYERS_PER_TEAM: usize = 8;
const DEFAULT_GAMES: usize = 6;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let db_path = parse_path_arg("--db")
        .or_else(|| config.db_path.clone())
        .context("unable to resolve sqlite path")?;
    let games = parse_usize_arg("--games").unwrap_or(DEFAULT_GAMES);
    let mut rng = match parse_usize_arg("--seed") {
        Some(seed) => StdRng::seed_from_u64(seed as u64),
        None => StdRng::from_entropy(),
    };

    let mut backend = SqliteBackend::open(&db_path)?;
    let league = backend.create_league(
        &NewLeague {
            name: "Demo League".to_string(),
            description: "Simulated games for trying out the analytics screens".to_string(),
            season: "2026".to_string(),
            is_public: true,
        },
        &config.user,
    )?;

    let mut rosters: Vec<(TeamId, Vec<Player>)> = Vec::new();
    let mut names = FIRST_NAMES
        .iter()
        .flat_map(|f| LAST_NAMES.iter().map(move |l| format!("{f} {l}")))
        .collect::<Vec<_>>();
    names.shuffle(&mut rng);
    let mut names = names.into_iter();
    for (name, city, abbr) in TEAMS {
        let team = backend.create_team(&NewTeam {
            league_id: league.id,
            name: name.to_string(),
            city: city.to_string(),
            abbreviation: abbr.to_string(),
        })?;
        let mut players = Vec::with_capacity(PLAYERS_PER_TEAM);
        for idx in 0..PLAYERS_PER_TEAM {
            let player = backend.create_player(&NewPlayer {
                team_id: team.id,
                name: names.next().unwrap_or_else(|| format!("Player {idx}")),
                number: (idx as u8) * 3 + rng.gen_range(0..3),
                position: Position::ALL[idx % Position::ALL.len()],
            })?;
            players.push(player);
        }
        rosters.push((team.id, players));
    }

    let mut finished = 0usize;
    for idx in 0..games {
        let home = idx % rosters.len();
        let away = (idx + 1 + idx / rosters.len()) % rosters.len();
        let away = if away == home { (home + 1) % rosters.len() } else { away };
        let game = backend.create_game(&NewGame {
            league_id: league.id,
            home_team_id: rosters[home].0,
            away_team_id: rosters[away].0,
            scheduled_at: format!("2026-01-{:02} 19:30", idx % 28 + 1),
        })?;
        let session = simulate(
            &mut rng,
            game,
            rosters[home].1.clone(),
            rosters[away].1.clone(),
            config.rules,
        )?;
        backend.save_session(&session.snapshot())?;
        let g = session.game();
        println!(
            "game {}: {} {} - {} {} ({})",
            g.id,
            TEAMS[home].2,
            g.home_score,
            g.away_score,
            TEAMS[away].2,
            session.period_label()
        );
        if g.status == GameStatus::Final {
            finished += 1;
        }
    }

    println!("Demo league seeded");
    println!("DB: {}", db_path.display());
    println!("League: {} (invite {})", league.name, league.invite_code);
    println!("Games: {finished}/{games} final");
    Ok(())
}

/// Plays a full game possession by possession until one side wins.
fn simulate(
    rng: &mut StdRng,
    game: Game,
    home: Vec<Player>,
    away: Vec<Player>,
    rules: Rules,
) -> Result<GameSession> {
    let teams = [game.home_team_id, game.away_team_id];
    let mut session = GameSession::new(game, home, away, rules);
    session.start()?;
    let mut offense = 0usize;
    loop {
        if session.tick(rng.gen_range(10..=22)) {
            let q = session.game().quarter;
            let tied = session.game().home_score == session.game().away_score;
            if q >= REGULATION_PERIODS && !tied {
                session.finish()?;
                return Ok(session);
            }
            session.advance_quarter()?;
            rotate(rng, &mut session, teams)?;
            session.start()?;
            continue;
        }
        possession(rng, &mut session, teams[offense], teams[1 - offense])?;
        offense = 1 - offense;
    }
}

fn possession(
    rng: &mut StdRng,
    session: &mut GameSession,
    offense: TeamId,
    defense: TeamId,
) -> Result<(), ScoreError> {
    let Some(shooter) = pick(rng, session, offense) else {
        return Ok(());
    };
    let roll = rng.gen_range(0..100);
    if roll < 13 {
        session.record(Recording::new(shooter, StatAction::Turnover))?;
        if rng.gen_bool(0.5)
            && let Some(thief) = pick(rng, session, defense)
        {
            session.record(Recording::new(thief, StatAction::Steal))?;
        }
        return Ok(());
    }
    if roll < 27 {
        if let Some(fouler) = pick(rng, session, defense) {
            session.record(Recording::new(fouler, StatAction::Foul))?;
        }
        for _ in 0..2 {
            let action = if rng.gen_bool(0.74) {
                StatAction::FtMade
            } else {
                StatAction::FtMiss
            };
            if !session.fouled_out(shooter) {
                session.record(Recording::new(shooter, action))?;
            }
        }
        return Ok(());
    }

    let three = rng.gen_bool(0.36);
    let (x, y) = shot_spot(rng, three);
    let made = rng.gen_bool(if three { 0.35 } else { 0.5 });
    let action = match (three, made) {
        (true, true) => StatAction::Made3,
        (true, false) => StatAction::Miss3,
        (false, true) => StatAction::Made2,
        (false, false) => StatAction::Miss2,
    };
    session.record(Recording::new(shooter, action).at(x, y))?;
    if made {
        if rng.gen_bool(0.6)
            && let Some(passer) = pick(rng, session, offense).filter(|p| *p != shooter)
        {
            session.record(Recording::new(passer, StatAction::Assist))?;
        }
        return Ok(());
    }
    if !three
        && rng.gen_bool(0.08)
        && let Some(blocker) = pick(rng, session, defense)
    {
        session.record(Recording::new(blocker, StatAction::Block))?;
    }
    if rng.gen_bool(0.27) {
        if let Some(p) = pick(rng, session, offense) {
            session.record(Recording::new(p, StatAction::OffRebound))?;
        }
    } else if let Some(p) = pick(rng, session, defense) {
        session.record(Recording::new(p, StatAction::DefRebound))?;
    }
    Ok(())
}

fn pick(rng: &mut StdRng, session: &GameSession, team: TeamId) -> Option<PlayerId> {
    let eligible = session
        .on_court(team)
        .iter()
        .copied()
        .filter(|id| !session.fouled_out(*id))
        .collect::<Vec<_>>();
    eligible.choose(rng).copied()
}

/// Swaps one starter for a bench player per team, and always replaces anyone who fouled out.
fn rotate(rng: &mut StdRng, session: &mut GameSession, teams: [TeamId; 2]) -> Result<()> {
    for team in teams {
        let on_court = session.on_court(team).to_vec();
        let mut bench = session
            .roster(team)
            .iter()
            .map(|p| p.id)
            .filter(|id| !on_court.contains(id) && !session.fouled_out(*id))
            .collect::<Vec<_>>();
        bench.shuffle(rng);
        let mut outgoing = on_court
            .iter()
            .copied()
            .filter(|id| session.fouled_out(*id))
            .collect::<Vec<_>>();
        if outgoing.is_empty()
            && let Some(id) = on_court.choose(rng)
        {
            outgoing.push(*id);
        }
        for (out_id, in_id) in outgoing.into_iter().zip(bench) {
            session.substitute(out_id, in_id)?;
        }
    }
    Ok(())
}

fn shot_spot(rng: &mut StdRng, three: bool) -> (f32, f32) {
    if three {
        let angle = rng.gen_range(0.15f32..std::f32::consts::PI - 0.15);
        let x = (24.0 * angle.cos()).clamp(-COURT_HALF_WIDTH + 2.5, COURT_HALF_WIDTH - 2.5);
        return (x, RIM_Y + 24.0 * angle.sin());
    }
    let angle = rng.gen_range(0.0f32..std::f32::consts::PI);
    let dist = rng.gen_range(1.0f32..18.0);
    (dist * angle.cos(), RIM_Y + dist * angle.sin())
}

fn arg_value(flag: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&format!("{flag}=")) {
            return Some(value.to_string());
        }
        if arg == flag {
            return args.get(idx + 1).cloned();
        }
    }
    None
}

fn parse_path_arg(flag: &str) -> Option<PathBuf> {
    arg_value(flag)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn parse_usize_arg(flag: &str) -> Option<usize> {
    arg_value(flag).and_then(|v| v.trim().parse::<usize>().ok())
}
