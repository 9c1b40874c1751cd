use hoops_terminal::model::{EventKind, Game, GameStatus, Player, Position};
use hoops_terminal::scorekeeper::{GameSession, Recording, Rules, ScoreError, StatAction};

const HOME: i64 = 10;
const AWAY: i64 = 20;

fn roster(team_id: i64) -> Vec<Player> {
    (0..7)
        .map(|idx| Player {
            id: team_id * 10 + idx,
            team_id,
            name: format!("Player {team_id}-{idx}"),
            number: idx as u8 + 1,
            position: Position::ALL[idx as usize % 5],
            active: true,
        })
        .collect()
}

fn scheduled_game() -> Game {
    Game {
        id: 1,
        league_id: 1,
        home_team_id: HOME,
        away_team_id: AWAY,
        scheduled_at: "2026-01-10 19:30".to_string(),
        status: GameStatus::Scheduled,
        quarter: 0,
        clock_secs: 0,
        home_score: 0,
        away_score: 0,
    }
}

fn live_session() -> GameSession {
    let mut session = GameSession::new(scheduled_game(), roster(HOME), roster(AWAY), Rules::default());
    session.start().expect("start");
    session
}

/// Runs out the clock and moves on, returning with the new period live.
fn play_out_period(session: &mut GameSession) {
    assert!(session.tick(10_000));
    session.advance_quarter().expect("advance");
    session.start().expect("restart");
}

#[test]
fn nothing_is_recorded_before_tip_off() {
    let mut session = GameSession::new(scheduled_game(), roster(HOME), roster(AWAY), Rules::default());
    let err = session.record(Recording::new(100, StatAction::Made2)).unwrap_err();
    assert_eq!(err, ScoreError::NotLive);

    session.start().expect("start");
    assert_eq!(session.game().status, GameStatus::Live);
    assert_eq!(session.game().quarter, 1);
    assert_eq!(session.game().clock_secs, 600);
    assert_eq!(session.events()[0].kind, EventKind::QuarterStart);
}

#[test]
fn scoring_updates_score_and_plus_minus() {
    let mut session = live_session();
    let event = session
        .record(Recording::new(100, StatAction::Made3).at(0.0, 29.5))
        .expect("three");
    assert_eq!(event.points, 3);
    assert_eq!(event.home_score, 3);
    assert_eq!(session.game().home_score, 3);

    assert_eq!(session.line(100).pts, 3);
    assert_eq!(session.line(101).plus_minus, 3);
    assert_eq!(session.line(200).plus_minus, -3);
    assert_eq!(session.line(105).plus_minus, 0);

    assert_eq!(session.shots().len(), 1);
    assert!(session.shots()[0].is_three);
    assert!(session.shots()[0].made);

    session
        .record(Recording::new(200, StatAction::FtMade).at(0.0, 15.0))
        .expect("free throw");
    assert_eq!(session.shots().len(), 1);
    assert_eq!(session.game().away_score, 1);
    assert_eq!(session.team_points(AWAY), 1);
}

#[test]
fn bench_and_unknown_players_are_rejected() {
    let mut session = live_session();
    assert_eq!(
        session.record(Recording::new(105, StatAction::Made2)),
        Err(ScoreError::NotOnCourt(105))
    );
    assert_eq!(
        session.record(Recording::new(999, StatAction::Made2)),
        Err(ScoreError::UnknownPlayer(999))
    );
}

#[test]
fn foul_limit_and_bonus() {
    let mut session = live_session();
    for _ in 0..5 {
        session
            .record(Recording::new(100, StatAction::Foul))
            .expect("foul");
    }
    assert!(session.fouled_out(100));
    assert_eq!(session.team_fouls(HOME), 5);
    assert!(session.in_bonus(AWAY));
    assert!(!session.in_bonus(HOME));
    assert!(
        session
            .events()
            .last()
            .is_some_and(|e| e.description.contains("fouled out"))
    );

    assert_eq!(
        session.record(Recording::new(100, StatAction::Made2)),
        Err(ScoreError::FouledOut(100))
    );
    session.substitute(100, 105).expect("replace fouled-out player");
    assert!(session.on_court(HOME).contains(&105));
    assert_eq!(
        session.substitute(105, 100).map(|_| ()),
        Err(ScoreError::FouledOut(100))
    );
}

#[test]
fn substitutions_stay_within_a_team() {
    let mut session = live_session();
    assert_eq!(
        session.substitute(100, 205).map(|_| ()),
        Err(ScoreError::CrossTeamSubstitution)
    );
    assert_eq!(
        session.substitute(100, 101).map(|_| ()),
        Err(ScoreError::AlreadyOnCourt(101))
    );
    assert_eq!(
        session.substitute(105, 106).map(|_| ()),
        Err(ScoreError::NotOnCourt(105))
    );
    let event = session.substitute(100, 105).expect("sub");
    assert_eq!(event.kind, EventKind::Substitution);
    assert!(event.description.starts_with("SUB:"));
}

#[test]
fn undo_rolls_back_the_last_action() {
    let mut session = live_session();
    session
        .record(Recording::new(100, StatAction::Made2).at(0.0, 6.0))
        .expect("two");
    let events = session.events().len();
    session
        .record(Recording::new(201, StatAction::Made3).at(0.0, 29.5))
        .expect("three");

    session.undo().expect("undo");
    assert_eq!(session.game().away_score, 0);
    assert_eq!(session.game().home_score, 2);
    assert_eq!(session.events().len(), events);
    assert_eq!(session.shots().len(), 1);
    assert_eq!(session.line(100).plus_minus, 2);

    session.undo().expect("undo");
    assert_eq!(session.undo(), Err(ScoreError::NothingToUndo));
}

#[test]
fn undo_leaves_the_clock_where_it_is() {
    let mut session = live_session();
    session.tick(300);
    session
        .record(Recording::new(100, StatAction::Made2))
        .expect("two");
    session.tick(60);
    session.undo().expect("undo");
    assert_eq!(session.game().clock_secs, 240);
    assert_eq!(session.game().status, GameStatus::Live);
    assert_eq!(session.game().home_score, 0);
    assert_eq!(session.minutes_played(100), 6);
}

#[test]
fn undo_after_the_buzzer_keeps_the_period_over() {
    let mut session = live_session();
    session
        .record(Recording::new(100, StatAction::Made2))
        .expect("two");
    assert!(session.tick(600));
    session.undo().expect("undo");
    assert_eq!(session.game().status, GameStatus::Paused);
    assert_eq!(session.game().clock_secs, 0);
    assert_eq!(session.game().quarter, 1);
    assert_eq!(session.game().home_score, 0);
    assert_eq!(session.line(100).pts, 0);
}

#[test]
fn clock_accrues_minutes_and_expires() {
    let mut session = live_session();
    assert!(!session.tick(300));
    assert_eq!(session.game().clock_secs, 300);
    assert_eq!(session.minutes_played(100), 5);
    assert_eq!(session.minutes_played(105), 0);

    assert!(session.tick(400));
    assert_eq!(session.game().clock_secs, 0);
    assert_eq!(session.game().status, GameStatus::Paused);
    assert_eq!(session.line(100).minutes, 10);
}

#[test]
fn new_period_resets_team_fouls_and_undo() {
    let mut session = live_session();
    session
        .record(Recording::new(100, StatAction::Foul))
        .expect("foul");
    play_out_period(&mut session);
    assert_eq!(session.game().quarter, 2);
    assert_eq!(session.game().clock_secs, 600);
    assert_eq!(session.team_fouls(HOME), 0);
    assert_eq!(session.line(100).pf, 1);
    assert!(!session.can_undo());
    assert_eq!(session.period_label(), "Q2");
}

#[test]
fn regulation_ends_only_when_someone_leads() {
    let mut session = live_session();
    for _ in 0..3 {
        play_out_period(&mut session);
    }
    assert_eq!(session.game().quarter, 4);
    assert_eq!(
        session.finish(),
        Err(ScoreError::CannotFinish("score is tied"))
    );

    // Tied after four: overtime is five minutes.
    play_out_period(&mut session);
    assert_eq!(session.game().quarter, 5);
    assert_eq!(session.game().clock_secs, 300);
    assert_eq!(session.period_label(), "OT1");

    session
        .record(Recording::new(200, StatAction::Made2))
        .expect("winner");
    assert!(session.tick(300));
    assert_eq!(session.advance_quarter(), Err(ScoreError::RegulationComplete));
    session.finish().expect("finish");
    assert_eq!(session.game().status, GameStatus::Final);
    assert_eq!(
        session.record(Recording::new(200, StatAction::Made2)),
        Err(ScoreError::AlreadyFinal)
    );
}

#[test]
fn finish_waits_for_the_clock_to_run_out() {
    let mut session = live_session();
    for _ in 0..3 {
        play_out_period(&mut session);
    }
    session
        .record(Recording::new(100, StatAction::Made2))
        .expect("go ahead");
    assert_eq!(session.game().clock_secs, 600);
    assert_eq!(
        session.finish(),
        Err(ScoreError::CannotFinish("period is still running"))
    );
    assert_eq!(session.game().status, GameStatus::Live);

    assert!(session.tick(600));
    session.finish().expect("finish");
    assert_eq!(session.game().status, GameStatus::Final);
}

#[test]
fn free_throws_are_allowed_after_the_buzzer() {
    let mut session = live_session();
    session
        .record(Recording::new(100, StatAction::Foul))
        .expect("foul");
    assert!(session.tick(600));
    session.start().expect("resume for free throws");
    session
        .record(Recording::new(200, StatAction::FtMade))
        .expect("free throw at 0:00");
    assert_eq!(
        session.record(Recording::new(200, StatAction::Made2)),
        Err(ScoreError::ClockExpired)
    );
}

#[test]
fn timeout_pauses_the_clock() {
    let mut session = live_session();
    let event = session.timeout(AWAY).expect("timeout");
    assert_eq!(event.kind, EventKind::Timeout);
    assert_eq!(session.game().status, GameStatus::Paused);
    assert_eq!(
        session.timeout(99).map(|_| ()),
        Err(ScoreError::UnknownTeam(99))
    );
}

#[test]
fn snapshot_and_resume_round_trip_the_game_state() {
    let mut session = live_session();
    session
        .record(Recording::new(100, StatAction::Made2).at(0.0, 6.0))
        .expect("two");
    session
        .record(Recording::new(201, StatAction::Foul))
        .expect("foul");
    session.tick(120);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.game.home_score, 2);
    let home_points = snapshot
        .stats
        .iter()
        .filter(|r| r.team_id == HOME)
        .map(|r| r.line.pts)
        .sum::<u32>();
    assert_eq!(home_points, snapshot.game.home_score);
    // Players who never touched the ball and never played are left out.
    assert!(snapshot.stats.iter().all(|r| r.player_id != 106));

    let resumed = GameSession::resume(
        snapshot.game.clone(),
        roster(HOME),
        roster(AWAY),
        Rules::default(),
        &snapshot.stats,
        snapshot.events.clone(),
        snapshot.shots.clone(),
    );
    assert_eq!(resumed.line(100).pts, 2);
    assert_eq!(resumed.minutes_played(100), 2);
    assert_eq!(resumed.team_fouls(AWAY), 1);
    assert_eq!(resumed.events().len(), snapshot.events.len());
    assert_eq!(resumed.shots().len(), 1);
}
