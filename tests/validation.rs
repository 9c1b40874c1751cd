use hoops_terminal::model::{NewGame, NewLeague, NewPlayer, NewTeam, Player, Position, Team};
use hoops_terminal::validation::{
    INVITE_CODE_LEN, parse_jersey, validate_game, validate_invite_code, validate_league,
    validate_player, validate_team,
};

fn team(id: i64, abbr: &str) -> Team {
    Team {
        id,
        league_id: 1,
        name: format!("Team {abbr}"),
        city: String::new(),
        abbreviation: abbr.to_string(),
    }
}

fn player(id: i64, number: u8, active: bool) -> Player {
    Player {
        id,
        team_id: 10,
        name: format!("Player {id}"),
        number,
        position: Position::SF,
        active,
    }
}

#[test]
fn league_name_and_season_are_required() {
    let err = validate_league(&NewLeague {
        name: "  ".to_string(),
        description: String::new(),
        season: String::new(),
        is_public: false,
    })
    .unwrap_err();
    assert_eq!(err.0.len(), 2);
    assert!(err.for_field("name").is_some());
    assert!(err.for_field("season").is_some());

    assert!(
        validate_league(&NewLeague {
            name: "Sunday Run".to_string(),
            description: "Pickup".to_string(),
            season: "2026".to_string(),
            is_public: true,
        })
        .is_ok()
    );
}

#[test]
fn team_abbreviations_are_upper_and_unique_per_league() {
    let existing = vec![team(1, "HAW"), team(2, "OWL")];
    let input = |abbr: &str| NewTeam {
        league_id: 1,
        name: "Hawks".to_string(),
        city: String::new(),
        abbreviation: abbr.to_string(),
    };

    let err = validate_team(&input("haw"), &existing, None).unwrap_err();
    assert!(err.to_string().contains("uppercase"));
    let err = validate_team(&input("HAW"), &existing, None).unwrap_err();
    assert!(err.to_string().contains("already used"));
    // Editing a team may keep its own abbreviation.
    assert!(validate_team(&input("HAW"), &existing, Some(1)).is_ok());
    assert!(validate_team(&input("FOXES"), &existing, None).is_err());
}

#[test]
fn jersey_numbers_are_unique_among_active_players() {
    let roster = vec![player(1, 23, true), player(2, 8, false)];
    let input = |number| NewPlayer {
        team_id: 10,
        name: "New Guy".to_string(),
        number,
        position: Position::PG,
    };
    assert!(validate_player(&input(23), &roster, None).is_err());
    assert!(validate_player(&input(23), &roster, Some(1)).is_ok());
    // A retired player's number can be reused.
    assert!(validate_player(&input(8), &roster, None).is_ok());
    assert!(validate_player(&input(100), &roster, None).is_err());
}

#[test]
fn a_team_cannot_play_itself() {
    let err = validate_game(&NewGame {
        league_id: 1,
        home_team_id: 4,
        away_team_id: 4,
        scheduled_at: "2026-02-01 18:00".to_string(),
    })
    .unwrap_err();
    assert!(err.for_field("away_team").is_some());
}

#[test]
fn invite_codes_are_normalised() {
    assert_eq!(
        validate_invite_code(" abcd-efgh ").expect("valid code"),
        "ABCDEFGH"
    );
    assert_eq!(INVITE_CODE_LEN, 8);
    assert!(validate_invite_code("ABC").is_err());
    // 0, 1, I and O are excluded to avoid look-alikes.
    assert!(validate_invite_code("ABCDEFG0").is_err());
    assert!(validate_invite_code("ABCDEFGI").is_err());
}

#[test]
fn jersey_parsing() {
    assert_eq!(parse_jersey(" 7 "), Ok(7));
    assert!(parse_jersey("100").is_err());
    assert!(parse_jersey("seven").is_err());
    assert!(parse_jersey("-1").is_err());
}
