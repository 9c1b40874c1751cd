use std::fmt;

use thiserror::Error;

use crate::model::{NewGame, NewLeague, NewPlayer, NewTeam, Player, PlayerId, Team, TeamId};

pub const INVITE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const INVITE_CODE_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summary(.0))]
pub struct ValidationError(pub Vec<FieldError>);

impl ValidationError {
    pub fn for_field(&self, field: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn finish(errors: Vec<FieldError>) -> Result<(), ValidationError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError(errors))
    }
}

fn check_len(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    label: &str,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.trim().chars().count();
    if len == 0 && min > 0 {
        errors.push(FieldError::new(field, format!("{label} is required")));
    } else if len < min {
        errors.push(FieldError::new(
            field,
            format!("{label} must be at least {min} characters"),
        ));
    } else if len > max {
        errors.push(FieldError::new(
            field,
            format!("{label} must be at most {max} characters"),
        ));
    }
}

pub fn validate_league(input: &NewLeague) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    check_len(&mut errors, "name", "League name", &input.name, 3, 50);
    check_len(&mut errors, "season", "Season", &input.season, 1, 20);
    check_len(&mut errors, "description", "Description", &input.description, 0, 280);
    finish(errors)
}

/// `editing` names the team being updated so its own abbreviation is not a clash.
pub fn validate_team(
    input: &NewTeam,
    existing: &[Team],
    editing: Option<TeamId>,
) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    check_len(&mut errors, "name", "Team name", &input.name, 2, 40);
    check_len(&mut errors, "city", "City", &input.city, 0, 40);

    let abbr = input.abbreviation.trim();
    let len = abbr.chars().count();
    if !(2..=4).contains(&len) || !abbr.chars().all(|c| c.is_ascii_uppercase()) {
        errors.push(FieldError::new(
            "abbreviation",
            "Abbreviation must be 2-4 uppercase letters",
        ));
    } else if existing
        .iter()
        .filter(|t| t.league_id == input.league_id && Some(t.id) != editing)
        .any(|t| t.abbreviation == abbr)
    {
        errors.push(FieldError::new(
            "abbreviation",
            format!("Abbreviation {abbr} is already used in this league"),
        ));
    }
    finish(errors)
}

pub fn validate_player(
    input: &NewPlayer,
    roster: &[Player],
    editing: Option<PlayerId>,
) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    check_len(&mut errors, "name", "Player name", &input.name, 1, 60);
    if input.number > 99 {
        errors.push(FieldError::new("number", "Jersey number must be 0-99"));
    } else if roster
        .iter()
        .filter(|p| p.team_id == input.team_id && p.active && Some(p.id) != editing)
        .any(|p| p.number == input.number)
    {
        errors.push(FieldError::new(
            "number",
            format!("Jersey #{} is already taken", input.number),
        ));
    }
    finish(errors)
}

pub fn validate_game(input: &NewGame) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    if input.home_team_id == input.away_team_id {
        errors.push(FieldError::new(
            "away_team",
            "A team cannot play against itself",
        ));
    }
    check_len(&mut errors, "scheduled_at", "Date", &input.scheduled_at, 1, 32);
    finish(errors)
}

/// Upper-cases and strips separators; returns the normalised code when valid.
pub fn validate_invite_code(raw: &str) -> Result<String, ValidationError> {
    let code = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_ascii_uppercase();
    let valid = code.len() == INVITE_CODE_LEN && code.bytes().all(|b| INVITE_ALPHABET.contains(&b));
    if valid {
        Ok(code)
    } else {
        Err(ValidationError(vec![FieldError::new(
            "invite_code",
            format!("Invite codes are {INVITE_CODE_LEN} letters/digits"),
        )]))
    }
}

pub fn parse_jersey(raw: &str) -> Result<u8, FieldError> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|n| *n <= 99)
        .ok_or_else(|| FieldError::new("number", "Jersey number must be 0-99"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_len_counts_chars_not_bytes() {
        let mut errors = Vec::new();
        check_len(&mut errors, "name", "Name", "Ålé", 3, 3);
        assert!(errors.is_empty());
    }

    #[test]
    fn summary_joins_fields() {
        let err = ValidationError(vec![
            FieldError::new("name", "bad"),
            FieldError::new("season", "worse"),
        ]);
        assert_eq!(err.to_string(), "name: bad; season: worse");
    }
}
