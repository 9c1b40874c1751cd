use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::app_cache_dir;
use crate::leaderboard::LeaderCategory;
use crate::model::{LeagueId, PlayerId};
use crate::play_by_play::{PbpFilter, PbpSort};
use crate::state::{AppState, Screen};

const PREFS_FILE: &str = "prefs.json";
const PREFS_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prefs {
    pub version: u32,
    #[serde(default)]
    pub last_league: Option<LeagueId>,
    #[serde(default)]
    pub screen: Option<String>,
    #[serde(default)]
    pub pbp_filter: PbpFilter,
    #[serde(default)]
    pub pbp_sort: PbpSort,
    #[serde(default)]
    pub leader_category: Option<String>,
    #[serde(default)]
    pub compare_ids: [Option<PlayerId>; 2],
}

impl Prefs {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            version: PREFS_VERSION,
            last_league: state.current_league,
            screen: Some(state.screen.key().to_string()),
            pbp_filter: PbpFilter {
                team: None,
                ..state.pbp_filter.clone()
            },
            pbp_sort: state.pbp_sort,
            leader_category: Some(state.leader_category.label().to_string()),
            compare_ids: state.compare_ids,
        }
    }

    /// Restores what still makes sense at start-up. Screens that need an open
    /// game fall back to the games list, and nothing past the league list is
    /// restored without a league.
    pub fn apply(&self, state: &mut AppState) {
        state.current_league = self.last_league;
        state.pbp_filter = self.pbp_filter.clone();
        state.pbp_sort = self.pbp_sort;
        state.compare_ids = self.compare_ids;
        if let Some(category) = self.leader_category.as_deref()
            && let Some(found) = LeaderCategory::ALL
                .into_iter()
                .find(|c| c.label() == category)
        {
            state.leader_category = found;
        }

        let screen = self
            .screen
            .as_deref()
            .and_then(Screen::from_key)
            .unwrap_or(Screen::Leagues);
        state.screen = if state.current_league.is_none() {
            Screen::Leagues
        } else if screen.is_game_screen() {
            Screen::Games
        } else if screen == Screen::Roster {
            Screen::Teams
        } else {
            screen
        };
    }
}

pub fn prefs_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(PREFS_FILE))
}

pub fn load_prefs_from(path: &Path) -> Option<Prefs> {
    let raw = fs::read_to_string(path).ok()?;
    let prefs = serde_json::from_str::<Prefs>(&raw).ok()?;
    if prefs.version != PREFS_VERSION {
        return None;
    }
    Some(prefs)
}

/// Writes through a temp file so a crash never leaves half a JSON document.
pub fn save_prefs_to(path: &Path, prefs: &Prefs) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(prefs)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)
}

pub fn load_into_state(state: &mut AppState) {
    let Some(path) = prefs_path() else {
        return;
    };
    if let Some(prefs) = load_prefs_from(&path) {
        prefs.apply(state);
    }
}

pub fn save_from_state(state: &AppState) {
    let Some(path) = prefs_path() else {
        return;
    };
    if let Err(err) = save_prefs_to(&path, &Prefs::from_state(state)) {
        tracing::warn!(path = %path.display(), error = %err, "failed to save prefs");
    }
}
