use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::scorekeeper::Rules;

pub const APP_DIR: &str = "hoops_terminal";
const DB_FILE: &str = "hoops.sqlite";
const LOG_FILE: &str = "hoops.log";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: Option<PathBuf>,
    pub backend_url: Option<String>,
    pub backend_token: Option<String>,
    pub user: String,
    pub rules: Rules,
    pub run_threshold: u32,
    pub toast_secs: u64,
    pub refresh: Duration,
    pub stats_threads: usize,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        let quarter_minutes = env_u64("HOOPS_QUARTER_MINUTES", 10).clamp(1, 20) as u32;
        let foul_limit = env_u64("HOOPS_FOUL_LIMIT", 5).clamp(4, 6) as u32;
        Self {
            db_path: env_path("HOOPS_DB_PATH").or_else(|| app_cache_dir().map(|d| d.join(DB_FILE))),
            backend_url: env_string("HOOPS_BACKEND_URL"),
            backend_token: env_string("HOOPS_BACKEND_TOKEN"),
            user: env_string("HOOPS_USER").unwrap_or_else(|| "local".to_string()),
            rules: Rules {
                quarter_minutes,
                foul_limit,
                bonus_fouls: 5,
            },
            run_threshold: env_u64("HOOPS_RUN_THRESHOLD", 8).clamp(4, 30) as u32,
            toast_secs: env_u64("HOOPS_TOAST_SECS", 4).max(1),
            refresh: Duration::from_secs(env_u64("HOOPS_REFRESH_SECS", 5).max(2)),
            stats_threads: env_u64("HOOPS_STATS_THREADS", 4).clamp(1, 16) as usize,
            log_file: env_path("HOOPS_LOG_FILE")
                .or_else(|| app_cache_dir().map(|d| d.join(LOG_FILE))),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env_string(key).map(PathBuf::from)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|val| val.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

pub fn app_cache_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(APP_DIR));
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}

/// Routes `tracing` output to a file; the terminal itself belongs to the UI.
pub fn init_logging(config: &Config) -> Result<()> {
    let Some(path) = config.log_file.as_ref() else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create log dir {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("HOOPS_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}
