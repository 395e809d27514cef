use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::http_client::DEFAULT_TIMEOUT_SECS;
use crate::persist::ModelStore;
use crate::players::{DateRange, parse_date};

const DEFAULT_PLAYERS_FILE: &str = "top_100_players.ini";
const DEFAULT_START_DATE: &str = "2023-07-12";
const DEFAULT_END_DATE: &str = "2024-07-12";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub players_file: PathBuf,
    pub date_range: DateRange,
    pub fetch_timeout: Duration,
    pub debug_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

/// Loads `.env.local` then `.env` into the process environment if present.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let start = parse_date(&var("RATING_START_DATE").unwrap_or(DEFAULT_START_DATE.into()))
            .context("RATING_START_DATE")?;
        let end = parse_date(&var("RATING_END_DATE").unwrap_or(DEFAULT_END_DATE.into()))
            .context("RATING_END_DATE")?;
        let timeout_secs = var("RATING_FETCH_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 120);

        Ok(Self {
            data_dir: var("RATING_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            players_file: var("RATING_PLAYERS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PLAYERS_FILE)),
            date_range: DateRange { start, end },
            fetch_timeout: Duration::from_secs(timeout_secs),
            debug_dir: var("RATING_DEBUG_DIR").map(PathBuf::from),
            log_file: var("RATING_LOG_FILE").map(PathBuf::from),
        })
    }

    /// Command-line flags take precedence over the environment.
    pub fn apply_args(&mut self, args: &[String]) {
        if let Some(dir) = arg_value(args, "--data-dir") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(path) = arg_value(args, "--players") {
            self.players_file = PathBuf::from(path);
        }
        if let Some(dir) = arg_value(args, "--debug-dir") {
            self.debug_dir = Some(PathBuf::from(dir));
        }
        if let Some(path) = arg_value(args, "--log-file") {
            self.log_file = Some(PathBuf::from(path));
        }
    }

    pub fn model_store(&self) -> ModelStore {
        ModelStore::in_dir(&self.data_dir)
    }
}

/// Value of `--flag=value` or `--flag value`.
pub fn arg_value(args: &[String], flag: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(v) = arg
            .strip_prefix(flag)
            .and_then(|rest| rest.strip_prefix('='))
            && !v.trim().is_empty()
        {
            return Some(v.trim().to_string());
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
