//! Runtime configuration
//!
//! Defaults match the behaviour of the original dashboard. Every value can
//! be overridden from the environment (a `.env` file is honoured).

use crate::deadline::DUE_SOON_DAYS;
use crate::error::TrackerError;
use crate::Result;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Fragments this short or shorter are never classified
pub const MIN_SENTENCE_CHARS: usize = 20;

/// Look-ahead window handed to the upcoming-deadline view
pub const UPCOMING_DAYS: i64 = 14;

pub const DEFAULT_SNAPSHOT_PATH: &str = "data/extracted_obligations.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub min_sentence_chars: usize,
    pub due_soon_days: i64,
    pub upcoming_days: i64,
    pub snapshot_path: PathBuf,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_sentence_chars: MIN_SENTENCE_CHARS,
            due_soon_days: DUE_SOON_DAYS,
            upcoming_days: UPCOMING_DAYS,
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
        }
    }
}

impl TrackerConfig {
    /// Load from `TRACKER_*` environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("TRACKER_MIN_SENTENCE_CHARS") {
            config.min_sentence_chars = parse_var("TRACKER_MIN_SENTENCE_CHARS", &value)?;
        }
        if let Some(value) = lookup("TRACKER_DUE_SOON_DAYS") {
            config.due_soon_days = parse_var("TRACKER_DUE_SOON_DAYS", &value)?;
        }
        if let Some(value) = lookup("TRACKER_UPCOMING_DAYS") {
            config.upcoming_days = parse_var("TRACKER_UPCOMING_DAYS", &value)?;
        }
        if let Some(value) = lookup("TRACKER_SNAPSHOT_PATH") {
            if !value.trim().is_empty() {
                config.snapshot_path = PathBuf::from(value.trim());
            }
        }

        if config.due_soon_days < 0 {
            return Err(TrackerError::Config(
                "TRACKER_DUE_SOON_DAYS must not be negative".to_string(),
            ));
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        TrackerError::Config(format!("{} has an invalid value: {:?}", key, value))
    })
}
