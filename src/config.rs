use crate::domain::DatePreset;
use chrono::{FixedOffset, Offset, Utc};
use std::collections::HashMap;
use thiserror::Error;

/// Process-wide settings. Handed to request handlers through `AppState`;
/// the calculators never read it.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    /// Date range applied when a request names neither a preset nor bounds.
    pub default_preset: DatePreset,
    /// Offset from UTC used for day/hour buckets and preset boundaries.
    pub tz_offset_minutes: i32,
    pub max_import_rows: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Offsets beyond ±18h are rejected by chrono.
const MAX_OFFSET_MINUTES: i32 = 18 * 60;

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let default_preset = env_map
            .get("DEFAULT_DATE_PRESET")
            .map(|s| s.as_str())
            .unwrap_or("last30days")
            .parse::<DatePreset>()
            .map_err(|e| ConfigError::InvalidValue("DEFAULT_DATE_PRESET".to_string(), e.to_string()))?;

        let tz_offset_minutes = env_map
            .get("TZ_OFFSET_MINUTES")
            .map(|s| s.as_str())
            .unwrap_or("0")
            .parse::<i32>()
            .ok()
            .filter(|m| m.abs() <= MAX_OFFSET_MINUTES)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "TZ_OFFSET_MINUTES".to_string(),
                    format!("must be an integer between -{0} and {0}", MAX_OFFSET_MINUTES),
                )
            })?;

        let max_import_rows = env_map
            .get("MAX_IMPORT_ROWS")
            .map(|s| s.as_str())
            .unwrap_or("50000")
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "MAX_IMPORT_ROWS".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?;

        Ok(Config {
            port,
            database_path,
            default_preset,
            tz_offset_minutes,
            max_import_rows,
        })
    }

    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.tz_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }
}
