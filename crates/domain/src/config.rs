//! Configuration structures
//!
//! Plain serde structs; loading (env / file probing) lives in
//! `cadence-infra::config`.

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ALTERNATIVE_OFFSETS_MINUTES, DEFAULT_BUSINESS_CLOSE, DEFAULT_BUSINESS_OPEN,
    DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_DB_PATH, DEFAULT_HORIZON_MONTHS, DEFAULT_MAX_ALTERNATIVES,
    DEFAULT_MAX_HORIZON_MONTHS, DEFAULT_MAX_OCCURRENCES, DEFAULT_POOL_SIZE, DEFAULT_TIMEZONE,
};
use crate::types::BusinessSettings;
use crate::{CadenceError, Result};

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub scheduling: SchedulingConfig,
    pub business: BusinessConfig,
    pub logging: LoggingConfig,
}

/// SQLite storage settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_DB_PATH.to_string(),
            pool_size: DEFAULT_POOL_SIZE,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// Recurrence generation and slot search bounds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Look-ahead for series that never end.
    pub default_horizon_months: u32,
    /// Safety look-ahead for count- and date-bounded series.
    pub max_horizon_months: u32,
    /// Hard cap on dates produced by a single generation run.
    pub max_occurrences: usize,
    /// Offset ladder probed (in order) when looking for alternatives.
    pub alternative_offsets_minutes: Vec<i64>,
    pub max_alternatives: usize,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            default_horizon_months: DEFAULT_HORIZON_MONTHS,
            max_horizon_months: DEFAULT_MAX_HORIZON_MONTHS,
            max_occurrences: DEFAULT_MAX_OCCURRENCES,
            alternative_offsets_minutes: DEFAULT_ALTERNATIVE_OFFSETS_MINUTES.to_vec(),
            max_alternatives: DEFAULT_MAX_ALTERNATIVES,
        }
    }
}

/// Business hours and timezone, as written in the config file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BusinessConfig {
    pub timezone: String,
    pub open: String,
    pub close: String,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            open: DEFAULT_BUSINESS_OPEN.to_string(),
            close: DEFAULT_BUSINESS_CLOSE.to_string(),
        }
    }
}

impl BusinessConfig {
    /// Parse into typed settings.
    pub fn to_settings(&self) -> Result<BusinessSettings> {
        let timezone: Tz = self
            .timezone
            .parse()
            .map_err(|_| CadenceError::Config(format!("unknown timezone: {}", self.timezone)))?;
        let open = parse_clock_time(&self.open)?;
        let close = parse_clock_time(&self.close)?;
        BusinessSettings::new(timezone, open, close)
    }
}

/// Logging output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

impl Config {
    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size == 0 {
            return Err(CadenceError::Config("database.pool_size must be at least 1".into()));
        }
        if self.scheduling.max_occurrences == 0 {
            return Err(CadenceError::Config(
                "scheduling.max_occurrences must be at least 1".into(),
            ));
        }
        if self.scheduling.default_horizon_months == 0 || self.scheduling.max_horizon_months == 0 {
            return Err(CadenceError::Config("scheduling horizons must be positive".into()));
        }
        if self.scheduling.alternative_offsets_minutes.is_empty() {
            return Err(CadenceError::Config(
                "scheduling.alternative_offsets_minutes must not be empty".into(),
            ));
        }
        self.business.to_settings()?;
        Ok(())
    }
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_clock_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| CadenceError::Validation(format!("invalid time of day: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn rejects_inverted_business_hours() {
        let mut config = Config::default();
        config.business.open = "19:00".into();
        assert!(matches!(config.validate(), Err(CadenceError::Validation(_))));
    }

    #[test]
    fn rejects_unknown_timezone() {
        let mut config = Config::default();
        config.business.timezone = "Mars/Olympus".into();
        assert!(matches!(config.validate(), Err(CadenceError::Config(_))));
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: Config = serde_json::from_str(r#"{"business": {"timezone": "Europe/Paris"}}"#)
            .unwrap();
        assert_eq!(config.business.timezone, "Europe/Paris");
        assert_eq!(config.business.open, DEFAULT_BUSINESS_OPEN);
        assert_eq!(config.database.pool_size, DEFAULT_POOL_SIZE);
    }

    #[test]
    fn parses_both_clock_formats() {
        assert_eq!(parse_clock_time("10:30").unwrap(), NaiveTime::from_hms_opt(10, 30, 0).unwrap());
        assert_eq!(
            parse_clock_time("10:30:15").unwrap(),
            NaiveTime::from_hms_opt(10, 30, 15).unwrap()
        );
        assert!(parse_clock_time("25:00").is_err());
    }
}
