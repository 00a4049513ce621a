//! Configuration loader
//!
//! Environment variables win when `CADENCE_DB_PATH` is set; otherwise the
//! first config file found on the probe path is parsed.
//!
//! ## Environment Variables
//! - `CADENCE_DB_PATH`: Database file path (required for the env source)
//! - `CADENCE_DB_POOL_SIZE`: Connection pool size
//! - `CADENCE_TIMEZONE`: IANA timezone of the business
//! - `CADENCE_BUSINESS_OPEN` / `CADENCE_BUSINESS_CLOSE`: Opening hours (`HH:MM`)
//! - `CADENCE_LOG_LEVEL`: Tracing filter, e.g. `info` or `cadence_core=debug`
//! - `CADENCE_LOG_JSON`: Emit JSON log lines (true/false)
//! - `CADENCE_MAX_OCCURRENCES`: Cap on dates produced by one generation run
//!
//! Anything not set falls back to the defaults in `cadence_domain::config`.
//!
//! ## File Locations
//! `cadence.toml`, `cadence.json`, `config.toml`, `config.json`, looked up in
//! the working directory, its two parents, then next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use cadence_domain::{CadenceError, Config, Result};

const CONFIG_FILE_NAMES: [&str; 4] = ["cadence.toml", "cadence.json", "config.toml", "config.json"];

/// Load configuration from the environment, falling back to a file.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "environment incomplete, trying config file");
            load_from_file(None)
        }
    }
}

/// Load configuration from `CADENCE_*` environment variables.
///
/// # Errors
/// Returns `CadenceError::Config` when `CADENCE_DB_PATH` is missing or a
/// numeric variable does not parse.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();
    config.database.path = env_var("CADENCE_DB_PATH")?;

    if let Some(pool_size) = env_parse::<u32>("CADENCE_DB_POOL_SIZE")? {
        config.database.pool_size = pool_size;
    }
    if let Some(max) = env_parse::<usize>("CADENCE_MAX_OCCURRENCES")? {
        config.scheduling.max_occurrences = max;
    }
    if let Ok(timezone) = std::env::var("CADENCE_TIMEZONE") {
        config.business.timezone = timezone;
    }
    if let Ok(open) = std::env::var("CADENCE_BUSINESS_OPEN") {
        config.business.open = open;
    }
    if let Ok(close) = std::env::var("CADENCE_BUSINESS_CLOSE") {
        config.business.close = close;
    }
    if let Ok(level) = std::env::var("CADENCE_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("CADENCE_LOG_JSON", config.logging.json);

    Ok(config)
}

/// Load configuration from a file, probing the standard locations when
/// `path` is `None`.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CadenceError::Config(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CadenceError::Config("no config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CadenceError::Config(format!("failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse by file extension: `.toml` or `.json`.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CadenceError::Config(format!("invalid TOML: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CadenceError::Config(format!("invalid JSON: {e}"))),
        other => Err(CadenceError::Config(format!("unsupported config format: {other}"))),
    }
}

/// First existing config file on the probe path.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
        dirs.push(cwd.join("../.."));
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| CadenceError::Config(format!("missing required environment variable: {key}")))
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| CadenceError::Config(format!("invalid {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
