use crate::core::error::{RepoError, Result};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_COMPRESSION: u32 = 6;

const KNOWN_KEYS: [&str; 3] = ["log.level", "core.compression", "audit.enabled"];
const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Flat `key = value` settings, global (`~/.twigconfig`) and per repository
/// (`.twig/config.json`).
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct Config {
    settings: BTreeMap<String, String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global_path() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".twigconfig"))
    }

    pub fn load_global() -> Self {
        match Self::global_path() {
            Some(path) => Self::load_from_file(&path),
            None => Self::default(),
        }
    }

    /// Global settings overridden by the ones in `repo_config`.
    pub fn load_layered(repo_config: &Path) -> Self {
        let mut config = Self::load_global();
        for (key, value) in Self::load_from_file(repo_config).settings {
            config.settings.insert(key, value);
        }
        config
    }

    /// Unreadable files are ignored rather than failing the command.
    pub fn load_from_file(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring malformed config");
                Self::default()
            }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.settings.get(key)
    }

    /// Sets a known key after validating its value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        self.settings.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.get("log.level").map(String::as_str)
    }

    pub fn compression_level(&self) -> u32 {
        self.get("core.compression")
            .and_then(|v| v.parse().ok())
            .filter(|level| *level <= 9)
            .unwrap_or(DEFAULT_COMPRESSION)
    }

    pub fn audit_enabled(&self) -> bool {
        self.get("audit.enabled")
            .map(|v| parse_bool(v).unwrap_or(true))
            .unwrap_or(true)
    }
}

pub fn validate_config_key(key: &str) -> Result<()> {
    if !KNOWN_KEYS.contains(&key) {
        return Err(RepoError::InvalidConfig(format!(
            "Invalid configuration key: {}",
            key
        )));
    }
    Ok(())
}

fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let valid = match key {
        "log.level" => LOG_LEVELS.contains(&value.to_lowercase().as_str()),
        "core.compression" => value.parse::<u32>().map(|l| l <= 9).unwrap_or(false),
        "audit.enabled" => parse_bool(value).is_some(),
        _ => false,
    };

    if !valid {
        return Err(RepoError::InvalidConfig(format!(
            "Invalid value for {}: {}",
            key, value
        )));
    }
    Ok(())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
