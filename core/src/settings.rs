//! Settings — runtime configuration loaded from `settings.yaml`.
//!
//! Every field has a default, so a missing file or a partial file is fine.
//! A file that exists but does not parse is an error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::agent::Position;
use crate::error::SettingsError;


pub const SETTINGS_FILE: &str = "settings.yaml";


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Milliseconds between scheduler ticks.
    pub tick_interval_ms: u64,
    /// Tracing filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Where tracing output goes in TUI mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Log lines kept by the terminal view.
    pub max_log_lines: usize,
    pub agent: AgentSettings,
}


/// Parameters of the simulated agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentSettings {
    pub username: String,
    pub spawn: Position,
    /// Blocks travelled per tick.
    pub speed: f64,
    pub min_y: i64,
    pub max_y: i64,
    /// Goals farther than this make path computation time out.
    pub max_path_distance: f64,
}


impl Default for Settings {
    fn default() -> Self {
        Settings {
            tick_interval_ms: 50,
            log_filter: "info".into(),
            log_file: None,
            max_log_lines: 1000,
            agent: AgentSettings::default(),
        }
    }
}


impl Default for AgentSettings {
    fn default() -> Self {
        AgentSettings {
            username: "kidra".into(),
            spawn: Position::new(0.5, 64.0, 0.5),
            speed: 0.2,
            min_y: -64,
            max_y: 320,
            max_path_distance: 2000.0,
        }
    }
}


impl Settings {
    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.tick_interval_ms == 0 {
            return Err(invalid("tick_interval_ms", "must be positive"));
        }
        if self.max_log_lines == 0 {
            return Err(invalid("max_log_lines", "must be positive"));
        }
        if !(self.agent.speed > 0.0) {
            return Err(invalid("agent.speed", "must be positive"));
        }
        if self.agent.min_y > self.agent.max_y {
            return Err(invalid("agent.min_y", "must not exceed agent.max_y"));
        }
        Ok(())
    }
}


fn invalid(field: &'static str, reason: &str) -> SettingsError {
    SettingsError::Invalid {
        field,
        reason: reason.to_string(),
    }
}


/// Parse and validate settings from YAML text.
pub fn parse(content: &str) -> Result<Settings, SettingsError> {
    // An empty document deserializes as null, not as an empty mapping.
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }
    let settings: Settings = serde_yaml::from_str(content)?;
    settings.validate()?;
    Ok(settings)
}


/// Load settings from `path`. A missing file yields the defaults.
pub fn load(path: &Path) -> Result<Settings, SettingsError> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            Ok(Settings::default())
        }
        Err(source) => Err(SettingsError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}


pub fn to_yaml(settings: &Settings) -> Result<String, SettingsError> {
    Ok(serde_yaml::to_string(settings)?)
}


/// Resolve the configuration directory from `KIDRA_CONFIG_DIR`, falling
/// back to `~/.config/kidra-terminal`.
pub fn config_dir() -> PathBuf {
    config_dir_from(
        std::env::var("KIDRA_CONFIG_DIR").ok(),
        std::env::var("HOME").ok(),
    )
}


fn config_dir_from(env_dir: Option<String>, home: Option<String>) -> PathBuf {
    if let Some(dir) = env_dir.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    let home = home.unwrap_or_else(|| "/tmp".into());
    PathBuf::from(home).join(".config").join("kidra-terminal")
}


/// The settings file to use: an explicit path wins over the config dir.
pub fn settings_path(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => config_dir().join(SETTINGS_FILE),
    }
}
