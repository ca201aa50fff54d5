//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Timer behavior (tick length, low-time warning threshold, default preset)
//! - Sound cues
//! - Defaults for the custom workout form
//!
//! Configuration is stored at `~/.config/work365/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::workout::{CustomProgram, DEFAULT_WARNING_THRESHOLD_SECS};

const MAX_TICK_INTERVAL_MS: u64 = 60_000;

/// Timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Length of one engine second, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_warning_threshold_secs")]
    pub warning_threshold_secs: u32,
    /// Preset loaded by `timer start` when nothing is selected.
    #[serde(default = "default_preset")]
    pub default_preset: String,
}

/// Sound cue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_warning_pitch_hz")]
    pub warning_pitch_hz: u32,
    #[serde(default = "default_tick_pitch_hz")]
    pub tick_pitch_hz: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/work365/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub sound: SoundConfig,
    #[serde(default)]
    pub custom: CustomProgram,
}

fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_warning_threshold_secs() -> u32 {
    DEFAULT_WARNING_THRESHOLD_SECS
}
fn default_preset() -> String {
    "Classic HIIT".into()
}
fn default_true() -> bool {
    true
}
fn default_warning_pitch_hz() -> u32 {
    880
}
fn default_tick_pitch_hz() -> u32 {
    440
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            warning_threshold_secs: default_warning_threshold_secs(),
            default_preset: default_preset(),
        }
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            warning_pitch_hz: default_warning_pitch_hz(),
            tick_pitch_hz: default_tick_pitch_hz(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => value
                    .parse::<bool>()
                    .map(serde_json::Value::Bool)
                    .map_err(|e| invalid(e.to_string()))?,
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the defaults
    /// cannot be written.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
                .into()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse
    /// as the key's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        Ok(())
    }

    /// Engine second length, clamped to 1 ms ..= 1 minute.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(
            self.timer
                .tick_interval_ms
                .clamp(1, MAX_TICK_INTERVAL_MS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timer.tick_interval_ms, 1000);
        assert_eq!(parsed.sound.warning_pitch_hz, 880);
        assert_eq!(parsed.custom.rounds, 4);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[sound]\nenabled = false\n").unwrap();
        assert!(!parsed.sound.enabled);
        assert_eq!(parsed.sound.tick_pitch_hz, 440);
        assert_eq!(parsed.timer.warning_threshold_secs, 3);
        assert_eq!(parsed.timer.default_preset, "Classic HIIT");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("sound.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("timer.warning_threshold_secs").as_deref(), Some("3"));
        assert_eq!(cfg.get("custom.name").as_deref(), Some("Custom Workout"));
        assert!(cfg.get("sound.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.set("sound.enabled", "false").unwrap();
        cfg.set("timer.tick_interval_ms", "250").unwrap();
        cfg.set("timer.default_preset", "Tabata").unwrap();
        assert!(!cfg.sound.enabled);
        assert_eq!(cfg.tick_interval(), Duration::from_millis(250));
        assert_eq!(cfg.timer.default_preset, "Tabata");
    }

    #[test]
    fn tick_interval_is_clamped() {
        let mut cfg = Config::default();
        cfg.set("timer.tick_interval_ms", "0").unwrap();
        assert_eq!(cfg.tick_interval(), Duration::from_millis(1));
        cfg.set("timer.tick_interval_ms", &u64::MAX.to_string()).unwrap();
        assert_eq!(cfg.tick_interval(), Duration::from_secs(60));
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set("sound.volume", "3").unwrap_err();
        assert!(matches!(
            err,
            crate::error::CoreError::Config(ConfigError::UnknownKey(_))
        ));
        assert!(cfg.set("", "3").is_err());
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("sound.enabled", "loud").is_err());
        assert!(cfg.set("custom.rounds", "-1").is_err());
        assert!(cfg.sound.enabled);
        assert_eq!(cfg.custom.rounds, 4);
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.timer.tick_interval_ms, 1000);

        let mut cfg = cfg;
        cfg.set("custom.high", "50").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().custom.high, 50);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timer = 3").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
