//! Game configuration and its on-disk JSON file.

use super::constants::*;
use crate::game::types::TapPolicy;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Tunables for one session. Missing fields in a config file take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Time from spawn to fall resolution
    pub fall_period_ms: u64,

    /// Time between spawns
    pub spawn_period_ms: u64,

    /// Element diameter in world units
    pub element_size: f64,

    /// Misses that end the game
    pub max_missed: u32,

    /// Tapped elements reaching the bottom that end the game
    pub max_touched_bottom: u32,

    pub tap_policy: TapPolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fall_period_ms: FALL_PERIOD_MS,
            spawn_period_ms: SPAWN_PERIOD_MS,
            element_size: ELEMENT_SIZE,
            max_missed: MAX_MISSED,
            max_touched_bottom: MAX_TOUCHED_BOTTOM,
            tap_policy: TapPolicy::Pop,
        }
    }
}

impl GameConfig {
    /// Replace values the game loop cannot run with by their defaults.
    /// Returns the names of the fields that were reset.
    pub fn validate(&mut self) -> Vec<&'static str> {
        let defaults = Self::default();
        let mut fixed = Vec::new();

        if self.fall_period_ms == 0 || self.fall_period_ms > MAX_PERIOD_MS {
            self.fall_period_ms = defaults.fall_period_ms;
            fixed.push("fall_period_ms");
        }
        if self.spawn_period_ms == 0 || self.spawn_period_ms > MAX_PERIOD_MS {
            self.spawn_period_ms = defaults.spawn_period_ms;
            fixed.push("spawn_period_ms");
        }
        if !self.element_size.is_finite() || self.element_size <= 0.0 {
            self.element_size = defaults.element_size;
            fixed.push("element_size");
        }
        if self.max_missed == 0 {
            self.max_missed = defaults.max_missed;
            fixed.push("max_missed");
        }
        if self.max_touched_bottom == 0 {
            self.max_touched_bottom = defaults.max_touched_bottom;
            fixed.push("max_touched_bottom");
        }

        fixed
    }
}

/// Loads and saves [`GameConfig`] as JSON.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Uses `config.json` in the platform config directory.
    pub fn new() -> io::Result<Self> {
        let project_dirs = ProjectDirs::from("", "", APP_NAME).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            )
        })?;

        Ok(Self {
            config_path: project_dirs.config_dir().join(CONFIG_FILE_NAME),
        })
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load the config, falling back to defaults when no file exists.
    pub fn load(&self) -> io::Result<GameConfig> {
        let text = match fs::read_to_string(&self.config_path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(GameConfig::default()),
            Err(e) => return Err(e),
        };

        let mut config: GameConfig = serde_json::from_str(&text)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let fixed = config.validate();
        if !fixed.is_empty() {
            tracing::warn!(fields = ?fixed, "config values out of range, using defaults");
        }
        Ok(config)
    }

    pub fn save(&self, config: &GameConfig) -> io::Result<()> {
        if let Some(dir) = self.config_path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.config_path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("olympus-test-{}-{}", name, std::process::id()))
            .join(CONFIG_FILE_NAME)
    }

    #[test]
    fn test_defaults_match_constants() {
        let config = GameConfig::default();
        assert_eq!(config.fall_period_ms, 2000);
        assert_eq!(config.spawn_period_ms, 2000);
        assert!((config.element_size - 50.0).abs() < f64::EPSILON);
        assert_eq!(config.max_missed, 3);
        assert_eq!(config.max_touched_bottom, 3);
        assert_eq!(config.tap_policy, TapPolicy::Pop);
    }

    #[test]
    fn test_validate_fixes_bad_values() {
        let mut config = GameConfig {
            fall_period_ms: 0,
            element_size: -3.0,
            max_missed: 0,
            ..GameConfig::default()
        };
        let fixed = config.validate();
        assert_eq!(fixed, vec!["fall_period_ms", "element_size", "max_missed"]);
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_validate_caps_huge_periods() {
        let json = r#"{"fall_period_ms": 18446744073709551615, "spawn_period_ms": 3600001}"#;
        let mut config: GameConfig = serde_json::from_str(json).unwrap();
        let fixed = config.validate();
        assert_eq!(fixed, vec!["fall_period_ms", "spawn_period_ms"]);
        assert_eq!(config.fall_period_ms, FALL_PERIOD_MS);
        assert_eq!(config.spawn_period_ms, SPAWN_PERIOD_MS);

        let mut longest = GameConfig {
            fall_period_ms: MAX_PERIOD_MS,
            ..GameConfig::default()
        };
        assert!(longest.validate().is_empty());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        let mut config = GameConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{"max_missed": 5, "tap_policy": "count_at_boundary"}"#)
                .unwrap();
        assert_eq!(config.max_missed, 5);
        assert_eq!(config.tap_policy, TapPolicy::CountAtBoundary);
        assert_eq!(config.fall_period_ms, 2000);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let manager = ConfigManager::with_path(temp_config_path("missing"));
        let config = manager.load().expect("missing file should not fail");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_config_path("roundtrip");
        let manager = ConfigManager::with_path(&path);
        let config = GameConfig {
            fall_period_ms: 1500,
            tap_policy: TapPolicy::CountAtBoundary,
            ..GameConfig::default()
        };

        manager.save(&config).expect("save failed");
        let loaded = manager.load().expect("load failed");
        assert_eq!(loaded, config);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_invalid_json_is_invalid_data() {
        let path = temp_config_path("invalid");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let err = ConfigManager::with_path(&path).load().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
