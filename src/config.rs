//! Runtime configuration loaded from TOML.
//!
//! Lookup order: the file named by `SHAPES_CONFIG`, then `shapes.toml` in the
//! working directory, then built-in defaults. Every section and field is
//! optional in the file.

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

pub const CONFIG_ENV_VAR: &str = "SHAPES_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "shapes.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Logical screen width. The game simulates in this coordinate space.
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub escape_closes: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::from("Shapes"),
            width: 1280,
            height: 960,
            vsync: true,
            escape_closes: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Fixed seed for reproducible runs. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Seconds of normal play between bosses.
    pub boss_interval: f32,
    /// Seconds between spawn attempts.
    pub spawn_interval: f32,
    /// Enemy power grows by `power_scale` every `power_time` seconds.
    pub power_scale: f32,
    pub power_time: f32,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            seed: None,
            boss_interval: 60.0,
            spawn_interval: 2.0,
            power_scale: 2.5,
            power_time: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// `false` keeps the game silent even when an output device exists.
    pub enabled: bool,
    /// Sound bank manifest: one `bank path` pair per line.
    pub manifest: Option<PathBuf>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            manifest: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub gameplay: GameplayConfig,
    pub audio: AudioConfig,
}

impl GameConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Resolve the config using the environment variable and default file name.
    pub fn load() -> Result<Self> {
        let override_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        Self::resolve(override_path.as_deref(), Path::new(DEFAULT_CONFIG_FILE))
    }

    /// An explicit path must exist. The default path is optional.
    pub fn resolve(override_path: Option<&Path>, default_path: &Path) -> Result<Self> {
        if let Some(path) = override_path {
            info!("Loading config from {} ({})", path.display(), CONFIG_ENV_VAR);
            return Self::from_file(path);
        }

        if default_path.exists() {
            info!("Loading config from {}", default_path.display());
            return Self::from_file(default_path);
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(GameError::Config {
                message: format!(
                    "window size must be non-zero, got {}x{}",
                    self.window.width, self.window.height
                ),
            });
        }

        let positive = [
            ("boss_interval", self.gameplay.boss_interval),
            ("spawn_interval", self.gameplay.spawn_interval),
            ("power_scale", self.gameplay.power_scale),
            ("power_time", self.gameplay.power_time),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(GameError::Config {
                    message: format!("gameplay.{name} must be positive, got {value}"),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let config = GameConfig::from_toml_str("").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 960);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            [window]
            title = "Shapes (debug)"

            [gameplay]
            seed = 7
            boss_interval = 30.0
            "#,
        )
        .unwrap();

        assert_eq!(config.window.title, "Shapes (debug)");
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.gameplay.seed, Some(7));
        assert_eq!(config.gameplay.boss_interval, 30.0);
        assert_eq!(config.gameplay.spawn_interval, 2.0);
        assert!(config.audio.manifest.is_none());
    }

    #[test]
    fn rejects_zero_window() {
        let err = GameConfig::from_toml_str("[window]\nwidth = 0\n").unwrap_err();
        assert!(matches!(err, GameError::Config { .. }));
    }

    #[test]
    fn rejects_negative_interval() {
        let err = GameConfig::from_toml_str("[gameplay]\nspawn_interval = -1.0\n").unwrap_err();
        assert!(err.to_string().contains("spawn_interval"));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = GameConfig::from_toml_str("[window\n").unwrap_err();
        assert!(matches!(err, GameError::ConfigParse(_)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shapes.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[audio]\nmanifest = \"sounds.txt\"").unwrap();

        let config = GameConfig::from_file(&path).unwrap();
        assert_eq!(config.audio.manifest, Some(PathBuf::from("sounds.txt")));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GameConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, GameError::Io { .. }));
    }

    #[test]
    fn override_path_wins_over_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let chosen = dir.path().join("custom.toml");
        let fallback = dir.path().join("shapes.toml");
        std::fs::write(&chosen, "[gameplay]\nseed = 1\n").unwrap();
        std::fs::write(&fallback, "[gameplay]\nseed = 2\n").unwrap();

        let config = GameConfig::resolve(Some(&chosen), &fallback).unwrap();
        assert_eq!(config.gameplay.seed, Some(1));
    }

    #[test]
    fn default_file_used_without_override() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("shapes.toml");
        std::fs::write(&fallback, "[window]\nvsync = false\n").unwrap();

        let config = GameConfig::resolve(None, &fallback).unwrap();
        assert!(!config.window.vsync);
    }

    #[test]
    fn nothing_on_disk_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GameConfig::resolve(None, &dir.path().join("shapes.toml")).unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn missing_override_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("shapes.toml");
        std::fs::write(&fallback, "").unwrap();

        let err = GameConfig::resolve(Some(&dir.path().join("gone.toml")), &fallback).unwrap_err();
        assert!(matches!(err, GameError::Io { .. }));
    }

    #[test]
    fn load_reads_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.toml");
        std::fs::write(&path, "[gameplay]\nboss_interval = 12.0\n[audio]\nenabled = false\n").unwrap();

        // The only test that touches the process environment.
        std::env::set_var(CONFIG_ENV_VAR, &path);
        let config = GameConfig::load();
        std::env::remove_var(CONFIG_ENV_VAR);

        let config = config.unwrap();
        assert_eq!(config.gameplay.boss_interval, 12.0);
        assert!(!config.audio.enabled);
    }
}
