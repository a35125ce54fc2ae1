use colorthresh_engine::RangeMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    pub system: SystemConfig,
    pub camera: CameraConfig,
    pub display: DisplayConfig,
    pub threshold: ThresholdSettings,
    pub web: WebConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SystemConfig {
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CameraConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DisplayConfig {
    pub enabled: bool,
    // Amount a single key press moves a bound.
    pub key_step: u8,
    pub target_fps: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ThresholdSettings {
    pub range_mode: RangeMode,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WebConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Config {
    // Load config from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    // Load default config
    pub fn load_default() -> anyhow::Result<Self> {
        Self::from_file(DEFAULT_CONFIG_PATH)
    }

    // Loads `path` if given, else the default file; falls back to in-memory defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let loaded = match path {
            Some(path) => Self::from_file(path),
            None => Self::load_default(),
        };
        loaded.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Using default configuration");
            Config::default()
        })
    }
}

impl Default for Config {
    // Default config in memory if file doesn't exist
    fn default() -> Self {
        Config {
            system: SystemConfig {
                log_level: "info".to_string(),
            },
            camera: CameraConfig {
                width: 640,
                height: 480,
                fps: 30,
            },
            display: DisplayConfig {
                enabled: true,
                key_step: 1,
                target_fps: 60,
            },
            threshold: ThresholdSettings {
                range_mode: RangeMode::Exclusive,
            },
            web: WebConfig {
                enabled: false,
                port: 5800,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let text = toml::to_string(&Config::default()).unwrap();
        let parsed = Config::from_toml(&text).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn parses_inclusive_range_mode() {
        let mut text = toml::to_string(&Config::default()).unwrap();
        text = text.replace("range_mode = \"exclusive\"", "range_mode = \"inclusive\"");
        let parsed = Config::from_toml(&text).unwrap();
        assert_eq!(parsed.threshold.range_mode, RangeMode::Inclusive);
    }

    #[test]
    fn rejects_unknown_range_mode() {
        let text = toml::to_string(&Config::default())
            .unwrap()
            .replace("range_mode = \"exclusive\"", "range_mode = \"fuzzy\"");
        assert!(Config::from_toml(&text).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load_or_default(Some(Path::new("does/not/exist.toml")));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn shipped_config_parses() {
        let shipped = include_str!("../../../config/default.toml");
        let parsed = Config::from_toml(shipped).unwrap();
        assert_eq!(parsed.web.port, 5800);
    }
}
