//! Configuration file handling

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Which brightness backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// The kernel backlight class, written through logind.
    Backlight,
    /// The desktop's power management service on the session bus.
    PowerDaemon,
}

/// Settings for the backlight backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BacklightConfig {
    /// Device name under /sys/class/backlight.
    pub device: String,
    /// How often to check for brightness changes made outside the menu.
    pub poll_interval_seconds: u64,
}

impl Default for BacklightConfig {
    fn default() -> BacklightConfig {
        BacklightConfig {
            device: "intel_backlight".to_string(),
            poll_interval_seconds: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    pub backlight: BacklightConfig,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            backend: Backend::Backlight,
            backlight: BacklightConfig::default(),
        }
    }
}

impl Config {
    /// Parses the file at `path`; no path means built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => {
                let contents = fs::read_to_string(path).with_context(|| {
                    format!("couldn't read configuration from {}", path.display())
                })?;
                toml::from_str(&contents).with_context(|| {
                    format!("{} is not a valid configuration file", path.display())
                })
            }
            None => Ok(Config::default()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::load(None).expect("defaults failed to load");
        assert_eq!(config.backend, Backend::Backlight);
        assert_eq!(config.backlight.device, "intel_backlight");
        assert_eq!(config.backlight.poll_interval_seconds, 2);
    }

    #[test]
    fn test_full_file() {
        let config: Config = toml::from_str(
            r#"
            backend = "power-daemon"

            [backlight]
            device = "amdgpu_bl0"
            poll_interval_seconds = 5
            "#,
        )
        .expect("valid config failed to parse");
        assert_eq!(config.backend, Backend::PowerDaemon);
        assert_eq!(config.backlight.device, "amdgpu_bl0");
        assert_eq!(config.backlight.poll_interval_seconds, 5);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str("backend = \"backlight\"")
            .expect("partial config failed to parse");
        assert_eq!(config.backlight, BacklightConfig::default());
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        toml::from_str::<Config>("backend = \"gconf\"")
            .expect_err("unknown backend was accepted");
    }
}
