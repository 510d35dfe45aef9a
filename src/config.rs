//! Autofire configuration loaded from TOML
//!
//! ```toml
//! tick_interval_ms = 10
//! default_autofire_interval_ms = 16
//!
//! [buttons]
//! A = "default"
//! ZR = 50
//! B = "off"
//! ```

use crate::autofire::{AutoFireError, AutoFirer, AutoFirerSettings};
use crate::controller::Action;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const CONFIG_DIR_NAME: &str = "nsc-autofire";
const CONFIG_FILE_NAME: &str = "autofire.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Autofire interval of a single button
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum ButtonInterval {
    /// Explicit interval in milliseconds, 0 turns autofire off
    Millis(i64),
    Keyword(IntervalKeyword),
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IntervalKeyword {
    /// Use `default_autofire_interval_ms`
    Default,
    Off,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct AutofireConfig {
    /// Sampling period of the ticker loop
    pub tick_interval_ms: u64,

    /// Interval used for buttons configured as `"default"`
    pub default_autofire_interval_ms: u64,

    /// Per-button autofire intervals, buttons not listed fire directly
    pub buttons: BTreeMap<Action, ButtonInterval>,
}

impl Default for AutofireConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 10,
            default_autofire_interval_ms: 16,
            buttons: BTreeMap::new(),
        }
    }
}

impl AutofireConfig {
    /// `<config dir>/nsc-autofire/autofire.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads an explicitly given file, or the default file if it exists
    ///
    /// A missing default file is not an error and yields the defaults, a missing
    /// explicit file is.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        info!("Loaded autofire config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_ms must be > 0".to_string(),
            ));
        }

        for (action, interval) in &self.buttons {
            if !action.is_button() {
                return Err(ConfigError::Invalid(format!("{} is not a button", action)));
            }
            if let ButtonInterval::Millis(ms) = interval {
                if *ms < 0 {
                    return Err(ConfigError::Invalid(format!(
                        "interval of {} must be >= 0 but was: {}",
                        action, ms
                    )));
                }
            }
        }
        Ok(())
    }

    /// Enables autofire with the default interval for `action`
    pub fn enable_default(&mut self, action: Action) {
        self.buttons
            .insert(action, ButtonInterval::Keyword(IntervalKeyword::Default));
    }

    /// Interval in milliseconds the button ends up with
    pub fn resolve(&self, interval: ButtonInterval) -> i64 {
        match interval {
            ButtonInterval::Millis(ms) => ms,
            ButtonInterval::Keyword(IntervalKeyword::Default) => {
                i64::try_from(self.default_autofire_interval_ms).unwrap_or(i64::MAX)
            }
            ButtonInterval::Keyword(IntervalKeyword::Off) => 0,
        }
    }

    pub fn auto_firer_settings(&self) -> AutoFirerSettings {
        AutoFirerSettings {
            tick_interval_ms: self.tick_interval_ms,
        }
    }

    /// Pushes every configured button interval into the stage
    pub fn apply(&self, auto_firer: &AutoFirer) -> Result<(), AutoFireError> {
        for (action, interval) in &self.buttons {
            let interval_ms = self.resolve(*interval);
            info!("Autofire for {}: {}ms", action, interval_ms);
            auto_firer.set_fire_interval_ms(*action, interval_ms)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AutofireConfig::from_toml("").unwrap();
        assert_eq!(config, AutofireConfig::default());
        assert_eq!(config.tick_interval_ms, 10);
        assert_eq!(config.default_autofire_interval_ms, 16);
    }

    #[test]
    fn parses_button_intervals() {
        let config = AutofireConfig::from_toml(
            r#"
            tick_interval_ms = 5
            default_autofire_interval_ms = 20

            [buttons]
            A = "default"
            zr = 50
            B = "off"
            "#,
        )
        .unwrap();

        assert_eq!(config.tick_interval_ms, 5);
        assert_eq!(config.resolve(config.buttons[&Action::A]), 20);
        assert_eq!(config.resolve(config.buttons[&Action::ZR]), 50);
        assert_eq!(config.resolve(config.buttons[&Action::B]), 0);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            AutofireConfig::from_toml("tick_interval_ms = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AutofireConfig::from_toml("[buttons]\nA = -5"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AutofireConfig::from_toml("[buttons]\nLeftStickX = 16"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AutofireConfig::from_toml("[buttons]\nTurbo = 16"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn loads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tick_interval_ms = 8\n[buttons]\nX = 30").unwrap();

        let config = AutofireConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.tick_interval_ms, 8);
        assert_eq!(config.buttons[&Action::X], ButtonInterval::Millis(30));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AutofireConfig::load(Some(&dir.path().join("missing.toml")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn apply_configures_stage() {
        let mut config = AutofireConfig::default();
        config.enable_default(Action::A);
        config.buttons.insert(Action::ZL, ButtonInterval::Millis(40));

        let auto_firer = AutoFirer::new(|_: &crate::controller::Event| {}, None);
        config.apply(&auto_firer).unwrap();

        assert_eq!(auto_firer.fire_interval(Action::A), Some(Duration::from_millis(16)));
        assert_eq!(auto_firer.fire_interval(Action::ZL), Some(Duration::from_millis(40)));
        assert_eq!(auto_firer.fire_interval(Action::B), Some(Duration::ZERO));
    }
}
