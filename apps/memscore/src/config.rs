//! # Configuration
//!
//! Optional TOML settings for the CLI.
//!
//! ```toml
//! [decay]
//! rate = 0.05
//! horizon = [0, 4, 8, 12, 16]
//! rounding = "nearest"   # or "up"
//! model = "geometric"    # or "stepped"
//!
//! [compare]
//! benchmark = 60
//! ```
//!
//! `memscore.toml` in the working directory is read when present. A file
//! named with `--config` must exist. Command-line flags override both.

use crate::cli::{MAX_CONFIG_FILE_SIZE, read_text_file};
use crate::error::CliError;
use memscore_core::{DEFAULT_DECAY_RATE, DEFAULT_HORIZON, ProjectionRounding};
use serde::Deserialize;
use std::path::Path;

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "memscore.toml";

/// Decay model selected in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayModelKind {
    #[default]
    Geometric,
    Stepped,
}

/// `[decay]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecayConfig {
    pub rate: f64,
    pub horizon: Vec<i64>,
    pub rounding: ProjectionRounding,
    pub model: DecayModelKind,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            rate: DEFAULT_DECAY_RATE,
            horizon: DEFAULT_HORIZON.iter().map(|&o| i64::from(o)).collect(),
            rounding: ProjectionRounding::Nearest,
            model: DecayModelKind::Geometric,
        }
    }
}

/// `[compare]` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareConfig {
    /// Flat benchmark used when no competitor file is given.
    pub benchmark: Option<i64>,
}

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub decay: DecayConfig,
    pub compare: CompareConfig,
}

impl Config {
    /// Parse a config from TOML text. `origin` names the source in errors.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, CliError> {
        toml::from_str(text).map_err(|e| CliError::Toml {
            path: origin.to_string(),
            reason: e.to_string(),
        })
    }

    /// Load the configuration.
    ///
    /// With an explicit path the file must exist. Without one the default
    /// file is read if present, otherwise defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CliError> {
        let path = match explicit {
            Some(path) => path,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = read_text_file(path, MAX_CONFIG_FILE_SIZE)?;
        let config = Self::from_toml_str(&text, &path.display().to_string())?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml_str("", "inline").expect("config");
        assert_eq!(config, Config::default());
        assert_eq!(config.decay.horizon, vec![0, 4, 8, 12, 16]);
        assert_eq!(config.compare.benchmark, None);
    }

    #[test]
    fn sections_override_defaults() {
        let text = r#"
            [decay]
            rate = 0.1
            rounding = "up"
            model = "stepped"

            [compare]
            benchmark = 60
        "#;
        let config = Config::from_toml_str(text, "inline").expect("config");
        assert_eq!(config.decay.rate, 0.1);
        assert_eq!(config.decay.rounding, ProjectionRounding::Up);
        assert_eq!(config.decay.model, DecayModelKind::Stepped);
        assert_eq!(config.decay.horizon, vec![0, 4, 8, 12, 16]);
        assert_eq!(config.compare.benchmark, Some(60));
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = Config::from_toml_str("[decay]\nspeed = 2\n", "inline").expect_err("unknown");
        assert!(matches!(err, CliError::Toml { .. }));
    }

    #[test]
    fn missing_explicit_file_rejected() {
        let err = Config::load(Some(Path::new("/nonexistent/memscore.toml")))
            .expect_err("missing");
        assert!(matches!(err, CliError::Io(_)));
    }
}
