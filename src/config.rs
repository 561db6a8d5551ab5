//! # Configuration
//!
//! Application settings are read from an optional JSON file. Every field has
//! a default, so a partial file (or none at all) is fine:
//!
//! ```json
//! {
//!   "simulation": { "warn_unpowered_ics": false },
//!   "console": { "refresh_rate_ms": 50 },
//!   "store_dir": "circuits"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Engine behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Read an OUTPUT marker as a High source during propagation, as the
    /// legacy resolution helper did
    pub output_marker_drives_high: bool,
    /// Log a warning on run for ICs whose Vcc or Gnd pin strip has no rail
    pub warn_unpowered_ics: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            output_marker_drives_high: false,
            warn_unpowered_ics: true,
        }
    }
}

/// Console configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub refresh_rate_ms: u64,
    /// Show propagated values on empty wired pins
    pub show_signals: bool,
    pub show_summary: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: 100,
            show_signals: true,
            show_summary: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub console: ConsoleConfig,
    pub store_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            console: ConsoleConfig::default(),
            store_dir: PathBuf::from("circuits"),
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(!config.simulation.output_marker_drives_high);
        assert!(config.simulation.warn_unpowered_ics);
        assert_eq!(config.console.refresh_rate_ms, 100);
        assert_eq!(config.store_dir, PathBuf::from("circuits"));
    }

    #[test]
    fn test_partial_json() {
        let config =
            AppConfig::from_json(r#"{"simulation": {"output_marker_drives_high": true}}"#).unwrap();
        assert!(config.simulation.output_marker_drives_high);
        assert!(config.simulation.warn_unpowered_ics);
        assert_eq!(config.console, ConsoleConfig::default());

        assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::load("definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("definitely/not/here.json"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(AppConfig::from_json("{\"console\": 3}").is_err());
    }
}
