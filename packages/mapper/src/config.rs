//! Mapper configuration.
//!
//! Everything the batch pass needs to know about its environment is held
//! in [`MapperConfig`] and handed to [`crate::IncidentMapper::new`]. A
//! config file only needs the keys it wants to change:
//!
//! ```toml
//! jurisdiction = "Garland TX"
//! output_dir = "dist"
//! template = "assets/map.html"
//! ```

use std::path::{Path, PathBuf};

use incident_map_incident_models::CONFIDENTIAL_SENTINEL;
use serde::Deserialize;

/// Errors loading a mapper config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for [`MapperConfig`].
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Configuration for one mapping run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// City and state appended to every partial address before geocoding.
    pub jurisdiction: String,
    /// Directory receiving `confidential.json`, `features.geojson` and
    /// `index.html`.
    pub output_dir: PathBuf,
    /// `location` value marking a withheld address.
    pub confidential_sentinel: String,
    /// Map page copied verbatim into the output directory, if any.
    pub template: Option<PathBuf>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            jurisdiction: "Garland TX".to_string(),
            output_dir: PathBuf::from("dist"),
            confidential_sentinel: CONFIDENTIAL_SENTINEL.to_string(),
            template: None,
        }
    }
}

impl MapperConfig {
    /// Parses a config from TOML text, defaulting missing keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] on invalid TOML or mistyped keys.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Loads a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
