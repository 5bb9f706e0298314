//! Geocoding service configuration.
//!
//! The Nominatim endpoint is defined in `services/nominatim.toml` and
//! embedded at compile time. [`NominatimService::from_toml_file`] loads an
//! alternative definition (e.g., a self-hosted instance) at runtime.

use std::path::Path;

use serde::Deserialize;

/// Errors loading a service definition.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a valid service definition.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A Nominatim-compatible search service.
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimService {
    /// Unique identifier (e.g., `"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Search endpoint (e.g., `"https://nominatim.openstreetmap.org/search"`).
    pub base_url: String,
    /// Client identifier sent as the `User-Agent` header on every request.
    pub user_agent: String,
    /// Per-request timeout. A timed-out lookup counts as no match.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    30
}

const NOMINATIM_TOML: &str = include_str!("../services/nominatim.toml");

impl NominatimService {
    /// Parses a service definition from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the text is not a valid definition.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Loads a service definition from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Overrides the endpoint and/or user agent, keeping other settings.
    #[must_use]
    pub fn with_overrides(mut self, base_url: Option<String>, user_agent: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if let Some(agent) = user_agent {
            self.user_agent = agent;
        }
        self
    }
}

/// Returns the embedded public Nominatim service definition.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (this is a compile-time
/// guarantee since the config is embedded and covered by tests).
#[must_use]
pub fn nominatim_service() -> NominatimService {
    NominatimService::from_toml_str(NOMINATIM_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded nominatim service: {e}"))
}
