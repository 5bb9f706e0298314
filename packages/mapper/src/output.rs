//! Output sinks for a mapping run.
//!
//! A run always writes `confidential.json` (withheld records, verbatim) and
//! `features.geojson` (a `FeatureCollection`), both pretty-printed with
//! two-space indentation, even when empty. An optional map page template is
//! copied alongside as `index.html`.

use std::path::{Path, PathBuf};

use incident_map_incident_models::IncidentRecord;

use crate::MapperOutput;
use crate::config::MapperConfig;

/// File name of the confidential records sink.
pub const CONFIDENTIAL_FILE: &str = "confidential.json";

/// File name of the feature collection sink.
pub const FEATURES_FILE: &str = "features.geojson";

/// File name the map template is copied to.
pub const INDEX_FILE: &str = "index.html";

/// Errors writing run outputs.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes the confidential records to `dir/confidential.json`.
///
/// # Errors
///
/// Returns [`OutputError`] if serialization or the write fails.
pub fn write_confidential(dir: &Path, records: &[IncidentRecord]) -> Result<PathBuf, OutputError> {
    let path = dir.join(CONFIDENTIAL_FILE);
    std::fs::write(&path, serde_json::to_string_pretty(records)?)?;
    Ok(path)
}

/// Writes the features to `dir/features.geojson` as a `FeatureCollection`.
///
/// # Errors
///
/// Returns [`OutputError`] if serialization or the write fails.
pub fn write_features(dir: &Path, features: &[geojson::Feature]) -> Result<PathBuf, OutputError> {
    let collection = geojson::FeatureCollection {
        bbox: None,
        features: features.to_vec(),
        foreign_members: None,
    };

    let path = dir.join(FEATURES_FILE);
    std::fs::write(&path, serde_json::to_string_pretty(&collection)?)?;
    Ok(path)
}

/// Copies the map template byte-for-byte to `dir/index.html`.
///
/// # Errors
///
/// Returns [`OutputError::Io`] if the template cannot be copied.
pub fn copy_template(template: &Path, dir: &Path) -> Result<PathBuf, OutputError> {
    let path = dir.join(INDEX_FILE);
    std::fs::copy(template, &path)?;
    Ok(path)
}

/// Writes every output of a run into the configured output directory,
/// creating it if needed.
///
/// # Errors
///
/// Returns [`OutputError`] if the directory cannot be created or any file
/// cannot be written.
pub fn write_outputs(config: &MapperConfig, output: &MapperOutput) -> Result<(), OutputError> {
    let dir = &config.output_dir;
    std::fs::create_dir_all(dir)?;

    let path = write_confidential(dir, &output.confidential)?;
    log::info!(
        "Wrote {} confidential incidents to {}",
        output.confidential.len(),
        path.display()
    );

    let path = write_features(dir, &output.features)?;
    log::info!(
        "Wrote {} features to {}",
        output.features.len(),
        path.display()
    );

    if let Some(template) = &config.template {
        let path = copy_template(template, dir)?;
        log::info!("Copied {} to {}", template.display(), path.display());
    }

    Ok(())
}
