//! Loading grouped incident files.
//!
//! The weekly export is a JSON object keyed by police district, each value
//! an array of raw incidents:
//!
//! ```json
//! { "41": [{ "date": "06/02/2025", "incident": "THEFT", "location": "32XX HERRMANN DR" }] }
//! ```
//!
//! Entries are not validated here; the mapper skips malformed ones. Groups
//! are visited with integer keys in numeric order first, then the other
//! keys in file order.

use std::path::Path;

use incident_map_incident_models::{GroupedIncidents, flatten_grouped};

/// Errors loading an incident file.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON is not an object of arrays.
    #[error("Unexpected input shape: {message}")]
    Shape {
        /// Description of what was found instead.
        message: String,
    },
}

/// Parses grouped incidents from JSON text.
///
/// # Errors
///
/// Returns [`InputError::Json`] for invalid JSON and [`InputError::Shape`]
/// when the top level is not an object or a group is not an array.
pub fn parse_grouped(json: &str) -> Result<GroupedIncidents, InputError> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    let serde_json::Value::Object(map) = value else {
        return Err(InputError::Shape {
            message: "top-level value is not an object".to_string(),
        });
    };

    let mut groups = GroupedIncidents::new();
    for (key, entries) in map {
        let serde_json::Value::Array(entries) = entries else {
            return Err(InputError::Shape {
                message: format!("group '{key}' is not an array"),
            });
        };
        groups.insert(key, entries);
    }

    Ok(groups)
}

/// Reads a grouped incident file and flattens it into one sequence.
///
/// # Errors
///
/// Returns [`InputError`] if the file cannot be read or has the wrong
/// shape.
pub fn load_grouped(path: &Path) -> Result<Vec<serde_json::Value>, InputError> {
    let contents = std::fs::read_to_string(path)?;
    let groups = parse_grouped(&contents)?;

    let records = flatten_grouped(&groups);
    log::info!(
        "Loaded {} raw incidents from {} groups in {}",
        records.len(),
        groups.len(),
        path.display()
    );

    Ok(records)
}
