//! `parse-report` command: weekly report to grouped incident JSON.

use std::path::{Path, PathBuf};

use chrono::Datelike as _;
use incident_map_report::{
    DistrictIncidents, extract_pdf_text, format_summary, parse_district_incidents, week_number,
};
use serde::Serialize as _;

/// Parses a comma-separated district list, ignoring blank entries.
fn parse_districts(list: &str) -> Result<Vec<u32>, Box<dyn std::error::Error>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .map_err(|e| format!("Invalid district '{s}': {e}").into())
        })
        .collect()
}

/// Runs the command. The district list falls back to the
/// `DISTRICTS_OF_INTEREST` environment variable.
///
/// # Errors
///
/// Returns an error if no districts are given, the input cannot be read,
/// or the outputs cannot be written.
pub fn run(
    input: &Path,
    districts: Option<String>,
    output_dir: &Path,
    summary: bool,
    jurisdiction: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let list = districts
        .or_else(|| std::env::var("DISTRICTS_OF_INTEREST").ok())
        .ok_or("No districts given: pass --districts or set DISTRICTS_OF_INTEREST (e.g. '41,42')")?;
    let districts = parse_districts(&list)?;
    if districts.is_empty() {
        return Err("District list is empty".into());
    }

    let text = read_report_text(input)?;
    let incidents = parse_district_incidents(&text, &districts);
    for (district, list) in incidents.iter() {
        log::info!("District {district}: {} incidents", list.len());
    }

    let week = week_number(&text).unwrap_or_else(|| {
        log::warn!("No report date found, using the current week");
        chrono::Local::now().iso_week().week()
    });

    std::fs::create_dir_all(output_dir)?;
    let path = output_path(output_dir, week, "json");
    std::fs::write(&path, to_json(&incidents)?)?;
    log::info!("Districts incidents exported to {}", path.display());

    if summary {
        let path = output_path(output_dir, week, "txt");
        std::fs::write(&path, format_summary(jurisdiction, &incidents, week))?;
        log::info!("Summary written to {}", path.display());
    }

    Ok(())
}

/// Reads the report, extracting the text first when the file is a PDF.
fn read_report_text(input: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let is_pdf = input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        let bytes = std::fs::read(input)?;
        log::debug!("Read {} bytes from {}", bytes.len(), input.display());
        Ok(extract_pdf_text(&bytes)?)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

/// Pretty-prints the district incidents with four-space indentation.
fn to_json(incidents: &DistrictIncidents) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    incidents.serialize(&mut serializer)?;
    Ok(buf)
}

fn output_path(dir: &Path, week: u32, extension: &str) -> PathBuf {
    dir.join(format!("districts_incidents_week_{week}.{extension}"))
}
