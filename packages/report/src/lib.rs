#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Parsing of the weekly "selected incident report".
//!
//! The report text (as extracted from the PDF) lists incidents under
//! `DISTRICT <n>` headers. Each incident line starts with two columns that
//! are not needed here, followed by the incident description, the date and
//! the block address run together:
//!
//! ```text
//! DISTRICT 41
//! 25-012345 0800 THEFT-ALL OTHER-$2,500 L/T $30,00006/02/2025 32XX HERRMANN DR
//! ```
//!
//! The description/location split happens at the first `M/D/YYYY` date.
//! Reports published as PDF are converted to text with
//! [`extract_pdf_text`] first.

use std::fmt::Write as _;
use std::ops::Index;
use std::sync::LazyLock;

use chrono::{Datelike as _, NaiveDate};
use incident_map_incident_models::IncidentRecord;
use regex::Regex;
use serde::{Serialize, Serializer};

/// Errors reading a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// PDF text extraction failed.
    #[error("PDF extraction error: {0}")]
    Extraction(String),
}

/// First `M/D/YYYY` date in a line.
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{1,2}/[0-9]{1,2}/[0-9]{4}").expect("valid regex"));

/// A `DISTRICT <n>` header, capturing the number.
static DISTRICT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"DISTRICT ([0-9]+)").expect("valid regex"));

/// Incidents per district, keyed by the district number as a string, in
/// the order the districts were requested.
///
/// Serializes as a JSON object with the keys in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistrictIncidents {
    districts: Vec<(String, Vec<IncidentRecord>)>,
}

impl DistrictIncidents {
    /// Incidents of one district.
    #[must_use]
    pub fn get(&self, district: &str) -> Option<&[IncidentRecord]> {
        self.districts
            .iter()
            .find(|(key, _)| key == district)
            .map(|(_, incidents)| incidents.as_slice())
    }

    /// Number of districts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.districts.len()
    }

    /// Whether no districts were requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }

    /// Districts and their incidents in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[IncidentRecord])> {
        self.districts
            .iter()
            .map(|(key, incidents)| (key.as_str(), incidents.as_slice()))
    }
}

impl Index<&str> for DistrictIncidents {
    type Output = [IncidentRecord];

    fn index(&self, district: &str) -> &Self::Output {
        self.get(district)
            .unwrap_or_else(|| panic!("district '{district}' was not requested"))
    }
}

impl Serialize for DistrictIncidents {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.districts.iter().map(|(key, incidents)| (key, incidents)))
    }
}

/// Extracts the text of a PDF report.
///
/// # Errors
///
/// Returns [`ReportError::Extraction`] if the bytes are not a readable PDF.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ReportError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ReportError::Extraction(format!("failed to extract text from PDF: {e}")))?;

    log::debug!("Extracted {} characters of text from PDF", text.len());

    Ok(text)
}

/// Extracts the incidents of the requested districts from report text.
///
/// Every requested district appears in the result, in request order, with
/// an empty list if its header is missing or it has no parsable lines. Only
/// the first header for each district is read and a district requested
/// twice appears once.
#[must_use]
pub fn parse_district_incidents(text: &str, districts: &[u32]) -> DistrictIncidents {
    let lines: Vec<&str> = text.lines().collect();
    let mut result = DistrictIncidents::default();

    for &district in districts {
        let key = district.to_string();
        if result.get(&key).is_some() {
            continue;
        }

        let incidents: Vec<IncidentRecord> = lines
            .iter()
            .position(|line| header_district(line).is_some_and(|n| n == district))
            .map(|header| {
                lines[header + 1..]
                    .iter()
                    .take_while(|line| !line.contains("DISTRICT"))
                    .filter_map(|line| parse_incident_line(line))
                    .collect()
            })
            .unwrap_or_default();

        log::debug!("District {district}: {} incidents", incidents.len());
        result.districts.push((key, incidents));
    }

    result
}

/// Returns the district number of a header line, if it is one.
fn header_district(line: &str) -> Option<u32> {
    DISTRICT_RE
        .captures_iter(line)
        .find_map(|caps| caps[1].parse().ok())
}

/// Parses one incident line, or `None` if it has no date or too little text.
fn parse_incident_line(line: &str) -> Option<IncidentRecord> {
    let cleaned = line
        .split_whitespace()
        .skip(2)
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.split_whitespace().count() <= 1 {
        return None;
    }

    let date = DATE_RE.find(&cleaned)?;

    Some(IncidentRecord {
        date: date.as_str().to_string(),
        incident: cleaned[..date.start()].trim().to_string(),
        location: cleaned[date.end()..].trim().to_string(),
    })
}

/// ISO week number of the first `M/D/YYYY` date in the text.
///
/// Returns `None` when the text has no date or the first one is invalid
/// (e.g. `13/45/2025`).
#[must_use]
pub fn week_number(text: &str) -> Option<u32> {
    let found = DATE_RE.find(text)?;
    let date = NaiveDate::parse_from_str(found.as_str(), "%m/%d/%Y").ok()?;
    Some(date.iso_week().week())
}

/// Formats the plain-text weekly summary sent to subscribers.
#[must_use]
pub fn format_summary(jurisdiction: &str, districts: &DistrictIncidents, week: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{jurisdiction} Police Activity Report - Week {week}");
    out.push('\n');

    for (district, incidents) in districts.iter() {
        let _ = writeln!(
            out,
            "District {district} ({} incidents):",
            incidents.len()
        );
        if incidents.is_empty() {
            out.push_str("  No incidents reported.\n");
        }
        for inc in incidents {
            let _ = writeln!(
                out,
                "  - {}: {} @ {}",
                inc.date, inc.incident, inc.location
            );
        }
        out.push('\n');
    }

    out
}
