#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident record and coordinate types.
//!
//! This crate contains only data types and simple conversions. It has no
//! network or geometry dependencies, so every other crate in the pipeline
//! can share it.

use std::ops::Index;

use serde::{Deserialize, Serialize};

/// Location value used by the police reports for incidents whose address is
/// withheld. Records carrying it are never geocoded.
pub const CONFIDENTIAL_SENTINEL: &str = "ADDRESS CONFIDENTIAL";

/// A single incident as read from a weekly report.
///
/// `location` is a street address, a block-style range such as
/// `"25XX FOREST LN"`, or [`CONFIDENTIAL_SENTINEL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Date of the incident as printed in the report (e.g. `"06/02/2025"`).
    pub date: String,
    /// Incident description (e.g. `"BURGLARY OF VEHICLE"`).
    pub incident: String,
    /// Partial street address without city or state.
    pub location: String,
}

impl IncidentRecord {
    /// Extracts a record from a raw JSON value.
    ///
    /// Returns `None` unless `value` is an object whose `date`, `incident`
    /// and `location` keys are all present and hold strings. Extra keys are
    /// ignored.
    #[must_use]
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let obj = value.as_object()?;
        let field = |name: &str| obj.get(name)?.as_str().map(str::to_string);

        Some(Self {
            date: field("date")?,
            incident: field("incident")?,
            location: field("location")?,
        })
    }

    /// Whether the record's address was withheld by the reporting agency.
    #[must_use]
    pub fn is_confidential(&self, sentinel: &str) -> bool {
        self.location == sentinel
    }
}

/// A WGS84 coordinate pair.
///
/// Equality is exact on both components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Creates a coordinate pair.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Raw incidents keyed by an arbitrary grouping key (police district in the
/// weekly reports). Values are kept as raw JSON so that malformed entries
/// survive loading and can be skipped by the mapper.
///
/// Groups keep the order they were inserted in. Re-inserting an existing
/// key replaces its entries in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedIncidents {
    groups: Vec<(String, Vec<serde_json::Value>)>,
}

impl GroupedIncidents {
    /// Creates an empty set of groups.
    #[must_use]
    pub const fn new() -> Self {
        Self { groups: Vec::new() }
    }

    /// Adds a group, replacing the entries of an existing group with the
    /// same key.
    pub fn insert(&mut self, key: String, entries: Vec<serde_json::Value>) {
        if let Some((_, existing)) = self.groups.iter_mut().find(|(k, _)| *k == key) {
            *existing = entries;
        } else {
            self.groups.push((key, entries));
        }
    }

    /// Entries of the group with the given key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[serde_json::Value]> {
        self.groups
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, entries)| entries.as_slice())
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in traversal order: integer keys in ascending numeric order
    /// first, then every other key in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[serde_json::Value])> {
        let mut ordered: Vec<_> = self.groups.iter().collect();
        ordered.sort_by_key(|(key, _)| integer_key(key).map_or((1, 0), |n| (0, n)));
        ordered
            .into_iter()
            .map(|(key, entries)| (key.as_str(), entries.as_slice()))
    }
}

impl Index<&str> for GroupedIncidents {
    type Output = [serde_json::Value];

    fn index(&self, key: &str) -> &Self::Output {
        self.get(key)
            .unwrap_or_else(|| panic!("no group with key '{key}'"))
    }
}

/// Numeric value of a canonical integer key (`"9"`, `"41"`), rejecting
/// signs, leading zeros and anything outside `u32`.
fn integer_key(key: &str) -> Option<u32> {
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

/// Concatenates every group into one sequence in traversal order (see
/// [`GroupedIncidents::iter`]), keeping the order of entries within each
/// group.
#[must_use]
pub fn flatten_grouped(groups: &GroupedIncidents) -> Vec<serde_json::Value> {
    groups
        .iter()
        .flat_map(|(_, entries)| entries.iter().cloned())
        .collect()
}
