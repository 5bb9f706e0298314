#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Batch mapping of incident records to `GeoJSON` bounding polygons.
//!
//! For each record [`IncidentMapper::process_all`]:
//!
//! 1. skips it if it lacks `date`, `incident` or `location`,
//! 2. sets it aside if its address is confidential,
//! 3. otherwise expands the block address into low/high ends, geocodes the
//!    low end then the high end, and builds a bounding polygon from the two
//!    points.
//!
//! Records run strictly one after another in input order. A record that
//! cannot be mapped never aborts the batch.

pub mod config;
pub mod input;
pub mod output;
pub mod progress;

use incident_map_geocoder::Geocoder;
use incident_map_geocoder::address::{address_range, full_address};
use incident_map_incident_models::IncidentRecord;

use crate::config::MapperConfig;
use crate::progress::ProgressCallback;

/// Per-run counters. Every input record is counted exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapperStats {
    /// Records examined.
    pub total: u64,
    /// Records that produced a feature.
    pub mapped: u64,
    /// Records with a withheld address.
    pub confidential: u64,
    /// Records dropped because no bounding box could be built.
    pub unresolved: u64,
    /// Records dropped for missing or mistyped fields.
    pub malformed: u64,
}

/// Everything produced by one batch pass.
#[derive(Debug, Clone, Default)]
pub struct MapperOutput {
    /// One polygon feature per mapped record, in input order.
    pub features: Vec<geojson::Feature>,
    /// Records withheld from geocoding, in input order.
    pub confidential: Vec<IncidentRecord>,
    /// Counters for the pass.
    pub stats: MapperStats,
}

/// What happened to a single record.
enum Outcome {
    Mapped(geojson::Feature),
    Confidential(IncidentRecord),
    Unresolved,
    Malformed,
}

/// Drives the address → coordinates → polygon pipeline over a batch of
/// records.
pub struct IncidentMapper<G> {
    config: MapperConfig,
    geocoder: G,
}

impl<G: Geocoder> IncidentMapper<G> {
    /// Creates a mapper with an explicit configuration and geocoder.
    #[must_use]
    pub const fn new(config: MapperConfig, geocoder: G) -> Self {
        Self { config, geocoder }
    }

    /// The configuration this mapper was built with.
    #[must_use]
    pub const fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Maps every record, in order.
    ///
    /// Malformed records and records whose bounding box cannot be built are
    /// dropped from both output collections and only show up in
    /// [`MapperOutput::stats`].
    pub async fn process_all(
        &self,
        records: &[serde_json::Value],
        progress: &dyn ProgressCallback,
    ) -> MapperOutput {
        let mut output = MapperOutput::default();
        progress.set_total(records.len() as u64);

        for value in records {
            output.stats.total += 1;

            match self.process_one(value).await {
                Outcome::Mapped(feature) => {
                    output.stats.mapped += 1;
                    output.features.push(feature);
                }
                Outcome::Confidential(record) => {
                    output.stats.confidential += 1;
                    output.confidential.push(record);
                }
                Outcome::Unresolved => output.stats.unresolved += 1,
                Outcome::Malformed => output.stats.malformed += 1,
            }

            progress.inc(1);
        }

        let stats = output.stats;
        progress.finish(format!(
            "Mapped {}/{} incidents ({} confidential, {} unresolved, {} malformed)",
            stats.mapped, stats.total, stats.confidential, stats.unresolved, stats.malformed
        ));

        output
    }

    async fn process_one(&self, value: &serde_json::Value) -> Outcome {
        let Some(record) = IncidentRecord::from_value(value) else {
            log::debug!("Skipping malformed incident: {value}");
            return Outcome::Malformed;
        };

        if record.is_confidential(&self.config.confidential_sentinel) {
            return Outcome::Confidential(record);
        }

        let address = full_address(&record.location, &self.config.jurisdiction);
        log::debug!("Mapping address: {address}");

        match self.map_address(&address).await {
            Some(bbox) => Outcome::Mapped(incident_feature(&bbox, &address, &record)),
            None => {
                log::debug!("No bounding box for '{address}', dropping incident");
                Outcome::Unresolved
            }
        }
    }

    /// Resolves a full address into its bounding box.
    ///
    /// The low end is geocoded before the high end, one request at a time.
    pub async fn map_address(&self, address: &str) -> Option<incident_map_spatial::BoundingBox> {
        let range = address_range(address);
        let low = self.geocoder.resolve(&range.low).await;
        let high = self.geocoder.resolve(&range.high).await;
        incident_map_spatial::synthesize(low, high)
    }
}

/// Wraps a bounding box as a feature carrying the incident's properties.
fn incident_feature(
    bbox: &incident_map_spatial::BoundingBox,
    address: &str,
    record: &IncidentRecord,
) -> geojson::Feature {
    let mut properties = geojson::JsonObject::new();
    properties.insert("address".to_string(), address.into());
    properties.insert("incident".to_string(), record.incident.clone().into());
    properties.insert("date".to_string(), record.date.clone().into());

    let mut feature = bbox.to_feature();
    feature.properties = Some(properties);
    feature
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use incident_map_incident_models::LatLng;

    use super::*;
    use crate::progress::NullProgress;

    /// Geocoder answering from a fixed table and recording every query.
    #[derive(Default)]
    struct StubGeocoder {
        table: BTreeMap<String, LatLng>,
        calls: Mutex<Vec<String>>,
    }

    impl StubGeocoder {
        fn with(mut self, address: &str, lat: f64, lng: f64) -> Self {
            self.table.insert(address.to_string(), LatLng::new(lat, lng));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Geocoder for StubGeocoder {
        async fn resolve(&self, address: &str) -> Option<LatLng> {
            self.calls.lock().unwrap().push(address.to_string());
            self.table.get(address).copied()
        }
    }

    /// Progress sink recording every call.
    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl ProgressCallback for RecordingProgress {
        fn set_total(&self, total: u64) {
            self.events.lock().unwrap().push(format!("total {total}"));
        }

        fn inc(&self, delta: u64) {
            self.events.lock().unwrap().push(format!("inc {delta}"));
        }

        fn finish(&self, msg: String) {
            self.events.lock().unwrap().push(format!("finish {msg}"));
        }
    }

    fn incident(date: &str, incident: &str, location: &str) -> serde_json::Value {
        serde_json::json!({ "date": date, "incident": incident, "location": location })
    }

    fn mapper(geocoder: StubGeocoder) -> IncidentMapper<StubGeocoder> {
        IncidentMapper::new(MapperConfig::default(), geocoder)
    }

    #[tokio::test]
    async fn routes_confidential_without_geocoding() {
        let mapper = mapper(StubGeocoder::default());
        let records = vec![incident("06/02/2025", "ASSAULT", "ADDRESS CONFIDENTIAL")];

        let output = mapper.process_all(&records, &NullProgress).await;

        assert!(output.features.is_empty());
        assert_eq!(output.confidential.len(), 1);
        assert_eq!(output.confidential[0].incident, "ASSAULT");
        assert_eq!(output.stats.confidential, 1);
        assert!(mapper.geocoder.calls().is_empty());
    }

    #[tokio::test]
    async fn maps_every_resolvable_record() {
        let geocoder = StubGeocoder::default()
            .with("2500 FOREST LN Garland TX", 32.9128, -96.6458)
            .with("2599 FOREST LN Garland TX", 32.913, -96.646)
            .with("123 MAIN ST Garland TX", 32.91, -96.63);
        let mapper = mapper(geocoder);
        let records = vec![
            incident("06/01/2025", "THEFT", "25XX FOREST LN"),
            incident("06/02/2025", "BURGLARY", "123 MAIN ST"),
        ];

        let output = mapper.process_all(&records, &NullProgress).await;

        assert_eq!(output.features.len(), 2);
        assert!(output.confidential.is_empty());

        let first = output.features[0].properties.as_ref().unwrap();
        assert_eq!(first["address"], "25XX FOREST LN Garland TX");
        assert_eq!(first["incident"], "THEFT");
        assert_eq!(first["date"], "06/01/2025");

        let second = output.features[1].properties.as_ref().unwrap();
        assert_eq!(second["address"], "123 MAIN ST Garland TX");
        assert_eq!(second["incident"], "BURGLARY");

        let bbox = output.features[0].bbox.as_ref().unwrap();
        assert!((bbox[0] - -96.646).abs() < 1e-9);
        assert!((bbox[1] - 32.9128).abs() < 1e-9);
        assert!((bbox[2] - -96.6458).abs() < 1e-9);
        assert!((bbox[3] - 32.913).abs() < 1e-9);

        assert_eq!(
            output.stats,
            MapperStats {
                total: 2,
                mapped: 2,
                ..MapperStats::default()
            }
        );
    }

    #[tokio::test]
    async fn geocodes_low_before_high() {
        let mapper = mapper(StubGeocoder::default());
        let records = vec![
            incident("d", "i", "25XX FOREST LN"),
            incident("d", "i", "1XX MAIN ST"),
        ];

        mapper.process_all(&records, &NullProgress).await;

        assert_eq!(
            mapper.geocoder.calls(),
            vec![
                "2500 FOREST LN Garland TX",
                "2599 FOREST LN Garland TX",
                "100 MAIN ST Garland TX",
                "199 MAIN ST Garland TX",
            ]
        );
    }

    #[tokio::test]
    async fn drops_unresolvable_records() {
        let mapper = mapper(StubGeocoder::default());
        let records = vec![incident("d", "i", "99XX NOWHERE RD")];

        let output = mapper.process_all(&records, &NullProgress).await;

        assert!(output.features.is_empty());
        assert!(output.confidential.is_empty());
        assert_eq!(output.stats.unresolved, 1);
    }

    #[tokio::test]
    async fn drops_partially_resolved_records() {
        let geocoder = StubGeocoder::default().with("2500 FOREST LN Garland TX", 32.9, -96.6);
        let mapper = mapper(geocoder);
        let records = vec![incident("d", "i", "25XX FOREST LN")];

        let output = mapper.process_all(&records, &NullProgress).await;

        assert!(output.features.is_empty());
        assert!(output.confidential.is_empty());
        assert_eq!(output.stats.unresolved, 1);
    }

    #[tokio::test]
    async fn skips_malformed_records_silently() {
        let mapper = mapper(StubGeocoder::default());
        let records = vec![
            serde_json::json!({ "date": "d", "incident": "i" }),
            serde_json::json!("not an object"),
            serde_json::json!({ "date": "d", "incident": "i", "location": 42 }),
        ];

        let output = mapper.process_all(&records, &NullProgress).await;

        assert!(output.features.is_empty());
        assert!(output.confidential.is_empty());
        assert_eq!(output.stats.malformed, 3);
        assert!(mapper.geocoder.calls().is_empty());
    }

    #[tokio::test]
    async fn every_record_counted_once() {
        let geocoder = StubGeocoder::default().with("1 A ST Garland TX", 32.9, -96.6);
        let mapper = mapper(geocoder);
        let records = vec![
            incident("d", "i", "1 A ST"),
            incident("d", "i", "ADDRESS CONFIDENTIAL"),
            incident("d", "i", "2 B ST"),
            serde_json::json!({}),
        ];

        let output = mapper.process_all(&records, &NullProgress).await;
        let stats = output.stats;

        assert_eq!(stats.total, 4);
        assert_eq!(
            stats.mapped + stats.confidential + stats.unresolved + stats.malformed,
            stats.total
        );
        assert_eq!(output.features.len(), 1);
        assert_eq!(output.confidential.len(), 1);
    }

    #[tokio::test]
    async fn uses_configured_jurisdiction_and_sentinel() {
        let geocoder = StubGeocoder::default().with("1 A ST Plano TX", 33.0, -96.7);
        let config = MapperConfig {
            jurisdiction: "Plano TX".to_string(),
            confidential_sentinel: "WITHHELD".to_string(),
            ..MapperConfig::default()
        };
        let mapper = IncidentMapper::new(config, geocoder);
        let records = vec![
            incident("d", "i", "1 A ST"),
            incident("d", "i", "WITHHELD"),
            incident("d", "i", "ADDRESS CONFIDENTIAL"),
        ];

        let output = mapper.process_all(&records, &NullProgress).await;

        assert_eq!(output.features.len(), 1);
        assert_eq!(output.confidential.len(), 1);
        assert_eq!(output.confidential[0].location, "WITHHELD");
        assert_eq!(output.stats.unresolved, 1);
    }

    #[tokio::test]
    async fn empty_batch_is_valid() {
        let mapper = mapper(StubGeocoder::default());
        let output = mapper.process_all(&[], &NullProgress).await;
        assert!(output.features.is_empty());
        assert!(output.confidential.is_empty());
        assert_eq!(output.stats, MapperStats::default());
    }

    #[tokio::test]
    async fn reports_progress_per_record() {
        let mapper = mapper(StubGeocoder::default());
        let records = vec![
            incident("d", "i", "ADDRESS CONFIDENTIAL"),
            serde_json::json!("garbage"),
        ];
        let progress = RecordingProgress::default();
        mapper.process_all(&records, &progress).await;

        let events = progress.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "total 2".to_string(),
                "inc 1".to_string(),
                "inc 1".to_string(),
                "finish Mapped 0/2 incidents (1 confidential, 0 unresolved, 1 malformed)"
                    .to_string(),
            ]
        );
    }
}
