#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Bounding polygons for geocoded address ranges.
//!
//! A block address is geocoded at both ends of the block. [`synthesize`]
//! turns the two resulting points into an axis-aligned box:
//!
//! 1. Either point missing: no box.
//! 2. Both points identical: a ~50 m square around the point, since the
//!    envelope of one point has zero area.
//! 3. Points more than [`MAX_BLOCK_SPAN_KM`] apart: one end almost
//!    certainly resolved to the wrong place, so a ~100 m square around the
//!    low end is used instead.
//! 4. Otherwise: the envelope of both points.

use geo::{Distance, Haversine, LineString, Point, Polygon, Rect, coord};
use incident_map_incident_models::LatLng;

/// Half-width in degrees of the box used when both ends resolve to the
/// same coordinate.
pub const COINCIDENT_BUFFER_DEG: f64 = 0.0005;

/// Half-width in degrees of the box used when the ends are implausibly far
/// apart.
pub const IMPLAUSIBLE_BUFFER_DEG: f64 = 0.001;

/// Longest great-circle distance between block ends that is still treated
/// as a real block span.
pub const MAX_BLOCK_SPAN_KM: f64 = 2.0;

/// Which rule produced a [`BoundingBox`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxStrategy {
    /// Both ends identical; buffered square around the shared point.
    CoincidentPoint,
    /// Ends further apart than [`MAX_BLOCK_SPAN_KM`]; buffered square
    /// around the low end.
    ImplausibleSpan,
    /// Minimal envelope containing both ends.
    Envelope,
}

/// An axis-aligned bounding box in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    rect: Rect<f64>,
    strategy: BoxStrategy,
}

impl BoundingBox {
    /// Square of half-width `buffer` degrees centered on `center`.
    #[must_use]
    pub fn around(center: LatLng, buffer: f64, strategy: BoxStrategy) -> Self {
        let rect = Rect::new(
            coord! { x: center.lng - buffer, y: center.lat - buffer },
            coord! { x: center.lng + buffer, y: center.lat + buffer },
        );
        Self { rect, strategy }
    }

    /// Minimal box containing both points.
    #[must_use]
    pub fn envelope(a: LatLng, b: LatLng) -> Self {
        let rect = Rect::new(coord! { x: a.lng, y: a.lat }, coord! { x: b.lng, y: b.lat });
        Self {
            rect,
            strategy: BoxStrategy::Envelope,
        }
    }

    /// The rule that produced this box.
    #[must_use]
    pub const fn strategy(&self) -> BoxStrategy {
        self.strategy
    }

    /// `[minLng, minLat, maxLng, maxLat]`.
    #[must_use]
    pub fn bbox(&self) -> [f64; 4] {
        let min = self.rect.min();
        let max = self.rect.max();
        [min.x, min.y, max.x, max.y]
    }

    /// The box as a closed polygon ring, counter-clockwise from the
    /// south-west corner.
    #[must_use]
    pub fn to_polygon(&self) -> Polygon<f64> {
        let [west, south, east, north] = self.bbox();
        Polygon::new(
            LineString::from(vec![
                (west, south),
                (east, south),
                (east, north),
                (west, north),
                (west, south),
            ]),
            vec![],
        )
    }

    /// The box as a `GeoJSON` Polygon feature with `bbox` set and no
    /// properties.
    #[must_use]
    pub fn to_feature(&self) -> geojson::Feature {
        let geometry = geojson::Geometry::from(&geo::Geometry::Polygon(self.to_polygon()));

        geojson::Feature {
            bbox: Some(self.bbox().to_vec()),
            geometry: Some(geometry),
            id: None,
            properties: None,
            foreign_members: None,
        }
    }
}

/// Great-circle (Haversine) distance between two points in kilometers.
#[must_use]
pub fn distance_km(a: LatLng, b: LatLng) -> f64 {
    let from = Point::new(a.lng, a.lat);
    let to = Point::new(b.lng, b.lat);
    Haversine.distance(from, to) / 1000.0
}

/// Builds the bounding box for a block whose ends geocoded to `low` and
/// `high`.
///
/// Returns `None` if either end failed to geocode.
#[must_use]
pub fn synthesize(low: Option<LatLng>, high: Option<LatLng>) -> Option<BoundingBox> {
    let (low, high) = (low?, high?);

    if low == high {
        return Some(BoundingBox::around(
            low,
            COINCIDENT_BUFFER_DEG,
            BoxStrategy::CoincidentPoint,
        ));
    }

    let span = distance_km(low, high);
    if span > MAX_BLOCK_SPAN_KM {
        log::debug!(
            "Block ends {span:.2} km apart, boxing low end only ({}, {})",
            low.lat,
            low.lng
        );
        return Some(BoundingBox::around(
            low,
            IMPLAUSIBLE_BUFFER_DEG,
            BoxStrategy::ImplausibleSpan,
        ));
    }

    Some(BoundingBox::envelope(low, high))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_bbox(actual: [f64; 4], expected: [f64; 4]) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < EPS, "bbox {actual:?} != {expected:?}");
        }
    }

    const P: LatLng = LatLng::new(32.9128, -96.6458);

    #[test]
    fn missing_point_yields_none() {
        assert!(synthesize(Some(P), None).is_none());
        assert!(synthesize(None, Some(P)).is_none());
        assert!(synthesize(None, None).is_none());
    }

    #[test]
    fn coincident_points_get_small_square() {
        let bbox = synthesize(Some(P), Some(P)).unwrap();
        assert_eq!(bbox.strategy(), BoxStrategy::CoincidentPoint);
        assert_bbox(
            bbox.bbox(),
            [
                P.lng - 0.0005,
                P.lat - 0.0005,
                P.lng + 0.0005,
                P.lat + 0.0005,
            ],
        );
    }

    #[test]
    fn close_points_get_envelope() {
        let high = LatLng::new(32.913, -96.646);
        let bbox = synthesize(Some(P), Some(high)).unwrap();
        assert_eq!(bbox.strategy(), BoxStrategy::Envelope);
        assert_bbox(bbox.bbox(), [high.lng, P.lat, P.lng, high.lat]);
    }

    #[test]
    fn envelope_is_order_independent() {
        let high = LatLng::new(32.913, -96.646);
        let forward = synthesize(Some(P), Some(high)).unwrap();
        let backward = synthesize(Some(high), Some(P)).unwrap();
        assert_bbox(forward.bbox(), backward.bbox());
    }

    #[test]
    fn distant_points_box_low_end_only() {
        let far = LatLng::new(33.0, -97.0);
        assert!(distance_km(P, far) > MAX_BLOCK_SPAN_KM);

        let bbox = synthesize(Some(P), Some(far)).unwrap();
        assert_eq!(bbox.strategy(), BoxStrategy::ImplausibleSpan);
        assert_bbox(
            bbox.bbox(),
            [P.lng - 0.001, P.lat - 0.001, P.lng + 0.001, P.lat + 0.001],
        );
    }

    #[test]
    fn span_just_under_threshold_uses_envelope() {
        // ~1.9 km due north (1 degree of latitude ~ 111.2 km).
        let north = LatLng::new(P.lat + 1.9 / 111.2, P.lng);
        assert!(distance_km(P, north) < MAX_BLOCK_SPAN_KM);
        let bbox = synthesize(Some(P), Some(north)).unwrap();
        assert_eq!(bbox.strategy(), BoxStrategy::Envelope);
    }

    #[test]
    fn span_just_over_threshold_uses_fallback() {
        let north = LatLng::new(P.lat + 2.1 / 111.2, P.lng);
        assert!(distance_km(P, north) > MAX_BLOCK_SPAN_KM);
        let bbox = synthesize(Some(P), Some(north)).unwrap();
        assert_eq!(bbox.strategy(), BoxStrategy::ImplausibleSpan);
    }

    #[test]
    fn distance_is_zero_for_same_point() {
        assert!(distance_km(P, P).abs() < EPS);
    }

    #[test]
    fn polygon_ring_is_closed_box() {
        let bbox = BoundingBox::around(P, 0.001, BoxStrategy::ImplausibleSpan);
        let polygon = bbox.to_polygon();
        let coords: Vec<_> = polygon.exterior().coords().copied().collect();
        assert_eq!(coords.len(), 5);
        assert_eq!(coords.first(), coords.last());
        let [west, south, east, north] = bbox.bbox();
        assert!((coords[0].x - west).abs() < EPS && (coords[0].y - south).abs() < EPS);
        assert!((coords[2].x - east).abs() < EPS && (coords[2].y - north).abs() < EPS);
    }

    #[test]
    fn feature_carries_bbox_and_polygon() {
        let bbox = synthesize(Some(P), Some(P)).unwrap();
        let feature = bbox.to_feature();
        let json = serde_json::to_value(&feature).unwrap();

        assert_eq!(json["type"], "Feature");
        assert_eq!(json["geometry"]["type"], "Polygon");
        assert_eq!(json["bbox"].as_array().unwrap().len(), 4);
        assert_eq!(
            json["geometry"]["coordinates"][0].as_array().unwrap().len(),
            5
        );
    }
}
