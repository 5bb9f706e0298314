#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocoding for block-level incident addresses.
//!
//! Two halves:
//!
//! 1. [`address`] expands block notation (`"25XX FOREST LN"`) into the
//!    low and high ends of the block, each a concrete street address.
//! 2. [`nominatim`] resolves a free-form address to coordinates through
//!    the Nominatim / `OpenStreetMap` search API, configured by the TOML in
//!    `services/` (see [`service_registry`]).
//!
//! The [`Geocoder`] trait is the seam the batch mapper depends on. Lookups
//! are best-effort: every failure collapses to `None`.

pub mod address;
pub mod nominatim;
pub mod service_registry;

use std::time::Duration;

use async_trait::async_trait;
use incident_map_incident_models::LatLng;
use thiserror::Error;

use crate::service_registry::NominatimService;

/// A geocoding result with coordinates and metadata.
#[derive(Debug, Clone)]
pub struct GeocodedAddress {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// The matched/canonical address returned by the geocoder.
    pub matched_address: Option<String>,
}

impl GeocodedAddress {
    /// The coordinate pair without metadata.
    #[must_use]
    pub const fn lat_lng(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed (including timeouts).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

/// Resolves a full address string to a coordinate pair.
///
/// Implementations must not fail: a lookup that cannot produce coordinates
/// for any reason returns `None`.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolves `address`, returning `None` on no match or any failure.
    async fn resolve(&self, address: &str) -> Option<LatLng>;
}

/// [`Geocoder`] backed by a Nominatim search endpoint.
///
/// Issues exactly one request per call. No retry, caching, or rate
/// limiting is applied.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// Builds the HTTP client with the service's user agent and per-request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the client cannot be constructed
    /// (e.g., the TLS backend fails to initialize).
    pub fn new(service: &NominatimService) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(service.user_agent.clone())
            .timeout(Duration::from_secs(service.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: service.base_url.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, address: &str) -> Option<LatLng> {
        match nominatim::geocode_freeform(&self.client, &self.base_url, address).await {
            Ok(Some(geocoded)) => Some(geocoded.lat_lng()),
            Ok(None) => {
                log::debug!("Nominatim: no match for '{address}'");
                None
            }
            Err(e) => {
                log::warn!("Nominatim error for '{address}': {e}");
                None
            }
        }
    }
}
