#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Place search for recentering the civic issue map.
//!
//! Resolves a free-text query (e.g. "Shivaji Nagar, Pune") to a
//! coordinate using the Nominatim / `OpenStreetMap` search endpoint
//! configured in `services/`.
//!
//! Lookups go through [`lookup::PlaceLookup`], which tags every request
//! with a generation number so that only the most recently *issued*
//! search can move the map, no matter what order responses arrive in.
//! Failures never block the view: they are logged and the map stays put.
//! [`session::MapSession`] ties a lookup to a filter controller and a
//! viewport for one user's view.

pub mod lookup;
pub mod nominatim;
pub mod service_registry;
pub mod session;

use civic_map_issue_models::LatLng;
use thiserror::Error;

/// A resolved place.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Full name of the matched place, if the provider returned one.
    pub display_name: Option<String>,
}

impl GeocodedPlace {
    /// Returns the coordinate pair for recentering the map.
    #[must_use]
    pub const fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The provider did not answer in time.
    #[error("Lookup timed out after {after_ms}ms")]
    Timeout {
        /// The timeout that elapsed, in milliseconds.
        after_ms: u64,
    },

    /// No usable service is configured.
    #[error("No enabled geocoding service")]
    NoService,
}
