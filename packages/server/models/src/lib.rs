#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the civic map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the heatmap model types to allow independent evolution of the API
//! contract.

use chrono::{DateTime, Utc};
use civic_map_heatmap_models::{BaseLayer, HeatLayerOptions, TileSource};
use civic_map_issue_models::IssueCategory;
use serde::{Deserialize, Serialize};

/// Query parameters for the heatmap endpoint.
///
/// Every parameter is optional; missing ones take the session defaults
/// (24h window, all categories, intensity 0.6).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapQueryParams {
    /// Window key: `24h`, `7d`, `30d` or `custom`.
    pub window: Option<String>,
    /// Comma-separated list of category names to show. An empty string
    /// hides every category.
    pub categories: Option<String>,
    /// Intensity multiplier; clamped into `[0, 1]`.
    pub intensity: Option<f64>,
    /// Start of a custom range (ISO 8601).
    pub from: Option<DateTime<Utc>>,
    /// End of a custom range (ISO 8601).
    pub to: Option<DateTime<Utc>>,
}

/// Response from the heatmap endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapResponse {
    /// `[lat, lng, weight]` triples in input order.
    pub samples: Vec<[f64; 3]>,
    /// Window key that was applied.
    pub window: String,
    /// Categories that were visible.
    pub categories: Vec<IssueCategory>,
    /// Start of the applied custom range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    /// End of the applied custom range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
    /// Intensity after clamping.
    pub intensity: f64,
    /// Heat layer rendering options.
    pub options: HeatLayerOptions,
}

/// A category as listed by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCategory {
    /// Category name used in query strings.
    pub name: IssueCategory,
    /// Layer label.
    pub label: String,
}

/// A base layer as listed by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBaseLayer {
    /// Layer identifier.
    pub layer: BaseLayer,
    /// Display name.
    pub name: String,
    /// XYZ tile URL template.
    pub url_template: String,
    /// HTML attribution.
    pub attribution: String,
    /// Whether this layer is selected when the map opens.
    pub default: bool,
}

impl From<TileSource> for ApiBaseLayer {
    fn from(source: TileSource) -> Self {
        Self {
            default: source.layer == BaseLayer::default(),
            layer: source.layer,
            name: source.name,
            url_template: source.url_template,
            attribution: source.attribution,
        }
    }
}

/// Query parameters for the basemaps endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BasemapQueryParams {
    /// Restricts the listing to one layer.
    pub layer: Option<BaseLayer>,
}

/// Query parameters for the geocode endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeQueryParams {
    /// Free-text place name.
    pub q: String,
    /// Map session the search belongs to. Within one session only the
    /// most recently issued search is answered; omitted means a
    /// throwaway session.
    pub session: Option<String>,
}

/// A resolved place returned by the geocode endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPlace {
    /// Latitude to center on.
    pub latitude: f64,
    /// Longitude to center on.
    pub longitude: f64,
    /// Zoom to apply when centering.
    pub zoom: u8,
    /// Matched place name.
    pub display_name: Option<String>,
}

/// Error body for non-2xx responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Human-readable error.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}
