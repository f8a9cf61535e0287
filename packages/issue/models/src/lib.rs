#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Civic issue report types, category taxonomy and severity definitions.
//!
//! This crate defines the shape of a citizen-filed issue report as it is
//! loaded from a data source. Reports are immutable once loaded; every
//! downstream consumer (heatmap projection, marker layer, API) works on
//! borrowed slices of [`IssueReport`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Severity of a reported issue.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IssueSeverity {
    /// Minor inconvenience, no urgency.
    Low,
    /// Needs attention within the normal work queue.
    Medium,
    /// Needs immediate attention.
    High,
}

impl IssueSeverity {
    /// Returns the marker color used to render this severity on the map.
    #[must_use]
    pub const fn marker_color(self) -> &'static str {
        match self {
            Self::High => "#ef4444",
            Self::Medium => "#eab308",
            Self::Low => "#22c55e",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High]
    }
}

/// Fixed set of civic issue categories.
///
/// Each category is rendered as its own toggleable heatmap layer.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IssueCategory {
    /// Potholes, damaged roads, broken signage
    Road,
    /// Leakage, contamination, supply interruptions
    Water,
    /// Garbage collection and sanitation
    Waste,
    /// Outages, street lights, exposed wiring
    Electricity,
    /// Public buildings, bridges, drainage
    Infrastructure,
}

impl IssueCategory {
    /// Returns the human-readable layer label for this category.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Road => "Road Issues",
            Self::Water => "Water Supply",
            Self::Waste => "Waste Management",
            Self::Electricity => "Electricity",
            Self::Infrastructure => "Infrastructure",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Road,
            Self::Water,
            Self::Waste,
            Self::Electricity,
            Self::Infrastructure,
        ]
    }
}

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Creates a new coordinate pair.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A single reported civic issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueReport {
    /// Unique identifier.
    pub id: u64,
    /// Short title shown in the marker popup.
    pub title: String,
    /// Where the issue was reported.
    pub position: LatLng,
    /// Relative intensity, 0.0-1.0.
    pub weight: f64,
    /// Issue category.
    pub category: IssueCategory,
    /// Issue severity.
    pub severity: IssueSeverity,
    /// When the issue was filed.
    pub reported_at: DateTime<Utc>,
}
