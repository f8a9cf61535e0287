#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter state, time window and rendering types for the civic issue
//! heatmap.
//!
//! [`FilterState`] holds the user-adjustable view parameters and enforces
//! their invariants at the mutator boundary. The projection from issue
//! reports to [`RenderedSample`]s lives in `civic_map_heatmap`.

pub mod window;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use civic_map_issue_models::{IssueCategory, IssueSeverity, LatLng};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

pub use window::{DateRange, TimeWindow};

/// Intensity applied when a view session starts.
pub const DEFAULT_INTENSITY: f64 = 0.6;

/// Zoom level used for the initial view and after recentering on a place.
pub const DEFAULT_ZOOM: u8 = 13;

/// Errors from filter mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A value outside a fixed enumeration (or an inconsistent range).
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected value.
        message: String,
    },
}

/// User-adjustable heatmap parameters for a single view session.
///
/// `active_categories` is typed as a set of [`IssueCategory`], so it can
/// never hold an unknown category. `intensity_scale` is clamped to
/// `[0.0, 1.0]` on every write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    time_window: TimeWindow,
    active_categories: BTreeSet<IssueCategory>,
    intensity_scale: f64,
    search_query: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            time_window: TimeWindow::default(),
            active_categories: IssueCategory::all().iter().copied().collect(),
            intensity_scale: DEFAULT_INTENSITY,
            search_query: String::new(),
        }
    }
}

impl FilterState {
    /// Current time window.
    #[must_use]
    pub const fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }

    /// Categories currently visible.
    #[must_use]
    pub const fn active_categories(&self) -> &BTreeSet<IssueCategory> {
        &self.active_categories
    }

    /// Whether `category` is currently visible.
    #[must_use]
    pub fn is_active(&self, category: IssueCategory) -> bool {
        self.active_categories.contains(&category)
    }

    /// Current intensity multiplier, always within `[0.0, 1.0]`.
    #[must_use]
    pub const fn intensity_scale(&self) -> f64 {
        self.intensity_scale
    }

    /// Raw place search text.
    #[must_use]
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Replaces the time window.
    pub fn set_time_window(&mut self, window: TimeWindow) {
        self.time_window = window;
    }

    /// Adds `category` if absent, removes it if present.
    ///
    /// Removing the last category is allowed and leaves an empty set.
    pub fn toggle_category(&mut self, category: IssueCategory) {
        if !self.active_categories.remove(&category) {
            self.active_categories.insert(category);
        }
    }

    /// Replaces the active category set.
    pub fn set_active_categories(&mut self, categories: impl IntoIterator<Item = IssueCategory>) {
        self.active_categories = categories.into_iter().collect();
    }

    /// Stores `value` clamped into `[0.0, 1.0]`. NaN is stored as `0.0`.
    pub fn set_intensity_scale(&mut self, value: f64) {
        self.intensity_scale = clamp_intensity(value);
    }

    /// Stores the raw search text.
    pub fn set_search_query(&mut self, text: impl Into<String>) {
        self.search_query = text.into();
    }
}

/// Clamps an intensity input into `[0.0, 1.0]`, mapping NaN to `0.0`.
#[must_use]
pub fn clamp_intensity(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// A weighted point ready to be drawn on the heat layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderedSample {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// `issue.weight * intensity_scale`.
    pub weight: f64,
}

impl RenderedSample {
    /// Returns the sample as the `[lat, lng, weight]` triple heat layers
    /// consume.
    #[must_use]
    pub const fn as_triple(&self) -> [f64; 3] {
        [self.lat, self.lng, self.weight]
    }
}

/// One color stop in the heat layer gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Normalized intensity at which this color applies.
    pub stop: f64,
    /// CSS hex color.
    pub color: String,
}

/// Rendering options for the heat layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatLayerOptions {
    /// Point radius in pixels.
    pub radius: u32,
    /// Blur radius in pixels.
    pub blur: u32,
    /// Zoom level at which points reach full intensity.
    pub max_zoom: u8,
    /// Weight mapped to the top of the gradient.
    pub max: f64,
    /// Ascending color stops.
    pub gradient: Vec<GradientStop>,
}

impl Default for HeatLayerOptions {
    fn default() -> Self {
        let gradient = [
            (0.2, "#3b82f6"),
            (0.4, "#22c55e"),
            (0.6, "#eab308"),
            (0.8, "#f97316"),
            (1.0, "#ef4444"),
        ]
        .into_iter()
        .map(|(stop, color)| GradientStop {
            stop,
            color: color.to_string(),
        })
        .collect();

        Self {
            radius: 25,
            blur: 15,
            max_zoom: 10,
            max: 1.0,
            gradient,
        }
    }
}

/// Base map layer selectable from the layer control.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BaseLayer {
    /// Standard street tiles.
    #[default]
    Street,
    /// Satellite imagery tiles.
    Satellite,
}

/// A tile source backing a [`BaseLayer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSource {
    /// Which base layer this source renders.
    pub layer: BaseLayer,
    /// Name shown in the layer control.
    pub name: String,
    /// XYZ URL template (`{s}`, `{z}`, `{x}`, `{y}` placeholders).
    pub url_template: String,
    /// HTML attribution string.
    pub attribution: String,
}

/// The visible map area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Map center.
    pub center: LatLng,
    /// Zoom level.
    pub zoom: u8,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: LatLng::new(18.5204, 73.8567),
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl Viewport {
    /// Moves the center to `center` at the default zoom.
    pub fn recenter(&mut self, center: LatLng) {
        self.center = center;
        self.zoom = DEFAULT_ZOOM;
    }
}

/// A clickable marker for a single issue report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueMarker {
    /// Issue identifier.
    pub id: u64,
    /// Marker position.
    pub position: LatLng,
    /// Popup title.
    pub title: String,
    /// Issue category.
    pub category: IssueCategory,
    /// Layer label for the category.
    pub category_label: String,
    /// Issue severity.
    pub severity: IssueSeverity,
    /// Pin color derived from severity.
    pub color: String,
    /// When the issue was filed.
    pub reported_at: DateTime<Utc>,
}

/// A notification shown in the real-time alerts panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Alert identifier.
    pub id: String,
    /// Message text.
    pub message: String,
    /// Drives the icon color.
    pub severity: IssueSeverity,
}
