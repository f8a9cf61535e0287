//! Compile-time registry of base map tile sources.
//!
//! Each base layer is defined in a TOML file under `basemaps/`. The
//! registry embeds these at compile time and exposes them via
//! [`all_tile_sources`] and [`tile_source`].

use civic_map_heatmap_models::{BaseLayer, TileSource};

// ── Compile-time embedded TOML files ────────────────────────────────

const BASEMAP_TOMLS: &[(&str, &str)] = &[
    ("street", include_str!("../basemaps/street.toml")),
    ("satellite", include_str!("../basemaps/satellite.toml")),
];

/// Returns every configured tile source, default layer first.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_tile_sources() -> Vec<TileSource> {
    BASEMAP_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse base layer '{name}': {e}"))
        })
        .collect()
}

/// Returns the tile source for `layer`, if one is configured.
#[must_use]
pub fn tile_source(layer: BaseLayer) -> Option<TileSource> {
    all_tile_sources().into_iter().find(|s| s.layer == layer)
}
