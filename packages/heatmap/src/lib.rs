#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter controller and heatmap projection for civic issue reports.
//!
//! The heatmap view is split into an explicit state object and a pure
//! projection:
//!
//! * [`controller::FilterController`] owns a session's
//!   [`FilterState`](civic_map_heatmap_models::FilterState) and recomputes
//!   the rendered samples after every mutation.
//! * [`projection::project`] turns issue reports plus a filter state into
//!   weighted `[lat, lng, weight]` samples for the heat layer.
//!
//! Also provides the marker layer, the zone alerts panel, the base map
//! tile registry and a small built-in dataset.

pub mod alerts;
pub mod basemap_registry;
pub mod controller;
pub mod markers;
pub mod projection;
pub mod sample;

pub use controller::FilterController;
pub use projection::project;
