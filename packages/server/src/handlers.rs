//! HTTP handler functions for the civic map API.

use actix_web::{HttpResponse, web};
use civic_map_geocoder::GeocodeError;
use civic_map_geocoder::lookup::LookupOutcome;
use civic_map_heatmap::{alerts, basemap_registry, markers};
use civic_map_heatmap_models::{DEFAULT_ZOOM, HeatLayerOptions, TimeWindow};
use civic_map_issue_models::IssueCategory;
use civic_map_server_models::{
    ApiBaseLayer, ApiCategory, ApiError, ApiHealth, ApiPlace, BasemapQueryParams,
    GeocodeQueryParams, HeatmapQueryParams, HeatmapResponse,
};

use crate::AppState;
use crate::session::controller_from_params;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/categories`
///
/// Returns the issue categories with their layer labels.
pub async fn categories() -> HttpResponse {
    let categories: Vec<ApiCategory> = IssueCategory::all()
        .iter()
        .map(|cat| ApiCategory {
            name: *cat,
            label: cat.label().to_string(),
        })
        .collect();

    HttpResponse::Ok().json(categories)
}

/// `GET /api/heatmap`
///
/// Projects the issue reports through the filters given in the query
/// string. Each request is an independent view session.
pub async fn heatmap(
    state: web::Data<AppState>,
    params: web::Query<HeatmapQueryParams>,
) -> HttpResponse {
    let controller = match controller_from_params(state.issues.clone(), &params) {
        Ok(controller) => controller,
        Err(e) => {
            log::debug!("Rejected heatmap query: {e}");
            return HttpResponse::BadRequest().json(ApiError {
                error: e.to_string(),
            });
        }
    };

    let filters = controller.state();
    let (from, to) = match filters.time_window() {
        TimeWindow::Custom(range) => (Some(range.from()), Some(range.to())),
        _ => (None, None),
    };

    HttpResponse::Ok().json(HeatmapResponse {
        samples: controller
            .samples()
            .iter()
            .map(civic_map_heatmap_models::RenderedSample::as_triple)
            .collect(),
        window: filters.time_window().key().to_string(),
        categories: filters.active_categories().iter().copied().collect(),
        from,
        to,
        intensity: filters.intensity_scale(),
        options: HeatLayerOptions::default(),
    })
}

/// `GET /api/markers`
///
/// Returns one marker per issue, unfiltered.
pub async fn markers(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(markers::markers(&state.issues))
}

/// `GET /api/alerts`
pub async fn alerts() -> HttpResponse {
    HttpResponse::Ok().json(alerts::zone_alerts())
}

/// `GET /api/basemaps`
///
/// Lists the base map tile sources for the layer control, optionally
/// restricted to one `layer`.
pub async fn basemaps(params: web::Query<BasemapQueryParams>) -> HttpResponse {
    let sources: Vec<_> = match params.layer {
        Some(layer) => basemap_registry::tile_source(layer).into_iter().collect(),
        None => basemap_registry::all_tile_sources(),
    };
    let layers: Vec<ApiBaseLayer> = sources.into_iter().map(ApiBaseLayer::from).collect();

    HttpResponse::Ok().json(layers)
}

/// `GET /api/geocode`
///
/// Resolves a place name to a map center. Upstream failures are reported
/// to the caller but never treated as server errors. With a `session`, a
/// search superseded by a newer one in the same session gets 409.
pub async fn geocode(
    state: web::Data<AppState>,
    params: web::Query<GeocodeQueryParams>,
) -> HttpResponse {
    let session = state.session(params.session.as_deref());

    match session.search(params.q.as_str()).await {
        LookupOutcome::Resolved(place) => HttpResponse::Ok().json(ApiPlace {
            latitude: place.latitude,
            longitude: place.longitude,
            zoom: DEFAULT_ZOOM,
            display_name: place.display_name,
        }),
        LookupOutcome::NotFound => HttpResponse::NotFound().json(ApiError {
            error: format!("No place found for '{}'", params.q.trim()),
        }),
        LookupOutcome::Failed(GeocodeError::Timeout { after_ms }) => {
            HttpResponse::GatewayTimeout().json(ApiError {
                error: format!("Place search timed out after {after_ms}ms"),
            })
        }
        LookupOutcome::Failed(e) => HttpResponse::BadGateway().json(ApiError {
            error: format!("Place search failed: {e}"),
        }),
        LookupOutcome::Stale { query } => HttpResponse::Conflict().json(ApiError {
            error: format!("Search for '{query}' was superseded"),
        }),
    }
}
