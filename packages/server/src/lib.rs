#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the civic issue map.
//!
//! Serves the heatmap projection, issue markers, zone alerts, base map
//! tile sources and place search as JSON for the map frontend. Every
//! heatmap request builds its own filter session from the query string.
//! Place searches that name a `session` share one map session, so a newer
//! search from the same client supersedes an older one still in flight.

mod handlers;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use chrono::Utc;
use civic_map_geocoder::lookup::{NominatimResolver, PlaceLookup, PlaceResolver};
use civic_map_geocoder::service_registry;
use civic_map_geocoder::session::MapSession;
use civic_map_heatmap::FilterController;
use civic_map_heatmap::sample::sample_issues;
use civic_map_issue_models::IssueReport;

use crate::session::{SessionStore, SharedSession};

/// Maximum number of place search sessions kept in memory.
pub const MAX_SESSIONS: usize = 1024;

/// Shared application state.
pub struct AppState {
    /// Issue reports, loaded once at startup.
    pub issues: Arc<[IssueReport]>,
    /// Place search client.
    pub resolver: Arc<dyn PlaceResolver>,
    /// Per-lookup timeout.
    pub geocode_timeout: Duration,
    /// Named place search sessions.
    pub sessions: SessionStore,
}

impl AppState {
    /// Creates state with an empty session store.
    #[must_use]
    pub fn new(
        issues: Arc<[IssueReport]>,
        resolver: Arc<dyn PlaceResolver>,
        geocode_timeout: Duration,
    ) -> Self {
        Self {
            issues,
            resolver,
            geocode_timeout,
            sessions: SessionStore::new(MAX_SESSIONS),
        }
    }

    /// Starts a fresh map session over the issue list.
    #[must_use]
    pub fn new_session(&self) -> SharedSession {
        Arc::new(MapSession::new(
            FilterController::new(Arc::clone(&self.issues)),
            PlaceLookup::new(Arc::clone(&self.resolver), self.geocode_timeout),
        ))
    }

    /// Returns the session named `id`, or a throwaway one if `id` is absent.
    #[must_use]
    pub fn session(&self, id: Option<&str>) -> SharedSession {
        match id {
            Some(id) => self.sessions.get_or_insert_with(id, || self.new_session()),
            None => self.new_session(),
        }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/categories", web::get().to(handlers::categories))
            .route("/heatmap", web::get().to(handlers::heatmap))
            .route("/markers", web::get().to(handlers::markers))
            .route("/alerts", web::get().to(handlers::alerts))
            .route("/basemaps", web::get().to(handlers::basemaps))
            .route("/geocode", web::get().to(handlers::geocode)),
    );
}

/// Starts the civic map API server.
///
/// Loads the issue dataset, configures the geocoding client from the
/// embedded service registry and starts the Actix-Web HTTP server on
/// `BIND_ADDR:PORT` (default `127.0.0.1:8080`). The caller is responsible
/// for providing the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if no geocoding service is
/// configured, the HTTP client cannot be built, or the HTTP server fails
/// to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Loading issue reports...");
    let issues: Arc<[IssueReport]> = sample_issues(Utc::now()).into();
    log::info!("Loaded {} issue reports", issues.len());

    let service = service_registry::primary_service().map_err(std::io::Error::other)?;
    log::info!(
        "Using geocoding service '{}' at {}",
        service.name,
        service.base_url()
    );
    let resolver = NominatimResolver::from_service(&service).map_err(std::io::Error::other)?;

    let state = web::Data::new(AppState::new(
        issues,
        Arc::new(resolver),
        service.timeout(),
    ));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};
    use async_trait::async_trait;
    use civic_map_geocoder::{GeocodeError, GeocodedPlace};

    /// Resolves every query to the same place.
    struct FixedPlace;

    #[async_trait]
    impl PlaceResolver for FixedPlace {
        async fn resolve(&self, _query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
            Ok(Some(GeocodedPlace {
                latitude: 18.5204,
                longitude: 73.8567,
                display_name: Some("Pune, Maharashtra, India".to_string()),
            }))
        }
    }

    struct RateLimited;

    #[async_trait]
    impl PlaceResolver for RateLimited {
        async fn resolve(&self, _query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
            Err(GeocodeError::RateLimited)
        }
    }

    struct NeverAnswers;

    #[async_trait]
    impl PlaceResolver for NeverAnswers {
        async fn resolve(&self, _query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
            std::future::pending().await
        }
    }

    /// Answers "Pune" slowly and anything else at once.
    struct SlowPune;

    #[async_trait]
    impl PlaceResolver for SlowPune {
        async fn resolve(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
            let (latitude, longitude) = if query == "Pune" {
                tokio::time::sleep(Duration::from_millis(300)).await;
                (18.5204, 73.8567)
            } else {
                (19.0760, 72.8777)
            };
            Ok(Some(GeocodedPlace {
                latitude,
                longitude,
                display_name: Some(query.to_string()),
            }))
        }
    }

    fn state_with(resolver: Arc<dyn PlaceResolver>, timeout: Duration) -> web::Data<AppState> {
        web::Data::new(AppState::new(
            sample_issues(Utc::now()).into(),
            resolver,
            timeout,
        ))
    }

    fn state() -> web::Data<AppState> {
        state_with(Arc::new(FixedPlace), Duration::from_secs(1))
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn heatmap_defaults_to_last_day() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/heatmap").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["window"], "24h");
        // Pothole, water leak and garbage are all under 24h old.
        assert_eq!(body["samples"].as_array().unwrap().len(), 3);
        assert_eq!(body["options"]["radius"], 25);
        assert!(body.get("from").is_none());
    }

    #[actix_web::test]
    async fn heatmap_applies_filters() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/heatmap?window=30d&categories=water&intensity=0.5")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let samples = body["samples"].as_array().unwrap();
        assert_eq!(samples.len(), 1);
        let weight = samples[0][2].as_f64().unwrap();
        assert!((weight - 0.4).abs() < 1e-9);
        assert_eq!(body["categories"], serde_json::json!(["water"]));
    }

    #[actix_web::test]
    async fn heatmap_echoes_custom_range() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/heatmap?window=custom&from=2025-01-01T00:00:00Z&to=2025-01-31T00:00:00Z")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["window"], "custom");
        assert_eq!(body["from"], "2025-01-01T00:00:00Z");
        assert_eq!(body["to"], "2025-01-31T00:00:00Z");
    }

    #[actix_web::test]
    async fn heatmap_rejects_range_without_custom_window() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/heatmap?window=7d&from=2025-01-01T00:00:00Z")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn heatmap_rejects_unknown_window() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/heatmap?window=forever")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn markers_cover_every_issue() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/markers").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 5);
        assert_eq!(body[0]["color"], "#ef4444");
    }

    #[actix_web::test]
    async fn basemaps_list_street_first() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/basemaps").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["layer"], "street");
        assert_eq!(body[0]["default"], true);
        assert_eq!(body[1]["layer"], "satellite");
    }

    #[actix_web::test]
    async fn basemaps_filter_by_layer() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/basemaps?layer=satellite")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let layers = body.as_array().unwrap();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0]["layer"], "satellite");
        assert_eq!(layers[0]["default"], false);

        let req = test::TestRequest::get()
            .uri("/api/basemaps?layer=terrain")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn blank_search_is_not_found() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/geocode?q=%20%20")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn search_returns_place_at_default_zoom() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/geocode?q=Pune").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!((body["latitude"].as_f64().unwrap() - 18.5204).abs() < 1e-9);
        assert!((body["longitude"].as_f64().unwrap() - 73.8567).abs() < 1e-9);
        assert_eq!(body["zoom"], 13);
        assert_eq!(body["displayName"], "Pune, Maharashtra, India");
    }

    #[actix_web::test]
    async fn upstream_error_is_bad_gateway() {
        let data = state_with(Arc::new(RateLimited), Duration::from_secs(1));
        let app = test::init_service(App::new().app_data(data).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/geocode?q=Pune").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("Rate limit exceeded"));
    }

    #[actix_web::test]
    async fn slow_upstream_is_gateway_timeout() {
        let data = state_with(Arc::new(NeverAnswers), Duration::from_millis(50));
        let app = test::init_service(App::new().app_data(data).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/geocode?q=Pune").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("50ms"));
    }

    #[actix_web::test]
    async fn newer_search_in_same_session_supersedes_older() {
        let data = state_with(Arc::new(SlowPune), Duration::from_secs(5));
        let app = test::init_service(App::new().app_data(data).configure(configure)).await;

        let pune = test::TestRequest::get()
            .uri("/api/geocode?q=Pune&session=tab-1")
            .to_request();
        let mumbai = test::TestRequest::get()
            .uri("/api/geocode?q=Mumbai&session=tab-1")
            .to_request();

        let (pune_resp, mumbai_resp) = tokio::join!(test::call_service(&app, pune), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            test::call_service(&app, mumbai).await
        });

        assert_eq!(pune_resp.status(), StatusCode::CONFLICT);
        assert_eq!(mumbai_resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(mumbai_resp).await;
        assert_eq!(body["displayName"], "Mumbai");
    }

    #[actix_web::test]
    async fn searches_without_session_do_not_interfere() {
        let data = state_with(Arc::new(SlowPune), Duration::from_secs(5));
        let app = test::init_service(App::new().app_data(data).configure(configure)).await;

        let pune = test::TestRequest::get().uri("/api/geocode?q=Pune").to_request();
        let mumbai = test::TestRequest::get().uri("/api/geocode?q=Mumbai").to_request();

        let (pune_resp, mumbai_resp) = tokio::join!(test::call_service(&app, pune), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            test::call_service(&app, mumbai).await
        });

        assert_eq!(pune_resp.status(), StatusCode::OK);
        assert_eq!(mumbai_resp.status(), StatusCode::OK);
    }
}
