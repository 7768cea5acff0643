#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the subsidence risk dashboard.
//!
//! Loads the four model-output datasets once at startup, builds the
//! region spatial index, and serves the JSON view models consumed by the
//! static presentation host in `app/dist`. Every request recomputes its
//! view from the shared read-only snapshot; selection state travels in
//! the query string and is never stored server-side.

mod handlers;
pub mod interactive;

use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, Scope, middleware, web};
use subsidence_map_dashboard::{DEFAULT_MAP_VIEW, MapView};
use subsidence_map_dataset::{DatasetPaths, Datasets};
use subsidence_map_spatial::RegionIndex;

/// Default directory of the presentation host.
pub const DEFAULT_STATIC_DIR: &str = "app/dist";

/// Shared application state.
pub struct AppState {
    /// Read-only dataset snapshot.
    pub datasets: &'static Datasets,
    /// Spatial index over the snapshot's regions.
    pub region_index: Arc<RegionIndex>,
    /// Initial map position.
    pub view: MapView,
}

impl AppState {
    /// Builds the state around a loaded snapshot.
    #[must_use]
    pub fn new(datasets: &'static Datasets) -> Self {
        Self {
            datasets,
            region_index: Arc::new(RegionIndex::build(datasets.regions())),
            view: DEFAULT_MAP_VIEW,
        }
    }
}

/// The `/api` routes.
#[must_use]
pub fn api_scope() -> Scope {
    web::scope("/api")
        .route("/health", web::get().to(handlers::health))
        .route("/view", web::get().to(handlers::view))
        .route("/districts", web::get().to(handlers::districts))
        .route(
            "/districts/{district}/subdistricts",
            web::get().to(handlers::subdistricts),
        )
        .route("/map", web::get().to(handlers::map))
        .route("/explanation", web::get().to(handlers::explanation))
}

/// Starts the subsidence map server.
///
/// Loads the datasets from `DATA_DIR`, builds the shared state, and
/// starts the Actix-Web HTTP server on `BIND_ADDR:PORT`. The caller
/// provides the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if any dataset fails to load, or
/// if the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let paths = DatasetPaths::from_env();
    let datasets = subsidence_map_dataset::init(&paths).map_err(|e| {
        log::error!("Failed to load datasets: {e}");
        std::io::Error::other(e.to_string())
    })?;

    log::info!("Building region spatial index...");
    let state = web::Data::new(AppState::new(datasets));

    let static_dir =
        std::env::var("STATIC_DIR").unwrap_or_else(|_| DEFAULT_STATIC_DIR.to_string());
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
            .service(api_scope())
            // Serve the presentation host
            .service(Files::new("/", &static_dir).index_file("index.html"))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
