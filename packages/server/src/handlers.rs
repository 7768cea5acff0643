//! HTTP handler functions for the subsidence map API.

use actix_web::{HttpResponse, web};
use subsidence_map_dashboard::{ExplanationPanel, MapLayer, selection};
use subsidence_map_server_models::{
    ApiHealth, ExplanationQueryParams, ExplanationResponse, MapQueryParams, MapResponse,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        region_count: state.datasets.regions().len(),
    })
}

/// `GET /api/view`
///
/// Returns the initial map center and zoom.
pub async fn view(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.view)
}

/// `GET /api/districts`
///
/// Lists district names for the first dropdown, sorted.
pub async fn districts(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.datasets.districts())
}

/// `GET /api/districts/{district}/subdistricts`
///
/// Lists sub-district names of one district for the second dropdown.
/// Unknown districts return an empty list.
pub async fn subdistricts(
    state: web::Data<AppState>,
    district: web::Path<String>,
) -> HttpResponse {
    HttpResponse::Ok().json(state.datasets.subdistricts(&district))
}

/// `GET /api/map`
///
/// Returns every region as a styled `GeoJSON` feature. The dropdown pair
/// in the query decides which region is drawn as selected.
pub async fn map(
    state: web::Data<AppState>,
    params: web::Query<MapQueryParams>,
) -> HttpResponse {
    let highlighted = params.dropdown().key();
    let layer = MapLayer::build(state.datasets, highlighted.as_ref());

    HttpResponse::Ok().json(MapResponse::from(layer))
}

/// `GET /api/explanation`
///
/// Resolves the dropdown pair and the optional click, then returns the
/// explanation panel for the active region.
pub async fn explanation(
    state: web::Data<AppState>,
    params: web::Query<ExplanationQueryParams>,
) -> HttpResponse {
    let clicked = params
        .click()
        .and_then(|click| click.resolve(&state.region_index));
    let active = selection::resolve(&params.dropdown(), clicked);

    log::debug!(
        "Resolved selection: highlighted={:?} explained={:?}",
        active.highlighted,
        active.explained
    );

    let panel = ExplanationPanel::build(state.datasets, active.explained.as_ref());

    HttpResponse::Ok().json(ExplanationResponse {
        selection: active,
        panel,
    })
}
