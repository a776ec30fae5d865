use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

pub mod catalog;
pub mod export;
pub mod location;
pub mod movies;
pub mod state;

pub use state::AppState;

pub(crate) fn default_page() -> u32 {
    1
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/movies/search", get(movies::search))
        .route("/movies/discover", get(movies::discover))
        .route("/movies/:tmdb_id", get(movies::details))
        .route("/movies/:tmdb_id/images", get(movies::images))
        .route("/configuration", get(movies::configuration))
        .route("/catalog", post(catalog::import).get(catalog::list))
        .route("/catalog/export/csv", get(export::csv))
        .route("/catalog/export/xlsx", get(export::xlsx))
        .route(
            "/catalog/:id",
            get(catalog::get).put(catalog::update).delete(catalog::delete),
        )
        .route("/weather", get(location::weather))
        .route("/geocode", get(location::geocode))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
