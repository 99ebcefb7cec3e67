use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::routes;
use crate::state::AppState;

pub(crate) fn build_app(state: AppState) -> Router {
    let app = Router::new()
        .route("/api/lookup", axum::routing::get(routes::api::get_lookup))
        .route("/api/search", axum::routing::post(routes::api::post_search))
        .route("/api/load", axum::routing::post(routes::api::post_load))
        .route("/api/address", axum::routing::get(routes::api::get_address))
        .route("/api/events", axum::routing::get(routes::sse::lookup_events))
        .route("/api/health", axum::routing::get(routes::api::health))
        .route("/api/metrics", axum::routing::get(routes::api::metrics));

    // The display layer is served from elsewhere.
    app.layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
