use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Filter selections
        .route("/filters", get(handlers::get_filters))
        .route("/filters/mode", put(handlers::set_mode))
        .route("/filters/usernames/:index", put(handlers::set_username))
        .route("/filters/exclude-watchlist", put(handlers::set_exclude_watchlist))
        .route("/filters/popularity", post(handlers::toggle_popularity))
        .route("/filters/genres", post(handlers::toggle_genre))
        .route("/genres", get(handlers::list_genres))
        .route("/popularity", get(handlers::list_popularity))
        // Request lifecycle
        .route("/submit", post(handlers::submit))
        .route("/status", get(handlers::get_status))
}
