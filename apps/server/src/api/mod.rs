//! API layer - routes, handlers, and middleware

pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let max_body_size = state.config.server.max_request_body_size;
    let cors_origins = state.config.server.cors_origins.clone();
    let viewer_state = state.clone();

    let api_router = Router::new()
        .merge(routes::properties::property_routes())
        .merge(routes::master_data::master_data_routes())
        .layer(axum::middleware::from_fn_with_state(
            viewer_state,
            crate::auth::viewer_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(routes::metrics::metrics_routes())
        .nest("/api", api_router)
        .fallback(route_not_found)
        .with_state(state)
        // Applied in reverse order
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(axum::middleware::from_fn(middleware::metrics_middleware))
        .layer(middleware::compression())
        .layer(middleware::cors(&cors_origins))
        .layer(middleware::trace())
        .layer(DefaultBodyLimit::max(max_body_size))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "heya-server"
    }))
}

async fn route_not_found() -> crate::Error {
    crate::Error::NotFound("Route".to_string())
}
