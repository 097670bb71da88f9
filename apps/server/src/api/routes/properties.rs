//! Property API Routes
//!
//! Both `/api/properties` and `/api/properties/` are served directly.

use crate::api::handlers::properties;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn property_routes() -> Router<AppState> {
    Router::new()
        .route("/properties", get(properties::search_properties))
        .route("/properties/", get(properties::search_properties))
        .route("/properties/:id", get(properties::get_property))
}
