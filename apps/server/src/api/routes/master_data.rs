//! Master data API Routes

use crate::api::handlers::master_data;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn master_data_routes() -> Router<AppState> {
    Router::new()
        .route("/prefectures", get(master_data::list_prefectures))
        .route("/railway-lines", get(master_data::list_railway_lines))
        .route("/stations", get(master_data::list_stations))
        .route("/floor-plans", get(master_data::list_floor_plan_types))
        .route("/building-types", get(master_data::list_building_types))
        .route("/features", get(master_data::list_features))
}
