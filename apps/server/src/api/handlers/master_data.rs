//! Master data handlers (read-only reference lists)

use crate::{
    api::{handlers::query_items, response::ApiResponse},
    models::{BuildingType, Feature, FloorPlanType, Prefecture, RailwayLine, Station},
    state::AppState,
    Error, Result,
};
use axum::extract::{rejection::QueryRejection, Query, State};

type ItemsQuery = std::result::Result<Query<Vec<(String, String)>>, QueryRejection>;

pub async fn list_prefectures(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Prefecture>>> {
    Ok(ApiResponse::ok(state.master_data.prefectures().await?))
}

/// GET /api/railway-lines{?prefecture_id}
pub async fn list_railway_lines(
    State(state): State<AppState>,
    query: ItemsQuery,
) -> Result<ApiResponse<Vec<RailwayLine>>> {
    let prefecture_id = optional_id(&query_items(query)?, "prefecture_id")?;
    Ok(ApiResponse::ok(
        state.master_data.railway_lines(prefecture_id).await?,
    ))
}

/// GET /api/stations{?railway_line_id}
pub async fn list_stations(
    State(state): State<AppState>,
    query: ItemsQuery,
) -> Result<ApiResponse<Vec<Station>>> {
    let railway_line_id = optional_id(&query_items(query)?, "railway_line_id")?;
    Ok(ApiResponse::ok(
        state.master_data.stations(railway_line_id).await?,
    ))
}

pub async fn list_floor_plan_types(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<FloorPlanType>>> {
    Ok(ApiResponse::ok(state.master_data.floor_plan_types().await?))
}

pub async fn list_building_types(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<BuildingType>>> {
    Ok(ApiResponse::ok(state.master_data.building_types().await?))
}

pub async fn list_features(State(state): State<AppState>) -> Result<ApiResponse<Vec<Feature>>> {
    Ok(ApiResponse::ok(state.master_data.features().await?))
}

/// Last non-blank value of `key` as an id.
fn optional_id(items: &[(String, String)], key: &str) -> Result<Option<i32>> {
    let Some(raw) = items
        .iter()
        .rev()
        .find(|(k, v)| k == key && !v.trim().is_empty())
        .map(|(_, v)| v.trim())
    else {
        return Ok(None);
    };
    raw.parse::<i32>()
        .map(Some)
        .map_err(|_| Error::Validation(format!("Invalid {key} value: {raw}")))
}
