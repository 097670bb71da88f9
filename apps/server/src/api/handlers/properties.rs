//! Property handlers
//!
//! - GET /api/properties{?params}
//! - GET /api/properties/{id}

use crate::{
    api::{handlers::query_items, response::ApiResponse},
    auth::OptionalViewer,
    models::{Property, PropertyPage},
    state::AppState,
    Result,
};
use axum::extract::{rejection::QueryRejection, Path, Query, State};

/// Search published properties.
pub async fn search_properties(
    State(state): State<AppState>,
    query: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<ApiResponse<PropertyPage>> {
    let items = query_items(query)?;
    let page = state.property_service.search_properties(&items).await?;
    Ok(ApiResponse::ok(page))
}

/// Property detail. Unpublished listings are visible to their owner only.
pub async fn get_property(
    State(state): State<AppState>,
    OptionalViewer(viewer): OptionalViewer,
    Path(id): Path<String>,
) -> Result<ApiResponse<Property>> {
    let property = state
        .property_service
        .get_property_by_id(&id, viewer)
        .await?;
    Ok(ApiResponse::ok(property))
}
