//! Property service - search and detail retrieval
//!
//! Orchestrates property reads by:
//! - Decoding and validating request parameters before any query runs
//! - Delegating to the property reader
//! - Applying detail visibility (published, or viewed by the owning company)
//! - Translating store failures into a generic server error

use crate::{
    config::SearchConfig,
    db::{search::SearchParameters, PropertyReader},
    metrics::{
        PROPERTY_OPERATIONS_TOTAL, PROPERTY_OPERATION_DURATION_SECONDS, PROPERTY_SEARCH_RESULTS,
    },
    models::{Property, PropertyPage, Viewer},
    Error, Result,
};
use std::sync::Arc;
use std::time::Instant;

/// Property service coordinates search and detail operations
#[derive(Clone)]
pub struct PropertyService {
    reader: Arc<dyn PropertyReader>,
    search_config: SearchConfig,
}

impl PropertyService {
    pub fn new(reader: Arc<dyn PropertyReader>, search_config: SearchConfig) -> Self {
        Self {
            reader,
            search_config,
        }
    }

    /// Search published properties from raw query items.
    ///
    /// GET /api/properties?params
    pub async fn search_properties(
        &self,
        query_items: &[(String, String)],
    ) -> Result<PropertyPage> {
        let params = SearchParameters::from_items(query_items, &self.search_config)?;
        self.search(&params).await
    }

    /// Search published properties with already-decoded parameters.
    pub async fn search(&self, params: &SearchParameters) -> Result<PropertyPage> {
        params.validate(&self.search_config)?;

        let started = Instant::now();
        let result = self
            .reader
            .search(params)
            .await
            .map_err(|e| store_failure("search", e));
        record("search", started, &result);

        if let Ok(page) = &result {
            PROPERTY_SEARCH_RESULTS
                .with_label_values(&[params.sort_by.as_str()])
                .observe(page.properties.len() as f64);
        }
        result
    }

    /// Fetch one property for the detail view.
    ///
    /// Unpublished properties are only visible to the corporate user who
    /// listed them. Everyone else gets the same not-found as for a missing id.
    ///
    /// GET /api/properties/{id}
    pub async fn get_property_by_id(
        &self,
        raw_id: &str,
        viewer: Option<Viewer>,
    ) -> Result<Property> {
        let id = parse_property_id(raw_id)?;

        let started = Instant::now();
        let result = self
            .reader
            .find_by_id(id)
            .await
            .map_err(|e| store_failure("detail", e))
            .and_then(|found| visible_to(found, viewer));
        record("detail", started, &result);
        result
    }
}

fn parse_property_id(raw: &str) -> Result<i32> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| Error::Validation("Invalid property ID".to_string()))
}

fn visible_to(found: Option<Property>, viewer: Option<Viewer>) -> Result<Property> {
    match found {
        Some(property)
            if property.is_published
                || viewer.is_some_and(|v| v.owns(property.corporate_user_id)) =>
        {
            Ok(property)
        }
        Some(property) => {
            tracing::debug!(property_id = property.id, "Unpublished property hidden from viewer");
            Err(Error::NotFound("Property".to_string()))
        }
        None => Err(Error::NotFound("Property".to_string())),
    }
}

/// Store failures surface as a generic server error; the cause is logged here.
fn store_failure(operation: &'static str, err: Error) -> Error {
    match err {
        Error::Validation(_) | Error::NotFound(_) | Error::Unauthorized(_) => err,
        other => {
            tracing::error!(operation, error = %other, "Property store failure");
            Error::Internal(format!("{operation} failed"))
        }
    }
}

fn record<T>(operation: &'static str, started: Instant, result: &Result<T>) {
    let status = match result {
        Ok(_) => "success",
        Err(Error::NotFound(_)) => "not_found",
        Err(Error::Validation(_)) => "invalid",
        Err(_) => "error",
    };
    PROPERTY_OPERATIONS_TOTAL
        .with_label_values(&[operation, status])
        .inc();
    PROPERTY_OPERATION_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(started.elapsed().as_secs_f64());
}
