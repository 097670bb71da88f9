//! Request handlers for API endpoints
//!
//! Handlers coordinate between routes and services, handling:
//! - Request extraction
//! - Service invocation
//! - Response envelopes

pub mod master_data;
pub mod metrics;
pub mod properties;

pub use master_data::*;
pub use metrics::*;
pub use properties::*;

use axum::extract::{rejection::QueryRejection, Query};

/// Ordered query items, with a malformed query string reported as a validation error.
pub(crate) fn query_items(
    query: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> crate::Result<Vec<(String, String)>> {
    query
        .map(|Query(items)| items)
        .map_err(|e| crate::Error::Validation(format!("Invalid query string: {e}")))
}
