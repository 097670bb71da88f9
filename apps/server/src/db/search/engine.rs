//! Search implementation - query execution and result hydration
//!
//! The SearchEngine is responsible for:
//! - Running the page query built from a [`FilterSpec`]
//! - Batch-loading stations, images and features for the page
//! - Loading a single property for detail views
//!
//! A search page costs at most four round trips regardless of page size.

use crate::db::search::{filter, params, query_builder};
use sqlx::PgPool;

pub use filter::FilterSpec;
pub use params::SearchParameters;
pub use query_builder::QueryBuilder;

mod api;
mod execute;
mod hydrate;

/// Search engine executes property searches against the database
#[derive(Clone)]
pub struct SearchEngine {
    db_pool: PgPool,
}
