//! Read-side storage traits

use crate::{
    db::search::{SearchEngine, SearchParameters},
    models::{Property, PropertyPage},
    Result,
};
use async_trait::async_trait;

/// Read access to property listings.
///
/// The service layer depends on this trait rather than on Postgres, so
/// visibility and error-translation rules can be exercised without a database.
#[async_trait]
pub trait PropertyReader: Send + Sync {
    /// One page of published properties matching `params`, hydrated.
    async fn search(&self, params: &SearchParameters) -> Result<PropertyPage>;

    /// A single property by id, hydrated, regardless of its published flag.
    ///
    /// # Returns
    /// * `Ok(None)` - No property with this id
    async fn find_by_id(&self, id: i32) -> Result<Option<Property>>;
}

#[async_trait]
impl PropertyReader for SearchEngine {
    async fn search(&self, params: &SearchParameters) -> Result<PropertyPage> {
        SearchEngine::search(self, params).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Property>> {
        SearchEngine::find_by_id(self, id).await
    }
}
