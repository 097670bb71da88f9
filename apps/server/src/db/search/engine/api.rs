use super::{FilterSpec, QueryBuilder, SearchEngine, SearchParameters};
use crate::models::{Property, PropertyPage};
use crate::Result;
use sqlx::PgPool;

impl SearchEngine {
    /// Create a new search engine.
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Search published properties.
    ///
    /// An empty page past the first one says nothing about the total, so
    /// that case issues a count-only query instead.
    pub async fn search(&self, params: &SearchParameters) -> Result<PropertyPage> {
        let mut conn = self
            .db_pool
            .acquire()
            .await
            .map_err(crate::Error::Database)?;

        let spec = FilterSpec::from_params(params);
        let query = QueryBuilder::new(&spec);

        let (mut properties, window_total) = self.execute_search(&mut conn, &query).await?;

        let total = match window_total {
            Some(total) => total,
            None if spec.offset > 0 => self.count_total(&mut conn, &query).await?,
            None => 0,
        };

        self.hydrate(&mut conn, &mut properties).await?;

        tracing::debug!(
            total,
            returned = properties.len(),
            page = params.page,
            sort_by = params.sort_by.as_str(),
            "Property search complete"
        );

        Ok(PropertyPage::assemble(
            properties,
            total,
            params.page,
            params.limit,
        ))
    }

    /// Load one property with its child collections, whether or not it is
    /// published.
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Property>> {
        let mut conn = self
            .db_pool
            .acquire()
            .await
            .map_err(crate::Error::Database)?;

        let Some(property) = self.fetch_property_row(&mut conn, id).await? else {
            return Ok(None);
        };

        let mut properties = [property];
        self.hydrate(&mut conn, &mut properties).await?;
        let [property] = properties;
        Ok(Some(property))
    }
}
