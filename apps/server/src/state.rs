//! Shared application state

use crate::{
    auth::AuthManager,
    config::{Config, DatabaseConfig},
    db::{MasterDataRepository, SearchEngine, UserRepository},
    services::PropertyService,
};
use anyhow::Context;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Executor;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: PgPool,
    pub property_service: Arc<PropertyService>,
    pub master_data: MasterDataRepository,
    pub users: UserRepository,
    pub auth: AuthManager,
}

impl AppState {
    /// Connect to the database and wire up services.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = create_pool(&config.database, &config.database.url).await?;
        Self::with_pool(config, db_pool)
    }

    /// Wire up services over an existing pool.
    pub fn with_pool(config: Config, db_pool: PgPool) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let search_engine = Arc::new(SearchEngine::new(db_pool.clone()));
        let property_service = Arc::new(PropertyService::new(
            search_engine,
            config.search.clone(),
        ));
        let auth = AuthManager::new(config.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize auth: {e:?}"))?;

        Ok(Self {
            master_data: MasterDataRepository::new(db_pool.clone()),
            users: UserRepository::new(db_pool.clone()),
            property_service,
            auth,
            db_pool,
            config,
        })
    }
}

/// Build a connection pool. Every connection gets the configured statement
/// timeout.
pub async fn create_pool(database: &DatabaseConfig, url: &str) -> anyhow::Result<PgPool> {
    let statement_timeout = database.statement_timeout_seconds;

    let pool = PgPoolOptions::new()
        .min_connections(database.pool_min_size)
        .max_connections(database.pool_max_size)
        .acquire_timeout(Duration::from_secs(database.pool_timeout_seconds))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                if statement_timeout > 0 {
                    conn.execute(
                        format!("SET statement_timeout = '{statement_timeout}s'").as_str(),
                    )
                    .await?;
                }
                Ok(())
            })
        })
        .connect(url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = database.pool_max_size,
        statement_timeout_seconds = statement_timeout,
        "Database pool ready"
    );

    Ok(pool)
}
