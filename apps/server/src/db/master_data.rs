//! Master data repository - read-only reference tables

use crate::metrics::QueryTimer;
use crate::models::{BuildingType, Feature, FloorPlanType, Prefecture, RailwayLine, Station};
use crate::Result;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};

/// Repository for master data lookups
#[derive(Clone)]
pub struct MasterDataRepository {
    pool: PgPool,
}

impl MasterDataRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn prefectures(&self) -> Result<Vec<Prefecture>> {
        self.fetch::<Prefecture>("SELECT id, name FROM prefectures ORDER BY id", None).await
    }

    /// Railway lines by prefecture then name, optionally restricted to one
    /// prefecture.
    pub async fn railway_lines(&self, prefecture_id: Option<i32>) -> Result<Vec<RailwayLine>> {
        let sql = match prefecture_id {
            Some(_) => {
                "SELECT rl.id, rl.name, rl.prefecture_id, p.name AS prefecture_name \
                 FROM railway_lines rl JOIN prefectures p ON rl.prefecture_id = p.id \
                 WHERE rl.prefecture_id = $1 ORDER BY rl.name, rl.id"
            }
            None => {
                "SELECT rl.id, rl.name, rl.prefecture_id, p.name AS prefecture_name \
                 FROM railway_lines rl JOIN prefectures p ON rl.prefecture_id = p.id \
                 ORDER BY rl.prefecture_id, rl.name, rl.id"
            }
        };
        self.fetch::<RailwayLine>(sql, prefecture_id).await
    }

    /// Stations by line then name, optionally restricted to one line.
    pub async fn stations(&self, railway_line_id: Option<i32>) -> Result<Vec<Station>> {
        let sql = match railway_line_id {
            Some(_) => {
                "SELECT s.id, s.name, s.railway_line_id, rl.name AS railway_line_name \
                 FROM stations s JOIN railway_lines rl ON s.railway_line_id = rl.id \
                 WHERE s.railway_line_id = $1 ORDER BY s.name, s.id"
            }
            None => {
                "SELECT s.id, s.name, s.railway_line_id, rl.name AS railway_line_name \
                 FROM stations s JOIN railway_lines rl ON s.railway_line_id = rl.id \
                 ORDER BY s.railway_line_id, s.name, s.id"
            }
        };
        self.fetch::<Station>(sql, railway_line_id).await
    }

    pub async fn floor_plan_types(&self) -> Result<Vec<FloorPlanType>> {
        self.fetch::<FloorPlanType>(
            "SELECT id, name, display_order FROM floor_plan_types ORDER BY display_order, id",
            None,
        )
        .await
    }

    pub async fn building_types(&self) -> Result<Vec<BuildingType>> {
        self.fetch::<BuildingType>("SELECT id, name FROM building_types ORDER BY name, id", None)
            .await
    }

    pub async fn features(&self) -> Result<Vec<Feature>> {
        self.fetch::<Feature>(
            "SELECT id, name, description FROM property_features ORDER BY name, id",
            None,
        )
        .await
    }

    async fn fetch<R>(&self, sql: &str, filter: Option<i32>) -> Result<Vec<R>>
    where
        R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut query = sqlx::query_as::<_, R>(sql);
        if let Some(id) = filter {
            query = query.bind(id);
        }

        let timer = QueryTimer::start("master");
        let result = query.fetch_all(&self.pool).await;
        timer.finish(&result);
        Ok(result?)
    }
}
