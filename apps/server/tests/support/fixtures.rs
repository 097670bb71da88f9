use anyhow::Context as _;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

/// Ids seeded by `schema.sql`.
pub mod seed {
    pub const CORP_A: i32 = 1;
    pub const CORP_B: i32 = 2;
    pub const INDIVIDUAL: i32 = 3;

    pub const TOKYO: i32 = 13;
    pub const KANAGAWA: i32 = 14;

    pub const YAMANOTE: i32 = 1;
    pub const CHUO: i32 = 2;
    pub const TOYOKO: i32 = 3;

    pub const SHIBUYA: i32 = 101;
    pub const SHINJUKU: i32 = 102;
    pub const NAKANO: i32 = 201;
    pub const YOKOHAMA: i32 = 301;

    pub const PLAN_1K: i32 = 1;
    pub const PLAN_1LDK: i32 = 2;

    pub const MANSION: i32 = 1;
    pub const APARTMENT: i32 = 2;

    pub const AUTOLOCK: i32 = 1;
    pub const PETS_OK: i32 = 2;
    pub const DELIVERY_BOX: i32 = 3;
}

/// Builder for a property row plus its child rows.
#[derive(Debug, Clone)]
pub struct PropertyFixture {
    corporate_user_id: i32,
    title: String,
    description: Option<String>,
    prefecture_id: i32,
    building_type_id: i32,
    building_age: Option<i32>,
    floor_plan_type_id: i32,
    area: Decimal,
    rent: i32,
    is_published: bool,
    created_at: DateTime<Utc>,
    stations: Vec<(i32, i32, i32)>,
    images: Vec<(String, i32)>,
    features: Vec<i32>,
}

impl PropertyFixture {
    pub fn new(title: &str) -> Self {
        Self {
            corporate_user_id: seed::CORP_A,
            title: title.to_string(),
            description: None,
            prefecture_id: seed::TOKYO,
            building_type_id: seed::MANSION,
            building_age: Some(10),
            floor_plan_type_id: seed::PLAN_1K,
            area: Decimal::new(2500, 2),
            rent: 80_000,
            is_published: true,
            created_at: base_time(),
            stations: Vec::new(),
            images: Vec::new(),
            features: Vec::new(),
        }
    }

    pub fn owner(mut self, corporate_user_id: i32) -> Self {
        self.corporate_user_id = corporate_user_id;
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn prefecture(mut self, prefecture_id: i32) -> Self {
        self.prefecture_id = prefecture_id;
        self
    }

    pub fn building_type(mut self, building_type_id: i32) -> Self {
        self.building_type_id = building_type_id;
        self
    }

    pub fn building_age(mut self, building_age: Option<i32>) -> Self {
        self.building_age = building_age;
        self
    }

    pub fn floor_plan(mut self, floor_plan_type_id: i32) -> Self {
        self.floor_plan_type_id = floor_plan_type_id;
        self
    }

    pub fn area(mut self, area: Decimal) -> Self {
        self.area = area;
        self
    }

    pub fn rent(mut self, rent: i32) -> Self {
        self.rent = rent;
        self
    }

    pub fn unpublished(mut self) -> Self {
        self.is_published = false;
        self
    }

    /// Created `minutes` after the shared base time.
    pub fn created_minutes_after_base(mut self, minutes: i64) -> Self {
        self.created_at = base_time() + Duration::minutes(minutes);
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn station(mut self, station_id: i32, walking_minutes: i32, display_order: i32) -> Self {
        self.stations.push((station_id, walking_minutes, display_order));
        self
    }

    pub fn image(mut self, image_url: &str, display_order: i32) -> Self {
        self.images.push((image_url.to_string(), display_order));
        self
    }

    pub fn feature(mut self, feature_id: i32) -> Self {
        self.features.push(feature_id);
        self
    }

    /// Insert the property and its children; returns the new id.
    pub async fn insert(self, pool: &PgPool) -> anyhow::Result<i32> {
        let mut tx = pool.begin().await.context("begin fixture tx")?;

        let id: i32 = sqlx::query_scalar(
            "INSERT INTO properties (corporate_user_id, title, description, prefecture_id, \
             address, building_type_id, building_age, floor_plan_type_id, area, rent, \
             management_fee, deposit, key_money, is_published, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, '東京都渋谷区1-2-3', $5, $6, $7, $8, $9, 5000, $9, 0, $10, $11, $11) \
             RETURNING id",
        )
        .bind(self.corporate_user_id)
        .bind(&self.title)
        .bind(&self.description)
        .bind(self.prefecture_id)
        .bind(self.building_type_id)
        .bind(self.building_age)
        .bind(self.floor_plan_type_id)
        .bind(self.area)
        .bind(self.rent)
        .bind(self.is_published)
        .bind(self.created_at)
        .fetch_one(&mut *tx)
        .await
        .context("insert property")?;

        for (station_id, walking_minutes, display_order) in &self.stations {
            sqlx::query(
                "INSERT INTO property_stations (property_id, station_id, walking_minutes, display_order) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(station_id)
            .bind(walking_minutes)
            .bind(display_order)
            .execute(&mut *tx)
            .await
            .context("insert property station")?;
        }

        for (image_url, display_order) in &self.images {
            sqlx::query(
                "INSERT INTO property_images (property_id, image_url, display_order) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(image_url)
            .bind(display_order)
            .execute(&mut *tx)
            .await
            .context("insert property image")?;
        }

        for feature_id in &self.features {
            sqlx::query(
                "INSERT INTO property_property_features (property_id, feature_id) VALUES ($1, $2)",
            )
            .bind(id)
            .bind(feature_id)
            .execute(&mut *tx)
            .await
            .context("insert property feature")?;
        }

        tx.commit().await.context("commit fixture tx")?;
        Ok(id)
    }
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Insert `count` published properties with identical sort keys.
pub async fn insert_identical(pool: &PgPool, count: usize) -> anyhow::Result<Vec<i32>> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        ids.push(
            PropertyFixture::new(&format!("同条件物件 {i}"))
                .insert(pool)
                .await?,
        );
    }
    Ok(ids)
}
