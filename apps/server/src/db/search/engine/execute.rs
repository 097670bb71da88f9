use super::{query_builder, QueryBuilder, SearchEngine};
use crate::db::search::query_builder::BindValue;
use crate::metrics::QueryTimer;
use crate::models::Property;
use crate::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgArguments;
use sqlx::query::{Query, QueryScalar};
use sqlx::{PgConnection, Postgres};

/// Base row of a property, before child collections are attached.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct PropertyRow {
    id: i32,
    corporate_user_id: i32,
    title: String,
    description: Option<String>,
    prefecture_id: i32,
    prefecture_name: String,
    address: String,
    building_type_id: i32,
    building_type_name: String,
    building_name: Option<String>,
    building_age: Option<i32>,
    floor_number: Option<i32>,
    total_floors: Option<i32>,
    floor_plan_type_id: i32,
    floor_plan_type_name: String,
    area: Decimal,
    rent: i32,
    management_fee: i32,
    deposit: i32,
    key_money: i32,
    is_published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PropertyRow {
    pub(super) fn into_property(self) -> Property {
        Property {
            id: self.id,
            corporate_user_id: self.corporate_user_id,
            title: self.title,
            description: self.description,
            prefecture_id: self.prefecture_id,
            prefecture_name: self.prefecture_name,
            address: self.address,
            building_type_id: self.building_type_id,
            building_type_name: self.building_type_name,
            building_name: self.building_name,
            building_age: self.building_age,
            floor_number: self.floor_number,
            total_floors: self.total_floors,
            floor_plan_type_id: self.floor_plan_type_id,
            floor_plan_type_name: self.floor_plan_type_name,
            area: self.area,
            rent: self.rent,
            management_fee: self.management_fee,
            deposit: self.deposit,
            key_money: self.key_money,
            is_published: self.is_published,
            created_at: self.created_at,
            updated_at: self.updated_at,
            stations: Vec::new(),
            images: Vec::new(),
            features: Vec::new(),
        }
    }
}

/// Page query row: the property plus the window count over all matches.
#[derive(Debug, sqlx::FromRow)]
struct PageRow {
    #[sqlx(flatten)]
    property: PropertyRow,
    total_count: i64,
}

fn bind_query<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    bind_values: Vec<BindValue>,
) -> Query<'q, Postgres, PgArguments> {
    for value in bind_values {
        query = match value {
            BindValue::Int(v) => query.bind(v),
            BindValue::BigInt(v) => query.bind(v),
            BindValue::IntArray(vs) => query.bind(vs),
            BindValue::Decimal(v) => query.bind(v),
            BindValue::Text(v) => query.bind(v),
        };
    }
    query
}

fn bind_scalar<'q>(
    mut query: QueryScalar<'q, Postgres, i64, PgArguments>,
    bind_values: Vec<BindValue>,
) -> QueryScalar<'q, Postgres, i64, PgArguments> {
    for value in bind_values {
        query = match value {
            BindValue::Int(v) => query.bind(v),
            BindValue::BigInt(v) => query.bind(v),
            BindValue::IntArray(vs) => query.bind(vs),
            BindValue::Decimal(v) => query.bind(v),
            BindValue::Text(v) => query.bind(v),
        };
    }
    query
}

impl SearchEngine {
    /// Execute the page query.
    ///
    /// Returns the page rows and the total match count. The count comes from
    /// the window column, so it is `None` when the page is empty.
    pub(super) async fn execute_search(
        &self,
        conn: &mut PgConnection,
        query: &QueryBuilder<'_>,
    ) -> Result<(Vec<Property>, Option<i64>)> {
        let (sql, bind_values) = query.build_sql();
        tracing::debug!(sql = %sql, binds = bind_values.len(), "Executing property search");

        let timer = QueryTimer::start("search");
        let result = bind_query(sqlx::query(&sql), bind_values)
            .fetch_all(&mut *conn)
            .await;
        timer.finish(&result);
        let rows = result.map_err(crate::Error::Database)?;

        let mut total = None;
        let mut properties = Vec::with_capacity(rows.len());
        for row in &rows {
            let page_row: PageRow = sqlx::FromRow::from_row(row).map_err(crate::Error::Database)?;
            total.get_or_insert(page_row.total_count);
            properties.push(page_row.property.into_property());
        }

        Ok((properties, total))
    }

    pub(super) async fn count_total(
        &self,
        conn: &mut PgConnection,
        query: &QueryBuilder<'_>,
    ) -> Result<i64> {
        let (sql, bind_values) = query.build_count_sql();

        let timer = QueryTimer::start("count");
        let result = bind_scalar(sqlx::query_scalar::<_, i64>(&sql), bind_values)
            .fetch_one(&mut *conn)
            .await;
        timer.finish(&result);

        result.map_err(crate::Error::Database)
    }

    pub(super) async fn fetch_property_row(
        &self,
        conn: &mut PgConnection,
        id: i32,
    ) -> Result<Option<Property>> {
        let (sql, bind_values) = query_builder::build_detail_sql(id);

        let timer = QueryTimer::start("detail");
        let result = bind_query(sqlx::query(&sql), bind_values)
            .fetch_optional(&mut *conn)
            .await;
        timer.finish(&result);

        match result.map_err(crate::Error::Database)? {
            Some(row) => {
                let row: PropertyRow =
                    sqlx::FromRow::from_row(&row).map_err(crate::Error::Database)?;
                Ok(Some(row.into_property()))
            }
            None => Ok(None),
        }
    }
}
