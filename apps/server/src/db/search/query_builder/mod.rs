//! SQL query builder for property searches.
//!
//! Compiles a [`FilterSpec`] into PostgreSQL text plus positional bind values:
//! - the page query, annotated with `COUNT(*) OVER()` so one round trip yields
//!   both the rows and the total match count
//! - a count-only query with the same predicates
//! - the single-property detail query
//!
//! User input only ever reaches the database through bind values.

use super::filter::{FilterSpec, Predicate};
use super::params::SortBy;
use rust_decimal::Decimal;

mod bind;

use bind::{push_bigint, push_decimal, push_int, push_int_array, push_text};

/// Bind values for `sqlx` queries.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Int(i32),
    BigInt(i64),
    IntArray(Vec<i32>),
    Decimal(Decimal),
    Text(String),
}

const PROPERTY_COLUMNS: &str = "p.id, p.corporate_user_id, p.title, p.description, \
     p.prefecture_id, pref.name AS prefecture_name, p.address, \
     p.building_type_id, bt.name AS building_type_name, p.building_name, \
     p.building_age, p.floor_number, p.total_floors, \
     p.floor_plan_type_id, fpt.name AS floor_plan_type_name, \
     p.area, p.rent, p.management_fee, p.deposit, p.key_money, \
     p.is_published, p.created_at, p.updated_at";

const PROPERTY_JOINS: &str = "FROM properties p \
     JOIN prefectures pref ON p.prefecture_id = pref.id \
     JOIN building_types bt ON p.building_type_id = bt.id \
     JOIN floor_plan_types fpt ON p.floor_plan_type_id = fpt.id";

/// Query builder for property searches.
#[derive(Debug)]
pub struct QueryBuilder<'a> {
    spec: &'a FilterSpec,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(spec: &'a FilterSpec) -> Self {
        Self { spec }
    }

    /// Page query: matching rows with their display names, the overall match
    /// count in `total_count`, ordered and windowed.
    pub fn build_sql(&self) -> (String, Vec<BindValue>) {
        let mut bind_params = Vec::new();
        let mut sql = format!(
            "SELECT {PROPERTY_COLUMNS}, COUNT(*) OVER() AS total_count {PROPERTY_JOINS}"
        );

        self.push_where(&mut sql, &mut bind_params);
        sql.push_str(" ORDER BY ");
        sql.push_str(order_by(self.spec.sort_by));

        let limit_idx = push_bigint(&mut bind_params, i64::from(self.spec.limit));
        let offset_idx = push_bigint(&mut bind_params, self.spec.offset);
        sql.push_str(&format!(" LIMIT ${limit_idx} OFFSET ${offset_idx}"));

        (sql, bind_params)
    }

    /// Count of all rows matching the predicates.
    pub fn build_count_sql(&self) -> (String, Vec<BindValue>) {
        let mut bind_params = Vec::new();
        let mut sql = String::from("SELECT COUNT(*) FROM properties p");
        self.push_where(&mut sql, &mut bind_params);
        (sql, bind_params)
    }

    fn push_where(&self, sql: &mut String, bind_params: &mut Vec<BindValue>) {
        let clauses: Vec<String> = self
            .spec
            .predicates
            .iter()
            .map(|predicate| build_predicate_clause(predicate, bind_params))
            .collect();

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
    }
}

/// Detail query for one property, published or not. Visibility is decided
/// by the caller.
pub fn build_detail_sql(id: i32) -> (String, Vec<BindValue>) {
    let mut bind_params = Vec::new();
    let clause = build_predicate_clause(&Predicate::IdEquals(id), &mut bind_params);
    (
        format!("SELECT {PROPERTY_COLUMNS} {PROPERTY_JOINS} WHERE {clause}"),
        bind_params,
    )
}

/// Ordering for each sort mode. `p.id DESC` is the tie-break in every mode
/// so that consecutive pages never overlap or skip rows.
pub fn order_by(sort_by: SortBy) -> &'static str {
    match sort_by {
        SortBy::RentAsc => "p.rent ASC, p.id DESC",
        SortBy::RentDesc => "p.rent DESC, p.id DESC",
        SortBy::AreaDesc => "p.area DESC, p.id DESC",
        SortBy::CreatedAtDesc => "p.created_at DESC, p.id DESC",
    }
}

fn build_predicate_clause(predicate: &Predicate, bind_params: &mut Vec<BindValue>) -> String {
    match predicate {
        Predicate::Published => "p.is_published = true".to_string(),
        Predicate::IdEquals(id) => {
            let idx = push_int(bind_params, *id);
            format!("p.id = ${idx}")
        }
        Predicate::PrefectureIn(ids) => {
            let idx = push_int_array(bind_params, ids.clone());
            format!("p.prefecture_id = ANY(${idx})")
        }
        Predicate::RailwayLineIn(ids) => {
            let idx = push_int_array(bind_params, ids.clone());
            format!(
                "EXISTS (SELECT 1 FROM property_stations ps JOIN stations s ON ps.station_id = s.id WHERE ps.property_id = p.id AND s.railway_line_id = ANY(${idx}))"
            )
        }
        Predicate::StationIn(ids) => {
            let idx = push_int_array(bind_params, ids.clone());
            format!(
                "EXISTS (SELECT 1 FROM property_stations ps WHERE ps.property_id = p.id AND ps.station_id = ANY(${idx}))"
            )
        }
        Predicate::WalkingMinutesAtMost(minutes) => {
            let idx = push_int(bind_params, *minutes);
            format!(
                "EXISTS (SELECT 1 FROM property_stations ps WHERE ps.property_id = p.id AND ps.walking_minutes <= ${idx})"
            )
        }
        Predicate::RentAtLeast(rent) => {
            let idx = push_bigint(bind_params, *rent);
            format!("p.rent >= ${idx}")
        }
        Predicate::RentAtMost(rent) => {
            let idx = push_bigint(bind_params, *rent);
            format!("p.rent <= ${idx}")
        }
        Predicate::FloorPlanTypeIn(ids) => {
            let idx = push_int_array(bind_params, ids.clone());
            format!("p.floor_plan_type_id = ANY(${idx})")
        }
        Predicate::BuildingTypeIn(ids) => {
            let idx = push_int_array(bind_params, ids.clone());
            format!("p.building_type_id = ANY(${idx})")
        }
        Predicate::AreaAtLeast(area) => {
            let idx = push_decimal(bind_params, *area);
            format!("p.area >= ${idx}")
        }
        Predicate::AreaAtMost(area) => {
            let idx = push_decimal(bind_params, *area);
            format!("p.area <= ${idx}")
        }
        Predicate::BuildingAgeAtMostOrUnknown(age) => {
            let idx = push_int(bind_params, *age);
            format!("(p.building_age IS NULL OR p.building_age <= ${idx})")
        }
        Predicate::HasAllFeatures(ids) => {
            // Ids are distinct, so a full match counts exactly ids.len() features.
            let wanted = ids.len() as i64;
            let ids_idx = push_int_array(bind_params, ids.clone());
            let count_idx = push_bigint(bind_params, wanted);
            format!(
                "(SELECT COUNT(DISTINCT ppf.feature_id) FROM property_property_features ppf WHERE ppf.property_id = p.id AND ppf.feature_id = ANY(${ids_idx})) = ${count_idx}"
            )
        }
        Predicate::Keyword(keyword) => {
            let idx = push_text(bind_params, keyword.clone());
            format!(
                "to_tsvector('simple', coalesce(p.title, '') || ' ' || coalesce(p.description, '')) @@ plainto_tsquery('simple', ${idx})"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::search::params::SearchParameters;

    fn spec_with(params: SearchParameters) -> FilterSpec {
        FilterSpec::from_params(&params)
    }

    fn build_sql_and_binds(params: SearchParameters) -> (String, Vec<BindValue>) {
        let spec = spec_with(params);
        QueryBuilder::new(&spec).build_sql()
    }

    /// Number of distinct `$n` placeholders in `sql`.
    fn placeholder_count(sql: &str) -> usize {
        let mut seen = std::collections::BTreeSet::new();
        let bytes = sql.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'$' {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
                if end > start {
                    seen.insert(sql[start..end].to_string());
                }
                i = end;
            } else {
                i += 1;
            }
        }
        seen.len()
    }

    #[test]
    fn base_query_filters_published_and_windows_page() {
        let (sql, binds) = build_sql_and_binds(SearchParameters::default());
        assert!(sql.contains("WHERE p.is_published = true"));
        assert!(sql.contains("COUNT(*) OVER() AS total_count"));
        assert!(sql.contains("ORDER BY p.created_at DESC, p.id DESC"));
        assert!(sql.ends_with("LIMIT $1 OFFSET $2"));
        assert_eq!(binds, vec![BindValue::BigInt(20), BindValue::BigInt(0)]);
    }

    #[test]
    fn joins_display_names() {
        let (sql, _) = build_sql_and_binds(SearchParameters::default());
        assert!(sql.contains("JOIN prefectures pref ON p.prefecture_id = pref.id"));
        assert!(sql.contains("bt.name AS building_type_name"));
        assert!(sql.contains("fpt.name AS floor_plan_type_name"));
    }

    #[test]
    fn every_sort_mode_breaks_ties_on_id_desc() {
        for sort in [
            SortBy::RentAsc,
            SortBy::RentDesc,
            SortBy::AreaDesc,
            SortBy::CreatedAtDesc,
        ] {
            assert!(order_by(sort).ends_with("p.id DESC"), "{sort:?}");
        }
        assert_eq!(order_by(SortBy::RentAsc), "p.rent ASC, p.id DESC");
        assert_eq!(order_by(SortBy::AreaDesc), "p.area DESC, p.id DESC");
    }

    #[test]
    fn placeholders_match_bind_values() {
        let params = SearchParameters {
            prefecture_ids: [13, 14].into(),
            railway_line_ids: [1].into(),
            station_ids: [7].into(),
            walking_minutes_max: Some(5),
            rent_min: Some(40_000),
            rent_max: Some(100_000),
            floor_plan_type_ids: [2].into(),
            building_type_ids: [1].into(),
            area_min: Some(Decimal::new(20, 0)),
            area_max: Some(Decimal::new(60, 0)),
            building_age_max: Some(10),
            feature_ids: [1, 2].into(),
            keyword: Some("南向き".to_string()),
            page: 2,
            limit: 10,
            ..SearchParameters::default()
        };
        let (sql, binds) = build_sql_and_binds(params);
        assert_eq!(placeholder_count(&sql), binds.len());
        assert_eq!(binds.len(), 16);
        assert_eq!(
            &binds[binds.len() - 2..],
            &[BindValue::BigInt(10), BindValue::BigInt(10)]
        );
    }

    #[test]
    fn set_filters_use_any() {
        let (sql, binds) = build_sql_and_binds(SearchParameters {
            prefecture_ids: [13, 27].into(),
            ..SearchParameters::default()
        });
        assert!(sql.contains("p.prefecture_id = ANY($1)"));
        assert_eq!(binds[0], BindValue::IntArray(vec![13, 27]));
    }

    #[test]
    fn station_filters_use_exists_subqueries() {
        let (sql, _) = build_sql_and_binds(SearchParameters {
            railway_line_ids: [3].into(),
            station_ids: [9].into(),
            walking_minutes_max: Some(5),
            ..SearchParameters::default()
        });
        assert!(sql.contains("JOIN stations s ON ps.station_id = s.id"));
        assert!(sql.contains("s.railway_line_id = ANY($1)"));
        assert!(sql.contains("ps.station_id = ANY($2)"));
        assert!(sql.contains("ps.walking_minutes <= $3"));
    }

    #[test]
    fn building_age_keeps_unknown_ages() {
        let (sql, binds) = build_sql_and_binds(SearchParameters {
            building_age_max: Some(20),
            ..SearchParameters::default()
        });
        assert!(sql.contains("(p.building_age IS NULL OR p.building_age <= $1)"));
        assert_eq!(binds[0], BindValue::Int(20));
    }

    #[test]
    fn features_require_all_via_distinct_count() {
        let (sql, binds) = build_sql_and_binds(SearchParameters {
            feature_ids: [5, 2, 5].into_iter().collect(),
            ..SearchParameters::default()
        });
        assert!(sql.contains("COUNT(DISTINCT ppf.feature_id)"));
        assert!(sql.contains("ppf.feature_id = ANY($1)) = $2"));
        assert_eq!(binds[0], BindValue::IntArray(vec![2, 5]));
        assert_eq!(binds[1], BindValue::BigInt(2));
    }

    #[test]
    fn keyword_is_bound_not_inlined() {
        let keyword = "'; DROP TABLE properties; --";
        let (sql, binds) = build_sql_and_binds(SearchParameters {
            keyword: Some(keyword.to_string()),
            ..SearchParameters::default()
        });
        assert!(!sql.contains("DROP TABLE"));
        assert!(sql.contains("plainto_tsquery('simple', $1)"));
        assert_eq!(binds[0], BindValue::Text(keyword.to_string()));
    }

    #[test]
    fn count_query_shares_predicates_without_window() {
        let spec = spec_with(SearchParameters {
            rent_max: Some(90_000),
            page: 3,
            ..SearchParameters::default()
        });
        let (sql, binds) = QueryBuilder::new(&spec).build_count_sql();
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM properties p WHERE p.is_published = true AND p.rent <= $1"
        );
        assert_eq!(binds, vec![BindValue::BigInt(90_000)]);
    }

    #[test]
    fn detail_query_ignores_published_flag() {
        let (sql, binds) = build_detail_sql(42);
        assert!(sql.ends_with("WHERE p.id = $1"));
        assert!(!sql.contains("is_published = true"));
        assert!(!sql.contains("total_count"));
        assert_eq!(binds, vec![BindValue::Int(42)]);
    }
}
