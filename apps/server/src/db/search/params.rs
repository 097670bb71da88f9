//! Search parameter parsing and validation
//!
//! Decodes the loosely-typed query string of a property search into a
//! normalized [`SearchParameters`]:
//! - id lists are comma-separated (`prefecture_ids=13,14`) and may repeat
//! - blank values are treated as absent
//! - sets are deduplicated and sorted, so equal requests compare equal
//!
//! Validation happens here, before any predicate is built or query issued.

use crate::config::SearchConfig;
use crate::{Error, Result};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Result ordering. Every mode breaks ties on `id DESC`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortBy {
    RentAsc,
    RentDesc,
    AreaDesc,
    #[default]
    CreatedAtDesc,
}

impl SortBy {
    /// Unrecognized values fall back to the default ordering.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "rent_asc" => Self::RentAsc,
            "rent_desc" => Self::RentDesc,
            "area_desc" => Self::AreaDesc,
            "created_at_desc" | "" => Self::CreatedAtDesc,
            other => {
                tracing::debug!(sort_by = %other, "Unknown sort_by, using created_at_desc");
                Self::CreatedAtDesc
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RentAsc => "rent_asc",
            Self::RentDesc => "rent_desc",
            Self::AreaDesc => "area_desc",
            Self::CreatedAtDesc => "created_at_desc",
        }
    }
}

/// Normalized property search request.
///
/// `Hash + Eq` make it usable directly as a result-cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchParameters {
    pub prefecture_ids: BTreeSet<i32>,
    pub railway_line_ids: BTreeSet<i32>,
    pub station_ids: BTreeSet<i32>,
    pub walking_minutes_max: Option<i32>,
    pub rent_min: Option<i64>,
    pub rent_max: Option<i64>,
    pub floor_plan_type_ids: BTreeSet<i32>,
    pub building_type_ids: BTreeSet<i32>,
    pub area_min: Option<Decimal>,
    pub area_max: Option<Decimal>,
    /// Properties of unknown age always pass this bound.
    pub building_age_max: Option<i32>,
    /// All of these must be present on a property.
    pub feature_ids: BTreeSet<i32>,
    /// Trimmed, never empty.
    pub keyword: Option<String>,
    pub sort_by: SortBy,
    /// 1-based.
    pub page: u32,
    pub limit: u32,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            prefecture_ids: BTreeSet::new(),
            railway_line_ids: BTreeSet::new(),
            station_ids: BTreeSet::new(),
            walking_minutes_max: None,
            rent_min: None,
            rent_max: None,
            floor_plan_type_ids: BTreeSet::new(),
            building_type_ids: BTreeSet::new(),
            area_min: None,
            area_max: None,
            building_age_max: None,
            feature_ids: BTreeSet::new(),
            keyword: None,
            sort_by: SortBy::default(),
            page: 1,
            limit: 20,
        }
    }
}

impl SearchParameters {
    /// Parse and validate search parameters from ordered (key, value) query items.
    ///
    /// Unknown keys are ignored. For scalar keys the last occurrence wins;
    /// list keys accumulate across occurrences.
    pub fn from_items(items: &[(String, String)], config: &SearchConfig) -> Result<Self> {
        let mut params = Self {
            limit: config.default_limit,
            ..Self::default()
        };
        let mut page: i64 = 1;
        let mut limit: i64 = i64::from(config.default_limit);

        for (key, value) in items {
            let value = value.trim();
            if value.contains('\0') {
                return Err(Error::Validation(format!("Invalid {key} value")));
            }
            match key.as_str() {
                "prefecture_ids" => params.prefecture_ids.extend(parse_id_list(key, value)?),
                "railway_line_ids" => params.railway_line_ids.extend(parse_id_list(key, value)?),
                "station_ids" => params.station_ids.extend(parse_id_list(key, value)?),
                "floor_plan_type_ids" => {
                    params.floor_plan_type_ids.extend(parse_id_list(key, value)?)
                }
                "building_type_ids" => {
                    params.building_type_ids.extend(parse_id_list(key, value)?)
                }
                "feature_ids" => params.feature_ids.extend(parse_id_list(key, value)?),
                "walking_minutes_max" => params.walking_minutes_max = parse_scalar(key, value)?,
                "rent_min" => params.rent_min = parse_scalar(key, value)?,
                "rent_max" => params.rent_max = parse_scalar(key, value)?,
                "area_min" => params.area_min = parse_scalar(key, value)?,
                "area_max" => params.area_max = parse_scalar(key, value)?,
                "building_age_max" => params.building_age_max = parse_scalar(key, value)?,
                "keyword" => {
                    params.keyword = if value.is_empty() {
                        None
                    } else {
                        Some(value.to_string())
                    };
                }
                "sort_by" => params.sort_by = SortBy::parse(value),
                "page" => {
                    if let Some(v) = parse_scalar::<i64>(key, value)? {
                        page = v;
                    }
                }
                "limit" => {
                    if let Some(v) = parse_scalar::<i64>(key, value)? {
                        limit = v;
                    }
                }
                _ => {}
            }
        }

        if page < 1 {
            return Err(Error::Validation("Page must be >= 1".to_string()));
        }
        let max_limit = i64::from(config.max_limit);
        if !(1..=max_limit).contains(&limit) {
            return Err(Error::Validation(format!(
                "Limit must be between 1 and {max_limit}"
            )));
        }

        params.page = u32::try_from(page)
            .map_err(|_| Error::Validation(format!("Page {page} is out of range")))?;
        params.limit = limit as u32;
        Ok(params)
    }

    /// Re-check pagination bounds for programmatically built parameters.
    pub fn validate(&self, config: &SearchConfig) -> Result<()> {
        if self.page < 1 {
            return Err(Error::Validation("Page must be >= 1".to_string()));
        }
        if self.limit < 1 || self.limit > config.max_limit {
            return Err(Error::Validation(format!(
                "Limit must be between 1 and {}",
                config.max_limit
            )));
        }
        if let Some(keyword) = &self.keyword {
            if keyword.trim().is_empty() {
                return Err(Error::Validation("Keyword must not be blank".to_string()));
            }
        }
        Ok(())
    }

    /// Row offset of the first result on this page.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}

fn parse_id_list(key: &str, value: &str) -> Result<Vec<i32>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i32>().map_err(|_| {
                Error::Validation(format!("Invalid {key} value: '{s}' is not an integer id"))
            })
        })
        .collect()
}

fn parse_scalar<T: FromStr>(key: &str, value: &str) -> Result<Option<T>> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<T>()
        .map(Some)
        .map_err(|_| Error::Validation(format!("Invalid {key} value: {value}")))
}
