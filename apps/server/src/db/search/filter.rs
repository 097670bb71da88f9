//! Typed search predicates.
//!
//! [`FilterSpec::from_params`] turns validated [`SearchParameters`] into an
//! ordered list of [`Predicate`]s. Predicates carry operands only; turning
//! them into SQL is the query builder's job, so this stage needs no database.
//!
//! Composition is conjunctive across predicates. Set-valued predicates match
//! "any of" their ids, except [`Predicate::HasAllFeatures`] which is "all of".

use super::params::{SearchParameters, SortBy};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Predicate {
    /// Only published listings. Always first in a public search.
    Published,
    IdEquals(i32),
    PrefectureIn(Vec<i32>),
    /// Some associated station lies on one of these lines.
    RailwayLineIn(Vec<i32>),
    /// Some associated station is one of these.
    StationIn(Vec<i32>),
    /// Some station association is within this many minutes on foot.
    WalkingMinutesAtMost(i32),
    RentAtLeast(i64),
    RentAtMost(i64),
    FloorPlanTypeIn(Vec<i32>),
    BuildingTypeIn(Vec<i32>),
    AreaAtLeast(Decimal),
    AreaAtMost(Decimal),
    /// `building_age <= n`, or age unknown.
    BuildingAgeAtMostOrUnknown(i32),
    /// Every listed feature is associated. Ids are distinct.
    HasAllFeatures(Vec<i32>),
    /// Case-insensitive full-text match on title and description.
    Keyword(String),
}

/// Normalized query: predicates, ordering and page window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterSpec {
    pub predicates: Vec<Predicate>,
    pub sort_by: SortBy,
    pub limit: u32,
    pub offset: i64,
}

impl FilterSpec {
    pub fn from_params(params: &SearchParameters) -> Self {
        let mut predicates = vec![Predicate::Published];

        push_set(&mut predicates, &params.prefecture_ids, Predicate::PrefectureIn);
        push_set(&mut predicates, &params.railway_line_ids, Predicate::RailwayLineIn);
        push_set(&mut predicates, &params.station_ids, Predicate::StationIn);
        if let Some(minutes) = params.walking_minutes_max {
            predicates.push(Predicate::WalkingMinutesAtMost(minutes));
        }
        if let Some(rent) = params.rent_min {
            predicates.push(Predicate::RentAtLeast(rent));
        }
        if let Some(rent) = params.rent_max {
            predicates.push(Predicate::RentAtMost(rent));
        }
        push_set(
            &mut predicates,
            &params.floor_plan_type_ids,
            Predicate::FloorPlanTypeIn,
        );
        push_set(
            &mut predicates,
            &params.building_type_ids,
            Predicate::BuildingTypeIn,
        );
        if let Some(area) = params.area_min {
            predicates.push(Predicate::AreaAtLeast(area));
        }
        if let Some(area) = params.area_max {
            predicates.push(Predicate::AreaAtMost(area));
        }
        if let Some(age) = params.building_age_max {
            predicates.push(Predicate::BuildingAgeAtMostOrUnknown(age));
        }
        push_set(&mut predicates, &params.feature_ids, Predicate::HasAllFeatures);
        if let Some(keyword) = params.keyword.as_deref().map(str::trim) {
            if !keyword.is_empty() {
                predicates.push(Predicate::Keyword(keyword.to_string()));
            }
        }

        Self {
            predicates,
            sort_by: params.sort_by,
            limit: params.limit,
            offset: params.offset(),
        }
    }
}

fn push_set<'a>(
    predicates: &mut Vec<Predicate>,
    ids: impl IntoIterator<Item = &'a i32>,
    make: fn(Vec<i32>) -> Predicate,
) {
    let ids: Vec<i32> = ids.into_iter().copied().collect();
    if !ids.is_empty() {
        predicates.push(make(ids));
    }
}
