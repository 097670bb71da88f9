//! Property records as returned by search and detail retrieval

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A listed property joined with its master-data display names and
/// hydrated with its child collections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub id: i32,
    pub corporate_user_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub prefecture_id: i32,
    pub prefecture_name: String,
    pub address: String,
    pub building_type_id: i32,
    pub building_type_name: String,
    pub building_name: Option<String>,
    /// Years; `None` when unknown.
    pub building_age: Option<i32>,
    pub floor_number: Option<i32>,
    pub total_floors: Option<i32>,
    pub floor_plan_type_id: i32,
    pub floor_plan_type_name: String,
    /// Square metres.
    #[serde(with = "rust_decimal::serde::float")]
    pub area: Decimal,
    pub rent: i32,
    pub management_fee: i32,
    pub deposit: i32,
    pub key_money: i32,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Ordered by `display_order`.
    pub stations: Vec<PropertyStation>,
    /// Ordered by `display_order`.
    pub images: Vec<PropertyImage>,
    /// Ordered by name.
    pub features: Vec<PropertyFeature>,
}

/// Nearest-station association (at most three per property).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PropertyStation {
    /// Station id.
    pub id: i32,
    pub name: String,
    pub railway_line_name: String,
    pub walking_minutes: i32,
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PropertyImage {
    pub id: i32,
    pub image_url: String,
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PropertyFeature {
    /// Feature catalog id.
    pub id: i32,
    pub name: String,
}

/// One page of search results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyPage {
    pub properties: Vec<Property>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl PropertyPage {
    /// Compose the result envelope; `total_pages` is `ceil(total / limit)`.
    pub fn assemble(properties: Vec<Property>, total: i64, page: u32, limit: u32) -> Self {
        let total = total.max(0);
        let limit_i64 = i64::from(limit.max(1));
        let total_pages = (total + limit_i64 - 1) / limit_i64;
        Self {
            properties,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Individual,
    Corporate,
}

impl UserRole {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "individual" => Some(Self::Individual),
            "corporate" => Some(Self::Corporate),
            _ => None,
        }
    }
}

/// The authenticated caller, as resolved by the identity layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub user_id: i32,
    pub role: UserRole,
}

impl Viewer {
    /// Whether this caller owns a property listed by `corporate_user_id`.
    pub fn owns(&self, corporate_user_id: i32) -> bool {
        self.role == UserRole::Corporate && self.user_id == corporate_user_id
    }
}
