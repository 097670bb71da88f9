//! Read-only reference data

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Prefecture {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct RailwayLine {
    pub id: i32,
    pub name: String,
    pub prefecture_id: i32,
    pub prefecture_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Station {
    pub id: i32,
    pub name: String,
    pub railway_line_id: i32,
    pub railway_line_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct FloorPlanType {
    pub id: i32,
    pub name: String,
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct BuildingType {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Feature {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}
