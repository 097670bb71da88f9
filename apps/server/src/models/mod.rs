//! Domain models for the rental property API

pub mod master;
pub mod property;

pub use master::{BuildingType, Feature, FloorPlanType, Prefecture, RailwayLine, Station};
pub use property::{
    Property, PropertyFeature, PropertyImage, PropertyPage, PropertyStation, UserRole, Viewer,
};
