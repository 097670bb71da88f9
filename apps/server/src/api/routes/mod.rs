//! Route tables

pub mod master_data;
pub mod metrics;
pub mod properties;
