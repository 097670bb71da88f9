//! Heya - rental property marketplace API
//!
//! Read-only HTTP API over a Postgres listing database:
//! - Multi-criteria property search with stable pagination
//! - Property detail with owner-only access to unpublished listings
//! - Master data lists for building search forms

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod request_context;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
