//! Property search: parameter decoding, predicates, SQL compilation and execution.

pub mod engine;
pub mod filter;
pub mod params;
pub mod query_builder;

pub use engine::SearchEngine;
pub use filter::{FilterSpec, Predicate};
pub use params::{SearchParameters, SortBy};
