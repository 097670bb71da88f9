//! Service layer - business logic between handlers and repositories

pub mod property;

pub use property::PropertyService;
