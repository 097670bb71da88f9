//! Database layer - repositories and data access

pub mod master_data;
pub mod search;
pub mod traits;
pub mod users;

pub use master_data::MasterDataRepository;
pub use search::{SearchEngine, SearchParameters};
pub use traits::PropertyReader;
pub use users::UserRepository;
