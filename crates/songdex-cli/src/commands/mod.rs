pub mod config;
pub mod query;
pub mod search;

pub use query::run_query;
pub use search::run_search;
