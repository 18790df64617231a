pub mod core;
pub mod error;
pub mod handlers;
pub mod types;

pub use self::core::{SearchService, total_pages};
pub use error::SearchError;
pub use types::{SearchPage, SearchParams};

#[cfg(test)]
mod tests;
