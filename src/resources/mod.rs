pub mod core;
pub mod error;
pub mod handlers;

pub use self::core::{ResourceStore, resource_file_name};
pub use error::ResourceError;
