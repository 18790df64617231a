pub mod core;
pub mod error;
pub mod handlers;
pub mod types;

pub use self::core::PostRepository;
pub use error::PostsError;
pub use types::{Post, PostAck};
