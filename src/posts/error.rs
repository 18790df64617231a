use crate::error::ApiError;
use crate::index::IndexError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PostsError {
    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Stored document is not a valid post: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    #[error("Index error: {0}")]
    IndexError(#[from] IndexError),
}

impl From<PostsError> for ApiError {
    fn from(err: PostsError) -> Self {
        match err {
            PostsError::PostNotFound(id) => ApiError::not_found(format!("Post not found: {}", id)),
            PostsError::InvalidDocument(e) => {
                tracing::error!("Failed to decode stored post: {}", e);
                ApiError::internal("Stored post is malformed")
            }
            PostsError::IndexError(e) => {
                tracing::error!("Post index operation failed: {}", e);
                ApiError::internal("Search index request failed")
            }
        }
    }
}
