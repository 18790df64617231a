use crate::error::ApiError;
use crate::index::IndexError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid page number: {0}")]
    InvalidPage(String),

    #[error("Index error: {0}")]
    IndexError(#[from] IndexError),
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidPage(_) => ApiError::bad_request(err.to_string()),
            SearchError::IndexError(e) => {
                tracing::error!("Search request failed: {}", e);
                ApiError::internal("Failed to perform search")
            }
        }
    }
}
