use crate::error::ApiError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("File missing: expected a multipart field named 'file'")]
    MissingFile,

    #[error("Invalid {kind}: {value:?}")]
    InvalidName { kind: &'static str, value: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to create directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete {path:?}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read directory {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ResourceError> for ApiError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::MissingFile | ResourceError::InvalidName { .. } => {
                ApiError::bad_request(err.to_string())
            }
            ResourceError::NotFound(_) => ApiError::not_found(err.to_string()),
            ResourceError::CreateDir { .. } => {
                tracing::error!("{}", err);
                ApiError::internal("Failed to create upload directory")
            }
            ResourceError::Write { .. } => {
                tracing::error!("{}", err);
                ApiError::internal("Failed to save resource")
            }
            ResourceError::Remove { .. } => {
                tracing::error!("{}", err);
                ApiError::internal("Failed to delete resource")
            }
            ResourceError::ReadDir { .. } => {
                tracing::error!("{}", err);
                ApiError::internal("Failed to list resources")
            }
        }
    }
}
