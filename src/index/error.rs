use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Index not found: {0}")]
    IndexNotFound(String),

    #[error("Search service returned {status}: {message} ({code})")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Index configuration error: {0}")]
    ConfigError(String),
}
