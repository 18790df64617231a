//! The external document index that backs posts and search.
//!
//! The index doubles as the primary document store. Writes are asynchronous
//! on the remote service: they return a [`TaskInfo`] once the change has been
//! enqueued, and a read issued right after may still see the old state.

pub mod error;
pub mod providers;
pub mod types;

pub use error::*;
pub use types::*;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::config::SearchConfig;

#[async_trait]
pub trait DocumentIndex: Send + Sync {
    async fn get_document(&self, id: &str) -> Result<Value, IndexError>;

    async fn add_documents(
        &self,
        documents: Vec<Value>,
        primary_key: &str,
    ) -> Result<TaskInfo, IndexError>;

    /// Deleting an id that does not exist is not an error.
    async fn delete_document(&self, id: &str) -> Result<TaskInfo, IndexError>;

    async fn search(&self, request: &SearchRequest) -> Result<SearchResults, IndexError>;

    async fn health(&self) -> Result<(), IndexError>;

    fn name(&self) -> &str;
}

pub type DynDocumentIndex = Arc<dyn DocumentIndex>;

pub fn create_index(config: &SearchConfig) -> Result<DynDocumentIndex, IndexError> {
    Ok(Arc::new(providers::meilisearch::MeilisearchIndex::new(
        config,
    )?))
}
