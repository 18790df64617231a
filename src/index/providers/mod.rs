pub mod meilisearch;
pub mod memory;
