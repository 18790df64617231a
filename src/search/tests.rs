#[cfg(test)]
mod tests {
    use super::super::core::{SEARCH_FIELDS, parse_page};
    use super::super::*;
    use crate::index::{
        DocumentIndex, IndexError, SearchRequest, SearchResults, TaskInfo,
        providers::memory::MemoryIndex,
    };
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    /// Returns canned results and remembers the last request it was given.
    struct RecordingIndex {
        estimated_total_hits: u64,
        last_request: Mutex<Option<SearchRequest>>,
    }

    impl RecordingIndex {
        fn new(estimated_total_hits: u64) -> Arc<Self> {
            Arc::new(Self {
                estimated_total_hits,
                last_request: Mutex::new(None),
            })
        }

        fn last_request(&self) -> SearchRequest {
            self.last_request.lock().unwrap().clone().unwrap()
        }
    }

    #[async_trait]
    impl DocumentIndex for RecordingIndex {
        async fn get_document(&self, id: &str) -> Result<Value, IndexError> {
            Err(IndexError::DocumentNotFound(id.to_string()))
        }

        async fn add_documents(
            &self,
            _documents: Vec<Value>,
            _primary_key: &str,
        ) -> Result<TaskInfo, IndexError> {
            unimplemented!("not used by search tests")
        }

        async fn delete_document(&self, _id: &str) -> Result<TaskInfo, IndexError> {
            unimplemented!("not used by search tests")
        }

        async fn search(&self, request: &SearchRequest) -> Result<SearchResults, IndexError> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            Ok(SearchResults {
                hits: Vec::new(),
                estimated_total_hits: self.estimated_total_hits,
                processing_time_ms: 3,
                query: request.q.clone(),
            })
        }

        async fn health(&self) -> Result<(), IndexError> {
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    #[test]
    fn test_total_pages_exact_multiple_reports_extra_page() {
        assert_eq!(total_pages(20, 20), 2);
    }

    #[test]
    fn test_total_pages_values() {
        assert_eq!(total_pages(0, 20), 1);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(19, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(40, 20), 3);
    }

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page(None).unwrap(), 0);
        assert_eq!(parse_page(Some("")).unwrap(), 0);
        assert_eq!(parse_page(Some("3")).unwrap(), 3);
        assert!(matches!(parse_page(Some("abc")), Err(SearchError::InvalidPage(_))));
        assert!(matches!(parse_page(Some("-1")), Err(SearchError::InvalidPage(_))));
        assert!(matches!(parse_page(Some("1.5")), Err(SearchError::InvalidPage(_))));
    }

    #[tokio::test]
    async fn test_missing_page_defaults_to_offset_zero() {
        let index = RecordingIndex::new(0);
        let service = SearchService::new(index.clone(), 20);

        let params = SearchParams {
            s: "rust".to_string(),
            p: None,
        };
        service.search_params(&params).await.unwrap();

        let request = index.last_request();
        assert_eq!(request.offset, 0);
        assert_eq!(request.limit, 20);
        assert_eq!(request.q, "rust");
    }

    #[tokio::test]
    async fn test_offset_is_page_times_page_size() {
        let index = RecordingIndex::new(100);
        let service = SearchService::new(index.clone(), 20);

        let page = service.search("", 3).await.unwrap();

        let request = index.last_request();
        assert_eq!(request.offset, 60);
        assert_eq!(request.limit, 20);
        assert_eq!(page.total_pages, 6);
        assert_eq!(page.processing_time_ms, 3);
    }

    #[tokio::test]
    async fn test_search_requests_projection_without_content() {
        let index = RecordingIndex::new(0);
        let service = SearchService::new(index.clone(), 20);

        service.search("anything", 0).await.unwrap();

        let attributes = index.last_request().attributes_to_retrieve.unwrap();
        assert_eq!(attributes, SEARCH_FIELDS.map(String::from).to_vec());
        assert!(!attributes.iter().any(|a| a == "content"));
    }

    #[tokio::test]
    async fn test_overflowing_page_is_rejected() {
        let service = SearchService::new(RecordingIndex::new(0), 20);
        let result = service.search("", u64::MAX).await;
        assert!(matches!(result, Err(SearchError::InvalidPage(_))));
    }

    #[tokio::test]
    async fn test_search_against_memory_index() {
        let index = Arc::new(MemoryIndex::default());
        index
            .add_documents(
                vec![
                    json!({"id": "1", "title": "Async Rust", "tags": ["rust"], "description": "d", "content": "secret body"}),
                    json!({"id": "2", "title": "Gardening", "tags": [], "description": "d", "content": "c"}),
                ],
                "id",
            )
            .await
            .unwrap();
        let service = SearchService::new(index, 20);

        let page = service.search("rust", 0).await.unwrap();

        assert_eq!(page.query, "rust");
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.hits.len(), 1);
        assert_eq!(page.hits[0]["title"], "Async Rust");
        assert!(page.hits[0].get("content").is_none());
    }
}
