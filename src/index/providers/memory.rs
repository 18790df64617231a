use crate::index::{DocumentIndex, IndexError, SearchRequest, SearchResults, TaskInfo};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};
use tokio::sync::RwLock;
use tracing::debug;

/// In-process document index. Writes are applied before the task
/// acknowledgement is returned, so reads observe them immediately.
pub struct MemoryIndex {
    index_uid: String,
    documents: RwLock<BTreeMap<String, Map<String, Value>>>,
    next_task_uid: AtomicU64,
}

impl MemoryIndex {
    pub fn new(index_uid: impl Into<String>) -> Self {
        Self {
            index_uid: index_uid.into(),
            documents: RwLock::new(BTreeMap::new()),
            next_task_uid: AtomicU64::new(0),
        }
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    fn enqueue(&self, kind: &str) -> TaskInfo {
        TaskInfo {
            task_uid: self.next_task_uid.fetch_add(1, Ordering::SeqCst),
            index_uid: self.index_uid.clone(),
            status: "enqueued".to_string(),
            kind: kind.to_string(),
            enqueued_at: Some(Utc::now()),
        }
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new("posts")
    }
}

fn document_id(document: &Map<String, Value>, primary_key: &str) -> Option<String> {
    match document.get(primary_key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn matches_query(document: &Map<String, Value>, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    ["title", "description", "content", "tags"]
        .iter()
        .filter_map(|field| document.get(*field))
        .any(|value| match value {
            Value::String(s) => s.to_lowercase().contains(needle),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .any(|item| item.to_lowercase().contains(needle)),
            _ => false,
        })
}

fn project(document: &Map<String, Value>, attributes: Option<&[String]>) -> Map<String, Value> {
    match attributes {
        Some(attributes) => attributes
            .iter()
            .filter_map(|attr| document.get(attr).map(|v| (attr.clone(), v.clone())))
            .collect(),
        None => document.clone(),
    }
}

#[async_trait]
impl DocumentIndex for MemoryIndex {
    async fn get_document(&self, id: &str) -> Result<Value, IndexError> {
        let documents = self.documents.read().await;
        documents
            .get(id)
            .map(|doc| Value::Object(doc.clone()))
            .ok_or_else(|| IndexError::DocumentNotFound(id.to_string()))
    }

    async fn add_documents(
        &self,
        documents: Vec<Value>,
        primary_key: &str,
    ) -> Result<TaskInfo, IndexError> {
        let mut parsed = Vec::with_capacity(documents.len());
        for document in documents {
            let Value::Object(map) = document else {
                return Err(IndexError::Api {
                    status: 400,
                    code: "malformed_payload".to_string(),
                    message: "documents must be JSON objects".to_string(),
                });
            };
            let id = document_id(&map, primary_key).ok_or_else(|| IndexError::Api {
                status: 400,
                code: "missing_document_id".to_string(),
                message: format!("document is missing primary key '{}'", primary_key),
            })?;
            parsed.push((id, map));
        }

        let mut store = self.documents.write().await;
        for (id, map) in parsed {
            debug!("Storing document {} in memory index", id);
            store.insert(id, map);
        }

        Ok(self.enqueue("documentAdditionOrUpdate"))
    }

    async fn delete_document(&self, id: &str) -> Result<TaskInfo, IndexError> {
        self.documents.write().await.remove(id);
        Ok(self.enqueue("documentDeletion"))
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResults, IndexError> {
        let started = Instant::now();
        let needle = request.q.trim().to_lowercase();
        let documents = self.documents.read().await;

        let matched: Vec<&Map<String, Value>> = documents
            .values()
            .filter(|doc| matches_query(doc, &needle))
            .collect();

        let hits = matched
            .iter()
            .skip(usize::try_from(request.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(request.limit).unwrap_or(usize::MAX))
            .map(|doc| project(doc, request.attributes_to_retrieve.as_deref()))
            .collect();

        Ok(SearchResults {
            hits,
            estimated_total_hits: matched.len() as u64,
            processing_time_ms: started.elapsed().as_millis() as u64,
            query: request.q.clone(),
        })
    }

    async fn health(&self) -> Result<(), IndexError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "In-memory index"
    }
}
