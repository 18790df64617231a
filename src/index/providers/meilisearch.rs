use crate::config::SearchConfig;
use crate::index::{DocumentIndex, IndexError, SearchRequest, SearchResults, TaskInfo};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const CONNECT_TIMEOUT_SECS: u64 = 5;
const TOTAL_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("postdex/", env!("CARGO_PKG_VERSION"));

/// Error body returned by the search service on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    message: String,
    code: String,
}

/// Document index backed by a Meilisearch instance over its HTTP API.
pub struct MeilisearchIndex {
    client: Client,
    base_url: Url,
    index: String,
    api_key: Option<String>,
}

impl MeilisearchIndex {
    pub fn new(config: &SearchConfig) -> Result<Self, IndexError> {
        if config.url.cannot_be_a_base() {
            return Err(IndexError::ConfigError(format!(
                "search url cannot be used as a base: {}",
                config.url
            )));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        info!(
            "Using search service at {} (index '{}')",
            config.url, config.index
        );

        Ok(Self {
            client,
            base_url: config.url.clone(),
            index: config.index.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn documents_endpoint(&self) -> Url {
        self.endpoint(&["indexes", self.index.as_str(), "documents"])
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn task_from(response: Response) -> Result<TaskInfo, IndexError> {
        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        Ok(response.json::<TaskInfo>().await?)
    }
}

async fn error_from(response: Response) -> IndexError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ServiceErrorBody>(&body) {
        Ok(parsed) if parsed.code == "index_not_found" => IndexError::IndexNotFound(parsed.message),
        Ok(parsed) => IndexError::Api {
            status: status.as_u16(),
            code: parsed.code,
            message: parsed.message,
        },
        Err(_) => IndexError::Api {
            status: status.as_u16(),
            code: "unknown".to_string(),
            message: body,
        },
    }
}

#[async_trait]
impl DocumentIndex for MeilisearchIndex {
    async fn get_document(&self, id: &str) -> Result<Value, IndexError> {
        let url = self.endpoint(&["indexes", self.index.as_str(), "documents", id]);
        debug!("Fetching document {} from {}", id, url);

        let response = self.authorize(self.client.get(url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            // Covers both a missing document and an index that was never created.
            return Err(IndexError::DocumentNotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(error_from(response).await);
        }

        Ok(response.json::<Value>().await?)
    }

    async fn add_documents(
        &self,
        documents: Vec<Value>,
        primary_key: &str,
    ) -> Result<TaskInfo, IndexError> {
        let mut url = self.documents_endpoint();
        url.query_pairs_mut().append_pair("primaryKey", primary_key);
        debug!("Enqueueing {} document(s) at {}", documents.len(), url);

        let response = self
            .authorize(self.client.post(url).json(&documents))
            .send()
            .await?;

        Self::task_from(response).await
    }

    async fn delete_document(&self, id: &str) -> Result<TaskInfo, IndexError> {
        let url = self.endpoint(&["indexes", self.index.as_str(), "documents", id]);
        debug!("Enqueueing deletion of document {}", id);

        let response = self.authorize(self.client.delete(url)).send().await?;

        Self::task_from(response).await
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResults, IndexError> {
        let url = self.endpoint(&["indexes", self.index.as_str(), "search"]);

        let response = self
            .authorize(self.client.post(url).json(request))
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response.json::<SearchResults>().await?);
        }

        match error_from(response).await {
            // Nothing has been indexed yet, so there is nothing to find.
            IndexError::IndexNotFound(_) => {
                debug!("Index '{}' does not exist yet, returning no hits", self.index);
                Ok(SearchResults::empty(request.q.clone()))
            }
            other => Err(other),
        }
    }

    async fn health(&self) -> Result<(), IndexError> {
        let response = self
            .authorize(self.client.get(self.endpoint(&["health"])))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Meilisearch"
    }
}
