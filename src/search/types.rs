use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw query string of `/search`. The page is kept as text so that malformed
/// values produce our own error instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub s: String,
    #[serde(default)]
    pub p: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub hits: Vec<Map<String, Value>>,
    pub total_pages: u64,
    pub processing_time_ms: u64,
    pub query: String,
}
