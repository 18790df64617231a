use super::{error::SearchError, types::*};
use crate::index::{DynDocumentIndex, SearchRequest};
use tracing::debug;

/// Fields returned for each hit. `content` is left out to keep result pages small.
pub const SEARCH_FIELDS: [&str; 4] = ["id", "title", "tags", "description"];

/// Page count reported to clients.
///
/// This is `hits / page_size + 1`, so an exact multiple of the page size
/// reports one trailing empty page (20 hits at 20 per page gives 2).
/// Clients already rely on this value never being zero.
pub fn total_pages(estimated_total_hits: u64, page_size: u64) -> u64 {
    estimated_total_hits / page_size.max(1) + 1
}

/// Parses a zero-based page number. Absent or blank input means page 0.
pub fn parse_page(raw: Option<&str>) -> Result<u64, SearchError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(0),
        Some(value) => value
            .parse::<u64>()
            .map_err(|_| SearchError::InvalidPage(value.to_string())),
    }
}

#[derive(Clone)]
pub struct SearchService {
    index: DynDocumentIndex,
    page_size: u64,
}

impl SearchService {
    pub fn new(index: DynDocumentIndex, page_size: u64) -> Self {
        Self {
            index,
            page_size: page_size.max(1),
        }
    }

    pub async fn search(&self, query: &str, page: u64) -> Result<SearchPage, SearchError> {
        let offset = page
            .checked_mul(self.page_size)
            .ok_or_else(|| SearchError::InvalidPage(page.to_string()))?;

        debug!("Searching for {:?} at offset {}", query, offset);

        let request = SearchRequest::new(query)
            .with_page(offset, self.page_size)
            .with_attributes(SEARCH_FIELDS);
        let results = self.index.search(&request).await?;

        Ok(SearchPage {
            hits: results.hits,
            total_pages: total_pages(results.estimated_total_hits, self.page_size),
            processing_time_ms: results.processing_time_ms,
            query: query.to_string(),
        })
    }

    pub async fn search_params(&self, params: &SearchParams) -> Result<SearchPage, SearchError> {
        let page = parse_page(params.p.as_deref())?;
        self.search(&params.s, page).await
    }
}
