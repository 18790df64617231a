use super::types::{SearchPage, SearchParams};
use crate::{AppState, error::ApiError};
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};

// An empty query lists every post, which is how clients page through all of them.
pub async fn search_handler(
    State(app_state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchPage>, ApiError> {
    let Query(params) = params?;
    let page = app_state.search.search_params(&params).await?;
    Ok(Json(page))
}
