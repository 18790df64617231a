use super::types::{Post, PostAck};
use crate::{AppState, error::ApiError};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

pub async fn get_post_handler(
    State(app_state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let post = app_state.posts.get(&post_id).await?;
    Ok(Json(post))
}

pub async fn upsert_post_handler(
    State(app_state): State<AppState>,
    payload: Result<Json<Post>, JsonRejection>,
) -> Result<Json<PostAck>, ApiError> {
    let Json(post) = payload?;
    let ack = app_state.posts.upsert(post).await?;
    Ok(Json(ack))
}

pub async fn delete_post_handler(
    State(app_state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<PostAck>, ApiError> {
    let ack = app_state.posts.delete(&post_id).await?;
    Ok(Json(ack))
}
