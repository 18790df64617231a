use super::error::ResourceError;
use crate::{AppState, error::ApiError};
use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
};
use tracing::{debug, error};

pub async fn upload_resource_handler(
    State(app_state): State<AppState>,
    Path(post_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<&'static str, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        debug!("Upload without multipart body: {}", e);
        ApiError::from(ResourceError::MissingFile)
    })?;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Failed to read multipart field: {}", e);
        ApiError::bad_request(format!("Invalid multipart data: {}", e))
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or(ResourceError::MissingFile)?;

        let data = field.bytes().await.map_err(|e| {
            error!("Failed to read uploaded file content: {}", e);
            ApiError::bad_request(format!("Failed to read file: {}", e))
        })?;

        app_state
            .resources
            .save(&post_id, &file_name, &data)
            .await?;

        return Ok("Received and saved successfully");
    }

    Err(ResourceError::MissingFile.into())
}

pub async fn delete_resource_handler(
    State(app_state): State<AppState>,
    Path((post_id, resource_name)): Path<(String, String)>,
) -> Result<&'static str, ApiError> {
    app_state
        .resources
        .delete(&post_id, &resource_name)
        .await?;
    Ok("Deleted successfully")
}

pub async fn list_resources_handler(
    State(app_state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let names = app_state.resources.list(&post_id).await?;
    Ok(Json(names))
}
