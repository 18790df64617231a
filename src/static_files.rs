use axum::{
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::{
    path::{Component, PathBuf},
    time::UNIX_EPOCH,
};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, error, warn};

use crate::{AppState, error::ApiError};

/// Serves uploaded files read-only under `/public/*`.
#[derive(Clone)]
pub struct StaticFileHandler {
    pub root_dir: PathBuf,
}

impl StaticFileHandler {
    pub fn new(root_dir: PathBuf) -> Self {
        Self { root_dir }
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = PathBuf::from(path.trim_start_matches('/'));

        // Only plain names are allowed; `..`, roots and prefixes could escape.
        if relative.as_os_str().is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return None;
        }

        Some(self.root_dir.join(relative))
    }

    pub async fn serve(&self, path: &str) -> Response {
        let Some(file_path) = self.resolve(path) else {
            warn!("Rejected static path: {:?}", path);
            return ApiError::not_found("File not found").into_response();
        };

        debug!("Attempting to serve static file: {:?}", file_path);

        let metadata = match tokio::fs::metadata(&file_path).await {
            Ok(m) if m.is_file() => m,
            Ok(_) => {
                debug!("Not a regular file: {:?}", file_path);
                return ApiError::not_found("File not found").into_response();
            }
            Err(e) => {
                debug!("Failed to get metadata for {:?}: {}", file_path, e);
                return ApiError::not_found("File not found").into_response();
            }
        };

        let file = match File::open(&file_path).await {
            Ok(file) => file,
            Err(e) => {
                debug!("Failed to open file {:?}: {}", file_path, e);
                return ApiError::not_found("File not found").into_response();
            }
        };

        let content_type = mime_guess::from_path(&file_path)
            .first_or_octet_stream()
            .to_string();

        // Uploads can be replaced in place under the same name, so nothing is
        // cached as immutable.
        let cache_control = if content_type.starts_with("image/") {
            "public, max-age=3600"
        } else {
            "public, max-age=300, must-revalidate"
        };

        let stream = ReaderStream::new(file);
        let body = Body::from_stream(stream);

        let mut response = Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CACHE_CONTROL, cache_control)
            .header(header::CONTENT_LENGTH, metadata.len());

        if let Ok(modified) = metadata.modified()
            && let Ok(duration) = modified.duration_since(UNIX_EPOCH)
        {
            let http_date = httpdate::fmt_http_date(modified);
            response = response.header(header::LAST_MODIFIED, http_date);

            // ETag based on modification time and file size
            let etag = format!("\"{}-{}\"", duration.as_secs(), metadata.len());
            response = response.header(header::ETAG, etag);
        }

        match response.body(body) {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to build static file response: {}", e);
                ApiError::internal("Failed to serve file").into_response()
            }
        }
    }
}

pub async fn static_file_handler(
    State(app_state): State<AppState>,
    Path(path): Path<String>,
) -> Response {
    app_state.static_handler.serve(&path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_plain_paths() {
        let handler = StaticFileHandler::new(PathBuf::from("/srv/public"));
        assert_eq!(
            handler.resolve("abc/cover.png"),
            Some(PathBuf::from("/srv/public/abc/cover.png"))
        );
        assert_eq!(
            handler.resolve("/abc/cover.png"),
            Some(PathBuf::from("/srv/public/abc/cover.png"))
        );
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let handler = StaticFileHandler::new(PathBuf::from("/srv/public"));
        assert_eq!(handler.resolve("../secret"), None);
        assert_eq!(handler.resolve("abc/../../secret"), None);
        assert_eq!(handler.resolve("./abc"), None);
        assert_eq!(handler.resolve(""), None);
    }
}
