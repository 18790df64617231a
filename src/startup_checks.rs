use crate::{config::Config, index::DocumentIndex};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Failed to create uploads directory: {0}")]
    UploadsDirectoryCreationFailed(#[from] std::io::Error),

    #[error("Uploads path is not a directory: {0}")]
    UploadsPathNotDirectory(String),

    #[error("Search service is not reachable: {0}")]
    SearchServiceUnavailable(String),
}

impl StartupCheckError {
    /// Critical failures stop the server; the search service is allowed to
    /// come up after us.
    pub fn is_critical(&self) -> bool {
        !matches!(self, StartupCheckError::SearchServiceUnavailable(_))
    }
}

pub async fn perform_startup_checks(
    config: &Config,
    index: &dyn DocumentIndex,
) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    let uploads_dir = &config.uploads.directory;
    match tokio::fs::metadata(uploads_dir).await {
        Ok(metadata) if metadata.is_dir() => {
            info!("Uploads directory exists: {:?}", uploads_dir);
        }
        Ok(_) => {
            error!("Uploads path exists but is not a directory: {:?}", uploads_dir);
            errors.push(StartupCheckError::UploadsPathNotDirectory(
                uploads_dir.display().to_string(),
            ));
        }
        Err(_) => {
            info!(
                "Uploads directory does not exist, creating: {:?}",
                uploads_dir
            );
            if let Err(e) = tokio::fs::create_dir_all(uploads_dir).await {
                error!("Failed to create uploads directory: {}", e);
                errors.push(StartupCheckError::UploadsDirectoryCreationFailed(e));
            } else {
                info!("Uploads directory created successfully");
            }
        }
    }

    match index.health().await {
        Ok(()) => info!("{} is available", index.name()),
        Err(e) => {
            warn!("{} health check failed: {}", index.name(), e);
            errors.push(StartupCheckError::SearchServiceUnavailable(e.to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::providers::memory::MemoryIndex;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_creates_missing_uploads_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.uploads.directory = temp_dir.path().join("uploads");

        let result = perform_startup_checks(&config, &MemoryIndex::default()).await;

        assert!(result.is_ok());
        assert!(config.uploads.directory.is_dir());
    }

    #[tokio::test]
    async fn test_file_in_place_of_uploads_directory_is_critical() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("uploads");
        std::fs::write(&file_path, b"x").unwrap();

        let mut config = Config::default();
        config.uploads.directory = file_path;

        let errors = perform_startup_checks(&config, &MemoryIndex::default())
            .await
            .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_critical());
    }

    #[test]
    fn test_unavailable_search_service_is_not_critical() {
        let err = StartupCheckError::SearchServiceUnavailable("refused".to_string());
        assert!(!err.is_critical());
    }
}
