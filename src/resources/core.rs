use super::error::ResourceError;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// File attachments stored as `<root>/<post id>/<file name>`.
///
/// The directory tree is the only record of what exists. Concurrent uploads
/// of the same name are last-writer-wins, and a listing taken while another
/// request writes may be partial.
#[derive(Debug, Clone)]
pub struct ResourceStore {
    root: PathBuf,
}

/// Rejects names that would escape the post directory or are not a single
/// path segment.
fn validate_segment<'a>(kind: &'static str, value: &'a str) -> Result<&'a str, ResourceError> {
    let invalid = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);

    if invalid {
        return Err(ResourceError::InvalidName {
            kind,
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Splits off the extension the same way as a final `.suffix` lookup: the
/// text from the last dot, or nothing when there is no dot.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) => name.split_at(pos),
        None => (name, ""),
    }
}

/// Storage name for an uploaded file: the base name's stem slugified
/// (lowercase ASCII, hyphen separated, diacritics stripped) followed by the
/// original extension. `"My Post!.png"` becomes `"my-post.png"`.
pub fn resource_file_name(original: &str) -> Result<String, ResourceError> {
    // Some clients send a full client-side path.
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let (stem, extension) = split_extension(base);
    let slug = slug::slugify(stem);

    if slug.is_empty() {
        return Err(ResourceError::InvalidName {
            kind: "file name",
            value: original.to_string(),
        });
    }

    let name = format!("{}{}", slug, extension);
    validate_segment("file name", &name)?;
    Ok(name)
}

impl ResourceStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn post_directory(&self, post_id: &str) -> Result<PathBuf, ResourceError> {
        Ok(self.root.join(validate_segment("post id", post_id)?))
    }

    /// Writes `data` under the slugified name, creating the post directory
    /// when needed and replacing any file that already has that name.
    /// Returns the stored file name.
    pub async fn save(
        &self,
        post_id: &str,
        original_name: &str,
        data: &[u8],
    ) -> Result<String, ResourceError> {
        let directory = self.post_directory(post_id)?;
        let file_name = resource_file_name(original_name)?;
        let path = directory.join(&file_name);

        tokio::fs::create_dir_all(&directory)
            .await
            .map_err(|source| ResourceError::CreateDir {
                path: directory.clone(),
                source,
            })?;

        tokio::fs::write(&path, data)
            .await
            .map_err(|source| ResourceError::Write {
                path: path.clone(),
                source,
            })?;

        info!(
            "Saved resource {:?} for post {} as {:?} ({} bytes)",
            original_name,
            post_id,
            file_name,
            data.len()
        );

        Ok(file_name)
    }

    /// Removes exactly `<post>/<file_name>`; no slugification is applied.
    pub async fn delete(&self, post_id: &str, file_name: &str) -> Result<(), ResourceError> {
        let path = self
            .post_directory(post_id)?
            .join(validate_segment("resource name", file_name)?);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted resource {:?} of post {}", file_name, post_id);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Resource {:?} does not exist", path);
                Err(ResourceError::NotFound(file_name.to_string()))
            }
            Err(source) => Err(ResourceError::Remove { path, source }),
        }
    }

    /// Names of the files stored for a post, sorted. A post that never had
    /// an upload has no directory and yields an empty list.
    pub async fn list(&self, post_id: &str) -> Result<Vec<String>, ResourceError> {
        let directory = self.post_directory(post_id)?;

        let mut entries = match tokio::fs::read_dir(&directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No resource directory for post {}", post_id);
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(ResourceError::ReadDir {
                    path: directory,
                    source,
                });
            }
        };

        let mut names = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => match entry.file_name().into_string() {
                    Ok(name) => names.push(name),
                    // A lossy name could never be matched by a later delete.
                    Err(raw) => warn!("Skipping non UTF-8 resource name {:?} in {:?}", raw, directory),
                },
                Ok(None) => break,
                Err(source) => {
                    return Err(ResourceError::ReadDir {
                        path: directory,
                        source,
                    });
                }
            }
        }

        names.sort();
        Ok(names)
    }
}
