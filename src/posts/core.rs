use super::{error::PostsError, types::*};
use crate::index::{DynDocumentIndex, IndexError};
use tracing::{debug, info};
use uuid::Uuid;

pub const PRIMARY_KEY: &str = "id";

/// Create, fetch and delete posts stored as documents in the index.
///
/// Writes only enqueue work on the index; a `get` right after `upsert` may
/// not see the new document until the returned task has been processed.
#[derive(Clone)]
pub struct PostRepository {
    index: DynDocumentIndex,
}

impl PostRepository {
    pub fn new(index: DynDocumentIndex) -> Self {
        Self { index }
    }

    pub async fn get(&self, id: &str) -> Result<Post, PostsError> {
        let document = self.index.get_document(id).await.map_err(|e| match e {
            IndexError::DocumentNotFound(_) => PostsError::PostNotFound(id.to_string()),
            other => PostsError::IndexError(other),
        })?;

        Ok(serde_json::from_value(document)?)
    }

    /// Inserts or replaces a post. An empty id is replaced with a fresh v4 UUID.
    pub async fn upsert(&self, mut post: Post) -> Result<PostAck, PostsError> {
        if post.id.is_empty() {
            post.id = Uuid::new_v4().to_string();
            debug!("Assigned new post id {}", post.id);
        }

        let document = serde_json::to_value(&post)?;
        let task = self
            .index
            .add_documents(vec![document], PRIMARY_KEY)
            .await?;

        info!("Enqueued upsert of post {} as task {}", post.id, task.task_uid);

        Ok(PostAck {
            task_id: task.task_uid,
            post_id: post.id,
        })
    }

    /// Enqueues deletion without checking that the post exists.
    pub async fn delete(&self, id: &str) -> Result<PostAck, PostsError> {
        let task = self.index.delete_document(id).await?;

        info!("Enqueued deletion of post {} as task {}", id, task.task_uid);

        Ok(PostAck {
            task_id: task.task_uid,
            post_id: id.to_string(),
        })
    }
}
