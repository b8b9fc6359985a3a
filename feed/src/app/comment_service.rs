//! Comment service
//!
//! Lists, posts and deletes comments. The delete key returned for each
//! comment this device posts is kept under `commentKeys`; a comment can only
//! be deleted while its key is held.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::domain::entities::{Comment, CommentId, NewComment, PostId};
use crate::domain::ports::preference_store::COMMENT_KEYS_KEY;
use crate::domain::ports::{PostRepository, PreferenceStore, PreferenceStoreExt};
use crate::error::{AppError, StoreError};

pub struct CommentService<R, S>
where
    R: PostRepository,
    S: PreferenceStore,
{
    posts: Arc<R>,
    store: Arc<S>,
}

impl<R, S> CommentService<R, S>
where
    R: PostRepository,
    S: PreferenceStore,
{
    pub fn new(posts: Arc<R>, store: Arc<S>) -> Self {
        Self { posts, store }
    }

    pub async fn list(&self, id: &PostId) -> Result<Vec<Comment>, AppError> {
        validate_post_id(id)?;
        Ok(self.posts.list_comments(id).await?)
    }

    /// Ids of comments this device can delete
    pub fn owned_ids(&self) -> Result<HashSet<CommentId>, StoreError> {
        let keys = self.store.load_entries(COMMENT_KEYS_KEY)?;
        Ok(keys
            .into_iter()
            .filter(|(_, key)| key.as_str().is_some_and(|k| !k.is_empty()))
            .map(|(id, _)| CommentId::from(id))
            .collect())
    }

    /// Post a comment, optionally as a reply, and remember its delete key
    pub async fn add(
        &self,
        id: &PostId,
        author: &str,
        content: &str,
        reply_to: Option<CommentId>,
    ) -> Result<Comment, AppError> {
        validate_post_id(id)?;
        let (author, content) = (author.trim(), content.trim());
        if author.is_empty() || content.is_empty() {
            return Err(AppError::Validation(
                "comment author and content must not be empty".to_string(),
            ));
        }

        let comment = self
            .posts
            .add_comment(
                id,
                &NewComment {
                    author: author.to_string(),
                    content: content.to_string(),
                    reply_to,
                },
            )
            .await?;

        if let Some(delete_key) = comment.delete_key.as_deref().filter(|k| !k.is_empty()) {
            // The comment is already posted; losing the key only loses the
            // ability to delete it.
            if let Err(e) = self.remember_key(&comment.id, delete_key) {
                tracing::warn!("Failed to persist delete key for comment {}: {}", comment.id, e);
            }
        }

        tracing::info!(post_id = %id, comment_id = %comment.id, "Comment posted");
        Ok(comment)
    }

    /// Delete a comment this device posted
    pub async fn delete(&self, id: &PostId, comment_id: &CommentId) -> Result<(), AppError> {
        validate_post_id(id)?;
        let keys = self.store.load_entries(COMMENT_KEYS_KEY)?;
        let Some(delete_key) = keys
            .get(comment_id.as_str())
            .and_then(Value::as_str)
            .filter(|k| !k.is_empty())
        else {
            return Err(AppError::Validation(format!(
                "comment {} was not posted from this device",
                comment_id
            )));
        };

        self.posts.delete_comment(id, comment_id, delete_key).await?;
        self.forget_key(comment_id)?;

        tracing::info!(post_id = %id, comment_id = %comment_id, "Comment deleted");
        Ok(())
    }

    fn remember_key(&self, comment_id: &CommentId, delete_key: &str) -> Result<(), StoreError> {
        let mut keys = self.store.load_entries(COMMENT_KEYS_KEY)?;
        keys.insert(comment_id.to_string(), Value::String(delete_key.to_string()));
        self.store.save(COMMENT_KEYS_KEY, &keys)
    }

    fn forget_key(&self, comment_id: &CommentId) -> Result<(), StoreError> {
        let mut keys = self.store.load_entries(COMMENT_KEYS_KEY)?;
        if keys.remove(comment_id.as_str()).is_some() {
            self.store.save(COMMENT_KEYS_KEY, &keys)?;
        }
        Ok(())
    }
}

fn validate_post_id(id: &PostId) -> Result<(), AppError> {
    if id.as_str().trim().is_empty() {
        return Err(AppError::Validation("post id must not be empty".to_string()));
    }
    Ok(())
}
