//! Post detail service
//!
//! Opens a single post and makes sure the backend counts at most one view
//! per device: the first visit asks for a view increment, later visits do
//! not.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::entities::{Post, PostId};
use crate::domain::ports::preference_store::VIEWED_POSTS_KEY;
use crate::domain::ports::{PostRepository, PreferenceStore, PreferenceStoreExt};
use crate::error::{AppError, StoreError};

pub struct PostService<R, S>
where
    R: PostRepository,
    S: PreferenceStore,
{
    posts: Arc<R>,
    store: Arc<S>,
}

impl<R, S> PostService<R, S>
where
    R: PostRepository,
    S: PreferenceStore,
{
    pub fn new(posts: Arc<R>, store: Arc<S>) -> Self {
        Self { posts, store }
    }

    /// Ids this device has already opened
    pub fn viewed_ids(&self) -> Result<HashSet<PostId>, StoreError> {
        let viewed: Vec<PostId> = self.store.load_list(VIEWED_POSTS_KEY)?;
        Ok(viewed.into_iter().collect())
    }

    /// Fetch a post for reading
    pub async fn open_post(&self, id: &PostId) -> Result<Post, AppError> {
        if id.as_str().trim().is_empty() {
            return Err(AppError::Validation("post id must not be empty".to_string()));
        }

        let mut viewed: Vec<PostId> = self.store.load_list(VIEWED_POSTS_KEY)?;
        let first_visit = !viewed.contains(id);

        let mut post = self.posts.get_post(id, first_visit).await?;
        post.viewed = true;

        if first_visit {
            viewed.push(id.clone());
            // The post already loaded; a failed write only means a recount later.
            if let Err(e) = self.store.save(VIEWED_POSTS_KEY, &viewed) {
                tracing::warn!("Failed to persist viewed posts: {}", e);
            }
        }

        tracing::info!(post_id = %id, first_visit, "Opened post");
        Ok(post)
    }
}
