//! Reaction service
//!
//! Readers are anonymous; each device gets a generated user id that is
//! kept in the preference store and sent with every reaction.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::{PostId, ReactionOutcome, ReactionType};
use crate::domain::ports::preference_store::USER_ID_KEY;
use crate::domain::ports::{PostRepository, PreferenceStore, PreferenceStoreExt};
use crate::error::{AppError, StoreError};

pub struct ReactionService<R, S>
where
    R: PostRepository,
    S: PreferenceStore,
{
    posts: Arc<R>,
    store: Arc<S>,
}

impl<R, S> ReactionService<R, S>
where
    R: PostRepository,
    S: PreferenceStore,
{
    pub fn new(posts: Arc<R>, store: Arc<S>) -> Self {
        Self { posts, store }
    }

    /// This device's anonymous user id, created on first use
    pub fn user_id(&self) -> Result<String, StoreError> {
        let existing: Option<String> = self.store.load_or_default(USER_ID_KEY)?;
        if let Some(id) = existing.filter(|id| !id.is_empty()) {
            return Ok(id);
        }

        let id = format!("user_{}", Uuid::new_v4().simple());
        self.store.save(USER_ID_KEY, &id)?;
        Ok(id)
    }

    /// Add or remove `kind` on a post for this device's user
    pub async fn toggle(&self, id: &PostId, kind: ReactionType) -> Result<ReactionOutcome, AppError> {
        if id.as_str().trim().is_empty() {
            return Err(AppError::Validation("post id must not be empty".to_string()));
        }

        let user_id = self.user_id()?;
        let reactions = self.posts.toggle_reaction(id, kind, &user_id).await?;
        let active = reactions.has_reacted(kind, &user_id);

        tracing::info!(post_id = %id, reaction = %kind, active, "Reaction updated");
        Ok(ReactionOutcome {
            reactions,
            kind,
            active,
        })
    }
}
