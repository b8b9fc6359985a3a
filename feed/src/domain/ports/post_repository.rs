//! Post repository port
//!
//! The blog backend is an opaque REST collaborator; this trait is all the
//! feed knows about it.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::entities::{
    Comment, CommentId, FeedFilter, NewComment, Post, PostId, PostPage, ReactionType, Reactions,
    SortKey,
};
use crate::error::RepositoryError;

/// Parameters for one page request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: SortKey,
}

impl PostQuery {
    pub fn for_filter(filter: &FeedFilter, page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            search: filter.search_filter().map(str::to_string),
            category: filter.category_filter().map(str::to_string),
            sort: filter.sort,
        }
    }
}

/// Read access to blog posts plus reader reactions and comments
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Fetch one page of posts matching the query
    async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, RepositoryError>;

    /// Fetch a single post. `count_view` asks the backend to increment its
    /// view counter.
    async fn get_post(&self, id: &PostId, count_view: bool) -> Result<Post, RepositoryError>;

    /// Toggle `kind` for `user_id` on a post, returning the updated reactions
    async fn toggle_reaction(
        &self,
        id: &PostId,
        kind: ReactionType,
        user_id: &str,
    ) -> Result<Reactions, RepositoryError>;

    /// Comment threads on a post, replies nested under their parent
    async fn list_comments(&self, id: &PostId) -> Result<Vec<Comment>, RepositoryError>;

    /// Post a comment. The returned comment carries its delete key.
    async fn add_comment(
        &self,
        id: &PostId,
        comment: &NewComment,
    ) -> Result<Comment, RepositoryError>;

    /// Remove a comment, authorized by the key handed out when it was posted
    async fn delete_comment(
        &self,
        id: &PostId,
        comment_id: &CommentId,
        delete_key: &str,
    ) -> Result<(), RepositoryError>;
}
