//! Folio feed MCP server implementation
//!
//! Every tool that changes the feed waits for the controller to settle
//! (debounce elapsed, fetch finished) before rendering, so each response
//! shows the state the action produced.

use std::sync::Arc;

use crate::session::FeedSession;
use anyhow::Result;
use folio_feed::domain::entities::{CommentId, PostId, ReactionType, SortKey};
use folio_feed::error::AppError;
use folio_feed::render::{render_comments, render_feed, render_post};
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{
    handler::server::tool::ToolRouter,
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use serde::Deserialize;

/// Folio feed MCP server
///
/// One feed session per server process.
#[derive(Clone)]
pub struct FolioFeedServer {
    session: Arc<FeedSession>,
    tool_router: ToolRouter<Self>,
}

impl FolioFeedServer {
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(FeedSession::from_env()?))
    }

    /// Wrap a session and start loading the first page
    pub fn new(session: FeedSession) -> Self {
        session.controller.initialize();
        Self {
            session: Arc::new(session),
            tool_router: Self::tool_router(),
        }
    }

    /// Abort any outstanding fetch
    pub fn shutdown(&self) {
        self.session.controller.dispose();
    }

    async fn render_settled(&self) -> CallToolResult {
        self.session.controller.settle().await;
        self.render_now()
    }

    fn render_now(&self) -> CallToolResult {
        let config = &self.session.config;
        let snapshot = self.session.controller.snapshot();
        CallToolResult::success(vec![Content::text(render_feed(
            &snapshot,
            config.asset_origin(),
            &config.site_url,
        ))])
    }

    async fn render_comments_for(&self, id: &PostId) -> CallToolResult {
        let comments = match self.session.comments.list(id).await {
            Ok(comments) => comments,
            Err(e) => return app_error(e),
        };
        let owned = self.session.comments.owned_ids().unwrap_or_else(|e| {
            tracing::warn!("Failed to read comment keys: {}", e);
            Default::default()
        });
        CallToolResult::success(vec![Content::text(render_comments(&comments, &owned))])
    }
}

fn app_error(e: AppError) -> CallToolResult {
    tracing::warn!("Tool failed: {}", e);
    CallToolResult::error(vec![Content::text(format!("{} ({})", e.user_message(), e))])
}

// --- Tool Parameter Types ---

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Text matched against post titles and excerpts; empty clears the search
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CategoryParams {
    /// Category name from the feed, or "All"
    pub category: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SortParams {
    /// Sort order: "date" (newest first) or "title"
    pub sort: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BookmarkedParams {
    /// Show only bookmarked posts
    pub enabled: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PostParams {
    /// Post id as shown in the feed
    pub post_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProgressParams {
    /// Post id as shown in the feed
    pub post_id: String,
    /// Percentage read, clamped to 0-100
    pub progress: f64,
    /// Scroll offset to resume from, in pixels
    #[serde(default)]
    pub scroll_position: f64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReactParams {
    /// Post id as shown in the feed
    pub post_id: String,
    /// Reaction: "like", "love", "wow" or "sad"
    pub reaction: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddCommentParams {
    /// Post id as shown in the feed
    pub post_id: String,
    /// Display name for the comment
    pub author: String,
    /// Comment text
    pub content: String,
    /// Id of the comment being replied to (optional)
    #[serde(default)]
    pub reply_to: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteCommentParams {
    /// Post id as shown in the feed
    pub post_id: String,
    /// Id of a comment you posted
    pub comment_id: String,
}

#[tool_router]
impl FolioFeedServer {
    // === Browsing ===

    #[tool(description = "Show the blog feed with the current search, category and sort. Call this first.")]
    async fn feed(&self) -> Result<CallToolResult, McpError> {
        Ok(self.render_settled().await)
    }

    #[tool(description = "Load the next page of posts.")]
    async fn load_more(&self) -> Result<CallToolResult, McpError> {
        if !self.session.controller.load_next_page() {
            let snapshot = self.session.controller.snapshot();
            if !snapshot.has_more {
                return Ok(CallToolResult::success(vec![Content::text(
                    "No more posts to load.",
                )]));
            }
        }
        Ok(self.render_settled().await)
    }

    #[tool(description = "Search posts by title or excerpt. Pass an empty query to clear.")]
    async fn search(&self, params: Parameters<SearchParams>) -> Result<CallToolResult, McpError> {
        self.session.controller.set_search_text(params.0.query);
        Ok(self.render_settled().await)
    }

    #[tool(description = "Filter the feed by category. Use \"All\" to clear the filter.")]
    async fn set_category(
        &self,
        params: Parameters<CategoryParams>,
    ) -> Result<CallToolResult, McpError> {
        self.session.controller.set_category(params.0.category);
        Ok(self.render_settled().await)
    }

    #[tool(description = "Change the sort order: \"date\" (newest first) or \"title\".")]
    async fn set_sort(&self, params: Parameters<SortParams>) -> Result<CallToolResult, McpError> {
        match params.0.sort.parse::<SortKey>() {
            Ok(sort) => {
                self.session.controller.set_sort_key(sort);
                Ok(self.render_settled().await)
            }
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e)])),
        }
    }

    #[tool(description = "Show only bookmarked posts, or turn that filter off.")]
    async fn show_bookmarked(
        &self,
        params: Parameters<BookmarkedParams>,
    ) -> Result<CallToolResult, McpError> {
        self.session.controller.set_bookmarked_only(params.0.enabled);
        Ok(self.render_settled().await)
    }

    #[tool(description = "Retry loading after an error.")]
    async fn retry(&self) -> Result<CallToolResult, McpError> {
        self.session.controller.retry();
        Ok(self.render_settled().await)
    }

    #[tool(description = "Clear the current error message.")]
    async fn dismiss_error(&self) -> Result<CallToolResult, McpError> {
        self.session.controller.dismiss_error();
        Ok(self.render_now())
    }

    // === Reading ===

    #[tool(description = "Bookmark a post, or remove the bookmark if it is already set.")]
    async fn toggle_bookmark(
        &self,
        params: Parameters<PostParams>,
    ) -> Result<CallToolResult, McpError> {
        let id = PostId::from(params.0.post_id);
        match self.session.controller.toggle_bookmark(&id) {
            Ok(true) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Bookmarked {}.",
                id
            ))])),
            Ok(false) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Removed bookmark for {}.",
                id
            ))])),
            Err(e) => Ok(app_error(e)),
        }
    }

    #[tool(description = "Read a full post, with reactions and where you left off.")]
    async fn read_post(&self, params: Parameters<PostParams>) -> Result<CallToolResult, McpError> {
        let id = PostId::from(params.0.post_id);
        let post = match self.session.posts.open_post(&id).await {
            Ok(post) => post,
            Err(e) => return Ok(app_error(e)),
        };
        self.session.controller.note_viewed(&id);

        let progress = self
            .session
            .controller
            .reading_progress(&id)
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to read progress for {}: {}", id, e);
                None
            });
        let user_id = self.session.reactions.user_id().ok();

        Ok(CallToolResult::success(vec![Content::text(render_post(
            &post,
            progress.as_ref(),
            user_id.as_deref(),
            &self.session.config.site_url,
        ))]))
    }

    #[tool(description = "Save how far you have read a post (0-100).")]
    async fn record_progress(
        &self,
        params: Parameters<ProgressParams>,
    ) -> Result<CallToolResult, McpError> {
        let id = PostId::from(params.0.post_id);
        match self.session.controller.record_read_progress(
            &id,
            params.0.progress,
            params.0.scroll_position,
        ) {
            Ok(progress) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Saved progress for {}: {:.0}%.",
                id, progress.progress
            ))])),
            Err(e) => Ok(app_error(e)),
        }
    }

    #[tool(description = "Toggle a reaction on a post: like, love, wow or sad.")]
    async fn react(&self, params: Parameters<ReactParams>) -> Result<CallToolResult, McpError> {
        let kind = match params.0.reaction.parse::<ReactionType>() {
            Ok(kind) => kind,
            Err(e) => return Ok(CallToolResult::error(vec![Content::text(e)])),
        };
        let id = PostId::from(params.0.post_id);

        match self.session.reactions.toggle(&id, kind).await {
            Ok(outcome) => {
                let verb = if outcome.active { "Added" } else { "Removed" };
                let counts: Vec<String> = ReactionType::ALL
                    .into_iter()
                    .map(|k| format!("{} {}", k.emoji(), outcome.reactions.count(k)))
                    .collect();
                Ok(CallToolResult::success(vec![Content::text(format!(
                    "{} {} on {}.\n{}",
                    verb,
                    kind,
                    id,
                    counts.join("  ")
                ))]))
            }
            Err(e) => Ok(app_error(e)),
        }
    }

    // === Comments ===

    #[tool(description = "List the comments on a post, with replies nested.")]
    async fn comments(&self, params: Parameters<PostParams>) -> Result<CallToolResult, McpError> {
        let id = PostId::from(params.0.post_id);
        Ok(self.render_comments_for(&id).await)
    }

    #[tool(description = "Comment on a post, or reply to a comment by passing reply_to.")]
    async fn add_comment(
        &self,
        params: Parameters<AddCommentParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let id = PostId::from(params.post_id);
        let reply_to = params
            .reply_to
            .filter(|r| !r.trim().is_empty())
            .map(CommentId::from);

        match self
            .session
            .comments
            .add(&id, &params.author, &params.content, reply_to)
            .await
        {
            Ok(_) => Ok(self.render_comments_for(&id).await),
            Err(e) => Ok(app_error(e)),
        }
    }

    #[tool(description = "Delete a comment you posted from this device.")]
    async fn delete_comment(
        &self,
        params: Parameters<DeleteCommentParams>,
    ) -> Result<CallToolResult, McpError> {
        let id = PostId::from(params.0.post_id);
        let comment_id = CommentId::from(params.0.comment_id);

        match self.session.comments.delete(&id, &comment_id).await {
            Ok(()) => Ok(self.render_comments_for(&id).await),
            Err(e) => Ok(app_error(e)),
        }
    }
}

#[tool_handler]
impl ServerHandler for FolioFeedServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "folio-feed".into(),
                title: Some("Folio Blog Feed".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                website_url: Some(self.session.config.site_url.clone()),
            },
            instructions: Some(
                r#"Folio - blog feed reader

WORKFLOW:
1. 'feed' - See the latest posts
2. 'load_more' - Fetch the next page
3. 'search', 'set_category', 'set_sort' - Narrow or reorder the feed
4. 'read_post' - Read a post by its id
5. 'toggle_bookmark' / 'show_bookmarked' - Save posts for later
6. 'record_progress' - Remember how far you read
7. 'react' - Like, love, wow or sad a post
8. 'comments' / 'add_comment' / 'delete_comment' - Join the discussion

If loading fails, use 'retry'."#
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_params_deserialize() {
        let json = r#"{"query": "rust async"}"#;
        let params: SearchParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.query, "rust async");
    }

    #[test]
    fn test_search_params_default_clears() {
        let params: SearchParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.query, "");
    }

    #[test]
    fn test_category_params_deserialize() {
        let json = r#"{"category": "Design"}"#;
        let params: CategoryParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.category, "Design");
    }

    #[test]
    fn test_sort_params_deserialize() {
        let json = r#"{"sort": "title"}"#;
        let params: SortParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.sort.parse::<SortKey>().unwrap(), SortKey::Title);
    }

    #[test]
    fn test_bookmarked_params_deserialize() {
        let json = r#"{"enabled": true}"#;
        let params: BookmarkedParams = serde_json::from_str(json).unwrap();
        assert!(params.enabled);
    }

    #[test]
    fn test_progress_params_deserialize() {
        let json = r#"{"post_id": "p1", "progress": 55.5, "scroll_position": 1200}"#;
        let params: ProgressParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.post_id, "p1");
        assert_eq!(params.progress, 55.5);
        assert_eq!(params.scroll_position, 1200.0);
    }

    #[test]
    fn test_progress_params_without_scroll() {
        let json = r#"{"post_id": "p1", "progress": 10}"#;
        let params: ProgressParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.scroll_position, 0.0);
    }

    #[test]
    fn test_react_params_deserialize() {
        let json = r#"{"post_id": "p1", "reaction": "love"}"#;
        let params: ReactParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.post_id, "p1");
        assert_eq!(params.reaction.parse::<ReactionType>().unwrap(), ReactionType::Love);
    }

    #[test]
    fn test_add_comment_params_deserialize() {
        let json = r#"{"post_id": "p1", "author": "Ana", "content": "Great post"}"#;
        let params: AddCommentParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.post_id, "p1");
        assert_eq!(params.author, "Ana");
        assert_eq!(params.reply_to, None);
    }

    #[test]
    fn test_add_comment_params_with_reply() {
        let json = r#"{"post_id": "p1", "author": "Ana", "content": "Yes", "reply_to": "c4"}"#;
        let params: AddCommentParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.reply_to.as_deref(), Some("c4"));
    }

    #[test]
    fn test_delete_comment_params_deserialize() {
        let json = r#"{"post_id": "p1", "comment_id": "c4"}"#;
        let params: DeleteCommentParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.comment_id, "c4");
    }
}
