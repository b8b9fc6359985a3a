//! Mock implementations of port traits

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::app::derive_view;
use crate::domain::entities::{
    Bookmarks, Comment, CommentId, FeedFilter, NewComment, Post, PostId, PostPage, ReactionType,
    Reactions,
};
use crate::domain::ports::{PostQuery, PostRepository};
use crate::error::RepositoryError;

type DelayRule = (Box<dyn Fn(&PostQuery) -> bool + Send + Sync>, Duration);

// ============================================================================
// In-Memory Post Repository
// ============================================================================

pub struct InMemoryPostRepository {
    posts: Arc<RwLock<Vec<Post>>>,
    reactions: Arc<RwLock<HashMap<PostId, Reactions>>>,
    /// Flat comment list per post with each comment's delete key
    comments: Arc<RwLock<HashMap<PostId, Vec<(Comment, String)>>>>,
    next_comment: Arc<RwLock<u32>>,
    report_total: bool,
    delay: Duration,
    delay_rules: Vec<DelayRule>,
    failing_pages: Arc<RwLock<HashSet<u32>>>,
    list_requests: Arc<RwLock<Vec<PostQuery>>>,
    detail_requests: Arc<RwLock<Vec<(String, bool)>>>,
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self {
            posts: Arc::default(),
            reactions: Arc::default(),
            comments: Arc::default(),
            next_comment: Arc::default(),
            report_total: true,
            delay: Duration::ZERO,
            delay_rules: Vec::new(),
            failing_pages: Arc::default(),
            list_requests: Arc::default(),
            detail_requests: Arc::default(),
        }
    }
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the corpus
    pub fn with_posts(self, posts: Vec<Post>) -> Self {
        self.posts.write().unwrap().extend(posts);
        self
    }

    /// Answer list requests with a bare array (no total)
    pub fn without_total(mut self) -> Self {
        self.report_total = false;
        self
    }

    /// Delay every list response
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Delay list responses matching `matches`; the first matching rule wins
    pub fn with_delay_when(
        mut self,
        matches: impl Fn(&PostQuery) -> bool + Send + Sync + 'static,
        delay: Duration,
    ) -> Self {
        self.delay_rules.push((Box::new(matches), delay));
        self
    }

    /// Fail list requests for `page`
    pub fn failing_on_page(self, page: u32) -> Self {
        self.failing_pages.write().unwrap().insert(page);
        self
    }

    pub fn clear_failures(&self) {
        self.failing_pages.write().unwrap().clear();
    }

    /// Every list query received, in order
    pub fn list_requests(&self) -> Vec<PostQuery> {
        self.list_requests.read().unwrap().clone()
    }

    /// Every detail request received as `(id, count_view)`
    pub fn detail_requests(&self) -> Vec<(String, bool)> {
        self.detail_requests.read().unwrap().clone()
    }

    /// Store a comment posted by someone else (no key known locally)
    pub fn seed_comment(&self, id: &PostId, comment_id: &str, author: &str, content: &str) {
        let comment = Comment {
            id: CommentId::from(comment_id),
            author: author.to_string(),
            content: content.to_string(),
            created_at: chrono::Utc::now(),
            reply_to: None,
            parent_author: None,
            replies: Vec::new(),
            delete_key: None,
        };
        self.comments
            .write()
            .unwrap()
            .entry(id.clone())
            .or_default()
            .push((comment, format!("secret-{}", comment_id)));
    }

    fn require_post(&self, id: &PostId) -> Result<(), RepositoryError> {
        if self.posts.read().unwrap().iter().any(|p| &p.id == id) {
            Ok(())
        } else {
            Err(RepositoryError::NotFound(id.to_string()))
        }
    }

    fn delay_for(&self, query: &PostQuery) -> Duration {
        self.delay_rules
            .iter()
            .find(|(matches, _)| matches(query))
            .map(|(_, delay)| *delay)
            .unwrap_or(self.delay)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, RepositoryError> {
        self.list_requests.write().unwrap().push(query.clone());

        let delay = self.delay_for(query);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.failing_pages.read().unwrap().contains(&query.page) {
            return Err(RepositoryError::Api {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }

        let filter = FeedFilter {
            search: query.search.clone().unwrap_or_default(),
            category: query
                .category
                .clone()
                .unwrap_or_else(|| crate::domain::entities::ALL_CATEGORIES.to_string()),
            sort: query.sort,
            bookmarked_only: false,
        };
        let matching = derive_view(&self.posts.read().unwrap(), &filter, &Bookmarks::new());

        let start = (query.page.saturating_sub(1) as usize).saturating_mul(query.limit as usize);
        let posts: Vec<Post> = matching
            .iter()
            .skip(start)
            .take(query.limit as usize)
            .cloned()
            .collect();

        Ok(PostPage {
            posts,
            total: self.report_total.then_some(matching.len() as u64),
        })
    }

    async fn get_post(&self, id: &PostId, count_view: bool) -> Result<Post, RepositoryError> {
        self.detail_requests
            .write()
            .unwrap()
            .push((id.to_string(), count_view));

        let mut posts = self.posts.write().unwrap();
        let post = posts
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        if count_view {
            post.views += 1;
        }
        Ok(post.clone())
    }

    async fn toggle_reaction(
        &self,
        id: &PostId,
        kind: ReactionType,
        user_id: &str,
    ) -> Result<Reactions, RepositoryError> {
        self.require_post(id)?;

        let mut reactions = self.reactions.write().unwrap();
        let entry = reactions.entry(id.clone()).or_default();
        let users = match kind {
            ReactionType::Like => &mut entry.like,
            ReactionType::Love => &mut entry.love,
            ReactionType::Wow => &mut entry.wow,
            ReactionType::Sad => &mut entry.sad,
        };
        if let Some(pos) = users.iter().position(|u| u == user_id) {
            users.remove(pos);
        } else {
            users.push(user_id.to_string());
        }
        Ok(entry.clone())
    }

    async fn list_comments(&self, id: &PostId) -> Result<Vec<Comment>, RepositoryError> {
        self.require_post(id)?;
        let comments = self.comments.read().unwrap();
        let flat: Vec<Comment> = comments
            .get(id)
            .map(|stored| stored.iter().map(|(c, _)| c.clone()).collect())
            .unwrap_or_default();
        Ok(thread(&flat, None))
    }

    async fn add_comment(
        &self,
        id: &PostId,
        comment: &NewComment,
    ) -> Result<Comment, RepositoryError> {
        self.require_post(id)?;

        let n = {
            let mut next = self.next_comment.write().unwrap();
            *next += 1;
            *next
        };
        let mut comments = self.comments.write().unwrap();
        let stored = comments.entry(id.clone()).or_default();
        let parent_author = comment.reply_to.as_ref().and_then(|parent| {
            stored
                .iter()
                .find(|(c, _)| &c.id == parent)
                .map(|(c, _)| c.author.clone())
        });

        let created = Comment {
            id: CommentId::from(format!("c{}", n)),
            author: comment.author.clone(),
            content: comment.content.clone(),
            created_at: chrono::Utc::now(),
            reply_to: comment.reply_to.clone(),
            parent_author,
            replies: Vec::new(),
            delete_key: None,
        };
        let key = format!("key-{}", n);
        stored.push((created.clone(), key.clone()));

        Ok(Comment {
            delete_key: Some(key),
            ..created
        })
    }

    async fn delete_comment(
        &self,
        id: &PostId,
        comment_id: &CommentId,
        delete_key: &str,
    ) -> Result<(), RepositoryError> {
        let mut comments = self.comments.write().unwrap();
        let stored = comments.entry(id.clone()).or_default();
        let pos = stored
            .iter()
            .position(|(c, _)| &c.id == comment_id)
            .ok_or_else(|| RepositoryError::NotFound(comment_id.to_string()))?;
        if stored[pos].1 != delete_key {
            return Err(RepositoryError::Api {
                status: 403,
                message: "Invalid delete key".to_string(),
            });
        }
        stored.remove(pos);
        Ok(())
    }
}

/// Nest `flat` comments under their parents, starting from `parent`
fn thread(flat: &[Comment], parent: Option<&CommentId>) -> Vec<Comment> {
    flat.iter()
        .filter(|c| c.reply_to.as_ref() == parent)
        .map(|c| Comment {
            replies: thread(flat, Some(&c.id)),
            ..c.clone()
        })
        .collect()
}
