//! Post domain entity
//!
//! Blog posts as served by the backend. The controller never edits a post
//! except for the locally remembered `viewed` marker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Reactions;

/// Category value meaning "no category filter"
pub const ALL_CATEGORIES: &str = "All";

/// Upload served when a post has no image of its own
const DEFAULT_IMAGE_PATH: &str = "/uploads/blog/default.jpg";

/// Opaque post identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub String);

impl PostId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PostId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PostId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id", alias = "id")]
    pub id: PostId,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    /// Rich text (HTML)
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    /// Display string such as "5 min read"
    #[serde(default)]
    pub read_time: String,
    /// Absolute URL or a path relative to the backend origin
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub reactions: Reactions,
    /// Set locally when this device has already opened the post
    #[serde(skip)]
    pub viewed: bool,
}

impl Post {
    /// Resolve the image reference against the backend origin
    pub fn image_url(&self, origin: &str) -> String {
        let origin = origin.trim_end_matches('/');
        match self.image.as_deref().map(str::trim) {
            None | Some("") => format!("{}{}", origin, DEFAULT_IMAGE_PATH),
            Some(path) if path.starts_with("http") => path.to_string(),
            Some(path) if path.starts_with('/') => format!("{}{}", origin, path),
            Some(path) => format!("{}/{}", origin, path),
        }
    }

    /// Public link to the post page
    pub fn share_url(&self, site_url: &str) -> String {
        format!("{}/blog/{}", site_url.trim_end_matches('/'), self.id)
    }

    /// Case-insensitive match of `needle_lower` against title or excerpt.
    /// `needle_lower` must already be lowercased.
    pub fn matches_search(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty()
            || self.title.to_lowercase().contains(needle_lower)
            || self.excerpt.to_lowercase().contains(needle_lower)
    }
}

/// Sort order for the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Newest first
    #[default]
    Date,
    Title,
}

impl SortKey {
    /// Value sent as the `sortBy` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Title => "title",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_query())
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "date" | "latest" => Ok(SortKey::Date),
            "title" => Ok(SortKey::Title),
            _ => Err(format!("Unknown sort key: {}. Use: date, title", s)),
        }
    }
}

/// One normalized page of results from the backend
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostPage {
    pub posts: Vec<Post>,
    /// Total matching posts, when the backend reports it
    pub total: Option<u64>,
}

/// "All" followed by each distinct category in first-seen order
pub fn categories(posts: &[Post]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    for post in posts {
        if !post.category.is_empty() && !out.iter().any(|c| c == &post.category) {
            out.push(post.category.clone());
        }
    }
    out
}
