//! Response normalization for `GET /posts`
//!
//! The backend answers either with a bare array of posts or with an
//! envelope `{posts, total?, page?, limit?}`. Anything else is treated as an
//! empty page. Individual posts that fail to decode are skipped.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::entities::{Post, PostPage};

#[derive(Deserialize)]
#[serde(untagged)]
enum PostsEnvelope {
    List(Vec<Value>),
    Paged {
        posts: Vec<Value>,
        #[serde(default)]
        total: Option<u64>,
        #[serde(default)]
        page: Option<u32>,
        #[serde(default)]
        limit: Option<u32>,
    },
}

/// Normalize a list response body into a [`PostPage`]
pub fn normalize_posts(body: Value) -> PostPage {
    let (raw_posts, total) = match serde_json::from_value::<PostsEnvelope>(body) {
        Ok(PostsEnvelope::List(posts)) => (posts, None),
        Ok(PostsEnvelope::Paged {
            posts,
            total,
            page,
            limit,
        }) => {
            tracing::debug!(?page, ?limit, ?total, "Received paged envelope");
            (posts, total)
        }
        Err(_) => {
            tracing::warn!("Unrecognized post list response shape, treating as empty");
            return PostPage::default();
        }
    };

    let posts = raw_posts
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<Post>(raw) {
            Ok(post) => Some(post),
            Err(e) => {
                tracing::warn!("Skipping malformed post: {}", e);
                None
            }
        })
        .collect();

    PostPage { posts, total }
}
