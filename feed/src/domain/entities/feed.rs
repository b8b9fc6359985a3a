//! Feed state entities
//!
//! Filter/sort selection, the pagination cursor and the bookmark set.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Post, PostId, PostPage, SortKey, ALL_CATEGORIES};

/// Filter and sort selection driving both the backend query and the local view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedFilter {
    /// Committed (debounced) search text
    pub search: String,
    /// Selected category, `"All"` for no filter
    pub category: String,
    pub sort: SortKey,
    pub bookmarked_only: bool,
}

impl Default for FeedFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL_CATEGORIES.to_string(),
            sort: SortKey::Date,
            bookmarked_only: false,
        }
    }
}

impl FeedFilter {
    /// Category to send to the backend, `None` when unfiltered
    pub fn category_filter(&self) -> Option<&str> {
        if self.category.is_empty() || self.category == ALL_CATEGORIES {
            None
        } else {
            Some(&self.category)
        }
    }

    /// Search text to send to the backend, `None` when blank
    pub fn search_filter(&self) -> Option<&str> {
        let trimmed = self.search.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

/// Pagination position plus everything loaded so far
///
/// `page` is the next page to request: 1 before anything has loaded, and
/// `n + 1` after page `n` returned posts.
#[derive(Debug, Clone, PartialEq)]
pub struct PageCursor {
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
    pub posts: Vec<Post>,
}

impl PageCursor {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            has_more: true,
            posts: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        self.page = 1;
        self.has_more = true;
        self.posts.clear();
    }

    /// Merge page `page` into the accumulated list, skipping ids already
    /// present. Returns the number of posts actually added.
    ///
    /// Without a reported total, a full-sized page is taken to mean more
    /// pages exist. That over-reports by one request when the final page is
    /// exactly full.
    pub fn merge(&mut self, page: u32, batch: PostPage) -> usize {
        let returned = batch.posts.len();
        let mut seen: HashSet<PostId> = self.posts.iter().map(|p| p.id.clone()).collect();

        let before = self.posts.len();
        for post in batch.posts {
            if seen.insert(post.id.clone()) {
                self.posts.push(post);
            }
        }
        let added = self.posts.len() - before;

        self.has_more = match batch.total {
            Some(total) => (self.posts.len() as u64) < total,
            None => returned >= self.page_size as usize,
        };

        if returned > 0 {
            self.page = page.saturating_add(1);
        }

        added
    }
}

/// Bookmarked post ids, in the order they were bookmarked
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bookmarks(Vec<PostId>);

impl Bookmarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &PostId) -> bool {
        self.0.contains(id)
    }

    /// Flip membership. Returns `true` when `id` is bookmarked afterwards.
    pub fn toggle(&mut self, id: &PostId) -> bool {
        if let Some(pos) = self.0.iter().position(|b| b == id) {
            self.0.remove(pos);
            false
        } else {
            self.0.push(id.clone());
            true
        }
    }

    pub fn ids(&self) -> &[PostId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<PostId> for Bookmarks {
    fn from_iter<I: IntoIterator<Item = PostId>>(iter: I) -> Self {
        let mut bookmarks = Bookmarks::new();
        for id in iter {
            if !bookmarks.contains(&id) {
                bookmarks.0.push(id);
            }
        }
        bookmarks
    }
}
