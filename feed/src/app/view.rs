//! Derived feed view
//!
//! Pure filtering and sorting over the accumulated posts.

use std::cmp::{Ordering, Reverse};

use crate::domain::entities::{Bookmarks, FeedFilter, Post, SortKey};

/// Filter `posts` by search text, category and bookmark membership, then
/// sort them. Sorting is stable: posts with equal keys keep their loaded
/// order.
pub fn derive_view(posts: &[Post], filter: &FeedFilter, bookmarks: &Bookmarks) -> Vec<Post> {
    let needle = filter.search.trim().to_lowercase();
    let category = filter.category_filter();

    let mut view: Vec<Post> = posts
        .iter()
        .filter(|post| post.matches_search(&needle))
        .filter(|post| category.map_or(true, |c| post.category == c))
        .filter(|post| !filter.bookmarked_only || bookmarks.contains(&post.id))
        .cloned()
        .collect();

    match filter.sort {
        SortKey::Date => view.sort_by_key(|post| Reverse(post.created_at)),
        SortKey::Title => view.sort_by(|a, b| compare_titles(&a.title, &b.title)),
    }

    view
}

fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
