//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::entities::{Post, PostId, Reactions};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

/// Create a test post with default values
pub fn test_post(id: &str) -> Post {
    test_post_with(id, &format!("Post {}", id), "General", base_time())
}

/// Create a test post with the fields the feed filters on
pub fn test_post_with(id: &str, title: &str, category: &str, created_at: DateTime<Utc>) -> Post {
    Post {
        id: PostId::from(id),
        title: title.to_string(),
        excerpt: format!("Excerpt for {}", title),
        content: format!("<p>{}</p>", title),
        category: category.to_string(),
        tags: vec!["blog".to_string()],
        author: "Adela".to_string(),
        created_at,
        read_time: "3 min read".to_string(),
        image: Some(format!("/uploads/blog/{}.jpg", id)),
        views: 0,
        reactions: Reactions::default(),
        viewed: false,
    }
}

/// Create `count` posts with ids `{prefix}-1..={prefix}-{count}`, newest first
pub fn test_posts(prefix: &str, count: usize) -> Vec<Post> {
    (1..=count)
        .map(|n| {
            let created_at = base_time() - Duration::hours(n as i64);
            test_post_with(
                &format!("{}-{}", prefix, n),
                &format!("{} post {}", prefix, n),
                "General",
                created_at,
            )
        })
        .collect()
}
