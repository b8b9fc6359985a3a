//! Feed renderer
//!
//! Renders the feed and single posts to readable markdown.

use std::collections::HashSet;

use crate::app::FeedSnapshot;
use crate::domain::entities::{Comment, CommentId, Post, ReactionType, ReadingProgress, SortKey};

/// Render a feed snapshot to markdown format
pub fn render_feed(snapshot: &FeedSnapshot, asset_origin: &str, site_url: &str) -> String {
    let mut buf = String::new();

    buf.push_str("# Blog\n\n");

    // Active filters
    let mut filters = Vec::new();
    if let Some(search) = snapshot.filter.search_filter() {
        filters.push(format!("Search: \"{}\"", search));
    }
    if let Some(category) = snapshot.filter.category_filter() {
        filters.push(format!("Category: {}", category));
    }
    filters.push(format!(
        "Sort: {}",
        match snapshot.filter.sort {
            SortKey::Date => "latest",
            SortKey::Title => "title",
        }
    ));
    if snapshot.filter.bookmarked_only {
        filters.push("Bookmarked only".to_string());
    }
    buf.push_str(&format!("_{}_\n\n", filters.join(" | ")));

    if snapshot.pending_search.trim() != snapshot.filter.search.trim() {
        buf.push_str(&format!(
            "_Searching for \"{}\"..._\n\n",
            snapshot.pending_search.trim()
        ));
    }

    // Error goes first so it is not missed
    if let Some(error) = &snapshot.error {
        buf.push_str(&format!("> **Error:** {}\n\n", error));
    }

    if snapshot.categories.len() > 1 {
        buf.push_str(&format!(
            "Categories: {}\n\n",
            snapshot.categories.join(", ")
        ));
    }

    if snapshot.loading && snapshot.posts.is_empty() {
        buf.push_str("_Loading posts..._\n\n");
    } else if snapshot.posts.is_empty() {
        if snapshot.filter.bookmarked_only {
            buf.push_str("_No bookmarked posts yet._\n\n");
        } else {
            buf.push_str("_No posts found._\n\n");
        }
    } else {
        buf.push_str("## Posts\n\n");
        for (index, post) in snapshot.posts.iter().enumerate() {
            let bookmarked = snapshot.bookmarks.contains(&post.id);
            buf.push_str(&render_post_line(
                index + 1,
                post,
                bookmarked,
                asset_origin,
                site_url,
            ));
            buf.push('\n');
        }
    }

    if snapshot.loading_more {
        buf.push_str("_Loading more..._\n\n");
    } else if snapshot.has_more && !snapshot.posts.is_empty() {
        buf.push_str(&format!(
            "_More posts available (next page {})._\n\n",
            snapshot.page
        ));
    } else if !snapshot.posts.is_empty() {
        buf.push_str("_You've reached the end._\n\n");
    }

    buf.push_str(&format!(
        "Showing {} of {} loaded | {} bookmarked\n",
        snapshot.posts.len(),
        snapshot.loaded,
        snapshot.bookmarks.len()
    ));

    buf
}

fn render_post_line(
    index: usize,
    post: &Post,
    bookmarked: bool,
    asset_origin: &str,
    site_url: &str,
) -> String {
    let marker = if bookmarked { "[*]" } else { "[ ]" };

    let mut meta_parts = Vec::new();
    if !post.category.is_empty() {
        meta_parts.push(post.category.clone());
    }
    meta_parts.push(post.created_at.format("%b %-d, %Y").to_string());
    if !post.read_time.is_empty() {
        meta_parts.push(post.read_time.clone());
    }
    meta_parts.push(format!("{} views", post.views));

    let mut line = format!(
        "{} [{}] {} (id: {})\n    {}\n",
        marker,
        index,
        post.title,
        post.id,
        meta_parts.join(" | ")
    );

    if !post.excerpt.is_empty() {
        line.push_str(&format!("    {}\n", truncate(&post.excerpt, 120)));
    }
    line.push_str(&format!(
        "    Image: {}\n    Link: {}\n",
        post.image_url(asset_origin),
        post.share_url(site_url)
    ));

    line
}

/// Render a single post with its reactions and saved progress
pub fn render_post(
    post: &Post,
    progress: Option<&ReadingProgress>,
    user_id: Option<&str>,
    site_url: &str,
) -> String {
    let mut buf = String::new();

    buf.push_str(&format!("# {}\n\n", post.title));

    buf.push_str("## Details\n\n");
    if !post.author.is_empty() {
        buf.push_str(&format!("- **Author:** {}\n", post.author));
    }
    if !post.category.is_empty() {
        buf.push_str(&format!("- **Category:** {}\n", post.category));
    }
    buf.push_str(&format!(
        "- **Published:** {}\n",
        post.created_at.format("%B %-d, %Y")
    ));
    if !post.read_time.is_empty() {
        buf.push_str(&format!("- **Read time:** {}\n", post.read_time));
    }
    buf.push_str(&format!("- **Views:** {}\n", post.views));
    if !post.tags.is_empty() {
        buf.push_str(&format!("- **Tags:** {}\n", post.tags.join(", ")));
    }
    buf.push_str(&format!("- **Share:** {}\n", post.share_url(site_url)));

    if let Some(progress) = progress {
        if progress.is_finished() {
            buf.push_str("- **Progress:** finished\n");
        } else {
            buf.push_str(&format!(
                "- **Progress:** {:.0}% (resume at {:.0}px)\n",
                progress.progress, progress.scroll_position
            ));
        }
    }
    buf.push('\n');

    buf.push_str("## Reactions\n\n");
    let reactions: Vec<String> = ReactionType::ALL
        .into_iter()
        .map(|kind| {
            let mine = user_id
                .map(|user| post.reactions.has_reacted(kind, user))
                .unwrap_or(false);
            format!(
                "{} {}{}",
                kind.emoji(),
                post.reactions.count(kind),
                if mine { " (you)" } else { "" }
            )
        })
        .collect();
    buf.push_str(&reactions.join("  "));
    buf.push_str("\n\n");

    buf.push_str("---\n\n");
    buf.push_str(&post.content);
    buf.push('\n');

    buf
}

/// Render comment threads. Comments in `owned` are marked deletable.
pub fn render_comments(comments: &[Comment], owned: &HashSet<CommentId>) -> String {
    let mut buf = String::new();

    let total: usize = comments.iter().map(Comment::thread_len).sum();
    buf.push_str(&format!("## Comments ({})\n\n", total));

    if comments.is_empty() {
        buf.push_str("_No comments yet._\n");
        return buf;
    }

    for comment in comments {
        render_comment(&mut buf, comment, owned, 0);
    }

    buf
}

fn render_comment(buf: &mut String, comment: &Comment, owned: &HashSet<CommentId>, depth: usize) {
    let indent = "    ".repeat(depth);
    let mut header = format!(
        "{}- **{}** ({}, id: {})",
        indent,
        comment.author,
        comment.created_at.format("%B %-d, %Y"),
        comment.id
    );
    if let Some(parent) = &comment.parent_author {
        header.push_str(&format!(" replying to {}", parent));
    }
    if owned.contains(&comment.id) {
        header.push_str(" [yours, can delete]");
    }
    buf.push_str(&header);
    buf.push('\n');
    buf.push_str(&format!("{}  {}\n", indent, comment.content));

    for reply in &comment.replies {
        render_comment(buf, reply, owned, depth + 1);
    }
}

/// Truncate a string with ellipsis, on a character boundary
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Bookmarks, FeedFilter, PostId};
    use crate::test_utils::{test_post, test_posts};

    const ORIGIN: &str = "https://api.example.com";
    const SITE: &str = "https://blog.example.com";

    fn snapshot(posts: Vec<Post>) -> FeedSnapshot {
        let loaded = posts.len();
        FeedSnapshot {
            posts,
            loading: false,
            loading_more: false,
            has_more: false,
            error: None,
            page: 2,
            loaded,
            filter: FeedFilter::default(),
            pending_search: String::new(),
            categories: vec!["All".to_string(), "General".to_string()],
            bookmarks: Bookmarks::new(),
        }
    }

    // ===== render_feed tests =====

    #[test]
    fn render_feed_empty() {
        let result = render_feed(&snapshot(vec![]), ORIGIN, SITE);

        assert!(result.contains("# Blog"));
        assert!(result.contains("_No posts found._"));
        assert!(!result.contains("## Posts"));
        assert!(!result.contains("reached the end"));
    }

    #[test]
    fn render_feed_loading_skeleton() {
        let mut snap = snapshot(vec![]);
        snap.loading = true;

        let result = render_feed(&snap, ORIGIN, SITE);

        assert!(result.contains("_Loading posts..._"));
        assert!(!result.contains("_No posts found._"));
    }

    #[test]
    fn render_feed_lists_posts_with_links() {
        let mut snap = snapshot(test_posts("p", 2));
        snap.has_more = true;
        snap.bookmarks.toggle(&PostId::from("p-2"));

        let result = render_feed(&snap, ORIGIN, SITE);

        assert!(result.contains("## Posts"));
        assert!(result.contains("[ ] [1] p post 1 (id: p-1)"));
        assert!(result.contains("[*] [2] p post 2 (id: p-2)"));
        assert!(result.contains("Image: https://api.example.com/uploads/blog/p-1.jpg"));
        assert!(result.contains("Link: https://blog.example.com/blog/p-1"));
        assert!(result.contains("next page 2"));
        assert!(result.contains("Showing 2 of 2 loaded | 1 bookmarked"));
    }

    #[test]
    fn render_feed_shows_error_and_filters() {
        let mut snap = snapshot(test_posts("p", 1));
        snap.error = Some("Failed to load posts".to_string());
        snap.filter.search = "rust".to_string();
        snap.filter.category = "Design".to_string();
        snap.filter.sort = SortKey::Title;
        snap.pending_search = "rust async".to_string();

        let result = render_feed(&snap, ORIGIN, SITE);

        assert!(result.contains("> **Error:** Failed to load posts"));
        assert!(result.contains("Search: \"rust\" | Category: Design | Sort: title"));
        assert!(result.contains("Searching for \"rust async\""));
        assert!(result.contains("reached the end"));
    }

    #[test]
    fn render_feed_empty_bookmarks() {
        let mut snap = snapshot(vec![]);
        snap.filter.bookmarked_only = true;

        let result = render_feed(&snap, ORIGIN, SITE);

        assert!(result.contains("Bookmarked only"));
        assert!(result.contains("_No bookmarked posts yet._"));
    }

    // ===== render_post tests =====

    #[test]
    fn render_post_details() {
        let mut post = test_post("p1");
        post.views = 12;
        post.reactions.like = vec!["user_a".to_string(), "user_b".to_string()];

        let result = render_post(&post, None, Some("user_a"), SITE);

        assert!(result.contains("# Post p1"));
        assert!(result.contains("- **Views:** 12"));
        assert!(result.contains("- **Share:** https://blog.example.com/blog/p1"));
        assert!(result.contains("👍 2 (you)"));
        assert!(result.contains("😢 0"));
        assert!(result.contains("<p>Post p1</p>"));
        assert!(!result.contains("**Progress:**"));
    }

    #[test]
    fn render_post_progress() {
        let post = test_post("p1");
        let progress = ReadingProgress {
            progress: 42.4,
            scroll_position: 880.0,
            timestamp: 0,
        };

        let result = render_post(&post, Some(&progress), None, SITE);
        assert!(result.contains("- **Progress:** 42% (resume at 880px)"));

        let done = ReadingProgress {
            progress: 100.0,
            ..progress
        };
        let result = render_post(&post, Some(&done), None, SITE);
        assert!(result.contains("- **Progress:** finished"));
    }

    // ===== render_comments tests =====

    fn comment(id: &str, author: &str, content: &str) -> Comment {
        Comment {
            id: CommentId::from(id),
            author: author.to_string(),
            content: content.to_string(),
            created_at: chrono::Utc::now(),
            reply_to: None,
            parent_author: None,
            replies: Vec::new(),
            delete_key: None,
        }
    }

    #[test]
    fn render_comments_empty() {
        let result = render_comments(&[], &HashSet::new());
        assert!(result.contains("## Comments (0)"));
        assert!(result.contains("_No comments yet._"));
    }

    #[test]
    fn render_comments_nested_and_owned() {
        let mut parent = comment("c1", "Ana", "Great post");
        let mut reply = comment("c2", "Adela", "Thanks!");
        reply.reply_to = Some(CommentId::from("c1"));
        reply.parent_author = Some("Ana".to_string());
        parent.replies.push(reply);
        let owned: HashSet<CommentId> = [CommentId::from("c2")].into_iter().collect();

        let result = render_comments(&[parent], &owned);

        assert!(result.contains("## Comments (2)"));
        assert!(result.contains("- **Ana** ("));
        assert!(result.contains("  Great post"));
        assert!(result.contains("    - **Adela** ("));
        assert!(result.contains("replying to Ana [yours, can delete]"));
        assert!(!result.contains("id: c1) [yours"));
    }

    // ===== truncate tests =====

    #[test]
    fn truncate_short_string() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn truncate_long_string() {
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn truncate_multibyte() {
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }
}
