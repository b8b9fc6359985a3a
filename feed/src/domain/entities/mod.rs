//! Domain entities
//!
//! Pure domain models for the blog feed.

pub mod comment;
pub mod feed;
pub mod post;
pub mod reaction;
pub mod reading_progress;

pub use comment::{Comment, CommentId, NewComment};
pub use feed::{Bookmarks, FeedFilter, PageCursor};
pub use post::{categories, Post, PostId, PostPage, SortKey, ALL_CATEGORIES};
pub use reaction::{ReactionOutcome, ReactionType, Reactions};
pub use reading_progress::{clamp_progress, ReadingProgress};
