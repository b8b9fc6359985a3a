//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities and the ports.

pub mod bookmark_service;
pub mod comment_service;
pub mod feed_controller;
pub mod post_service;
pub mod reaction_service;
pub mod reading_progress_service;
pub mod view;

pub use bookmark_service::BookmarkService;
pub use comment_service::CommentService;
pub use feed_controller::{FeedController, FeedSettings, FeedSnapshot, LOAD_FAILED_MESSAGE};
pub use post_service::PostService;
pub use reaction_service::ReactionService;
pub use reading_progress_service::ReadingProgressService;
pub use view::derive_view;
