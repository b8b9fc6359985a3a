//! Feed rendering
//!
//! Markdown rendering of feed snapshots, post details and comments.

pub mod renderer;

pub use renderer::{render_comments, render_feed, render_post, truncate};
