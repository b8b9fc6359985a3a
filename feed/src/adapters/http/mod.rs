//! Blog backend adapter over HTTP

pub mod client;
pub mod envelope;

pub use client::HttpPostRepository;
pub use envelope::normalize_posts;
