//! Folio Feed
//!
//! Client-side blog feed: paginated loading with search, category and sort
//! filters, local bookmarks, reading progress and reactions.

pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod render;

#[cfg(test)]
pub mod test_utils;
