//! Domain layer
//!
//! Contains pure feed logic with no I/O.
//! - `entities`: posts, filters, cursor, bookmarks, progress, reactions
//! - `ports`: trait definitions for the backend and preference storage

pub mod entities;
pub mod ports;
