//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod http;
pub mod storage;

pub use http::HttpPostRepository;
pub use storage::{InMemoryPreferenceStore, JsonFilePreferenceStore};
