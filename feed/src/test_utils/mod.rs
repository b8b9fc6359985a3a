//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//! The in-memory repository behaves like a small backend: it filters,
//! sorts and paginates a fixed corpus, and can be told to answer slowly or
//! fail on given pages.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
