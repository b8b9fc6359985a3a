//! Domain ports (traits)
//!
//! Port traits define interfaces that the feed requires.
//! Adapters provide concrete implementations of these traits.

pub mod post_repository;
pub mod preference_store;

pub use post_repository::{PostQuery, PostRepository};
pub use preference_store::{PreferenceStore, PreferenceStoreExt};
