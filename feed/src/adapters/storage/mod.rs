//! Preference store adapters
//!
//! `InMemoryPreferenceStore` for tests and throwaway sessions,
//! `JsonFilePreferenceStore` for preferences that survive restarts.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFilePreferenceStore;
pub use memory::InMemoryPreferenceStore;
