//! Unified error types for the feed library
//!
//! This module defines error types for each layer:
//! - `RepositoryError`: blog backend client errors
//! - `StoreError`: preference store errors
//! - `AppError`: application layer errors (wraps the above for callers)

use thiserror::Error;

/// Blog backend client errors
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Post not found: {0}")]
    NotFound(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// Preference store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Application layer errors - returned to the presentation layer
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Backend error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Short message suitable for a transient notification
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Repository(RepositoryError::NotFound(_)) => "Blog post not found",
            AppError::Repository(RepositoryError::RateLimited) => {
                "Too many requests, please try again shortly"
            }
            AppError::Repository(_) => "Failed to reach the blog server",
            AppError::Store(_) => "Failed to save your preferences",
            AppError::Validation(_) => "Invalid request",
        }
    }
}
