//! Feed session
//!
//! Wires the HTTP repository and the preference store into the feed
//! controller and the post, reaction and comment services for one reader.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use folio_feed::adapters::{HttpPostRepository, InMemoryPreferenceStore, JsonFilePreferenceStore};
use folio_feed::app::{CommentService, FeedController, PostService, ReactionService};
use folio_feed::config::Config;
use folio_feed::domain::ports::PreferenceStore;
use folio_feed::error::StoreError;
use serde_json::Value;

/// Preference store selected by configuration
pub enum Preferences {
    File(JsonFilePreferenceStore),
    Memory(InMemoryPreferenceStore),
}

impl Preferences {
    pub fn from_config(config: &Config) -> Result<Self> {
        match &config.prefs_path {
            Some(path) => {
                let store = JsonFilePreferenceStore::open(path).with_context(|| {
                    format!("Failed to open preference file {}", path.display())
                })?;
                tracing::info!(path = %path.display(), "Using file-backed preferences");
                Ok(Preferences::File(store))
            }
            None => {
                tracing::info!("FOLIO_PREFS_PATH not set, preferences will not persist");
                Ok(Preferences::Memory(InMemoryPreferenceStore::new()))
            }
        }
    }
}

impl PreferenceStore for Preferences {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        match self {
            Preferences::File(store) => store.get(key),
            Preferences::Memory(store) => store.get(key),
        }
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        match self {
            Preferences::File(store) => store.set(key, value),
            Preferences::Memory(store) => store.set(key, value),
        }
    }
}

pub struct FeedSession {
    pub config: Config,
    pub controller: FeedController<HttpPostRepository, Preferences>,
    pub posts: PostService<HttpPostRepository, Preferences>,
    pub reactions: ReactionService<HttpPostRepository, Preferences>,
    pub comments: CommentService<HttpPostRepository, Preferences>,
}

impl FeedSession {
    /// Build a session from `FOLIO_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env())
    }

    pub fn new(config: Config) -> Result<Self> {
        let repository = Arc::new(
            HttpPostRepository::new(
                &config.api_url,
                Duration::from_secs(config.request_timeout_secs),
            )
            .context("Failed to build HTTP client")?
            .with_posts_path(&config.posts_path),
        );
        let store = Arc::new(Preferences::from_config(&config)?);

        let controller = FeedController::new(
            repository.clone(),
            store.clone(),
            config.feed_settings(),
        );
        let posts = PostService::new(repository.clone(), store.clone());
        let reactions = ReactionService::new(repository.clone(), store.clone());
        let comments = CommentService::new(repository, store);

        Ok(Self {
            config,
            controller,
            posts,
            reactions,
            comments,
        })
    }
}
