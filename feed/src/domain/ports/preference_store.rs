//! Preference store port
//!
//! Small key/value storage for reader preferences (bookmarks, reading
//! progress, viewed posts, anonymous user id, comment delete keys). Values
//! are JSON.
//! Access is synchronous.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::StoreError;

pub const BOOKMARKS_KEY: &str = "bookmarks";
pub const READING_PROGRESS_KEY: &str = "readingProgress";
pub const VIEWED_POSTS_KEY: &str = "viewedPosts";
pub const USER_ID_KEY: &str = "userId";
/// Map of comment id to the delete key handed out when it was posted
pub const COMMENT_KEYS_KEY: &str = "commentKeys";

pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// Typed helpers over any [`PreferenceStore`]
pub trait PreferenceStoreExt: PreferenceStore {
    /// Read and decode `key`. Missing keys and undecodable values both yield
    /// `T::default()`; the latter is logged.
    fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StoreError> {
        let Some(value) = self.get(key)? else {
            return Ok(T::default());
        };
        match serde_json::from_value(value) {
            Ok(decoded) => Ok(decoded),
            Err(e) => {
                tracing::warn!("Ignoring malformed preference {}: {}", key, e);
                Ok(T::default())
            }
        }
    }

    /// Read a JSON array element by element. Undecodable elements are
    /// skipped, so one bad entry never discards the rest of the list.
    fn load_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        let items = match self.get(key)? {
            None => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(other) => {
                tracing::warn!("Ignoring preference {}: expected an array, got {}", key, other);
                return Ok(Vec::new());
            }
        };

        Ok(items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    tracing::warn!("Skipping malformed entry in preference {}: {}", key, e);
                    None
                }
            })
            .collect())
    }

    /// Read a JSON object without decoding its entries, so callers can
    /// update one entry and write the rest back untouched.
    fn load_entries(&self, key: &str) -> Result<Map<String, Value>, StoreError> {
        match self.get(key)? {
            None => Ok(Map::new()),
            Some(Value::Object(entries)) => Ok(entries),
            Some(other) => {
                tracing::warn!("Ignoring preference {}: expected an object, got {}", key, other);
                Ok(Map::new())
            }
        }
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        self.set(key, serde_json::to_value(value)?)
    }
}

impl<S: PreferenceStore + ?Sized> PreferenceStoreExt for S {}
