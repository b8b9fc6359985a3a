//! Reading progress service

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::entities::{PostId, ReadingProgress};
use crate::domain::ports::preference_store::READING_PROGRESS_KEY;
use crate::domain::ports::{PreferenceStore, PreferenceStoreExt};
use crate::error::StoreError;

pub struct ReadingProgressService<S>
where
    S: PreferenceStore,
{
    store: Arc<S>,
}

impl<S> ReadingProgressService<S>
where
    S: PreferenceStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Store progress for a post, clamping `fraction` to `[0, 100]`
    pub fn record(
        &self,
        id: &PostId,
        fraction: f64,
        offset: f64,
    ) -> Result<ReadingProgress, StoreError> {
        self.record_at(id, fraction, offset, Utc::now())
    }

    pub fn record_at(
        &self,
        id: &PostId,
        fraction: f64,
        offset: f64,
        at: DateTime<Utc>,
    ) -> Result<ReadingProgress, StoreError> {
        let progress = ReadingProgress::new(fraction, offset, at);
        // Other posts' entries are written back as stored, even ones that no
        // longer decode.
        let mut all = self.store.load_entries(READING_PROGRESS_KEY)?;
        all.insert(id.to_string(), serde_json::to_value(progress)?);
        self.store.save(READING_PROGRESS_KEY, &all)?;
        Ok(progress)
    }

    /// Saved progress for a post, used to restore the scroll position
    pub fn load(&self, id: &PostId) -> Result<Option<ReadingProgress>, StoreError> {
        let mut all = self.store.load_entries(READING_PROGRESS_KEY)?;
        let Some(entry) = all.remove(id.as_str()) else {
            return Ok(None);
        };
        match serde_json::from_value(entry) {
            Ok(progress) => Ok(Some(progress)),
            Err(e) => {
                tracing::warn!("Ignoring malformed reading progress for {}: {}", id, e);
                Ok(None)
            }
        }
    }
}
