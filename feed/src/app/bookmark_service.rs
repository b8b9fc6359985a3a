//! Bookmark service
//!
//! Bookmarks live only in the preference store; toggling never touches the
//! network.

use std::sync::Arc;

use crate::domain::entities::{Bookmarks, PostId};
use crate::domain::ports::preference_store::BOOKMARKS_KEY;
use crate::domain::ports::{PreferenceStore, PreferenceStoreExt};
use crate::error::StoreError;

pub struct BookmarkService<S>
where
    S: PreferenceStore,
{
    store: Arc<S>,
}

impl<S> BookmarkService<S>
where
    S: PreferenceStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Result<Bookmarks, StoreError> {
        Ok(self.store.load_list::<PostId>(BOOKMARKS_KEY)?.into_iter().collect())
    }

    /// Flip `id` in the stored set and persist it. Returns whether `id` is
    /// bookmarked afterwards together with the new set.
    pub fn toggle(&self, id: &PostId) -> Result<(bool, Bookmarks), StoreError> {
        let mut bookmarks = self.load()?;
        let bookmarked = bookmarks.toggle(id);
        self.store.save(BOOKMARKS_KEY, &bookmarks)?;
        tracing::debug!(post_id = %id, bookmarked, "Bookmark toggled");
        Ok((bookmarked, bookmarks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryPreferenceStore;
    use serde_json::json;

    fn service() -> (Arc<InMemoryPreferenceStore>, BookmarkService<InMemoryPreferenceStore>) {
        let store = Arc::new(InMemoryPreferenceStore::new());
        (store.clone(), BookmarkService::new(store))
    }

    #[test]
    fn toggle_persists_set() {
        let (store, service) = service();
        let id = PostId::from("p1");

        let (bookmarked, _) = service.toggle(&id).unwrap();
        assert!(bookmarked);
        assert_eq!(store.raw(BOOKMARKS_KEY), Some(json!(["p1"])));

        let (bookmarked, set) = service.toggle(&id).unwrap();
        assert!(!bookmarked);
        assert!(set.is_empty());
        assert_eq!(store.raw(BOOKMARKS_KEY), Some(json!([])));
    }

    #[test]
    fn load_reads_existing_bookmarks() {
        let store = Arc::new(
            InMemoryPreferenceStore::new().with_value(BOOKMARKS_KEY, json!(["a", "b"])),
        );
        let service = BookmarkService::new(store);
        let bookmarks = service.load().unwrap();
        assert!(bookmarks.contains(&PostId::from("a")));
        assert_eq!(bookmarks.len(), 2);
    }

    #[test]
    fn toggle_preserves_order() {
        let (store, service) = service();
        service.toggle(&PostId::from("b")).unwrap();
        service.toggle(&PostId::from("a")).unwrap();
        assert_eq!(store.raw(BOOKMARKS_KEY), Some(json!(["b", "a"])));
    }

    #[test]
    fn malformed_entry_does_not_drop_other_bookmarks() {
        let store = Arc::new(
            InMemoryPreferenceStore::new().with_value(BOOKMARKS_KEY, json!(["a", 42, "b"])),
        );
        let service = BookmarkService::new(store.clone());

        service.toggle(&PostId::from("c")).unwrap();

        assert_eq!(store.raw(BOOKMARKS_KEY), Some(json!(["a", "b", "c"])));
    }
}
