//! Feed controller
//!
//! Owns the filter/sort selection, the page cursor and the lifecycle of the
//! single in-flight page request, and derives the list the presentation
//! layer renders.
//!
//! Every fetch gets a generation number. Starting a fetch aborts the task of
//! the previous one, and a completed fetch is applied only if its generation
//! is still the latest, so a response can never overwrite state belonging to
//! a newer filter. The state lock is never held across an await.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::view::derive_view;
use super::{BookmarkService, ReadingProgressService};
use crate::domain::entities::{
    categories, Bookmarks, FeedFilter, PageCursor, Post, PostId, PostPage, ReadingProgress,
    SortKey,
};
use crate::domain::ports::preference_store::VIEWED_POSTS_KEY;
use crate::domain::ports::{PostQuery, PostRepository, PreferenceStore, PreferenceStoreExt};
use crate::error::{AppError, RepositoryError};

/// Message shown when a page fails to load
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load blog posts";

/// Controller tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSettings {
    pub page_size: u32,
    /// Quiet period before typed search text is committed
    pub search_debounce: Duration,
    /// Minimum time the first-page loading indicator stays on
    pub min_skeleton: Duration,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_size: 6,
            search_debounce: Duration::from_millis(500),
            min_skeleton: Duration::from_millis(200),
        }
    }
}

/// What the presentation layer renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedSnapshot {
    /// Filtered, sorted view of the accumulated posts
    pub posts: Vec<Post>,
    pub loading: bool,
    pub loading_more: bool,
    pub has_more: bool,
    pub error: Option<String>,
    /// Next page that `load_next_page` would request
    pub page: u32,
    /// Number of posts loaded so far, before local filtering
    pub loaded: usize,
    pub filter: FeedFilter,
    /// Search text as typed, possibly not yet committed
    pub pending_search: String,
    pub categories: Vec<String>,
    pub bookmarks: Bookmarks,
}

struct InFlight {
    generation: u64,
    task: JoinHandle<()>,
}

struct FeedState {
    filter: FeedFilter,
    pending_search: String,
    cursor: PageCursor,
    bookmarks: Bookmarks,
    viewed: HashSet<PostId>,
    loading: bool,
    loading_more: bool,
    error: Option<String>,
    generation: u64,
    in_flight: Option<InFlight>,
    search_generation: u64,
    debounce: Option<JoinHandle<()>>,
}

impl FeedState {
    fn cancel_in_flight(&mut self) {
        if let Some(prev) = self.in_flight.take() {
            prev.task.abort();
            tracing::debug!(generation = prev.generation, "Cancelled superseded fetch");
        }
    }

    fn overlay_viewed(&mut self) {
        let viewed = &self.viewed;
        for post in &mut self.cursor.posts {
            post.viewed = viewed.contains(&post.id);
        }
    }
}

struct Inner<R, S>
where
    R: PostRepository,
    S: PreferenceStore,
{
    posts: Arc<R>,
    bookmarks: BookmarkService<S>,
    progress: ReadingProgressService<S>,
    settings: FeedSettings,
    state: Mutex<FeedState>,
    changes: watch::Sender<u64>,
}

/// Paginated, filterable blog feed
pub struct FeedController<R, S>
where
    R: PostRepository,
    S: PreferenceStore,
{
    inner: Arc<Inner<R, S>>,
}

impl<R, S> Clone for FeedController<R, S>
where
    R: PostRepository,
    S: PreferenceStore,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, S> FeedController<R, S>
where
    R: PostRepository + 'static,
    S: PreferenceStore + 'static,
{
    /// Create a controller. Bookmarks and viewed posts are read from the
    /// store here; unreadable preferences start empty.
    pub fn new(posts: Arc<R>, store: Arc<S>, settings: FeedSettings) -> Self {
        let bookmarks = BookmarkService::new(Arc::clone(&store));
        let progress = ReadingProgressService::new(Arc::clone(&store));

        let saved_bookmarks = bookmarks.load().unwrap_or_else(|e| {
            tracing::warn!("Failed to read bookmarks: {}", e);
            Bookmarks::new()
        });
        let viewed: HashSet<PostId> = store
            .load_list::<PostId>(VIEWED_POSTS_KEY)
            .map(|ids| ids.into_iter().collect())
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to read viewed posts: {}", e);
                HashSet::new()
            });

        let state = FeedState {
            filter: FeedFilter::default(),
            pending_search: String::new(),
            cursor: PageCursor::new(settings.page_size),
            bookmarks: saved_bookmarks,
            viewed,
            loading: false,
            loading_more: false,
            error: None,
            generation: 0,
            in_flight: None,
            search_generation: 0,
            debounce: None,
        };
        let (changes, _) = watch::channel(0);

        Self {
            inner: Arc::new(Inner {
                posts,
                bookmarks,
                progress,
                settings,
                state: Mutex::new(state),
                changes,
            }),
        }
    }

    pub fn settings(&self) -> FeedSettings {
        self.inner.settings
    }

    /// Reset the cursor and load the first page
    pub fn initialize(&self) {
        self.inner.refetch_first_page();
    }

    /// Echo typed text immediately; commit it once the debounce window
    /// passes without further typing.
    pub fn set_search_text(&self, text: impl Into<String>) {
        let text = text.into();
        let mut state = self.inner.lock();
        state.pending_search = text.clone();
        if let Some(prev) = state.debounce.take() {
            prev.abort();
        }
        state.search_generation += 1;
        let search_generation = state.search_generation;

        let inner = Arc::clone(&self.inner);
        let delay = self.inner.settings.search_debounce;
        state.debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.commit_search(search_generation, text);
        }));
        drop(state);
        self.inner.notify();
    }

    pub fn set_category(&self, category: impl Into<String>) {
        let category = category.into();
        self.inner.update_filter(|filter| {
            if filter.category == category {
                false
            } else {
                filter.category = category;
                true
            }
        });
    }

    pub fn set_sort_key(&self, sort: SortKey) {
        self.inner.update_filter(|filter| {
            let changed = filter.sort != sort;
            filter.sort = sort;
            changed
        });
    }

    pub fn set_bookmarked_only(&self, bookmarked_only: bool) {
        self.inner.update_filter(|filter| {
            let changed = filter.bookmarked_only != bookmarked_only;
            filter.bookmarked_only = bookmarked_only;
            changed
        });
    }

    /// Request the next page. Returns `false` without doing anything when a
    /// fetch is already running or there is nothing more to load.
    pub fn load_next_page(&self) -> bool {
        let mut state = self.inner.lock();
        if state.in_flight.is_some() || !state.cursor.has_more {
            return false;
        }
        let page = state.cursor.page;
        self.inner.start_fetch(&mut state, page, false);
        drop(state);
        self.inner.notify();
        true
    }

    /// Fetch `page`, cancelling whatever fetch is running. `replace` marks a
    /// first-page load that replaces the accumulated list.
    pub fn fetch_page(&self, page: u32, replace: bool) {
        let mut state = self.inner.lock();
        self.inner.start_fetch(&mut state, page, replace);
        drop(state);
        self.inner.notify();
    }

    /// Manual "load more" after a failure stopped pagination
    pub fn retry(&self) -> bool {
        let mut state = self.inner.lock();
        if state.in_flight.is_some() {
            return false;
        }
        state.error = None;
        state.cursor.has_more = true;
        if state.cursor.posts.is_empty() {
            state.cursor.reset();
            self.inner.start_fetch(&mut state, 1, true);
        } else {
            let page = state.cursor.page;
            self.inner.start_fetch(&mut state, page, false);
        }
        drop(state);
        self.inner.notify();
        true
    }

    pub fn dismiss_error(&self) {
        self.inner.lock().error = None;
        self.inner.notify();
    }

    /// Flip a bookmark and persist it. Returns whether the post is
    /// bookmarked afterwards.
    pub fn toggle_bookmark(&self, id: &PostId) -> Result<bool, AppError> {
        if id.as_str().trim().is_empty() {
            return Err(AppError::Validation("post id must not be empty".to_string()));
        }
        let (bookmarked, bookmarks) = self.inner.bookmarks.toggle(id).map_err(|e| {
            tracing::error!("Failed to persist bookmarks: {}", e);
            e
        })?;
        self.inner.lock().bookmarks = bookmarks;
        self.inner.notify();
        Ok(bookmarked)
    }

    /// Persist reading progress for a post; `fraction` is clamped to `[0, 100]`
    pub fn record_read_progress(
        &self,
        id: &PostId,
        fraction: f64,
        offset: f64,
    ) -> Result<ReadingProgress, AppError> {
        self.inner
            .progress
            .record(id, fraction, offset)
            .map_err(|e| {
                tracing::error!("Failed to persist reading progress: {}", e);
                e.into()
            })
    }

    pub fn reading_progress(&self, id: &PostId) -> Result<Option<ReadingProgress>, AppError> {
        Ok(self.inner.progress.load(id)?)
    }

    /// Mark a post as opened on this device so the feed can show it as read
    pub fn note_viewed(&self, id: &PostId) {
        let mut state = self.inner.lock();
        if state.viewed.insert(id.clone()) {
            state.overlay_viewed();
            drop(state);
            self.inner.notify();
        }
    }

    /// Current derived view and loading flags
    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.inner.lock();
        FeedSnapshot {
            posts: derive_view(&state.cursor.posts, &state.filter, &state.bookmarks),
            loading: state.loading,
            loading_more: state.loading_more,
            has_more: state.cursor.has_more,
            error: state.error.clone(),
            page: state.cursor.page,
            loaded: state.cursor.posts.len(),
            filter: state.filter.clone(),
            pending_search: state.pending_search.clone(),
            categories: categories(&state.cursor.posts),
            bookmarks: state.bookmarks.clone(),
        }
    }

    /// Receiver that ticks on every state change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.changes.subscribe()
    }

    /// True when no fetch or pending search commit is outstanding
    pub fn is_idle(&self) -> bool {
        let state = self.inner.lock();
        state.in_flight.is_none() && state.debounce.is_none()
    }

    /// Wait until no fetch or debounce timer is outstanding
    pub async fn settle(&self) {
        let mut changes = self.subscribe();
        while !self.is_idle() {
            if changes.changed().await.is_err() {
                return;
            }
        }
    }

    /// Abort outstanding work; the controller stays usable
    pub fn dispose(&self) {
        let mut state = self.inner.lock();
        state.cancel_in_flight();
        if let Some(debounce) = state.debounce.take() {
            debounce.abort();
        }
        state.search_generation += 1;
        state.generation += 1;
        state.loading = false;
        state.loading_more = false;
        drop(state);
        self.inner.notify();
    }
}

impl<R, S> Inner<R, S>
where
    R: PostRepository + 'static,
    S: PreferenceStore + 'static,
{
    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.changes.send_modify(|revision| *revision += 1);
    }

    fn update_filter(self: &Arc<Self>, apply: impl FnOnce(&mut FeedFilter) -> bool) {
        let changed = apply(&mut self.lock().filter);
        if changed {
            self.refetch_first_page();
        }
    }

    /// The filter-change rule: drop everything loaded and start over at page 1
    fn refetch_first_page(self: &Arc<Self>) {
        let mut state = self.lock();
        state.cancel_in_flight();
        state.cursor.reset();
        state.error = None;
        self.start_fetch(&mut state, 1, true);
        drop(state);
        self.notify();
    }

    fn commit_search(self: &Arc<Self>, search_generation: u64, text: String) {
        let mut state = self.lock();
        if state.search_generation != search_generation {
            return;
        }
        state.debounce = None;
        if state.filter.search == text {
            drop(state);
            self.notify();
            return;
        }
        tracing::debug!(search = %text, "Committing search");
        state.filter.search = text;
        drop(state);
        self.refetch_first_page();
    }

    fn start_fetch(self: &Arc<Self>, state: &mut FeedState, page: u32, replace: bool) {
        let page = page.max(1);
        state.cancel_in_flight();
        state.generation += 1;
        let generation = state.generation;

        if replace {
            state.loading = true;
            state.loading_more = false;
        } else {
            state.loading_more = true;
        }
        state.error = None;

        let query = PostQuery::for_filter(&state.filter, page, state.cursor.page_size);
        let inner = Arc::clone(self);
        let task = tokio::spawn(async move {
            let started = Instant::now();
            let result = inner.posts.list_posts(&query).await;
            if replace {
                let elapsed = started.elapsed();
                if elapsed < inner.settings.min_skeleton {
                    tokio::time::sleep(inner.settings.min_skeleton - elapsed).await;
                }
            }
            inner.apply_page(generation, page, replace, result);
        });

        state.in_flight = Some(InFlight { generation, task });
    }

    fn apply_page(
        &self,
        generation: u64,
        page: u32,
        replace: bool,
        result: Result<PostPage, RepositoryError>,
    ) {
        let mut state = self.lock();
        if state.generation != generation {
            tracing::debug!(
                page,
                generation,
                latest = state.generation,
                "Dropping stale page response"
            );
            return;
        }

        state.in_flight = None;
        state.loading = false;
        state.loading_more = false;

        match result {
            Ok(batch) => {
                if replace {
                    state.cursor.posts.clear();
                }
                let returned = batch.posts.len();
                let added = state.cursor.merge(page, batch);
                state.overlay_viewed();
                tracing::info!(
                    page,
                    returned,
                    added,
                    has_more = state.cursor.has_more,
                    "Loaded feed page"
                );
            }
            Err(e) => {
                tracing::warn!("Failed to load feed page {}: {}", page, e);
                state.error = Some(LOAD_FAILED_MESSAGE.to_string());
                state.cursor.has_more = false;
            }
        }

        drop(state);
        self.notify();
    }
}
