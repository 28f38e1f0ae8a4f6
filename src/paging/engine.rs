//! Drives [`PagingState`] from a [`PageSource`].

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::{ErrorClassifier, FetchError};
use crate::retry::{with_classified_retry, RetryPolicy};
use crate::source::fetch::fetch_stream;
use crate::source::policy::{DataSource, DataSourceConfig};
use crate::source::response::RemoteResponse;
use crate::store::StateStore;

use super::page::PagedList;
use super::reducer::PagingReducer;
use super::state::{PagingIntent, PagingState};

/// Page-level local and remote reads.
#[async_trait]
pub trait PageSource<T: Send + 'static>: Send + Sync {
    /// Cached items of `page`. `None` or an empty list means not cached.
    async fn load_local(&self, _page: u32, _page_size: u32) -> Option<Vec<T>> {
        None
    }

    async fn load_remote(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<RemoteResponse<PagedList<T>>, FetchError>;

    /// Called with every page read from the remote.
    async fn save_page(&self, _page: PagedList<T>) -> Result<(), FetchError> {
        Ok(())
    }
}

/// Paging state machine bound to one list.
///
/// Each load runs the resolved data-source strategy for a single page. With
/// `CacheThenNetwork` a cached page is shown first and then replaced by the
/// remote one. Loads are not deduplicated: callers check
/// [`PagingEngine::is_loading`] before issuing another.
pub struct PagingEngine<T, S> {
    source: Arc<S>,
    config: DataSourceConfig,
    data_source: Option<DataSource>,
    page_size: u32,
    retry: RetryPolicy,
    classifier: Arc<ErrorClassifier>,
    state: StateStore<PagingState<T>>,
    loaded_page: AtomicU32,
}

impl<T, S> PagingEngine<T, S>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    S: PageSource<T>,
{
    /// `page_size` is clamped to at least 1.
    pub fn new(source: Arc<S>, config: DataSourceConfig, page_size: u32) -> Self {
        Self {
            source,
            config,
            data_source: None,
            page_size: page_size.max(1),
            retry: RetryPolicy::none(),
            classifier: Arc::new(ErrorClassifier::new()),
            state: StateStore::default(),
            loaded_page: AtomicU32::new(0),
        }
    }

    /// Per-list strategy override.
    pub fn with_data_source(mut self, source: DataSource) -> Self {
        self.data_source = Some(source);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<ErrorClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn state(&self) -> PagingState<T> {
        self.state.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<PagingState<T>> {
        self.state.subscribe()
    }

    pub fn items(&self) -> Vec<T> {
        self.state.get().items().to_vec()
    }

    pub fn is_loading(&self) -> bool {
        self.state.get().is_loading()
    }

    pub fn can_load_more(&self) -> bool {
        self.state.get().can_load_more()
    }

    /// Discard everything and load page 1.
    pub async fn load_first(&self) {
        self.loaded_page.store(0, Ordering::SeqCst);
        self.apply(PagingIntent::LoadFirst);
        self.load_page(1, Vec::new()).await;
    }

    /// Same as [`PagingEngine::load_first`].
    pub async fn refresh(&self) {
        self.load_first().await;
    }

    /// Load the next page. Returns `false` without doing anything unless the
    /// list is in a successful state with more pages.
    pub async fn load_more(&self) -> bool {
        let state = self.state.get();
        if !state.can_load_more() {
            tracing::debug!("load_more rejected, nothing more to load");
            return false;
        }
        self.continue_from(state.items().to_vec()).await;
        true
    }

    /// Re-issue a failed load: page 1 if nothing was loaded yet, otherwise
    /// the page after the last loaded one. No-op unless in `Error`.
    pub async fn retry(&self) -> bool {
        match self.state.get() {
            PagingState::Error { current: None, .. } => {
                self.load_first().await;
                true
            }
            PagingState::Error {
                current: Some(items),
                ..
            } => {
                self.continue_from(items).await;
                true
            }
            _ => false,
        }
    }

    pub fn reset(&self) {
        self.loaded_page.store(0, Ordering::SeqCst);
        self.apply(PagingIntent::Reset);
    }

    async fn continue_from(&self, previous: Vec<T>) {
        let next = self.loaded_page.load(Ordering::SeqCst) + 1;
        self.apply(PagingIntent::LoadMore);
        self.load_page(next, previous).await;
    }

    async fn load_page(&self, page: u32, previous: Vec<T>) {
        let strategy = self.config.resolve(self.data_source);
        let page_size = self.page_size;
        let source = &self.source;
        let retry = self.retry;
        let classifier = &self.classifier;

        tracing::debug!(page, page_size, strategy = %strategy, "Loading page");

        let mut results = fetch_stream(
            strategy,
            move || async move {
                source
                    .load_local(page, page_size)
                    .await
                    .filter(|items| !items.is_empty())
                    .map(|items| PagedList::from_items(items, page, page_size))
            },
            move || async move {
                with_classified_retry(&retry, classifier, || source.load_remote(page, page_size))
                    .await
            },
            move |loaded| source.save_page(loaded),
        );

        while let Some(result) = results.next().await {
            match result {
                Ok(loaded) => {
                    let value = loaded.value.renumbered(page);
                    tracing::debug!(
                        page,
                        origin = ?loaded.origin,
                        items = value.len(),
                        has_more = value.has_more(),
                        "Page loaded"
                    );
                    self.loaded_page.store(page, Ordering::SeqCst);
                    self.apply(PagingIntent::PageLoaded {
                        previous: previous.clone(),
                        page: value,
                    });
                }
                Err(err) => {
                    let data = self.classifier.classify(&err);
                    tracing::warn!(page, code = data.code, error = %err, "Page load failed");
                    self.apply(PagingIntent::LoadFailed {
                        message: data.message,
                        previous: Some(previous),
                    });
                    return;
                }
            }
        }
    }

    fn apply(&self, intent: PagingIntent<T>) {
        self.state.dispatch::<PagingReducer<T>>(intent);
    }
}
