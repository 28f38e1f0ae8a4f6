//! Screen-model glue: runs fetches and writes their outcome to state and
//! events.

use std::error::Error as StdError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::Config;
use crate::dispatch::{DebouncedSender, IntentDispatcher, IntentHandler};
use crate::error::ErrorClassifier;
use crate::mvi::Intent;
use crate::scope::Scope;
use crate::source::fetch::FetchStream;
use crate::store::{EventQueue, EventReceiver, LoadIntent, LoadReducer, StateStore, UiEvent, UiState};

/// What an intent handler needs to publish results.
#[derive(Clone)]
pub struct ScreenContext {
    scope: Scope,
    events: EventQueue<UiEvent>,
    classifier: Arc<ErrorClassifier>,
}

impl ScreenContext {
    pub fn new(scope: Scope, events: EventQueue<UiEvent>, classifier: Arc<ErrorClassifier>) -> Self {
        Self {
            scope,
            events,
            classifier,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn events(&self) -> &EventQueue<UiEvent> {
        &self.events
    }

    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    pub async fn emit(&self, event: UiEvent) -> bool {
        self.events.send(event).await
    }

    /// Run `op` and publish its outcome.
    ///
    /// `store` goes `Loading` then `Success`, `Error`, or `NetworkError`.
    /// `ShowLoading(true)` and `ShowLoading(false)` bracket the call, and a
    /// failure additionally emits one `ShowToast` with the classified message.
    ///
    /// Loading events are dropped when the queue is full, so a bound screen
    /// that stops reading never stalls a successful call. Toasts wait for
    /// room, which leaves the consumer responsible for draining failures.
    pub async fn execute<T, E, Fut>(&self, store: &StateStore<UiState<T>>, op: Fut) -> Option<T>
    where
        T: Clone + PartialEq + Send + Sync + 'static,
        E: StdError + Send + 'static,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_with_empty(store, op, |_| false, "").await
    }

    /// [`ScreenContext::execute`] publishing `Empty` when `is_empty` holds.
    pub async fn execute_with_empty<T, E, Fut, P>(
        &self,
        store: &StateStore<UiState<T>>,
        op: Fut,
        is_empty: P,
        empty_message: &str,
    ) -> Option<T>
    where
        T: Clone + PartialEq + Send + Sync + 'static,
        E: StdError + Send + 'static,
        Fut: Future<Output = Result<T, E>>,
        P: FnOnce(&T) -> bool,
    {
        store.dispatch::<LoadReducer<T>>(LoadIntent::Start { message: None });
        self.events.try_send(UiEvent::ShowLoading(true));
        let result = op.await;
        self.events.try_send(UiEvent::ShowLoading(false));

        match result {
            Ok(value) if is_empty(&value) => {
                store.dispatch::<LoadReducer<T>>(LoadIntent::LoadedEmpty {
                    message: empty_message.to_string(),
                });
                Some(value)
            }
            Ok(value) => {
                store.dispatch::<LoadReducer<T>>(LoadIntent::Loaded(value.clone()));
                Some(value)
            }
            Err(err) => {
                let message = self.publish_failure(store, &err);
                self.emit(UiEvent::ShowToast(message)).await;
                None
            }
        }
    }

    /// [`ScreenContext::execute`] for lists: an empty list publishes `Empty`.
    pub async fn execute_list<T, E, Fut>(
        &self,
        store: &StateStore<UiState<Vec<T>>>,
        op: Fut,
        empty_message: &str,
    ) -> Option<Vec<T>>
    where
        T: Clone + PartialEq + Send + Sync + 'static,
        E: StdError + Send + 'static,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        self.execute_with_empty(store, op, Vec::is_empty, empty_message)
            .await
    }

    /// Publish every item of a streaming fetch.
    ///
    /// A cached value shows as `Success` until the remote one replaces it.
    /// Returns the last value published.
    pub async fn observe<T>(
        &self,
        store: &StateStore<UiState<T>>,
        mut results: FetchStream<'_, T>,
    ) -> Option<T>
    where
        T: Clone + PartialEq + Send + Sync + 'static,
    {
        store.dispatch::<LoadReducer<T>>(LoadIntent::Start { message: None });
        let mut last = None;
        while let Some(result) = results.next().await {
            match result {
                Ok(item) => {
                    tracing::debug!(origin = ?item.origin, "Publishing fetched value");
                    store.dispatch::<LoadReducer<T>>(LoadIntent::Loaded(item.value.clone()));
                    last = Some(item.value);
                }
                Err(err) => {
                    let message = self.publish_failure(store, &err);
                    self.emit(UiEvent::ShowToast(message)).await;
                    return None;
                }
            }
        }
        last
    }

    /// Spawn `fut` on this context's scope.
    pub fn launch<F>(&self, fut: F) -> JoinHandle<Option<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.scope.spawn(fut)
    }

    /// Write the classified failure to `store`; returns the toast message.
    fn publish_failure<T>(&self, store: &StateStore<UiState<T>>, err: &(dyn StdError + 'static)) -> String
    where
        T: Clone + PartialEq + Send + Sync + 'static,
    {
        let data = self.classifier.classify(err);
        tracing::debug!(code = data.code, error = %err, "Fetch failed");
        let message = data.message.clone();
        store.dispatch::<LoadReducer<T>>(LoadIntent::Failed(data));
        message
    }
}

/// Long-lived owner of a screen's intent loop and event queue.
///
/// The container scope outlives individual screens; each visible screen binds
/// with [`ScreenModel::bind_screen`]. Dropping the model cancels everything it
/// spawned.
pub struct ScreenModel<I> {
    container: Scope,
    context: ScreenContext,
    dispatcher: IntentDispatcher<I>,
    debounce: Duration,
}

impl<I: Intent> ScreenModel<I> {
    pub fn new(
        name: impl Into<String>,
        classifier: Arc<ErrorClassifier>,
        event_capacity: usize,
        debounce: Duration,
    ) -> Self {
        let container = Scope::new(name);
        let context = ScreenContext::new(
            container.clone(),
            EventQueue::new(event_capacity),
            classifier,
        );
        Self {
            container,
            context,
            dispatcher: IntentDispatcher::new(),
            debounce,
        }
    }

    /// Event capacity and debounce window taken from `config`.
    pub fn from_config(name: impl Into<String>, config: &Config, classifier: Arc<ErrorClassifier>) -> Self {
        Self::new(
            name,
            classifier,
            config.events.capacity,
            Duration::from_millis(config.dispatch.debounce_ms),
        )
    }

    pub fn context(&self) -> &ScreenContext {
        &self.context
    }

    pub fn scope(&self) -> &Scope {
        &self.container
    }

    /// Start handling intents. See [`IntentDispatcher::start`].
    pub fn start<H: IntentHandler<I>>(&self, handler: H) -> bool {
        self.dispatcher.start(&self.container, handler).is_some()
    }

    pub fn send(&self, intent: I) {
        self.dispatcher.send(intent);
    }

    /// Debounced front for [`ScreenModel::send`].
    pub fn debounced(&self) -> DebouncedSender<I> {
        DebouncedSender::new(self.dispatcher.clone(), self.container.clone(), self.debounce)
    }

    pub fn dropped_intents(&self) -> u64 {
        self.dispatcher.dropped()
    }

    /// Attach a screen: a child scope plus the sole event consumer.
    ///
    /// Binding again replaces the previous screen's event consumer.
    pub fn bind_screen(&self, name: &str) -> ScreenBinding {
        ScreenBinding {
            scope: self.container.child(name),
            events: self.context.events.attach(),
        }
    }
}

impl<I> Drop for ScreenModel<I> {
    fn drop(&mut self) {
        self.container.cancel();
    }
}

/// A visible screen's view of its model. Dropping it cancels the screen scope
/// and discards undelivered events.
pub struct ScreenBinding {
    scope: Scope,
    events: EventReceiver<UiEvent>,
}

impl ScreenBinding {
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub async fn next_event(&mut self) -> Option<UiEvent> {
        self.events.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<UiEvent> {
        self.events.try_recv()
    }
}

impl Drop for ScreenBinding {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    fn context() -> (ScreenContext, EventReceiver<UiEvent>) {
        let events = EventQueue::new(16);
        let rx = events.attach();
        let ctx = ScreenContext::new(Scope::new("test"), events, Arc::new(ErrorClassifier::new()));
        (ctx, rx)
    }

    #[tokio::test]
    async fn success_brackets_with_loading_events() {
        let (ctx, mut rx) = context();
        let store = StateStore::<UiState<u32>>::default();

        let value = ctx.execute(&store, async { Ok::<_, FetchError>(42) }).await;

        assert_eq!(value, Some(42));
        assert_eq!(store.get(), UiState::Success(42));
        assert_eq!(rx.try_recv(), Some(UiEvent::ShowLoading(true)));
        assert_eq!(rx.try_recv(), Some(UiEvent::ShowLoading(false)));
        assert_eq!(rx.try_recv(), None);
    }

    #[tokio::test]
    async fn stalled_consumer_does_not_block_successful_calls() {
        let events = EventQueue::new(1);
        let mut rx = events.attach();
        let ctx = ScreenContext::new(Scope::new("test"), events, Arc::new(ErrorClassifier::new()));
        let store = StateStore::<UiState<u32>>::default();

        for n in 0..3 {
            let value = tokio::time::timeout(
                std::time::Duration::from_secs(1),
                ctx.execute(&store, async move { Ok::<_, FetchError>(n) }),
            )
            .await
            .expect("execute blocked on a full event queue");
            assert_eq!(value, Some(n));
        }

        assert_eq!(store.get(), UiState::Success(2));
        assert_eq!(rx.try_recv(), Some(UiEvent::ShowLoading(true)));
        assert_eq!(rx.try_recv(), None);
    }

    #[tokio::test]
    async fn failure_sets_state_and_toasts() {
        let (ctx, mut rx) = context();
        let store = StateStore::<UiState<u32>>::default();

        let value = ctx
            .execute(&store, async {
                Err::<u32, _>(FetchError::Business {
                    code: 9,
                    message: "Coupon expired".into(),
                })
            })
            .await;

        assert_eq!(value, None);
        assert!(matches!(store.get(), UiState::Error { ref message, .. } if message == "Coupon expired"));
        assert_eq!(rx.try_recv(), Some(UiEvent::ShowLoading(true)));
        assert_eq!(rx.try_recv(), Some(UiEvent::ShowLoading(false)));
        assert_eq!(rx.try_recv(), Some(UiEvent::ShowToast("Coupon expired".into())));
    }

    #[tokio::test]
    async fn empty_list_publishes_empty() {
        let (ctx, _rx) = context();
        let store = StateStore::<UiState<Vec<u8>>>::default();

        ctx.execute_list(&store, async { Ok::<_, FetchError>(vec![]) }, "Nothing yet")
            .await;
        assert_eq!(
            store.get(),
            UiState::Empty {
                message: "Nothing yet".into()
            }
        );
    }

    #[tokio::test]
    async fn dropping_binding_cancels_screen_scope_only() {
        let model = ScreenModel::<crate::store::LoadIntent<u8>>::new(
            "profile",
            Arc::new(ErrorClassifier::new()),
            8,
            Duration::from_millis(300),
        );
        let binding = model.bind_screen("view");
        let screen_scope = binding.scope().clone();
        drop(binding);

        assert!(screen_scope.is_cancelled());
        assert!(!model.scope().is_cancelled());
        assert!(!model.context().emit(UiEvent::ShowLoading(true)).await);
    }
}
