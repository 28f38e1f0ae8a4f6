//! Latest-wins intent buffer with a single consumer.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::mvi::Intent;
use crate::scope::Scope;

/// Handles intents one at a time.
#[async_trait]
pub trait IntentHandler<I: Intent>: Send + Sync + 'static {
    async fn handle(&self, intent: I);
}

/// Adapter turning an async closure into an [`IntentHandler`].
pub struct FnHandler<F>(F);

/// Wrap `f` as an [`IntentHandler`].
pub fn handler_fn<F>(f: F) -> FnHandler<F> {
    FnHandler(f)
}

#[async_trait]
impl<I, F, Fut> IntentHandler<I> for FnHandler<F>
where
    I: Intent,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, intent: I) {
        (self.0)(intent).await
    }
}

struct Shared<I> {
    slot: Mutex<Option<I>>,
    notify: Notify,
    started: AtomicBool,
    dropped: AtomicU64,
}

/// Size-one intent buffer feeding a single handler loop.
///
/// An intent sent while another one is still waiting replaces it; the waiting
/// one is dropped. An intent sent while the handler is busy waits for it to
/// finish. This is a deliberate latest-wins policy: the handler sees the
/// first intent of a burst and the last one, never a backlog.
///
/// Handler invocations never overlap, whichever tasks call
/// [`IntentDispatcher::send`].
pub struct IntentDispatcher<I> {
    shared: Arc<Shared<I>>,
}

impl<I> Clone for IntentDispatcher<I> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<I: Intent> Default for IntentDispatcher<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Intent> IntentDispatcher<I> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                slot: Mutex::new(None),
                notify: Notify::new(),
                started: AtomicBool::new(false),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Start the handler loop on `scope`.
    ///
    /// Only the first call starts a loop; later calls return `None`. Intents
    /// sent before the loop starts are kept (latest wins).
    pub fn start<H>(&self, scope: &Scope, handler: H) -> Option<JoinHandle<Option<()>>>
    where
        H: IntentHandler<I>,
    {
        if self.shared.started.swap(true, Ordering::SeqCst) {
            tracing::warn!(scope = %scope.name(), "Intent dispatcher already started");
            return None;
        }

        let shared = self.shared.clone();
        Some(scope.spawn(async move {
            loop {
                shared.notify.notified().await;
                let next = shared.slot.lock().take();
                if let Some(intent) = next {
                    handler.handle(intent).await;
                }
            }
        }))
    }

    /// Submit an intent. Never waits.
    pub fn send(&self, intent: I) {
        let replaced = self.shared.slot.lock().replace(intent);
        if replaced.is_some() {
            let total = self.shared.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::debug!(dropped_total = total, "Dropped unprocessed intent in favour of newer one");
        }
        self.shared.notify.notify_one();
    }

    /// Intents discarded by the latest-wins policy so far.
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    /// Whether an intent is waiting for the handler.
    pub fn has_pending(&self) -> bool {
        self.shared.slot.lock().is_some()
    }
}
