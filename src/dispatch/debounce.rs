//! Trailing-edge debounce in front of an [`IntentDispatcher`].

use std::collections::HashMap;
use std::mem::Discriminant;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::mvi::Intent;
use crate::scope::Scope;

use super::dispatcher::IntentDispatcher;

/// Delays each intent by `window`; a newer intent of the same kind (enum
/// variant) arriving within the window cancels the pending one.
///
/// Pending sends are tasks on `scope` and die with it.
pub struct DebouncedSender<I> {
    dispatcher: IntentDispatcher<I>,
    scope: Scope,
    window: Duration,
    pending: Arc<Mutex<HashMap<Discriminant<I>, JoinHandle<Option<()>>>>>,
}

impl<I> Clone for DebouncedSender<I> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            scope: self.scope.clone(),
            window: self.window,
            pending: self.pending.clone(),
        }
    }
}

impl<I: Intent> DebouncedSender<I> {
    pub fn new(dispatcher: IntentDispatcher<I>, scope: Scope, window: Duration) -> Self {
        Self {
            dispatcher,
            scope,
            window,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn send(&self, intent: I) {
        let kind = std::mem::discriminant(&intent);
        let dispatcher = self.dispatcher.clone();
        let window = self.window;

        let task = self.scope.spawn(async move {
            tokio::time::sleep(window).await;
            dispatcher.send(intent);
        });

        if let Some(previous) = self.pending.lock().insert(kind, task) {
            if !previous.is_finished() {
                previous.abort();
                tracing::debug!("Debounced intent superseded");
            }
        }
    }

    /// Forward immediately, cancelling a pending send of the same kind.
    pub fn send_now(&self, intent: I) {
        let kind = std::mem::discriminant(&intent);
        if let Some(previous) = self.pending.lock().remove(&kind) {
            previous.abort();
        }
        self.dispatcher.send(intent);
    }
}
