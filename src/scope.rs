//! Cancellable lifetime scopes for screen-bound work.
//!
//! A screen-model owns a long-lived container scope; each visible screen gets
//! a child scope. Cancelling a scope cancels every task spawned on it and on
//! its descendants.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use uuid::Uuid;

struct Inner {
    id: Uuid,
    name: String,
    cancelled: AtomicBool,
    notify: Notify,
    children: Mutex<Vec<Weak<Inner>>>,
}

impl Inner {
    fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            cancelled: AtomicBool::new(false),
            notify: Notify::new(),
            children: Mutex::new(Vec::new()),
        }
    }

    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!(scope = %self.name, id = %self.id, "Scope cancelled");
        self.notify.notify_waiters();

        let children: Vec<Arc<Inner>> = self
            .children
            .lock()
            .drain(..)
            .filter_map(|child| child.upgrade())
            .collect();
        for child in children {
            child.cancel();
        }
    }
}

/// Handle to a cancellable scope. Clones share the same scope.
#[derive(Clone)]
pub struct Scope {
    inner: Arc<Inner>,
}

impl Scope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner::new(name.into())),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// New scope cancelled together with this one.
    ///
    /// A child of an already-cancelled scope starts cancelled.
    pub fn child(&self, name: impl Into<String>) -> Scope {
        let child = Scope::new(format!("{}/{}", self.inner.name, name.into()));
        {
            let mut children = self.inner.children.lock();
            children.retain(|c| c.strong_count() > 0);
            children.push(Arc::downgrade(&child.inner));
        }
        if self.is_cancelled() {
            child.cancel();
        }
        child
    }

    /// Cancel this scope and all of its descendants. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once the scope is cancelled.
    pub async fn cancelled(&self) {
        // Register before checking the flag so a concurrent cancel is not missed.
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }

    /// Spawn `fut` on the runtime, bound to this scope.
    ///
    /// The task resolves to `None` if the scope is cancelled first; the future
    /// is dropped at its current await point.
    pub fn spawn<F>(&self, fut: F) -> JoinHandle<Option<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let scope = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = scope.cancelled() => None,
                out = fut => Some(out),
            }
        })
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("name", &self.inner.name)
            .field("id", &self.inner.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
