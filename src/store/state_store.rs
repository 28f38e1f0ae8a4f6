//! Single-slot reactive state container.

use std::sync::Arc;

use tokio::sync::watch;

use crate::mvi::{Reducer, State};

/// Holds the latest state of one concern.
///
/// Writes are linearized by the underlying watch channel: every observer sees
/// a value that was actually held, and a late observer starts from the
/// current value rather than a history.
pub struct StateStore<S> {
    tx: Arc<watch::Sender<S>>,
}

impl<S> Clone for StateStore<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S: State> Default for StateStore<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: State> StateStore<S> {
    pub fn new(initial: S) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Current value.
    pub fn get(&self) -> S {
        self.tx.borrow().clone()
    }

    /// Overwrite unconditionally.
    pub fn set(&self, state: S) {
        self.tx.send_replace(state);
    }

    /// Replace the state with `f(current)`.
    ///
    /// Observers are only woken when the result differs from the current value.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(S) -> S,
    {
        self.tx.send_if_modified(|state| {
            let next = f(state.clone());
            if next == *state {
                return false;
            }
            *state = next;
            true
        });
    }

    /// Run `intent` through reducer `R`.
    pub fn dispatch<R>(&self, intent: R::Intent)
    where
        R: Reducer<State = S>,
    {
        self.update(|state| R::reduce(state, intent));
    }

    /// Observe changes. The receiver starts at the current value.
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }
}
