//! One-shot notifications with drop-on-no-consumer semantics.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Notifications a screen reacts to once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ShowToast(String),
    ShowLoading(bool),
    Navigate(String),
}

/// Bounded FIFO delivering each event to the single attached consumer.
///
/// Events sent while no consumer is attached are dropped, never buffered for
/// a later one. Attaching a new consumer detaches the previous one and
/// discards whatever it left unread.
pub struct EventQueue<E> {
    sender: Arc<Mutex<Option<mpsc::Sender<E>>>>,
    capacity: usize,
}

impl<E> Clone for EventQueue<E> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            capacity: self.capacity,
        }
    }
}

impl<E: Send + 'static> EventQueue<E> {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            sender: Arc::new(Mutex::new(None)),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Become the sole consumer.
    pub fn attach(&self) -> EventReceiver<E> {
        let (tx, rx) = mpsc::channel(self.capacity);
        if self.sender.lock().replace(tx).is_some() {
            tracing::debug!("Event consumer replaced");
        }
        EventReceiver { rx }
    }

    /// Drop the current consumer, if any.
    pub fn detach(&self) {
        self.sender.lock().take();
    }

    pub fn is_attached(&self) -> bool {
        self.sender
            .lock()
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Enqueue `event`, waiting for room if the consumer is behind.
    ///
    /// Returns `false` when the event was dropped for lack of a consumer.
    pub async fn send(&self, event: E) -> bool {
        let Some(tx) = self.current() else {
            tracing::debug!("No event consumer attached, dropping event");
            return false;
        };
        match tx.send(event).await {
            Ok(()) => true,
            Err(_) => {
                self.clear_if(&tx);
                tracing::debug!("Event consumer gone, dropping event");
                false
            }
        }
    }

    /// Enqueue without waiting. A full queue drops the event.
    pub fn try_send(&self, event: E) -> bool {
        let Some(tx) = self.current() else {
            tracing::debug!("No event consumer attached, dropping event");
            return false;
        };
        match tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::debug!(capacity = self.capacity, "Event queue full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.clear_if(&tx);
                tracing::debug!("Event consumer gone, dropping event");
                false
            }
        }
    }

    fn current(&self) -> Option<mpsc::Sender<E>> {
        self.sender.lock().clone()
    }

    fn clear_if(&self, stale: &mpsc::Sender<E>) {
        let mut guard = self.sender.lock();
        if guard.as_ref().is_some_and(|tx| tx.same_channel(stale)) {
            *guard = None;
        }
    }
}

/// Consuming end handed out by [`EventQueue::attach`].
pub struct EventReceiver<E> {
    rx: mpsc::Receiver<E>,
}

impl<E> EventReceiver<E> {
    /// Next event, or `None` once this consumer has been replaced or detached
    /// and its backlog is drained.
    pub async fn recv(&mut self) -> Option<E> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<E> {
        self.rx.try_recv().ok()
    }
}
