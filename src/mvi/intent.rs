//! Base trait for intents (user/system actions).

/// Marker trait for intent objects.
///
/// Intents represent:
/// - User actions (refresh, load more, retry)
/// - Completion of a fetch (page loaded, load failed)
///
/// Intents are processed by reducers to produce new states.
pub trait Intent: Send + 'static {}
