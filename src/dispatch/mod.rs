//! Intent intake for a screen-model.
//!
//! [`IntentDispatcher`] keeps a single pending intent and feeds one handler
//! loop. [`DebouncedSender`] sits in front of it and coalesces bursts of the
//! same intent kind.

mod debounce;
mod dispatcher;

pub use debounce::DebouncedSender;
pub use dispatcher::{handler_fn, FnHandler, IntentDispatcher, IntentHandler};
