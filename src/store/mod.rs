//! Observable outputs of the orchestration core.
//!
//! - [`StateStore`]: last-value-wins slot, one per screen concern
//! - [`EventQueue`]: one-shot notifications for a single active consumer

mod event_queue;
mod state_store;
mod ui_state;

pub use event_queue::{EventQueue, EventReceiver, UiEvent};
pub use state_store::StateStore;
pub use ui_state::{LoadIntent, LoadReducer, UiState};
