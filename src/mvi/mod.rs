//! Model-View-Intent (MVI) primitives.
//!
//! Every state machine in this crate is expressed as a pure reducer over a
//! closed state enum, driven by intents.
//!
//! # Architecture
//!
//! ```text
//! Intent ──→ Dispatcher ──→ Handler ──→ Fetch ──→ Reducer ──→ State / Event
//!    ↑                                                           │
//!    └───────────────────────────────────────────────────────────┘
//! ```
//!
//! - **State**: Immutable snapshot of one screen concern
//! - **Intent**: User actions or results of a fetch
//! - **Reducer**: Pure function that transforms state based on intents

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::State;
