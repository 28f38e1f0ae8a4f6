//! Unidirectional intent/state orchestration with local/remote data-source
//! policies.
//!
//! ```text
//! Intent ──→ IntentDispatcher ──→ handler ──→ DataSource policy ──→ fetch
//!                                                 │          (retry, paging)
//!                                                 ▼
//!                                  StateStore / EventQueue ──→ screen
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod mvi;
pub mod paging;
pub mod retry;
pub mod scope;
pub mod screen;
pub mod source;
pub mod store;

pub use error::{ErrorClassifier, FetchError, NetErrorData};
pub use retry::RetryPolicy;
pub use source::{DataSource, DataSourceConfig};
