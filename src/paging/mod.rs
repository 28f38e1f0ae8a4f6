//! Incremental list loading.

mod engine;
mod page;
mod reducer;
mod state;

pub use engine::{PageSource, PagingEngine};
pub use page::PagedList;
pub use reducer::PagingReducer;
pub use state::{PagingIntent, PagingState};
