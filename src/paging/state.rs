//! Paging state and the intents that drive it.

use crate::mvi::{Intent, State};

use super::page::PagedList;

/// Where a paged list stands.
///
/// Every variant past the first load carries the items accumulated so far,
/// so a load-more or a recoverable error never shrinks what is displayed.
#[derive(Debug, Clone, PartialEq)]
pub enum PagingState<T> {
    Idle,
    Loading,
    LoadingMore {
        current: Vec<T>,
    },
    /// `page` holds every item loaded so far with the latest page's metadata.
    Success {
        page: PagedList<T>,
    },
    Error {
        message: String,
        current: Option<Vec<T>>,
    },
    Empty,
    NoMoreData {
        current: Vec<T>,
    },
}

impl<T> Default for PagingState<T> {
    fn default() -> Self {
        PagingState::Idle
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> State for PagingState<T> {}

impl<T> PagingState<T> {
    /// Items currently displayed.
    pub fn items(&self) -> &[T] {
        match self {
            PagingState::LoadingMore { current } | PagingState::NoMoreData { current } => current,
            PagingState::Success { page } => page.items(),
            PagingState::Error {
                current: Some(current),
                ..
            } => current,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PagingState::Loading | PagingState::LoadingMore { .. })
    }

    /// Only a successful page that reports a successor can be extended.
    pub fn can_load_more(&self) -> bool {
        matches!(self, PagingState::Success { page } if page.has_more())
    }

    /// Last successfully loaded page number, if any.
    pub fn current_page(&self) -> Option<u32> {
        match self {
            PagingState::Success { page } => Some(page.current_page()),
            _ => None,
        }
    }
}

/// Transitions of [`PagingState`].
#[derive(Debug, Clone)]
pub enum PagingIntent<T> {
    LoadFirst,
    LoadMore,
    /// A page arrived. `previous` holds the items it is appended to.
    PageLoaded {
        previous: Vec<T>,
        page: PagedList<T>,
    },
    LoadFailed {
        message: String,
        previous: Option<Vec<T>>,
    },
    Reset,
}

impl<T: Send + 'static> Intent for PagingIntent<T> {}
