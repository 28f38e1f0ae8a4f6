//! Pure paging transitions.

use std::marker::PhantomData;

use crate::mvi::Reducer;

use super::state::{PagingIntent, PagingState};

/// Reducer for [`PagingState`].
pub struct PagingReducer<T>(PhantomData<T>);

impl<T: Clone + PartialEq + Send + Sync + 'static> Reducer for PagingReducer<T> {
    type State = PagingState<T>;
    type Intent = PagingIntent<T>;

    fn reduce(state: PagingState<T>, intent: PagingIntent<T>) -> PagingState<T> {
        match intent {
            PagingIntent::LoadFirst => PagingState::Loading,

            PagingIntent::LoadMore => match state {
                PagingState::Success { page } if page.has_more() => PagingState::LoadingMore {
                    current: page.into_items(),
                },
                PagingState::Error {
                    current: Some(current),
                    ..
                } => PagingState::LoadingMore { current },
                // Invalid from anywhere else
                other => other,
            },

            PagingIntent::PageLoaded { previous, page } => {
                let page_was_empty = page.is_empty();
                let page = page.after(previous);
                if page.is_empty() {
                    PagingState::Empty
                } else if page_was_empty || !page.has_more() {
                    PagingState::NoMoreData {
                        current: page.into_items(),
                    }
                } else {
                    PagingState::Success { page }
                }
            }

            PagingIntent::LoadFailed { message, previous } => PagingState::Error {
                message,
                current: previous.filter(|items| !items.is_empty()),
            },

            PagingIntent::Reset => PagingState::Idle,
        }
    }
}
