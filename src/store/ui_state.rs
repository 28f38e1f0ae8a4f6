//! Generic load state for a single screen concern.

use std::marker::PhantomData;

use crate::error::NetErrorData;
use crate::mvi::{Intent, Reducer, State};

/// Exactly one of these is held per concern at any time.
#[derive(Debug, Clone, PartialEq)]
pub enum UiState<T> {
    Idle,
    Loading {
        message: Option<String>,
    },
    Success(T),
    Empty {
        message: String,
    },
    Error {
        message: String,
        cause: Option<NetErrorData>,
        retryable: bool,
    },
    NetworkError {
        message: String,
    },
}

impl<T> Default for UiState<T> {
    fn default() -> Self {
        UiState::Idle
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> State for UiState<T> {}

impl<T> UiState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, UiState::Loading { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            UiState::Success(data) => Some(data),
            _ => None,
        }
    }

    /// Error or network error.
    pub fn is_failure(&self) -> bool {
        matches!(self, UiState::Error { .. } | UiState::NetworkError { .. })
    }
}

/// Outcomes of one fetch, as seen by [`LoadReducer`].
#[derive(Debug, Clone)]
pub enum LoadIntent<T> {
    Start { message: Option<String> },
    Loaded(T),
    LoadedEmpty { message: String },
    Failed(NetErrorData),
}

impl<T: Send + 'static> Intent for LoadIntent<T> {}

/// Maps fetch outcomes onto [`UiState`].
///
/// Network-class failures become `NetworkError`; everything else becomes
/// `Error`, retryable when the server was at fault.
pub struct LoadReducer<T>(PhantomData<T>);

impl<T: Clone + PartialEq + Send + Sync + 'static> Reducer for LoadReducer<T> {
    type State = UiState<T>;
    type Intent = LoadIntent<T>;

    fn reduce(_state: UiState<T>, intent: LoadIntent<T>) -> UiState<T> {
        match intent {
            LoadIntent::Start { message } => UiState::Loading { message },
            LoadIntent::Loaded(data) => UiState::Success(data),
            LoadIntent::LoadedEmpty { message } => UiState::Empty { message },
            LoadIntent::Failed(err) if err.is_network_error() => UiState::NetworkError {
                message: err.message,
            },
            LoadIntent::Failed(err) => UiState::Error {
                message: err.message.clone(),
                retryable: err.is_server_error(),
                cause: Some(err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes;

    fn reduce(intent: LoadIntent<u32>) -> UiState<u32> {
        LoadReducer::<u32>::reduce(UiState::Idle, intent)
    }

    #[test]
    fn network_failures_get_their_own_variant() {
        let state = reduce(LoadIntent::Failed(NetErrorData::new(
            codes::NETWORK_TIMEOUT,
            "Request timed out",
        )));
        assert_eq!(
            state,
            UiState::NetworkError {
                message: "Request timed out".into()
            }
        );
    }

    #[test]
    fn server_errors_are_retryable() {
        let state = reduce(LoadIntent::Failed(NetErrorData::new(
            codes::BAD_GATEWAY,
            "Bad gateway",
        )));
        match state {
            UiState::Error {
                retryable, cause, ..
            } => {
                assert!(retryable);
                assert_eq!(cause.map(|c| c.code), Some(codes::BAD_GATEWAY));
            }
            other => panic!("Expected Error, got {:?}", other),
        }
    }

    #[test]
    fn business_errors_are_not_retryable() {
        let state = reduce(LoadIntent::Failed(NetErrorData::business(7, "Out of stock")));
        assert!(matches!(state, UiState::Error { retryable: false, .. }));
        assert!(state.is_failure());
    }

    #[test]
    fn envelope_code_in_network_range_stays_a_plain_error() {
        let state = reduce(LoadIntent::Failed(NetErrorData::business(
            codes::NETWORK_TIMEOUT,
            "Order already paid",
        )));
        assert!(matches!(state, UiState::Error { retryable: false, .. }));
    }

    #[test]
    fn success_and_empty() {
        assert_eq!(reduce(LoadIntent::Loaded(42)).data(), Some(&42));
        assert!(reduce(LoadIntent::Start { message: None }).is_loading());
        assert_eq!(
            reduce(LoadIntent::LoadedEmpty {
                message: "Nothing here".into()
            }),
            UiState::Empty {
                message: "Nothing here".into()
            }
        );
    }
}
