//! Intent → fetch → state/event flow through a screen-model.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{connection_refused, Counter};
use intentflow::config::Config;
use intentflow::dispatch::handler_fn;
use intentflow::error::FetchError;
use intentflow::mvi::Intent;
use intentflow::screen::ScreenModel;
use intentflow::source::{DataSource, MemoryStore, RemoteResponse, Repository};
use intentflow::store::{StateStore, UiEvent, UiState};
use intentflow::{ErrorClassifier, RetryPolicy};

#[derive(Debug, Clone, Copy)]
enum ProfileIntent {
    Load { fail: bool },
}

impl Intent for ProfileIntent {}

struct Harness {
    model: ScreenModel<ProfileIntent>,
    state: StateStore<UiState<String>>,
    remote_calls: Counter,
}

fn harness(retry: RetryPolicy) -> Harness {
    let classifier = Arc::new(ErrorClassifier::new());
    let repository = Repository::new(
        Arc::new(MemoryStore::new()),
        Config::default().data_source.to_runtime(),
        retry,
        classifier.clone(),
    );
    let model = ScreenModel::from_config("profile", &Config::default(), classifier);
    let state = StateStore::<UiState<String>>::default();
    let remote_calls = Counter::default();

    let context = model.context().clone();
    let handler_state = state.clone();
    let calls = remote_calls.clone();
    model.start(handler_fn(move |ProfileIntent::Load { fail }| {
        let context = context.clone();
        let repository = repository.clone();
        let state = handler_state.clone();
        let calls = calls.clone();
        async move {
            let load = repository.fetch("profile", Some(DataSource::NetworkOnly), || {
                calls.bump();
                async move {
                    if fail {
                        Err(connection_refused())
                    } else {
                        Ok(RemoteResponse::ok("ada".to_string()))
                    }
                }
            });
            context.execute(&state, load).await;
        }
    }));

    Harness {
        model,
        state,
        remote_calls,
    }
}

#[tokio::test]
async fn successful_load_publishes_state_and_loading_events() {
    let h = harness(RetryPolicy::none());
    let mut screen = h.model.bind_screen("view");
    let mut states = h.state.subscribe();

    h.model.send(ProfileIntent::Load { fail: false });

    assert_eq!(screen.next_event().await, Some(UiEvent::ShowLoading(true)));
    assert_eq!(screen.next_event().await, Some(UiEvent::ShowLoading(false)));
    states
        .wait_for(|s| matches!(s, UiState::Success(_)))
        .await
        .unwrap();
    assert_eq!(h.state.get(), UiState::Success("ada".to_string()));
    assert_eq!(h.remote_calls.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn network_failure_sets_state_and_toasts_after_retries() {
    let h = harness(RetryPolicy::new(2, Duration::from_millis(100)));
    let mut screen = h.model.bind_screen("view");

    h.model.send(ProfileIntent::Load { fail: true });

    assert_eq!(screen.next_event().await, Some(UiEvent::ShowLoading(true)));
    assert_eq!(screen.next_event().await, Some(UiEvent::ShowLoading(false)));
    match screen.next_event().await {
        Some(UiEvent::ShowToast(message)) => assert!(!message.is_empty()),
        other => panic!("Expected toast, got {:?}", other),
    }

    assert!(matches!(h.state.get(), UiState::NetworkError { .. }));
    assert_eq!(h.remote_calls.get(), 3);
}

#[tokio::test]
async fn dropping_the_model_cancels_its_work() {
    let h = harness(RetryPolicy::none());
    let screen = h.model.bind_screen("view");
    let container = h.model.scope().clone();
    let screen_scope = screen.scope().clone();

    drop(h);
    assert!(container.is_cancelled());
    assert!(screen_scope.is_cancelled());
}

#[tokio::test]
async fn business_failure_is_not_a_network_error() {
    let classifier = Arc::new(ErrorClassifier::new());
    let model = ScreenModel::<ProfileIntent>::from_config("orders", &Config::default(), classifier);
    let state = StateStore::<UiState<u32>>::default();
    let mut screen = model.bind_screen("view");

    model
        .context()
        .execute(&state, async {
            Err::<u32, _>(FetchError::Business {
                code: 3001,
                message: "Order closed".into(),
            })
        })
        .await;

    assert_eq!(
        state.get(),
        UiState::Error {
            message: "Order closed".into(),
            cause: Some(intentflow::NetErrorData::business(3001, "Order closed")),
            retryable: false,
        }
    );
    assert_eq!(screen.try_next_event(), Some(UiEvent::ShowLoading(true)));
    assert_eq!(screen.try_next_event(), Some(UiEvent::ShowLoading(false)));
    assert_eq!(screen.try_next_event(), Some(UiEvent::ShowToast("Order closed".into())));
}
