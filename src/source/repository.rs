//! Key-bound data access over a [`KeyValueStore`].

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ErrorClassifier, FetchError};
use crate::retry::{with_classified_retry, RetryPolicy};
use crate::source::fetch::{fetch, fetch_stream, FetchStream};
use crate::source::policy::{DataSource, DataSourceConfig};
use crate::source::response::RemoteResponse;
use crate::source::store::KeyValueStore;

/// Combines a local store, the data-source policy, and the retry policy.
///
/// Values are cached as JSON under the caller's key. A cached entry that no
/// longer decodes is treated as absent.
pub struct Repository<S> {
    store: Arc<S>,
    config: DataSourceConfig,
    retry: RetryPolicy,
    classifier: Arc<ErrorClassifier>,
}

impl<S> Clone for Repository<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
            retry: self.retry,
            classifier: self.classifier.clone(),
        }
    }
}

impl<S: KeyValueStore> Repository<S> {
    pub fn new(
        store: Arc<S>,
        config: DataSourceConfig,
        retry: RetryPolicy,
        classifier: Arc<ErrorClassifier>,
    ) -> Self {
        Self {
            store,
            config,
            retry,
            classifier,
        }
    }

    pub fn config(&self) -> &DataSourceConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Fetch the value cached under `key`, refreshing it from `remote` as the
    /// resolved strategy dictates.
    pub async fn fetch<T, R, RF>(
        &self,
        key: &str,
        call_override: Option<DataSource>,
        remote: R,
    ) -> Result<T, FetchError>
    where
        T: Serialize + DeserializeOwned + Clone,
        R: FnMut() -> RF,
        RF: Future<Output = Result<RemoteResponse<T>, FetchError>>,
    {
        let strategy = self.config.resolve(call_override);
        let retry = self.retry;
        let classifier = &self.classifier;

        fetch(
            strategy,
            || self.read_local(key),
            move || async move { with_classified_retry(&retry, classifier, remote).await },
            |value| self.write_local(key, value),
        )
        .await
    }

    /// Streaming form of [`Repository::fetch`].
    pub fn fetch_stream<'a, T, R, RF>(
        &'a self,
        key: &'a str,
        call_override: Option<DataSource>,
        remote: R,
    ) -> FetchStream<'a, T>
    where
        T: Serialize + DeserializeOwned + Clone + Send + 'a,
        R: FnMut() -> RF + Send + 'a,
        RF: Future<Output = Result<RemoteResponse<T>, FetchError>> + Send + 'a,
    {
        let strategy = self.config.resolve(call_override);
        let retry = self.retry;
        let classifier = &self.classifier;

        fetch_stream(
            strategy,
            move || self.read_local(key),
            move || async move { with_classified_retry(&retry, classifier, remote).await },
            move |value| self.write_local(key, value),
        )
    }

    async fn read_local<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key).await?;
        match serde_json::from_value(raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "Cached entry no longer decodes, ignoring");
                None
            }
        }
    }

    async fn write_local<T: Serialize>(&self, key: &str, value: T) -> Result<(), FetchError> {
        let raw = serde_json::to_value(&value).map_err(FetchError::persist)?;
        self.store.put(key, raw).await.map_err(FetchError::persist)?;
        tracing::trace!(key = %key, "Persisted remote value");
        Ok(())
    }
}
