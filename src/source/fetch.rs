//! Fetch orchestration across a local and a remote supplier.
//!
//! Suppliers are black boxes: the orchestrator only looks at whether a local
//! read produced a value and whether a remote read succeeded. Every
//! successful remote read goes through the persistence sink before it is
//! returned, and a failing sink fails the fetch.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::error::FetchError;
use crate::source::policy::DataSource;
use crate::source::response::RemoteResponse;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Where a fetched value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Remote,
}

/// A fetched value tagged with its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub value: T,
    pub origin: Origin,
}

impl<T> Sourced<T> {
    pub fn cache(value: T) -> Self {
        Self {
            value,
            origin: Origin::Cache,
        }
    }

    pub fn remote(value: T) -> Self {
        Self {
            value,
            origin: Origin::Remote,
        }
    }

    pub fn is_cache(&self) -> bool {
        self.origin == Origin::Cache
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        Sourced {
            value: f(self.value),
            origin: self.origin,
        }
    }
}

async fn read_remote<T, R, RF, P, PF>(remote: R, persist: P) -> Result<T, FetchError>
where
    T: Clone,
    R: FnOnce() -> RF,
    RF: Future<Output = Result<RemoteResponse<T>, FetchError>>,
    P: FnOnce(T) -> PF,
    PF: Future<Output = Result<(), FetchError>>,
{
    let value = remote().await?.into_result()?;
    persist(value.clone()).await.map_err(|err| match err {
        FetchError::Persist { .. } => err,
        other => FetchError::persist(other),
    })?;
    Ok(value)
}

/// Run one strategy and return a single result.
///
/// `CacheThenNetwork` returns the remote value when the remote succeeds and
/// the cached value otherwise; see [`fetch_stream`] for the two-emission form.
pub async fn fetch<T, L, LF, R, RF, P, PF>(
    strategy: DataSource,
    local: L,
    remote: R,
    persist: P,
) -> Result<T, FetchError>
where
    T: Clone,
    L: FnOnce() -> LF,
    LF: Future<Output = Option<T>>,
    R: FnOnce() -> RF,
    RF: Future<Output = Result<RemoteResponse<T>, FetchError>>,
    P: FnOnce(T) -> PF,
    PF: Future<Output = Result<(), FetchError>>,
{
    fetch_sourced(strategy, local, remote, persist)
        .await
        .map(|sourced| sourced.value)
}

/// [`fetch`], keeping the origin of the returned value.
pub async fn fetch_sourced<T, L, LF, R, RF, P, PF>(
    strategy: DataSource,
    local: L,
    remote: R,
    persist: P,
) -> Result<Sourced<T>, FetchError>
where
    T: Clone,
    L: FnOnce() -> LF,
    LF: Future<Output = Option<T>>,
    R: FnOnce() -> RF,
    RF: Future<Output = Result<RemoteResponse<T>, FetchError>>,
    P: FnOnce(T) -> PF,
    PF: Future<Output = Result<(), FetchError>>,
{
    tracing::debug!(strategy = %strategy, "Fetching");

    match strategy {
        DataSource::NetworkOnly => read_remote(remote, persist).await.map(Sourced::remote),

        DataSource::LocalOnly => local()
            .await
            .map(Sourced::cache)
            .ok_or(FetchError::NotFound),

        DataSource::LocalFirst => match local().await {
            Some(value) => Ok(Sourced::cache(value)),
            None => read_remote(remote, persist).await.map(Sourced::remote),
        },

        DataSource::NetworkFirst => match read_remote(remote, persist).await {
            Ok(value) => Ok(Sourced::remote(value)),
            Err(err) => match local().await {
                Some(value) => {
                    tracing::warn!(error = %err, "Remote failed, serving cached value");
                    Ok(Sourced::cache(value))
                }
                None => Err(err),
            },
        },

        DataSource::CacheThenNetwork => {
            let cached = local().await;
            match read_remote(remote, persist).await {
                Ok(value) => Ok(Sourced::remote(value)),
                Err(err) => match cached {
                    Some(value) => {
                        tracing::warn!(error = %err, "Remote refresh failed, cached value is final");
                        Ok(Sourced::cache(value))
                    }
                    None => Err(err),
                },
            }
        }
    }
}

/// Run one strategy as a stream of results.
///
/// `CacheThenNetwork` yields a present cached value first, then the remote
/// value. If the remote fails after a cached value was yielded, the stream
/// ends without an error item; the last item's [`Origin`] tells a
/// cache-only result apart from a refreshed one. Every other strategy yields
/// exactly one item.
///
/// Dropping the stream cancels whatever read is in flight.
pub fn fetch_stream<'a, T, L, LF, R, RF, P, PF>(
    strategy: DataSource,
    local: L,
    remote: R,
    persist: P,
) -> FetchStream<'a, T>
where
    T: Clone + Send + 'a,
    L: FnOnce() -> LF + Send + 'a,
    LF: Future<Output = Option<T>> + Send + 'a,
    R: FnOnce() -> RF + Send + 'a,
    RF: Future<Output = Result<RemoteResponse<T>, FetchError>> + Send + 'a,
    P: FnOnce(T) -> PF + Send + 'a,
    PF: Future<Output = Result<(), FetchError>> + Send + 'a,
{
    let stage = match strategy {
        DataSource::CacheThenNetwork => {
            tracing::debug!(strategy = %strategy, "Fetching as stream");
            Stage::Cache {
                local: Box::pin(local()),
                remote: Box::pin(read_remote(remote, persist)),
            }
        }
        _ => Stage::Single(Box::pin(fetch_sourced(strategy, local, remote, persist))),
    };
    FetchStream { stage }
}

enum Stage<'a, T> {
    Single(BoxFuture<'a, Result<Sourced<T>, FetchError>>),
    Cache {
        local: BoxFuture<'a, Option<T>>,
        remote: BoxFuture<'a, Result<T, FetchError>>,
    },
    Remote {
        remote: BoxFuture<'a, Result<T, FetchError>>,
        cached: bool,
    },
    Done,
}

/// Ordered results of one fetch; see [`fetch_stream`].
pub struct FetchStream<'a, T> {
    stage: Stage<'a, T>,
}

impl<'a, T> FetchStream<'a, T> {
    /// Next result, or `None` once the fetch is complete.
    pub async fn next(&mut self) -> Option<Result<Sourced<T>, FetchError>> {
        std::future::poll_fn(|cx| Pin::new(&mut *self).poll_next(cx)).await
    }

    /// Drain the stream, stopping at the first error.
    pub async fn collect(mut self) -> Result<Vec<Sourced<T>>, FetchError> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await {
            items.push(item?);
        }
        Ok(items)
    }
}

impl<'a, T> Stream for FetchStream<'a, T> {
    type Item = Result<Sourced<T>, FetchError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match std::mem::replace(&mut this.stage, Stage::Done) {
                Stage::Single(mut fut) => match fut.as_mut().poll(cx) {
                    Poll::Ready(result) => return Poll::Ready(Some(result)),
                    Poll::Pending => {
                        this.stage = Stage::Single(fut);
                        return Poll::Pending;
                    }
                },

                Stage::Cache { mut local, remote } => match local.as_mut().poll(cx) {
                    Poll::Ready(cached) => {
                        this.stage = Stage::Remote {
                            remote,
                            cached: cached.is_some(),
                        };
                        if let Some(value) = cached {
                            return Poll::Ready(Some(Ok(Sourced::cache(value))));
                        }
                    }
                    Poll::Pending => {
                        this.stage = Stage::Cache { local, remote };
                        return Poll::Pending;
                    }
                },

                Stage::Remote { mut remote, cached } => match remote.as_mut().poll(cx) {
                    Poll::Ready(Ok(value)) => return Poll::Ready(Some(Ok(Sourced::remote(value)))),
                    Poll::Ready(Err(err)) if cached => {
                        tracing::warn!(error = %err, "Remote refresh failed, cached value is final");
                        return Poll::Ready(None);
                    }
                    Poll::Ready(Err(err)) => return Poll::Ready(Some(Err(err))),
                    Poll::Pending => {
                        this.stage = Stage::Remote { remote, cached };
                        return Poll::Pending;
                    }
                },

                Stage::Done => return Poll::Ready(None),
            }
        }
    }
}
