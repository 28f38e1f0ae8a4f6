//! reqwest-backed remote reads speaking the JSON response envelope.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::FetchError;
use crate::paging::{PageSource, PagedList};

use super::response::RemoteResponse;

/// GET-only client rooted at a base URL.
///
/// Non-2xx statuses become [`FetchError::Http`]; 2xx bodies are decoded as
/// `{ "success", "data", "message", "code" }`.
#[derive(Clone)]
pub struct HttpRemote {
    client: Client,
    base_url: String,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<RemoteResponse<T>, FetchError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "GET");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::debug!(url = %url, status = status.as_u16(), "Remote returned error status");
            return Err(FetchError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// GET `path` with `page` and `size` query parameters.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        page: u32,
        page_size: u32,
    ) -> Result<RemoteResponse<PagedList<T>>, FetchError> {
        let separator = if path.contains('?') { '&' } else { '?' };
        self.get(&format!("{path}{separator}page={page}&size={page_size}"))
            .await
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Remote-only [`PageSource`] over one paged endpoint.
pub struct HttpPageSource<T> {
    remote: HttpRemote,
    path: String,
    _items: PhantomData<fn() -> T>,
}

impl<T> HttpPageSource<T> {
    pub fn new(remote: HttpRemote, path: impl Into<String>) -> Self {
        Self {
            remote,
            path: path.into(),
            _items: PhantomData,
        }
    }
}

#[async_trait]
impl<T> PageSource<T> for HttpPageSource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn load_remote(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<RemoteResponse<PagedList<T>>, FetchError> {
        self.remote.get_page(&self.path, page, page_size).await
    }
}
