use crate::headers::{add_json_headers, add_page_headers};
use crate::{LinerNotesError, Result};
use http_client::{HttpClient, Request, Response};
use http_types::{Method, Url};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Shared HTTP plumbing for the enrichment clients.
///
/// Every exchange, from sending the request to reading the last body byte,
/// is bounded by `timeout`; the dispatcher itself never times anything out.
#[derive(Clone)]
pub struct ApiHttp {
    client: Arc<dyn HttpClient>,
    timeout: Duration,
}

impl ApiHttp {
    pub fn new(client: Arc<dyn HttpClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn request(method: Method, url: &str) -> Result<Request> {
        let url = url
            .parse::<Url>()
            .map_err(|e| LinerNotesError::Http(format!("Invalid URL {url}: {e}")))?;
        Ok(Request::new(method, url))
    }

    /// Send `request` and decode the body as JSON.
    pub async fn send_json(&self, request: Request) -> Result<serde_json::Value> {
        self.bounded(async {
            let mut response = self.send(request).await?;
            response
                .body_json::<serde_json::Value>()
                .await
                .map_err(|e| LinerNotesError::Parse(e.to_string()))
        })
        .await
    }

    /// GET a JSON document, with `prepare` adding any auth headers.
    pub async fn get_json(
        &self,
        url: &str,
        prepare: impl FnOnce(&mut Request) -> Result<()>,
    ) -> Result<serde_json::Value> {
        let mut request = Self::request(Method::Get, url)?;
        add_json_headers(&mut request);
        prepare(&mut request)?;
        self.send_json(request).await
    }

    /// GET an HTML page as text.
    pub async fn get_page(&self, url: &str) -> Result<String> {
        let mut request = Self::request(Method::Get, url)?;
        add_page_headers(&mut request);

        self.bounded(async {
            let mut response = self.send(request).await?;
            response
                .body_string()
                .await
                .map_err(|e| LinerNotesError::Http(e.to_string()))
        })
        .await
    }

    /// GET raw bytes, returning them with the response content type.
    pub async fn get_bytes(&self, url: &str) -> Result<(Vec<u8>, Option<String>)> {
        let request = Self::request(Method::Get, url)?;

        self.bounded(async {
            let mut response = self.send(request).await?;
            let content_type = response.content_type().map(|mime| mime.essence().to_string());
            let bytes = response
                .body_bytes()
                .await
                .map_err(|e| LinerNotesError::Http(e.to_string()))?;
            Ok((bytes, content_type))
        })
        .await
    }

    /// Send `request` and fail on non-success status codes. Not bounded on
    /// its own: callers wrap the send and the body read in one [`Self::bounded`].
    async fn send(&self, request: Request) -> Result<Response> {
        let url = request.url().to_string();
        log::debug!("{} {}", request.method(), url);

        let response = self
            .client
            .send(request)
            .await
            .map_err(|e| LinerNotesError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LinerNotesError::Http(format!(
                "{url} returned {}",
                response.status()
            )));
        }
        Ok(response)
    }

    /// Run a whole exchange (request and body) under the one timeout.
    async fn bounded<T>(&self, exchange: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| LinerNotesError::Timeout(self.timeout))?
    }
}

/// Borrow a JSON string field, treating empty strings as missing.
pub(crate) fn non_empty_str(value: &serde_json::Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}
