use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::trace;

pub type Headers = Vec<(String, String)>;

/// Status and raw body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// The HTTP capability everything in this crate talks through.
///
/// Non-2xx statuses are returned as responses, not errors; only failures to
/// complete the exchange are `Err`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, headers: &Headers) -> Result<HttpResponse, TransportError>;

    async fn post(
        &self,
        url: &str,
        headers: &Headers,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, TransportError>;
}

/// Create a reqwest Client with a browser-like user agent
pub fn create_trakt_client() -> Client {
    Client::builder()
        .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: create_trakt_client(),
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<HttpResponse, TransportError> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        trace!(status, bytes = body.len(), "HTTP response");
        Ok(HttpResponse { status, body })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &Headers) -> Result<HttpResponse, TransportError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        self.send(request).await
    }

    async fn post(
        &self,
        url: &str,
        headers: &Headers,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, TransportError> {
        let mut request = self.client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        self.send(request).await
    }
}
