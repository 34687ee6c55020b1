//! In-memory transport for exercising the router and OAuth flows offline.

use crate::error::TransportError;
use crate::transport::{Headers, HttpResponse, HttpTransport};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

pub const TEST_BASE_URL: &str = "https://api.trakt.tv";

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub headers: Headers,
    pub body: Option<serde_json::Value>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn path(&self) -> &str {
        let without_scheme = self.url.split_once("://").map(|(_, rest)| rest).unwrap_or(&self.url);
        let path_and_query = without_scheme.find('/').map(|i| &without_scheme[i..]).unwrap_or("/");
        path_and_query.split('?').next().unwrap_or(path_and_query)
    }
}

/// Replays queued responses in order, then repeats the fallback forever
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    fallback: Result<HttpResponse, TransportError>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Ok(HttpResponse::new(404, "")),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.script.lock().unwrap().push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    pub fn respond_json(self, status: u16, body: serde_json::Value) -> Self {
        self.respond(status, body.to_string())
    }

    pub fn fail(self, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(TransportError(message.to_string())));
        self
    }

    pub fn otherwise(mut self, status: u16, body: impl Into<String>) -> Self {
        self.fallback = Ok(HttpResponse::new(status, body));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn record(&self, request: RecordedRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str, headers: &Headers) -> Result<HttpResponse, TransportError> {
        self.record(RecordedRequest {
            method: "GET",
            url: url.to_string(),
            headers: headers.clone(),
            body: None,
        })
    }

    async fn post(
        &self,
        url: &str,
        headers: &Headers,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, TransportError> {
        self.record(RecordedRequest {
            method: "POST",
            url: url.to_string(),
            headers: headers.clone(),
            body: Some(body.clone()),
        })
    }
}
