use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use newsrag_core::NewsragError;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

#[derive(Debug, Clone)]
pub struct BackendRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Option<Duration>,
}

impl BackendRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        let mut request = Self::new(Method::Post, url);
        request.body = Some(body);
        request
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Response status and decoded body. Empty bodies decode to `Value::Null`.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: u16,
    pub body: Value,
}

impl BackendResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport seam between the client and the Weaviate REST API.
#[async_trait]
pub trait WeaviateBackend: Send + Sync {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, NewsragError>;
}

/// Production backend using reqwest.
pub struct HttpBackend {
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeaviateBackend for HttpBackend {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, NewsragError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Delete => self.client.delete(&request.url),
        };
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| NewsragError::Http(format!("request to {} failed: {e}", request.url)))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| NewsragError::Http(format!("failed to read response body: {e}")))?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            // Weaviate answers some errors in plain text; keep them readable.
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(BackendResponse { status, body })
    }
}

/// Test backend with queued responses. Every request is recorded.
#[derive(Default)]
pub struct FakeBackend {
    responses: Mutex<VecDeque<Result<BackendResponse, NewsragError>>>,
    requests: Mutex<Vec<BackendRequest>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, status: u16, body: Value) -> &Self {
        self.lock_responses()
            .push_back(Ok(BackendResponse::new(status, body)));
        self
    }

    pub fn push_error(&self, error: NewsragError) -> &Self {
        self.lock_responses().push_back(Err(error));
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<BackendRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn into_shared(self) -> Arc<dyn WeaviateBackend> {
        Arc::new(self)
    }

    fn lock_responses(
        &self,
    ) -> std::sync::MutexGuard<'_, VecDeque<Result<BackendResponse, NewsragError>>> {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl WeaviateBackend for FakeBackend {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, NewsragError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request);
        self.lock_responses()
            .pop_front()
            .unwrap_or_else(|| Err(NewsragError::Http("FakeBackend exhausted".to_string())))
    }
}
