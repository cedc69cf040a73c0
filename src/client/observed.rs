//! `reqwest` adapter that publishes request lifecycle events.

use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use reqwest::{IntoUrl, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::events::{
    LifecycleBus, Outcome, RequestCompleted, RequestDescriptor, RequestId, RequestStarted,
    ResponseDescriptor, TransportError,
};

/// An HTTP client whose every request is published on a lifecycle bus.
///
/// Observation never changes what the caller gets back: errors are the
/// original `reqwest` errors, responses carry the received status, headers
/// and body.
#[derive(Debug, Clone)]
pub struct ObservedClient {
    inner: reqwest::Client,
    bus: LifecycleBus,
}

impl ObservedClient {
    /// Publish on the process-wide bus.
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_bus(client, LifecycleBus::global().clone())
    }

    pub fn with_bus(client: reqwest::Client, bus: LifecycleBus) -> Self {
        Self { inner: client, bus }
    }

    pub fn bus(&self) -> &LifecycleBus {
        &self.bus
    }

    pub fn request<U: IntoUrl>(&self, method: Method, url: U) -> RequestBuilder {
        self.inner.request(method, url)
    }

    pub fn get<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.inner.get(url)
    }

    pub fn post<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.inner.post(url)
    }

    /// Build and execute. A builder that fails to build publishes nothing.
    pub async fn send(&self, builder: RequestBuilder) -> Result<ObservedResponse, reqwest::Error> {
        let request = builder.build()?;
        self.execute(request).await
    }

    /// Execute a request, publishing its start and completion.
    pub async fn execute(&self, request: reqwest::Request) -> Result<ObservedResponse, reqwest::Error> {
        let id = RequestId::new();
        let descriptor = Arc::new(describe(&request));
        self.bus.emit_started(&RequestStarted::new(id, descriptor.clone()));
        let pending = PendingCompletion {
            bus: &self.bus,
            id,
            descriptor: Some(descriptor),
        };

        let response = match self.inner.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                pending.complete(TransportError::from(&err).into());
                return Err(err);
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();

        match response.bytes().await {
            Ok(body) => {
                let observed = ResponseDescriptor::new(status)
                    .with_headers(headers.clone())
                    .with_body(body.clone());
                pending.complete(observed.into());
                Ok(ObservedResponse {
                    status,
                    headers,
                    url,
                    body,
                })
            }
            Err(err) => {
                pending.complete(TransportError::from(&err).into());
                Err(err)
            }
        }
    }
}

/// Completion owed for a published start. Dropped unfinished, e.g. when the
/// caller abandons the future, it publishes a cancellation failure.
struct PendingCompletion<'a> {
    bus: &'a LifecycleBus,
    id: RequestId,
    descriptor: Option<Arc<RequestDescriptor>>,
}

impl PendingCompletion<'_> {
    fn complete(mut self, outcome: Outcome) {
        self.publish(outcome);
    }

    fn publish(&mut self, outcome: Outcome) {
        if let Some(descriptor) = self.descriptor.take() {
            self.bus
                .emit_completed(&RequestCompleted::new(self.id, descriptor, outcome));
        }
    }
}

impl Drop for PendingCompletion<'_> {
    fn drop(&mut self) {
        if self.descriptor.is_some() {
            tracing::debug!(request_id = %self.id, "Request dropped before completion");
            self.publish(TransportError::new(CANCELLED).into());
        }
    }
}

const CANCELLED: &str = "request cancelled";

impl Default for ObservedClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

fn describe(request: &reqwest::Request) -> RequestDescriptor {
    let descriptor = RequestDescriptor::new(request.method().clone(), request.url().clone())
        .with_headers(request.headers().clone());

    // Streaming bodies are not captured.
    match request.body().and_then(|body| body.as_bytes()) {
        Some(bytes) => descriptor.with_body(Bytes::copy_from_slice(bytes)),
        None => descriptor,
    }
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct ObservedResponse {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    body: Bytes,
}

impl ObservedResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Final URL, after redirects.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    pub fn into_bytes(self) -> Bytes {
        self.body
    }

    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
