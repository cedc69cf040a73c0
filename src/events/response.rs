//! Response descriptor and request outcome.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use thiserror::Error;

/// Read-only description of a received HTTP response.
///
/// The body may be absent, or partial if the engine had not finished
/// buffering it when the completion event was published.
#[derive(Debug, Clone)]
pub struct ResponseDescriptor {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl ResponseDescriptor {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}

/// A request that ended without an HTTP response (connect failure, reset, timeout).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{description}")]
pub struct TransportError {
    description: String,
}

impl TransportError {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl From<&reqwest::Error> for TransportError {
    fn from(err: &reqwest::Error) -> Self {
        // Walk the source chain so "error sending request" carries its cause.
        let mut description = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            description.push_str(": ");
            description.push_str(&cause.to_string());
            source = cause.source();
        }
        Self { description }
    }
}

/// How a request ended.
#[derive(Debug, Clone)]
pub enum Outcome {
    Response(ResponseDescriptor),
    Failed(TransportError),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

impl From<ResponseDescriptor> for Outcome {
    fn from(response: ResponseDescriptor) -> Self {
        Outcome::Response(response)
    }
}

impl From<TransportError> for Outcome {
    fn from(error: TransportError) -> Self {
        Outcome::Failed(error)
    }
}
