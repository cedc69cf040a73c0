//! Request identity and descriptor.
//!
//! # Responsibilities
//! - Generate unique request IDs (UUID v4), one per HTTP task
//! - Validate raw request parts into an immutable descriptor

use std::fmt;

use bytes::Bytes;
use http::{HeaderMap, Method};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// Opaque identity of one in-flight request.
///
/// Two concurrent requests to the same URL always get distinct IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a new random request ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RequestId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Errors raised while turning raw request parts into a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("request has no HTTP method")]
    MissingMethod,

    #[error("request has no URL")]
    MissingUrl,

    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("invalid request URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Unvalidated request fields as an engine may report them.
#[derive(Debug, Clone, Default)]
pub struct RequestParts {
    pub method: Option<String>,
    pub url: Option<String>,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// Read-only description of an outgoing request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
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

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}

impl TryFrom<RequestParts> for RequestDescriptor {
    type Error = EventError;

    fn try_from(parts: RequestParts) -> Result<Self, Self::Error> {
        let method = parts.method.ok_or(EventError::MissingMethod)?;
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| EventError::InvalidMethod(method.clone()))?;

        let raw_url = parts.url.ok_or(EventError::MissingUrl)?;
        let url = Url::parse(&raw_url).map_err(|e| EventError::InvalidUrl {
            url: raw_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            method,
            url,
            headers: parts.headers,
            body: parts.body,
        })
    }
}
