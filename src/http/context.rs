//! Per-request context handed to mocks.
//!
//! # Responsibilities
//! - Expose the request line and headers a mock may inspect
//! - Answer `accepts()` queries against the `Accept` header
//! - Own the mutable `ResponseState` mocks write into
//!
//! # Design Decisions
//! - Built from request `Parts` by cloning, so the original request stays
//!   available for delegation
//! - The request body is not captured

use axum::http::request::Parts;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};

use crate::http::accepts;
use crate::http::response::{MockBody, ResponseState};

/// Request context for one mocked request.
#[derive(Debug, Clone)]
pub struct MockContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    pub response: ResponseState,
}

impl MockContext {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
            response: ResponseState::default(),
        }
    }

    /// Build a context from request parts without consuming them.
    pub fn from_parts(parts: &Parts) -> Self {
        Self::new(parts.method.clone(), parts.uri.clone(), parts.headers.clone())
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Request path, without the query string.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the resolved media type if the request accepts `content_type`.
    pub fn accepts(&self, content_type: &str) -> Option<String> {
        let accept = self
            .headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>();
        if accept.is_empty() {
            accepts::accepts(None, content_type)
        } else {
            accepts::accepts(Some(&accept.join(",")), content_type)
        }
    }

    pub fn response_mut(&mut self) -> &mut ResponseState {
        &mut self.response
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.response.set_status(status);
    }

    pub fn set_body(&mut self, body: impl Into<MockBody>) {
        self.response.set_body(body);
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response.set_header(name, value);
    }

    /// Hand the response over, dropping the request side.
    pub fn into_response_state(self) -> ResponseState {
        self.response
    }
}
