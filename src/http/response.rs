//! Outgoing response state for mocked requests.
//!
//! # Responsibilities
//! - Hold the status, headers and body that fragments and handlers write
//! - Apply the host defaults: 404 until something answers, 200 once a body
//!   is set, content type inferred from the body
//! - Render into an axum `Response`
//!
//! # Design Decisions
//! - Status is tracked as "explicit" once set directly, so a later body
//!   does not overwrite it
//! - An existing `Content-Type` is never replaced by body inference
//! - Empty-body statuses (204, 205, 304) drop any body
//! - A cleared body renders empty, never as the reason phrase

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

const TEXT_UTF8: &str = "text/plain; charset=utf-8";
const HTML_UTF8: &str = "text/html; charset=utf-8";
const JSON_UTF8: &str = "application/json; charset=utf-8";
const OCTET_STREAM: &str = "application/octet-stream";

/// A response body as written by a mock.
#[derive(Debug, Clone, PartialEq)]
pub enum MockBody {
    Text(String),
    Json(serde_json::Value),
    Bytes(Bytes),
}

impl MockBody {
    fn inferred_content_type(&self) -> &'static str {
        match self {
            MockBody::Text(text) if text.trim_start().starts_with('<') => HTML_UTF8,
            MockBody::Text(_) => TEXT_UTF8,
            MockBody::Json(_) => JSON_UTF8,
            MockBody::Bytes(_) => OCTET_STREAM,
        }
    }

    fn into_bytes(self) -> Bytes {
        match self {
            MockBody::Text(text) => Bytes::from(text),
            // Serializing a Value cannot fail.
            MockBody::Json(value) => Bytes::from(value.to_string()),
            MockBody::Bytes(bytes) => bytes,
        }
    }
}

impl From<String> for MockBody {
    fn from(value: String) -> Self {
        MockBody::Text(value)
    }
}

impl From<&str> for MockBody {
    fn from(value: &str) -> Self {
        MockBody::Text(value.to_string())
    }
}

impl From<serde_json::Value> for MockBody {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => MockBody::Text(text),
            other => MockBody::Json(other),
        }
    }
}

impl From<Bytes> for MockBody {
    fn from(value: Bytes) -> Self {
        MockBody::Bytes(value)
    }
}

impl From<Vec<u8>> for MockBody {
    fn from(value: Vec<u8>) -> Self {
        MockBody::Bytes(Bytes::from(value))
    }
}

/// Mutable response a mock writes into.
#[derive(Debug, Clone)]
pub struct ResponseState {
    status: StatusCode,
    explicit_status: bool,
    headers: HeaderMap,
    body: Option<MockBody>,
    explicit_null_body: bool,
}

impl Default for ResponseState {
    fn default() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            explicit_status: false,
            headers: HeaderMap::new(),
            body: None,
            explicit_null_body: false,
        }
    }
}

fn is_empty_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::NO_CONTENT | StatusCode::RESET_CONTENT | StatusCode::NOT_MODIFIED
    )
}

impl ResponseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// True once the status was set directly rather than defaulted.
    pub fn is_status_explicit(&self) -> bool {
        self.explicit_status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
        self.explicit_status = true;
        if is_empty_status(status) && self.body.is_some() {
            self.clear_body();
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> Option<&MockBody> {
        self.body.as_ref()
    }

    /// Set the body.
    ///
    /// Unless the status was set explicitly it becomes 200. The content type
    /// is inferred when none is set yet.
    pub fn set_body(&mut self, body: impl Into<MockBody>) {
        let body = body.into();
        if !self.explicit_status {
            self.status = StatusCode::OK;
        }
        if !self.headers.contains_key(header::CONTENT_TYPE) {
            self.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(body.inferred_content_type()),
            );
        }
        self.body = Some(body);
        self.explicit_null_body = false;
    }

    /// Clear the body.
    ///
    /// The status becomes 204 unless it already is an empty-body status,
    /// even when it was set explicitly. The response then renders empty.
    pub fn clear_body(&mut self) {
        self.body = None;
        self.explicit_null_body = true;
        self.headers.remove(header::CONTENT_TYPE);
        self.headers.remove(header::CONTENT_LENGTH);
        self.headers.remove(header::TRANSFER_ENCODING);
        if !is_empty_status(self.status) {
            self.status = StatusCode::NO_CONTENT;
            self.explicit_status = true;
        }
    }

    /// True once the body was cleared and not set again.
    pub fn is_body_cleared(&self) -> bool {
        self.explicit_null_body
    }

    /// Body rendered as text, for inspection.
    pub fn body_text(&self) -> Option<String> {
        self.body.as_ref().map(|body| match body {
            MockBody::Text(text) => text.clone(),
            MockBody::Json(value) => value.to_string(),
            MockBody::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        })
    }
}

impl IntoResponse for ResponseState {
    fn into_response(self) -> Response {
        let ResponseState {
            status,
            headers,
            body,
            explicit_null_body,
            ..
        } = self;

        let (body, fallback_type) = match body {
            _ if is_empty_status(status) => (Body::empty(), None),
            None if explicit_null_body => (Body::empty(), None),
            Some(body) => (Body::from(body.into_bytes()), None),
            None => {
                let reason = status.canonical_reason().unwrap_or_default();
                (Body::from(reason), Some(TEXT_UTF8))
            }
        };

        let mut response = Response::new(body);
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        if let Some(content_type) = fallback_type {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        response
    }
}
