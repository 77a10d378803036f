//! Target rules: a request predicate plus the response to give.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use futures_util::future::{self, BoxFuture};
use serde::Deserialize;

use crate::http::{MockBody, MockContext};
use crate::routing::matcher::{AcceptsMatcher, AndMatcher, Matcher, MethodMatcher};
use crate::routing::PathParams;

/// Error returned by a response handler. Passed through untouched.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a response handler.
pub type HandlerResult = Result<(), HandlerError>;

/// A computed response.
///
/// Receives the request context and the captured path segments in
/// template order. The returned future must finish before the response is
/// considered written.
pub trait Responder: Send + Sync {
    fn respond<'a>(&'a self, ctx: &'a mut MockContext, params: PathParams)
        -> BoxFuture<'a, HandlerResult>;
}

struct SyncResponder<F>(F);

impl<F> Responder for SyncResponder<F>
where
    F: Fn(&mut MockContext, PathParams) -> HandlerResult + Send + Sync,
{
    fn respond<'a>(
        &'a self,
        ctx: &'a mut MockContext,
        params: PathParams,
    ) -> BoxFuture<'a, HandlerResult> {
        // Runs now; the future is already resolved.
        Box::pin(future::ready((self.0)(ctx, params)))
    }
}

struct AsyncResponder<F>(F);

impl<F> Responder for AsyncResponder<F>
where
    F: for<'a> Fn(&'a mut MockContext, PathParams) -> BoxFuture<'a, HandlerResult> + Send + Sync,
{
    fn respond<'a>(
        &'a self,
        ctx: &'a mut MockContext,
        params: PathParams,
    ) -> BoxFuture<'a, HandlerResult> {
        (self.0)(ctx, params)
    }
}

/// Static response fields merged onto the outgoing response.
///
/// Only the fields that are set overwrite anything.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseFragment {
    #[serde(default, with = "status_code")]
    pub status: Option<StatusCode>,
    /// `Some(Value::Null)` clears the body.
    #[serde(default, deserialize_with = "present")]
    pub body: Option<serde_json::Value>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Distinguishes `body = null` from an absent body.
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

mod status_code {
    use axum::http::StatusCode;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<StatusCode>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = Option::<u16>::deserialize(deserializer)?;
        code.map(|c| StatusCode::from_u16(c).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Error applying a fragment whose header text is not a valid header.
#[derive(Debug, thiserror::Error)]
#[error("invalid header '{name}': {reason}")]
pub struct FragmentError {
    pub name: String,
    pub reason: String,
}

impl ResponseFragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Text body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(serde_json::Value::String(body.into()));
        self
    }

    /// JSON body.
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn last_modified(mut self, value: impl Into<String>) -> Self {
        self.last_modified = Some(value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Merge into the context's response: status, then body, then headers.
    pub fn apply(&self, ctx: &mut MockContext) -> Result<(), FragmentError> {
        let response = ctx.response_mut();

        if let Some(status) = self.status {
            response.set_status(status);
        }

        match &self.body {
            Some(serde_json::Value::Null) => response.clear_body(),
            Some(body) => response.set_body(MockBody::from(body.clone())),
            None => {}
        }

        if let Some(content_type) = &self.content_type {
            let resolved = resolve_content_type(content_type);
            response.set_header(header::CONTENT_TYPE, header_value("content-type", &resolved)?);
        }

        if let Some(etag) = &self.etag {
            let quoted = if etag.starts_with('"') || etag.starts_with("W/\"") {
                etag.clone()
            } else {
                format!("\"{etag}\"")
            };
            response.set_header(header::ETAG, header_value("etag", &quoted)?);
        }

        if let Some(last_modified) = &self.last_modified {
            response.set_header(
                header::LAST_MODIFIED,
                header_value("last-modified", &http_date(last_modified))?,
            );
        }

        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| FragmentError {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            response.set_header(header_name, header_value(name, value)?);
        }

        Ok(())
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, FragmentError> {
    HeaderValue::from_str(value).map_err(|e| FragmentError {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

/// Render a date as an HTTP date in GMT. Text that is not a recognised
/// date is sent as written.
fn http_date(value: &str) -> String {
    let value = value.trim();
    let parsed = DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        });

    match parsed {
        Some(dt) => dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
        None => value.to_string(),
    }
}

/// `json` becomes `application/json; charset=utf-8`; full types pass through.
fn resolve_content_type(value: &str) -> String {
    let mime = if value.contains('/') {
        value.to_string()
    } else {
        match mime_guess::from_ext(value.trim_start_matches('.')).first() {
            Some(m) => m.essence_str().to_string(),
            None => return value.to_string(),
        }
    };

    let needs_charset = !mime.contains("charset")
        && (mime.starts_with("text/")
            || mime.starts_with("application/json")
            || mime.starts_with("application/javascript"));
    if needs_charset {
        format!("{mime}; charset=utf-8")
    } else {
        mime
    }
}

/// What a target answers with.
#[derive(Clone)]
pub enum MockResponse {
    Fragment(ResponseFragment),
    Handler(Arc<dyn Responder>),
    /// A configured value that is neither; fails when the target is selected.
    Invalid(serde_json::Value),
}

impl MockResponse {
    pub fn fragment(fragment: ResponseFragment) -> Self {
        MockResponse::Fragment(fragment)
    }

    /// A handler that completes immediately.
    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(&mut MockContext, PathParams) -> HandlerResult + Send + Sync + 'static,
    {
        MockResponse::Handler(Arc::new(SyncResponder(f)))
    }

    /// A handler returning a future, e.g. `|ctx, _| Box::pin(async move { .. })`.
    pub fn async_handler<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut MockContext, PathParams) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        MockResponse::Handler(Arc::new(AsyncResponder(f)))
    }

    /// Infer the variant of a configured value once.
    ///
    /// An object that reads as a fragment is a fragment; anything else is
    /// kept as `Invalid` and reported only if the target is ever selected.
    pub fn from_value(value: serde_json::Value) -> Self {
        if value.is_object() {
            if let Ok(fragment) = ResponseFragment::deserialize(&value) {
                return MockResponse::Fragment(fragment);
            }
        }
        MockResponse::Invalid(value)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MockResponse::Fragment(_) => "fragment",
            MockResponse::Handler(_) => "handler",
            MockResponse::Invalid(_) => "invalid",
        }
    }
}

impl fmt::Debug for MockResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MockResponse::Fragment(fragment) => f.debug_tuple("Fragment").field(fragment).finish(),
            MockResponse::Handler(_) => f.write_str("Handler(<fn>)"),
            MockResponse::Invalid(value) => f.debug_tuple("Invalid").field(value).finish(),
        }
    }
}

impl From<ResponseFragment> for MockResponse {
    fn from(fragment: ResponseFragment) -> Self {
        MockResponse::Fragment(fragment)
    }
}

/// The conditions a request must meet for a target to be eligible.
///
/// An unset field is a wildcard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestPredicate {
    pub methods: Option<Vec<Method>>,
    pub accepts: Option<String>,
}

impl RequestPredicate {
    fn compile(&self) -> AndMatcher {
        let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();
        if let Some(methods) = &self.methods {
            matchers.push(Box::new(MethodMatcher::new(methods.iter().cloned())));
        }
        if let Some(accepts) = &self.accepts {
            matchers.push(Box::new(AcceptsMatcher::new(accepts.clone())));
        }
        AndMatcher::new(matchers)
    }
}

/// One candidate answer for a route.
#[derive(Debug)]
pub struct TargetRule {
    request: Option<RequestPredicate>,
    matcher: Option<AndMatcher>,
    response: MockResponse,
}

impl TargetRule {
    /// A catch-all rule.
    pub fn new(response: impl Into<MockResponse>) -> Self {
        Self {
            request: None,
            matcher: None,
            response: response.into(),
        }
    }

    /// A rule with an explicit predicate (`None` = catch-all).
    pub fn with_request(request: Option<RequestPredicate>, response: impl Into<MockResponse>) -> Self {
        let matcher = request.as_ref().map(RequestPredicate::compile);
        Self {
            request,
            matcher,
            response: response.into(),
        }
    }

    /// Restrict to one method.
    pub fn method(self, method: Method) -> Self {
        self.methods([method])
    }

    /// Restrict to a set of methods.
    pub fn methods(self, methods: impl IntoIterator<Item = Method>) -> Self {
        let mut request = self.request.unwrap_or_default();
        request.methods = Some(methods.into_iter().collect());
        Self::with_request(Some(request), self.response)
    }

    /// Restrict to requests accepting `content_type`.
    pub fn accepts(self, content_type: impl Into<String>) -> Self {
        let mut request = self.request.unwrap_or_default();
        request.accepts = Some(content_type.into());
        Self::with_request(Some(request), self.response)
    }

    pub fn request(&self) -> Option<&RequestPredicate> {
        self.request.as_ref()
    }

    pub fn response(&self) -> &MockResponse {
        &self.response
    }

    pub fn is_catch_all(&self) -> bool {
        self.request.is_none()
    }

    /// True if this rule carries a predicate and the request satisfies it.
    pub(crate) fn predicate_matches(&self, ctx: &MockContext) -> bool {
        self.matcher.as_ref().is_some_and(|m| m.matches(ctx))
    }
}

impl From<ResponseFragment> for TargetRule {
    fn from(fragment: ResponseFragment) -> Self {
        TargetRule::new(fragment)
    }
}

/// One rule or an ordered list of rules.
#[derive(Debug, Default)]
pub struct Targets(Vec<TargetRule>);

impl Targets {
    pub fn into_vec(self) -> Vec<TargetRule> {
        self.0
    }
}

impl From<TargetRule> for Targets {
    fn from(rule: TargetRule) -> Self {
        Targets(vec![rule])
    }
}

impl From<Vec<TargetRule>> for Targets {
    fn from(rules: Vec<TargetRule>) -> Self {
        Targets(rules)
    }
}

impl<const N: usize> From<[TargetRule; N]> for Targets {
    fn from(rules: [TargetRule; N]) -> Self {
        Targets(rules.into())
    }
}

impl FromIterator<TargetRule> for Targets {
    fn from_iter<I: IntoIterator<Item = TargetRule>>(iter: I) -> Self {
        Targets(iter.into_iter().collect())
    }
}
