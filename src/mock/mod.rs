//! Mock responses for one route.
//!
//! # Data Flow
//! ```text
//! Request (method, path, Accept)
//!     → pattern test on path          no match → next()
//!     → selector.rs (pick a target)   none     → leave response as is
//!     → target.rs (render)
//!         fragment → merge onto ctx.response
//!         handler  → call with ctx + path params, await
//!         invalid  → MockError::InvalidResponse
//! ```
//!
//! # Design Decisions
//! - Pattern and targets are compiled once and shared read-only
//! - A matched path with no target does not fall through to `next()`
//! - Handler errors are returned unchanged; no retries, no recovery

pub mod selector;
pub mod target;

use std::future::Future;
use std::sync::Arc;

use crate::error::MockError;
use crate::http::MockContext;
use crate::routing::{PathParams, PathPattern};

pub use selector::select_target;
pub use target::{
    HandlerError, HandlerResult, MockResponse, RequestPredicate, Responder, ResponseFragment,
    TargetRule, Targets,
};

/// Result of processing one request.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The path did not match; holds what `next()` produced.
    Delegated(T),
    /// The target at this index wrote the response.
    Responded { target: usize },
    /// The path matched but no target applied. Nothing was written.
    Unhandled,
}

/// Mock responses for one route pattern.
///
/// Cheap to clone; the compiled pattern and the targets are shared.
#[derive(Debug, Clone)]
pub struct MockResponses {
    pattern: Arc<PathPattern>,
    targets: Arc<[TargetRule]>,
}

impl MockResponses {
    /// Compile `route` and take ownership of the targets.
    pub fn new(route: &str, targets: impl Into<Targets>) -> Result<Self, MockError> {
        let pattern = PathPattern::compile(route).map_err(|source| MockError::Pattern {
            route: route.to_string(),
            source,
        })?;
        let targets: Arc<[TargetRule]> = targets.into().into_vec().into();

        if targets.is_empty() {
            tracing::warn!(route = %route, "Mock has no targets, every request is delegated");
        } else {
            tracing::debug!(route = %route, targets = targets.len(), "Mock compiled");
        }

        Ok(Self {
            pattern: Arc::new(pattern),
            targets,
        })
    }

    pub fn route(&self) -> &str {
        self.pattern.template()
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn targets(&self) -> &[TargetRule] {
        &self.targets
    }

    /// Returns true if this mock takes requests for `path`.
    pub fn handles(&self, path: &str) -> bool {
        !self.targets.is_empty() && self.pattern.is_match(path)
    }

    /// Target selection alone, without rendering.
    pub fn select(&self, ctx: &MockContext) -> Option<usize> {
        select_target(&self.targets, ctx)
    }

    /// Process one request.
    ///
    /// `next` runs only when the path does not match.
    pub async fn process<N, Fut>(
        &self,
        ctx: &mut MockContext,
        next: N,
    ) -> Result<Outcome<Fut::Output>, MockError>
    where
        N: FnOnce() -> Fut,
        Fut: Future,
    {
        if !self.handles(ctx.path()) {
            return Ok(Outcome::Delegated(next().await));
        }
        self.respond(ctx).await
    }

    /// Select and render for a request whose path already matched.
    pub async fn respond<T>(&self, ctx: &mut MockContext) -> Result<Outcome<T>, MockError> {
        let Some(index) = self.select(ctx) else {
            tracing::debug!(
                route = %self.route(),
                method = %ctx.method(),
                path = %ctx.path(),
                "No target matched"
            );
            return Ok(Outcome::Unhandled);
        };

        tracing::debug!(
            route = %self.route(),
            method = %ctx.method(),
            path = %ctx.path(),
            target = index,
            "Target selected"
        );

        match self.targets[index].response() {
            MockResponse::Handler(responder) => {
                let params = self.params(ctx.path());
                responder
                    .respond(ctx, params)
                    .await
                    .map_err(MockError::Handler)?;
            }
            MockResponse::Fragment(fragment) => fragment.apply(ctx)?,
            MockResponse::Invalid(value) => {
                return Err(MockError::InvalidResponse(value.to_string()));
            }
        }

        Ok(Outcome::Responded { target: index })
    }

    fn params(&self, path: &str) -> PathParams {
        self.pattern.captures(path).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri};
    use std::cell::Cell;
    use std::time::Duration;

    fn ctx(method: Method, path: &str) -> MockContext {
        MockContext::new(method, path.parse::<Uri>().unwrap(), HeaderMap::new())
    }

    fn body(text: &str) -> ResponseFragment {
        ResponseFragment::new().body(text)
    }

    #[tokio::test]
    async fn test_unmatched_path_delegates_once() {
        let mock = MockResponses::new("/test", TargetRule::new(body("test"))).unwrap();
        let calls = Cell::new(0);
        let mut ctx = ctx(Method::GET, "/other");

        let outcome = mock
            .process(&mut ctx, || async {
                calls.set(calls.get() + 1);
                "downstream"
            })
            .await
            .unwrap();

        assert!(matches!(outcome, Outcome::Delegated("downstream")));
        assert_eq!(calls.get(), 1);
        assert_eq!(ctx.response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_static_fragment() {
        let mock = MockResponses::new("/test", TargetRule::new(body("test"))).unwrap();
        let mut ctx = ctx(Method::GET, "/test");

        let outcome = mock.process(&mut ctx, || async {}).await.unwrap();

        assert!(matches!(outcome, Outcome::Responded { target: 0 }));
        assert_eq!(ctx.response.status(), StatusCode::OK);
        assert_eq!(ctx.response.body_text().as_deref(), Some("test"));
    }

    #[tokio::test]
    async fn test_no_target_does_not_call_next() {
        let mock =
            MockResponses::new("/test", TargetRule::new(body("test")).method(Method::POST)).unwrap();
        let mut ctx = ctx(Method::GET, "/test");
        let called = Cell::new(false);

        let outcome = mock
            .process(&mut ctx, || async { called.set(true) })
            .await
            .unwrap();

        assert!(matches!(outcome, Outcome::Unhandled));
        assert!(!called.get());
        assert_eq!(ctx.response.status(), StatusCode::NOT_FOUND);
        assert!(ctx.response.body().is_none());
    }

    #[tokio::test]
    async fn test_zero_targets_delegate() {
        let mock = MockResponses::new("/test", Vec::<TargetRule>::new()).unwrap();
        let mut ctx = ctx(Method::GET, "/test");
        let outcome = mock.process(&mut ctx, || async { 1 }).await.unwrap();
        assert!(matches!(outcome, Outcome::Delegated(1)));
    }

    #[tokio::test]
    async fn test_handler_receives_params_in_order() {
        let mock = MockResponses::new(
            "/users/:user/posts/:post",
            TargetRule::new(MockResponse::handler(|ctx, params| {
                let text = format!("{}-{}", params.get(0).unwrap_or("?"), params.get(1).unwrap_or("?"));
                ctx.set_body(text);
                Ok(())
            })),
        )
        .unwrap();
        let mut ctx = ctx(Method::GET, "/users/ann/posts/9");

        mock.process(&mut ctx, || async {}).await.unwrap();

        assert_eq!(ctx.response.body_text().as_deref(), Some("ann-9"));
    }

    #[tokio::test]
    async fn test_async_handler_completes_before_return() {
        let mock = MockResponses::new(
            "/test",
            TargetRule::new(MockResponse::async_handler(|ctx, _| {
                Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    ctx.set_body("test");
                    Ok(())
                })
            })),
        )
        .unwrap();
        let mut ctx = ctx(Method::GET, "/test");

        mock.process(&mut ctx, || async {}).await.unwrap();

        assert_eq!(ctx.response.body_text().as_deref(), Some("test"));
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let mock = MockResponses::new(
            "/test",
            TargetRule::new(MockResponse::handler(|_, _| Err("backend exploded".into()))),
        )
        .unwrap();
        let mut ctx = ctx(Method::GET, "/test");

        let err = mock.process(&mut ctx, || async {}).await.unwrap_err();
        assert!(matches!(err, MockError::Handler(_)));
        assert_eq!(err.to_string(), "backend exploded");
    }

    #[tokio::test]
    async fn test_invalid_response_fails_only_when_selected() {
        let mock = MockResponses::new(
            "/test",
            vec![
                TargetRule::new(MockResponse::Invalid(serde_json::json!("nope"))).method(Method::POST),
                TargetRule::new(body("fine")),
            ],
        )
        .unwrap();

        let mut get = ctx(Method::GET, "/test");
        assert!(mock.process(&mut get, || async {}).await.is_ok());

        let mut post = ctx(Method::POST, "/test");
        let err = mock.process(&mut post, || async {}).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid response: \"nope\"");
    }

    #[tokio::test]
    async fn test_accepts_selection() {
        let mock = MockResponses::new("/test", TargetRule::new(body("test")).accepts("text")).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/json"));
        let mut json_only = MockContext::new(Method::GET, Uri::from_static("/test"), headers);
        let outcome = mock.process(&mut json_only, || async {}).await.unwrap();
        assert!(matches!(outcome, Outcome::Unhandled));

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("text/plain"));
        let mut text = MockContext::new(Method::GET, Uri::from_static("/test"), headers);
        let outcome = mock.process(&mut text, || async {}).await.unwrap();
        assert!(matches!(outcome, Outcome::Responded { target: 0 }));
    }

    #[tokio::test]
    async fn test_unknown_extension_selected_without_accept_header() {
        let mock =
            MockResponses::new("/test", TargetRule::new(body("x")).accepts("nonsenseext")).unwrap();
        let mut ctx = ctx(Method::GET, "/test");
        let outcome = mock.process(&mut ctx, || async {}).await.unwrap();
        assert!(matches!(outcome, Outcome::Responded { target: 0 }));
    }

    #[test]
    fn test_invalid_route() {
        let err = MockResponses::new("/a/:", Vec::<TargetRule>::new()).unwrap_err();
        assert!(matches!(err, MockError::Pattern { .. }));
    }
}
