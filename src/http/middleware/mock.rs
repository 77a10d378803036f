//! Mock Responses Middleware.
//! Answers matching requests from mocks, passes the rest downstream.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};

use crate::http::MockContext;
use crate::mock::{MockResponses, Outcome};
use crate::routing::MockRouter;

/// Middleware function for `axum::middleware::from_fn_with_state`.
pub async fn mock_responses_middleware(
    State(mocks): State<Arc<MockRouter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let mut ctx = MockContext::from_parts(&parts);
    let request = Request::from_parts(parts, body);

    match mocks.process(&mut ctx, move || next.run(request)).await {
        Ok(Outcome::Delegated(response)) => response,
        Ok(outcome) => {
            tracing::debug!(
                method = %ctx.method(),
                path = %ctx.path(),
                status = %ctx.response.status(),
                outcome = ?outcome,
                "Mocked request"
            );
            ctx.into_response_state().into_response()
        }
        Err(e) => {
            tracing::error!(
                method = %ctx.method(),
                path = %ctx.path(),
                error = %e,
                "Mock failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Layer a chain of mocks onto a router.
pub fn attach_all<S>(router: Router<S>, mocks: impl Into<MockRouter>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let mocks = Arc::new(mocks.into());
    router.layer(middleware::from_fn_with_state(mocks, mock_responses_middleware))
}

impl MockResponses {
    /// Layer this mock onto a router.
    pub fn attach<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        attach_all(router, vec![self])
    }
}
