//! Shared utilities for integration tests.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    routing::get,
    Router,
};
use tower::ServiceExt;

/// A downstream app: `/downstream` answers, anything else is an empty 404.
pub fn downstream() -> Router {
    Router::new()
        .route("/downstream", get(|| async { "downstream" }))
        .fallback(|| async { StatusCode::NOT_FOUND })
}

/// Send one request through `app`, returning status, content type and body.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    accept: Option<&str>,
) -> (StatusCode, Option<String>, String) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(accept) = accept {
        request = request.header(header::ACCEPT, accept);
    }
    let request = request.body(Body::from("something")).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

#[allow(dead_code)]
pub async fn get_body(app: &Router, uri: &str) -> (StatusCode, String) {
    let (status, _, body) = send(app, Method::GET, uri, None).await;
    (status, body)
}
