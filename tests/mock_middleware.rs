//! Mock middleware behaviour through an axum router.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use mock_responses::{attach_all, MockResponse, MockResponses, ResponseFragment, TargetRule};

mod common;

fn body(text: &str) -> ResponseFragment {
    ResponseFragment::new().body(text)
}

#[tokio::test]
async fn test_simple_response() {
    let app = MockResponses::new("/test", TargetRule::new(body("test")))
        .unwrap()
        .attach(common::downstream());

    let (status, content_type, text) = common::send(&app, Method::GET, "/test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
    assert_eq!(text, "test");
}

#[tokio::test]
async fn test_method_request_filter() {
    let app = MockResponses::new("/test", TargetRule::new(body("test")).method(Method::POST))
        .unwrap()
        .attach(common::downstream());

    let (status, _, text) = common::send(&app, Method::GET, "/test", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(text, "Not Found");

    let (status, _, text) = common::send(&app, Method::POST, "/test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "test");
}

#[tokio::test]
async fn test_accepts_request_filter() {
    let app = MockResponses::new("/test", TargetRule::new(body("test")).accepts("text"))
        .unwrap()
        .attach(common::downstream());

    let (status, _, _) = common::send(&app, Method::GET, "/test", Some("*/json")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, text) = common::send(&app, Method::GET, "/test", Some("text/plain")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "test");
}

#[tokio::test]
async fn test_responses_array() {
    let app = MockResponses::new(
        "/test",
        vec![
            TargetRule::new(body("get")).method(Method::GET),
            TargetRule::new(body("post")).method(Method::POST),
        ],
    )
    .unwrap()
    .attach(common::downstream());

    assert_eq!(common::get_body(&app, "/test").await, (StatusCode::OK, "get".to_string()));

    let (status, _, text) = common::send(&app, Method::POST, "/test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "post");
}

#[tokio::test]
async fn test_response_function() {
    let app = MockResponses::new(
        "/test",
        vec![
            TargetRule::new(MockResponse::handler(|ctx, _| {
                ctx.set_body("get");
                Ok(())
            }))
            .method(Method::GET),
            TargetRule::new(MockResponse::handler(|ctx, _| {
                ctx.set_body("post");
                Ok(())
            }))
            .method(Method::POST),
        ],
    )
    .unwrap()
    .attach(common::downstream());

    assert_eq!(common::get_body(&app, "/test").await, (StatusCode::OK, "get".to_string()));
    let (_, _, text) = common::send(&app, Method::POST, "/test", None).await;
    assert_eq!(text, "post");
}

#[tokio::test]
async fn test_response_function_args() {
    let app = MockResponses::new(
        "/test/:one",
        TargetRule::new(MockResponse::handler(|ctx, params| {
            let one = params.get(0).unwrap_or_default().to_string();
            ctx.set_body(one);
            Ok(())
        }))
        .method(Method::GET),
    )
    .unwrap()
    .attach(common::downstream());

    assert_eq!(
        common::get_body(&app, "/test/yeah").await,
        (StatusCode::OK, "yeah".to_string())
    );
}

#[tokio::test]
async fn test_async_response_function() {
    let app = MockResponses::new(
        "/test",
        TargetRule::new(MockResponse::async_handler(|ctx, _| {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                ctx.set_body("test");
                Ok(())
            })
        })),
    )
    .unwrap()
    .attach(common::downstream());

    assert_eq!(common::get_body(&app, "/test").await, (StatusCode::OK, "test".to_string()));
}

#[tokio::test]
async fn test_unmatched_path_reaches_downstream() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let app = MockResponses::new(
        "/test",
        TargetRule::new(MockResponse::handler(move |ctx, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            ctx.set_body("mock");
            Ok(())
        })),
    )
    .unwrap()
    .attach(common::downstream());

    assert_eq!(
        common::get_body(&app, "/downstream").await,
        (StatusCode::OK, "downstream".to_string())
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_mock_shadows_downstream_route() {
    let app = MockResponses::new("/downstream", TargetRule::new(body("mocked")))
        .unwrap()
        .attach(common::downstream());

    assert_eq!(
        common::get_body(&app, "/downstream").await,
        (StatusCode::OK, "mocked".to_string())
    );
}

#[tokio::test]
async fn test_matched_path_without_target_is_not_delegated() {
    let app = MockResponses::new("/downstream", TargetRule::new(body("x")).method(Method::DELETE))
        .unwrap()
        .attach(common::downstream());

    assert_eq!(
        common::get_body(&app, "/downstream").await,
        (StatusCode::NOT_FOUND, "Not Found".to_string())
    );
}

#[tokio::test]
async fn test_static_fragment_status_and_headers() {
    let app = MockResponses::new(
        "/items",
        TargetRule::new(
            ResponseFragment::new()
                .status(StatusCode::CREATED)
                .json(serde_json::json!({ "id": 1 }))
                .header("x-mock", "yes"),
        ),
    )
    .unwrap()
    .attach(common::downstream());

    let (status, content_type, text) = common::send(&app, Method::POST, "/items", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(content_type.as_deref(), Some("application/json; charset=utf-8"));
    assert_eq!(text, r#"{"id":1}"#);
}

#[tokio::test]
async fn test_null_body_fragment_is_empty() {
    let fragment: ResponseFragment =
        serde_json::from_value(serde_json::json!({ "status": 200, "body": null })).unwrap();
    let app = MockResponses::new("/test", TargetRule::new(fragment))
        .unwrap()
        .attach(common::downstream());

    let (status, content_type, text) = common::send(&app, Method::GET, "/test", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(content_type.is_none());
    assert!(text.is_empty());
}

#[tokio::test]
async fn test_handler_error_is_internal_server_error() {
    let app = MockResponses::new(
        "/test",
        TargetRule::new(MockResponse::handler(|_, _| Err("boom".into()))),
    )
    .unwrap()
    .attach(common::downstream());

    let (status, _) = common::get_body(&app, "/test").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_invalid_response_is_internal_server_error() {
    let app = MockResponses::new(
        "/test",
        TargetRule::new(MockResponse::Invalid(serde_json::json!(["not", "a", "fragment"]))),
    )
    .unwrap()
    .attach(common::downstream());

    let (status, _) = common::get_body(&app, "/test").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_chain_tries_mocks_in_order() {
    let app = attach_all(
        common::downstream(),
        vec![
            MockResponses::new("/users/me", TargetRule::new(body("me"))).unwrap(),
            MockResponses::new("/users/:id", TargetRule::new(body("someone"))).unwrap(),
        ],
    );

    assert_eq!(common::get_body(&app, "/users/me").await.1, "me");
    assert_eq!(common::get_body(&app, "/users/42").await.1, "someone");
    assert_eq!(common::get_body(&app, "/downstream").await.1, "downstream");
}
