//! Mocks declared in a mock file, served through an axum router.

use axum::http::{Method, StatusCode};
use mock_responses::attach_all;
use mock_responses::config::{load_mock_file, parse_mock_file};

mod common;

const MOCKS: &str = r#"
[[mocks]]
route = "/users/:id"

[[mocks.targets]]
request = { method = ["GET", "HEAD"], accepts = "json" }
response = { body = { id = 42 }, headers = { "x-mock" = "users" } }

[[mocks.targets]]
request = { method = "DELETE" }
response = { status = 204 }

[[mocks.targets]]
response = { status = 406, body = "only JSON here" }

[[mocks]]
route = "/broken"

[[mocks.targets]]
request = { method = "POST" }
response = 17

[[mocks.targets]]
response = { body = "fine" }
"#;

fn app() -> axum::Router {
    let router = parse_mock_file(MOCKS).unwrap().build_router().unwrap();
    attach_all(common::downstream(), router)
}

#[tokio::test]
async fn test_predicate_target() {
    let app = app();
    let (status, content_type, body) =
        common::send(&app, Method::GET, "/users/42", Some("application/json")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json; charset=utf-8"));
    assert_eq!(body, r#"{"id":42}"#);
}

#[tokio::test]
async fn test_second_predicate_target() {
    let app = app();
    let (status, _, body) = common::send(&app, Method::DELETE, "/users/42", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_catch_all_fallback() {
    let app = app();
    let (status, _, body) = common::send(&app, Method::GET, "/users/42", Some("text/html")).await;
    assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
    assert_eq!(body, "only JSON here");
}

#[tokio::test]
async fn test_invalid_response_only_when_selected() {
    let app = app();
    assert_eq!(common::get_body(&app, "/broken").await, (StatusCode::OK, "fine".to_string()));

    let (status, _, _) = common::send(&app, Method::POST, "/broken", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_other_paths_delegate() {
    let app = app();
    assert_eq!(
        common::get_body(&app, "/downstream").await,
        (StatusCode::OK, "downstream".to_string())
    );
}

#[test]
fn test_demo_file_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/mocks.toml");
    let mocks = load_mock_file(&path).unwrap().build().unwrap();
    assert_eq!(mocks.len(), 3);
    assert!(mocks[2].handles("/reports/2024.csv"));
    assert!(mocks[2].handles("/reports/2024"));
    assert!(!mocks[2].handles("/reports/24"));
}
