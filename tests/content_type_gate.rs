mod support;

use axum::http::{Method, StatusCode};
use serde_json::json;

use support::TestApp;

const REJECTED: &str = "Invalid Content-Type. Only application/json is accepted.";

#[tokio::test]
async fn non_json_bodies_never_reach_handlers() {
    let app = TestApp::new();
    let post = app.posts.seed("Untouched", "body").await;
    let body = json!({ "title": "New", "content": "body" }).to_string();
    let item = format!("/posts/{}", post.id);

    let cases = [
        (Method::POST, "/posts", Some("text/plain")),
        (Method::POST, "/posts", Some("application/x-www-form-urlencoded")),
        (Method::POST, "/posts", None),
        (Method::PUT, item.as_str(), Some("text/html")),
        (Method::PATCH, item.as_str(), Some("multipart/form-data; boundary=x")),
    ];

    for (method, uri, content_type) in cases {
        let (status, response) = app
            .send(method.clone(), uri, content_type, Some(body.clone()))
            .await;
        assert_eq!(
            status,
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "{method} {uri} with {content_type:?}"
        );
        assert_eq!(response, json!({ "error": REJECTED }));
    }

    assert_eq!(app.posts.len().await, 1);
    let (_, shown) = app.get(&item).await;
    assert_eq!(shown["title"], "Untouched");
}

#[tokio::test]
async fn json_media_types_pass_the_gate() {
    let app = TestApp::new();

    for content_type in [
        "application/json",
        "application/json; charset=utf-8",
        "application/vnd.api+json",
    ] {
        let (status, _) = app
            .send(
                Method::POST,
                "/posts",
                Some(content_type),
                Some(json!({ "title": "T", "content": "C" }).to_string()),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{content_type}");
    }

    assert_eq!(app.posts.len().await, 3);
}

#[tokio::test]
async fn bodiless_routes_are_not_gated() {
    let app = TestApp::new();
    let post = app.posts.seed("Readable", "body").await;

    let (status, _) = app
        .send(Method::GET, "/posts", Some("text/plain"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/search?query=Read").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.delete(&format!("/posts/{}", post.id)).await;
    assert_eq!(status, StatusCode::OK);
}
