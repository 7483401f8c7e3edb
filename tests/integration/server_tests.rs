//! HTTP endpoint tests against mock mirrors

use crate::common::{html, mount_registry, page_html, registry_url, results_html, test_config};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use searx_harvest::server::router;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer};

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_search_returns_enriched_results() {
    let server = MockServer::start().await;
    mount_registry(&server, &[server.uri()]).await;

    let links: Vec<_> = (0..4)
        .map(|i| ("google", format!("{}/doc{i}", server.uri())))
        .collect();
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "climate report"))
        .respond_with(html(results_html(&links)))
        .mount(&server)
        .await;
    for i in 0..4 {
        Mock::given(method("GET"))
            .and(path(format!("/doc{i}")))
            .respond_with(html(page_html(&format!("document {i}"))))
            .mount(&server)
            .await;
    }

    let app = router(Arc::new(test_config(&registry_url(&server))));
    let (status, body) = get(app, "/search?query=climate%20report&max_results=2&max_content=100").await;

    assert_eq!(status, StatusCode::OK);
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["source"], "google");
    assert_eq!(results[0]["link"], format!("{}/doc0", server.uri()));
    assert_eq!(results[1]["context"], "Menu document 1");
}

#[tokio::test]
async fn test_search_without_results_is_not_found() {
    let server = MockServer::start().await;
    mount_registry(&server, &[server.uri()]).await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(results_html(&[])))
        .mount(&server)
        .await;

    let app = router(Arc::new(test_config(&registry_url(&server))));
    let (status, body) = get(app, "/search?query=nothing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "No results found");
}

#[tokio::test]
async fn test_bounds_are_checked_before_searching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html(String::new()))
        .expect(0)
        .mount(&server)
        .await;

    let app = router(Arc::new(test_config(&registry_url(&server))));
    let (status, body) = get(app.clone(), "/search?query=weather&max_results=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "max_results must be between 1 and 5");

    let (status, body) = get(app, "/search?query=weather&max_content=5001").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "max_content must be between 100 and 5000");
}
