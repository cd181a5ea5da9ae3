//! End-to-end resolution through the HTTP layer.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use site_router::config::ListenerConfig;
use site_router::custom_url::WorkflowStage;
use site_router::http::{HttpServer, Resolver};

mod common;
use common::CountingStore;

fn server(store: CountingStore) -> HttpServer {
    let manager = common::manager(&[
        common::site("sulu_io", &["en", "de"], &["sulu.io/{localization}"]),
        common::site("catch_all", &["en"], &["*.example.com"]),
    ]);
    HttpServer::new(Resolver::new(manager, Arc::new(store), "prod"), &ListenerConfig::default())
}

async fn get(server: &HttpServer, host: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .header(header::HOST, host)
        .body(Body::empty())
        .unwrap();
    let response = server.router().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_portal_url_is_resolved() {
    let server = server(CountingStore::new());
    let (status, body) = get(&server, "sulu.io:8080", "/de/about").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["site_key"], "sulu_io");
    assert_eq!(body["locale"], "de");
    assert_eq!(body["portal"]["url"], "sulu.io/de");
    assert!(body["custom_url"].is_null());
}

#[tokio::test]
async fn test_unroutable_host_is_not_found() {
    let server = server(CountingStore::new());
    let (status, body) = get(&server, "unknown.org", "/").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_custom_url_is_attached() {
    let store = CountingStore::new()
        .with_route(common::live_route("sulu.io/summer", "sulu_io", "doc-1"))
        .with_document(common::document("doc-1", "sulu.io/*", &["summer"], WorkflowStage::Published));
    let server = server(store);

    let (status, body) = get(&server, "sulu.io", "/summer.html").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["custom_url"]["route"]["url"], "sulu.io/summer");
    assert_eq!(body["custom_url"]["canonical_url"], "sulu.io/summer");
    assert_eq!(body["custom_url"]["workflow_stage"], "published");
}

#[tokio::test]
async fn test_wildcard_portal_skips_custom_urls() {
    let store = CountingStore::new()
        .with_route(common::live_route("shop.example.com/sale", "catch_all", "doc-1"))
        .with_document(common::document("doc-1", "shop.example.com/*", &["sale"], WorkflowStage::Published));
    let server = server(store);

    let (status, body) = get(&server, "shop.example.com", "/sale").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["site_key"], "catch_all");
    assert_eq!(body["portal"]["match_type"], "wildcard");
    assert!(body["custom_url"].is_null());
}

#[tokio::test]
async fn test_swapped_resolver_serves_new_sites() {
    let server = server(CountingStore::new());
    assert_eq!(get(&server, "blog.io", "/").await.0, StatusCode::NOT_FOUND);

    let manager = common::manager(&[common::site("blog", &["en"], &["blog.io"])]);
    server
        .state()
        .swap(Resolver::new(manager, Arc::new(CountingStore::new()), "prod"));

    let (status, body) = get(&server, "blog.io", "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["site_key"], "blog");
}
