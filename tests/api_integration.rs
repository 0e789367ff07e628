//! Integration tests for the HTTP API.
//!
//! Each test builds the real pipeline against a mock Graph server and
//! drives the Axum router in-process with `tower::ServiceExt::oneshot`.

use std::collections::HashMap;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use mockito::{Matcher, ServerGuard};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use lifelog_router::api::api_routes;
use lifelog_router::config::RouterConfig;
use lifelog_router::service::build_pipeline;

const NOTEBOOKS: &str = r#"{
    "value": [
        {"id": "0-life", "displayName": "Life Log", "sections": [
            {"id": "g-journal", "displayName": "Journal – Inbox"},
            {"id": "g-travel", "displayName": "Travel"}
        ]}
    ]
}"#;

fn config(graph_url: &str) -> RouterConfig {
    RouterConfig {
        graph_base_url: graph_url.to_string(),
        graph_token: Some(SecretString::from("test-token")),
        static_sections: HashMap::from([
            ("Food - Alcohol".to_string(), "s-alcohol".to_string()),
            ("Fitness – Steps".to_string(), "s-steps".to_string()),
        ]),
        cache_ttl: Duration::from_secs(60),
        ..RouterConfig::default()
    }
}

async fn app(server: &ServerGuard) -> Router {
    let pipeline = build_pipeline(&config(&server.url())).await.unwrap();
    api_routes(pipeline)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn mock_page(server: &mut ServerGuard, section_id: &str, status: usize) -> mockito::Mock {
    server
        .mock("POST", format!("/me/onenote/sections/{section_id}/pages").as_str())
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "page-1", "links": {"oneNoteWebUrl": {"href": "https://example/p1"}}}"#)
        .create_async()
        .await
}

#[tokio::test]
async fn health_endpoint() {
    let server = mockito::Server::new_async().await;
    let app = app(&server).await;

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "lifelog-router");
}

#[tokio::test]
async fn log_creates_page_in_static_section() {
    let mut server = mockito::Server::new_async().await;
    let page = mock_page(&mut server, "s-alcohol", 201).await;
    let app = app(&server).await;

    let (status, body) = send(
        &app,
        post_json("/api/log", serde_json::json!({"text": "whisky tasting with friends"})),
    )
    .await;

    page.assert_async().await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "created");
    assert_eq!(body["section_id"], "s-alcohol");
    assert_eq!(body["routed"]["category"], "alcohol");
    assert_eq!(body["routed"]["title_prefix"], "ALCOHOL");
    assert_eq!(body["page"]["web_url"], "https://example/p1");
}

#[tokio::test]
async fn log_heals_missing_section_from_graph() {
    let mut server = mockito::Server::new_async().await;
    let listing = server
        .mock("GET", "/me/onenote/notebooks")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(NOTEBOOKS)
        .expect(1)
        .create_async()
        .await;
    let journal = mock_page(&mut server, "g-journal", 201).await;
    let travel = mock_page(&mut server, "g-travel", 201).await;
    let app = app(&server).await;

    let (status, body) = send(
        &app,
        post_json("/api/log", serde_json::json!({"text": "just thinking about nothing"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["routed"]["category"], "journal");
    assert_eq!(body["section_id"], "g-journal");

    // A different section, answered by the cached notebook map.
    let (status, body) = send(
        &app,
        post_json("/api/log", serde_json::json!({"text": "flight to Osaka", "source": "voice"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["section_id"], "g-travel");

    listing.assert_async().await;
    journal.assert_async().await;
    travel.assert_async().await;
}

#[tokio::test]
async fn log_returns_404_for_unknown_section() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/me/onenote/notebooks")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(NOTEBOOKS)
        .create_async()
        .await;
    let app = app(&server).await;

    let (status, body) = send(
        &app,
        post_json("/api/log", serde_json::json!({"text": "paid rent"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["section"], "Finance");
}

#[tokio::test]
async fn log_returns_404_when_listing_fails() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/me/onenote/notebooks")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;
    let app = app(&server).await;

    let (status, _) = send(
        &app,
        post_json("/api/log", serde_json::json!({"text": "new sneakers"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn failed_page_creation_is_queued() {
    let mut server = mockito::Server::new_async().await;
    let _page = mock_page(&mut server, "s-steps", 503).await;
    let app = app(&server).await;

    let (status, body) = send(
        &app,
        post_json("/api/log", serde_json::json!({"text": "walked 12,345 steps today"})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "queued");
    assert_eq!(body["routed"]["payload"], "12345");

    let (status, queue) = send(&app, get("/api/queue")).await;
    assert_eq!(status, StatusCode::OK);
    let entries = queue.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["section_id"], "s-steps");
    assert_eq!(entries[0]["status"], "pending");
}

#[tokio::test]
async fn classify_is_a_dry_run() {
    let server = mockito::Server::new_async().await;
    let app = app(&server).await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/classify",
            serde_json::json!({"text": "ate lunch then walked 5000 steps"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rule"], "steps");
    assert_eq!(body["routed"]["category"], "steps");
    assert_eq!(body["routed"]["payload"], "5000");
    assert!(
        body["routed"]["html"]
            .as_str()
            .unwrap()
            .contains("<b>5000</b>")
    );
}

#[tokio::test]
async fn classify_escapes_markup() {
    let server = mockito::Server::new_async().await;
    let app = app(&server).await;

    let (_, body) = send(
        &app,
        post_json("/api/classify", serde_json::json!({"text": "dinner <b>&</b> dessert"})),
    )
    .await;
    let title = body["routed"]["title"].as_str().unwrap();
    let html = body["routed"]["html"].as_str().unwrap();
    assert!(title.contains("dinner &lt;b&gt;&amp;&lt;/b&gt; dessert"));
    assert!(html.contains("dinner &lt;b&gt;&amp;&lt;/b&gt; dessert"));
}

#[tokio::test]
async fn resolve_endpoint_reports_tier() {
    let server = mockito::Server::new_async().await;
    let app = app(&server).await;

    // Stored with an en dash, queried with a hyphen.
    let (status, body) = send(
        &app,
        get("/api/sections/resolve?name=Fitness%20-%20Steps"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "s-steps");
    assert_eq!(body["via"], "static");
}

#[tokio::test]
async fn resolve_endpoint_404_on_heal_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/me/onenote/notebooks")
        .match_query(Matcher::Any)
        .with_status(401)
        .create_async()
        .await;
    let app = app(&server).await;

    let (status, body) = send(&app, get("/api/sections/resolve?name=Wardrobe")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["via"], "heal-failed");
}
