//! End-to-end tests for the REST surface against mocked upstream services.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use httpmock::prelude::*;
use med_relay::app::build_pipeline;
use med_relay::config::RecognitionMode;
use med_relay::server::create_router;
use med_relay::RelayConfig;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "med-relay-test-boundary";

const TYLENOL_XML: &str = "<response><body><items><item>\
    <NB_DOC_ID>A</NB_DOC_ID><INSERT_FILE>B</INSERT_FILE>\
    <ITEM_NAME>Tylenol</ITEM_NAME><ENTP_NAME>Acme</ENTP_NAME>\
    </item></items></body></response>";

fn test_config(server: &MockServer, staging: &TempDir) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.recognition.mode = RecognitionMode::Http;
    config.recognition.endpoint = server.url("/identify-medicine");
    config.recognition.timeout_seconds = 5;
    config.catalog.endpoint = server.url("/catalog");
    config.catalog.api_key = "test-key".to_string();
    config.catalog.timeout_seconds = 5;
    config.staging.directory = staging.path().join("temp").to_string_lossy().into_owned();
    config
}

fn router_for(config: &RelayConfig) -> Router {
    let pipeline = build_pipeline(config).unwrap();
    create_router(Arc::new(pipeline), config.server.max_upload_bytes)
}

fn multipart_body(field: &str, file_name: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(field: &str, file_name: &str, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload-medicine-photo/")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field, file_name, data)))
        .unwrap()
}

fn lookup_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/get_item_info")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let staging = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    let app = router_for(&test_config(&server, &staging));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_upload_identifies_and_looks_up() {
    let staging = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    let recognition = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/identify-medicine")
                .body_contains("fake-jpeg-bytes");
            then.status(200)
                .json_body(json!({"medicine_name": "Tylenol"}));
        })
        .await;
    let catalog = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/catalog")
                .query_param("serviceKey", "test-key")
                .query_param("itemName", "Tylenol")
                .query_param("type", "xml");
            then.status(200).body(TYLENOL_XML);
        })
        .await;

    let app = router_for(&test_config(&server, &staging));
    let response = app
        .oneshot(upload_request("file", "pill.jpg", b"fake-jpeg-bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    recognition.assert_async().await;
    catalog.assert_async().await;

    let json = body_json(response).await;
    assert_eq!(
        json,
        json!({
            "pdf_viewer_url": "A",
            "pdf_download_url": "B",
            "item_name": "Tylenol",
            "company_name": "Acme",
        })
    );

    let staged: Vec<_> = std::fs::read_dir(staging.path().join("temp"))
        .unwrap()
        .collect();
    assert_eq!(staged.len(), 1);
}

#[tokio::test]
async fn test_upload_removes_staged_file_when_configured() {
    let staging = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/identify-medicine");
            then.status(200).json_body(json!({"medicine_name": "Tylenol"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/catalog");
            then.status(200).body(TYLENOL_XML);
        })
        .await;

    let mut config = test_config(&server, &staging);
    config.staging.keep_files = false;
    let app = router_for(&config);

    let response = app
        .oneshot(upload_request("file", "pill.jpg", b"fake-jpeg-bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let remaining = std::fs::read_dir(staging.path().join("temp")).unwrap().count();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn test_upload_recognition_failure_is_typed() {
    let staging = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/identify-medicine");
            then.status(200).json_body(json!({"label": "unknown"}));
        })
        .await;
    let catalog = server
        .mock_async(|when, then| {
            when.method(GET).path("/catalog");
            then.status(200).body(TYLENOL_XML);
        })
        .await;

    let app = router_for(&test_config(&server, &staging));
    let response = app
        .oneshot(upload_request("file", "pill.jpg", b"fake-jpeg-bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    catalog.assert_hits_async(0).await;

    let json = body_json(response).await;
    assert_eq!(json["error"], "Bad upstream format");
    assert!(json["details"]
        .as_str()
        .unwrap()
        .contains("recognition service"));
}

#[tokio::test]
async fn test_upload_catalog_not_found() {
    let staging = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/identify-medicine");
            then.status(200).json_body(json!({"medicine_name": "Nothing"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/catalog");
            then.status(200)
                .body("<response><body><items></items></body></response>");
        })
        .await;

    let app = router_for(&test_config(&server, &staging));
    let response = app
        .oneshot(upload_request("file", "pill.jpg", b"fake-jpeg-bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["details"], "No items found");
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let staging = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    let app = router_for(&test_config(&server, &staging));

    let response = app
        .oneshot(upload_request("photo", "pill.jpg", b"fake-jpeg-bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid request");
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected() {
    let staging = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    let recognition = server
        .mock_async(|when, then| {
            when.method(POST).path("/identify-medicine");
            then.status(200).json_body(json!({"medicine_name": "Tylenol"}));
        })
        .await;

    let mut config = test_config(&server, &staging);
    config.server.max_upload_bytes = 64;
    let app = router_for(&config);

    let response = app
        .oneshot(upload_request("file", "pill.jpg", &vec![b'x'; 4096]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    recognition.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_get_item_info_success() {
    let staging = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    let catalog = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/catalog")
                .query_param("serviceKey", "caller-key")
                .query_param("itemName", "Tylenol")
                .query_param("pageNo", "2")
                .query_param("numOfRows", "5");
            then.status(200)
                .body("<response><items><item><INSERT_FILE>B</INSERT_FILE></item></items></response>");
        })
        .await;

    let app = router_for(&test_config(&server, &staging));
    let response = app
        .oneshot(lookup_request(json!({
            "api_key": "caller-key",
            "item_name": "Tylenol",
            "page_number": 2,
            "num_of_rows": 5,
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    catalog.assert_async().await;

    let json = body_json(response).await;
    assert!(json["pdf_viewer_url"].is_null());
    assert_eq!(json["pdf_download_url"], "B");
    assert!(json["item_name"].is_null());
}

#[tokio::test]
async fn test_get_item_info_mirrors_upstream_status() {
    let staging = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/catalog");
            then.status(503).body("SERVICE_TEMPORARILY_UNAVAILABLE");
        })
        .await;

    let app = router_for(&test_config(&server, &staging));
    let response = app
        .oneshot(lookup_request(json!({"api_key": "k", "item_name": "Tylenol"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(
        json["details"],
        "API request failed: SERVICE_TEMPORARILY_UNAVAILABLE"
    );
}

#[tokio::test]
async fn test_get_item_info_without_references() {
    let staging = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/catalog");
            then.status(200)
                .body("<response><items><item><ITEM_NAME>Tylenol</ITEM_NAME></item></items></response>");
        })
        .await;

    let app = router_for(&test_config(&server, &staging));
    let response = app
        .oneshot(lookup_request(json!({"api_key": "k", "item_name": "Tylenol"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["details"], "PDF URLs not found");
}

#[tokio::test]
async fn test_get_item_info_rejects_zero_rows() {
    let staging = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    let catalog = server
        .mock_async(|when, then| {
            when.method(GET).path("/catalog");
            then.status(200).body(TYLENOL_XML);
        })
        .await;

    let app = router_for(&test_config(&server, &staging));
    let response = app
        .oneshot(lookup_request(json!({
            "api_key": "k",
            "item_name": "Tylenol",
            "num_of_rows": 0,
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    catalog.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_get_item_info_incomplete_body_uses_error_shape() {
    let staging = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    let catalog = server
        .mock_async(|when, then| {
            when.method(GET).path("/catalog");
            then.status(200).body(TYLENOL_XML);
        })
        .await;

    let app = router_for(&test_config(&server, &staging));
    let response = app
        .oneshot(lookup_request(json!({"api_key": "k"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid request");
    assert_eq!(json["status"], 400);
    assert!(json["details"].as_str().unwrap().contains("item_name"));
    catalog.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_get_item_info_invalid_json_uses_error_shape() {
    let staging = TempDir::new().unwrap();
    let server = MockServer::start_async().await;

    let app = router_for(&test_config(&server, &staging));
    let request = Request::builder()
        .method("POST")
        .uri("/get_item_info")
        .header("content-type", "application/json")
        .body(Body::from("{\"api_key\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid request");
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_upload_with_long_file_name() {
    let staging = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/identify-medicine");
            then.status(200)
                .json_body(json!({"medicine_name": "Tylenol"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/catalog");
            then.status(200).body(TYLENOL_XML);
        })
        .await;

    let app = router_for(&test_config(&server, &staging));
    let long_name = format!("{}.jpg", "약".repeat(80));
    let response = app
        .oneshot(upload_request("file", &long_name, b"fake-jpeg-bytes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["pdf_viewer_url"], "A");
}
