//! Integration tests for transient-failure retry
//!
//! Runs against the production backoff (300 ms, then 600 ms).

use std::time::{Duration, Instant};

use indexdesk_domain::ApiConfig;
use indexdesk_infra::api::ApiErrorCategory;
use indexdesk_infra::{ApiClient, RequestConfig};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn default_client(server: &MockServer) -> ApiClient {
    ApiClient::new(&ApiConfig::with_base_url(server.uri())).expect("api client")
}

#[tokio::test]
async fn test_503_is_attempted_three_times_with_backoff() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/indexation/urls"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({ "message": "Service Unavailable" })),
        )
        .expect(3)
        .mount(&server)
        .await;

    let client = default_client(&server);
    let started = Instant::now();
    let error = client.request_json(RequestConfig::get("/api/v1/indexation/urls")).await.unwrap_err();
    let elapsed = started.elapsed();

    assert_eq!(error.status, Some(503));
    assert_eq!(error.message, "Request failed with status code 503");
    assert_eq!(error.details, Some(json!({ "message": "Service Unavailable" })));
    assert_eq!(error.category(), ApiErrorCategory::Server);
    assert!(elapsed >= Duration::from_millis(900), "retried too early: {elapsed:?}");
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_404_is_attempted_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = default_client(&server);
    let started = Instant::now();
    let error = client.request_json(RequestConfig::get("/api/v1/nope")).await.unwrap_err();

    assert_eq!(error.status, Some(404));
    assert_eq!(error.message, "Request failed with status code 404");
    assert!(!error.is_retryable());
    assert!(started.elapsed() < Duration::from_millis(300));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_connection_refused_is_retried_then_normalized() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ApiConfig {
        retry_base_delay_ms: 5,
        ..ApiConfig::with_base_url(format!("http://{addr}"))
    };
    let client = ApiClient::new(&config).unwrap();

    let error = client.request_json(RequestConfig::get("/api/v1/user/admins")).await.unwrap_err();

    assert_eq!(error.status, None);
    assert_eq!(error.code.as_deref(), Some("CONNECT"));
    assert_eq!(error.details, None);
    assert_eq!(error.category(), ApiErrorCategory::Network);
}

#[tokio::test]
async fn test_recovers_when_server_comes_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "message": "created" })))
        .mount(&server)
        .await;

    let client = default_client(&server);
    let body = client
        .request_json(
            RequestConfig::post("/api/v1/indexation/urls/add-url")
                .json(json!({ "url": "https://example.com" })),
        )
        .await
        .expect("second attempt succeeds");

    assert_eq!(body, json!({ "message": "created" }));
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].body, requests[1].body);
}
