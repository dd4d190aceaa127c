//! Integration tests for the current-identity cache
//!
//! Uses `MockClock` to move past the TTL without sleeping.

#[path = "support.rs"]
mod support;

use std::time::Duration;

use indexdesk_common::testing::MockClock;
use indexdesk_domain::{IdentityCacheConfig, Role};
use indexdesk_infra::{IdentityCache, IdentityOptions};
use serde_json::json;
use support::client_for;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ME: &str = "/api/v1/user/admin/me";

async fn mount_me(server: &MockServer, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(ME))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "user": { "_id": "a1", "firstName": "Ada" } }))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_one_request_per_ttl_window() {
    let server = MockServer::start().await;
    mount_me(&server, Duration::ZERO).await;

    let clock = MockClock::new();
    let cache =
        IdentityCache::with_clock(client_for(&server), &IdentityCacheConfig::default(), clock.clone());

    let first = cache.get_admin_me(IdentityOptions::default()).await.unwrap();
    clock.advance(Duration::from_millis(15_000));
    let second = cache.get_admin_me(IdentityOptions::default()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);

    clock.advance(Duration::from_millis(15_001));
    cache.get_admin_me(IdentityOptions::default()).await.unwrap();
    assert_eq!(server.received_requests().await.unwrap().len(), 2);

    cache.get_admin_me(IdentityOptions::forced()).await.unwrap();
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_many_concurrent_callers_share_one_request() {
    let server = MockServer::start().await;
    mount_me(&server, Duration::from_millis(150)).await;

    let cache = IdentityCache::with_clock(
        client_for(&server),
        &IdentityCacheConfig::default(),
        MockClock::new(),
    );

    let results = futures::future::join_all(
        (0..10).map(|_| cache.get_admin_me(IdentityOptions::default())),
    )
    .await;

    let payloads: Vec<_> = results.into_iter().map(Result::unwrap).collect();
    assert!(payloads.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_spawned_callers_share_one_request() {
    let server = MockServer::start().await;
    mount_me(&server, Duration::from_millis(150)).await;

    let cache = IdentityCache::new(client_for(&server), &IdentityCacheConfig::default());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get(Role::Admin, false).await })
        })
        .collect();

    for handle in handles {
        handle.await.expect("task").expect("identity");
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_callers_share_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ME))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "message": "Admin access required" }))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cache = IdentityCache::new(client_for(&server), &IdentityCacheConfig::default());

    let (a, b) = tokio::join!(cache.get(Role::Admin, false), cache.get(Role::Admin, false));

    let (a, b) = (a.unwrap_err(), b.unwrap_err());
    assert_eq!(a.message, "Request failed with status code 403");
    assert_eq!(a.details, Some(json!({ "message": "Admin access required" })));
    assert_eq!(a.status, b.status);
    assert_eq!(cache.cached(Role::Admin), None);
}

#[tokio::test]
async fn test_custom_ttl_from_config() {
    let server = MockServer::start().await;
    mount_me(&server, Duration::ZERO).await;

    let clock = MockClock::new();
    let cache = IdentityCache::with_clock(
        client_for(&server),
        &IdentityCacheConfig { ttl_ms: 1_000 },
        clock.clone(),
    );

    cache.get(Role::Admin, false).await.unwrap();
    clock.advance(Duration::from_millis(1_000));
    cache.get(Role::Admin, false).await.unwrap();

    assert_eq!(cache.ttl(), Duration::from_secs(1));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
