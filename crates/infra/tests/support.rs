//! Shared helpers for infra integration tests

use std::time::Duration;

use indexdesk_domain::ApiConfig;
use indexdesk_infra::ApiClient;
use wiremock::MockServer;

/// Short backoff so retry paths finish quickly
pub const FAST_BACKOFF: Duration = Duration::from_millis(5);

/// Client pointed at `server` with fast retries and logging on
pub fn client_for(server: &MockServer) -> ApiClient {
    let config = ApiConfig {
        retry_base_delay_ms: FAST_BACKOFF.as_millis() as u64,
        logging: Some(true),
        ..ApiConfig::with_base_url(server.uri())
    };
    ApiClient::new(&config).expect("api client")
}
