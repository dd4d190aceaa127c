//! Current-identity cache
//!
//! Caches the "who am I" payload per [`Role`] for a short TTL and collapses
//! concurrent lookups for the same role into one request. A failed fetch
//! leaves any previous entry untouched and does not extend its lifetime.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use indexdesk_common::time::{Clock, SystemClock};
use indexdesk_domain::{IdentityCacheConfig, IdentityEnvelope, Role};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use super::client::ApiClient;
use super::errors::ApiError;
use crate::errors::RequestFailure;
use crate::http::RequestConfig;

type SharedFetch = Shared<BoxFuture<'static, Result<Value, ApiError>>>;

/// Options for [`IdentityCache::get_admin_me`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityOptions {
    /// Skip the TTL check. A fetch already in flight is still joined.
    pub force: bool,
}

impl IdentityOptions {
    /// Skip the TTL check
    pub const fn forced() -> Self {
        Self { force: true }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Value,
    fetched_at: Instant,
}

#[derive(Default)]
struct IdentityState {
    entries: HashMap<Role, CacheEntry>,
    in_flight: HashMap<Role, SharedFetch>,
}

/// TTL cache with in-flight de-duplication for identity lookups.
///
/// Clones share the same entries.
///
/// # Type Parameters
///
/// * `C` - Clock used to age entries (defaults to `SystemClock`)
#[derive(Clone)]
pub struct IdentityCache<C = SystemClock>
where
    C: Clock + Clone,
{
    client: ApiClient,
    ttl: Duration,
    clock: C,
    state: Arc<Mutex<IdentityState>>,
}

impl IdentityCache<SystemClock> {
    /// Cache aged by the system clock
    pub fn new(client: ApiClient, config: &IdentityCacheConfig) -> Self {
        Self::with_clock(client, config, SystemClock)
    }
}

impl<C> IdentityCache<C>
where
    C: Clock + Clone + 'static,
{
    /// Creates a cache that ages entries with `clock`.
    pub fn with_clock(client: ApiClient, config: &IdentityCacheConfig, clock: C) -> Self {
        Self { client, ttl: config.ttl(), clock, state: Arc::new(Mutex::new(IdentityState::default())) }
    }

    /// How long a fetched identity stays fresh
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Identity payload for `role`
    ///
    /// Served from cache while the entry is younger than the TTL and `force`
    /// is false. Otherwise joins the fetch already in flight for `role`, or
    /// starts one.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure of the fetch; every caller joined to
    /// that fetch receives the same error.
    pub async fn get(&self, role: Role, force: bool) -> Result<Value, ApiError> {
        let fetch = {
            let mut state = self.state.lock();

            if !force {
                if let Some(entry) = state.entries.get(&role) {
                    if self.clock.elapsed_since(entry.fetched_at) < self.ttl {
                        debug!(%role, "identity cache hit");
                        return Ok(entry.payload.clone());
                    }
                }
            }

            match state.in_flight.get(&role) {
                Some(fetch) => {
                    debug!(%role, "joining in-flight identity fetch");
                    fetch.clone()
                }
                None => {
                    let fetch = self.fetch(role);
                    state.in_flight.insert(role, fetch.clone());
                    fetch
                }
            }
        };

        fetch.await
    }

    /// Current admin identity, as the raw payload
    pub async fn get_admin_me(&self, options: IdentityOptions) -> Result<Value, ApiError> {
        self.get(Role::Admin, options.force).await
    }

    /// Current admin identity, decoded
    ///
    /// # Errors
    ///
    /// As [`get_admin_me`](Self::get_admin_me), plus a `DECODE` error when
    /// the payload has no `user` object
    pub async fn admin_profile(&self, options: IdentityOptions) -> Result<IdentityEnvelope, ApiError> {
        let payload = self.get_admin_me(options).await?;
        serde_json::from_value(payload).map_err(|err| {
            ApiError::from(RequestFailure::Decode { status: 200, message: err.to_string() })
        })
    }

    /// Cached payload for `role` regardless of age
    pub fn cached(&self, role: Role) -> Option<Value> {
        self.state.lock().entries.get(&role).map(|entry| entry.payload.clone())
    }

    /// Whether a fetch for `role` is in flight
    pub fn is_fetching(&self, role: Role) -> bool {
        self.state.lock().in_flight.contains_key(&role)
    }

    /// Drop the entry for `role`. A fetch already in flight still stores
    /// its result.
    pub fn invalidate(&self, role: Role) {
        self.state.lock().entries.remove(&role);
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }

    fn fetch(&self, role: Role) -> SharedFetch {
        let client = self.client.clone();
        let clock = self.clock.clone();
        let state = Arc::clone(&self.state);

        async move {
            debug!(%role, "fetching identity");
            let result = client.request_json(RequestConfig::get(role.me_endpoint())).await;

            {
                let mut state = state.lock();
                state.in_flight.remove(&role);
                if let Ok(payload) = &result {
                    state
                        .entries
                        .insert(role, CacheEntry { payload: payload.clone(), fetched_at: clock.now() });
                }
            }

            if let Err(err) = &result {
                warn!(%role, status = ?err.status, error = %err, "identity fetch failed");
            }
            result
        }
        .boxed()
        .shared()
    }
}

#[cfg(test)]
mod tests {
    use indexdesk_common::testing::MockClock;
    use indexdesk_domain::ApiConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const ME: &str = "/api/v1/user/admin/me";

    fn admin_payload(name: &str) -> Value {
        json!({ "user": { "_id": "a1", "firstName": name, "email": "ada@example.com" } })
    }

    fn cache_for(server: &MockServer, clock: MockClock) -> IdentityCache<MockClock> {
        let config = ApiConfig {
            retry_base_delay_ms: 1,
            logging: Some(false),
            ..ApiConfig::with_base_url(server.uri())
        };
        let client = ApiClient::new(&config).expect("api client");
        IdentityCache::with_clock(client, &IdentityCacheConfig::default(), clock)
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_is_served_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ME))
            .respond_with(ResponseTemplate::new(200).set_body_json(admin_payload("Ada")))
            .expect(1)
            .mount(&server)
            .await;

        let clock = MockClock::new();
        let cache = cache_for(&server, clock.clone());

        let first = cache.get_admin_me(IdentityOptions::default()).await.unwrap();
        clock.advance(Duration::from_millis(29_999));
        let second = cache.get_admin_me(IdentityOptions::default()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, admin_payload("Ada"));
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ME))
            .respond_with(ResponseTemplate::new(200).set_body_json(admin_payload("Ada")))
            .expect(2)
            .mount(&server)
            .await;

        let clock = MockClock::new();
        let cache = cache_for(&server, clock.clone());

        cache.get(Role::Admin, false).await.unwrap();
        clock.advance(Duration::from_millis(30_001));
        cache.get(Role::Admin, false).await.unwrap();
    }

    #[tokio::test]
    async fn test_force_bypasses_fresh_entry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ME))
            .respond_with(ResponseTemplate::new(200).set_body_json(admin_payload("Ada")))
            .expect(2)
            .mount(&server)
            .await;

        let cache = cache_for(&server, MockClock::new());

        cache.get_admin_me(IdentityOptions::default()).await.unwrap();
        cache.get_admin_me(IdentityOptions::forced()).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ME))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(admin_payload("Ada"))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let cache = cache_for(&server, MockClock::new());

        let (a, b, c) = tokio::join!(
            cache.get(Role::Admin, false),
            cache.get(Role::Admin, false),
            cache.get(Role::Admin, true),
        );

        assert_eq!(a.unwrap(), admin_payload("Ada"));
        assert_eq!(b.unwrap(), admin_payload("Ada"));
        assert_eq!(c.unwrap(), admin_payload("Ada"));
        assert!(!cache.is_fetching(Role::Admin));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_entry_without_extending_it() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ME))
            .respond_with(ResponseTemplate::new(200).set_body_json(admin_payload("Ada")))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ME))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "message": "expired" })))
            .mount(&server)
            .await;

        let clock = MockClock::new();
        let cache = cache_for(&server, clock.clone());

        cache.get(Role::Admin, false).await.unwrap();
        clock.advance(Duration::from_millis(30_001));

        let error = cache.get(Role::Admin, false).await.unwrap_err();
        assert_eq!(error.status, Some(403));
        assert_eq!(error.details, Some(json!({ "message": "expired" })));
        assert_eq!(cache.cached(Role::Admin), Some(admin_payload("Ada")));
        assert!(!cache.is_fetching(Role::Admin));

        // Still stale, so the next call goes back to the network.
        assert!(cache.get(Role::Admin, false).await.is_err());
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_invalidate_forces_next_lookup_to_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ME))
            .respond_with(ResponseTemplate::new(200).set_body_json(admin_payload("Ada")))
            .expect(2)
            .mount(&server)
            .await;

        let cache = cache_for(&server, MockClock::new());

        cache.get(Role::Admin, false).await.unwrap();
        cache.invalidate(Role::Admin);
        assert_eq!(cache.cached(Role::Admin), None);
        cache.get(Role::Admin, false).await.unwrap();
    }

    #[tokio::test]
    async fn test_admin_profile_decodes_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ME))
            .respond_with(ResponseTemplate::new(200).set_body_json(admin_payload("Ada")))
            .mount(&server)
            .await;

        let cache = cache_for(&server, MockClock::new());
        let profile = cache.admin_profile(IdentityOptions::default()).await.unwrap();

        assert_eq!(profile.user.id, "a1");
        assert_eq!(profile.user.display_name(), "Ada");
    }
}
