//! The request pipeline
//!
//! One [`HttpClient`] owns the process-wide defaults (base URL, JSON
//! headers, cookie store, timeout), the bearer token, the refresh handler,
//! and the refresh state. Clones share all of it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use indexdesk_domain::constants::DEFAULT_TIMEOUT_MS;
use indexdesk_domain::IndexDeskError;
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client as ReqwestClient;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::refresh::{RefreshCoordinator, RefreshSignal, RefreshTicket, RefreshTokenHandler};
use super::request::RequestConfig;
use super::retry::RetryPolicy;
use crate::errors::RequestFailure;

/// A decoded 2xx response
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Empty bodies decode to `null`, non-JSON bodies to a JSON string
    pub body: Value,
    /// Time from sending the request to reading the full body
    pub elapsed: Duration,
}

/// HTTP client with bearer auth, 401 refresh, and transient-failure retry.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<Pipeline>,
}

struct Pipeline {
    client: ReqwestClient,
    base_url: Option<String>,
    retry: RetryPolicy,
    auth_token: RwLock<Option<String>>,
    refresh_handler: RwLock<Option<Arc<dyn RefreshTokenHandler>>>,
    refresh: RefreshCoordinator,
    logging: AtomicBool,
}

enum RefreshOutcome {
    /// Replay the request with this token
    Replay(String),
    /// Surface this failure
    Fail(RequestFailure),
    /// No token was issued; continue with the retry rules
    NoToken,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client without a base URL; every request must carry an absolute URL.
    pub fn new() -> Result<Self, IndexDeskError> {
        Self::builder().build()
    }

    /// Prefix joined onto relative request URLs
    pub fn base_url(&self) -> Option<&str> {
        self.inner.base_url.as_deref()
    }

    /// Retry schedule for transient failures
    pub fn retry_policy(&self) -> RetryPolicy {
        self.inner.retry
    }

    /// Install the bearer token sent on every request. `None` or an empty
    /// token clears it.
    pub fn set_auth_token(&self, token: Option<String>) {
        *self.inner.auth_token.write() = token.filter(|token| !token.is_empty());
    }

    /// Stop sending a bearer token
    pub fn clear_auth_token(&self) {
        self.set_auth_token(None);
    }

    /// The bearer token currently attached to requests
    pub fn auth_token(&self) -> Option<String> {
        self.inner.auth_token.read().clone()
    }

    /// Register the handler consulted when a request is rejected with 401.
    pub fn set_refresh_token_handler<H>(&self, handler: H)
    where
        H: RefreshTokenHandler + 'static,
    {
        *self.inner.refresh_handler.write() = Some(Arc::new(handler));
    }

    /// Surface every 401 without attempting a refresh
    pub fn clear_refresh_token_handler(&self) {
        *self.inner.refresh_handler.write() = None;
    }

    /// Toggle request, response and failure logging for every clone
    pub fn set_logging(&self, enabled: bool) {
        self.inner.logging.store(enabled, Ordering::Relaxed);
    }

    /// Whether request logging is on
    pub fn logging_enabled(&self) -> bool {
        self.inner.logging.load(Ordering::Relaxed)
    }

    /// Whether a token refresh is currently running
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_refreshing()
    }

    /// Execute `config`, retrying transient failures and refreshing the
    /// token once on 401.
    pub async fn send(&self, mut config: RequestConfig) -> Result<HttpResponse, RequestFailure> {
        loop {
            let failure = match self.dispatch(&config).await {
                Ok(response) => return Ok(response),
                Err(failure) => failure,
            };

            if !failure.is_request_level() {
                return Err(failure);
            }

            if failure.is_unauthorized() && !config.is_retry_after_refresh {
                if let Some(handler) = self.refresh_handler() {
                    match self.refresh(handler, &failure).await {
                        RefreshOutcome::Replay(token) => {
                            config.set_header(AUTHORIZATION.as_str(), format!("Bearer {token}"));
                            config.is_retry_after_refresh = true;
                            continue;
                        }
                        RefreshOutcome::Fail(refresh_failure) => {
                            return Err(self.report(&config, refresh_failure));
                        }
                        RefreshOutcome::NoToken => {}
                    }
                }
            }

            if self.inner.retry.should_retry(&failure, config.retry_count) {
                config.retry_count += 1;
                let delay = self.inner.retry.backoff(config.retry_count);
                if self.logging_enabled() {
                    warn!(
                        method = %config.method(),
                        url = config.url(),
                        retry = config.retry_count,
                        delay_ms = delay.as_millis() as u64,
                        error = %failure,
                        "retrying HTTP request"
                    );
                }
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                continue;
            }

            return Err(self.report(&config, failure));
        }
    }

    fn refresh_handler(&self) -> Option<Arc<dyn RefreshTokenHandler>> {
        self.inner.refresh_handler.read().clone()
    }

    async fn refresh(
        &self,
        handler: Arc<dyn RefreshTokenHandler>,
        failure: &RequestFailure,
    ) -> RefreshOutcome {
        let lease = match self.inner.refresh.enter() {
            RefreshTicket::Leader(lease) => lease,
            RefreshTicket::Queued(waiter) => {
                return match waiter.wait().await {
                    RefreshSignal::Token(token) => RefreshOutcome::Replay(token),
                    RefreshSignal::Abandoned(reason) => {
                        RefreshOutcome::Fail(RequestFailure::RefreshAbandoned {
                            status: 401,
                            body: failure.body().cloned(),
                            reason,
                        })
                    }
                };
            }
        };

        if self.logging_enabled() {
            debug!("access token rejected, refreshing");
        }

        match handler.refresh_token().await {
            Ok(Some(token)) if !token.is_empty() => {
                self.set_auth_token(Some(token.clone()));
                lease.complete(token.clone());
                RefreshOutcome::Replay(token)
            }
            Ok(_) => {
                lease.abandon("refresh handler issued no token");
                RefreshOutcome::NoToken
            }
            Err(err) => {
                if self.logging_enabled() {
                    warn!(error = %err, "token refresh failed");
                }
                lease.abandon(err.message());
                RefreshOutcome::Fail(err.into())
            }
        }
    }

    async fn dispatch(&self, config: &RequestConfig) -> Result<HttpResponse, RequestFailure> {
        let request = self.build_request(config)?;
        let method = request.method().clone();
        let url = request.url().clone();
        let logging = self.logging_enabled();

        if logging {
            debug!(%method, %url, retry = config.retry_count, "sending HTTP request");
        }

        let started = Instant::now();
        let response = self.inner.client.execute(request).await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let elapsed = started.elapsed();

        if logging {
            debug!(
                %method,
                %url,
                status = status.as_u16(),
                elapsed_ms = elapsed.as_millis() as u64,
                "received HTTP response"
            );
        }

        let body = parse_body(&bytes);
        if status.is_success() {
            Ok(HttpResponse { status: status.as_u16(), body, elapsed })
        } else {
            Err(RequestFailure::Status {
                status: status.as_u16(),
                body: Some(body).filter(|body| !body.is_null()),
            })
        }
    }

    fn build_request(&self, config: &RequestConfig) -> Result<reqwest::Request, RequestFailure> {
        let url = self.resolve_url(config.url())?;
        let mut builder = self.inner.client.request(config.method().clone(), url);

        if let Some(timeout) = config.timeout_override() {
            builder = builder.timeout(timeout);
        }

        if config.header_value(AUTHORIZATION.as_str()).is_none() {
            if let Some(token) = self.auth_token() {
                let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|err| RequestFailure::Setup(format!("invalid auth token: {err}")))?;
                value.set_sensitive(true);
                builder = builder.header(AUTHORIZATION, value);
            }
        }

        for (name, value) in config.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = config.body() {
            builder = builder.json(body);
        }

        builder.build().map_err(RequestFailure::from)
    }

    fn resolve_url(&self, raw: &str) -> Result<Url, RequestFailure> {
        if let Ok(url) = Url::parse(raw) {
            return Ok(url);
        }

        let base = self.inner.base_url.as_deref().ok_or_else(|| {
            RequestFailure::Setup(format!("relative URL `{raw}` requires a base URL"))
        })?;

        let joined = format!("{}/{}", base.trim_end_matches('/'), raw.trim_start_matches('/'));
        Url::parse(&joined)
            .map_err(|err| RequestFailure::Setup(format!("invalid URL `{joined}`: {err}")))
    }

    fn report(&self, config: &RequestConfig, failure: RequestFailure) -> RequestFailure {
        if self.logging_enabled() {
            warn!(
                method = %config.method(),
                url = config.url(),
                status = ?failure.status(),
                code = ?failure.code(),
                error = %failure,
                "HTTP request failed"
            );
        }
        failure
    }
}

fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    retry: RetryPolicy,
    logging: bool,
    user_agent: Option<String>,
    default_headers: HeaderMap,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self {
            base_url: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            retry: RetryPolicy::default(),
            logging: cfg!(debug_assertions),
            user_agent: None,
            default_headers,
        }
    }
}

impl HttpClientBuilder {
    /// Prefix for relative request URLs
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Default per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retry schedule for transient failures
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Initial state of the logging switch
    pub fn logging(mut self, enabled: bool) -> Self {
        self.logging = enabled;
        self
    }

    /// `User-Agent` sent with every request
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Extra headers merged over the JSON defaults
    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers.extend(headers);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns `IndexDeskError::Config` for an unparsable base URL or when
    /// the TLS backend cannot be initialized.
    pub fn build(self) -> Result<HttpClient, IndexDeskError> {
        let base_url = match self.base_url {
            Some(base) => {
                Url::parse(&base).map_err(|err| {
                    IndexDeskError::Config(format!("invalid base URL `{base}`: {err}"))
                })?;
                Some(base)
            }
            None => None,
        };

        let mut builder = ReqwestClient::builder()
            .timeout(self.timeout)
            .cookie_store(true)
            .default_headers(self.default_headers);

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder
            .build()
            .map_err(|err| IndexDeskError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(HttpClient {
            inner: Arc::new(Pipeline {
                client,
                base_url,
                retry: self.retry,
                auth_token: RwLock::new(None),
                refresh_handler: RwLock::new(None),
                refresh: RefreshCoordinator::new(),
                logging: AtomicBool::new(self.logging),
            }),
        })
    }
}
