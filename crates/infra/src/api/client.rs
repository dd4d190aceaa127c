//! Call surface over the request pipeline
//!
//! Every method resolves with the decoded body or fails with a normalized
//! [`ApiError`]; transport failure shapes never leak to callers.

use indexdesk_domain::{ApiConfig, IndexDeskError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use super::errors::ApiError;
use crate::errors::RequestFailure;
use crate::http::{HttpClient, RefreshTokenHandler, RequestConfig, RetryPolicy};

/// Backend API client.
///
/// Cheap to clone; clones share the auth token, the refresh state and the
/// logging switch.
#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
}

impl ApiClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns [`IndexDeskError::Config`] if the base URL does not parse or
    /// the HTTP client cannot be built
    pub fn new(config: &ApiConfig) -> Result<Self, IndexDeskError> {
        Self::builder().config(config.clone()).build()
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Wrap an already configured pipeline
    pub fn from_http(http: HttpClient) -> Self {
        Self { http }
    }

    /// The underlying pipeline
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Issue `request` and return the decoded body
    ///
    /// # Errors
    ///
    /// Returns the normalized failure once retries and token refresh are
    /// exhausted
    #[instrument(skip(self, request), fields(method = %request.method(), url = request.url()))]
    pub async fn request_json(&self, request: RequestConfig) -> Result<Value, ApiError> {
        Ok(self.http.send(request).await?.body)
    }

    /// Issue `request` and decode the body into `T`
    ///
    /// # Errors
    ///
    /// As [`request_json`](Self::request_json), plus a `DECODE` error when
    /// the body does not match `T`
    #[instrument(skip(self, request), fields(method = %request.method(), url = request.url()))]
    pub async fn request<T: DeserializeOwned>(&self, request: RequestConfig) -> Result<T, ApiError> {
        let response = self.http.send(request).await?;
        let status = response.status;

        serde_json::from_value(response.body).map_err(|err| {
            ApiError::from(RequestFailure::Decode { status, message: err.to_string() })
        })
    }

    /// `GET path`, decoded into `T`
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(RequestConfig::get(path)).await
    }

    /// `POST path` with a JSON body, decoded into `T`
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(RequestConfig::post(path).json(encode_body(body)?)).await
    }

    /// `PUT path` with a JSON body, decoded into `T`
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(RequestConfig::put(path).json(encode_body(body)?)).await
    }

    /// `DELETE path`, decoded into `T`
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(RequestConfig::delete(path)).await
    }

    /// Install the bearer token (e.g. after login). `None` or an empty
    /// string clears it.
    pub fn set_auth_token(&self, token: Option<String>) {
        self.http.set_auth_token(token);
    }

    /// Stop sending a bearer token
    pub fn clear_auth_token(&self) {
        self.http.clear_auth_token();
    }

    /// The bearer token currently attached to requests
    pub fn auth_token(&self) -> Option<String> {
        self.http.auth_token()
    }

    /// Register the handler that obtains a new token after a 401
    pub fn set_refresh_token_handler<H>(&self, handler: H)
    where
        H: RefreshTokenHandler + 'static,
    {
        self.http.set_refresh_token_handler(handler);
    }

    /// Surface every 401 without attempting a refresh
    pub fn clear_refresh_token_handler(&self) {
        self.http.clear_refresh_token_handler();
    }

    /// Toggle request logging for every clone
    pub fn set_logging(&self, enabled: bool) {
        self.http.set_logging(enabled);
    }

    /// Whether request logging is on
    pub fn logging_enabled(&self) -> bool {
        self.http.logging_enabled()
    }
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|err| {
        ApiError::from(RequestFailure::Setup(format!("failed to serialize request body: {err}")))
    })
}

/// Builder for [`ApiClient`]
#[derive(Debug, Default)]
pub struct ApiClientBuilder {
    config: ApiConfig,
    user_agent: Option<String>,
}

impl ApiClientBuilder {
    /// Set the API configuration
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Backend base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Force the logging switch on or off
    pub fn logging(mut self, enabled: bool) -> Self {
        self.config.logging = Some(enabled);
        self
    }

    /// `User-Agent` sent with every request
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns [`IndexDeskError::Config`] if the base URL does not parse
    pub fn build(self) -> Result<ApiClient, IndexDeskError> {
        let config = self.config;
        let mut http = HttpClient::builder()
            .base_url(config.base_url.clone())
            .timeout(config.timeout())
            .retry_policy(RetryPolicy::from_parts(config.retry_base_delay(), config.max_retries))
            .logging(config.logging_enabled());

        if let Some(agent) = self.user_agent {
            http = http.user_agent(agent);
        }

        Ok(ApiClient::from_http(http.build()?))
    }
}
