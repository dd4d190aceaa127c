//! Per-call request description

use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

/// One logical request.
///
/// Callers build a fresh value per call; the retry counter and the
/// post-refresh flag are owned by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    method: Method,
    url: String,
    body: Option<Value>,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
    pub(crate) retry_count: u32,
    pub(crate) is_retry_after_refresh: bool,
}

impl RequestConfig {
    /// Request for `url`, relative to the client's base URL unless absolute
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            headers: Vec::new(),
            timeout: None,
            retry_count: 0,
            is_retry_after_refresh: false,
        }
    }

    /// `GET url`
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// `POST url`
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// `PUT url`
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    /// `PATCH url`
    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    /// `DELETE url`
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// JSON request body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add or replace a header (names compare case-insensitively)
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Override the client-wide timeout for this call
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub(crate) fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(existing, _)| existing.eq_ignore_ascii_case(&name)) {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name, value)),
        }
    }

    /// HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// URL as given, before joining onto the base URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// JSON body, if any
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Per-call headers in insertion order
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Value of the header called `name`, ignoring case
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Timeout for this call only, if set
    pub fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }

    /// Transient-failure retries already spent on this request
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Set once the request has been replayed with a refreshed token; a
    /// second 401 is then surfaced instead of refreshing again.
    pub fn is_retry_after_refresh(&self) -> bool {
        self.is_retry_after_refresh
    }
}
