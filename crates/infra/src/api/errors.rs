//! Normalized API errors
//!
//! Every failure the pipeline can produce is flattened into one [`ApiError`]
//! shape: a human message, the HTTP status (absent when no response was
//! received), a transport classifier, the response body, and the original
//! failure.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::errors::RequestFailure;

/// Message used when neither the failure nor the body carries one
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Categories of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// 401/403, or a failed token refresh
    Authentication,
    /// 429
    RateLimit,
    /// 5xx
    Server,
    /// Other 4xx, or a body that did not decode
    Client,
    /// No response received
    Network,
    /// The request could not be built
    Config,
}

/// Normalized error returned by every [`ApiClient`](super::ApiClient) call
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    /// `None` means no HTTP response was received
    pub status: Option<u16>,
    pub code: Option<String>,
    pub details: Option<Value>,
    #[source]
    pub original: Arc<RequestFailure>,
}

impl ApiError {
    /// Category used for logging and caller-side decisions
    pub fn category(&self) -> ApiErrorCategory {
        match (self.original.as_ref(), self.status) {
            (RequestFailure::Setup(_), _) => ApiErrorCategory::Config,
            (RequestFailure::Transport { .. }, _) => ApiErrorCategory::Network,
            (RequestFailure::Refresh(_) | RequestFailure::RefreshAbandoned { .. }, _)
            | (_, Some(401 | 403)) => ApiErrorCategory::Authentication,
            (_, Some(429)) => ApiErrorCategory::RateLimit,
            (_, Some(500..=599)) => ApiErrorCategory::Server,
            _ => ApiErrorCategory::Client,
        }
    }

    /// Whether the pipeline would have treated the failure as transient
    pub fn is_retryable(&self) -> bool {
        matches!(self.category(), ApiErrorCategory::Network | ApiErrorCategory::Server)
    }

    /// Whether the backend answered 401
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

/// Conversion into the normalized shape.
///
/// Normalizing an [`ApiError`] re-derives every field from its original
/// failure, so it yields the same fields as normalizing the raw failure.
pub trait Normalize {
    fn normalize(&self) -> ApiError;
}

impl Normalize for Arc<RequestFailure> {
    fn normalize(&self) -> ApiError {
        let details = self.body().filter(|body| !body.is_null()).cloned();
        let message = self
            .own_message()
            .or_else(|| body_message(details.as_ref()))
            .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());

        ApiError {
            message,
            status: self.status(),
            code: self.code().map(str::to_string),
            details,
            original: Arc::clone(self),
        }
    }
}

impl Normalize for RequestFailure {
    fn normalize(&self) -> ApiError {
        Arc::new(self.clone()).normalize()
    }
}

impl Normalize for ApiError {
    fn normalize(&self) -> ApiError {
        self.original.normalize()
    }
}

impl From<RequestFailure> for ApiError {
    fn from(failure: RequestFailure) -> Self {
        Arc::new(failure).normalize()
    }
}

fn body_message(body: Option<&Value>) -> Option<String> {
    body?
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}
