//! Raw failures produced by the request pipeline
//!
//! [`RequestFailure`] is what the transport layer reports before
//! normalization. Callers of the public API only ever see
//! [`ApiError`](crate::api::ApiError), which keeps the failure as its
//! `original`.

pub mod conversions;

use serde_json::Value;
use thiserror::Error;

/// Why no HTTP response was received
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// The per-request deadline elapsed
    Timeout,
    /// DNS or TCP/TLS connection failure
    Connect,
    /// Any other I/O failure while sending or reading the body
    Other,
}

impl TransportKind {
    /// Stable classifier exposed as `ApiError::code`
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Timeout => "TIMEOUT",
            Self::Connect => "CONNECT",
            Self::Other => "NETWORK",
        }
    }
}

/// Failure reported by a refresh token handler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RefreshError {
    message: String,
}

impl RefreshError {
    /// Handler failure with a human-readable reason
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// The reason given by the handler
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Every way a pipeline request can fail
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestFailure {
    /// The request could not be built (bad URL, header, or body). Carries no
    /// request context, so it is never retried.
    #[error("{0}")]
    Setup(String),

    /// No response was received
    #[error("{message}")]
    Transport { kind: TransportKind, message: String },

    /// The server answered with a non-2xx status
    #[error("Request failed with status code {status}")]
    Status { status: u16, body: Option<Value> },

    /// A 2xx body did not match the expected shape
    #[error("Failed to decode response body: {message}")]
    Decode { status: u16, message: String },

    /// The refresh handler failed while this request was driving a refresh
    #[error(transparent)]
    Refresh(#[from] RefreshError),

    /// This request was queued behind a refresh that produced no token
    #[error("Request abandoned after failed token refresh: {reason}")]
    RefreshAbandoned { status: u16, body: Option<Value>, reason: String },
}

impl RequestFailure {
    /// HTTP status, when a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. }
            | Self::Decode { status, .. }
            | Self::RefreshAbandoned { status, .. } => Some(*status),
            Self::Setup(_) | Self::Transport { .. } | Self::Refresh(_) => None,
        }
    }

    /// Decoded response body, when one was received
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Status { body, .. } | Self::RefreshAbandoned { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Transport-level classifier
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Setup(_) => Some("SETUP"),
            Self::Transport { kind, .. } => Some(kind.code()),
            Self::Status { .. } => None,
            Self::Decode { .. } => Some("DECODE"),
            Self::Refresh(_) => Some("REFRESH_FAILED"),
            Self::RefreshAbandoned { .. } => Some("REFRESH_ABANDONED"),
        }
    }

    /// The failure's own message, if it renders to anything
    pub fn own_message(&self) -> Option<String> {
        Some(self.to_string()).filter(|message| !message.is_empty())
    }

    /// Whether this failure reached the transport at all
    pub const fn is_request_level(&self) -> bool {
        !matches!(self, Self::Setup(_))
    }

    /// Whether the backend answered 401
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }
}
