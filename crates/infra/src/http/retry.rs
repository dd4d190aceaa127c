//! Retry decision and backoff
//!
//! Kept free of I/O so the policy can be tested without a server.

use std::time::Duration;

use indexdesk_common::ExponentialBackoff;

use crate::errors::RequestFailure;

/// Transient-failure retry policy.
///
/// A failure is transient when no response arrived (including timeouts) or
/// the server answered 5xx.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    backoff: ExponentialBackoff,
}

impl RetryPolicy {
    /// Policy over an existing backoff schedule
    pub const fn new(backoff: ExponentialBackoff) -> Self {
        Self { backoff }
    }

    /// Policy from a first delay and a retry cap
    pub fn from_parts(base_delay: Duration, max_retries: u32) -> Self {
        Self::new(ExponentialBackoff::new(base_delay, max_retries))
    }

    /// Retries allowed after the first attempt
    pub const fn max_retries(&self) -> u32 {
        self.backoff.max_retries()
    }

    /// Whether the failure is worth another attempt after `retries_done`
    /// retries
    pub fn should_retry(&self, failure: &RequestFailure, retries_done: u32) -> bool {
        is_transient(failure) && self.backoff.allows(retries_done)
    }

    /// Wait before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        self.backoff.delay(retry)
    }
}

/// Network failure, timeout, or 5xx
pub fn is_transient(failure: &RequestFailure) -> bool {
    match failure {
        RequestFailure::Transport { .. } => true,
        RequestFailure::Status { status, .. } => (500..=599).contains(status),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{RefreshError, TransportKind};

    fn status(code: u16) -> RequestFailure {
        RequestFailure::Status { status: code, body: None }
    }

    #[test]
    fn test_transient_classification() {
        assert!(is_transient(&status(500)));
        assert!(is_transient(&status(503)));
        assert!(is_transient(&status(599)));
        assert!(is_transient(&RequestFailure::Transport {
            kind: TransportKind::Timeout,
            message: "timed out".into(),
        }));

        assert!(!is_transient(&status(400)));
        assert!(!is_transient(&status(401)));
        assert!(!is_transient(&status(404)));
        assert!(!is_transient(&status(600)));
        assert!(!is_transient(&RequestFailure::Setup("bad url".into())));
        assert!(!is_transient(&RequestFailure::from(RefreshError::new("x"))));
    }

    #[test]
    fn test_default_policy_allows_two_retries() {
        let policy = RetryPolicy::default();
        let failure = status(503);

        assert!(policy.should_retry(&failure, 0));
        assert!(policy.should_retry(&failure, 1));
        assert!(!policy.should_retry(&failure, 2));
    }

    #[test]
    fn test_default_backoff_schedule() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.backoff(1), Duration::from_millis(300));
        assert_eq!(policy.backoff(2), Duration::from_millis(600));
    }

    #[test]
    fn test_client_errors_never_retry() {
        let policy = RetryPolicy::from_parts(Duration::ZERO, 10);
        assert!(!policy.should_retry(&status(404), 0));
    }
}
