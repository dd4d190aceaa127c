//! Single-flight access-token refresh
//!
//! The first request to hit a 401 becomes the leader and runs the refresh
//! handler; requests that hit a 401 while a refresh is running are queued
//! and resumed with the leader's outcome. Entering the refreshing state is a
//! check-and-set under one lock, so two refreshes can never overlap.

use std::future::Future;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::errors::RefreshError;

/// Produces a new access token when the backend rejects the current one.
///
/// `Ok(None)` means no token could be issued; the 401 is then surfaced to
/// the caller as an ordinary client error.
#[async_trait]
pub trait RefreshTokenHandler: Send + Sync {
    async fn refresh_token(&self) -> Result<Option<String>, RefreshError>;
}

#[async_trait]
impl<F, Fut> RefreshTokenHandler for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<String>, RefreshError>> + Send + 'static,
{
    async fn refresh_token(&self) -> Result<Option<String>, RefreshError> {
        (self)().await
    }
}

/// What queued requests receive when the refresh settles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshSignal {
    /// Replay with this token
    Token(String),
    /// The refresh produced no token; fail with this reason
    Abandoned(String),
}

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    waiters: Vec<oneshot::Sender<RefreshSignal>>,
}

/// Refresh state machine: idle or refreshing, plus the queue of waiters.
#[derive(Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

/// Outcome of [`RefreshCoordinator::enter`]
pub enum RefreshTicket<'a> {
    /// No refresh was running; the caller must run it and settle the lease
    Leader(RefreshLease<'a>),
    /// A refresh is running; wait for its outcome
    Queued(RefreshWaiter),
}

impl RefreshCoordinator {
    /// Idle coordinator with an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the current refresh or start a new one.
    pub fn enter(&self) -> RefreshTicket<'_> {
        let mut state = self.state.lock();
        if state.refreshing {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            RefreshTicket::Queued(RefreshWaiter { rx })
        } else {
            state.refreshing = true;
            RefreshTicket::Leader(RefreshLease { coordinator: self, settled: false })
        }
    }

    /// Whether a leader currently holds the lease
    pub fn is_refreshing(&self) -> bool {
        self.state.lock().refreshing
    }

    /// Requests currently queued behind the running refresh
    pub fn pending(&self) -> usize {
        self.state.lock().waiters.len()
    }

    fn settle(&self, signal: RefreshSignal) {
        let waiters = {
            let mut state = self.state.lock();
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };

        for waiter in waiters {
            // A waiter whose caller went away has nothing to resume.
            let _ = waiter.send(signal.clone());
        }
    }
}

/// Proof of leadership over the running refresh.
///
/// Dropping an unsettled lease (e.g. the leading request was cancelled)
/// abandons the queue and returns the coordinator to idle.
pub struct RefreshLease<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshLease<'_> {
    /// Release queued requests with the new token
    pub fn complete(mut self, token: impl Into<String>) {
        self.settled = true;
        self.coordinator.settle(RefreshSignal::Token(token.into()));
    }

    /// Fail queued requests with `reason`
    pub fn abandon(mut self, reason: impl Into<String>) {
        self.settled = true;
        self.coordinator.settle(RefreshSignal::Abandoned(reason.into()));
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.coordinator.settle(RefreshSignal::Abandoned("token refresh was cancelled".into()));
        }
    }
}

/// A request parked behind the running refresh
pub struct RefreshWaiter {
    rx: oneshot::Receiver<RefreshSignal>,
}

impl RefreshWaiter {
    /// Wait for the leader to settle
    pub async fn wait(self) -> RefreshSignal {
        self.rx.await.unwrap_or_else(|_| {
            RefreshSignal::Abandoned("token refresh ended without a result".into())
        })
    }
}
