//! Per-request context threaded from the inbound webhook to outbound calls.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use uuid::Uuid;

/// Longest deadline a context accepts, about thirty years.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(86_400 * 365 * 30);

/// The request deadline passed before the work completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Request deadline exceeded")]
pub struct DeadlineExceeded;

/// Identity and deadline of one inbound request.
///
/// Handlers receive the context by value and pass it to every outbound
/// call, so a stalled downstream service cannot hold the inbound
/// connection open past the deadline.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    deadline: Instant,
}

impl RequestContext {
    /// Creates a context that expires `timeout` from now.
    ///
    /// Timeouts past the clock's range are clamped to [`MAX_TIMEOUT`].
    pub fn with_timeout(timeout: Duration) -> Self {
        let now = Instant::now();
        let deadline = now
            .checked_add(timeout.min(MAX_TIMEOUT))
            .unwrap_or(now);
        Self {
            request_id: Uuid::new_v4(),
            deadline,
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Runs `fut` to completion unless the deadline passes first.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, DeadlineExceeded>
    where
        F: Future,
    {
        tokio::time::timeout_at(self.deadline, fut)
            .await
            .map_err(|_| DeadlineExceeded)
    }
}
