//! Execution Timeout Management
//!
//! Wall-clock budgets for subprocess execution.

use std::future::Future;
use std::time::Duration;
use tokio::time;

/// Budget for a proxied client invocation
pub const PROXY_TIMEOUT_SECS: u64 = 30;

/// Budget for each manual/help lookup
pub const MANUAL_TIMEOUT_SECS: u64 = 5;

/// Returned by [`ExecutionTimeout::run`] when the budget elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("timed out after {}", describe(.0))]
pub struct TimedOut(pub Duration);

/// Execution timeout configuration
///
/// Timeouts are enforced so that a hung external process can never block a
/// tool call indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionTimeout {
    duration: Duration,
}

impl Default for ExecutionTimeout {
    fn default() -> Self {
        Self::proxy()
    }
}

impl ExecutionTimeout {
    /// Create a new execution timeout
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use netops_mcp::tools::ExecutionTimeout;
    ///
    /// let timeout = ExecutionTimeout::new(Duration::from_secs(30));
    /// assert_eq!(timeout.describe(), "30 seconds");
    /// ```
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// Create a timeout from seconds
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Budget for a proxied invocation (30 seconds)
    pub fn proxy() -> Self {
        Self::from_secs(PROXY_TIMEOUT_SECS)
    }

    /// Budget for a manual/help lookup (5 seconds)
    pub fn manual() -> Self {
        Self::from_secs(MANUAL_TIMEOUT_SECS)
    }

    /// Get the timeout duration
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Human-readable duration, e.g. `30 seconds`
    pub fn describe(&self) -> String {
        describe(&self.duration)
    }

    /// Drive `future` to completion unless the budget elapses first
    ///
    /// The future is dropped on timeout. Callers that own resources borrowed
    /// by the future (such as a child process) regain access to them once
    /// this returns and are responsible for cleaning them up.
    pub async fn run<F>(&self, future: F) -> Result<F::Output, TimedOut>
    where
        F: Future,
    {
        time::timeout(self.duration, future)
            .await
            .map_err(|_| TimedOut(self.duration))
    }
}

fn describe(duration: &Duration) -> String {
    if duration.subsec_nanos() == 0 {
        match duration.as_secs() {
            1 => "1 second".to_string(),
            secs => format!("{} seconds", secs),
        }
    } else {
        format!("{} milliseconds", duration.as_millis())
    }
}
