//! Bounded polling until a swap settles.
//!
//! [`poll`] is the generic loop; [`TerminalStatuses`] decides which swap statuses
//! end it. The terminal set changed between protocol revisions, so it is always
//! passed in rather than assumed.

use crate::errors::{ErrorInfo, Result, SwapError};
use crate::types::SwapStatus;
use serde_json::json;
use std::collections::HashSet;
use std::future::Future;
use std::time::{Duration, Instant};

/// Default overall budget for settlement polling.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(300_000);

/// Default pause between two status reads.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3_000);

/// Timing of a polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Overall budget; exceeding it fails with [`SwapError::Timeout`]
    pub timeout: Duration,
    /// Pause between iterations
    pub interval: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_POLL_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PollOptions {
    /// Creates options with the given budget and interval.
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

/// Repeats `fetch_step` until `should_continue` returns false.
///
/// Every fetched value is handed to `on_update`, terminal or not, in order. Errors
/// from `fetch_step` end the loop immediately; nothing is retried. The loop sleeps
/// between iterations and fails with [`SwapError::Timeout`] (details carry
/// `elapsedMs` and `timeoutMs`) once the budget is spent.
///
/// # Examples
///
/// ```
/// use x402_swap::poller::{poll, PollOptions};
/// use std::time::Duration;
///
/// # async fn example() -> x402_swap::Result<()> {
/// let mut n = 0;
/// let last = poll(
///     || { n += 1; let v = n; async move { Ok::<_, x402_swap::SwapError>(v) } },
///     |v| *v < 3,
///     &PollOptions::new(Duration::from_secs(1), Duration::from_millis(1)),
///     |_| {},
/// )
/// .await?;
/// assert_eq!(last, 3);
/// # Ok(())
/// # }
/// ```
pub async fn poll<T, F, Fut, C, U>(
    mut fetch_step: F,
    mut should_continue: C,
    options: &PollOptions,
    mut on_update: U,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    C: FnMut(&T) -> bool,
    U: FnMut(&T),
{
    let started = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        let elapsed = started.elapsed();
        if elapsed > options.timeout {
            let elapsed_ms = elapsed.as_millis() as u64;
            let timeout_ms = options.timeout.as_millis() as u64;
            tracing::info!(attempt, elapsed_ms, timeout_ms, "polling budget exhausted");
            return Err(SwapError::Timeout(
                ErrorInfo::new(format!(
                    "Polling timed out after {}ms (budget {}ms)",
                    elapsed_ms, timeout_ms
                ))
                .with_details(json!({ "elapsedMs": elapsed_ms, "timeoutMs": timeout_ms })),
            ));
        }

        attempt += 1;
        let value = fetch_step().await?;
        on_update(&value);

        if !should_continue(&value) {
            tracing::debug!(attempt, "polling finished");
            return Ok(value);
        }

        tokio::time::sleep(options.interval).await;
    }
}

/// Protocol revisions with different terminal status sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolVersion {
    /// Older API: completed, failed, expired, cancelled, fulfilled
    V1,
    /// Current API: completed, failed
    #[default]
    V2,
}

/// Set of statuses after which a swap never changes again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalStatuses {
    statuses: HashSet<SwapStatus>,
}

impl TerminalStatuses {
    /// Terminal set of the given protocol revision.
    pub fn for_version(version: ProtocolVersion) -> Self {
        match version {
            ProtocolVersion::V1 => Self::custom([
                SwapStatus::Completed,
                SwapStatus::Failed,
                SwapStatus::Expired,
                SwapStatus::Cancelled,
                SwapStatus::Fulfilled,
            ]),
            ProtocolVersion::V2 => Self::custom([SwapStatus::Completed, SwapStatus::Failed]),
        }
    }

    /// Any set of statuses.
    pub fn custom(statuses: impl IntoIterator<Item = SwapStatus>) -> Self {
        Self {
            statuses: statuses.into_iter().collect(),
        }
    }

    /// Whether `status` ends polling.
    pub fn contains(&self, status: &SwapStatus) -> bool {
        self.statuses.contains(status)
    }
}

impl Default for TerminalStatuses {
    fn default() -> Self {
        Self::for_version(ProtocolVersion::default())
    }
}

/// Options for [`crate::client::SwapClient::wait_for_settlement`].
#[derive(Debug, Clone, Default)]
pub struct WaitOptions {
    /// Loop timing
    pub poll: PollOptions,
    /// Statuses that end the wait
    pub terminal: TerminalStatuses,
}

impl WaitOptions {
    /// Sets the overall budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.poll.timeout = timeout;
        self
    }

    /// Sets the pause between status reads.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.poll.interval = interval;
        self
    }

    /// Sets the terminal status set.
    pub fn with_terminal(mut self, terminal: TerminalStatuses) -> Self {
        self.terminal = terminal;
        self
    }

    /// Uses the terminal set of `version`.
    pub fn with_protocol(self, version: ProtocolVersion) -> Self {
        self.with_terminal(TerminalStatuses::for_version(version))
    }
}
