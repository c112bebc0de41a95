//! Deadline-bounded poll loop.
//!
//! Both watchers (deployment completion, task death) share the same
//! shape: an immediate first check, then a fixed interval until either
//! the predicate resolves or the deadline fires. Timing runs on the
//! tokio clock, so tests drive it deterministically with a paused
//! runtime.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Interval between checks once the optimistic first check has failed.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Result of one poll run.
#[derive(Debug)]
pub enum PollOutcome<E> {
    /// The predicate returned true.
    Resolved,
    /// The deadline fired before the predicate resolved.
    TimedOut,
    /// A check failed. Not retried: a polling error can mean a genuinely
    /// broken connection to the scheduler, and silent retries would hide
    /// that.
    Failed(E),
}

/// Run `check` until it resolves, fails, or `timeout` elapses.
///
/// The first check happens immediately — many deployments complete
/// before the first poll interval. The final sleep is clamped to the
/// deadline so a last check runs at the deadline itself.
pub async fn poll_until<F, Fut, E>(interval: Duration, timeout: Duration, mut check: F) -> PollOutcome<E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        match check().await {
            Ok(true) => return PollOutcome::Resolved,
            Ok(false) => {}
            Err(e) => return PollOutcome::Failed(e),
        }

        let now = Instant::now();
        if now >= deadline {
            return PollOutcome::TimedOut;
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}
