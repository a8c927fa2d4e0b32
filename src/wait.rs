//! Bounded polling.
//!
//! Waiting is the only place a step chain blocks. A wait polls a condition at
//! a fixed interval until it holds or the timeout elapses; it always checks
//! the condition one last time at the deadline, so a wait on a condition that
//! never holds returns after roughly the timeout, never instantly and never
//! later than one poll interval past it.

use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// How long to wait and how often to look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitPolicy {
    /// Total time to wait before giving up.
    pub timeout: Duration,
    /// Delay between two probes.
    pub poll_interval: Duration,
}

impl WaitPolicy {
    /// Timeout used by the argument-less `wait()` operations.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Delay between probes unless configured otherwise.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

    /// Wait up to `timeout`, probing at the default interval.
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }

    /// Change the delay between probes.
    pub const fn with_poll_interval(self, poll_interval: Duration) -> Self {
        Self {
            timeout: self.timeout,
            poll_interval,
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

/// Probe `condition` until it returns `true` or the policy's timeout elapses.
///
/// Returns the last probe's answer. A timeout too long to be represented as
/// an [`Instant`] waits without a deadline.
pub fn poll_until(policy: &WaitPolicy, mut condition: impl FnMut() -> bool) -> bool {
    if condition() {
        return true;
    }
    let deadline = Instant::now().checked_add(policy.timeout);
    loop {
        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return false;
                }
                policy.poll_interval.min(deadline - now)
            }
            None => policy.poll_interval,
        };
        thread::sleep(pause);
        if condition() {
            return true;
        }
    }
}
