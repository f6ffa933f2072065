//! # Probe polling policy.
//!
//! [`ProbePolicy`] bounds the probing loop:
//! - [`ProbePolicy::interval`] — fixed delay between attempts (no backoff:
//!   readiness probing wants a steady cadence, not growing gaps);
//! - [`ProbePolicy::retries`] — total attempt budget before the service is
//!   declared unhealthy-terminal;
//! - [`ProbePolicy::timeout`] — optional per-attempt timeout (`None` = the
//!   attempt runs until the probe itself finishes).
//!
//! Defaults come from [`Config`](crate::Config) and can be overridden per
//! service.

use std::time::Duration;

/// Polling parameters for one service's health probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbePolicy {
    /// Fixed interval between attempts.
    pub interval: Duration,
    /// Total attempt budget (clamped to a minimum of 1 by the probing loop).
    pub retries: u32,
    /// Optional per-attempt timeout; a timed-out attempt counts as failed.
    pub timeout: Option<Duration>,
}

impl Default for ProbePolicy {
    /// Returns a policy with `interval = 1s`, `retries = 30`, no timeout.
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            retries: 30,
            timeout: None,
        }
    }
}

impl ProbePolicy {
    /// The retry budget with the minimum of one attempt applied.
    #[inline]
    pub fn budget(&self) -> u32 {
        self.retries.max(1)
    }
}
