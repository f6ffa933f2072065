//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for the supervisor runtime.
//!
//! Config is used in two ways:
//! 1. **Supervisor creation**: `Supervisor::new(config, subscribers)`
//! 2. **Probe defaults**: `Config::probe_policy()` feeds services that don't
//!    override their own [`ProbePolicy`](crate::probes::ProbePolicy).
//!
//! ## Sentinel values
//! - `probe_timeout = 0s` → no per-attempt timeout (treated as `None`)
//! - `bus_capacity` is clamped to a minimum of 1 by the bus

use std::time::Duration;

use crate::probes::ProbePolicy;

/// Global configuration for the supervisor runtime.
///
/// ## Field semantics
/// - `grace`: maximum wait for actors to stop after cancellation
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `probe_interval`: default polling interval between probe attempts
/// - `probe_retries`: default retry budget (minimum 1 attempt is always made)
/// - `probe_timeout`: default per-attempt timeout (`0s` = no timeout)
/// - `monitor`: keep probing after a service turns healthy (visibility only;
///   gating decisions are never downgraded)
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time to wait for actors to finish after a shutdown cancel.
    ///
    /// Started child processes are not affected; the grace window only bounds
    /// the harness's own probe loops and gate waits.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Default interval between health-probe attempts.
    pub probe_interval: Duration,

    /// Default number of probe attempts before a service is declared
    /// unhealthy-terminal.
    pub probe_retries: u32,

    /// Default per-attempt probe timeout.
    ///
    /// `Duration::ZERO` = no timeout (the attempt runs until the probe exits).
    pub probe_timeout: Duration,

    /// Keep probing services after they first become healthy.
    ///
    /// Post-healthy probe failures publish events for operational visibility
    /// but never revoke a gating decision.
    pub monitor: bool,
}

impl Config {
    /// Returns the default per-attempt probe timeout as an `Option`.
    ///
    /// - `None` → no timeout
    /// - `Some(d)` → timeout applied per attempt
    #[inline]
    pub fn default_probe_timeout(&self) -> Option<Duration> {
        if self.probe_timeout == Duration::ZERO {
            None
        } else {
            Some(self.probe_timeout)
        }
    }

    /// Returns the probe policy services inherit when they don't override one.
    #[inline]
    pub fn probe_policy(&self) -> ProbePolicy {
        ProbePolicy {
            interval: self.probe_interval,
            retries: self.probe_retries,
            timeout: self.default_probe_timeout(),
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `grace = 30s`
    /// - `bus_capacity = 1024`
    /// - `probe_interval = 1s`
    /// - `probe_retries = 30`
    /// - `probe_timeout = 5s`
    /// - `monitor = true`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(30),
            bus_capacity: 1024,
            probe_interval: Duration::from_secs(1),
            probe_retries: 30,
            probe_timeout: Duration::from_secs(5),
            monitor: true,
        }
    }
}
