//! Health probes and health state publication.
//!
//! This module provides the probe-side of the readiness protocol:
//! - [`Probe`] — trait for a single health-check attempt (exit-status contract)
//! - [`CommandProbe`] — external command whose exit status is the sole signal
//! - [`ProbeFn`] — closure-backed probe, convenient for composition and tests
//! - [`ProbePolicy`] — fixed polling interval, retry budget, per-attempt timeout
//! - [`HealthState`] / [`HealthBoard`] — single-writer watch channels that
//!   dependents gate on

mod health;
mod policy;
mod probe;

pub use health::{HealthBoard, HealthState};
pub use policy::ProbePolicy;
pub use probe::{CommandProbe, Probe, ProbeFn, ProbeRef};
