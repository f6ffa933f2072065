//! # Runtime events emitted by the supervisor and service actors.
//!
//! The [`EventKind`] enum classifies event types across the bootstrap phases:
//! rendering, launching, probing, gating outcomes, and shutdown. The [`Event`]
//! struct carries the metadata each kind sets: timestamps, service name,
//! attempt counters, reasons, paths, and the failed upstream for skips.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Render events ===
    /// A template was rendered and verified non-empty.
    ///
    /// Sets: `service`, `path` (target), `at`, `seq`.
    RenderCompleted,

    /// Rendering failed; the service's command will not run.
    ///
    /// Sets: `service`, `path` (template), `reason`, `at`, `seq`.
    RenderFailed,

    // === Launch events ===
    /// The service's start command is about to be issued.
    ///
    /// Sets: `service`, `at`, `seq`.
    ServiceLaunching,

    /// The service's process was spawned.
    ///
    /// Sets: `service`, `reason` (`pid=N` when known), `at`, `seq`.
    ServiceStarted,

    /// The start command could not be spawned.
    ///
    /// Sets: `service`, `reason`, `at`, `seq`.
    LaunchFailed,

    // === Probe / gating events ===
    /// One probe attempt failed (retried within the budget; also emitted by
    /// post-healthy monitoring).
    ///
    /// Sets: `service`, `attempt`, `reason`, `at`, `seq`.
    ProbeFailed,

    /// First probe success; the service now gates its dependents open.
    ///
    /// Sets: `service`, `attempt` (0 for probe-less services), `at`, `seq`.
    ServiceHealthy,

    /// Retry budget exhausted without a success; terminal.
    ///
    /// Sets: `service`, `attempt` (the budget), `at`, `seq`.
    ServiceUnhealthy,

    /// The service was never started because an upstream failed.
    ///
    /// Sets: `service`, `upstream`, `at`, `seq`.
    ServiceSkipped,

    // === Shutdown events ===
    /// Shutdown requested (OS signal observed).
    ///
    /// Sets: `at`, `seq`.
    ShutdownRequested,

    /// All actors stopped within the configured grace period.
    ///
    /// Sets: `at`, `seq`.
    AllStoppedWithin,

    /// Grace period exceeded; some actors did not stop in time.
    ///
    /// Sets: `at`, `seq`.
    GraceExceeded,

    // === Subscriber events ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `service` (subscriber name), `reason`, `at`, `seq`.
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets: `service` (subscriber name), `reason`, `at`, `seq`.
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the service (or subscriber), if applicable.
    pub service: Option<Arc<str>>,
    /// Probe attempt count (starting from 1; 0 = no probe ran).
    pub attempt: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// The failed upstream a skip is attributed to.
    pub upstream: Option<Arc<str>>,
    /// Template or target path, for render events.
    pub path: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            service: None,
            attempt: None,
            reason: None,
            upstream: None,
            path: None,
        }
    }

    /// Attaches a service name.
    #[inline]
    pub fn with_service(mut self, service: impl Into<Arc<str>>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the failed upstream name.
    #[inline]
    pub fn with_upstream(mut self, upstream: impl Into<Arc<str>>) -> Self {
        self.upstream = Some(upstream.into());
        self
    }

    /// Attaches a file path (lossy for non-unicode paths; diagnostics only).
    #[inline]
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(Arc::from(path.as_ref().to_string_lossy().as_ref()));
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_service(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_service(subscriber)
            .with_reason(info)
    }

    /// True for events emitted by the subscriber machinery itself (never
    /// re-reported on drop, to avoid feedback loops).
    #[inline]
    pub fn is_subscriber_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_monotonic() {
        let a = Event::new(EventKind::ServiceHealthy);
        let b = Event::new(EventKind::ServiceHealthy);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn builders_set_fields() {
        let ev = Event::new(EventKind::ServiceSkipped)
            .with_service("api")
            .with_upstream("db")
            .with_attempt(3)
            .with_reason("boom");
        assert_eq!(ev.kind, EventKind::ServiceSkipped);
        assert_eq!(ev.service.as_deref(), Some("api"));
        assert_eq!(ev.upstream.as_deref(), Some("db"));
        assert_eq!(ev.attempt, Some(3));
        assert_eq!(ev.reason.as_deref(), Some("boom"));
    }
}
