//! # Run a single health-probe attempt.
//!
//! Executes one attempt of a [`Probe`] with an optional timeout and publishes
//! failures to the [`Bus`].
//!
//! ## Event flow
//!
//! ```text
//! Success:
//!   probe.check() → Ok(()) → no event (the actor publishes ServiceHealthy)
//!
//! Cancellation:
//!   probe.check() → Err(Canceled) → no event (graceful exit)
//!
//! Failure:
//!   probe.check() → Err(e) → publish ProbeFailed
//!
//! Timeout:
//!   timeout exceeded → cancel child → publish ProbeFailed (timeout)
//!                                   → return Timeout error
//!
//! Panic:
//!   probe.check() panics → caught → publish ProbeFailed (panic message)
//! ```
//!
//! ## Rules
//! - `Canceled` never publishes and never counts against the retry budget
//! - Derives a **child token** per attempt (isolated cancellation)
//! - Child cancellation does **not** affect the parent
//! - A panicking probe is an ordinary failed attempt, not a dead actor

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::{
    error::ProbeError,
    events::{Bus, Event, EventKind},
    probes::Probe,
};

/// Executes a single probe attempt, publishing a `ProbeFailed` event on error.
///
/// If `timeout` is `Some(dur)` and `dur > 0`, the attempt is wrapped in
/// `tokio::time::timeout`; an elapsed timer cancels the child token so a
/// command probe can kill its process before the error is returned.
pub(crate) async fn probe_once<P: Probe + ?Sized>(
    service: &str,
    probe: &P,
    parent: &CancellationToken,
    timeout: Option<Duration>,
    attempt: u32,
    bus: &Bus,
) -> Result<(), ProbeError> {
    let child = parent.child_token();

    // A user probe that panics must not take the actor down with it; the
    // remaining actors would then wait forever for an outcome that never
    // comes. Caught panics count as one failed attempt.
    let check = AssertUnwindSafe(probe.check(child.clone())).catch_unwind();

    let res = if let Some(dur) = timeout.filter(|d| *d > Duration::ZERO) {
        match time::timeout(dur, check).await {
            Ok(r) => flatten_panic(r),
            Err(_elapsed) => {
                child.cancel();
                Err(ProbeError::Timeout { timeout: dur })
            }
        }
    } else {
        flatten_panic(check.await)
    };

    match res {
        Ok(()) => Ok(()),
        Err(ProbeError::Canceled) => Err(ProbeError::Canceled),
        Err(e) => {
            publish_failed(bus, service, attempt, &e);
            Err(e)
        }
    }
}

fn flatten_panic(
    res: Result<Result<(), ProbeError>, Box<dyn Any + Send>>,
) -> Result<(), ProbeError> {
    match res {
        Ok(r) => r,
        Err(panic_err) => Err(ProbeError::Failed {
            message: panic_message(panic_err.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("probe panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("probe panicked: {s}")
    } else {
        "probe panicked".to_string()
    }
}

fn publish_failed(bus: &Bus, service: &str, attempt: u32, err: &ProbeError) {
    bus.publish(
        Event::new(EventKind::ProbeFailed)
            .with_service(service)
            .with_attempt(attempt)
            .with_reason(err.to_string()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::ProbeFn;

    #[tokio::test]
    async fn timeout_counts_as_failure() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let probe = ProbeFn::new(|ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Err::<(), _>(ProbeError::Canceled)
        });
        let parent = CancellationToken::new();

        let res = probe_once(
            "slow",
            &probe,
            &parent,
            Some(Duration::from_millis(10)),
            1,
            &bus,
        )
        .await;

        assert!(matches!(res, Err(ProbeError::Timeout { .. })));
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::ProbeFailed);
        assert_eq!(ev.attempt, Some(1));
    }

    #[tokio::test]
    async fn cancellation_is_silent() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let probe = ProbeFn::new(|_ctx: CancellationToken| async {
            Err::<(), _>(ProbeError::Canceled)
        });
        let parent = CancellationToken::new();

        let res = probe_once("svc", &probe, &parent, None, 1, &bus).await;
        assert!(matches!(res, Err(ProbeError::Canceled)));
        assert!(matches!(
            rx.try_recv(),
            Err(tokio::sync::broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn panic_counts_as_failure() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let poisoned = true;
        let probe = ProbeFn::new(move |_ctx: CancellationToken| async move {
            assert!(!poisoned, "poisoned connection pool");
            Ok::<(), ProbeError>(())
        });
        let parent = CancellationToken::new();

        let res = probe_once("svc", &probe, &parent, None, 2, &bus).await;
        match res {
            Err(ProbeError::Failed { message }) => {
                assert!(message.contains("poisoned connection pool"), "{message}");
            }
            other => panic!("expected Failed, got {other:?}"),
        }

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::ProbeFailed);
        assert_eq!(ev.attempt, Some(2));
    }

    #[tokio::test]
    async fn success_publishes_nothing() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let probe = ProbeFn::new(|_ctx: CancellationToken| async { Ok::<(), ProbeError>(()) });
        let parent = CancellationToken::new();

        probe_once("svc", &probe, &parent, None, 1, &bus)
            .await
            .unwrap();
        assert!(rx.try_recv().is_err());
    }
}
