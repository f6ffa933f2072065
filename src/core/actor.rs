//! # ServiceActor: single-service bootstrap driver.
//!
//! Drives one [`ServiceSpec`] through its bootstrap sequence:
//! dependency gates, config rendering, process launch, and health probing.
//!
//! ## Flow
//! ```text
//! ServiceSpec ──► Supervisor ──► ServiceActor::run()
//!
//! wait for upstream gates        (watch channels, cancellable)
//!   │  upstream unhealthy ─────► publish ServiceSkipped, state=UnhealthyTerminal
//!   ▼
//! render templates, in order     (fail ⇒ RenderFailed, state=UnhealthyTerminal)
//!   ▼
//! spawn command (if any)         (fail ⇒ LaunchFailed, state=UnhealthyTerminal)
//!   ▼
//! probe loop                     Pending ──first success──► Healthy (latched)
//!                                budget exhausted ────────► UnhealthyTerminal
//!   ▼
//! monitor loop (optional)        post-healthy failures publish events only
//! ```
//!
//! ## Rules
//! - Exactly one [`ServiceOutcome`] is sent per actor, as soon as the service
//!   settles; the monitor loop runs after the outcome is already reported.
//! - `Healthy` is never downgraded; dependents that started stay started.
//! - Cancellation is honored at the gate wait, between probe attempts, and
//!   inside probe attempts (child tokens). It never kills a started service.

use std::mem;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::{
    core::report::ServiceOutcome,
    core::runner::probe_once,
    events::{Bus, Event, EventKind},
    launch::spawn_service,
    probes::{HealthState, ProbePolicy},
    render::{render, Bindings},
    services::ServiceSpec,
};

/// Result of waiting on this service's upstream gates.
enum Gate {
    /// All upstreams reported healthy.
    Ready,
    /// The named direct upstream settled unhealthy (or vanished).
    Failed(String),
    /// Shutdown was requested while waiting.
    Canceled,
}

/// Supervises the bootstrap of a single service.
pub(crate) struct ServiceActor {
    /// The service to bootstrap.
    pub spec: ServiceSpec,
    /// Effective probe policy (service override or config default).
    pub policy: ProbePolicy,
    /// Environment snapshot used for render steps.
    pub bindings: Arc<Bindings>,
    /// Single writer for this service's health.
    pub publisher: watch::Sender<HealthState>,
    /// Gate receivers for each direct upstream, in declaration order.
    pub gates: Vec<(String, watch::Receiver<HealthState>)>,
    /// Internal event bus.
    pub bus: Bus,
    /// Where the settled outcome is reported.
    pub outcomes: mpsc::UnboundedSender<(String, ServiceOutcome)>,
    /// Keep probing after the service turns healthy.
    pub monitor: bool,
}

impl ServiceActor {
    /// Runs the actor: bootstrap, report the outcome, then optionally monitor.
    pub async fn run(mut self, token: CancellationToken) {
        let outcome = self.bootstrap(&token).await;
        let keep_monitoring =
            outcome.is_ok() && self.monitor && self.spec.probe().is_some();

        let _ = self
            .outcomes
            .send((self.spec.name().to_string(), outcome));

        if keep_monitoring {
            self.monitor_loop(&token).await;
        }
    }

    /// Runs the bootstrap sequence to its settled outcome.
    async fn bootstrap(&mut self, token: &CancellationToken) -> ServiceOutcome {
        match self.wait_for_upstreams(token).await {
            Gate::Ready => {}
            Gate::Canceled => return ServiceOutcome::Canceled,
            Gate::Failed(upstream) => {
                self.bus.publish(
                    Event::new(EventKind::ServiceSkipped)
                        .with_service(self.spec.name())
                        .with_upstream(upstream.clone()),
                );
                // Terminal for dependents too: skips propagate downstream.
                self.publisher.send_replace(HealthState::UnhealthyTerminal);
                return ServiceOutcome::Skipped { upstream };
            }
        }

        for step in self.spec.renders() {
            match render(&step.template, &step.target, &self.bindings) {
                Ok(rendered) => {
                    self.bus.publish(
                        Event::new(EventKind::RenderCompleted)
                            .with_service(self.spec.name())
                            .with_path(&rendered.path),
                    );
                }
                Err(e) => {
                    self.bus.publish(
                        Event::new(EventKind::RenderFailed)
                            .with_service(self.spec.name())
                            .with_path(&step.template)
                            .with_reason(e.to_string()),
                    );
                    self.publisher.send_replace(HealthState::UnhealthyTerminal);
                    return ServiceOutcome::RenderFailed {
                        error: e.to_string(),
                    };
                }
            }
        }

        if let Some(command) = self.spec.command() {
            self.bus.publish(
                Event::new(EventKind::ServiceLaunching).with_service(self.spec.name()),
            );
            match spawn_service(command) {
                Ok(child) => {
                    let mut ev =
                        Event::new(EventKind::ServiceStarted).with_service(self.spec.name());
                    if let Some(pid) = child.id() {
                        ev = ev.with_reason(format!("pid={pid}"));
                    }
                    self.bus.publish(ev);
                    // The handle is dropped on purpose: the child outlives the
                    // harness and is never killed by it.
                    drop(child);
                }
                Err(e) => {
                    self.bus.publish(
                        Event::new(EventKind::LaunchFailed)
                            .with_service(self.spec.name())
                            .with_reason(e.to_string()),
                    );
                    self.publisher.send_replace(HealthState::UnhealthyTerminal);
                    return ServiceOutcome::LaunchFailed {
                        error: e.to_string(),
                    };
                }
            }
        }

        match self.spec.probe() {
            Some(_) => self.probe_until_settled(token).await,
            None => {
                self.bus.publish(
                    Event::new(EventKind::ServiceHealthy)
                        .with_service(self.spec.name())
                        .with_attempt(0),
                );
                self.publisher.send_replace(HealthState::Healthy);
                ServiceOutcome::Started
            }
        }
    }

    /// Blocks until every direct upstream settles, or shutdown intervenes.
    async fn wait_for_upstreams(&mut self, token: &CancellationToken) -> Gate {
        let gates = mem::take(&mut self.gates);
        for (upstream, mut rx) in gates {
            loop {
                match *rx.borrow_and_update() {
                    HealthState::Healthy => break,
                    HealthState::UnhealthyTerminal => return Gate::Failed(upstream),
                    HealthState::Unknown | HealthState::Pending => {}
                }
                tokio::select! {
                    changed = rx.changed() => {
                        if changed.is_err() {
                            // Publisher gone without settling: treat as failed
                            // unless shutdown explains the disappearance.
                            if token.is_cancelled() {
                                return Gate::Canceled;
                            }
                            return Gate::Failed(upstream);
                        }
                    }
                    _ = token.cancelled() => return Gate::Canceled,
                }
            }
        }
        Gate::Ready
    }

    /// Runs probe attempts until first success or retry-budget exhaustion.
    async fn probe_until_settled(&self, token: &CancellationToken) -> ServiceOutcome {
        let probe = match self.spec.probe() {
            Some(p) => Arc::clone(p),
            None => return ServiceOutcome::Started,
        };

        self.publisher.send_replace(HealthState::Pending);

        let budget = self.policy.budget();
        for attempt in 1..=budget {
            match probe_once(
                self.spec.name(),
                probe.as_ref(),
                token,
                self.policy.timeout,
                attempt,
                &self.bus,
            )
            .await
            {
                Ok(()) => {
                    self.bus.publish(
                        Event::new(EventKind::ServiceHealthy)
                            .with_service(self.spec.name())
                            .with_attempt(attempt),
                    );
                    self.publisher.send_replace(HealthState::Healthy);
                    return ServiceOutcome::Healthy { attempts: attempt };
                }
                Err(crate::error::ProbeError::Canceled) => {
                    return ServiceOutcome::Canceled;
                }
                Err(_) => {
                    if attempt < budget {
                        tokio::select! {
                            _ = tokio::time::sleep(self.policy.interval) => {}
                            _ = token.cancelled() => return ServiceOutcome::Canceled,
                        }
                    }
                }
            }
        }

        self.bus.publish(
            Event::new(EventKind::ServiceUnhealthy)
                .with_service(self.spec.name())
                .with_attempt(budget),
        );
        self.publisher.send_replace(HealthState::UnhealthyTerminal);
        ServiceOutcome::Unhealthy { attempts: budget }
    }

    /// Keeps probing a healthy service for visibility until shutdown.
    ///
    /// Failures here publish `ProbeFailed` events (via the runner) but never
    /// change the gating state.
    async fn monitor_loop(&self, token: &CancellationToken) {
        let probe = match self.spec.probe() {
            Some(p) => Arc::clone(p),
            None => return,
        };

        let mut attempt = self.policy.budget();
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.policy.interval) => {}
                _ = token.cancelled() => return,
            }
            attempt = attempt.saturating_add(1);
            match probe_once(
                self.spec.name(),
                probe.as_ref(),
                token,
                self.policy.timeout,
                attempt,
                &self.bus,
            )
            .await
            {
                Ok(()) => {}
                Err(crate::error::ProbeError::Canceled) => return,
                Err(_) => {}
            }
        }
    }
}
