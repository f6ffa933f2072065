//! # Supervisor: orchestrates service actors, fan-out delivery, and shutdown.
//!
//! The [`Supervisor`] owns the event bus, a [`SubscriberSet`], and global
//! runtime configuration. It validates the dependency graph, spawns one actor
//! per service, collects per-service outcomes into a [`Report`], handles OS
//! signals, and enforces a bounded shutdown grace.
//!
//! ## High-level architecture
//! ```text
//! Inputs to run():
//!   Vec<ServiceSpec> ──► Supervisor::run(specs)
//!
//! Preparation:
//!   - graph::validate(): duplicates / unknown deps / cycles, topo order
//!   - HealthBoard: one watch channel per service
//!       gate receivers subscribed for every spec FIRST,
//!       then each actor takes its own sender (single-writer discipline)
//!   - subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!
//! Spawn actors (topological order, upstream-first):
//!   order[0]   order[1]  ...  order[N-1]
//!      │           │              │
//!      └──► ServiceActor { spec, policy, gates, publisher, ... }
//!                  └──► child CancellationToken = token.child_token()
//!                       set.spawn(actor.run(child))   (AbortHandle id → name)
//!
//! Outcome collection:
//!   each actor sends exactly one (name, ServiceOutcome) as soon as its
//!   service settles; monitor loops keep running afterwards.
//!
//! Shutdown path:
//!   signal (or bootstrap complete with failures, or no monitors left)
//!       └─► Bus.publish(ShutdownRequested)  [signal only]
//!       └─► token.cancel()        advisory: probe loops stop,
//!                                 started service processes are NOT killed
//!       └─► wait_all_with_grace(cfg.grace):
//!              ├─ Ok (all joined)  → Bus.publish(AllStoppedWithin)
//!              └─ timeout          → Bus.publish(GraceExceeded)
//!                                   Err(GraceExceeded { stuck: names })
//! ```
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use bootvisor::{Config, LogWriter, ServiceSpec, Subscribe, Supervisor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
//!     let sup = Supervisor::new(Config::default(), subs);
//!
//!     let db = ServiceSpec::builder("db")
//!         .command(&["postgres", "-D", "/var/lib/pg"])
//!         .probe_fn(|_ctx| async { Ok::<(), bootvisor::ProbeError>(()) })
//!         .build();
//!     let api = ServiceSpec::builder("api")
//!         .command(&["api-server"])
//!         .depends_on(["db"])
//!         .build();
//!
//!     let report = sup.run(vec![db, api]).await?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Once};

use tokio::{
    sync::mpsc,
    task::{Id, JoinSet},
};
use tokio_util::sync::CancellationToken;

use crate::core::{
    actor::ServiceActor,
    graph,
    report::{Report, ServiceOutcome},
    shutdown,
};
use crate::probes::HealthBoard;
use crate::render::Bindings;
use crate::services::ServiceSpec;
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::{
    config::Config,
    error::RuntimeError,
    events::{Bus, Event, EventKind},
};

/// Coordinates service actors, event delivery, and graceful shutdown.
pub struct Supervisor {
    /// Global runtime configuration.
    pub cfg: Config,
    /// Event bus shared with all actors.
    pub bus: Bus,
    /// Fan-out set for subscribers.
    subs: Arc<SubscriberSet>,
    /// Guards the bus→subscriber listener so repeated runs share one.
    listener: Once,
}

impl Supervisor {
    /// Creates a new supervisor with the given config and subscribers.
    pub fn new(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(subscribers, bus.clone()));
        Self {
            cfg,
            bus,
            subs,
            listener: Once::new(),
        }
    }

    /// Runs the given service specs with bindings snapshotted from the
    /// process environment.
    pub async fn run(&self, specs: Vec<ServiceSpec>) -> Result<Report, RuntimeError> {
        self.run_with_bindings(specs, Bindings::from_env()).await
    }

    /// Runs the given service specs to a complete [`Report`].
    ///
    /// ### Phases
    /// 1. Validate the dependency graph; nothing starts on a config error.
    /// 2. Spawn one actor per service, upstream-first.
    /// 3. Collect one outcome per service (a shutdown signal during this
    ///    phase cancels the remaining actors; their outcomes come back as
    ///    `Canceled`).
    /// 4. If every service settled successfully and monitoring is on, hold
    ///    until a termination signal; otherwise proceed to shutdown.
    /// 5. Cancel and drain actors within [`Config::grace`].
    ///
    /// Started service processes are never killed by any of this; shutdown
    /// only stops the harness's own probe loops and gate waits.
    pub async fn run_with_bindings(
        &self,
        specs: Vec<ServiceSpec>,
        bindings: Bindings,
    ) -> Result<Report, RuntimeError> {
        let order = graph::validate(&specs)?;
        self.subscriber_listener();

        let has_monitors = self.cfg.monitor && specs.iter().any(|s| s.probe().is_some());
        let bindings = Arc::new(bindings);
        let token = CancellationToken::new();

        // Subscribe every gate receiver before any sender is taken; spawning
        // in topo order would otherwise remove senders that later services
        // still need to watch.
        let mut board = HealthBoard::new(specs.iter().map(ServiceSpec::name));
        let mut gate_map: HashMap<String, Vec<_>> = HashMap::with_capacity(specs.len());
        for spec in &specs {
            let gates = spec
                .depends_on()
                .iter()
                .filter_map(|dep| board.watch(dep).map(|rx| (dep.clone(), rx)))
                .collect();
            gate_map.insert(spec.name().to_string(), gates);
        }

        let mut by_name: HashMap<String, ServiceSpec> = specs
            .into_iter()
            .map(|s| (s.name().to_string(), s))
            .collect();

        let (outcome_tx, mut outcome_rx) =
            mpsc::unbounded_channel::<(String, ServiceOutcome)>();
        let mut set: JoinSet<()> = JoinSet::new();
        let mut names: HashMap<Id, String> = HashMap::with_capacity(order.len());

        for name in &order {
            let spec = match by_name.remove(name) {
                Some(s) => s,
                None => continue,
            };
            let publisher = match board.take(name) {
                Some(tx) => tx,
                None => continue,
            };
            let actor = ServiceActor {
                policy: spec.policy_or(self.cfg.probe_policy()),
                bindings: Arc::clone(&bindings),
                publisher,
                gates: gate_map.remove(name).unwrap_or_default(),
                bus: self.bus.clone(),
                outcomes: outcome_tx.clone(),
                monitor: self.cfg.monitor,
                spec,
            };
            let handle = set.spawn(actor.run(token.child_token()));
            names.insert(handle.id(), name.clone());
        }
        drop(outcome_tx);

        let shutdown_signal = shutdown::wait_for_shutdown_signal();
        tokio::pin!(shutdown_signal);
        let mut shutdown_requested = false;

        let mut report = Report::new();
        while report.len() < order.len() {
            tokio::select! {
                next = outcome_rx.recv() => match next {
                    Some((name, outcome)) => report.insert(name, outcome),
                    None => break,
                },
                _ = &mut shutdown_signal, if !shutdown_requested => {
                    shutdown_requested = true;
                    self.bus.publish(Event::new(EventKind::ShutdownRequested));
                    token.cancel();
                }
            }
        }

        // Actors that died without reporting (panic, abort) count as canceled.
        for name in &order {
            if report.get(name).is_none() {
                report.insert(name.clone(), ServiceOutcome::Canceled);
            }
        }

        if report.is_success() && has_monitors && !shutdown_requested {
            let _ = (&mut shutdown_signal).await;
            self.bus.publish(Event::new(EventKind::ShutdownRequested));
        }
        token.cancel();

        self.wait_all_with_grace(&mut set, &mut names).await?;
        Ok(report)
    }

    /// Subscribes to the bus and forwards events to the subscriber set
    /// (fire-and-forget).
    ///
    /// Spawned at most once per supervisor: a second run on the same
    /// instance would otherwise deliver every event twice.
    fn subscriber_listener(&self) {
        self.listener.call_once(|| {
            let mut rx = self.bus.subscribe();
            let set = Arc::clone(&self.subs);
            tokio::spawn(async move {
                while let Ok(ev) = rx.recv().await {
                    set.emit(&ev);
                }
            });
        });
    }

    /// Waits for all actors to finish within the configured grace period.
    ///
    /// Publishes [`EventKind::AllStoppedWithin`] on success, or
    /// [`EventKind::GraceExceeded`] on timeout and returns
    /// [`RuntimeError::GraceExceeded`] naming the stuck services.
    async fn wait_all_with_grace(
        &self,
        set: &mut JoinSet<()>,
        names: &mut HashMap<Id, String>,
    ) -> Result<(), RuntimeError> {
        let grace = self.cfg.grace;
        let drain = async {
            while let Some(res) = set.join_next_with_id().await {
                match res {
                    Ok((id, ())) => {
                        names.remove(&id);
                    }
                    Err(e) => {
                        names.remove(&e.id());
                    }
                }
            }
        };

        let timed = tokio::time::timeout(grace, drain).await;
        match timed {
            Ok(()) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                self.bus.publish(Event::new(EventKind::GraceExceeded));
                let mut stuck: Vec<String> = names.values().cloned().collect();
                stuck.sort();
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }
}
