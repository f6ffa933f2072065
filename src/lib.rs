//! # bootvisor
//!
//! **Bootvisor** is a config-rendering, dependency-gated bootstrap supervisor
//! for Rust.
//!
//! It renders config files from templates against an environment snapshot,
//! launches opaque service processes, health-checks them with pluggable
//! probes, and only releases dependents once their upstreams are healthy.
//! The crate is designed as a building block for container entrypoints and
//! deployment harnesses.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ ServiceSpec  │   │ ServiceSpec  │   │ ServiceSpec  │
//!     │    (db)      │   │   (cache)    │   │ (api, deps:  │
//!     │              │   │              │   │  db, cache)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor (runtime orchestrator)                                │
//! │  - graph validation (duplicates, unknown deps, cycles)            │
//! │  - HealthBoard (one watch channel per service)                    │
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │ ServiceActor │   │ ServiceActor │   │ ServiceActor │   │
//!     │ gate▸render▸ │   │ gate▸render▸ │   │ gate▸render▸ │   │
//!     │ launch▸probe │   │ launch▸probe │   │ launch▸probe │   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │                  │                  │                 │
//!      │ Publishes        │ Publishes        │ Publishes       │
//!      │ Events:          │ Events:          │ Events:         │
//!      │ - RenderCompleted│ - ServiceStarted │ - ProbeFailed   │
//!      │ - ServiceHealthy │ - ServiceSkipped │ - ...           │
//!      ▼                  ▼                  ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       │   (in Supervisor)      │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                            (per-sub queues)
//! ```
//!
//! ### Lifecycle
//! ```text
//! ServiceSpec ──► Supervisor ──► ServiceActor::run()
//!
//! ├─► wait for upstream gates (watch channels)
//! │      └─ upstream unhealthy ─► ServiceSkipped, UnhealthyTerminal, exit
//! ├─► render templates, in order
//! │      └─ missing binding / empty output ─► RenderFailed, exit
//! ├─► spawn command (if any)
//! │      └─ spawn error ─► LaunchFailed, exit
//! ├─► probe loop (fixed interval, retry budget)
//! │      ├─ first success  ─► ServiceHealthy, gate opens (latched)
//! │      └─ budget spent   ─► ServiceUnhealthy, dependents skipped
//! └─► monitor loop (optional, visibility only, never downgrades)
//!
//! Exactly one ServiceOutcome per service is collected into the Report.
//! Shutdown is advisory: probe loops stop, started processes are untouched.
//! ```
//!
//! ## Features
//! | Area              | Description                                                          | Key types / traits                        |
//! |-------------------|----------------------------------------------------------------------|--------------------------------------------|
//! | **Rendering**     | Fail-closed `${NAME}` templating against an env snapshot.            | [`Template`], [`Bindings`], [`render`]     |
//! | **Launching**     | Exec into or spawn opaque service processes.                         | [`CommandLine`], [`exec`], [`spawn_service`]|
//! | **Probing**       | Pluggable health checks with interval/retries/timeout.               | [`Probe`], [`CommandProbe`], [`ProbePolicy`]|
//! | **Gating**        | Dependency-ordered startup over a validated DAG.                     | [`ServiceSpec`], [`Supervisor`]            |
//! | **Reporting**     | One settled outcome per service.                                     | [`Report`], [`ServiceOutcome`]             |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, custom subscribers).   | [`Subscribe`], [`LogWriter`]               |
//! | **Manifest**      | Declarative YAML service definitions.                                | [`Manifest`]                               |
//! | **Errors**        | Typed errors per bootstrap phase.                                    | [`RenderError`], [`RuntimeError`]          |
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use bootvisor::{
//!     CommandLine, CommandProbe, Config, LogWriter, ServiceSpec, Subscribe, Supervisor,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     env_logger::init();
//!
//!     let db = ServiceSpec::builder("db")
//!         .probe(CommandProbe::arc(CommandLine::new(
//!             "pg_isready",
//!             ["-h", "127.0.0.1"],
//!         )))
//!         .build();
//!
//!     let api = ServiceSpec::builder("api")
//!         .render("/etc/app/app.conf.tpl", "/etc/app/app.conf")
//!         .command(&["api-server", "--config", "/etc/app/app.conf"])
//!         .depends_on(["db"])
//!         .build();
//!
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
//!     let report = Supervisor::new(Config::default(), subs)
//!         .run(vec![db, api])
//!         .await?;
//!
//!     if !report.is_success() {
//!         std::process::exit(5);
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod launch;
mod probes;
mod render;
mod services;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{Report, ServiceOutcome, Supervisor};
pub use error::{LaunchError, ManifestError, ProbeError, RenderError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use launch::{exec, spawn_service, CommandLine};
pub use probes::{
    CommandProbe, HealthBoard, HealthState, Probe, ProbeFn, ProbePolicy, ProbeRef,
};
pub use render::{render, render_template, Bindings, RenderedConfig, Template};
pub use services::{Manifest, RenderStep, ServiceSpec, ServiceSpecBuilder};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
