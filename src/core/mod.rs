//! Runtime core: orchestration and lifecycle.
//!
//! This module contains the embedded implementation of the bootvisor runtime.
//! The public API from this module is [`Supervisor`] plus the run result
//! types [`Report`] and [`ServiceOutcome`].
//!
//! Internal modules:
//! - [`graph`]: dependency graph validation and topological ordering;
//! - [`runner`]: executes one probe attempt with timeout/cancellation;
//! - [`actor`]: bootstraps a single service through gates/render/launch/probe;
//! - [`supervisor`]: orchestrates actors, collects outcomes, handles shutdown;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod actor;
mod graph;
mod report;
mod runner;
mod shutdown;
mod supervisor;

pub use report::{Report, ServiceOutcome};
pub use supervisor::Supervisor;
