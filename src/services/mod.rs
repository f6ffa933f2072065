//! Service specifications.
//!
//! This module provides the declarative side of the bootstrap:
//! - [`ServiceSpec`] — name, start command, render steps, probe, upstreams
//! - [`ServiceSpecBuilder`] — fluent construction
//! - [`Manifest`] — YAML document mapping a whole stack to ServiceSpecs

mod manifest;
mod spec;
mod spec_builder;

pub use manifest::Manifest;
pub use spec::{RenderStep, ServiceSpec};
pub use spec_builder::ServiceSpecBuilder;
