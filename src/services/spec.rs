//! # Service specification for gated startup.
//!
//! Defines [`ServiceSpec`] — the configuration bundle describing how one
//! service bootstraps: which templates to render first, what to launch, how
//! to probe it, and which upstream services must be healthy before any of
//! that happens.
//!
//! Specs are defined once at configuration load time and are immutable
//! thereafter. A spec can be created:
//! - **Explicitly** with [`ServiceSpec::new`] (minimal)
//! - **Fluently** with [`ServiceSpec::builder`]
//! - **Declaratively** from a [`Manifest`](crate::services::Manifest)
//!
//! ## Rules
//! - `command = None` means the process is managed elsewhere; the spec only
//!   renders and probes it (a remote database, for example).
//! - `probe = None` means the service counts as up once its command spawns.
//! - The dependency relation across all specs must form a DAG; this is
//!   validated by the supervisor before anything starts.

use std::path::PathBuf;

use crate::launch::CommandLine;
use crate::probes::{ProbePolicy, ProbeRef};

/// One template→target rendering step, run before the service's command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderStep {
    /// Template file with `${NAME}` placeholders.
    pub template: PathBuf,
    /// Where the rendered config is written.
    pub target: PathBuf,
}

impl RenderStep {
    /// Creates a render step.
    pub fn new(template: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            target: target.into(),
        }
    }
}

/// Specification for bootstrapping one service under supervision.
#[derive(Clone)]
pub struct ServiceSpec {
    name: String,
    command: Option<CommandLine>,
    renders: Vec<RenderStep>,
    probe: Option<ProbeRef>,
    policy: Option<ProbePolicy>,
    depends_on: Vec<String>,
}

impl ServiceSpec {
    /// Creates a minimal spec: a named command with no renders, no probe, and
    /// no upstreams. Use [`ServiceSpec::builder`] for anything richer.
    pub fn new(name: impl Into<String>, command: Option<CommandLine>) -> Self {
        Self {
            name: name.into(),
            command,
            renders: Vec::new(),
            probe: None,
            policy: None,
            depends_on: Vec::new(),
        }
    }

    /// Creates a builder for fluent construction.
    pub fn builder(name: impl Into<String>) -> super::ServiceSpecBuilder {
        super::ServiceSpecBuilder::new(name)
    }

    pub(crate) fn from_parts(
        name: String,
        command: Option<CommandLine>,
        renders: Vec<RenderStep>,
        probe: Option<ProbeRef>,
        policy: Option<ProbePolicy>,
        depends_on: Vec<String>,
    ) -> Self {
        Self {
            name,
            command,
            renders,
            probe,
            policy,
            depends_on,
        }
    }

    /// The service's stable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The start command, if this spec launches a process.
    pub fn command(&self) -> Option<&CommandLine> {
        self.command.as_ref()
    }

    /// Render steps executed before the start command, in order.
    pub fn renders(&self) -> &[RenderStep] {
        &self.renders
    }

    /// The health probe, if one is configured.
    pub fn probe(&self) -> Option<&ProbeRef> {
        self.probe.as_ref()
    }

    /// The per-service probe policy override, if any.
    pub fn policy(&self) -> Option<ProbePolicy> {
        self.policy
    }

    /// This service's policy, falling back to the given default.
    pub fn policy_or(&self, default: ProbePolicy) -> ProbePolicy {
        self.policy.unwrap_or(default)
    }

    /// Names of upstream services that must be healthy first.
    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }
}

impl std::fmt::Debug for ServiceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceSpec")
            .field("name", &self.name)
            .field("command", &self.command)
            .field("renders", &self.renders)
            .field("probe", &self.probe.is_some())
            .field("policy", &self.policy)
            .field("depends_on", &self.depends_on)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn minimal_spec() {
        let spec = ServiceSpec::new("db", CommandLine::from_argv(&["postgres"]));
        assert_eq!(spec.name(), "db");
        assert!(spec.probe().is_none());
        assert!(spec.depends_on().is_empty());
        assert_eq!(
            spec.policy_or(ProbePolicy::default()),
            ProbePolicy::default()
        );
    }

    #[test]
    fn render_step_paths() {
        let step = RenderStep::new("in.tpl", "out.conf");
        assert_eq!(step.template, Path::new("in.tpl"));
        assert_eq!(step.target, Path::new("out.conf"));
    }
}
