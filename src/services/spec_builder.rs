//! Fluent builder for [`ServiceSpec`].

use std::future::Future;
use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use crate::error::ProbeError;
use crate::launch::CommandLine;
use crate::probes::{ProbeFn, ProbePolicy, ProbeRef};
use crate::services::{RenderStep, ServiceSpec};

/// Builder for [`ServiceSpec`] with a fluent API.
pub struct ServiceSpecBuilder {
    name: String,
    command: Option<CommandLine>,
    renders: Vec<RenderStep>,
    probe: Option<ProbeRef>,
    policy: Option<ProbePolicy>,
    depends_on: Vec<String>,
}

impl ServiceSpecBuilder {
    /// Creates a new builder with the given service name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: None,
            renders: Vec::new(),
            probe: None,
            policy: None,
            depends_on: Vec::new(),
        }
    }

    /// Sets the start command from an argv vector (empty = no command).
    pub fn command<S: AsRef<str>>(mut self, argv: &[S]) -> Self {
        self.command = CommandLine::from_argv(argv);
        self
    }

    /// Sets the start command directly.
    pub fn command_line(mut self, command: CommandLine) -> Self {
        self.command = Some(command);
        self
    }

    /// Appends a render step (run in declaration order, before the command).
    pub fn render(mut self, template: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        self.renders.push(RenderStep::new(template, target));
        self
    }

    /// Sets the health probe.
    pub fn probe(mut self, probe: ProbeRef) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Sets a closure-backed health probe.
    pub fn probe_fn<F, Fut>(self, f: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ProbeError>> + Send + 'static,
    {
        self.probe(ProbeFn::arc(f))
    }

    /// Overrides the probe policy for this service.
    pub fn policy(mut self, policy: ProbePolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Declares the upstream services that must be healthy first.
    pub fn depends_on<I, S>(mut self, upstreams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = upstreams.into_iter().map(Into::into).collect();
        self
    }

    /// Builds the immutable [`ServiceSpec`].
    pub fn build(self) -> ServiceSpec {
        ServiceSpec::from_parts(
            self.name,
            self.command,
            self.renders,
            self.probe,
            self.policy,
            self.depends_on,
        )
    }
}
