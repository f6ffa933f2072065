//! # Probe abstraction and implementations.
//!
//! A probe is an asynchronous, cancelable health check: one invocation is one
//! attempt, and its result is the sole signal of a service's health. The
//! common handle type is [`ProbeRef`], an `Arc<dyn Probe>` suitable for
//! sharing across the runtime.
//!
//! [`CommandProbe`] runs an external command and maps exit status 0 to
//! healthy. [`ProbeFn`] wraps a closure, producing a fresh future per attempt;
//! deployment-specific policies ("healthy if either auth path works") compose
//! naturally inside the closure or the probe command itself.

use std::future::Future;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ProbeError;
use crate::launch::CommandLine;

/// Shared handle to a probe.
pub type ProbeRef = Arc<dyn Probe>;

/// # One independent health-check attempt.
///
/// Implementations should honor the [`CancellationToken`] and return
/// [`ProbeError::Canceled`] promptly during shutdown; cancellation does not
/// consume the retry budget.
#[async_trait]
pub trait Probe: Send + Sync + 'static {
    /// Executes one attempt. `Ok(())` means healthy.
    async fn check(&self, ctx: CancellationToken) -> Result<(), ProbeError>;
}

/// External command probe: exit status 0 = healthy.
///
/// The command's stdio is discarded; only the exit status matters. The probe
/// process belongs to the harness, so it **is** killed on cancellation
/// (unlike supervised services).
#[derive(Clone, Debug)]
pub struct CommandProbe {
    command: CommandLine,
}

impl CommandProbe {
    /// Creates a probe around the given command line.
    pub fn new(command: CommandLine) -> Self {
        Self { command }
    }

    /// Creates the probe and returns it as a shared handle.
    pub fn arc(command: CommandLine) -> ProbeRef {
        Arc::new(Self::new(command))
    }

    /// The probed command (diagnostics).
    pub fn command(&self) -> &CommandLine {
        &self.command
    }
}

#[async_trait]
impl Probe for CommandProbe {
    async fn check(&self, ctx: CancellationToken) -> Result<(), ProbeError> {
        let mut child = tokio::process::Command::new(&self.command.program)
            .args(&self.command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ProbeError::Spawn { source })?;

        tokio::select! {
            status = child.wait() => match status {
                Ok(s) if s.success() => Ok(()),
                Ok(s) => Err(ProbeError::NonZero { code: s.code() }),
                Err(source) => Err(ProbeError::Spawn { source }),
            },
            _ = ctx.cancelled() => {
                let _ = child.start_kill();
                Err(ProbeError::Canceled)
            }
        }
    }
}

/// Function-backed probe.
///
/// Wraps a closure that *creates* a new future per attempt, so there is no
/// shared mutable state between attempts unless the closure captures it
/// explicitly (via `Arc<...>`).
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use bootvisor::{ProbeError, ProbeFn, ProbeRef};
///
/// let p: ProbeRef = ProbeFn::arc(|_ctx: CancellationToken| async {
///     Ok::<_, ProbeError>(())
/// });
/// ```
#[derive(Debug)]
pub struct ProbeFn<F> {
    f: F,
}

impl<F> ProbeFn<F> {
    /// Creates a new function-backed probe.
    ///
    /// Prefer [`ProbeFn::arc`] when you immediately need a [`ProbeRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, Fut> ProbeFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ProbeError>> + Send + 'static,
{
    /// Creates the probe and returns it as a shared handle.
    pub fn arc(f: F) -> ProbeRef {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Probe for ProbeFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ProbeError>> + Send + 'static,
{
    async fn check(&self, ctx: CancellationToken) -> Result<(), ProbeError> {
        (self.f)(ctx).await
    }
}
