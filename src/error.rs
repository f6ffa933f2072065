//! Error types used by the bootvisor runtime.
//!
//! This module defines the error enums for each bootstrap phase:
//!
//! - [`RenderError`] — config templating failures (fatal, never retried).
//! - [`ProbeError`] — a single health-check attempt failed (retried up to the budget).
//! - [`LaunchError`] — the target process could not be spawned or exec'd.
//! - [`RuntimeError`] — errors raised by the orchestration runtime itself.
//! - [`ManifestError`] — the service manifest could not be loaded.
//!
//! All types provide `as_label()` for logging/metrics. Every fatal error names
//! the file, variable, or service implicated; there is no silent partial success.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// # Errors produced by the config renderer.
///
/// Render errors are fatal for the service they belong to: the launcher never
/// runs after a failed render, and dependents of the service are skipped.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RenderError {
    /// One or more required bindings are absent or empty.
    ///
    /// Collected in a single validation pass over the whole template, so every
    /// missing name is reported at once. No output file is written.
    #[error("template {template:?}: missing or empty bindings: {}", names.join(", "))]
    MissingBindings {
        /// The template that referenced the bindings.
        template: PathBuf,
        /// Every placeholder name without a non-empty binding, in template order.
        names: Vec<String>,
    },

    /// The rendered file exists but is empty.
    ///
    /// Distinct from [`RenderError::MissingBindings`]: substitution itself
    /// reported no error, yet the output is degenerate.
    #[error("rendered file {path:?} is empty")]
    EmptyOutput {
        /// The written target path.
        path: PathBuf,
    },

    /// A `${` without a closing `}` (or an empty `${}`) in the template.
    #[error("template {template:?}: unterminated placeholder at byte {offset}")]
    UnterminatedPlaceholder {
        /// The offending template.
        template: PathBuf,
        /// Byte offset of the opening `${`.
        offset: usize,
    },

    /// Filesystem failure while reading the template or writing the target.
    #[error("{path:?}: {source}")]
    Io {
        /// The path being read or written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RenderError::MissingBindings { .. } => "render_missing_binding",
            RenderError::EmptyOutput { .. } => "render_empty_output",
            RenderError::UnterminatedPlaceholder { .. } => "render_unterminated_placeholder",
            RenderError::Io { .. } => "render_io",
        }
    }
}

/// # Errors produced by a single health-probe attempt.
///
/// Every variant counts as exactly one failed attempt; the probing loop
/// retries until the budget is exhausted. [`ProbeError::Canceled`] is the
/// exception: it stops the loop without consuming the budget.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The probe command exited with a non-zero status.
    #[error("probe exited with status {code:?}")]
    NonZero {
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
    },

    /// The probe command could not be spawned or waited on.
    #[error("probe could not run: {source}")]
    Spawn {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The attempt exceeded its configured timeout.
    #[error("probe timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// A closure-backed probe reported failure.
    #[error("probe failed: {message}")]
    Failed {
        /// The probe's own failure message.
        message: String,
    },

    /// The probe was cancelled by a shutdown signal.
    #[error("probe canceled")]
    Canceled,
}

impl ProbeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ProbeError::NonZero { .. } => "probe_nonzero",
            ProbeError::Spawn { .. } => "probe_spawn",
            ProbeError::Timeout { .. } => "probe_timeout",
            ProbeError::Failed { .. } => "probe_failed",
            ProbeError::Canceled => "probe_canceled",
        }
    }
}

/// # Errors produced when starting a target process.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LaunchError {
    /// The supervised child process could not be spawned.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        /// The full command line that failed.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Replacing the process image failed (the target never started).
    #[error("failed to exec `{command}`: {source}")]
    Exec {
        /// The full command line that failed.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl LaunchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LaunchError::Spawn { .. } => "launch_spawn",
            LaunchError::Exec { .. } => "launch_exec",
        }
    }
}

/// # Errors produced by the orchestration runtime.
///
/// The graph errors are configuration-time fatal: they are detected before any
/// service start command is issued.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The declared dependency relation contains a cycle.
    #[error("cyclic dependency among services: {}", cycle.join(", "))]
    CyclicDependency {
        /// Names of the services involved in the cycle, sorted.
        cycle: Vec<String>,
    },

    /// A service depends on a name that no ServiceSpec declares.
    #[error("service `{service}` depends on unknown service `{dependency}`")]
    UnknownDependency {
        /// The dependent service.
        service: String,
        /// The undeclared upstream name.
        dependency: String,
    },

    /// Two ServiceSpecs share the same name.
    #[error("duplicate service name `{name}`")]
    DuplicateService {
        /// The duplicated name.
        name: String,
    },

    /// Shutdown grace period was exceeded; some actors were still running.
    #[error("shutdown grace {grace:?} exceeded; still running: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of services whose actors did not stop in time, sorted.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::CyclicDependency { .. } => "runtime_cyclic_dependency",
            RuntimeError::UnknownDependency { .. } => "runtime_unknown_dependency",
            RuntimeError::DuplicateService { .. } => "runtime_duplicate_service",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// True for graph errors detected before any service starts.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RuntimeError::CyclicDependency { .. }
                | RuntimeError::UnknownDependency { .. }
                | RuntimeError::DuplicateService { .. }
        )
    }
}

/// # Errors produced while loading the service manifest.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("{path:?}: {source}")]
    Io {
        /// The manifest path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest file is not valid YAML for the expected schema.
    #[error("{path:?}: {source}")]
    Parse {
        /// The manifest path.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A service declared a probe with an empty command.
    ///
    /// A declared probe that cannot run would silently degrade the service to
    /// "up once spawned", letting dependents gate open against an unverified
    /// upstream. Rejected before any service starts.
    #[error("service `{service}`: probe command is empty")]
    EmptyProbe {
        /// The service whose probe has no command.
        service: String,
    },
}

impl ManifestError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ManifestError::Io { .. } => "manifest_io",
            ManifestError::Parse { .. } => "manifest_parse",
            ManifestError::EmptyProbe { .. } => "manifest_empty_probe",
        }
    }
}
