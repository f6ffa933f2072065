//! # Process launching.
//!
//! Two ways to hand control to an opaque external process:
//!
//! - [`exec`] — the container-entrypoint path: replaces the current process
//!   image, with the argument vector unmodified and standard streams passed
//!   through. No wrapper stays resident, so container-level signal delivery
//!   reaches the target directly. On non-Unix platforms (no process-image
//!   replacement) the child is spawned, awaited, and its exit status is
//!   forwarded as our own.
//! - [`spawn_service`] — the supervised path: spawns a child the supervisor
//!   health-checks. The child inherits stdio and is **not** killed when its
//!   actor stops; shutdown of the harness is advisory.

use std::convert::Infallible;
use std::fmt;

use crate::error::LaunchError;

/// An opaque command line: program plus arguments, forwarded unmodified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLine {
    /// Program to run (resolved via `PATH` like any exec).
    pub program: String,
    /// Arguments, passed through verbatim (no added or removed flags).
    pub args: Vec<String>,
}

impl CommandLine {
    /// Creates a command line from a program and its arguments.
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits an argv vector into program + args. `None` for an empty vector.
    pub fn from_argv<S: AsRef<str>>(argv: &[S]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.as_ref().to_string(),
            args: args.iter().map(|a| a.as_ref().to_string()).collect(),
        })
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        Ok(())
    }
}

/// Replaces the current process image with `command`.
///
/// Only returns on failure; on success the target process has taken over and
/// the renderer/launcher code is gone from memory entirely.
#[cfg(unix)]
pub fn exec(command: &CommandLine) -> Result<Infallible, LaunchError> {
    use std::os::unix::process::CommandExt;

    let source = std::process::Command::new(&command.program)
        .args(&command.args)
        .exec();
    Err(LaunchError::Exec {
        command: command.to_string(),
        source,
    })
}

/// Spawns `command`, waits for it, and exits with its status.
///
/// Fallback for platforms without process-image replacement: the wrapper stays
/// resident but forwards the exit status transparently.
#[cfg(not(unix))]
pub fn exec(command: &CommandLine) -> Result<Infallible, LaunchError> {
    let status = std::process::Command::new(&command.program)
        .args(&command.args)
        .status()
        .map_err(|source| LaunchError::Spawn {
            command: command.to_string(),
            source,
        })?;
    std::process::exit(status.code().unwrap_or(1));
}

/// Spawns a supervised service process with inherited stdio.
///
/// The returned child keeps running if its handle is dropped; stopping the
/// harness never cascades into started services.
pub fn spawn_service(command: &CommandLine) -> Result<tokio::process::Child, LaunchError> {
    tokio::process::Command::new(&command.program)
        .args(&command.args)
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            command: command.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_argv_splits_program_and_args() {
        let cmd = CommandLine::from_argv(&["pg_isready", "-U", "app"]).unwrap();
        assert_eq!(cmd.program, "pg_isready");
        assert_eq!(cmd.args, vec!["-U", "app"]);
        assert_eq!(cmd.to_string(), "pg_isready -U app");
    }

    #[test]
    fn from_argv_rejects_empty() {
        assert!(CommandLine::from_argv::<&str>(&[]).is_none());
    }
}
