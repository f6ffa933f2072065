//! # YAML service manifest.
//!
//! A [`Manifest`] declares a whole stack the way the deployment's compose file
//! did: per-service start command, health probe, render steps, and upstream
//! dependencies, plus stack-wide probe defaults.
//!
//! ```yaml
//! defaults:
//!   probe_interval_ms: 1000
//!   probe_retries: 30
//!   probe_timeout_ms: 5000
//! services:
//!   db:
//!     command: ["postgres", "-D", "/var/lib/pg"]
//!     render:
//!       - template: /etc/templates/pg.conf.tpl
//!         target: /etc/pg/pg.conf
//!     probe:
//!       command: ["pg_isready", "-U", "app"]
//!   cache:
//!     command: ["redis-server"]
//!     probe:
//!       command: ["redis-cli", "ping"]
//!       retries: 10
//!   api:
//!     command: ["uvicorn", "main:app"]
//!     depends_on: [db, cache]
//! ```
//!
//! ## Rules
//! - Services iterate in name order (BTreeMap): output and validation are
//!   deterministic regardless of declaration order.
//! - An absent or empty `command` means the process is managed elsewhere
//!   (probe-only entry); an absent `probe` means "up once spawned".
//! - A declared `probe` must carry a non-empty command; an empty one is
//!   rejected as [`ManifestError::EmptyProbe`] rather than silently ignored.
//! - `probe.timeout_ms: 0` disables the per-attempt timeout.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::config::Config;
use crate::error::ManifestError;
use crate::launch::CommandLine;
use crate::probes::{CommandProbe, ProbePolicy};
use crate::services::ServiceSpec;

/// Whole-stack declaration loaded from YAML.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Stack-wide probe defaults, overriding [`Config`] values when set.
    #[serde(default)]
    pub defaults: ManifestDefaults,
    /// Services by name.
    pub services: BTreeMap<String, ManifestService>,
}

/// Stack-wide probe defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestDefaults {
    /// Default interval between probe attempts, milliseconds.
    pub probe_interval_ms: Option<u64>,
    /// Default probe retry budget.
    pub probe_retries: Option<u32>,
    /// Default per-attempt probe timeout, milliseconds (`0` = none).
    pub probe_timeout_ms: Option<u64>,
}

/// One service entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestService {
    /// Start command argv; empty = the process is managed elsewhere.
    #[serde(default)]
    pub command: Vec<String>,
    /// Upstream service names that must be healthy first.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Health probe; absent = up once spawned.
    pub probe: Option<ManifestProbe>,
    /// Templates rendered before the command runs, in order.
    #[serde(default)]
    pub render: Vec<ManifestRender>,
}

/// Probe declaration for one service.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestProbe {
    /// Probe command argv; exit status 0 = healthy.
    pub command: Vec<String>,
    /// Interval override, milliseconds.
    pub interval_ms: Option<u64>,
    /// Retry budget override.
    pub retries: Option<u32>,
    /// Per-attempt timeout override, milliseconds (`0` = none).
    pub timeout_ms: Option<u64>,
}

/// One template→target pair.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestRender {
    /// Template file.
    pub template: PathBuf,
    /// Rendered target path.
    pub target: PathBuf,
}

impl Manifest {
    /// Loads and parses a manifest file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Converts the manifest into ServiceSpecs, merging probe policies:
    /// [`Config`] defaults ← manifest `defaults` ← per-probe overrides.
    ///
    /// A declared probe with an empty command is
    /// [`ManifestError::EmptyProbe`]: dropping it would let dependents gate
    /// open against a service nothing ever verified.
    pub fn into_specs(self, cfg: &Config) -> Result<Vec<ServiceSpec>, ManifestError> {
        let mut base = cfg.probe_policy();
        if let Some(ms) = self.defaults.probe_interval_ms {
            base.interval = Duration::from_millis(ms);
        }
        if let Some(n) = self.defaults.probe_retries {
            base.retries = n;
        }
        if let Some(ms) = self.defaults.probe_timeout_ms {
            base.timeout = timeout_from_ms(ms);
        }

        let mut specs = Vec::with_capacity(self.services.len());
        for (name, svc) in self.services {
            let probe = match svc.probe {
                Some(probe) => {
                    let cmd = CommandLine::from_argv(&probe.command).ok_or_else(|| {
                        ManifestError::EmptyProbe {
                            service: name.clone(),
                        }
                    })?;
                    let mut policy = base;
                    if let Some(ms) = probe.interval_ms {
                        policy.interval = Duration::from_millis(ms);
                    }
                    if let Some(n) = probe.retries {
                        policy.retries = n;
                    }
                    if let Some(ms) = probe.timeout_ms {
                        policy.timeout = timeout_from_ms(ms);
                    }
                    Some((cmd, policy))
                }
                None => None,
            };

            let mut builder = ServiceSpec::builder(name)
                .depends_on(svc.depends_on)
                .command(&svc.command);
            for step in svc.render {
                builder = builder.render(step.template, step.target);
            }
            if let Some((cmd, policy)) = probe {
                builder = builder.probe(CommandProbe::arc(cmd)).policy(policy);
            }
            specs.push(builder.build());
        }
        Ok(specs)
    }
}

/// `0` is the "no timeout" sentinel, like [`Config::probe_timeout`].
fn timeout_from_ms(ms: u64) -> Option<Duration> {
    if ms == 0 {
        None
    } else {
        Some(Duration::from_millis(ms))
    }
}
