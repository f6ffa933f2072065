//! Per-service bootstrap outcomes and the aggregate run report.

use std::collections::BTreeMap;
use std::fmt;

/// Terminal outcome of one service's bootstrap.
///
/// Every spawned actor produces exactly one outcome; the supervisor collects
/// them into a [`Report`]. An outcome is recorded as soon as the service
/// settles, even if its actor keeps monitoring afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServiceOutcome {
    /// The probe succeeded within the retry budget.
    Healthy {
        /// 1-based attempt on which the probe first succeeded.
        attempts: u32,
    },
    /// The service has no probe; it was started (or had nothing to start)
    /// and its gate opened immediately.
    Started,
    /// The probe never succeeded within the retry budget.
    Unhealthy {
        /// Total failed attempts (equals the budget).
        attempts: u32,
    },
    /// Never attempted: a direct upstream failed to become healthy.
    Skipped {
        /// The upstream whose failure caused the skip.
        upstream: String,
    },
    /// Config rendering failed; the command was never launched.
    RenderFailed {
        /// Rendered error message.
        error: String,
    },
    /// The start command could not be spawned.
    LaunchFailed {
        /// Rendered error message.
        error: String,
    },
    /// Shutdown was requested before the service settled.
    Canceled,
}

impl ServiceOutcome {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceOutcome::Healthy { .. } => "healthy",
            ServiceOutcome::Started => "started",
            ServiceOutcome::Unhealthy { .. } => "unhealthy",
            ServiceOutcome::Skipped { .. } => "skipped_due_to_upstream_failure",
            ServiceOutcome::RenderFailed { .. } => "render_failed",
            ServiceOutcome::LaunchFailed { .. } => "launch_failed",
            ServiceOutcome::Canceled => "canceled",
        }
    }

    /// True for the success outcomes ([`Healthy`](Self::Healthy) and
    /// [`Started`](Self::Started)).
    pub fn is_ok(&self) -> bool {
        matches!(
            self,
            ServiceOutcome::Healthy { .. } | ServiceOutcome::Started
        )
    }
}

impl fmt::Display for ServiceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceOutcome::Healthy { attempts } => {
                write!(f, "healthy (attempt {attempts})")
            }
            ServiceOutcome::Started => write!(f, "started"),
            ServiceOutcome::Unhealthy { attempts } => {
                write!(f, "unhealthy after {attempts} attempts")
            }
            ServiceOutcome::Skipped { upstream } => {
                write!(f, "skipped due to upstream failure: {upstream}")
            }
            ServiceOutcome::RenderFailed { error } => write!(f, "render failed: {error}"),
            ServiceOutcome::LaunchFailed { error } => write!(f, "launch failed: {error}"),
            ServiceOutcome::Canceled => write!(f, "canceled"),
        }
    }
}

/// Aggregate result of one supervisor run: one outcome per declared service.
///
/// Sorted by service name, so iteration and [`Display`](fmt::Display) output
/// are deterministic.
#[derive(Clone, Debug, Default)]
pub struct Report {
    outcomes: BTreeMap<String, ServiceOutcome>,
}

impl Report {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome for one service.
    pub(crate) fn insert(&mut self, service: impl Into<String>, outcome: ServiceOutcome) {
        self.outcomes.insert(service.into(), outcome);
    }

    /// Looks up one service's outcome.
    pub fn get(&self, service: &str) -> Option<&ServiceOutcome> {
        self.outcomes.get(service)
    }

    /// Number of services accounted for.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// True if no service is accounted for.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// True when every service settled successfully.
    pub fn is_success(&self) -> bool {
        self.outcomes.values().all(ServiceOutcome::is_ok)
    }

    /// Iterates over the non-success outcomes, by service name.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ServiceOutcome)> {
        self.outcomes
            .iter()
            .filter(|(_, o)| !o.is_ok())
            .map(|(n, o)| (n.as_str(), o))
    }

    /// Iterates over all outcomes, by service name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ServiceOutcome)> {
        self.outcomes.iter().map(|(n, o)| (n.as_str(), o))
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, outcome) in &self.outcomes {
            writeln!(f, "{name}: {outcome}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_requires_all_ok() {
        let mut report = Report::new();
        report.insert("a", ServiceOutcome::Healthy { attempts: 1 });
        report.insert("b", ServiceOutcome::Started);
        assert!(report.is_success());

        report.insert(
            "c",
            ServiceOutcome::Skipped {
                upstream: "a".into(),
            },
        );
        assert!(!report.is_success());
        let failures: Vec<&str> = report.failures().map(|(n, _)| n).collect();
        assert_eq!(failures, vec!["c"]);
    }

    #[test]
    fn skip_label_names_the_upstream_failure() {
        let outcome = ServiceOutcome::Skipped {
            upstream: "db".into(),
        };
        assert_eq!(outcome.as_label(), "skipped_due_to_upstream_failure");
        assert_eq!(outcome.to_string(), "skipped due to upstream failure: db");
    }

    #[test]
    fn display_is_sorted_by_name() {
        let mut report = Report::new();
        report.insert("zeta", ServiceOutcome::Started);
        report.insert("alpha", ServiceOutcome::Healthy { attempts: 2 });
        let text = report.to_string();
        let alpha = text.find("alpha").unwrap();
        let zeta = text.find("zeta").unwrap();
        assert!(alpha < zeta);
    }
}
