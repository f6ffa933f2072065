//! # Health state publication.
//!
//! Per service, health is a small state machine published through a
//! `tokio::sync::watch` channel: one writer (the service's own actor), many
//! readers (everything gated on it). Watch gives atomic state publication and
//! a blocking-without-busy-spin wait, so no extra locking is needed.
//!
//! ## Transitions
//! ```text
//! Unknown ──first probe attempt──► Pending ──first success──► Healthy (latched)
//!                                     │
//!                                     └──budget exhausted / render or launch
//!                                        failure / upstream failure──► UnhealthyTerminal
//! ```
//!
//! `Healthy` is never downgraded: post-healthy probe failures are visibility
//! events only, and dependents that already started stay started.

use std::collections::HashMap;

use tokio::sync::watch;

/// Gating health of one service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthState {
    /// No probe attempt has run yet.
    Unknown,
    /// Probing is underway; no success yet.
    Pending,
    /// First probe success observed (or probe-less service started). Latched.
    Healthy,
    /// Retry budget exhausted, or the service failed before probing could
    /// succeed. Dependents must never start.
    UnhealthyTerminal,
}

impl HealthState {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HealthState::Unknown => "unknown",
            HealthState::Pending => "pending",
            HealthState::Healthy => "healthy",
            HealthState::UnhealthyTerminal => "unhealthy_terminal",
        }
    }

    /// True for the two states a gate wait can end on.
    pub fn is_settled(&self) -> bool {
        matches!(self, HealthState::Healthy | HealthState::UnhealthyTerminal)
    }
}

/// Construction-time map of per-service health channels.
///
/// The supervisor builds one board per run: gate receivers are subscribed
/// first ([`HealthBoard::watch`]), then each actor takes its own sender
/// ([`HealthBoard::take`]) — enforcing the single-writer discipline by
/// construction.
pub struct HealthBoard {
    channels: HashMap<String, watch::Sender<HealthState>>,
}

impl HealthBoard {
    /// Creates a board with one channel per service, all `Unknown`.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let channels = names
            .into_iter()
            .map(|n| (n.into(), watch::channel(HealthState::Unknown).0))
            .collect();
        Self { channels }
    }

    /// Subscribes a reader to a service's health. `None` for unknown names.
    pub fn watch(&self, name: &str) -> Option<watch::Receiver<HealthState>> {
        self.channels.get(name).map(watch::Sender::subscribe)
    }

    /// Removes and returns the single writer for a service's health.
    pub fn take(&mut self, name: &str) -> Option<watch::Sender<HealthState>> {
        self.channels.remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_starts_unknown_and_publishes() {
        let mut board = HealthBoard::new(["db"]);
        let rx = board.watch("db").unwrap();
        assert_eq!(*rx.borrow(), HealthState::Unknown);

        let tx = board.take("db").unwrap();
        tx.send_replace(HealthState::Healthy);
        assert_eq!(*rx.borrow(), HealthState::Healthy);

        assert!(board.watch("db").is_none());
        assert!(board.take("db").is_none());
    }

    #[test]
    fn settled_states() {
        assert!(!HealthState::Unknown.is_settled());
        assert!(!HealthState::Pending.is_settled());
        assert!(HealthState::Healthy.is_settled());
        assert!(HealthState::UnhealthyTerminal.is_settled());
    }
}
