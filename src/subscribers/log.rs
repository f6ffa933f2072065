//! # Logging subscriber for debugging and demos.
//!
//! [`LogWriter`] forwards events to the `log` facade in a human-readable
//! format. Wire up `env_logger` (or any other `log` backend) to see them.
//!
//! ## Output format
//! ```text
//! [rendered] service=api path=/etc/app/app.conf
//! [launching] service=api
//! [started] service=api
//! [probe-failed] service=db attempt=3 reason="exit status: 1"
//! [healthy] service=db attempt=4
//! [skipped] service=api upstream=db
//! [shutdown-requested]
//! [all-stopped-within-grace]
//! ```
//!
//! ## Example
//! ```no_run
//! # use std::sync::Arc;
//! # use bootvisor::{Config, LogWriter, Subscribe, Supervisor};
//! let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
//! let supervisor = Supervisor::new(Config::default(), subs);
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Human-readable logging subscriber.
///
/// Maps lifecycle events to `info!`, recoverable trouble to `warn!`, and
/// terminal failures to `error!`. Implement a custom [`Subscribe`] for
/// structured output or metrics collection.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let service = e.service.as_deref().unwrap_or("?");
        match e.kind {
            EventKind::RenderCompleted => {
                log::info!(
                    "[rendered] service={service} path={}",
                    e.path.as_deref().unwrap_or("?")
                );
            }
            EventKind::RenderFailed => {
                log::error!(
                    "[render-failed] service={service} reason={:?}",
                    e.reason.as_deref().unwrap_or("")
                );
            }
            EventKind::ServiceLaunching => {
                log::info!("[launching] service={service}");
            }
            EventKind::ServiceStarted => {
                log::info!("[started] service={service}");
            }
            EventKind::LaunchFailed => {
                log::error!(
                    "[launch-failed] service={service} reason={:?}",
                    e.reason.as_deref().unwrap_or("")
                );
            }
            EventKind::ProbeFailed => {
                log::warn!(
                    "[probe-failed] service={service} attempt={:?} reason={:?}",
                    e.attempt,
                    e.reason.as_deref().unwrap_or("")
                );
            }
            EventKind::ServiceHealthy => {
                log::info!("[healthy] service={service} attempt={:?}", e.attempt);
            }
            EventKind::ServiceUnhealthy => {
                log::error!("[unhealthy] service={service} attempt={:?}", e.attempt);
            }
            EventKind::ServiceSkipped => {
                log::warn!(
                    "[skipped] service={service} upstream={}",
                    e.upstream.as_deref().unwrap_or("?")
                );
            }
            EventKind::ShutdownRequested => {
                log::info!("[shutdown-requested]");
            }
            EventKind::AllStoppedWithin => {
                log::info!("[all-stopped-within-grace]");
            }
            EventKind::GraceExceeded => {
                log::error!("[grace-exceeded]");
            }
            EventKind::SubscriberOverflow => {
                log::warn!(
                    "[subscriber-overflow] subscriber={service} reason={:?}",
                    e.reason.as_deref().unwrap_or("")
                );
            }
            EventKind::SubscriberPanicked => {
                log::error!(
                    "[subscriber-panicked] subscriber={service} info={:?}",
                    e.reason.as_deref().unwrap_or("")
                );
            }
        }
    }
}
