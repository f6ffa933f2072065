//! Event subscribers for the bootvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! machinery, and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Actors ── publish(Event) ──► Bus ──► Supervisor listener ──► SubscriberSet
//!                                                                   │
//!                                                      ┌────────────┼───────────┐
//!                                                      ▼            ▼           ▼
//!                                                 [queue S1]   [queue S2] ... [queue SN]
//!                                                 worker S1    worker S2      worker SN
//!                                                      ▼            ▼           ▼
//!                                                 on_event()   on_event()   on_event()
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
