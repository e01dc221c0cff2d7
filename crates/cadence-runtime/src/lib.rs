//! `cadence-runtime` – The Device Application
//!
//! Ties the board, the component registry and the entity registries into one
//! explicit runtime context that the composition root builds once and then
//! drives forever.
//!
//! # Modules
//!
//! - [`application`] – [`Application`]: identity, registration, one-time
//!   setup, the throttled tick, app-state aggregation, watchdog feeding and
//!   the reboot paths.  Also the per-domain `register_*` / `get_*` /
//!   `get_*_by_key` accessors, compiled in only for enabled domains.
//! - [`identity`] – [`Identity`]: device name (optionally MAC-suffixed) and
//!   compilation timestamp, formed exactly once.
//! - [`throttle`] – [`LoopThrottle`] and the shared [`HighFrequencyLoop`]
//!   counter with its RAII [`HighFrequencyLoopRequester`].
//! - [`scheduler`] – the [`Scheduler`] seam dispatched once per tick.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: installs the
//!   global `tracing` subscriber (compact or JSON lines).
//!
//! # Single instance
//!
//! Nothing here is global.  The composition root owns the `Application` and
//! passes it where it is needed; components only ever see the
//! [`Context`][cadence_kernel::Context] handed to their hooks.

pub mod application;
pub mod identity;
pub mod scheduler;
pub mod telemetry;
pub mod throttle;

pub use application::Application;
pub use identity::Identity;
pub use scheduler::{NullScheduler, Scheduler};
pub use telemetry::{LogFormat, init_tracing};
pub use throttle::{
    DEFAULT_LOOP_INTERVAL_MS, HighFrequencyLoop, HighFrequencyLoopRequester, LoopThrottle,
};
