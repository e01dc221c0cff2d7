//! `cadence-hal` – Hardware Abstraction Layer
//!
//! The runtime never talks to a chip directly.  Everything it needs from the
//! platform is expressed as a small trait and collected into a [`Board`].
//!
//! # Modules
//!
//! - [`clock`] – [`Clock`]: monotonic millisecond counter and blocking delay.
//! - [`watchdog`] – [`Watchdog`]: the hardware watchdog seam,
//!   [`WatchdogFeeder`] (rate-limited feeding) and [`SoftwareWatchdog`] for
//!   hosted builds that have no hardware timer.
//! - [`chip`] – [`MacSource`] and [`Reset`]: hardware identity and restart.
//! - [`preferences`] – [`PreferenceStore`]: the persisted-preferences
//!   collaborator, begun once before component setup.
//! - [`board`] – [`Board`]: the aggregate handed to the application.
//! - [`host`] – drivers for running on a desktop/server process.
//! - [`sim`] – [`SimBoard`][sim::SimBoard]: an in-process simulated board for
//!   tests, with a shared handle to inspect and drive it.

pub mod board;
pub mod chip;
pub mod clock;
pub mod host;
pub mod preferences;
pub mod sim;
pub mod watchdog;

pub use board::{Board, BoardBuilder};
pub use chip::{MacSource, Reset};
pub use clock::Clock;
pub use preferences::{MemoryPreferences, PreferenceStore};
pub use watchdog::{SoftwareWatchdog, Watchdog, WatchdogFeeder, WatchdogHealth};
