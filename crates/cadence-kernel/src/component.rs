//! The [`Component`] trait and everything a component sees while it runs.
//!
//! A component is a functional unit of the firmware (a sensor driver, a
//! network stack, a status LED, …).  The registry calls its hooks in a fixed
//! order:
//!
//! ```text
//! Registered ──setup()──▶ Initialized ──classify──▶ Active  (polled every tick)
//!                                              └──▶ Dormant (never polled)
//!                          … ──on_safe_shutdown()──▶ Preparing ──on_shutdown()──▶ Finalized
//! ```
//!
//! Hooks report failure by returning `Err`; the registry records it and moves
//! on to the next component.

use cadence_hal::Board;
use cadence_types::{AppState, CadenceError};
use serde::{Deserialize, Serialize};

use crate::domains::EntityRegistries;

/// Stable handle to a registered component (its registration index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub(crate) usize);

impl ComponentId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Per-component lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Added to the registry; setup has not run yet.
    Registered,
    /// Setup hook has run (successfully or not).
    Initialized,
    /// In the looping subset; polled every tick.
    Active,
    /// Opted out of periodic execution.
    Dormant,
    /// First shutdown pass has run.
    Preparing,
    /// Final shutdown hook has run.
    Finalized,
}

/// Status flags a component carries for its whole lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub failed: bool,
    pub warning: bool,
}

impl ComponentStatus {
    /// The [`AppState`] bits this status contributes.
    pub fn app_state_bits(self) -> u32 {
        let mut bits = 0;
        if self.failed {
            bits |= AppState::ERROR;
        }
        if self.warning {
            bits |= AppState::WARNING;
        }
        bits
    }
}

/// How a component asked the device to restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebootKind {
    /// Restart without notifying anyone.
    Immediate,
    /// Run the two-pass shutdown first.
    Safe,
}

/// Functional unit driven by the [`ComponentRegistry`][crate::ComponentRegistry].
///
/// Only [`name`][Component::name] is required; every hook defaults to a
/// no-op so a component implements just what it needs.
pub trait Component {
    /// Name used in logs and config dumps.
    fn name(&self) -> &str;

    /// One-time initialisation, called in registration order.
    ///
    /// # Errors
    ///
    /// Returning `Err` marks the component failed.  Other components are
    /// still set up.
    fn setup(&mut self, _ctx: &mut Context<'_>) -> Result<(), CadenceError> {
        Ok(())
    }

    /// Periodic hook, called once per tick while the component is active and
    /// not failed.
    ///
    /// # Errors
    ///
    /// Returning `Err` marks the component failed; it is not polled again.
    fn on_loop(&mut self, _ctx: &mut Context<'_>) -> Result<(), CadenceError> {
        Ok(())
    }

    /// Whether this component wants its periodic hook called.  Read once,
    /// right after setup.
    fn needs_loop(&self) -> bool {
        true
    }

    /// Priority hint, reported in config dumps.  Does not affect ordering.
    fn priority_hint(&self) -> f32 {
        0.0
    }

    /// First shutdown pass: flush state while every peer is still live.
    fn on_safe_shutdown(&mut self) {}

    /// Second shutdown pass: final teardown.
    fn on_shutdown(&mut self) {}

    /// Log this component's configuration.
    fn dump_config(&self) {}
}

/// What a component can reach from inside a hook.
pub struct Context<'a> {
    pub(crate) board: &'a mut Board,
    pub(crate) entities: &'a mut EntityRegistries,
    pub(crate) status: &'a mut ComponentStatus,
    pub(crate) reboot: &'a mut Option<RebootKind>,
    pub(crate) app_state: AppState,
}

impl<'a> Context<'a> {
    /// Build a context by hand, e.g. to unit-test a component's hooks.
    pub fn new(
        board: &'a mut Board,
        entities: &'a mut EntityRegistries,
        status: &'a mut ComponentStatus,
        reboot: &'a mut Option<RebootKind>,
    ) -> Self {
        Self {
            board,
            entities,
            status,
            reboot,
            app_state: AppState::new(),
        }
    }

    /// Attach a snapshot of the device-wide app state as of hook entry.
    pub fn with_app_state(mut self, app_state: AppState) -> Self {
        self.app_state = app_state;
        self
    }

    /// Milliseconds since boot.
    pub fn millis(&self) -> u32 {
        self.board.millis()
    }

    /// Feed the watchdog from inside a long-running hook.
    pub fn feed_wdt(&mut self) {
        self.board.feed_wdt();
    }

    /// The device's entity registries.  Registration is accepted until setup
    /// completes.
    pub fn entities(&mut self) -> &mut EntityRegistries {
        &mut *self.entities
    }

    /// Mark this component failed.  Equivalent to returning `Err`.
    pub fn mark_failed(&mut self) {
        self.status.failed = true;
    }

    pub fn status_set_warning(&mut self) {
        self.status.warning = true;
    }

    /// Clear this component's warning flag.  The device-wide app-state bit
    /// stays set until it is reset explicitly.
    pub fn status_clear_warning(&mut self) {
        self.status.warning = false;
    }

    pub fn status(&self) -> ComponentStatus {
        *self.status
    }

    /// Device-wide app state as it was when this hook started.
    pub fn app_state(&self) -> AppState {
        self.app_state
    }

    /// Ask for a restart once the current hook returns.
    pub fn request_reboot(&mut self, kind: RebootKind) {
        *self.reboot = Some(kind);
    }
}
