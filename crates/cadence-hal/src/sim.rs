//! [`SimBoard`] – in-process simulated board for tests and CI.
//!
//! Builds a [`Board`] whose every driver is backed by shared simulation
//! state instead of hardware.  A [`SimHandle`] onto that state lets a test
//! move time forward and inspect what the runtime did.
//!
//! # Stub behaviour
//!
//! | Driver | Stub behaviour |
//! |---|---|
//! | [`Clock`] | `millis()` reads the simulated counter; `delay(ms)` records `ms` and advances the counter by it. |
//! | [`Watchdog`] | Counts hardware feeds. |
//! | [`Reset`] | Counts restart requests and returns. |
//! | [`PreferenceStore`] | Counts `begin` calls; can be told to fail. |
//! | [`MacSource`][crate::chip::MacSource] | Reports the configured address. |
//!
//! # Example
//!
//! ```rust
//! use cadence_hal::sim::SimBoard;
//!
//! let (mut board, sim) = SimBoard::builder().starting_at(1_000).build();
//!
//! board.delay(11);
//! assert_eq!(board.millis(), 1_011);
//! assert_eq!(sim.delays(), vec![11]);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use cadence_types::{CadenceError, MacAddress};

use crate::board::Board;
use crate::chip::Reset;
use crate::clock::Clock;
use crate::host::DEFAULT_MAC;
use crate::preferences::PreferenceStore;
use crate::watchdog::Watchdog;

#[derive(Debug, Default)]
struct SimState {
    now_ms: u32,
    delays: Vec<u32>,
    feeds: u32,
    restarts: u32,
    preference_begins: u32,
    fail_preferences: bool,
}

type Shared = Rc<RefCell<SimState>>;

// ─────────────────────────────────────────────────────────────────────────────
// Stub drivers
// ─────────────────────────────────────────────────────────────────────────────

struct SimClock(Shared);

impl Clock for SimClock {
    fn millis(&self) -> u32 {
        self.0.borrow().now_ms
    }

    fn delay(&mut self, ms: u32) {
        let mut state = self.0.borrow_mut();
        state.delays.push(ms);
        state.now_ms = state.now_ms.wrapping_add(ms);
    }
}

struct SimWatchdog(Shared);

impl Watchdog for SimWatchdog {
    fn feed(&mut self) {
        self.0.borrow_mut().feeds += 1;
    }
}

struct SimReset(Shared);

impl Reset for SimReset {
    fn restart(&mut self) {
        self.0.borrow_mut().restarts += 1;
    }
}

struct SimPreferences(Shared);

impl PreferenceStore for SimPreferences {
    fn begin(&mut self) -> Result<(), CadenceError> {
        let mut state = self.0.borrow_mut();
        state.preference_begins += 1;
        if state.fail_preferences {
            return Err(CadenceError::Preferences(
                "simulated flash unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handle
// ─────────────────────────────────────────────────────────────────────────────

/// Test-side view of a simulated board.  Clones share the same state.
#[derive(Clone)]
pub struct SimHandle(Shared);

impl SimHandle {
    /// Move simulated time forward, e.g. to model a slow component hook.
    pub fn advance(&self, ms: u32) {
        let mut state = self.0.borrow_mut();
        state.now_ms = state.now_ms.wrapping_add(ms);
    }

    pub fn now_ms(&self) -> u32 {
        self.0.borrow().now_ms
    }

    /// Every `delay` the board was asked for, in call order.
    pub fn delays(&self) -> Vec<u32> {
        self.0.borrow().delays.clone()
    }

    /// Number of hardware watchdog feeds.
    pub fn feeds(&self) -> u32 {
        self.0.borrow().feeds
    }

    pub fn restarts(&self) -> u32 {
        self.0.borrow().restarts
    }

    pub fn preference_begins(&self) -> u32 {
        self.0.borrow().preference_begins
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder that constructs a [`Board`] populated with simulation drivers.
#[derive(Default)]
pub struct SimBoard {
    start_ms: u32,
    mac: Option<MacAddress>,
    fail_preferences: bool,
}

impl SimBoard {
    pub fn builder() -> Self {
        Self::default()
    }

    /// Initial value of the simulated millisecond counter.
    pub fn starting_at(mut self, ms: u32) -> Self {
        self.start_ms = ms;
        self
    }

    pub fn with_mac(mut self, mac: MacAddress) -> Self {
        self.mac = Some(mac);
        self
    }

    /// Make `PreferenceStore::begin` fail.
    pub fn failing_preferences(mut self) -> Self {
        self.fail_preferences = true;
        self
    }

    pub fn build(self) -> (Board, SimHandle) {
        let shared: Shared = Rc::new(RefCell::new(SimState {
            now_ms: self.start_ms,
            fail_preferences: self.fail_preferences,
            ..SimState::default()
        }));
        let board = Board::builder()
            .clock(Box::new(SimClock(shared.clone())))
            .watchdog(Box::new(SimWatchdog(shared.clone())))
            .mac_address(self.mac.unwrap_or(DEFAULT_MAC))
            .reset(Box::new(SimReset(shared.clone())))
            .preferences(Box::new(SimPreferences(shared.clone())))
            .build();
        (board, SimHandle(shared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_advances_simulated_clock() {
        let (mut board, sim) = SimBoard::builder().build();
        board.delay(16);
        board.delay(4);
        assert_eq!(board.millis(), 20);
        assert_eq!(sim.delays(), vec![16, 4]);
    }

    #[test]
    fn handle_advance_is_visible_to_board() {
        let (board, sim) = SimBoard::builder().starting_at(100).build();
        sim.advance(7);
        assert_eq!(board.millis(), 107);
        assert_eq!(sim.now_ms(), 107);
    }

    #[test]
    fn feeds_are_rate_limited_through_the_board() {
        let (mut board, sim) = SimBoard::builder().build();
        assert!(board.feed_wdt());
        assert!(!board.feed_wdt());
        sim.advance(4);
        assert!(board.feed_wdt());
        assert_eq!(sim.feeds(), 2);
    }

    #[test]
    fn restart_is_recorded() {
        let (mut board, sim) = SimBoard::builder().build();
        board.restart();
        assert_eq!(sim.restarts(), 1);
    }

    #[test]
    fn failing_preferences_report_error() {
        let (mut board, sim) = SimBoard::builder().failing_preferences().build();
        assert!(matches!(
            board.begin_preferences(),
            Err(CadenceError::Preferences(_))
        ));
        assert_eq!(sim.preference_begins(), 1);
    }
}
