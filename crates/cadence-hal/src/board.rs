//! [`Board`] – the platform handed to the application.
//!
//! A board bundles one driver per platform concern.  Construct it with
//! [`Board::builder`]; any driver left unset falls back to the hosted
//! default from [`host`][crate::host].
//!
//! ```
//! use cadence_hal::Board;
//!
//! let mut board = Board::builder().build();
//! board.feed_wdt();
//! let _ = board.millis();
//! ```

use cadence_types::{CadenceError, MacAddress};

use crate::chip::{FixedMac, MacSource, Reset};
use crate::clock::Clock;
use crate::host::{DEFAULT_MAC, ProcessReset, StdClock, default_watchdog};
use crate::preferences::{MemoryPreferences, PreferenceStore};
use crate::watchdog::{Watchdog, WatchdogFeeder};

/// The platform drivers the runtime relies on.
pub struct Board {
    clock: Box<dyn Clock>,
    watchdog: WatchdogFeeder,
    mac: Box<dyn MacSource>,
    reset: Box<dyn Reset>,
    preferences: Box<dyn PreferenceStore>,
}

impl Board {
    pub fn builder() -> BoardBuilder {
        BoardBuilder::default()
    }

    /// Milliseconds since boot.
    pub fn millis(&self) -> u32 {
        self.clock.millis()
    }

    /// Block for `ms` milliseconds.
    pub fn delay(&mut self, ms: u32) {
        self.clock.delay(ms);
    }

    /// Rate-limited watchdog feed.  Returns `true` when the hardware was fed.
    pub fn feed_wdt(&mut self) -> bool {
        let now = self.clock.millis();
        self.watchdog.feed(now)
    }

    pub fn mac_address(&self) -> MacAddress {
        self.mac.mac_address()
    }

    pub fn restart(&mut self) {
        self.reset.restart();
    }

    /// Open the persisted-preferences store.
    ///
    /// # Errors
    ///
    /// Propagates the store's [`CadenceError::Preferences`].
    pub fn begin_preferences(&mut self) -> Result<(), CadenceError> {
        self.preferences.begin()
    }
}

/// Builder for [`Board`].
#[derive(Default)]
pub struct BoardBuilder {
    clock: Option<Box<dyn Clock>>,
    watchdog: Option<Box<dyn Watchdog>>,
    mac: Option<Box<dyn MacSource>>,
    reset: Option<Box<dyn Reset>>,
    preferences: Option<Box<dyn PreferenceStore>>,
}

impl BoardBuilder {
    pub fn clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn watchdog(mut self, watchdog: Box<dyn Watchdog>) -> Self {
        self.watchdog = Some(watchdog);
        self
    }

    pub fn mac_source(mut self, mac: Box<dyn MacSource>) -> Self {
        self.mac = Some(mac);
        self
    }

    /// Shorthand for a [`FixedMac`] source.
    pub fn mac_address(self, mac: MacAddress) -> Self {
        self.mac_source(Box::new(FixedMac(mac)))
    }

    pub fn reset(mut self, reset: Box<dyn Reset>) -> Self {
        self.reset = Some(reset);
        self
    }

    pub fn preferences(mut self, preferences: Box<dyn PreferenceStore>) -> Self {
        self.preferences = Some(preferences);
        self
    }

    pub fn build(self) -> Board {
        Board {
            clock: self.clock.unwrap_or_else(|| Box::new(StdClock::new())),
            watchdog: WatchdogFeeder::new(self.watchdog.unwrap_or_else(default_watchdog)),
            mac: self.mac.unwrap_or_else(|| Box::new(FixedMac(DEFAULT_MAC))),
            reset: self.reset.unwrap_or_else(|| Box::new(ProcessReset)),
            preferences: self
                .preferences
                .unwrap_or_else(|| Box::new(MemoryPreferences::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_board_uses_default_mac() {
        let board = Board::builder().build();
        assert_eq!(board.mac_address(), DEFAULT_MAC);
    }

    #[test]
    fn builder_overrides_mac() {
        let mac = MacAddress::new([0xAA, 0xBB, 0xCC, 0x11, 0x22, 0x33]);
        let board = Board::builder().mac_address(mac).build();
        assert_eq!(board.mac_address().suffix(), "112233");
    }

    #[test]
    fn default_board_begins_preferences() {
        let mut board = Board::builder().build();
        assert!(board.begin_preferences().is_ok());
    }
}
