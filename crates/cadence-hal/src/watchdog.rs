//! [`Watchdog`] – hardware watchdog seam and feeding policy.
//!
//! The hardware resets the device when its countdown is not acknowledged
//! within a platform-defined timeout.  The runtime feeds it at the start of
//! every tick and between component setup hooks.
//!
//! Feeding is routed through a [`WatchdogFeeder`], which only touches the
//! hardware when more than [`FEED_MIN_INTERVAL_MS`] elapsed since the
//! previous feed, so `feed_wdt()` stays cheap inside tight loops.
//!
//! Hosted builds have no hardware timer; [`SoftwareWatchdog`] tracks the
//! time between feeds instead and reports starvation.

use std::time::{Duration, Instant};

use tracing::error;

/// Minimum spacing between two hardware feeds.
pub const FEED_MIN_INTERVAL_MS: u32 = 3;

/// A hardware watchdog countdown.
pub trait Watchdog {
    /// Reset the countdown.  Must be cheap and non-blocking.
    fn feed(&mut self);
}

// ────────────────────────────────────────────────────────────────────────────
// Feeder
// ────────────────────────────────────────────────────────────────────────────

/// Rate-limits feeds to the wrapped [`Watchdog`].
pub struct WatchdogFeeder {
    watchdog: Box<dyn Watchdog>,
    last_feed_ms: Option<u32>,
}

impl WatchdogFeeder {
    pub fn new(watchdog: Box<dyn Watchdog>) -> Self {
        Self {
            watchdog,
            last_feed_ms: None,
        }
    }

    /// Feed the hardware if more than [`FEED_MIN_INTERVAL_MS`] passed since
    /// the last hardware feed.  Returns `true` when the hardware was fed.
    pub fn feed(&mut self, now_ms: u32) -> bool {
        if let Some(last) = self.last_feed_ms
            && now_ms.wrapping_sub(last) <= FEED_MIN_INTERVAL_MS
        {
            return false;
        }
        self.watchdog.feed();
        self.last_feed_ms = Some(now_ms);
        true
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Software watchdog
// ────────────────────────────────────────────────────────────────────────────

/// Health state reported by a [`SoftwareWatchdog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogHealth {
    /// The last feed happened within the timeout.
    Healthy,
    /// The timeout elapsed without a feed.
    Starved,
}

/// Watchdog for hosted builds.
///
/// A real watchdog would reset the chip on starvation.  This one logs the
/// starvation on the next feed and counts it, so a harness can decide what
/// to do.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use cadence_hal::watchdog::{SoftwareWatchdog, Watchdog, WatchdogHealth};
///
/// let mut wd = SoftwareWatchdog::new(Duration::from_secs(1));
/// wd.feed();
///
/// assert_eq!(wd.health(), WatchdogHealth::Healthy);
/// ```
pub struct SoftwareWatchdog {
    timeout: Duration,
    last_feed: Instant,
    starvations: u32,
}

impl SoftwareWatchdog {
    /// Create a watchdog whose countdown starts now.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            last_feed: Instant::now(),
            starvations: 0,
        }
    }

    /// Current [`WatchdogHealth`].
    pub fn health(&self) -> WatchdogHealth {
        if self.last_feed.elapsed() <= self.timeout {
            WatchdogHealth::Healthy
        } else {
            WatchdogHealth::Starved
        }
    }

    /// Number of feeds that arrived after the timeout had already elapsed.
    pub fn starvations(&self) -> u32 {
        self.starvations
    }
}

impl Watchdog for SoftwareWatchdog {
    fn feed(&mut self) {
        let since = self.last_feed.elapsed();
        if since > self.timeout {
            self.starvations += 1;
            error!(
                starved_ms = since.as_millis() as u64,
                timeout_ms = self.timeout.as_millis() as u64,
                "watchdog starved; a hardware watchdog would have reset the device"
            );
        }
        self.last_feed = Instant::now();
    }
}
