//! [`LoopThrottle`] – power-conserving tick pacing.
//!
//! Most devices gain nothing from ticking as fast as the CPU allows, and
//! every busy-spin costs power.  After each tick the throttle idles for
//! whatever is left of the target interval:
//!
//! ```text
//! idle = max(0, interval − elapsed)      // unless a high-frequency request is active
//! ```
//!
//! Components that genuinely need fast ticks (bit-banged protocols, fast
//! light transitions) hold a [`HighFrequencyLoopRequester`] and call
//! [`start`][HighFrequencyLoopRequester::start] while they need it.  As long
//! as at least one requester is started, idling is skipped entirely.
//!
//! # Example
//!
//! ```rust
//! use cadence_runtime::throttle::{HighFrequencyLoop, LoopThrottle};
//!
//! let throttle = LoopThrottle::default();
//! let high_frequency = HighFrequencyLoop::new();
//!
//! assert_eq!(throttle.idle_for(5, high_frequency.is_high_frequency()), 11);
//!
//! let mut requester = high_frequency.requester();
//! requester.start();
//! assert_eq!(throttle.idle_for(5, high_frequency.is_high_frequency()), 0);
//! ```

use std::cell::Cell;
use std::rc::Rc;

/// Default target tick interval in milliseconds.
pub const DEFAULT_LOOP_INTERVAL_MS: u32 = 16;

/// Computes how long to idle at the tail of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopThrottle {
    interval_ms: u32,
}

impl Default for LoopThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_LOOP_INTERVAL_MS)
    }
}

impl LoopThrottle {
    pub fn new(interval_ms: u32) -> Self {
        Self { interval_ms }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn set_interval_ms(&mut self, interval_ms: u32) {
        self.interval_ms = interval_ms;
    }

    /// Idle time for a tick that took `elapsed_ms`.  Never negative; zero
    /// whenever `high_frequency` is set.
    pub fn idle_for(&self, elapsed_ms: u32, high_frequency: bool) -> u32 {
        if high_frequency {
            return 0;
        }
        self.interval_ms.saturating_sub(elapsed_ms)
    }
}

/// Shared count of active high-frequency requests.  Clones share the count.
#[derive(Debug, Clone, Default)]
pub struct HighFrequencyLoop {
    requesters: Rc<Cell<u32>>,
}

impl HighFrequencyLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new, not-yet-started requester bound to this counter.
    pub fn requester(&self) -> HighFrequencyLoopRequester {
        HighFrequencyLoopRequester {
            shared: self.clone(),
            started: false,
        }
    }

    /// `true` while at least one requester is started.
    pub fn is_high_frequency(&self) -> bool {
        self.requesters.get() > 0
    }

    pub fn active_requesters(&self) -> u32 {
        self.requesters.get()
    }
}

/// One component's claim on high-frequency ticking.
///
/// `start` and `stop` are idempotent per requester, so a component can call
/// them every tick.  Dropping a started requester releases its claim.
#[derive(Debug)]
pub struct HighFrequencyLoopRequester {
    shared: HighFrequencyLoop,
    started: bool,
}

impl HighFrequencyLoopRequester {
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        let count = &self.shared.requesters;
        count.set(count.get() + 1);
        self.started = true;
    }

    pub fn stop(&mut self) {
        if !self.started {
            return;
        }
        let count = &self.shared.requesters;
        count.set(count.get().saturating_sub(1));
        self.started = false;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl Drop for HighFrequencyLoopRequester {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn under_budget_tick_idles_the_remainder() {
        let throttle = LoopThrottle::new(16);
        assert_eq!(throttle.idle_for(5, false), 11);
        assert_eq!(throttle.idle_for(0, false), 16);
    }

    #[test]
    fn over_budget_tick_never_idles() {
        let throttle = LoopThrottle::new(16);
        assert_eq!(throttle.idle_for(16, false), 0);
        assert_eq!(throttle.idle_for(20, false), 0);
    }

    #[test]
    fn high_frequency_skips_idle() {
        let throttle = LoopThrottle::new(16);
        assert_eq!(throttle.idle_for(1, true), 0);
    }

    #[test]
    fn interval_is_configurable() {
        let mut throttle = LoopThrottle::default();
        assert_eq!(throttle.interval_ms(), DEFAULT_LOOP_INTERVAL_MS);
        throttle.set_interval_ms(50);
        assert_eq!(throttle.idle_for(20, false), 30);
    }

    #[test]
    fn requesters_are_additive() {
        let hf = HighFrequencyLoop::new();
        let mut a = hf.requester();
        let mut b = hf.requester();
        a.start();
        b.start();
        assert_eq!(hf.active_requesters(), 2);
        a.stop();
        assert!(hf.is_high_frequency());
        b.stop();
        assert!(!hf.is_high_frequency());
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let hf = HighFrequencyLoop::new();
        let mut a = hf.requester();
        a.start();
        a.start();
        assert_eq!(hf.active_requesters(), 1);
        a.stop();
        a.stop();
        assert_eq!(hf.active_requesters(), 0);
    }

    #[test]
    fn dropping_started_requester_releases_it() {
        let hf = HighFrequencyLoop::new();
        {
            let mut a = hf.requester();
            a.start();
            assert!(hf.is_high_frequency());
        }
        assert!(!hf.is_high_frequency());
    }
}
