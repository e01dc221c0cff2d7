//! Drivers for running the runtime as an ordinary host process.
//!
//! | Concern | Host behaviour |
//! |---|---|
//! | [`Clock`] | [`StdClock`]: `Instant`-based millis, `thread::sleep` delay. |
//! | [`Watchdog`] | [`SoftwareWatchdog`] with [`DEFAULT_WATCHDOG_TIMEOUT`]. |
//! | [`Reset`] | [`ProcessReset`]: exits the process so a supervisor restarts it. |

use std::thread;
use std::time::{Duration, Instant};

use cadence_types::MacAddress;
use tracing::info;

use crate::chip::Reset;
use crate::clock::Clock;
use crate::watchdog::{SoftwareWatchdog, Watchdog};

/// Locally administered placeholder address used when none is configured.
pub const DEFAULT_MAC: MacAddress = MacAddress::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);

/// Software watchdog timeout used by [`default_watchdog`].
pub const DEFAULT_WATCHDOG_TIMEOUT: Duration = Duration::from_secs(5);

/// Exit status reported by [`ProcessReset`].  Nonzero so supervisors that
/// only restart failed units (`Restart=on-failure`) bring the device back.
/// `EX_TEMPFAIL` from `sysexits.h`.
pub const RESTART_EXIT_CODE: i32 = 75;

pub(crate) fn default_watchdog() -> Box<dyn Watchdog> {
    Box::new(SoftwareWatchdog::new(DEFAULT_WATCHDOG_TIMEOUT))
}

/// Wall-clock [`Clock`] measured from construction.
pub struct StdClock {
    boot: Instant,
}

impl StdClock {
    pub fn new() -> Self {
        Self {
            boot: Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StdClock {
    fn millis(&self) -> u32 {
        // Truncation gives the same wrap-around as a 32-bit tick counter.
        self.boot.elapsed().as_millis() as u32
    }

    fn delay(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

/// [`Reset`] that ends the process.
pub struct ProcessReset;

impl Reset for ProcessReset {
    fn restart(&mut self) {
        info!(code = RESTART_EXIT_CODE, "restarting: exiting process");
        std::process::exit(RESTART_EXIT_CODE);
    }
}
