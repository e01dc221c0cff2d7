//! Generic `Clock` trait: the platform's millisecond tick counter.

/// Monotonic millisecond time source with a blocking delay.
///
/// `millis` wraps around at `u32::MAX` like a microcontroller tick counter;
/// callers compute durations with `wrapping_sub`.
pub trait Clock {
    /// Milliseconds since boot.
    fn millis(&self) -> u32;

    /// Block the (single) execution thread for `ms` milliseconds.
    fn delay(&mut self, ms: u32);
}
