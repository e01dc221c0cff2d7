//! The scheduler seam.
//!
//! Timed callbacks (timeouts, intervals, retries) are owned by a scheduler
//! that lives outside the runtime.  The application only asks it, once per
//! tick and before any component runs, to dispatch whatever is due.

/// External time-ordered callback queue.
pub trait Scheduler {
    /// Run every callback due at or before `now_ms`.
    fn call(&mut self, now_ms: u32);
}

/// A scheduler with nothing scheduled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullScheduler;

impl Scheduler for NullScheduler {
    fn call(&mut self, _now_ms: u32) {}
}
