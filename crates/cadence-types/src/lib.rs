//! `cadence-types` – shared value types for the cadence runtime.
//!
//! Everything here is plain data: the workspace error type, the aggregate
//! [`AppState`] failure bitmask, [`MacAddress`] parsing/formatting, and the
//! 32-bit entity key hashing in [`key`].

pub mod key;
pub mod mac;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use key::{fnv1_hash, sanitize_object_id};
pub use mac::MacAddress;

/// Aggregate status bitmask for the whole device.
///
/// Bits are set by components reporting a warning or a failure and are never
/// cleared implicitly; [`AppState::clear`] is the only way back to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppState(u32);

impl AppState {
    /// A component raised a warning status.
    pub const WARNING: u32 = 0x08;
    /// A component was marked failed.
    pub const ERROR: u32 = 0x10;

    /// An empty bitmask.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Raw bits, as reported by `get_app_state()`.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// OR `bits` into the mask.
    pub fn insert(&mut self, bits: u32) {
        self.0 |= bits;
    }

    /// `true` when every bit in `bits` is set.
    pub const fn contains(self, bits: u32) -> bool {
        self.0 & bits == bits
    }

    /// `true` when no bit is set.
    pub const fn is_clear(self) -> bool {
        self.0 == 0
    }

    /// Explicit reset of every bit.
    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

/// Workspace-wide error type spanning component faults, registration misuse
/// and board-level failures.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CadenceError {
    #[error("Component Fault on {component}: {details}")]
    ComponentFault { component: String, details: String },

    #[error("Registration Closed: cannot register {what} after setup has begun")]
    RegistrationClosed { what: String },

    #[error("Invalid MAC Address: {0}")]
    InvalidMacAddress(String),

    #[error("Preferences Error: {0}")]
    Preferences(String),
}

impl CadenceError {
    /// Convenience constructor for [`CadenceError::ComponentFault`].
    pub fn fault(component: impl Into<String>, details: impl Into<String>) -> Self {
        Self::ComponentFault {
            component: component.into(),
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_state_starts_clear() {
        let state = AppState::new();
        assert!(state.is_clear());
        assert_eq!(state.bits(), 0);
    }

    #[test]
    fn app_state_bits_accumulate() {
        let mut state = AppState::default();
        state.insert(AppState::WARNING);
        state.insert(AppState::ERROR);
        state.insert(AppState::WARNING);
        assert_eq!(state.bits(), AppState::WARNING | AppState::ERROR);
        assert!(state.contains(AppState::ERROR));
    }

    #[test]
    fn app_state_only_clears_explicitly() {
        let mut state = AppState::default();
        state.insert(AppState::ERROR);
        state.insert(0);
        assert!(state.contains(AppState::ERROR));
        state.clear();
        assert!(state.is_clear());
    }

    #[test]
    fn app_state_serializes_as_plain_number() {
        let mut state = AppState::default();
        state.insert(AppState::ERROR);
        assert_eq!(serde_json::to_string(&state).unwrap(), "16");
    }

    #[test]
    fn cadence_error_display() {
        let err = CadenceError::fault("uptime", "i2c bus stuck");
        assert!(err.to_string().contains("uptime"));
        assert!(err.to_string().contains("i2c bus stuck"));

        let err = CadenceError::RegistrationClosed {
            what: "component".to_string(),
        };
        assert!(err.to_string().contains("Registration Closed"));
    }
}
