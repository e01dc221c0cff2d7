//! Device identity: name, MAC-suffix flag and compilation timestamp.
//!
//! With suffixing enabled the name becomes `<base>-<last six hex digits of
//! the MAC>`, which keeps a fleet of identically-flashed devices
//! distinguishable on the network.

use cadence_types::MacAddress;
use serde::Serialize;

/// The identity fixed by `pre_setup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    name: String,
    compilation_time: String,
    name_add_mac_suffix: bool,
}

impl Identity {
    /// Form the identity.  `mac` is only queried when suffixing is enabled.
    pub fn form(
        base_name: &str,
        compilation_time: &str,
        name_add_mac_suffix: bool,
        mac: impl FnOnce() -> MacAddress,
    ) -> Self {
        let name = if name_add_mac_suffix {
            format!("{base_name}-{}", mac().suffix())
        } else {
            base_name.to_string()
        };
        Self {
            name,
            compilation_time: compilation_time.to_string(),
            name_add_mac_suffix,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn compilation_time(&self) -> &str {
        &self.compilation_time
    }

    pub fn name_add_mac_suffix(&self) -> bool {
        self.name_add_mac_suffix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAC: MacAddress = MacAddress::new([0xAA, 0xBB, 0xCC, 0x11, 0x22, 0x33]);

    #[test]
    fn plain_name_is_kept() {
        let id = Identity::form("device", "Jan 01 2026, 00:00:00", false, || MAC);
        assert_eq!(id.name(), "device");
        assert!(!id.name_add_mac_suffix());
        assert_eq!(id.compilation_time(), "Jan 01 2026, 00:00:00");
    }

    #[test]
    fn suffix_is_last_six_hex_digits() {
        let id = Identity::form("device", "t", true, || MAC);
        assert_eq!(id.name(), "device-112233");
    }

    #[test]
    fn mac_is_not_queried_without_suffix() {
        let id = Identity::form("device", "t", false, || panic!("mac queried"));
        assert_eq!(id.name(), "device");
    }

    #[test]
    fn serializes_for_the_run_summary() {
        let id = Identity::form("device", "t", true, || MAC);
        let json = serde_json::to_value(&id).unwrap();
        assert_eq!(json["name"], "device-112233");
        assert_eq!(json["name_add_mac_suffix"], true);
    }
}
