//! Chip-level collaborators: hardware identity and restart.

use cadence_types::MacAddress;

/// Source of the device's hardware address.  Queried once, while the
/// application forms its identity.
pub trait MacSource {
    fn mac_address(&self) -> MacAddress;
}

/// Restart control.
///
/// On real hardware `restart` never returns.  Hosted and simulated drivers
/// may return after recording or acting on the request; the application
/// treats itself as halted from that point on.
pub trait Reset {
    fn restart(&mut self);
}

/// A [`MacSource`] that always reports the same address.
#[derive(Debug, Clone, Copy)]
pub struct FixedMac(pub MacAddress);

impl MacSource for FixedMac {
    fn mac_address(&self) -> MacAddress {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_mac_reports_its_address() {
        let mac = MacAddress::new([0x02, 0, 0, 0, 0, 0x01]);
        assert_eq!(FixedMac(mac).mac_address(), mac);
    }
}
