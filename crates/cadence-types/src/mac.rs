//! [`MacAddress`] – six-byte hardware address.
//!
//! Parsed from the usual `AA:BB:CC:11:22:33` notation (`-` separators or no
//! separators are accepted too) and rendered either with colons for humans or
//! as twelve lower-case hex digits for identity formation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CadenceError;

/// A 48-bit hardware (MAC) address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; 6] {
        self.0
    }

    /// Twelve lower-case hex digits, no separators (`"aabbcc112233"`).
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// The last six hex digits, used as the device name suffix.
    pub fn suffix(&self) -> String {
        self.0[3..].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl FromStr for MacAddress {
    type Err = CadenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.chars().filter(|c| *c != ':' && *c != '-').collect();
        if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CadenceError::InvalidMacAddress(s.to_string()));
        }
        let mut bytes = [0u8; 6];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
                .map_err(|_| CadenceError::InvalidMacAddress(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_colon_notation() {
        let mac: MacAddress = "AA:BB:CC:11:22:33".parse().unwrap();
        assert_eq!(mac.bytes(), [0xAA, 0xBB, 0xCC, 0x11, 0x22, 0x33]);
    }

    #[test]
    fn parses_bare_and_dashed_notation() {
        let bare: MacAddress = "aabbcc112233".parse().unwrap();
        let dashed: MacAddress = "aa-bb-cc-11-22-33".parse().unwrap();
        assert_eq!(bare, dashed);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!("AA:BB:CC".parse::<MacAddress>().is_err());
        assert!("GG:BB:CC:11:22:33".parse::<MacAddress>().is_err());
    }

    #[test]
    fn hex_is_lowercase_without_separators() {
        let mac = MacAddress::new([0xAA, 0xBB, 0xCC, 0x11, 0x22, 0x33]);
        assert_eq!(mac.to_hex(), "aabbcc112233");
        assert_eq!(mac.suffix(), "112233");
        assert_eq!(mac.to_string(), "AA:BB:CC:11:22:33");
    }
}
