//! Entity keys.
//!
//! An entity's key is the 32-bit FNV-1 hash of its object id, where the
//! object id is the entity name lower-cased, with spaces turned into
//! underscores and anything outside `[a-z0-9_-]` replaced by `_`.
//!
//! ```
//! use cadence_types::key::{fnv1_hash, sanitize_object_id};
//!
//! let object_id = sanitize_object_id("Living Room Temp");
//! assert_eq!(object_id, "living_room_temp");
//! assert_eq!(fnv1_hash(""), 2_166_136_261);
//! ```

const FNV1_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV1_PRIME: u32 = 16_777_619;

/// 32-bit FNV-1 (multiply, then xor) over the bytes of `input`.
pub fn fnv1_hash(input: &str) -> u32 {
    input.bytes().fold(FNV1_OFFSET_BASIS, |hash, byte| {
        hash.wrapping_mul(FNV1_PRIME) ^ u32::from(byte)
    })
}

/// Turn a human-readable name into an object id.
pub fn sanitize_object_id(name: &str) -> String {
    name.chars()
        .map(|c| match c.to_ascii_lowercase() {
            ' ' => '_',
            c @ ('a'..='z' | '0'..='9' | '_' | '-') => c,
            _ => '_',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_hashes_to_offset_basis() {
        assert_eq!(fnv1_hash(""), FNV1_OFFSET_BASIS);
    }

    #[test]
    fn single_byte_matches_reference_value() {
        // FNV-1 32-bit reference vector for "a".
        assert_eq!(fnv1_hash("a"), 0x050c_5d7e);
    }

    #[test]
    fn hash_is_deterministic_and_order_sensitive() {
        assert_eq!(fnv1_hash("uptime"), fnv1_hash("uptime"));
        assert_ne!(fnv1_hash("ab"), fnv1_hash("ba"));
    }

    #[test]
    fn sanitize_lowercases_and_replaces_spaces() {
        assert_eq!(sanitize_object_id("Living Room Temp"), "living_room_temp");
    }

    #[test]
    fn sanitize_replaces_punctuation() {
        assert_eq!(sanitize_object_id("Temp (°C)!"), "temp___c__");
        assert_eq!(sanitize_object_id("wifi-signal_db"), "wifi-signal_db");
    }
}
