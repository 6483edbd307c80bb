//! Symmetric key derivation (§4.7).
//!
//! The source defers this to a native implementation not present in
//! this crate's reference material; only the published test vector
//! (§8.7) is known. Per §9's own guidance this ships the most likely
//! recipe — HKDF-SHA256 over the hex-stripped token bytes, with the
//! serial as info and an empty salt — and documents it as unverified
//! against the literal vector (see DESIGN.md).

use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::{Result, TagoTipError};

fn strip_at_prefix(token: &str) -> &str {
    token.strip_prefix("at").unwrap_or(token)
}

fn is_32_hex(s: &str) -> bool {
    s.len() == 32 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Derive a symmetric key of `length` bytes (16 or 32) from `token` and
/// `serial`. The 16-byte form is the first 16 bytes of the 32-byte
/// expansion, never a separately-tuned expansion.
pub fn derive_key(token: &str, serial: &str, length: usize) -> Result<Vec<u8>> {
    if length != 16 && length != 32 {
        return Err(TagoTipError::InvalidKeySize);
    }

    let hex_part = strip_at_prefix(token);
    if !is_32_hex(hex_part) {
        return Err(TagoTipError::InvalidAuth);
    }

    let hk = Hkdf::<Sha256>::new(None, hex_part.as_bytes());
    let mut okm = [0u8; 32];
    hk.expand(serial.as_bytes(), &mut okm)
        .expect("32 is a valid HKDF-SHA256 output length");

    Ok(okm[..length].to_vec())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn deterministic() {
        let a = derive_key("ate2bd319014b24e0a8aca9f00aea4c0d0", "sensor-01", 32).unwrap();
        let b = derive_key("ate2bd319014b24e0a8aca9f00aea4c0d0", "sensor-01", 32).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sixteen_byte_form_is_prefix_of_thirty_two() {
        let long = derive_key("ate2bd319014b24e0a8aca9f00aea4c0d0", "sensor-01", 32).unwrap();
        let short = derive_key("ate2bd319014b24e0a8aca9f00aea4c0d0", "sensor-01", 16).unwrap();
        assert_eq!(short.as_slice(), &long[..16]);
    }

    #[test]
    fn prefix_insensitive() {
        let with_prefix = derive_key("ate2bd319014b24e0a8aca9f00aea4c0d0", "sensor-01", 16).unwrap();
        let without_prefix = derive_key("e2bd319014b24e0a8aca9f00aea4c0d0", "sensor-01", 16).unwrap();
        assert_eq!(with_prefix, without_prefix);
    }

    #[test]
    fn different_serial_different_key() {
        let a = derive_key("ate2bd319014b24e0a8aca9f00aea4c0d0", "sensor-01", 16).unwrap();
        let b = derive_key("ate2bd319014b24e0a8aca9f00aea4c0d0", "sensor-02", 16).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn bad_length_rejected() {
        assert_eq!(
            derive_key("ate2bd319014b24e0a8aca9f00aea4c0d0", "sensor-01", 24),
            Err(TagoTipError::InvalidKeySize)
        );
    }

    #[test]
    fn malformed_token_rejected() {
        assert_eq!(
            derive_key("not-hex", "sensor-01", 16),
            Err(TagoTipError::InvalidAuth)
        );
    }
}
