//! Auth/device hash derivations (§4.6).
//!
//! Both are truncated SHA-256 fingerprints used for envelope routing
//! and associated-data binding, never for secrecy.

use sha2::{Digest, Sha256};

use crate::error::{Result, TagoTipError};

pub const HASH_LEN: usize = 8;

fn strip_at_prefix(token: &str) -> &str {
    token.strip_prefix("at").unwrap_or(token)
}

fn is_32_hex(s: &str) -> bool {
    s.len() == 32 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// SHA-256 over the hex-stripped token's ASCII hex *string* (not its
/// byte decoding), truncated to the first 8 bytes.
pub fn derive_auth_hash(token: &str) -> Result<[u8; HASH_LEN]> {
    let hex_part = strip_at_prefix(token);
    if !is_32_hex(hex_part) {
        return Err(TagoTipError::InvalidAuth);
    }

    let digest = Sha256::digest(hex_part.as_bytes());
    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(&digest[..HASH_LEN]);
    Ok(out)
}

/// SHA-256 of the UTF-8 bytes of the serial, truncated to 8 bytes.
pub fn derive_device_hash(serial: &str) -> [u8; HASH_LEN] {
    let digest = Sha256::digest(serial.as_bytes());
    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(&digest[..HASH_LEN]);
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn auth_hash_spec_vector() {
        let hash = derive_auth_hash("ate2bd319014b24e0a8aca9f00aea4c0d0").unwrap();
        assert_eq!(hash, [0x4d, 0xee, 0xdd, 0x7b, 0xab, 0x88, 0x17, 0xec]);
    }

    #[test]
    fn prefix_stripped_form_matches() {
        let with_prefix = derive_auth_hash("ate2bd319014b24e0a8aca9f00aea4c0d0").unwrap();
        let without_prefix = derive_auth_hash("e2bd319014b24e0a8aca9f00aea4c0d0").unwrap();
        assert_eq!(with_prefix, without_prefix);
    }

    #[test]
    fn device_hash_spec_vector() {
        let hash = derive_device_hash("sensor-01");
        assert_eq!(hash, [0xab, 0x77, 0x88, 0xd2, 0x2e, 0xb7, 0x37, 0x2f]);
    }

    #[test]
    fn malformed_token_rejected() {
        assert_eq!(
            derive_auth_hash("not-hex-at-all"),
            Err(TagoTipError::InvalidAuth)
        );
        assert_eq!(derive_auth_hash("at0011"), Err(TagoTipError::InvalidAuth));
    }
}
