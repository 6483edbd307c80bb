//! TagoTiP/S secure envelope codec (§4.8).
//!
//! ```text
//! 0        1           5                13              21           21+N    21+N+8
//! +--------+-----------+----------------+---------------+------------+-------+
//! | flags  | counter   | auth_hash      | device_hash   | ciphertext | tag   |
//! | (1)    | (4, BE)   | (8)            | (8)           | (N)        | (8)   |
//! +--------+-----------+----------------+---------------+------------+-------+
//! ```
//!
//! AES-128-CCM with an 8-byte tag and a 13-byte nonce built from the
//! method byte, counter, and auth hash. The header itself is the
//! associated data. The method is not stored in the header: `open`
//! recovers it by trial decryption over the four legal values.

use aes::Aes128;
use ccm::{
    aead::{generic_array::GenericArray, Aead, KeyInit, Payload},
    consts::{U13, U8},
    Ccm,
};

use crate::error::{Result, TagoTipError};

type Aes128Ccm = Ccm<Aes128, U8, U13>;

pub const HEADER_LEN: usize = 21;
pub const TAG_LEN: usize = 8;
pub const NONCE_LEN: usize = 13;
pub const KEY_LEN: usize = 16;
pub const AUTH_HASH_LEN: usize = 8;
pub const DEVICE_HASH_LEN: usize = 8;

/// The four legal method bytes an envelope's inner frame can carry.
/// Distinct from [`crate::frame::Method`] because an envelope may also
/// wrap an ACK frame, which `frame::Method` does not represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeMethod {
    Push,
    Pull,
    Ping,
    Ack,
}

impl EnvelopeMethod {
    pub fn wire_code(self) -> u8 {
        match self {
            EnvelopeMethod::Push => 0,
            EnvelopeMethod::Pull => 1,
            EnvelopeMethod::Ping => 2,
            EnvelopeMethod::Ack => 3,
        }
    }

    /// Ascending trial order used by [`open`] (§9 "Envelope method recovery").
    const ALL: [EnvelopeMethod; 4] = [
        EnvelopeMethod::Push,
        EnvelopeMethod::Pull,
        EnvelopeMethod::Ping,
        EnvelopeMethod::Ack,
    ];
}

impl From<crate::frame::Method> for EnvelopeMethod {
    fn from(method: crate::frame::Method) -> Self {
        match method {
            crate::frame::Method::Push => EnvelopeMethod::Push,
            crate::frame::Method::Pull => EnvelopeMethod::Pull,
            crate::frame::Method::Ping => EnvelopeMethod::Ping,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeHeader {
    pub flags: u8,
    pub counter: u32,
    pub auth_hash: [u8; AUTH_HASH_LEN],
    pub device_hash: [u8; DEVICE_HASH_LEN],
}

impl EnvelopeHeader {
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0] = self.flags;
        out[1..5].copy_from_slice(&self.counter.to_be_bytes());
        out[5..13].copy_from_slice(&self.auth_hash);
        out[13..21].copy_from_slice(&self.device_hash);
        out
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(TagoTipError::EnvelopeTooShort);
        }

        let mut auth_hash = [0u8; AUTH_HASH_LEN];
        auth_hash.copy_from_slice(&bytes[5..13]);
        let mut device_hash = [0u8; DEVICE_HASH_LEN];
        device_hash.copy_from_slice(&bytes[13..21]);

        Ok(EnvelopeHeader {
            flags: bytes[0],
            counter: u32::from_be_bytes(bytes[1..5].try_into().unwrap()),
            auth_hash,
            device_hash,
        })
    }
}

fn build_nonce(method_byte: u8, counter: u32, auth_hash: &[u8; AUTH_HASH_LEN]) -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    nonce[0] = method_byte;
    nonce[1..5].copy_from_slice(&counter.to_be_bytes());
    nonce[5..13].copy_from_slice(auth_hash);
    nonce
}

fn cipher_from_key(key: &[u8]) -> Result<Aes128Ccm> {
    if key.len() != KEY_LEN {
        return Err(TagoTipError::InvalidKeySize);
    }
    Ok(Aes128Ccm::new(GenericArray::from_slice(key)))
}

/// Seal `inner_frame` into a TagoTiP/S envelope.
pub fn seal(
    method: EnvelopeMethod,
    inner_frame: &[u8],
    counter: u32,
    auth_hash: [u8; AUTH_HASH_LEN],
    device_hash: [u8; DEVICE_HASH_LEN],
    key: &[u8],
) -> Result<Vec<u8>> {
    let cipher = cipher_from_key(key)?;

    let header = EnvelopeHeader {
        flags: 0,
        counter,
        auth_hash,
        device_hash,
    };
    let header_bytes = header.to_bytes();
    let nonce_bytes = build_nonce(method.wire_code(), counter, &auth_hash);
    let nonce = GenericArray::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: inner_frame,
                aad: &header_bytes,
            },
        )
        .map_err(|_| TagoTipError::DecryptFailed)?;

    log::trace!(
        "sealed envelope: method={:?} counter={} inner_len={}",
        method,
        counter,
        inner_frame.len()
    );

    let mut out = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    out.extend_from_slice(&header_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Parse the header without decrypting. Used for routing by
/// auth_hash/device_hash before key lookup.
pub fn parse_envelope_header(envelope: &[u8]) -> Result<EnvelopeHeader> {
    EnvelopeHeader::from_bytes(envelope)
}

/// Open an envelope, recovering the method by trial decryption.
pub fn open(envelope: &[u8], key: &[u8]) -> Result<(EnvelopeHeader, EnvelopeMethod, Vec<u8>)> {
    if envelope.len() < HEADER_LEN + TAG_LEN {
        return Err(TagoTipError::EnvelopeTooShort);
    }

    let cipher = cipher_from_key(key)?;
    let header = EnvelopeHeader::from_bytes(envelope)?;
    let header_bytes = header.to_bytes();
    let ciphertext = &envelope[HEADER_LEN..];

    for method in EnvelopeMethod::ALL {
        let nonce_bytes = build_nonce(method.wire_code(), header.counter, &header.auth_hash);
        let nonce = GenericArray::from_slice(&nonce_bytes);

        match cipher.decrypt(
            nonce,
            Payload {
                msg: ciphertext,
                aad: &header_bytes,
            },
        ) {
            Ok(plaintext) => {
                log::trace!("envelope opened with method={:?}", method);
                return Ok((header, method, plaintext));
            }
            Err(_) => {
                log::trace!("trial decryption failed for method={:?}", method);
            }
        }
    }

    Err(TagoTipError::DecryptFailed)
}

/// `data` is a binary envelope unless it begins with the ASCII bytes
/// `ACK`, which marks a plaintext ACK fallback on a shared transport.
/// Empty buffers are not envelopes.
pub fn is_envelope(data: &[u8]) -> bool {
    if data.is_empty() {
        return false;
    }
    !data.starts_with(b"ACK")
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_key() -> Vec<u8> {
        vec![0u8; KEY_LEN]
    }

    #[test]
    fn round_trip() {
        let key = sample_key();
        let auth_hash = [1u8; AUTH_HASH_LEN];
        let device_hash = [2u8; DEVICE_HASH_LEN];
        let inner = b"sensor-01|[temp:=32]";

        let envelope = seal(EnvelopeMethod::Push, inner, 42, auth_hash, device_hash, &key).unwrap();
        let (header, method, plaintext) = open(&envelope, &key).unwrap();

        assert_eq!(header.flags, 0);
        assert_eq!(header.counter, 42);
        assert_eq!(header.auth_hash, auth_hash);
        assert_eq!(header.device_hash, device_hash);
        assert_eq!(method, EnvelopeMethod::Push);
        assert_eq!(plaintext, inner);
    }

    #[test]
    fn round_trip_every_method() {
        let key = sample_key();
        let auth_hash = [3u8; AUTH_HASH_LEN];
        let device_hash = [4u8; DEVICE_HASH_LEN];

        for method in EnvelopeMethod::ALL {
            let envelope = seal(method, b"OK|3", 7, auth_hash, device_hash, &key).unwrap();
            let (_, recovered, plaintext) = open(&envelope, &key).unwrap();
            assert_eq!(recovered, method);
            assert_eq!(plaintext, b"OK|3");
        }
    }

    #[test]
    fn tamper_rejected() {
        let key = sample_key();
        let envelope = seal(
            EnvelopeMethod::Ping,
            b"dev",
            1,
            [0u8; AUTH_HASH_LEN],
            [0u8; DEVICE_HASH_LEN],
            &key,
        )
        .unwrap();

        let mut tampered = envelope.clone();
        let last = tampered.len() - 1;
        tampered[last] ^= 0x01;

        assert_eq!(open(&tampered, &key), Err(TagoTipError::DecryptFailed));
    }

    #[test]
    fn wrong_key_rejected() {
        let envelope = seal(
            EnvelopeMethod::Ping,
            b"dev",
            1,
            [0u8; AUTH_HASH_LEN],
            [0u8; DEVICE_HASH_LEN],
            &sample_key(),
        )
        .unwrap();

        let wrong_key = vec![0xffu8; KEY_LEN];
        assert_eq!(open(&envelope, &wrong_key), Err(TagoTipError::DecryptFailed));
    }

    #[test]
    fn invalid_key_size_rejected() {
        assert_eq!(
            seal(EnvelopeMethod::Ping, b"dev", 1, [0u8; 8], [0u8; 8], &[0u8; 15]),
            Err(TagoTipError::InvalidKeySize)
        );
    }

    #[test]
    fn too_short_envelope_rejected() {
        assert_eq!(
            open(&[0u8; 10], &sample_key()),
            Err(TagoTipError::EnvelopeTooShort)
        );
    }

    #[test]
    fn header_parses_without_key() {
        let key = sample_key();
        let auth_hash = [9u8; AUTH_HASH_LEN];
        let device_hash = [8u8; DEVICE_HASH_LEN];
        let envelope = seal(EnvelopeMethod::Pull, b"dev", 99, auth_hash, device_hash, &key).unwrap();

        let header = parse_envelope_header(&envelope).unwrap();
        assert_eq!(header.counter, 99);
        assert_eq!(header.auth_hash, auth_hash);
        assert_eq!(header.device_hash, device_hash);
    }

    #[test]
    fn is_envelope_discrimination() {
        assert!(!is_envelope(b""));
        assert!(!is_envelope(b"ACK|OK"));
        assert!(is_envelope(b"\x00\x00\x00\x00\x00"));
    }
}
