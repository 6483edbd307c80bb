#![deny(missing_debug_implementations)]

//! Codec for the TagoTiP textual IoT telemetry protocol and its
//! companion authenticated-encryption envelope, TagoTiP/S.
//!
//! Two cores, both pure functions over in-memory buffers (§5 — no
//! I/O, no shared state, no connection lifecycle):
//!
//! - [`frame`]/[`ack`]: parse and build the textual uplink and ACK
//!   frames, with [`variable`] and [`body`] underneath for the
//!   bracketed variable grammar.
//! - [`envelope`]: seal/open the binary TagoTiP/S envelope, with
//!   [`hash`] and [`kdf`] providing the derivations it's keyed from.

pub mod ack;
pub mod body;
pub mod envelope;
pub mod error;
pub mod frame;
pub mod hash;
pub mod hex;
pub mod kdf;
pub mod lexer;
pub mod testing;
pub mod utils;
pub mod value;
pub mod variable;

pub use ack::{build_ack, parse_ack, AckDetail, AckFrame, AckStatus, ErrorCode};
pub use body::{
    parse_pull_body, parse_push_body, write_pull_body, write_push_body, PassthroughBody,
    PassthroughEncoding, PullBody, PushBody, StructuredBody,
};
pub use envelope::{is_envelope, open, parse_envelope_header, seal, EnvelopeHeader, EnvelopeMethod};
pub use error::{Result, TagoTipError};
pub use frame::{build_uplink, parse_uplink, Method, UplinkFrame};
pub use hash::{derive_auth_hash, derive_device_hash};
pub use hex::{bytes_to_hex, hex_to_bytes};
pub use kdf::derive_key;
pub use value::{LocationValue, MetaPair, Operator, Value};
pub use variable::{parse_variable, write_variable, Variable};
