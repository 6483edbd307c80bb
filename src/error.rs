use thiserror::Error;

/// A single error kind covering every way a frame, ACK, or envelope
/// operation in this crate can fail.
///
/// `Display` produces the stable, lowercase, underscore-delimited
/// discriminant a caller matches on — i.e. `error.to_string()` *is*
/// the contract, not a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagoTipError {
    /// Input string has zero length or only whitespace.
    #[error("empty_frame")]
    EmptyFrame,
    /// First segment is not one of `PUSH`, `PULL`, `PING`.
    #[error("invalid_method")]
    InvalidMethod,
    /// Auth segment does not match `at` followed by 32 hex characters.
    #[error("invalid_auth")]
    InvalidAuth,
    /// A `PUSH`/`PULL` frame lacks its required body segment.
    #[error("missing_body")]
    MissingBody,
    /// The variable grammar (name/operator/value/suffixes) was violated.
    #[error("invalid_variable")]
    InvalidVariable,
    /// A passthrough hex/base64 payload was malformed.
    #[error("invalid_passthrough")]
    InvalidPassthrough,
    /// A `PULL` body was malformed.
    #[error("invalid_pull")]
    InvalidPull,
    /// ACK parsing failed at the top level.
    #[error("invalid_ack")]
    InvalidAck,
    /// Envelope shorter than 29 bytes (or 21 for header-only parsing).
    #[error("envelope_too_short")]
    EnvelopeTooShort,
    /// Supplied key is not exactly 16 bytes.
    #[error("invalid_key_size")]
    InvalidKeySize,
    /// AEAD authentication failed under every candidate method.
    #[error("decrypt_failed")]
    DecryptFailed,
}

pub type Result<T> = std::result::Result<T, TagoTipError>;
