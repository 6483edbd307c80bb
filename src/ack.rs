//! ACK frame parser/writer (§4.5).
//!
//! Layout: `ACK[|!SEQ]|STATUS[|DETAIL]` — unlike the uplink frame, the
//! optional sequence segment carries its own leading pipe (see
//! DESIGN.md's open-question notes for why uplink and ACK differ here).

use std::fmt;

use crate::{
    error::{Result, TagoTipError},
    lexer::seq,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckStatus {
    Ok,
    Pong,
    Cmd,
    Err,
}

impl fmt::Display for AckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AckStatus::Ok => "OK",
            AckStatus::Pong => "PONG",
            AckStatus::Cmd => "CMD",
            AckStatus::Err => "ERR",
        })
    }
}

/// Closed set of 11 named error codes plus an `Unknown` fallback that
/// preserves the original token text (§9 "Closed-enum with unknown
/// fallback").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidToken,
    InvalidMethod,
    InvalidPayload,
    InvalidSeq,
    DeviceNotFound,
    VariableNotFound,
    RateLimited,
    AuthFailed,
    UnsupportedVersion,
    PayloadTooLarge,
    ServerError,
    Unknown(String),
}

impl ErrorCode {
    fn from_token(token: &str) -> Self {
        match token {
            "invalid_token" => ErrorCode::InvalidToken,
            "invalid_method" => ErrorCode::InvalidMethod,
            "invalid_payload" => ErrorCode::InvalidPayload,
            "invalid_seq" => ErrorCode::InvalidSeq,
            "device_not_found" => ErrorCode::DeviceNotFound,
            "variable_not_found" => ErrorCode::VariableNotFound,
            "rate_limited" => ErrorCode::RateLimited,
            "auth_failed" => ErrorCode::AuthFailed,
            "unsupported_version" => ErrorCode::UnsupportedVersion,
            "payload_too_large" => ErrorCode::PayloadTooLarge,
            "server_error" => ErrorCode::ServerError,
            other => ErrorCode::Unknown(other.to_string()),
        }
    }

    fn token(&self) -> String {
        match self {
            ErrorCode::InvalidToken => "invalid_token".to_string(),
            ErrorCode::InvalidMethod => "invalid_method".to_string(),
            ErrorCode::InvalidPayload => "invalid_payload".to_string(),
            ErrorCode::InvalidSeq => "invalid_seq".to_string(),
            ErrorCode::DeviceNotFound => "device_not_found".to_string(),
            ErrorCode::VariableNotFound => "variable_not_found".to_string(),
            ErrorCode::RateLimited => "rate_limited".to_string(),
            ErrorCode::AuthFailed => "auth_failed".to_string(),
            ErrorCode::UnsupportedVersion => "unsupported_version".to_string(),
            ErrorCode::PayloadTooLarge => "payload_too_large".to_string(),
            ErrorCode::ServerError => "server_error".to_string(),
            ErrorCode::Unknown(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckDetail {
    Count(u64),
    Variables(String),
    Command(String),
    Error(ErrorCode),
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckFrame {
    pub status: AckStatus,
    pub seq: Option<u64>,
    pub detail: Option<AckDetail>,
}

fn trim_trailing_newline(input: &str) -> &str {
    if cfg!(feature = "trailing-newline") {
        input.strip_suffix('\n').unwrap_or(input)
    } else {
        input
    }
}

fn parse_status(input: &str) -> Result<(AckStatus, &str)> {
    for (literal, status) in [
        ("OK", AckStatus::Ok),
        ("PONG", AckStatus::Pong),
        ("CMD", AckStatus::Cmd),
        ("ERR", AckStatus::Err),
    ] {
        if let Some(rest) = input.strip_prefix(literal) {
            return Ok((status, rest));
        }
    }
    Err(TagoTipError::InvalidAck)
}

fn classify_detail(status: AckStatus, text: &str) -> AckDetail {
    match status {
        AckStatus::Ok => match text.parse::<u64>() {
            Ok(n) if is_pure_decimal(text) => AckDetail::Count(n),
            _ => AckDetail::Variables(text.to_string()),
        },
        AckStatus::Pong => AckDetail::Raw(text.to_string()),
        AckStatus::Cmd => AckDetail::Command(text.to_string()),
        AckStatus::Err => AckDetail::Error(ErrorCode::from_token(text)),
    }
}

fn is_pure_decimal(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Parse a complete ACK frame.
pub fn parse_ack(input: &str) -> Result<AckFrame> {
    let trimmed = trim_trailing_newline(input);
    if trimmed.trim().is_empty() {
        return Err(TagoTipError::InvalidAck);
    }

    let rest = trimmed.strip_prefix("ACK").ok_or(TagoTipError::InvalidAck)?;
    let rest = rest.strip_prefix('|').ok_or(TagoTipError::InvalidAck)?;

    let (parsed_seq, rest) = match seq(rest) {
        Ok((after_seq, value)) => {
            let after_seq = after_seq
                .strip_prefix('|')
                .ok_or(TagoTipError::InvalidAck)?;
            (Some(value), after_seq)
        }
        Err(_) => (None, rest),
    };

    let (status_str, rest) = parse_status(rest)?;

    let detail = match rest.strip_prefix('|') {
        Some(text) => Some(classify_detail(status_str, text)),
        None if rest.is_empty() => None,
        None => return Err(TagoTipError::InvalidAck),
    };

    Ok(AckFrame {
        status: status_str,
        seq: parsed_seq,
        detail,
    })
}

/// Serialize an ACK frame.
pub fn build_ack(frame: &AckFrame) -> String {
    let mut out = String::from("ACK");
    if let Some(seq) = frame.seq {
        out.push('|');
        out.push('!');
        out.push_str(&seq.to_string());
    }
    out.push('|');
    out.push_str(&frame.status.to_string());

    if let Some(detail) = &frame.detail {
        out.push('|');
        match detail {
            AckDetail::Count(n) => out.push_str(&n.to_string()),
            AckDetail::Variables(s) => out.push_str(s),
            AckDetail::Command(s) => out.push_str(s),
            AckDetail::Raw(s) => out.push_str(s),
            AckDetail::Error(code) => out.push_str(&code.token()),
        }
    }

    out
}
