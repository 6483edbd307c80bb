//! Uplink frame parser/writer (§4.4).
//!
//! Top-level layout: `METHOD[!SEQ]|AUTH|SERIAL[|BODY]`. A single
//! trailing `\n` is tolerated by the parser and never emitted by the
//! builder.

use std::fmt;

use crate::{
    body::{parse_pull_body, parse_push_body, write_pull_body, write_push_body, PullBody, PushBody},
    error::{Result, TagoTipError},
    lexer::{seq, serial},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Push,
    Pull,
    Ping,
}

impl Method {
    /// Method byte used in the TagoTiP/S nonce (§4.8, §6): PUSH=0, PULL=1, PING=2.
    pub fn wire_code(self) -> u8 {
        match self {
            Method::Push => 0,
            Method::Pull => 1,
            Method::Ping => 2,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Push => "PUSH",
            Method::Pull => "PULL",
            Method::Ping => "PING",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UplinkFrame {
    pub method: Method,
    pub seq: Option<u64>,
    pub auth: String,
    pub serial: String,
    pub push_body: Option<PushBody>,
    pub pull_body: Option<PullBody>,
}

fn trim_trailing_newline(input: &str) -> &str {
    if cfg!(feature = "trailing-newline") {
        input.strip_suffix('\n').unwrap_or(input)
    } else {
        input
    }
}

fn parse_method(input: &str) -> Result<(Method, &str)> {
    for (literal, method) in [
        ("PUSH", Method::Push),
        ("PULL", Method::Pull),
        ("PING", Method::Ping),
    ] {
        if let Some(rest) = input.strip_prefix(literal) {
            return Ok((method, rest));
        }
    }
    Err(TagoTipError::InvalidMethod)
}

fn validate_auth(auth: &str) -> Result<()> {
    let (rest, _) = crate::lexer::auth_token(auth).map_err(|_| TagoTipError::InvalidAuth)?;
    if !rest.is_empty() {
        return Err(TagoTipError::InvalidAuth);
    }
    Ok(())
}

/// Parse a complete uplink frame.
pub fn parse_uplink(input: &str) -> Result<UplinkFrame> {
    let trimmed = trim_trailing_newline(input);
    if trimmed.trim().is_empty() {
        return Err(TagoTipError::EmptyFrame);
    }

    let (method, rest) = parse_method(trimmed)?;

    let (parsed_seq, rest) = match seq(rest) {
        Ok((rest, value)) => (Some(value), rest),
        Err(_) => (None, rest),
    };

    let rest = rest.strip_prefix('|').ok_or(TagoTipError::InvalidAuth)?;

    let auth_end = rest.find('|').ok_or(TagoTipError::InvalidAuth)?;
    let auth = &rest[..auth_end];
    validate_auth(auth)?;
    let rest = &rest[auth_end + 1..];

    let (serial_str, rest) =
        serial(rest).map_err(|_| TagoTipError::InvalidAuth)?;

    let (push_body, pull_body) = match rest.strip_prefix('|') {
        Some(body_str) => match method {
            Method::Push => (Some(parse_push_body(body_str)?), None),
            Method::Pull => (None, Some(parse_pull_body(body_str)?)),
            Method::Ping => return Err(TagoTipError::MissingBody),
        },
        None => match method {
            Method::Push | Method::Pull => return Err(TagoTipError::MissingBody),
            Method::Ping => (None, None),
        },
    };

    Ok(UplinkFrame {
        method,
        seq: parsed_seq,
        auth: auth.to_string(),
        serial: serial_str.to_string(),
        push_body,
        pull_body,
    })
}

/// Serialize an uplink frame. The builder never emits a trailing `\n`.
pub fn build_uplink(frame: &UplinkFrame) -> String {
    let mut out = frame.method.to_string();
    if let Some(seq) = frame.seq {
        out.push('!');
        out.push_str(&seq.to_string());
    }
    out.push('|');
    out.push_str(&frame.auth);
    out.push('|');
    out.push_str(&frame.serial);

    if let Some(body) = &frame.push_body {
        out.push('|');
        out.push_str(&write_push_body(body));
    }
    if let Some(body) = &frame.pull_body {
        out.push('|');
        out.push_str(&write_pull_body(body));
    }

    out
}
