//! Body parser/writer (§4.3): structured vs. passthrough PUSH bodies,
//! and the PULL name list.

use base64::Engine;

use crate::{
    error::{Result, TagoTipError},
    hex::hex_to_bytes,
    lexer::{is_suffix_value_char, name as name_lexeme},
    value::MetaPair,
    variable::{parse_variable, write_variable, Variable},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassthroughEncoding {
    Hex,
    Base64,
}

impl PassthroughEncoding {
    fn prefix(self) -> char {
        match self {
            PassthroughEncoding::Hex => 'x',
            PassthroughEncoding::Base64 => 'b',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassthroughBody {
    pub encoding: PassthroughEncoding,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructuredBody {
    pub variables: Vec<Variable>,
    pub group: Option<String>,
    pub timestamp: Option<String>,
    pub meta: Vec<MetaPair>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushBody {
    Structured(StructuredBody),
    Passthrough(PassthroughBody),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullBody {
    pub names: Vec<String>,
}

fn take_suffix_value(input: &str) -> &str {
    let end = input
        .char_indices()
        .find(|&(_, c)| !is_suffix_value_char(c))
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    &input[..end]
}

pub fn parse_push_body(input: &str) -> Result<PushBody> {
    if let Some(rest) = input.strip_prefix('>') {
        let (encoding, data) = if let Some(data) = rest.strip_prefix('x') {
            (PassthroughEncoding::Hex, data)
        } else if let Some(data) = rest.strip_prefix('b') {
            (PassthroughEncoding::Base64, data)
        } else {
            return Err(TagoTipError::InvalidPassthrough);
        };
        validate_passthrough(encoding, data)?;
        return Ok(PushBody::Passthrough(PassthroughBody {
            encoding,
            data: data.to_string(),
        }));
    }

    parse_structured_body(input).map(PushBody::Structured)
}

fn validate_passthrough(encoding: PassthroughEncoding, data: &str) -> Result<()> {
    if data.is_empty() {
        return Err(TagoTipError::InvalidPassthrough);
    }
    match encoding {
        PassthroughEncoding::Hex => {
            hex_to_bytes(data).ok_or(TagoTipError::InvalidPassthrough)?;
        }
        PassthroughEncoding::Base64 => {
            base64::engine::general_purpose::STANDARD
                .decode(data)
                .map_err(|_| TagoTipError::InvalidPassthrough)?;
        }
    }
    Ok(())
}

fn parse_structured_body(input: &str) -> Result<StructuredBody> {
    let mut rest = input;
    let mut timestamp = None;
    let mut group = None;
    let mut meta: Vec<MetaPair> = Vec::new();

    loop {
        match rest.chars().next() {
            Some('@') => {
                if timestamp.is_some() {
                    return Err(TagoTipError::InvalidVariable);
                }
                let value = take_suffix_value(&rest[1..]);
                timestamp = Some(value.to_string());
                rest = &rest[1 + value.len()..];
            }
            Some('^') => {
                if group.is_some() {
                    return Err(TagoTipError::InvalidVariable);
                }
                let value = take_suffix_value(&rest[1..]);
                group = Some(value.to_string());
                rest = &rest[1 + value.len()..];
            }
            Some('{') => {
                if !meta.is_empty() {
                    return Err(TagoTipError::InvalidVariable);
                }
                let (after, pairs) = parse_meta_block(rest)?;
                meta = pairs;
                rest = after;
            }
            _ => break,
        }
    }

    let rest = rest
        .strip_prefix('[')
        .ok_or(TagoTipError::InvalidVariable)?;

    let mut variables = Vec::new();
    let mut rest = rest;
    loop {
        let (after, var) = parse_variable(rest)?;
        variables.push(var);
        rest = after;
        match rest.chars().next() {
            Some(';') => rest = &rest[1..],
            Some(']') => {
                rest = &rest[1..];
                break;
            }
            _ => return Err(TagoTipError::InvalidVariable),
        }
    }

    if !rest.is_empty() {
        return Err(TagoTipError::InvalidVariable);
    }
    if variables.is_empty() {
        return Err(TagoTipError::InvalidVariable);
    }

    Ok(StructuredBody {
        variables,
        group,
        timestamp,
        meta,
    })
}

fn parse_meta_block(input: &str) -> Result<(&str, Vec<MetaPair>)> {
    let rest = input.strip_prefix('{').ok_or(TagoTipError::InvalidVariable)?;
    let mut pairs = Vec::new();
    let mut rest = rest;
    loop {
        let eq = rest.find('=').ok_or(TagoTipError::InvalidVariable)?;
        let key = &rest[..eq];
        if key.is_empty() {
            return Err(TagoTipError::InvalidVariable);
        }
        let after_key = &rest[eq + 1..];
        let end = after_key
            .char_indices()
            .find(|&(_, c)| c == ',' || c == '}')
            .map(|(i, _)| i)
            .ok_or(TagoTipError::InvalidVariable)?;
        let value = &after_key[..end];
        if value.is_empty() {
            return Err(TagoTipError::InvalidVariable);
        }
        pairs.push(MetaPair {
            key: key.to_string(),
            value: value.to_string(),
        });
        rest = &after_key[end..];
        match rest.chars().next() {
            Some(',') => rest = &rest[1..],
            Some('}') => {
                rest = &rest[1..];
                break;
            }
            _ => return Err(TagoTipError::InvalidVariable),
        }
    }
    Ok((rest, pairs))
}

pub fn parse_pull_body(input: &str) -> Result<PullBody> {
    let rest = input.strip_prefix('[').ok_or(TagoTipError::InvalidPull)?;
    let mut names = Vec::new();
    let mut rest = rest;
    loop {
        let n = name_lexeme(rest).map_err(|_| TagoTipError::InvalidPull)?;
        names.push(n.1.to_string());
        rest = n.0;
        match rest.chars().next() {
            Some(';') => rest = &rest[1..],
            Some(']') => {
                rest = &rest[1..];
                break;
            }
            _ => return Err(TagoTipError::InvalidPull),
        }
    }
    if !rest.is_empty() || names.is_empty() {
        return Err(TagoTipError::InvalidPull);
    }
    Ok(PullBody { names })
}

pub fn write_push_body(body: &PushBody) -> String {
    match body {
        PushBody::Passthrough(p) => format!(">{}{}", p.encoding.prefix(), p.data),
        PushBody::Structured(s) => {
            let mut out = String::new();
            if let Some(timestamp) = &s.timestamp {
                out.push('@');
                out.push_str(timestamp);
            }
            if let Some(group) = &s.group {
                out.push('^');
                out.push_str(group);
            }
            if !s.meta.is_empty() {
                out.push('{');
                out.push_str(&crate::utils::join(&s.meta, ","));
                out.push('}');
            }
            out.push('[');
            let written: Vec<String> = s.variables.iter().map(write_variable).collect();
            out.push_str(&crate::utils::join(&written, ";"));
            out.push(']');
            out
        }
    }
}

pub fn write_pull_body(body: &PullBody) -> String {
    format!("[{}]", crate::utils::join(&body.names, ";"))
}
