//! Character classes and primitive parsers (§4.1).
//!
//! Frames are whole UTF-8 strings, never partial buffers (§9 "No
//! streaming"), so every parser here uses `nom::*::complete` rather than
//! `nom::*::streaming`.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1, take_while_m_n},
    character::complete::{char, digit1},
    combinator::{not, opt, peek, recognize},
    sequence::{pair, tuple},
    IResult,
};

/// Structural characters that delimit frame syntax everywhere: the pipe
/// between top-level segments and the bracket/brace/semicolon family used
/// inside bodies and variables.
pub fn is_structural(c: char) -> bool {
    matches!(c, '|' | '[' | ']' | '{' | '}' | ';' | '\n')
}

/// `SERIAL` character: printable, not structural.
pub fn is_serial_char(c: char) -> bool {
    !is_structural(c) && !c.is_control()
}

/// `NAME` character: printable, not structural, and not an operator
/// introducer (`:`, `=`, `?`, `@`) so the lexer can tell where a variable
/// name ends and its operator begins.
pub fn is_name_char(c: char) -> bool {
    !is_structural(c) && !c.is_control() && !matches!(c, ':' | '=' | '?' | '@')
}

/// Stop set for string-valued suffix/body-modifier payloads (unit,
/// timestamp, group): the next suffix introducer or a structural
/// terminator.
pub fn is_suffix_value_char(c: char) -> bool {
    !is_structural(c) && !c.is_control() && !matches!(c, '#' | '@' | '^')
}

/// Stop set for a bare `=`-string value: same suffix introducers plus the
/// `{` that opens a meta block.
pub fn is_string_value_char(c: char) -> bool {
    is_suffix_value_char(c) && c != '{'
}

/// Meta key/value characters: anything but the pair separator `=`, the
/// pair-list separator `,`, and the closing `}`.
pub fn is_meta_key_char(c: char) -> bool {
    !matches!(c, '=' | ',' | '}') && !c.is_control()
}

pub fn is_meta_value_char(c: char) -> bool {
    !matches!(c, ',' | '}') && !c.is_control()
}

pub fn is_hex_char(c: char) -> bool {
    c.is_ascii_hexdigit()
}

/// `AUTH = "at" 32HEXDIG`
pub fn auth_token(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        tag("at"),
        take_while_m_n(32, 32, is_hex_char),
    ))(input)
}

/// `SERIAL = 1*SERIAL-CHAR`
pub fn serial(input: &str) -> IResult<&str, &str> {
    take_while1(is_serial_char)(input)
}

/// `NAME = 1*NAME-CHAR`
pub fn name(input: &str) -> IResult<&str, &str> {
    take_while1(is_name_char)(input)
}

/// `SEQ = "!" 1*DIGIT`, no leading zero unless the value is literally `0`.
pub fn seq(input: &str) -> IResult<&str, u64> {
    let (rest, (_, digits)) = pair(char('!'), digit1)(input)?;
    let value = parse_unsigned_no_leading_zero(digits)
        .ok_or_else(|| nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit)))?;
    Ok((rest, value))
}

fn parse_unsigned_no_leading_zero(digits: &str) -> Option<u64> {
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    digits.parse::<u64>().ok()
}

/// `NUMBER = ["-"] ("0" / digit-nz *DIGIT) ["." 1*DIGIT]`, kept as a
/// string to preserve exact textual fidelity.
pub fn numeric_literal(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(char('-')),
        integer_part,
        opt(pair(char('.'), digit1)),
    )))(input)
}

fn integer_part(input: &str) -> IResult<&str, &str> {
    alt((
        // "0" only counts as the whole integer part if no further digit
        // follows it (otherwise "01" would parse as "0", leaving a
        // trailing "1" for the caller to stumble over instead of
        // rejecting the leading zero outright).
        recognize(pair(tag("0"), peek(not(digit_char)))),
        recognize(pair(
            take_while_m_n(1, 1, |c: char| c.is_ascii_digit() && c != '0'),
            take_while(|c: char| c.is_ascii_digit()),
        )),
    ))(input)
}

fn digit_char(input: &str) -> IResult<&str, &str> {
    take_while_m_n(1, 1, |c: char| c.is_ascii_digit())(input)
}

/// `BOOLEAN = "true" / "false"`
pub fn boolean_literal(input: &str) -> IResult<&str, bool> {
    alt((
        nom::combinator::value(true, tag("true")),
        nom::combinator::value(false, tag("false")),
    ))(input)
}

/// A signed decimal component of a location literal, lexically the same
/// shape as [`numeric_literal`] but stored separately since it is never
/// re-parsed as anything but a string.
pub fn signed_decimal(input: &str) -> IResult<&str, &str> {
    numeric_literal(input)
}

/// String-valued (`=`) payload: one or more characters up to the next
/// structural boundary. Empty values are rejected by the caller, which
/// distinguishes "took zero chars" from "value empty" to produce
/// `invalid_variable` rather than propagating a raw nom error.
pub fn string_value(input: &str) -> IResult<&str, &str> {
    take_while(is_string_value_char)(input)
}

pub fn suffix_value(input: &str) -> IResult<&str, &str> {
    take_while(is_suffix_value_char)(input)
}

pub fn meta_key(input: &str) -> IResult<&str, &str> {
    take_while1(is_meta_key_char)(input)
}

pub fn meta_value(input: &str) -> IResult<&str, &str> {
    take_while1(is_meta_value_char)(input)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_auth_token() {
        let (rem, tok) =
            auth_token("at0123456789abcdef0123456789abcdef|dev").unwrap();
        assert_eq!(tok, "at0123456789abcdef0123456789abcdef");
        assert_eq!(rem, "|dev");

        assert!(auth_token("atXYZ").is_err());
        assert!(auth_token("at012").is_err());
    }

    #[test]
    fn test_numeric_literal() {
        assert_eq!(numeric_literal("32.5;").unwrap(), (";", "32.5"));
        assert_eq!(numeric_literal("0;").unwrap(), (";", "0"));
        assert_eq!(numeric_literal("-104.99,").unwrap(), (",", "-104.99"));
        assert_eq!(numeric_literal("0.5;").unwrap(), (";", "0.5"));

        // A leading zero followed by another digit is rejected outright,
        // not parsed as "0" with garbage left over.
        assert!(numeric_literal("01]").is_err());
        assert!(numeric_literal("-01]").is_err());
    }

    #[test]
    fn test_boolean_literal() {
        assert_eq!(boolean_literal("true]").unwrap(), ("]", true));
        assert_eq!(boolean_literal("false]").unwrap(), ("]", false));
        assert!(boolean_literal("maybe").is_err());
    }

    #[test]
    fn test_seq() {
        assert_eq!(seq("!42|").unwrap(), ("|", 42));
        assert_eq!(seq("!0|").unwrap(), ("|", 0));
        assert!(seq("!01|").is_err());
    }

    #[test]
    fn test_name() {
        let (rem, n) = name("temperature:=32").unwrap();
        assert_eq!(n, "temperature");
        assert_eq!(rem, ":=32");
    }
}
