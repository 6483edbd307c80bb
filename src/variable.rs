//! Variable parser/writer (§4.2).
//!
//! ```text
//! variable := name operator value suffix*
//! operator := ":=" | "=" | "?=" | "@="
//! suffix   := "#" unit | "@" timestamp | "^" group | "{" meta "}"
//! meta     := pair ("," pair)*
//! pair     := key "=" value
//! ```
//!
//! Suffixes may appear in any order in the input but each at most once
//! (meta included). The writer always emits them in the fixed order
//! `# @ ^ {…}`, so only canonically-ordered input round-trips
//! byte-for-byte (§9 "Canonical serialization order").

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{map, opt},
    multi::separated_list1,
    sequence::{preceded, separated_pair, tuple},
    IResult,
};

use crate::{
    error::{Result, TagoTipError},
    lexer::{
        boolean_literal, meta_key, meta_value, name, numeric_literal, signed_decimal,
        string_value, suffix_value,
    },
    value::{LocationValue, MetaPair, Operator, Value},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value: Value,
    pub unit: Option<String>,
    pub timestamp: Option<String>,
    pub group: Option<String>,
    pub meta: Vec<MetaPair>,
}

impl Variable {
    pub fn operator(&self) -> Operator {
        self.value.operator()
    }
}

fn operator(input: &str) -> IResult<&str, Operator> {
    alt((
        map(tag(":="), |_| Operator::Number),
        map(tag("?="), |_| Operator::Boolean),
        map(tag("@="), |_| Operator::Location),
        map(tag("="), |_| Operator::String),
    ))(input)
}

fn location_value(input: &str) -> IResult<&str, LocationValue> {
    let (rest, (lat, _, lng, alt_opt)) = tuple((
        signed_decimal,
        char(','),
        signed_decimal,
        opt(preceded(char(','), signed_decimal)),
    ))(input)?;

    Ok((
        rest,
        LocationValue {
            lat: lat.to_string(),
            lng: lng.to_string(),
            alt: alt_opt.map(str::to_string),
        },
    ))
}

fn value_for(op: Operator) -> impl Fn(&str) -> IResult<&str, Value> {
    move |input: &str| match op {
        Operator::Number => map(numeric_literal, |s: &str| Value::Number(s.to_string()))(input),
        Operator::Boolean => map(boolean_literal, Value::Boolean)(input),
        Operator::Location => map(location_value, Value::Location)(input),
        Operator::String => {
            let (rest, s) = string_value(input)?;
            if s.is_empty() {
                return Err(nom::Err::Error(nom::error::Error::new(
                    input,
                    nom::error::ErrorKind::Verify,
                )));
            }
            Ok((rest, Value::String(s.to_string())))
        }
    }
}

fn meta_pair(input: &str) -> IResult<&str, MetaPair> {
    map(
        separated_pair(meta_key, char('='), meta_value),
        |(key, value)| MetaPair {
            key: key.to_string(),
            value: value.to_string(),
        },
    )(input)
}

fn meta_block(input: &str) -> IResult<&str, Vec<MetaPair>> {
    let (rest, (_, pairs, _)) = tuple((
        char('{'),
        separated_list1(char(','), meta_pair),
        char('}'),
    ))(input)?;
    Ok((rest, pairs))
}

enum Suffix {
    Unit(String),
    Timestamp(String),
    Group(String),
    Meta(Vec<MetaPair>),
}

fn suffix(input: &str) -> IResult<&str, Suffix> {
    alt((
        map(preceded(char('#'), suffix_value), |s: &str| {
            Suffix::Unit(s.to_string())
        }),
        map(preceded(char('@'), suffix_value), |s: &str| {
            Suffix::Timestamp(s.to_string())
        }),
        map(preceded(char('^'), suffix_value), |s: &str| {
            Suffix::Group(s.to_string())
        }),
        map(meta_block, Suffix::Meta),
    ))(input)
}

/// Parse one `variable` from the front of `input`, returning the rest.
pub fn parse_variable(input: &str) -> Result<(&str, Variable)> {
    let (rest, (name_str, op)) =
        tuple((name, operator))(input).map_err(|_| TagoTipError::InvalidVariable)?;

    let (mut rest, value) =
        value_for(op)(rest).map_err(|_| TagoTipError::InvalidVariable)?;

    let mut unit = None;
    let mut timestamp = None;
    let mut group = None;
    let mut meta = Vec::new();

    loop {
        match suffix(rest) {
            Ok((next_rest, parsed)) => {
                match parsed {
                    Suffix::Unit(u) => {
                        if unit.is_some() {
                            return Err(TagoTipError::InvalidVariable);
                        }
                        unit = Some(u);
                    }
                    Suffix::Timestamp(t) => {
                        if timestamp.is_some() {
                            return Err(TagoTipError::InvalidVariable);
                        }
                        timestamp = Some(t);
                    }
                    Suffix::Group(g) => {
                        if group.is_some() {
                            return Err(TagoTipError::InvalidVariable);
                        }
                        group = Some(g);
                    }
                    Suffix::Meta(pairs) => {
                        if !meta.is_empty() {
                            return Err(TagoTipError::InvalidVariable);
                        }
                        meta = pairs;
                    }
                }
                rest = next_rest;
            }
            Err(_) => break,
        }
    }

    Ok((
        rest,
        Variable {
            name: name_str.to_string(),
            value,
            unit,
            timestamp,
            group,
            meta,
        },
    ))
}

/// Serialize a variable, emitting suffixes in the canonical `# @ ^ {…}`
/// order regardless of how (if at all) the source frame ordered them.
pub fn write_variable(var: &Variable) -> String {
    let mut out = String::new();
    out.push_str(&var.name);
    out.push_str(&var.operator().to_string());
    out.push_str(&var.value.write_payload());

    if let Some(unit) = &var.unit {
        out.push('#');
        out.push_str(unit);
    }
    if let Some(timestamp) = &var.timestamp {
        out.push('@');
        out.push_str(timestamp);
    }
    if let Some(group) = &var.group {
        out.push('^');
        out.push_str(group);
    }
    if !var.meta.is_empty() {
        out.push('{');
        out.push_str(&crate::utils::join(&var.meta, ","));
        out.push('}');
    }

    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn number_variable() {
        let (rest, var) = parse_variable("temperature:=32.5;humidity:=65]").unwrap();
        assert_eq!(rest, ";humidity:=65]");
        assert_eq!(var.name, "temperature");
        assert_eq!(var.value, Value::Number("32.5".to_string()));
        assert_eq!(write_variable(&var), "temperature:=32.5");
    }

    #[test]
    fn full_suffix_set() {
        let input = "temp:=32#C@1694567890000^batch{source=dht22}]";
        let (rest, var) = parse_variable(input).unwrap();
        assert_eq!(rest, "]");
        assert_eq!(var.unit.as_deref(), Some("C"));
        assert_eq!(var.timestamp.as_deref(), Some("1694567890000"));
        assert_eq!(var.group.as_deref(), Some("batch"));
        assert_eq!(
            var.meta,
            vec![MetaPair {
                key: "source".to_string(),
                value: "dht22".to_string()
            }]
        );
        assert_eq!(write_variable(&var), &input[..input.len() - 1]);
    }

    #[test]
    fn location_variable() {
        let (rest, var) = parse_variable("pos@=39.74,-104.99,305]").unwrap();
        assert_eq!(rest, "]");
        match &var.value {
            Value::Location(loc) => {
                assert_eq!(loc.lat, "39.74");
                assert_eq!(loc.lng, "-104.99");
                assert_eq!(loc.alt.as_deref(), Some("305"));
            }
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn leading_zero_rejected() {
        assert_eq!(parse_variable("x:=01]"), Err(TagoTipError::InvalidVariable));
    }

    #[test]
    fn empty_string_value_rejected() {
        assert_eq!(parse_variable("x=]"), Err(TagoTipError::InvalidVariable));
    }

    #[test]
    fn duplicate_suffix_rejected() {
        assert_eq!(
            parse_variable("x:=1#C#F]"),
            Err(TagoTipError::InvalidVariable)
        );
    }
}
