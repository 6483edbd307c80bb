//! Operator, value, and metadata types (§3).
//!
//! `Value` is a true tagged union, not a struct of exclusive `Option`s:
//! construction alone enforces that exactly one payload kind is
//! populated, matching the operator that selected it (§9 "Tagged body
//! unions").

use std::fmt;

/// Operator sigil, `:=` `=` `?=` `@=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Number,
    String,
    Boolean,
    Location,
}

impl Operator {
    pub fn sigil(self) -> &'static str {
        match self {
            Operator::Number => ":=",
            Operator::String => "=",
            Operator::Boolean => "?=",
            Operator::Location => "@=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sigil())
    }
}

/// Two or three signed-decimal strings, never reparsed as floats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationValue {
    pub lat: String,
    pub lng: String,
    pub alt: Option<String>,
}

impl fmt::Display for LocationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)?;
        if let Some(alt) = &self.alt {
            write!(f, ",{}", alt)?;
        }
        Ok(())
    }
}

/// A variable's value, tagged by the operator that produced it.
///
/// Numeric and string payloads are kept as `String`: parsing them to
/// `f64` and formatting back would not guarantee byte-exact round-trip
/// (§9 "String-preserving numerics").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Number(String),
    String(String),
    Boolean(bool),
    Location(LocationValue),
}

impl Value {
    pub fn operator(&self) -> Operator {
        match self {
            Value::Number(_) => Operator::Number,
            Value::String(_) => Operator::String,
            Value::Boolean(_) => Operator::Boolean,
            Value::Location(_) => Operator::Location,
        }
    }

    /// The literal text following the operator sigil.
    pub fn write_payload(&self) -> String {
        match self {
            Value::Number(s) => s.clone(),
            Value::String(s) => s.clone(),
            Value::Boolean(b) => if *b { "true" } else { "false" }.to_string(),
            Value::Location(loc) => loc.to_string(),
        }
    }
}

/// An ordered `(key, value)` pair inside a meta block. Duplicate keys
/// are preserved; meta lists are sequences, not maps (§9 "Meta-pair
/// ordering").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaPair {
    pub key: String,
    pub value: String,
}

impl fmt::Display for MetaPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}
