use std::fmt::Debug;

use crate::error::Result;

/// Known-answer test: parse `input`, assert it matches `expected`, then
/// rebuild it and assert the rebuild is byte-identical to `input`.
///
/// Only meaningful for canonically-ordered input (§9 "Canonical
/// serialization order") — callers exercising non-canonical suffix
/// order should assert the parsed value directly instead.
pub fn kat_roundtrip<T, P, B>(input: &str, expected: &T, parse: P, build: B)
where
    T: Debug + PartialEq,
    P: Fn(&str) -> Result<T>,
    B: Fn(&T) -> String,
{
    let parsed = parse(input).expect("input should parse");
    assert_eq!(&parsed, expected);
    assert_eq!(build(&parsed), input);
}
