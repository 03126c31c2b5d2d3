//! Filter expression parser using nom
//!
//! Grammar:
//! ```text
//! filter := column op value
//! column := ident
//! op     := '<' | '<=' | '>' | '>=' | '==' | '!='
//! value  := number | string | ident
//! ```
//!
//! The operator is tokenized first and then looked up in the closed
//! [`ComparisonOp`] set, so an out-of-set token such as `~` or `=` fails
//! with [`ParseError::UnknownOperator`] instead of being installed as an
//! undefined filter.

use crate::ast::{ComparisonOp, FilterSpec, FilterValue};
use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::{map, recognize},
    number::complete::double,
    sequence::{delimited, pair},
    IResult,
};
use thiserror::Error;

/// Parse errors
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("empty filter expression")]
    Empty,

    #[error("parse error: {0}")]
    Parse(String),

    #[error("unknown operator: '{0}'")]
    UnknownOperator(String),

    #[error("unexpected characters at end: '{0}'")]
    TrailingInput(String),
}

/// Parse a filter expression from a string
pub fn parse_filter(input: &str) -> Result<FilterSpec, ParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseError::Empty);
    }

    let (rest, column) =
        ws(identifier)(input).map_err(|_| ParseError::Parse("expected column name".to_string()))?;

    let (rest, op_token) = ws(operator_token)(rest)
        .map_err(|_| ParseError::Parse("expected comparison operator".to_string()))?;
    let op = ComparisonOp::from_token(op_token)
        .ok_or_else(|| ParseError::UnknownOperator(op_token.to_string()))?;

    let (rest, value) = ws(filter_value)(rest)
        .map_err(|_| ParseError::Parse("expected comparison value".to_string()))?;

    if !rest.is_empty() {
        return Err(ParseError::TrailingInput(rest.to_string()));
    }

    Ok(FilterSpec::new(column, op, value))
}

/// Parse whitespace
fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parse an identifier (starts with letter or underscore, followed by alphanumeric or underscore)
fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))(input)
}

/// Tokenize a run of operator characters; validity is decided by the caller
fn operator_token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| "<>=!~".contains(c))(input)
}

/// Parse a value: number, quoted string, or bare word
fn filter_value(input: &str) -> IResult<&str, FilterValue> {
    alt((
        map(parse_number, FilterValue::Number),
        map(string_literal, |s| FilterValue::Text(s.to_string())),
        map(identifier, |s| FilterValue::Text(s.to_string())),
    ))(input)
}

/// Parse a number (including scientific notation)
fn parse_number(input: &str) -> IResult<&str, f64> {
    double(input)
}

/// Parse a string literal
fn string_literal(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_while1(|c| c != '"'), char('"')),
        delimited(char('\''), take_while1(|c| c != '\''), char('\'')),
    ))(input)
}
