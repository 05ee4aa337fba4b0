//! Positional parameter substitution for SoQL templates.
//!
//! A template mixes plain text with two placeholder kinds:
//!
//! ```text
//! ?? = ? AND note = 'literal ?'
//! ┬─   ┬             ─────┬─────
//! │    │                  └── quoted span, copied verbatim
//! │    └── value placeholder (escaped literal)
//! └── identifier placeholder (back-tick quoted)
//! ```
//!
//! Both placeholder kinds share one cursor into the parameter list.

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take, take_till1},
    character::complete::{anychar, char},
    combinator::{map, recognize, value},
    multi::many0,
    sequence::{delimited, pair},
    IResult,
};
use tracing::trace;

use crate::error::SodaResult;
use crate::value::{format_identifier, format_value, Value};

/// One lexical piece of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Plain text outside quotes.
    Text(&'a str),
    /// A `'...'` or `"..."` span, quotes included.
    Quoted(&'a str),
    /// `??`
    Identifier,
    /// `?`
    Value,
}

impl Segment<'_> {
    fn as_str(&self) -> &str {
        match self {
            Segment::Text(s) | Segment::Quoted(s) => s,
            Segment::Identifier => "??",
            Segment::Value => "?",
        }
    }
}

/// Quoted span with backslash escapes, e.g. `'it\'s'`.
fn quoted_span<'a>(input: &'a str, quote: char, stop: &'static str) -> IResult<&'a str, &'a str> {
    recognize(delimited(
        char(quote),
        many0(alt((is_not(stop), recognize(pair(char('\\'), anychar))))),
        char(quote),
    ))(input)
}

fn single_quoted(input: &str) -> IResult<&str, &str> {
    quoted_span(input, '\'', "'\\")
}

fn double_quoted(input: &str) -> IResult<&str, &str> {
    quoted_span(input, '"', "\"\\")
}

fn segment(input: &str) -> IResult<&str, Segment<'_>> {
    alt((
        map(single_quoted, Segment::Quoted),
        map(double_quoted, Segment::Quoted),
        value(Segment::Identifier, tag("??")),
        value(Segment::Value, tag("?")),
        map(take_till1(|c: char| c == '\'' || c == '"' || c == '?'), Segment::Text),
        // Unbalanced quote character
        map(take(1usize), Segment::Text),
    ))(input)
}

/// Split a template into segments.
pub fn tokenize(template: &str) -> Vec<Segment<'_>> {
    match many0(segment)(template) {
        Ok((_, segments)) => segments,
        Err(_) => vec![Segment::Text(template)],
    }
}

/// Replace placeholders in `template` with rendered `params`, left to right.
///
/// Placeholders inside quoted spans are left alone. Surplus placeholders
/// stay unrendered. An empty parameter list returns the template as is.
pub fn substitute(template: &str, params: &[Value]) -> SodaResult<String> {
    if params.is_empty() {
        return Ok(template.to_string());
    }

    let mut out = String::with_capacity(template.len());
    let mut cursor = params.iter();

    for seg in tokenize(template) {
        match seg {
            Segment::Identifier | Segment::Value => match cursor.next() {
                Some(param) if seg == Segment::Identifier => out.push_str(&format_identifier(param)?),
                Some(param) => out.push_str(&format_value(param)?),
                None => out.push_str(seg.as_str()),
            },
            other => out.push_str(other.as_str()),
        }
    }

    trace!(template, rendered = %out, "substituted template");
    Ok(out)
}
