//! A tokenless recursive-descent parser over a
//! length-bounded byte slice.
//!
//! The outer grammar (value dispatch, array/object recursion, depth
//! counting, byte-offset tracking) is hand-written rather than expressed
//! as plain `nom` combinators: depth limiting must short-circuit *before*
//! recursing and the per-thread error channel needs the exact byte offset
//! of the failure, neither of which compose cleanly with `nom`'s
//! stateless combinator style. `nom` is still used for decoding the
//! contents of a quoted string (see [`string`]), since that piece is
//! naturally expressed as alternation over literal/escape fragments.

use nom::{
    bytes::complete::tag,
    combinator::map,
    error::{Error as NomError, ErrorKind, ParseError},
    Err as NomErr, IResult,
};

use crate::error::{set_last_parse_error_offset, Error, Result};
use crate::value::{Array, Member, Object, Value};

mod string;

type PResult<'a, O> = IResult<&'a str, O, NomError<&'a str>>;

/// Maximum array/object nesting depth (`STB_JSON_NESTING_LIMIT` in the
/// reference implementation).
pub const NESTING_LIMIT: usize = 1000;

#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// After the top-level value, require (whitespace)* then a NUL byte.
    pub require_null_terminated: bool,
    /// Overrides [`NESTING_LIMIT`] for this parse.
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            require_null_terminated: false,
            max_depth: NESTING_LIMIT,
        }
    }
}

/// Parses `input` with default options, discarding trailing bytes.
pub fn parse(input: &[u8]) -> Result<Value> {
    parse_with_options(input, &Options::default()).map(|(value, _)| value)
}

/// Parses `input`, returning the value and the number of bytes consumed
/// (i.e. `return_parse_end` as an offset rather than a raw pointer).
pub fn parse_with_options(input: &[u8], opts: &Options) -> Result<(Value, usize)> {
    let bom_len = if input.starts_with(&[0xEF, 0xBB, 0xBF]) {
        3
    } else {
        0
    };

    // Only the bytes the grammar actually consumes need to be valid UTF-8;
    // trailing garbage past the parsed value (discarded by `parse`, or
    // re-checked byte-wise by the null-terminator check below) must not
    // make an otherwise well-formed document fail to parse. So UTF-8 is
    // validated only up to the first bad byte, and the grammar runs over
    // that valid prefix; a value that genuinely needs bytes past it still
    // fails, just via the ordinary parse-error path below.
    let rest = &input[bom_len..];
    let text = match std::str::from_utf8(rest) {
        Ok(text) => text,
        Err(err) => std::str::from_utf8(&rest[..err.valid_up_to()])
            .expect("valid_up_to bounds a valid UTF-8 prefix"),
    };

    let (value, consumed_text) = match parse_value(text, 0, opts.max_depth) {
        Ok((rest, value)) => (value, text.len() - rest.len()),
        Err(err) => return Err(fail(input, bom_len + failure_offset(text, err))),
    };

    let mut consumed = bom_len + consumed_text;

    if opts.require_null_terminated {
        let rest = &input[consumed..];
        let ws_len = rest
            .iter()
            .take_while(|&&b| b <= 0x20)
            .count();
        let after_ws = consumed + ws_len;
        if after_ws >= input.len() || input[after_ws] != 0 {
            return Err(fail(input, after_ws));
        }
        consumed = after_ws + 1;
    }

    Ok((value, consumed))
}

fn failure_offset(original: &str, err: NomErr<NomError<&str>>) -> usize {
    let remaining = match err {
        NomErr::Error(e) | NomErr::Failure(e) => e.input,
        NomErr::Incomplete(_) => "",
    };
    original.len() - remaining.len()
}

fn fail(input: &[u8], offset: usize) -> Error {
    let offset = if offset >= input.len() {
        input.len().saturating_sub(1)
    } else {
        offset
    };
    set_last_parse_error_offset(offset);
    tracing::debug!(offset, "json parse failed");
    Error::Parse { offset }
}

fn skip_ws(input: &str) -> &str {
    input.trim_start_matches(|c: char| (c as u32) <= 0x20)
}

fn err<'a>(input: &'a str, kind: ErrorKind) -> NomErr<NomError<&'a str>> {
    NomErr::Error(NomError::from_error_kind(input, kind))
}

fn fail_err<'a>(input: &'a str, kind: ErrorKind) -> NomErr<NomError<&'a str>> {
    NomErr::Failure(NomError::from_error_kind(input, kind))
}

fn parse_value<'a>(input: &'a str, depth: usize, max_depth: usize) -> PResult<'a, Value> {
    let input = skip_ws(input);
    match input.as_bytes().first() {
        Some(b'n') => map(tag("null"), |_| Value::Null)(input),
        Some(b't') => map(tag("true"), |_| Value::Bool(true))(input),
        Some(b'f') => map(tag("false"), |_| Value::Bool(false))(input),
        Some(b'"') => map(string::parse, Value::string)(input),
        Some(b'[') => parse_array(input, depth, max_depth),
        Some(b'{') => parse_object(input, depth, max_depth),
        Some(b'-') | Some(b'0'..=b'9') => parse_number(input),
        _ => Err(err(input, ErrorKind::Alt)),
    }
}

/// Accepts `-? digits (. digits)? ([eE][+-]? digits)?`, matching the
/// maximal-run pre-scan the reference C parser performs before handing
/// the slice to `strtod`. `f64::from_str` is used for the actual
/// conversion: it is locale-independent, which `strtod` is not
/// guaranteed to be.
fn parse_number(input: &str) -> PResult<Value> {
    let end = input
        .as_bytes()
        .iter()
        .take_while(|&&b| matches!(b, b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E'))
        .count();
    if end == 0 {
        return Err(err(input, ErrorKind::Digit));
    }
    let (number_str, rest) = input.split_at(end);
    match number_str.parse::<f64>() {
        Ok(d) if d.is_finite() => Ok((rest, Value::number(d))),
        _ => Err(fail_err(input, ErrorKind::Float)),
    }
}

fn parse_array<'a>(input: &'a str, depth: usize, max_depth: usize) -> PResult<'a, Value> {
    let input = tag("[")(input).map(|(rest, _)| rest)?;
    if depth + 1 > max_depth {
        return Err(fail_err(input, ErrorKind::TooLarge));
    }
    let depth = depth + 1;

    let input = skip_ws(input);
    if let Some(rest) = input.strip_prefix(']') {
        return Ok((rest, Value::array()));
    }

    let mut items = Vec::new();
    let mut input = input;
    loop {
        let (rest, value) = parse_value(input, depth, max_depth).map_err(to_failure)?;
        items.push(value);
        input = skip_ws(rest);
        match input.strip_prefix(',') {
            Some(rest) => input = skip_ws(rest),
            None => break,
        }
    }

    let rest = input
        .strip_prefix(']')
        .ok_or_else(|| fail_err(input, ErrorKind::Char))?;
    Ok((rest, Value::Array(Array::Owned(items))))
}

fn parse_object<'a>(input: &'a str, depth: usize, max_depth: usize) -> PResult<'a, Value> {
    let input = tag("{")(input).map(|(rest, _)| rest)?;
    if depth + 1 > max_depth {
        return Err(fail_err(input, ErrorKind::TooLarge));
    }
    let depth = depth + 1;

    let input = skip_ws(input);
    if let Some(rest) = input.strip_prefix('}') {
        return Ok((rest, Value::object()));
    }

    let mut members = Vec::new();
    let mut input = input;
    loop {
        if !input.starts_with('"') {
            return Err(fail_err(input, ErrorKind::Char));
        }
        let (rest, key) = string::parse(input).map_err(to_failure)?;
        let rest = skip_ws(rest);
        let rest = rest
            .strip_prefix(':')
            .ok_or_else(|| fail_err(rest, ErrorKind::Char))?;
        let rest = skip_ws(rest);
        let (rest, value) = parse_value(rest, depth, max_depth).map_err(to_failure)?;
        members.push(Member::new(key, value));
        input = skip_ws(rest);
        match input.strip_prefix(',') {
            Some(rest) => input = skip_ws(rest),
            None => break,
        }
    }

    let rest = input
        .strip_prefix('}')
        .ok_or_else(|| fail_err(input, ErrorKind::Char))?;
    Ok((rest, Value::Object(Object::Owned(members))))
}

/// Once we are inside an open `[`/`{`, a further grammar mismatch is not
/// recoverable by trying another alternative, matching the reference
/// parser's "a malformed member aborts the whole parse" behavior (the
/// same role `nom::combinator::cut` plays in combinator-only parsers).
fn to_failure(e: NomErr<NomError<&str>>) -> NomErr<NomError<&str>> {
    match e {
        NomErr::Error(inner) => NomErr::Failure(inner),
        other => other,
    }
}
