//! JSON string-literal decoding, built with `nom` combinators (`alt`,
//! `fold_many0`, `delimited`, a fragment enum): the one piece of this
//! parser that is naturally expressed as alternation over literal and
//! escape sequences rather than hand-rolled scanning. Decodes escapes to
//! real characters and threads UTF-16 surrogate pairs through to a
//! single `char`.

use nom::{
    branch::alt,
    bytes::complete::{tag, take, take_while1},
    character::complete::{anychar, char},
    combinator::map,
    error::{Error as NomError, ErrorKind, ParseError},
    multi::fold_many0,
    sequence::{delimited, preceded},
    Err as NomErr, IResult,
};

pub(super) type PResult<'a, O> = IResult<&'a str, O, NomError<&'a str>>;

fn is_unescaped_char(c: char) -> bool {
    let v = c as u32;
    v >= 0x20 && v != 0x22 && v != 0x5C
}

enum Fragment<'a> {
    Literal(&'a str),
    Char(char),
}

fn literal(input: &str) -> PResult<&str> {
    take_while1(is_unescaped_char)(input)
}

fn hex4(input: &str) -> PResult<u32> {
    let (rest, digits) = take(4usize)(input)?;
    match u32::from_str_radix(digits, 16) {
        Ok(v) => Ok((rest, v)),
        Err(_) => Err(NomErr::Failure(NomError::from_error_kind(
            input,
            ErrorKind::HexDigit,
        ))),
    }
}

/// `\uXXXX`, combining a high/low surrogate pair into one scalar value if
/// present. A lone high surrogate not followed by a low surrogate, or a
/// lone low surrogate, is a hard parse failure.
fn unicode_escape(input: &str) -> PResult<char> {
    let (rest, _) = tag("\\u")(input)?;
    let (rest, high) = hex4(rest)?;

    if (0xDC00..=0xDFFF).contains(&high) {
        return Err(NomErr::Failure(NomError::from_error_kind(
            input,
            ErrorKind::Verify,
        )));
    }

    if !(0xD800..=0xDBFF).contains(&high) {
        let c = char::from_u32(high).ok_or_else(|| {
            NomErr::Failure(NomError::from_error_kind(input, ErrorKind::Verify))
        })?;
        return Ok((rest, c));
    }

    // High surrogate: a matching `\uXXXX` low surrogate must follow.
    let (rest, _) = tag("\\u")(rest)
        .map_err(|_: NomErr<NomError<&str>>| {
            NomErr::Failure(NomError::from_error_kind(rest, ErrorKind::Tag))
        })?;
    let (rest, low) = hex4(rest)?;
    if !(0xDC00..=0xDFFF).contains(&low) {
        return Err(NomErr::Failure(NomError::from_error_kind(
            input,
            ErrorKind::Verify,
        )));
    }

    let codepoint = 0x10000 + (((high - 0xD800) << 10) | (low - 0xDC00));
    let c = char::from_u32(codepoint)
        .ok_or_else(|| NomErr::Failure(NomError::from_error_kind(input, ErrorKind::Verify)))?;
    Ok((rest, c))
}

fn simple_escape(input: &str) -> PResult<char> {
    let (rest, c) = preceded(char('\\'), anychar)(input)?;
    let decoded = match c {
        '"' => '"',
        '\\' => '\\',
        '/' => '/',
        'b' => '\u{0008}',
        'f' => '\u{000C}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        _ => return Err(NomErr::Error(NomError::from_error_kind(input, ErrorKind::Char))),
    };
    Ok((rest, decoded))
}

fn fragment(input: &str) -> PResult<Fragment<'_>> {
    alt((
        map(literal, Fragment::Literal),
        map(unicode_escape, Fragment::Char),
        map(simple_escape, Fragment::Char),
    ))(input)
}

/// Parses a `"`-delimited JSON string, fully decoded.
pub fn parse(input: &str) -> PResult<String> {
    delimited(
        char('"'),
        fold_many0(fragment, String::new, |mut acc, frag| {
            match frag {
                Fragment::Literal(s) => acc.push_str(s),
                Fragment::Char(c) => acc.push(c),
            }
            acc
        }),
        char('"'),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(input: &str) -> String {
        let (rest, s) = parse(input).unwrap();
        assert_eq!(rest, "");
        s
    }

    #[test]
    fn plain_string() {
        assert_eq!(parse_all("\"hello\""), "hello");
    }

    #[test]
    fn short_escapes() {
        assert_eq!(parse_all("\"a\\nb\\tc\""), "a\nb\tc");
    }

    #[test]
    fn surrogate_pair_decodes_to_emoji() {
        // U+1D11E MUSICAL SYMBOL G CLEF
        let decoded = parse_all("\"\\uD834\\uDD1E\"");
        assert_eq!(decoded.as_bytes(), [0xF0, 0x9D, 0x84, 0x9E]);
    }

    #[test]
    fn lone_high_surrogate_is_an_error() {
        assert!(parse("\"\\uD834x\"").is_err());
    }

    #[test]
    fn control_byte_is_rejected() {
        assert!(parse("\"a\u{0001}b\"").is_err());
    }
}
