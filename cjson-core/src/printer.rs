//! Serializer: renders a value tree back to text, in compact or
//! pretty-printed form.
//!
//! Numbers are the one place this cannot simply call into a crate:
//! `ryu`/`dtoa`-style formatters produce the shortest round-tripping
//! decimal, while the reference C library's `print_number` specifically
//! tries `%.15g` first and only widens to `%.17g` if a round-trip through
//! `strtod` disagrees, which occasionally prints a couple of redundant
//! trailing digits that a shortest-form formatter would omit. Matching
//! that exact behavior means reimplementing the round-trip-then-widen
//! probe by hand (see [`format_number`]).

use std::fmt::Write as _;

use crate::alloc::{global_allocator, Allocator};
use crate::error::{Error, Result};
use crate::value::{Array, Object, Value};

#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Multi-line, tab-indented output instead of the minimal compact form.
    pub pretty: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options { pretty: false }
    }
}

/// Renders `value` as compact JSON.
pub fn print(value: &Value) -> Result<String> {
    print_with_options(value, &Options::default())
}

/// Renders `value` as indented, multi-line JSON.
pub fn print_pretty(value: &Value) -> Result<String> {
    print_with_options(
        value,
        &Options {
            pretty: true,
            ..Options::default()
        },
    )
}

pub fn print_with_options(value: &Value, opts: &Options) -> Result<String> {
    let allocator = global_allocator();
    let mut buf = String::new();
    write_value(&mut buf, value, 0, opts, allocator.as_ref())?;
    Ok(buf)
}

/// Renders into a fixed-capacity buffer, failing with [`Error::Overflow`]
/// rather than growing past it. Mirrors `cJSON_PrintBuffered`'s
/// `fmt == false` / bounded-buffer mode.
pub fn print_bounded(value: &Value, capacity: usize, opts: &Options) -> Result<String> {
    let mut buf = String::with_capacity(capacity);
    let allocator = BoundedGuard { capacity };
    write_value(&mut buf, value, 0, opts, &allocator)?;
    Ok(buf)
}

/// Rejects any request past its fixed `capacity`; used only to give
/// [`print_bounded`] a cheap, allocation-free overflow check without
/// touching the global allocator hook.
struct BoundedGuard {
    capacity: usize,
}

impl Allocator for BoundedGuard {
    fn reserve(&self, bytes: usize) -> Result<()> {
        if bytes > self.capacity {
            Err(Error::Overflow)
        } else {
            Ok(())
        }
    }

    fn release(&self, _bytes: usize) {}
}

fn write_value(
    out: &mut String,
    value: &Value,
    depth: usize,
    opts: &Options,
    allocator: &dyn Allocator,
) -> Result<()> {
    match value {
        Value::Invalid => Err(Error::InvalidValue),
        Value::Null => write_literal(out, "null", allocator),
        Value::Bool(true) => write_literal(out, "true", allocator),
        Value::Bool(false) => write_literal(out, "false", allocator),
        Value::Number(n) => {
            let text = format_number(n.as_f64());
            reserve(allocator, text.len())?;
            out.push_str(&text);
            Ok(())
        },
        Value::String(t) => write_quoted(out, t.as_str(), allocator),
        Value::Raw(t) => {
            reserve(allocator, t.as_str().len())?;
            out.push_str(t.as_str());
            Ok(())
        },
        Value::Array(a) => write_array(out, a, depth, opts, allocator),
        Value::Object(o) => write_object(out, o, depth, opts, allocator),
    }
}

fn write_literal(out: &mut String, lit: &str, allocator: &dyn Allocator) -> Result<()> {
    reserve(allocator, lit.len())?;
    out.push_str(lit);
    Ok(())
}

fn reserve(allocator: &dyn Allocator, bytes: usize) -> Result<()> {
    allocator.reserve(bytes)
}

/// Arrays never break onto multiple lines, even in pretty mode: elements
/// are always separated by `,` (compact) or `, ` (pretty).
fn write_array(
    out: &mut String,
    array: &Array,
    depth: usize,
    opts: &Options,
    allocator: &dyn Allocator,
) -> Result<()> {
    reserve(allocator, 1)?;
    out.push('[');
    let items = array.items();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            reserve(allocator, if opts.pretty { 2 } else { 1 })?;
            out.push(',');
            if opts.pretty {
                out.push(' ');
            }
        }
        write_value(out, item, depth + 1, opts, allocator)?;
    }
    reserve(allocator, 1)?;
    out.push(']');
    Ok(())
}

/// Object members each sit on their own line in pretty mode, indented
/// with one tab per nesting level; the closing brace is indented one
/// level shallower than its members.
fn write_object(
    out: &mut String,
    object: &Object,
    depth: usize,
    opts: &Options,
    allocator: &dyn Allocator,
) -> Result<()> {
    reserve(allocator, 1)?;
    out.push('{');
    if opts.pretty && !object.is_empty() {
        reserve(allocator, 1)?;
        out.push('\n');
    }
    let members = object.members();
    for (i, member) in members.iter().enumerate() {
        tab_indent(out, depth + 1, opts, allocator)?;
        write_quoted(out, member.key.as_str(), allocator)?;
        reserve(allocator, if opts.pretty { 2 } else { 1 })?;
        out.push(':');
        if opts.pretty {
            out.push('\t');
        }
        write_value(out, &member.value, depth + 1, opts, allocator)?;
        if i + 1 < members.len() {
            reserve(allocator, 1)?;
            out.push(',');
        }
        if opts.pretty {
            reserve(allocator, 1)?;
            out.push('\n');
        }
    }
    if !members.is_empty() {
        tab_indent(out, depth, opts, allocator)?;
    }
    reserve(allocator, 1)?;
    out.push('}');
    Ok(())
}

fn tab_indent(
    out: &mut String,
    depth: usize,
    opts: &Options,
    allocator: &dyn Allocator,
) -> Result<()> {
    if !opts.pretty {
        return Ok(());
    }
    reserve(allocator, depth)?;
    for _ in 0..depth {
        out.push('\t');
    }
    Ok(())
}

/// RFC 8259 `"` escaping, widened with the C library's `\b`/`\f`
/// shorthand for the two control characters that have one.
fn write_quoted(out: &mut String, s: &str, allocator: &dyn Allocator) -> Result<()> {
    reserve(allocator, s.len() + 2)?;
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            },
            c => out.push(c),
        }
    }
    out.push('"');
    Ok(())
}

/// Formats a double the way `print_number` in the reference
/// implementation does: non-finite values become `"null"`; integral
/// values that fit the saturated `i32` view print without a decimal
/// point; everything else tries `%.15g`, and only widens to `%.17g` if
/// reparsing the 15-digit form doesn't produce the same bits back.
fn format_number(d: f64) -> String {
    if !d.is_finite() {
        return "null".to_owned();
    }
    if d == 0.0 {
        return "0".to_owned();
    }
    if d.fract() == 0.0 && d.abs() < 1e15 {
        return format!("{}", d as i64);
    }

    let short = format_g(d, 15);
    if short.parse::<f64>().map(|v| v == d).unwrap_or(false) {
        return short;
    }
    format_g(d, 17)
}

/// A `printf("%.{precision}g", d)` equivalent: Rust has no built-in `%g`,
/// so significant-digit rounding is done via `{:.*e}` and then rewritten
/// into fixed or scientific notation following the same exponent
/// threshold `%g` uses (scientific when the decimal exponent is `< -4`
/// or `>= precision`).
fn format_g(d: f64, precision: usize) -> String {
    let scientific = format!("{:.*e}", precision - 1, d);
    let (mantissa, exp) = scientific.split_once('e').expect("`{:e}` always has an exponent");
    let exp: i32 = exp.parse().expect("exponent is always a valid integer");

    if exp < -4 || exp >= precision as i32 {
        let mantissa = trim_trailing_zeros(mantissa);
        format!("{}e{}{:02}", mantissa, if exp < 0 { "-" } else { "+" }, exp.abs())
    } else {
        let decimals = (precision as i32 - 1 - exp).max(0) as usize;
        let fixed = format!("{:.*}", decimals, d);
        trim_trailing_zeros(&fixed).to_owned()
    }
}

fn trim_trailing_zeros(s: &str) -> &str {
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0');
    trimmed.strip_suffix('.').unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn prints_compact_object() {
        let mut v = Value::object();
        v.add_to_object("a", Value::number(1.0)).unwrap();
        v.add_to_object("b", Value::array_of_numbers([1.0, 2.0]))
            .unwrap();
        assert_eq!(print(&v).unwrap(), r#"{"a":1,"b":[1,2]}"#);
    }

    #[test]
    fn pretty_prints_with_tab_indentation() {
        let mut v = Value::object();
        v.add_to_object("a", Value::number(1.0)).unwrap();
        assert_eq!(print_pretty(&v).unwrap(), "{\n\t\"a\":\t1\n}");
    }

    #[test]
    fn pretty_prints_nested_object_with_one_tab_per_level() {
        let mut inner = Value::object();
        inner.add_to_object("b", Value::number(2.0)).unwrap();
        let mut outer = Value::object();
        outer.add_to_object("a", inner).unwrap();
        assert_eq!(
            print_pretty(&outer).unwrap(),
            "{\n\t\"a\":\t{\n\t\t\"b\":\t2\n\t}\n}"
        );
    }

    #[test]
    fn pretty_prints_array_elements_space_separated_on_one_line() {
        let v = Value::array_of_numbers([1.0, 2.0, 3.0]);
        assert_eq!(print_pretty(&v).unwrap(), "[1, 2, 3]");
    }

    #[test]
    fn escapes_control_characters() {
        let v = Value::string("a\nb\tc\u{0001}");
        assert_eq!(print(&v).unwrap(), r#""a\nb\tc\u0001""#);
    }

    #[test]
    fn raw_is_emitted_verbatim() {
        let v = Value::raw("{ malformed but untouched }");
        assert_eq!(print(&v).unwrap(), "{ malformed but untouched }");
    }

    #[test]
    fn non_finite_numbers_print_as_null() {
        assert_eq!(format_number(f64::NAN), "null");
        assert_eq!(format_number(f64::INFINITY), "null");
    }

    #[test]
    fn integral_values_have_no_decimal_point() {
        assert_eq!(format_number(30.0), "30");
        assert_eq!(format_number(-7.0), "-7");
    }

    #[test]
    fn fractional_values_round_trip() {
        let d: f64 = 0.1 + 0.2;
        let printed = format_number(d);
        assert_eq!(printed.parse::<f64>().unwrap(), d);
    }

    #[test]
    fn bounded_print_overflows_on_small_capacity() {
        let v = Value::string("a string long enough to overflow");
        assert!(matches!(
            print_bounded(&v, 4, &Options::default()),
            Err(Error::Overflow)
        ));
    }
}
