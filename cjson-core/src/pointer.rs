//! JSON Pointer (RFC 6901): resolving a `/`-delimited reference token
//! path against a value tree, and the reverse direction (locating the
//! pointer that names a given child, used by the Patch diff generator).

use crate::error::{Error, Result};
use crate::value::Value;

/// Splits a pointer string into decoded reference tokens. `""` resolves
/// to the whole document and yields no tokens; a pointer not starting
/// with `/` is malformed.
pub(crate) fn tokens(pointer: &str) -> Result<Vec<String>> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    if !pointer.starts_with('/') {
        return Err(Error::InvalidPointer(pointer.to_owned()));
    }
    Ok(pointer[1..].split('/').map(unescape_token).collect())
}

/// `~1` then `~0`, in that order (RFC 6901 section 4): decoding `~0`
/// first would turn a literal `~01` into `/1` instead of `~1`.
fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

pub(crate) fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Resolves `pointer` against `root`, per RFC 6901, matching object keys
/// case-sensitively.
pub fn resolve<'a>(root: &'a Value, pointer: &str) -> Result<&'a Value> {
    resolve_with(root, pointer, true)
}

/// Same as [`resolve`], but object keys are matched case-insensitively
/// (mirrors the original's `getpointer`/`getpointercasesensitive` pair).
pub fn resolve_case_insensitive<'a>(root: &'a Value, pointer: &str) -> Result<&'a Value> {
    resolve_with(root, pointer, false)
}

fn resolve_with<'a>(root: &'a Value, pointer: &str, case_sensitive: bool) -> Result<&'a Value> {
    let tokens = tokens(pointer)?;
    let mut current = root;
    for token in &tokens {
        current = step(current, token, pointer, case_sensitive)?;
    }
    Ok(current)
}

fn step<'a>(
    current: &'a Value,
    token: &str,
    full_pointer: &str,
    case_sensitive: bool,
) -> Result<&'a Value> {
    match current {
        Value::Object(_) => {
            let found = if case_sensitive {
                current.get_object_item(token)
            } else {
                current.get_object_item_case_insensitive(token)
            };
            found.ok_or_else(|| Error::InvalidPointer(full_pointer.to_owned()))
        },
        Value::Array(_) => {
            let index = array_index(current, token, full_pointer)?;
            current
                .get_array_item(index)
                .ok_or_else(|| Error::InvalidPointer(full_pointer.to_owned()))
        },
        _ => Err(Error::InvalidPointer(full_pointer.to_owned())),
    }
}

/// Parses an array reference token: either `-` (one-past-the-end, valid
/// only as a Patch `add` target, never for resolution of an existing
/// element) or a non-negative integer with no leading zero (other than
/// `"0"` itself).
pub(crate) fn array_index(array: &Value, token: &str, full_pointer: &str) -> Result<usize> {
    if token == "-" {
        return array
            .array_len()
            .ok_or_else(|| Error::InvalidPointer(full_pointer.to_owned()));
    }
    if token.is_empty() || (token.len() > 1 && token.starts_with('0')) {
        return Err(Error::InvalidPointer(full_pointer.to_owned()));
    }
    token
        .parse::<usize>()
        .map_err(|_| Error::InvalidPointer(full_pointer.to_owned()))
}

/// Finds the pointer that locates `needle` as a direct or transitive
/// child of `root`, comparing node identity rather than structural
/// equality (two deep-equal siblings must not be confused). Used by the
/// Patch diff generator to express a `move` instead of a `remove`+`add`
/// pair when the moved value is byte-for-byte the same node.
pub fn find_pointer_to(root: &Value, needle: &Value) -> Option<String> {
    find_rec(root, needle, "")
}

fn find_rec(current: &Value, needle: &Value, prefix: &str) -> Option<String> {
    if std::ptr::eq(current, needle) {
        return Some(prefix.to_owned());
    }
    match current {
        Value::Array(a) => a.items().iter().enumerate().find_map(|(i, child)| {
            find_rec(child, needle, &format!("{}/{}", prefix, i))
        }),
        Value::Object(o) => o.members().iter().find_map(|m| {
            find_rec(&m.value, needle, &format!("{}/{}", prefix, escape_token(m.key.as_str())))
        }),
        _ => None,
    }
}
