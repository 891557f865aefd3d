//! Minifier: strips insignificant whitespace and `//` / `/* */` comments
//! from a JSON text in place, without building a [`Value`] tree.
//!
//! The reference implementation does this as a single forward scan that
//! compacts the buffer as it goes (`cJSON_Minify`), which is cheap
//! enough that there's no reason to allocate a second buffer; the same
//! in-place-compaction shape is kept here via a read/write cursor pair
//! over a `Vec<u8>`.
//!
//! Comments are accepted even though they are not legal JSON and the
//! parser itself rejects them: minification is a separate, permissive
//! pre-processing pass a caller can run before handing text to the
//! parser.

/// Minifies `text` in place and returns the number of significant bytes
/// remaining; the buffer is truncated to that length.
pub fn minify(text: &mut Vec<u8>) {
    let mut write = 0;
    let mut read = 0;
    let bytes = text.clone();

    while read < bytes.len() {
        match bytes[read] {
            b' ' | b'\t' | b'\r' | b'\n' => read += 1,
            b'/' if bytes.get(read + 1) == Some(&b'/') => {
                read += 2;
                while read < bytes.len() && bytes[read] != b'\n' {
                    read += 1;
                }
            },
            b'/' if bytes.get(read + 1) == Some(&b'*') => {
                read += 2;
                while read < bytes.len()
                    && !(bytes[read] == b'*' && bytes.get(read + 1) == Some(&b'/'))
                {
                    read += 1;
                }
                read = (read + 2).min(bytes.len());
            },
            b'"' => {
                let start = read;
                read += 1;
                while read < bytes.len() && bytes[read] != b'"' {
                    if bytes[read] == b'\\' {
                        read += 1;
                    }
                    read += 1;
                }
                read = (read + 1).min(bytes.len());
                for &b in &bytes[start..read] {
                    text[write] = b;
                    write += 1;
                }
            },
            b => {
                text[write] = b;
                write += 1;
                read += 1;
            },
        }
    }

    text.truncate(write);
}

/// Convenience wrapper over [`minify`] for callers with a `&str`.
pub fn minify_str(text: &str) -> String {
    let mut buf = text.as_bytes().to_vec();
    minify(&mut buf);
    String::from_utf8(buf).expect("minify only removes ASCII whitespace and comment bytes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_whitespace() {
        assert_eq!(minify_str(" { \"a\" : 1 }\n"), r#"{"a":1}"#);
    }

    #[test]
    fn strips_line_comment() {
        assert_eq!(minify_str("{\"a\":1 // trailing note\n}"), r#"{"a":1}"#);
    }

    #[test]
    fn strips_block_comment() {
        assert_eq!(minify_str("{/* a note */\"a\":1}"), r#"{"a":1}"#);
    }

    #[test]
    fn preserves_content_inside_strings() {
        assert_eq!(
            minify_str(r#"{"a": "  // not a comment  "}"#),
            r#"{"a":"  // not a comment  "}"#
        );
    }

    #[test]
    fn preserves_escaped_quote_inside_strings() {
        assert_eq!(
            minify_str(r#"{"a": "he said \"hi\""}"#),
            r#"{"a":"he said \"hi\""}"#
        );
    }
}
