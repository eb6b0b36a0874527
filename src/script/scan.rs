//! Explicit text scanners backing the grammar nodes.
//!
//! T-SQL whitespace here always means whitespace characters plus `--` line
//! comments and `/* */` block comments, since the scripts this crate reads
//! back were often edited by hand.

/// Length in bytes of the whitespace-and-comments run at the start of `input`.
///
/// A line comment runs to the next newline or to the end of the input. Block
/// comments do not nest. An unterminated block comment is not part of the
/// run, so callers see it as ordinary (mismatching) text.
pub(crate) fn whitespace_run(input: &str) -> usize {
    let bytes = input.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        let b = bytes[pos];
        if b.is_ascii_whitespace() {
            pos += 1;
        } else if b == b'-' && pos + 1 < bytes.len() && bytes[pos + 1] == b'-' {
            pos += 2;
            while pos < bytes.len() && bytes[pos] != b'\n' {
                pos += 1;
            }
        } else if b == b'/' && pos + 1 < bytes.len() && bytes[pos + 1] == b'*' {
            match block_comment_end(bytes, pos + 2) {
                Some(end) => pos = end,
                None => break,
            }
        } else {
            break;
        }
    }
    pos
}

/// Position just past the `*/` closing a block comment whose body starts at
/// `pos`, if the comment is terminated at all.
fn block_comment_end(bytes: &[u8], mut pos: usize) -> Option<usize> {
    while pos + 1 < bytes.len() {
        if bytes[pos] == b'*' && bytes[pos + 1] == b'/' {
            return Some(pos + 2);
        }
        pos += 1;
    }
    None
}

/// A scanned identifier, delimiters and surrounding whitespace removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IdentifierToken<'a> {
    /// The bare identifier text.
    pub(crate) name: &'a str,
    /// Total bytes consumed, leading and trailing whitespace included.
    pub(crate) len: usize,
}

/// Scan an identifier at the start of `input`.
///
/// Accepts `[bracketed]` and `"quoted"` identifiers (first closing delimiter
/// ends them, empty ones are rejected) as well as regular identifiers.
/// Whitespace and comments on either side belong to the token, which is what
/// lets grammars put identifiers directly against literal punctuation.
pub(crate) fn identifier_token(input: &str) -> Option<IdentifierToken<'_>> {
    let lead = whitespace_run(input);
    let rest = &input[lead..];
    let (name, token_len) = if let Some(inner) = delimited(rest, '[', ']') {
        (inner, inner.len() + 2)
    } else if let Some(inner) = delimited(rest, '"', '"') {
        (inner, inner.len() + 2)
    } else {
        let end = regular_identifier_end(rest);
        if end == 0 {
            return None;
        }
        (&rest[..end], end)
    };
    let trail = whitespace_run(&rest[token_len..]);
    Some(IdentifierToken {
        name,
        len: lead + token_len + trail,
    })
}

/// Non-empty text between `open` and the first `close`, if `rest` starts
/// with `open`.
fn delimited(rest: &str, open: char, close: char) -> Option<&str> {
    let tail = rest.strip_prefix(open)?;
    let inner_len = tail.find(close)?;
    if inner_len == 0 {
        return None;
    }
    Some(&tail[..inner_len])
}

/// Byte length of the regular identifier at the start of `rest`, or zero.
///
/// The first character must not be a digit; afterwards any alphanumeric
/// character (Unicode included) or `_`, `@`, `$`, `#` continues the token.
fn regular_identifier_end(rest: &str) -> usize {
    let mut chars = rest.char_indices();
    match chars.next() {
        Some((_, c)) if is_identifier_char(c) && !c.is_numeric() => {}
        _ => return 0,
    }
    for (idx, c) in chars {
        if !is_identifier_char(c) {
            return idx;
        }
    }
    rest.len()
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '@' | '$' | '#')
}

/// Check whether `input` starts with `prefix`, ignoring ASCII case.
pub(crate) fn starts_with_ignore_ascii_case(input: &str, prefix: &str) -> bool {
    input
        .as_bytes()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_run_plain() {
        assert_eq!(whitespace_run("  \t\r\n  x"), 7);
        assert_eq!(whitespace_run("x"), 0);
        assert_eq!(whitespace_run(""), 0);
    }

    #[test]
    fn test_whitespace_run_line_comment() {
        assert_eq!(whitespace_run("-- note\nx"), 8);
        // A line comment may be ended by the end of the input.
        assert_eq!(whitespace_run("-- note"), 7);
        // A single dash is not a comment.
        assert_eq!(whitespace_run("- x"), 0);
    }

    #[test]
    fn test_whitespace_run_block_comment() {
        assert_eq!(whitespace_run("/* a */x"), 7);
        assert_eq!(whitespace_run(" /* a */ /* b */x"), 16);
        // Unterminated block comments are plain text.
        assert_eq!(whitespace_run("/* a"), 0);
        assert_eq!(whitespace_run("  /* a"), 2);
    }

    #[test]
    fn test_identifier_regular() {
        let token = identifier_token("name rest").unwrap();
        assert_eq!(token.name, "name");
        assert_eq!(token.len, 5);
        let token = identifier_token("_a1$#@.").unwrap();
        assert_eq!(token.name, "_a1$#@");
        assert_eq!(token.len, 6);
    }

    #[test]
    fn test_identifier_delimited() {
        let token = identifier_token("[space name] x").unwrap();
        assert_eq!(token.name, "space name");
        assert_eq!(token.len, 13);
        let token = identifier_token("\"quoted\".").unwrap();
        assert_eq!(token.name, "quoted");
        assert_eq!(token.len, 8);
    }

    #[test]
    fn test_identifier_surrounding_whitespace() {
        let token = identifier_token("  -- lead\n [t] /* trail */ .").unwrap();
        assert_eq!(token.name, "t");
        assert_eq!(&"  -- lead\n [t] /* trail */ ."[token.len..], ".");
    }

    #[test]
    fn test_identifier_rejections() {
        assert!(identifier_token("").is_none());
        assert!(identifier_token("1abc").is_none());
        assert!(identifier_token("[]").is_none());
        assert!(identifier_token("\"\"").is_none());
        assert!(identifier_token(".name").is_none());
        // Unterminated delimiters never scan.
        assert!(identifier_token("[open").is_none());
    }

    #[test]
    fn test_identifier_unicode() {
        let token = identifier_token("tabellé x").unwrap();
        assert_eq!(token.name, "tabellé");
    }

    #[test]
    fn test_starts_with_ignore_ascii_case() {
        assert!(starts_with_ignore_ascii_case("Alter Table", "ALTER"));
        assert!(starts_with_ignore_ascii_case("go", "GO"));
        assert!(!starts_with_ignore_ascii_case("ALT", "ALTER"));
        assert!(!starts_with_ignore_ascii_case("drop", "DROPX"));
    }
}
