//! Splitting scripts on T-SQL `GO` batch separator lines.
//!
//! `GO` is not part of the language; it is a client-side separator that
//! only counts on a line of its own, outside any string literal,
//! delimited identifier, or comment. Stored routine definitions regularly
//! contain the word `GO` in comments or strings, so the splitter tracks
//! enough lexical state to tell those apart.

use alloc::vec::Vec;

use crate::script::scan;

/// Split `script` into its batches, dropping the separator lines.
///
/// A separator line holds `GO` in any casing, optionally followed by a
/// repeat count and a trailing line comment. Batches come back trimmed of
/// surrounding blank space; empty batches are dropped.
#[must_use]
pub fn split_batches(script: &str) -> Vec<&str> {
    let mut batches = Vec::new();
    let mut state = State::Normal;
    let mut batch_start = 0;
    let mut line_start = 0;
    while line_start <= script.len() {
        let line_end = match script[line_start..].find('\n') {
            Some(offset) => line_start + offset,
            None => script.len(),
        };
        let line = &script[line_start..line_end];
        if state == State::Normal && is_separator_line(line) {
            push_batch(&mut batches, &script[batch_start..line_start]);
            batch_start = if line_end < script.len() {
                line_end + 1
            } else {
                line_end
            };
        } else {
            state = advance(state, line);
        }
        if line_end >= script.len() {
            break;
        }
        line_start = line_end + 1;
    }
    push_batch(&mut batches, &script[batch_start..]);
    batches
}

fn push_batch<'a>(batches: &mut Vec<&'a str>, segment: &'a str) {
    let segment = segment.trim();
    if !segment.is_empty() {
        batches.push(segment);
    }
}

/// Whether a line that starts outside any string or comment is a `GO`
/// separator.
fn is_separator_line(line: &str) -> bool {
    let trimmed = line.trim();
    if !scan::starts_with_ignore_ascii_case(trimmed, "GO") {
        return false;
    }
    let after = &trimmed[2..];
    if !(after.is_empty() || after.starts_with(char::is_whitespace) || after.starts_with("--")) {
        return false;
    }
    let after = after
        .trim_start()
        .trim_start_matches(|c: char| c.is_ascii_digit());
    let after = after.trim_start();
    after.is_empty() || after.starts_with("--")
}

/// Lexical state carried from one line to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    SingleQuote,
    DoubleQuote,
    Bracket,
    BlockComment,
}

/// Walk one line (without its newline) and return the state the next line
/// starts in. A `--` comment ends with its line, so it never leaves state
/// behind.
fn advance(mut state: State, line: &str) -> State {
    let bytes = line.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        let b = bytes[pos];
        state = match state {
            State::Normal => match b {
                b'\'' => State::SingleQuote,
                b'"' => State::DoubleQuote,
                b'[' => State::Bracket,
                b'-' if pos + 1 < bytes.len() && bytes[pos + 1] == b'-' => return State::Normal,
                b'/' if pos + 1 < bytes.len() && bytes[pos + 1] == b'*' => {
                    pos += 1;
                    State::BlockComment
                }
                _ => State::Normal,
            },
            State::SingleQuote => match b {
                // A doubled quote is an escaped quote, not a close.
                b'\'' if pos + 1 < bytes.len() && bytes[pos + 1] == b'\'' => {
                    pos += 1;
                    State::SingleQuote
                }
                b'\'' => State::Normal,
                _ => State::SingleQuote,
            },
            State::DoubleQuote => match b {
                b'"' if pos + 1 < bytes.len() && bytes[pos + 1] == b'"' => {
                    pos += 1;
                    State::DoubleQuote
                }
                b'"' => State::Normal,
                _ => State::DoubleQuote,
            },
            State::Bracket => {
                if b == b']' {
                    State::Normal
                } else {
                    State::Bracket
                }
            }
            State::BlockComment => {
                if b == b'*' && pos + 1 < bytes.len() && bytes[pos + 1] == b'/' {
                    pos += 1;
                    State::Normal
                } else {
                    State::BlockComment
                }
            }
        };
        pos += 1;
    }
    state
}
