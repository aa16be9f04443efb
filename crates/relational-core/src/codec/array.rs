//! Recursive-descent parser for brace-delimited array literals.
//!
//! Grammar, as produced by PostgreSQL and by
//! [`encode_array_literal`](super::encode_array_literal):
//!
//! ```text
//! array   := '{' [ element ( ',' element )* ] '}'
//! element := array | quoted | bare
//! quoted  := '"' ( '\' any | [^"\] )* '"'  |  '\'' ( '\' any | [^'\] )* '\''
//! bare    := [^,{}]+            (trimmed; NULL in any case is null)
//! ```
//!
//! Nesting deeper than [`MAX_ARRAY_DEPTH`] is rejected.

use crate::error::{Error, Result};
use crate::value::Value;

use super::convert_scalar;

/// Deepest accepted array nesting.
pub const MAX_ARRAY_DEPTH: usize = 64;

/// Parses an array literal, converting each element with
/// `element_type` (e.g. `int4`, `text`).
///
/// Returns `Ok(None)` when `text` is not an array literal at all.
///
/// # Errors
///
/// Returns [`Error::MalformedLiteral`] for unbalanced braces, an
/// unterminated quote, an empty unquoted element, nesting deeper than
/// [`MAX_ARRAY_DEPTH`] or trailing characters, and propagates element
/// conversion failures.
pub fn parse_array_literal(text: &str, element_type: &str) -> Result<Option<Value>> {
    if !text.starts_with('{') {
        return Ok(None);
    }
    let (items, next) = parse_array(text.as_bytes(), 0, 1, element_type)?;
    if !text[next..].trim().is_empty() {
        return Err(malformed(next, "trailing characters after closing brace"));
    }
    Ok(Some(Value::Array(items)))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Nothing seen since the last separator.
    Empty,
    /// Collecting a scalar element.
    Scalar,
    /// A nested array was pushed.
    Nested,
}

/// Parses the array opening at `start`, returning its elements and the
/// offset just past its closing brace.
fn parse_array(input: &[u8], start: usize, depth: usize, ty: &str) -> Result<(Vec<Value>, usize)> {
    if depth > MAX_ARRAY_DEPTH {
        return Err(malformed(start, "nesting too deep"));
    }
    let mut items = Vec::new();
    let mut buf: Vec<u8> = Vec::new();
    let mut slot = Slot::Empty;
    let mut quoted = false;
    let mut quote: Option<u8> = None;
    let mut after_comma = false;
    let mut i = start + 1;

    while i < input.len() {
        let c = input[i];

        if let Some(q) = quote {
            if c == b'\\' {
                i += 1;
                let Some(&escaped) = input.get(i) else { break };
                buf.push(escaped);
            } else if c == q {
                quote = None;
            } else {
                buf.push(c);
            }
            i += 1;
            continue;
        }

        match c {
            b'}' => {
                match slot {
                    Slot::Scalar => items.push(flush(&mut buf, quoted, ty, i)?),
                    Slot::Empty if after_comma => return Err(malformed(i, "empty element")),
                    Slot::Empty | Slot::Nested => {}
                }
                return Ok((items, i + 1));
            }
            b',' => {
                match slot {
                    Slot::Scalar => items.push(flush(&mut buf, quoted, ty, i)?),
                    Slot::Empty => return Err(malformed(i, "empty element")),
                    Slot::Nested => {}
                }
                slot = Slot::Empty;
                quoted = false;
                after_comma = true;
            }
            b'{' => {
                if slot != Slot::Empty {
                    return Err(malformed(i, "unexpected '{' inside element"));
                }
                let (nested, next) = parse_array(input, i, depth + 1, ty)?;
                items.push(Value::Array(nested));
                slot = Slot::Nested;
                i = next;
                continue;
            }
            b'"' | b'\'' if slot == Slot::Empty => {
                quote = Some(c);
                quoted = true;
                slot = Slot::Scalar;
            }
            _ if c.is_ascii_whitespace() && (slot != Slot::Scalar || quoted) => {}
            _ if slot == Slot::Nested || quoted => {
                return Err(malformed(i, "expected ',' or '}'"));
            }
            b'\\' => {
                i += 1;
                let Some(&escaped) = input.get(i) else { break };
                buf.push(escaped);
                slot = Slot::Scalar;
            }
            _ => {
                buf.push(c);
                slot = Slot::Scalar;
            }
        }
        i += 1;
    }

    if quote.is_some() {
        Err(malformed(input.len(), "unterminated quoted element"))
    } else {
        Err(malformed(input.len(), "missing closing '}'"))
    }
}

fn flush(buf: &mut Vec<u8>, quoted: bool, ty: &str, offset: usize) -> Result<Value> {
    let raw = String::from_utf8(std::mem::take(buf))
        .map_err(|_| malformed(offset, "element is not valid UTF-8"))?;
    if quoted {
        return convert_scalar(&raw, ty);
    }
    let text = raw.trim();
    if text.eq_ignore_ascii_case("null") {
        Ok(Value::Null)
    } else {
        convert_scalar(text, ty)
    }
}

fn malformed(offset: usize, reason: &str) -> Error {
    Error::MalformedLiteral {
        offset,
        reason: reason.to_string(),
    }
}
