//! Value encoding for query parameters and SQL literals.
//!
//! Top-level parameters are handed to the driver as plain text (or
//! `None` for NULL). Arrays are always rendered as brace-delimited
//! literals, which [`parse_array_literal`] reads back.

mod array;

pub use array::{MAX_ARRAY_DEPTH, parse_array_literal};

use crate::error::{Error, Result};
use crate::value::Value;

/// Quoting convention for drivers that substitute literals into the SQL
/// text instead of binding parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineQuote {
    /// `'it\'s'`, as understood by MySQL.
    Backslash,
    /// `E'it\'s'`, PostgreSQL escape-string syntax.
    EscapeString,
}

/// Encodes a top-level parameter. `None` means SQL NULL.
///
/// Booleans become `"1"`/`"0"` so the same parameter binds against both
/// numeric and boolean columns.
#[must_use]
pub fn encode_param(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(bool_digit(*b).to_string()),
        Value::Int(n) => Some(n.to_string()),
        Value::Float(x) => Some(x.to_string()),
        Value::Text(s) => Some(s.clone()),
        Value::Array(items) => Some(encode_array_literal(items)),
    }
}

/// Renders a sequence as an array literal, e.g. `{1,"a b",null,{2,3}}`.
#[must_use]
pub fn encode_array_literal(items: &[Value]) -> String {
    let mut out = String::from("{");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        encode_element(item, &mut out);
    }
    out.push('}');
    out
}

fn encode_element(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(bool_digit(*b)),
        Value::Int(n) => out.push_str(&n.to_string()),
        Value::Float(x) => out.push_str(&x.to_string()),
        Value::Array(items) => out.push_str(&encode_array_literal(items)),
        Value::Text(s) if is_numeric(s) => out.push_str(s),
        Value::Text(s) => {
            out.push('"');
            // backslashes first, or the quote escapes get doubled
            out.push_str(&s.replace('\\', "\\\\").replace('"', "\\\""));
            out.push('"');
        }
    }
}

/// Renders a value as a quoted SQL literal for textual substitution.
#[must_use]
pub fn inline_literal(value: &Value, quote: InlineQuote) -> String {
    let Some(text) = encode_param(value) else {
        return String::from("NULL");
    };
    let escaped = text.replace('\\', "\\\\").replace('\'', "\\'");
    match quote {
        InlineQuote::Backslash => format!("'{escaped}'"),
        InlineQuote::EscapeString => format!("E'{escaped}'"),
    }
}

/// Returns the identifier as written in SQL: bare when it is a plain
/// lowercase name, double-quoted otherwise.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    let mut chars = name.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Converts driver text to a typed value using a PostgreSQL type name.
///
/// A leading `_` marks an array of the remaining type. Unknown types
/// pass through as text.
///
/// # Errors
///
/// Returns [`Error::InvalidValue`] when an integer or float does not
/// parse, and [`Error::MalformedLiteral`] for broken array text.
pub fn convert_scalar(text: &str, ty: &str) -> Result<Value> {
    if let Some(element) = ty.strip_prefix('_') {
        return Ok(parse_array_literal(text, element)?.unwrap_or_else(|| Value::Text(text.to_string())));
    }
    let invalid = || Error::InvalidValue {
        ty: ty.to_string(),
        text: text.to_string(),
    };
    match ty {
        "int2" | "int4" | "int8" => text.trim().parse().map(Value::Int).map_err(|_| invalid()),
        "bool" => Ok(Value::Bool(text == "t")),
        "float4" | "float8" => text.trim().parse().map(Value::Float).map_err(|_| invalid()),
        _ => Ok(Value::Text(text.to_string())),
    }
}

/// Converts every non-null field of a row by its column type.
///
/// # Errors
///
/// Propagates the first [`convert_scalar`] failure.
pub fn convert_row(row: &[Option<String>], types: &[&str]) -> Result<Vec<Value>> {
    row.iter()
        .enumerate()
        .map(|(i, field)| match field {
            None => Ok(Value::Null),
            Some(text) => match types.get(i) {
                Some(ty) => convert_scalar(text, ty),
                None => Ok(Value::Text(text.clone())),
            },
        })
        .collect()
}

const fn bool_digit(b: bool) -> &'static str {
    if b { "1" } else { "0" }
}

/// Digits with an optional sign, decimal point and exponent. Leading or
/// trailing whitespace is rejected so unquoted elements survive trimming.
fn is_numeric(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().any(|b| b.is_ascii_digit())
        && s.bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
        && s.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_encode_as_digits() {
        assert_eq!(encode_param(&Value::Bool(true)).as_deref(), Some("1"));
        assert_eq!(encode_param(&Value::Bool(false)).as_deref(), Some("0"));
        assert_eq!(encode_param(&Value::Null), None);
    }

    #[test]
    fn array_literal_quoting() {
        let v = vec![
            Value::Int(1),
            Value::Null,
            Value::from("12.5"),
            Value::from("a \"b\" \\c"),
            Value::from(vec![2, 3]),
        ];
        assert_eq!(
            encode_array_literal(&v),
            r#"{1,null,12.5,"a \"b\" \\c",{2,3}}"#
        );
        assert_eq!(encode_array_literal(&[]), "{}");
    }

    #[test]
    fn numeric_detection() {
        assert!(is_numeric("-3"));
        assert!(is_numeric("1e5"));
        assert!(!is_numeric("e"));
        assert!(!is_numeric(" 1"));
        assert!(!is_numeric("inf"));
        assert!(!is_numeric(""));
    }

    #[test]
    fn inline_literals() {
        let v = Value::from("it's a \\ path");
        assert_eq!(inline_literal(&v, InlineQuote::Backslash), r"'it\'s a \\ path'");
        assert_eq!(inline_literal(&v, InlineQuote::EscapeString), r"E'it\'s a \\ path'");
        assert_eq!(inline_literal(&Value::Null, InlineQuote::Backslash), "NULL");
        assert_eq!(inline_literal(&Value::Bool(true), InlineQuote::Backslash), "'1'");
        assert_eq!(
            inline_literal(&Value::from(vec!["x"]), InlineQuote::EscapeString),
            r#"E'{"x"}'"#
        );
    }

    #[test]
    fn identifiers() {
        assert_eq!(quote_identifier("order_items"), "order_items");
        assert_eq!(quote_identifier("Order Items"), "\"Order Items\"");
        assert_eq!(quote_identifier("1st"), "\"1st\"");
    }

    #[test]
    fn scalar_conversion() {
        assert_eq!(convert_scalar("42", "int4").unwrap(), Value::Int(42));
        assert_eq!(convert_scalar("t", "bool").unwrap(), Value::Bool(true));
        assert_eq!(convert_scalar("true", "bool").unwrap(), Value::Bool(false));
        assert_eq!(convert_scalar("1.5", "float8").unwrap(), Value::Float(1.5));
        assert_eq!(convert_scalar("abc", "text").unwrap(), Value::from("abc"));
        assert_eq!(
            convert_scalar("{1,2}", "_int4").unwrap(),
            Value::from(vec![1, 2])
        );
        assert!(matches!(
            convert_scalar("x", "int8"),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn row_conversion_skips_nulls() {
        let row = vec![Some("7".to_string()), None, Some("f".to_string())];
        let converted = convert_row(&row, &["int8", "int8", "bool"]).unwrap();
        assert_eq!(converted, vec![Value::Int(7), Value::Null, Value::Bool(false)]);
    }
}
