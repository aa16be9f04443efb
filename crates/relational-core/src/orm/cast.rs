//! Field casts used by generated `from_row` implementations.
//!
//! Rows arrive as driver text; these accept both text and already
//! typed values so entities can be built from either kind of row.

use crate::codec::parse_array_literal;
use crate::error::{Error, Result};
use crate::value::Value;

fn invalid(ty: &str, value: &Value) -> Error {
    Error::InvalidValue {
        ty: ty.to_string(),
        text: value.to_string(),
    }
}

/// Integer cast. NULL stays `None`.
///
/// # Errors
///
/// Returns [`Error::InvalidValue`] for non-integer text or arrays.
pub fn to_int(value: &Value) -> Result<Option<i64>> {
    match value {
        Value::Null => Ok(None),
        Value::Int(n) => Ok(Some(*n)),
        Value::Bool(b) => Ok(Some(i64::from(*b))),
        Value::Text(s) => s.trim().parse().map(Some).map_err(|_| invalid("integer", value)),
        Value::Float(_) | Value::Array(_) => Err(invalid("integer", value)),
    }
}

/// Boolean cast: `t` and `true` are true, any other text is false.
///
/// # Errors
///
/// Returns [`Error::InvalidValue`] for arrays.
pub fn to_bool(value: &Value) -> Result<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        Value::Int(n) => Ok(Some(*n != 0)),
        Value::Text(s) => Ok(Some(s == "t" || s == "true")),
        Value::Float(_) | Value::Array(_) => Err(invalid("boolean", value)),
    }
}

/// Text cast. Typed scalars are rendered back to text.
///
/// # Errors
///
/// Never fails; the signature matches the other casts.
pub fn to_text(value: &Value) -> Result<Option<String>> {
    Ok(match value {
        Value::Null => None,
        Value::Text(s) => Some(s.clone()),
        other => Some(other.to_string()),
    })
}

/// Integer array cast from array literal text or a typed array.
///
/// # Errors
///
/// Returns [`Error::InvalidValue`] for non-array text or non-integer
/// (including NULL) elements, and [`Error::MalformedLiteral`] for
/// broken literal text.
pub fn to_int_array(value: &Value) -> Result<Option<Vec<i64>>> {
    let items = match value {
        Value::Null => return Ok(None),
        Value::Array(items) => items.clone(),
        Value::Text(s) => match parse_array_literal(s, "int8")? {
            Some(Value::Array(items)) => items,
            _ => return Err(invalid("integer[]", value)),
        },
        _ => return Err(invalid("integer[]", value)),
    };
    items
        .iter()
        .map(|item| to_int(item)?.ok_or_else(|| invalid("integer[]", value)))
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn casts_from_text() {
        assert_eq!(to_int(&Value::from("42")).unwrap(), Some(42));
        assert_eq!(to_bool(&Value::from("t")).unwrap(), Some(true));
        assert_eq!(to_bool(&Value::from("true")).unwrap(), Some(true));
        assert_eq!(to_bool(&Value::from("f")).unwrap(), Some(false));
        assert_eq!(to_text(&Value::Int(5)).unwrap().as_deref(), Some("5"));
        assert_eq!(to_int_array(&Value::from("{1,2,3}")).unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn nulls_stay_none() {
        assert_eq!(to_int(&Value::Null).unwrap(), None);
        assert_eq!(to_bool(&Value::Null).unwrap(), None);
        assert_eq!(to_text(&Value::Null).unwrap(), None);
        assert_eq!(to_int_array(&Value::Null).unwrap(), None);
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(matches!(to_int(&Value::from("x")), Err(Error::InvalidValue { .. })));
        assert!(matches!(to_int_array(&Value::from("1,2")), Err(Error::InvalidValue { .. })));
        assert!(matches!(to_int_array(&Value::from("{1,NULL}")), Err(Error::InvalidValue { .. })));
    }
}
