//! Application-level values exchanged with the database.

use serde::{Deserialize, Serialize};

/// A value bound as a query parameter or read back from a typed row.
///
/// Untyped query results only ever produce [`Value::Null`] and
/// [`Value::Text`]; the typed variants convert using the declared
/// column types of the result set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Possibly nested array value.
    Array(Vec<Value>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text payload, if this is a text value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer payload, if this is an integer value.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }
}

macro_rules! value_from {
    ($variant:ident: $($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v.into())
                }
            }
        )+
    };
}

value_from!(Bool: bool);
value_from!(Int: i8, i16, i32, i64, u8, u16, u32);
value_from!(Float: f32, f64);
value_from!(Text: String, &str, &String);

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::Array(items) => f.write_str(&crate::codec::encode_array_literal(items)),
        }
    }
}

/// Positional parameters for a query.
///
/// A single scalar converts into a one-element parameter list, so
/// `db.query_array(sql, 3)` and `db.query_array(sql, [3])` are the same
/// call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Params(pub Vec<Value>);

impl Params {
    /// Returns the parameters as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    /// Returns the number of parameters.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when there are no parameters.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<()> for Params {
    fn from((): ()) -> Self {
        Self(Vec::new())
    }
}

impl From<Vec<Value>> for Params {
    fn from(v: Vec<Value>) -> Self {
        Self(v)
    }
}

impl From<&[Value]> for Params {
    fn from(v: &[Value]) -> Self {
        Self(v.to_vec())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Params {
    fn from(v: [T; N]) -> Self {
        Self(v.into_iter().map(Into::into).collect())
    }
}

macro_rules! params_from_scalar {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Params {
                fn from(v: $ty) -> Self {
                    Self(vec![v.into()])
                }
            }
        )+
    };
}

params_from_scalar!(Value, bool, i32, i64, f64, String, &str, &String);
