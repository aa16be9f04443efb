//! Filters for generated list queries.
//!
//! A [`Filter`] maps column names to predicates, in insertion order:
//!
//! ```ignore
//! let filter = Filter::new()
//!     .eq("customer_id", 3)
//!     .op("quantity", ">=", 2)
//!     .sql("shipped_at", "IS NOT NULL")
//!     .raw_sql("recent", "created_at > now() - interval '1 day'");
//! ```

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::value::Value;

/// Comparison operators accepted in a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `<>`
    Ne,
}

impl CompareOp {
    /// Parses an operator token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFilterOperator`] for anything else.
    pub fn parse(token: &str) -> Result<Self> {
        match token {
            "=" => Ok(Self::Eq),
            "<" => Ok(Self::Lt),
            ">" => Ok(Self::Gt),
            "<=" => Ok(Self::Le),
            ">=" => Ok(Self::Ge),
            "<>" => Ok(Self::Ne),
            other => Err(Error::UnknownFilterOperator(other.to_string())),
        }
    }

    /// The SQL token.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Ne => "<>",
        }
    }
}

/// Condition on one filter entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column=?`
    Value(Value),
    /// `column<op>?`, the operator checked when the query is built.
    Compare(String, Value),
    /// `(column fragment)`, no parameter.
    Sql(String),
    /// `(fragment)`, the key is ignored.
    RawSql(String),
}

/// Ordered column-to-predicate map.
///
/// Setting a column twice keeps its original position and the last
/// predicate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    entries: IndexMap<String, Predicate>,
}

impl Filter {
    /// Creates an empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets any predicate for `column`.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, predicate: Predicate) -> Self {
        self.entries.insert(column.into(), predicate);
        self
    }

    /// `column=?`
    #[must_use]
    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, Predicate::Value(value.into()))
    }

    /// `column<op>?` with one of `=`, `<`, `>`, `<=`, `>=`, `<>`.
    #[must_use]
    pub fn op(self, column: impl Into<String>, op: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, Predicate::Compare(op.into(), value.into()))
    }

    /// `(column fragment)`, e.g. `.sql("deleted_at", "IS NULL")`.
    #[must_use]
    pub fn sql(self, column: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.with(column, Predicate::Sql(fragment.into()))
    }

    /// `(fragment)` verbatim; `key` only names the entry.
    #[must_use]
    pub fn raw_sql(self, key: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.with(key, Predicate::RawSql(fragment.into()))
    }

    /// Returns `true` when the filter has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Predicate)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Appends `filter` to `base_sql` (which must end in a WHERE clause) as
/// `AND` predicates, then the ordering. Returns the SQL and parameters.
///
/// # Errors
///
/// Returns [`Error::UnknownFilterOperator`] for an unsupported operator.
pub fn build_filtered_query(
    base_sql: &str,
    order_by: Option<&str>,
    filter: Option<&Filter>,
) -> Result<(String, Vec<Value>)> {
    let mut sql = String::from(base_sql);
    let mut params = Vec::new();
    for (column, predicate) in filter.into_iter().flat_map(Filter::iter) {
        match predicate {
            Predicate::Value(value) => {
                sql.push_str(&format!(" AND {column}=?"));
                params.push(value.clone());
            }
            Predicate::Compare(op, value) => {
                let op = CompareOp::parse(op)?;
                sql.push_str(&format!(" AND {column}{}?", op.as_sql()));
                params.push(value.clone());
            }
            Predicate::Sql(fragment) => sql.push_str(&format!(" AND ({column} {fragment})")),
            Predicate::RawSql(fragment) => sql.push_str(&format!(" AND ({fragment})")),
        }
    }
    if let Some(order_by) = order_by.filter(|o| !o.is_empty()) {
        sql.push_str(&format!(" ORDER BY {order_by}"));
    }
    Ok((sql, params))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "SELECT * FROM orders WHERE true";

    #[test]
    fn no_filter_no_order() {
        let (sql, params) = build_filtered_query(BASE, None, None).unwrap();
        assert_eq!(sql, BASE);
        assert!(params.is_empty());
        let (sql, _) = build_filtered_query(BASE, Some(""), None).unwrap();
        assert_eq!(sql, BASE);
    }

    #[test]
    fn every_predicate_kind() {
        let filter = Filter::new()
            .eq("customer_id", 3)
            .op("total", ">=", 10.5)
            .op("status", "<>", "void")
            .sql("shipped_at", "IS NOT NULL")
            .raw_sql("x", "total < 100 OR vip");
        let (sql, params) = build_filtered_query(BASE, Some("id DESC"), Some(&filter)).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM orders WHERE true AND customer_id=? AND total>=? AND status<>? \
             AND (shipped_at IS NOT NULL) AND (total < 100 OR vip) ORDER BY id DESC"
        );
        assert_eq!(params, vec![Value::Int(3), Value::Float(10.5), Value::from("void")]);
    }

    #[test]
    fn later_entries_override_in_place() {
        let filter = Filter::new().eq("a", 1).eq("b", 2).eq("a", 3);
        let (sql, params) = build_filtered_query(BASE, None, Some(&filter)).unwrap();
        assert_eq!(sql, format!("{BASE} AND a=? AND b=?"));
        assert_eq!(params, vec![Value::Int(3), Value::Int(2)]);
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let filter = Filter::new().op("name", "LIKE", "a%");
        assert!(matches!(
            build_filtered_query(BASE, None, Some(&filter)),
            Err(Error::UnknownFilterOperator(op)) if op == "LIKE"
        ));
    }
}
