//! Runtime row access and foreign-key navigation over a live database.

use std::fmt;

use indexmap::IndexMap;

use crate::codec::quote_identifier;
use crate::error::{Error, Result};
use crate::gateway::Database;
use crate::value::Value;

use super::{Column, ForeignKey, Table};

/// One fetched row of a table, keyed by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Owning table name.
    pub table: String,
    /// Values in column order.
    pub values: IndexMap<String, Value>,
}

impl Row {
    /// Returns one column's value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] if the row has no such column.
    pub fn value(&self, column: &str) -> Result<&Value> {
        self.values.get(column).ok_or_else(|| Error::UnknownColumn {
            table: self.table.clone(),
            column: column.to_string(),
        })
    }

    /// Follows an outgoing foreign key of this row's table.
    ///
    /// # Errors
    ///
    /// Returns lookup errors for the table or constraint, and
    /// [`Error::MultipleRows`] if the key matches more than one row.
    pub fn parent_row(&self, db: &Database, foreign_key: &str) -> Result<Option<Self>> {
        db.table(&self.table)?.foreign_key(foreign_key)?.parent_row(db, self)
    }

    /// Lists the rows referencing this one through `foreign_key`.
    ///
    /// # Errors
    ///
    /// Returns lookup and query errors.
    pub fn child_rows(&self, db: &Database, foreign_key: &str) -> Result<Vec<Self>> {
        db.foreign_key(foreign_key)?.child_rows(db, self)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.values.values().map(ToString::to_string).collect();
        write!(f, "{}: ({})", self.table, values.join(","))
    }
}

impl Table {
    /// Fetches rows matching every `(column, value)` pair. A NULL value
    /// matches with `IS NULL`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueryExecution`] on failure.
    pub fn rows(
        &self,
        db: &Database,
        matching: &[(&str, Value)],
        order_by: Option<&str>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<Row>> {
        let mut sql = format!("SELECT * FROM {}", self.escaped_name());
        let mut params = Vec::new();
        if !matching.is_empty() {
            let clauses: Vec<String> = matching
                .iter()
                .map(|(column, value)| {
                    let column = quote_identifier(column);
                    if value.is_null() {
                        format!("{column} IS NULL")
                    } else {
                        params.push(value.clone());
                        format!("{column}=?")
                    }
                })
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        if let Some(order_by) = order_by {
            sql.push_str(&format!(" ORDER BY {order_by}"));
        }
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        Ok(db
            .query_array(&sql, params)?
            .into_iter()
            .map(|fields| Row {
                table: self.name.clone(),
                values: self
                    .columns
                    .values()
                    .map(|c| (c.name.clone(), fields.get(c.index).cloned().unwrap_or_default()))
                    .collect(),
            })
            .collect())
    }
}

impl ForeignKey {
    /// The parent row `row` points at, or `None` when any referencing
    /// column is NULL or no parent exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MultipleRows`] if more than one parent matches.
    pub fn parent_row(&self, db: &Database, row: &Row) -> Result<Option<Row>> {
        let mut matching = Vec::with_capacity(self.columns.len());
        for (child, parent) in &self.columns {
            let value = row.value(child)?;
            if value.is_null() {
                return Ok(None);
            }
            matching.push((parent.as_str(), value.clone()));
        }
        let mut rows = db.table(&self.references_table)?.rows(db, &matching, None, None, None)?;
        if rows.len() > 1 {
            return Err(Error::MultipleRows {
                sql: format!("{} -> {}", self.name, self.references_table),
            });
        }
        Ok(rows.pop())
    }

    /// Rows of the referencing table pointing at `row`.
    ///
    /// # Errors
    ///
    /// Returns lookup and query errors.
    pub fn child_rows(&self, db: &Database, row: &Row) -> Result<Vec<Row>> {
        let matching = self
            .columns
            .iter()
            .map(|(child, parent)| Ok((child.as_str(), row.value(parent)?.clone())))
            .collect::<Result<Vec<_>>>()?;
        db.table(&self.table)?.rows(db, &matching, None, None, None)
    }
}

impl Column {
    /// Every value of this column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueryExecution`] on failure.
    pub fn values(&self, db: &Database, order_by: Option<&str>) -> Result<Vec<Value>> {
        let mut sql = format!(
            "SELECT {} FROM {}",
            self.escaped_name(),
            quote_identifier(&self.table)
        );
        if let Some(order_by) = order_by {
            sql.push_str(&format!(" ORDER BY {order_by}"));
        }
        db.query_one_column(&sql, (), 0)
    }
}
