//! Tables, views, columns and key constraints.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::codec::quote_identifier;
use crate::error::{Error, Result};

/// Whether a relation is a base table or a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    /// Base table.
    Table,
    /// View. Views never carry key constraints.
    View,
}

/// A reflected table or view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Table or view.
    pub kind: TableKind,
    /// Columns in ordinal order.
    pub columns: IndexMap<String, Column>,
    /// Primary key, if any.
    pub primary_key: Option<PrimaryKey>,
    /// Outgoing foreign keys by constraint name.
    pub foreign_keys: IndexMap<String, ForeignKey>,
}

impl Table {
    /// Creates a placeholder with no columns or keys attached yet.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TableKind) -> Self {
        Self {
            name: name.into(),
            kind,
            columns: IndexMap::new(),
            primary_key: None,
            foreign_keys: IndexMap::new(),
        }
    }

    /// Attaches columns and constraints. Views only take the columns.
    pub fn initialize(
        &mut self,
        columns: IndexMap<String, Column>,
        primary_key: Option<PrimaryKey>,
        foreign_keys: IndexMap<String, ForeignKey>,
    ) {
        self.columns = columns;
        if self.kind == TableKind::Table {
            self.primary_key = primary_key;
            self.foreign_keys = foreign_keys;
        }
    }

    /// Returns `true` for views.
    #[must_use]
    pub fn is_view(&self) -> bool {
        self.kind == TableKind::View
    }

    /// The table name as it must appear in SQL.
    #[must_use]
    pub fn escaped_name(&self) -> String {
        quote_identifier(&self.name)
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Looks up an outgoing foreign key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownForeignKey`] naming this table.
    pub fn foreign_key(&self, name: &str) -> Result<&ForeignKey> {
        self.foreign_keys
            .get(name)
            .ok_or_else(|| Error::UnknownForeignKey {
                name: name.to_string(),
                table: Some(self.name.clone()),
            })
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TableKind::Table => writeln!(f, "table: {}", self.name)?,
            TableKind::View => writeln!(f, "view: {}", self.name)?,
        }
        for column in self.columns.values() {
            writeln!(f, "    {column}")?;
        }
        if self.kind == TableKind::View {
            return Ok(());
        }
        match &self.primary_key {
            Some(pk) => writeln!(f, "    {pk}")?,
            None => writeln!(f, "     pk: NONE")?,
        }
        for fk in self.foreign_keys.values() {
            writeln!(f, "    {fk}")?;
        }
        Ok(())
    }
}

/// A column of a table or view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Owning table name.
    pub table: String,
    /// Column name.
    pub name: String,
    /// Zero-based ordinal position.
    pub index: usize,
    /// Declared data type as reported by the catalog (`integer`, `ARRAY`, ...).
    pub data_type: String,
}

impl Column {
    /// The column name as it must appear in SQL.
    #[must_use]
    pub fn escaped_name(&self) -> String {
        quote_identifier(&self.name)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "col: {} {}", self.name, self.data_type)
    }
}

/// A primary key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    /// Owning table name.
    pub table: String,
    /// Constraint name.
    pub name: String,
    /// Key columns in key order.
    pub columns: Vec<String>,
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " pk: ( {} )", self.columns.join(", "))
    }
}

/// A foreign key constraint, owned by the referencing (child) table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referencing table name.
    pub table: String,
    /// Constraint name.
    pub name: String,
    /// Referenced (parent) table name.
    pub references_table: String,
    /// Child column to parent column, in key order.
    pub columns: IndexMap<String, String>,
}

impl ForeignKey {
    /// Referencing columns in key order.
    pub fn child_columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Referenced columns in key order.
    pub fn parent_columns(&self) -> impl Iterator<Item = &str> {
        self.columns.values().map(String::as_str)
    }
}

impl fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            " fk: {} = ( {} ) -> {} ( {} )",
            self.name,
            self.child_columns().collect::<Vec<_>>().join(", "),
            self.references_table,
            self.parent_columns().collect::<Vec<_>>().join(", ")
        )
    }
}
