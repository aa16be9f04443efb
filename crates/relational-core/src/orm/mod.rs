//! Runtime support for generated object models.
//!
//! Generated code implements [`Entity`] for one struct per table and
//! wraps an [`ObjectRoot`] in its root type; everything that touches
//! the database goes through the root.

pub mod cast;
mod filter;

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::gateway::{AssocRow, Database};
use crate::value::{Params, Value};

pub use filter::{CompareOp, Filter, Predicate, build_filtered_query};

/// A generated type holding one row of a table or view.
pub trait Entity: Sized {
    /// Table or view name.
    const TABLE: &'static str;

    /// Builds the entity from a fetched row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] or a cast error.
    fn from_row(root: &ObjectRoot, row: &AssocRow) -> Result<Self>;

    /// All fields by column name.
    fn to_map(&self) -> IndexMap<String, Value>;
}

/// Looks up a column of a fetched row.
///
/// # Errors
///
/// Returns [`Error::UnknownColumn`] if the row lacks it.
pub fn field<'a>(row: &'a AssocRow, table: &str, column: &str) -> Result<&'a Value> {
    row.get(column).ok_or_else(|| Error::UnknownColumn {
        table: table.to_string(),
        column: column.to_string(),
    })
}

/// Shared handle that turns query results into entities.
#[derive(Debug, Clone)]
pub struct ObjectRoot {
    db: Arc<Database>,
}

impl ObjectRoot {
    /// Wraps a database handle.
    #[must_use]
    pub const fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// The underlying database.
    #[must_use]
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Runs a single-row query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MultipleRows`] if more than one row matched.
    pub fn create_object<T: Entity>(&self, sql: &str, params: impl Into<Params>) -> Result<Option<T>> {
        let mut rows = self.db.query_assoc(sql, params)?;
        if rows.len() > 1 {
            return Err(Error::MultipleRows { sql: sql.to_string() });
        }
        rows.pop().map(|row| T::from_row(self, &row)).transpose()
    }

    /// Runs a query and builds one entity per row.
    ///
    /// # Errors
    ///
    /// Returns query and cast errors.
    pub fn create_object_list<T: Entity>(&self, sql: &str, params: impl Into<Params>) -> Result<Vec<T>> {
        self.db
            .query_assoc(sql, params)?
            .iter()
            .map(|row| T::from_row(self, row))
            .collect()
    }

    /// Extends `base_sql` with `filter` and `order_by` (see
    /// [`build_filtered_query`]) and builds the entities.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFilterOperator`], query and cast errors.
    pub fn create_object_list_with_filter<T: Entity>(
        &self,
        base_sql: &str,
        order_by: Option<&str>,
        filter: Option<&Filter>,
    ) -> Result<Vec<T>> {
        let (sql, params) = build_filtered_query(base_sql, order_by, filter)?;
        self.create_object_list(&sql, params)
    }
}
