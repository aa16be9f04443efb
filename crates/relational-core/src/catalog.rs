//! Schema reflection from `information_schema`.
//!
//! Four independent catalog queries are joined in memory, so the only
//! requirement on the database is that it answers these SELECT shapes.

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::gateway::{AssocRow, Database};
use crate::schema::{Schema, SchemaAssembler, TableKind};
use crate::value::Value;

pub(crate) const TABLES_SQL: &str = "SELECT table_name,table_type FROM information_schema.tables \
     WHERE table_schema=? ORDER BY table_type,table_name";

pub(crate) const COLUMNS_SQL: &str = "SELECT column_name,ordinal_position,table_name,data_type \
     FROM information_schema.columns WHERE table_schema=? ORDER BY table_name,ordinal_position";

pub(crate) const PRIMARY_KEYS_SQL: &str = "SELECT tc.constraint_name,tc.table_name,kcu.column_name \
     FROM information_schema.table_constraints tc \
     LEFT JOIN information_schema.key_column_usage kcu \
     ON tc.constraint_catalog=kcu.constraint_catalog AND tc.constraint_schema=kcu.constraint_schema \
     AND tc.constraint_name=kcu.constraint_name \
     WHERE tc.table_schema=? AND tc.constraint_type='PRIMARY KEY' \
     ORDER BY tc.constraint_name,kcu.ordinal_position";

pub(crate) const FOREIGN_KEYS_SQL: &str = "SELECT tc.constraint_name AS constraint_name, \
     kcu1.table_name AS from_table_name, kcu1.column_name AS from_column_name, \
     kcu2.table_name AS to_table_name, kcu2.column_name AS to_column_name \
     FROM information_schema.table_constraints tc \
     LEFT JOIN information_schema.referential_constraints rc \
     ON tc.constraint_catalog=rc.constraint_catalog AND tc.constraint_schema=rc.constraint_schema \
     AND tc.constraint_name=rc.constraint_name \
     LEFT JOIN information_schema.key_column_usage kcu1 \
     ON tc.constraint_catalog=kcu1.constraint_catalog AND tc.constraint_schema=kcu1.constraint_schema \
     AND tc.constraint_name=kcu1.constraint_name \
     LEFT JOIN information_schema.key_column_usage kcu2 \
     ON tc.constraint_catalog=kcu2.constraint_catalog AND tc.constraint_schema=kcu2.constraint_schema \
     AND kcu2.constraint_name=rc.unique_constraint_name AND kcu2.ordinal_position=kcu1.ordinal_position \
     WHERE tc.table_schema=? AND tc.constraint_type='FOREIGN KEY' \
     ORDER BY tc.constraint_name,kcu1.ordinal_position";

/// Reflects one schema (namespace) into a [`Schema`] graph.
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    schema_name: String,
}

impl SchemaCatalog {
    /// Reflects the named schema, e.g. `public`.
    #[must_use]
    pub fn new(schema_name: impl Into<String>) -> Self {
        Self {
            schema_name: schema_name.into(),
        }
    }

    /// Runs the catalog queries and assembles the graph.
    ///
    /// Nothing is installed on `db`; a failure leaves it untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaReflection`] carrying the failing query.
    pub fn reflect(&self, db: &Database) -> Result<Schema> {
        let mut asm = SchemaAssembler::new();

        for row in self.query(db, TABLES_SQL)? {
            let name = text(&row, "table_name", TABLES_SQL)?;
            let kind = if text(&row, "table_type", TABLES_SQL)? == "VIEW" {
                TableKind::View
            } else {
                TableKind::Table
            };
            asm.add_table(name, kind);
        }

        for row in self.query(db, COLUMNS_SQL)? {
            let position = text(&row, "ordinal_position", COLUMNS_SQL)?;
            let position: usize = position
                .trim()
                .parse()
                .map_err(|_| reflection_error(COLUMNS_SQL, &format!("bad ordinal_position {position:?}")))?;
            asm.add_column(
                text(&row, "table_name", COLUMNS_SQL)?,
                text(&row, "column_name", COLUMNS_SQL)?,
                position,
                text(&row, "data_type", COLUMNS_SQL)?,
            );
        }

        for row in self.query(db, PRIMARY_KEYS_SQL)? {
            asm.add_primary_key_column(
                text(&row, "constraint_name", PRIMARY_KEYS_SQL)?,
                text(&row, "table_name", PRIMARY_KEYS_SQL)?,
                text(&row, "column_name", PRIMARY_KEYS_SQL)?,
            );
        }

        for row in self.query(db, FOREIGN_KEYS_SQL)? {
            let constraint = text(&row, "constraint_name", FOREIGN_KEYS_SQL)?;
            // referenced key outside this schema: the join yields nulls
            let (Some(to_table), Some(to_column)) = (
                optional_text(&row, "to_table_name"),
                optional_text(&row, "to_column_name"),
            ) else {
                warn!(constraint = %constraint, "Skipping foreign key with unresolved target");
                continue;
            };
            asm.add_foreign_key_column(
                constraint,
                text(&row, "from_table_name", FOREIGN_KEYS_SQL)?,
                text(&row, "from_column_name", FOREIGN_KEYS_SQL)?,
                to_table,
                to_column,
            );
        }

        let schema = asm.finish();
        debug!(
            schema = %self.schema_name,
            tables = schema.tables.len(),
            "Reflected schema"
        );
        Ok(schema)
    }

    fn query(&self, db: &Database, sql: &str) -> Result<Vec<AssocRow>> {
        db.query_assoc(sql, self.schema_name.as_str()).map_err(|e| match e {
            Error::QueryExecution { sql, message } => Error::SchemaReflection { sql, message },
            other => other,
        })
    }
}

fn optional_text<'a>(row: &'a AssocRow, column: &str) -> Option<&'a str> {
    row.get(column).and_then(Value::as_str)
}

fn text<'a>(row: &'a AssocRow, column: &str, sql: &str) -> Result<&'a str> {
    optional_text(row, column).ok_or_else(|| reflection_error(sql, &format!("missing {column}")))
}

fn reflection_error(sql: &str, message: &str) -> Error {
    Error::SchemaReflection {
        sql: sql.to_string(),
        message: message.to_string(),
    }
}
