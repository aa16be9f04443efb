//! The reflected schema graph.
//!
//! A [`Schema`] is plain data: it serializes to the schema cache and can
//! be rebuilt from catalog rows with a [`SchemaAssembler`]. Navigation
//! that needs a live connection lives in [`rows`].

pub mod rows;
mod table;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

pub use rows::Row;
pub use table::{Column, ForeignKey, PrimaryKey, Table, TableKind};

/// Tables by name plus a flattened index of every foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Tables and views by name.
    pub tables: IndexMap<String, Table>,
    /// Every table's outgoing foreign keys by constraint name.
    pub foreign_keys: IndexMap<String, ForeignKey>,
}

impl Schema {
    /// Looks up a table or view.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTable`] if no such table exists.
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    /// Looks up a foreign key by constraint name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownForeignKey`] if no such constraint exists.
    pub fn foreign_key(&self, name: &str) -> Result<&ForeignKey> {
        self.foreign_keys
            .get(name)
            .ok_or_else(|| Error::UnknownForeignKey {
                name: name.to_string(),
                table: None,
            })
    }

    /// Foreign keys of other tables that point at `table`.
    pub fn incoming_foreign_keys<'a>(
        &'a self,
        table: &'a str,
    ) -> impl Iterator<Item = &'a ForeignKey> + 'a {
        self.foreign_keys
            .values()
            .filter(move |fk| fk.references_table == table)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "db: ")?;
        for table in self.tables.values() {
            writeln!(f, "{table}")?;
        }
        Ok(())
    }
}

/// Two-phase builder for a [`Schema`].
///
/// Tables are registered first as bare placeholders; columns and key
/// columns may then arrive in any order, and [`finish`](Self::finish)
/// attaches them once every table is known.
#[derive(Debug, Default)]
pub struct SchemaAssembler {
    tables: IndexMap<String, Table>,
    columns: IndexMap<String, IndexMap<String, Column>>,
    primary_keys: IndexMap<String, PrimaryKey>,
    foreign_keys: IndexMap<String, ForeignKey>,
}

impl SchemaAssembler {
    /// Creates an empty assembler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table or view placeholder.
    pub fn add_table(&mut self, name: &str, kind: TableKind) -> &mut Self {
        self.tables.insert(name.to_string(), Table::new(name, kind));
        self
    }

    /// Adds a column. `ordinal_position` is the catalog's 1-based position;
    /// [`finish`](Self::finish) orders by it and renumbers from 0.
    pub fn add_column(
        &mut self,
        table: &str,
        name: &str,
        ordinal_position: usize,
        data_type: &str,
    ) -> &mut Self {
        let column = Column {
            table: table.to_string(),
            name: name.to_string(),
            index: ordinal_position.saturating_sub(1),
            data_type: data_type.to_string(),
        };
        self.columns
            .entry(table.to_string())
            .or_default()
            .insert(name.to_string(), column);
        self
    }

    /// Appends one column to a primary key constraint, in key order.
    pub fn add_primary_key_column(&mut self, constraint: &str, table: &str, column: &str) -> &mut Self {
        self.primary_keys
            .entry(constraint.to_string())
            .or_insert_with(|| PrimaryKey {
                table: table.to_string(),
                name: constraint.to_string(),
                columns: Vec::new(),
            })
            .columns
            .push(column.to_string());
        self
    }

    /// Appends one column pair to a foreign key constraint, in key order.
    pub fn add_foreign_key_column(
        &mut self,
        constraint: &str,
        from_table: &str,
        from_column: &str,
        to_table: &str,
        to_column: &str,
    ) -> &mut Self {
        self.foreign_keys
            .entry(constraint.to_string())
            .or_insert_with(|| ForeignKey {
                table: from_table.to_string(),
                name: constraint.to_string(),
                references_table: to_table.to_string(),
                columns: IndexMap::new(),
            })
            .columns
            .insert(from_column.to_string(), to_column.to_string());
        self
    }

    /// Attaches columns and constraints to their tables.
    ///
    /// Rows naming tables that were never registered are skipped with a
    /// warning, as are additional primary keys on a table that has one.
    #[must_use]
    pub fn finish(self) -> Schema {
        let Self {
            mut tables,
            mut columns,
            primary_keys,
            foreign_keys,
        } = self;

        let mut table_pks: IndexMap<String, PrimaryKey> = IndexMap::new();
        for (name, pk) in primary_keys {
            if !tables.contains_key(&pk.table) {
                warn!(constraint = %name, table = %pk.table, "Skipping primary key on unknown table");
            } else if let Some(existing) = table_pks.get(&pk.table) {
                warn!(
                    constraint = %name,
                    kept = %existing.name,
                    table = %pk.table,
                    "Skipping additional primary key"
                );
            } else {
                table_pks.insert(pk.table.clone(), pk);
            }
        }

        let mut table_fks: IndexMap<String, IndexMap<String, ForeignKey>> = IndexMap::new();
        for (name, fk) in foreign_keys {
            if !tables.contains_key(&fk.table) || !tables.contains_key(&fk.references_table) {
                warn!(
                    constraint = %name,
                    table = %fk.table,
                    references = %fk.references_table,
                    "Skipping foreign key on unknown table"
                );
                continue;
            }
            table_fks.entry(fk.table.clone()).or_default().insert(name, fk);
        }

        for (name, table) in &mut tables {
            let mut table_columns = columns.shift_remove(name).unwrap_or_default();
            // dropped columns leave gaps in the catalog positions; row
            // fields are dense
            table_columns.sort_by(|_, a, _, b| a.index.cmp(&b.index));
            for (index, column) in table_columns.values_mut().enumerate() {
                column.index = index;
            }
            table.initialize(
                table_columns,
                table_pks.shift_remove(name),
                table_fks.shift_remove(name).unwrap_or_default(),
            );
        }
        for table in columns.keys() {
            warn!(table = %table, "Skipping columns of unknown table");
        }

        let mut all_foreign_keys = IndexMap::new();
        for table in tables.values() {
            for (name, fk) in &table.foreign_keys {
                if all_foreign_keys.contains_key(name) {
                    warn!(constraint = %name, table = %table.name, "Duplicate foreign key name, keeping the first");
                } else {
                    all_foreign_keys.insert(name.clone(), fk.clone());
                }
            }
        }

        Schema {
            tables,
            foreign_keys: all_foreign_keys,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> Schema {
        let mut asm = SchemaAssembler::new();
        asm.add_table("customer_list", TableKind::View)
            .add_table("customers", TableKind::Table)
            .add_table("orders", TableKind::Table)
            .add_column("orders", "id", 1, "integer")
            .add_column("orders", "customer_id", 2, "integer")
            .add_column("customers", "id", 1, "integer")
            .add_column("customers", "name", 2, "text")
            .add_column("customer_list", "id", 1, "integer")
            .add_primary_key_column("customers_pkey", "customers", "id")
            .add_primary_key_column("orders_pkey", "orders", "id")
            .add_foreign_key_column("orders_customer_id_fkey", "orders", "customer_id", "customers", "id");
        asm.finish()
    }

    #[test]
    fn attaches_keys_to_tables() {
        let schema = shop();
        let orders = schema.table("orders").unwrap();
        assert_eq!(orders.columns.get_index(1).unwrap().1.index, 1);
        assert_eq!(orders.primary_key.as_ref().unwrap().columns, vec!["id"]);
        assert_eq!(orders.foreign_key("orders_customer_id_fkey").unwrap().references_table, "customers");
        assert!(schema.table("customer_list").unwrap().is_view());
    }

    #[test]
    fn column_indexes_close_catalog_gaps() {
        let mut asm = SchemaAssembler::new();
        asm.add_table("people", TableKind::Table)
            .add_column("people", "email", 5, "text")
            .add_column("people", "id", 1, "integer")
            .add_column("people", "name", 3, "text");
        let schema = asm.finish();
        let columns: Vec<_> = schema
            .table("people")
            .unwrap()
            .columns
            .values()
            .map(|c| (c.name.as_str(), c.index))
            .collect();
        assert_eq!(columns, vec![("id", 0), ("name", 1), ("email", 2)]);
    }

    #[test]
    fn incoming_keys_scan_the_flat_index() {
        let schema = shop();
        let incoming: Vec<_> = schema.incoming_foreign_keys("customers").map(|fk| fk.table.as_str()).collect();
        assert_eq!(incoming, vec!["orders"]);
        assert_eq!(schema.incoming_foreign_keys("orders").count(), 0);
    }

    #[test]
    fn lookups_report_missing_names() {
        let schema = shop();
        assert!(matches!(schema.table("nope"), Err(Error::UnknownTable(t)) if t == "nope"));
        assert!(matches!(
            schema.table("orders").unwrap().foreign_key("x"),
            Err(Error::UnknownForeignKey { table: Some(_), .. })
        ));
        assert!(matches!(schema.foreign_key("x"), Err(Error::UnknownForeignKey { table: None, .. })));
    }

    #[test]
    fn skips_foreign_key_to_unknown_table() {
        let mut asm = SchemaAssembler::new();
        asm.add_table("a", TableKind::Table)
            .add_column("a", "b_id", 1, "integer")
            .add_foreign_key_column("a_b_fkey", "a", "b_id", "b", "id");
        let schema = asm.finish();
        assert!(schema.foreign_keys.is_empty());
        assert!(schema.table("a").unwrap().foreign_keys.is_empty());
    }

    #[test]
    fn display_dump() {
        let dump = shop().to_string();
        assert!(dump.starts_with("db: \nview: customer_list\n    col: id integer\n"));
        assert!(dump.contains("table: customers\n    col: id integer\n    col: name text\n     pk: ( id )\n"));
        assert!(dump.contains("     fk: orders_customer_id_fkey = ( customer_id ) -> customers ( id )\n"));
    }
}
