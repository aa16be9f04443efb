#![allow(dead_code)]

use relational_core::{Schema, SchemaAssembler, TableKind};

/// Customers, orders referencing customers twice, composite-key order
/// items and a view over customers.
pub fn shop_schema() -> Schema {
    let mut a = SchemaAssembler::new();
    a.add_table("customers", TableKind::Table)
        .add_table("orders", TableKind::Table)
        .add_table("order_items", TableKind::Table)
        .add_table("active_customers", TableKind::View);

    a.add_column("customers", "id", 1, "integer")
        .add_column("customers", "name", 2, "text")
        .add_column("customers", "active", 3, "boolean")
        .add_column("customers", "tags", 4, "ARRAY");
    a.add_column("orders", "id", 1, "integer")
        .add_column("orders", "customer_id", 2, "integer")
        .add_column("orders", "billing_customer_id", 3, "integer")
        .add_column("orders", "status", 4, "character varying");
    a.add_column("order_items", "order_id", 1, "integer")
        .add_column("order_items", "line_no", 2, "integer")
        .add_column("order_items", "product", 3, "text");
    a.add_column("active_customers", "id", 1, "integer")
        .add_column("active_customers", "name", 2, "text");

    a.add_primary_key_column("customers_pkey", "customers", "id")
        .add_primary_key_column("orders_pkey", "orders", "id")
        .add_primary_key_column("order_items_pkey", "order_items", "order_id")
        .add_primary_key_column("order_items_pkey", "order_items", "line_no");

    a.add_foreign_key_column("orders_customer_id_fkey", "orders", "customer_id", "customers", "id")
        .add_foreign_key_column(
            "orders_billing_customer_id_fkey",
            "orders",
            "billing_customer_id",
            "customers",
            "id",
        )
        .add_foreign_key_column("order_items_order_id_fkey", "order_items", "order_id", "orders", "id");
    a.finish()
}

/// Adds `notes`: no primary key, one foreign key to a non-key column of
/// `customers` and a column whose getter shadows a parent accessor.
pub fn with_notes(schema: Schema) -> Schema {
    let mut a = SchemaAssembler::new();
    for table in schema.tables.values() {
        a.add_table(&table.name, table.kind);
        for column in table.columns.values() {
            a.add_column(&table.name, &column.name, column.index + 1, &column.data_type);
        }
        if let Some(pk) = &table.primary_key {
            for column in &pk.columns {
                a.add_primary_key_column(&pk.name, &table.name, column);
            }
        }
    }
    for fk in schema.foreign_keys.values() {
        for (from, to) in &fk.columns {
            a.add_foreign_key_column(&fk.name, &fk.table, from, &fk.references_table, to);
        }
    }
    a.add_table("notes", TableKind::Table)
        .add_column("notes", "body", 1, "text")
        .add_column("notes", "author_id", 2, "text")
        .add_column("notes", "customer", 3, "text")
        .add_column("notes", "customer_id", 4, "integer")
        .add_foreign_key_column("notes_author_id_fkey", "notes", "author_id", "customers", "name")
        .add_foreign_key_column("notes_customer_id_fkey", "notes", "customer_id", "customers", "id");
    a.finish()
}
