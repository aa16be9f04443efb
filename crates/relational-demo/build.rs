//! Generates the shop model into `OUT_DIR/shop.rs`.

use std::env;
use std::path::PathBuf;

use relational_codegen::{CodeGenerator, GeneratorConfig, TableHint};
use relational_core::{Schema, SchemaAssembler, TableKind};

fn shop_schema() -> Schema {
    let mut a = SchemaAssembler::new();
    a.add_table("customers", TableKind::Table)
        .add_table("orders", TableKind::Table)
        .add_table("order_items", TableKind::Table)
        .add_table("active_customers", TableKind::View);

    for (i, (name, ty)) in [("id", "integer"), ("name", "text"), ("active", "boolean"), ("tags", "ARRAY")]
        .into_iter()
        .enumerate()
    {
        a.add_column("customers", name, i + 1, ty);
    }
    for (i, (name, ty)) in [
        ("id", "integer"),
        ("customer_id", "integer"),
        ("billing_customer_id", "integer"),
        ("status", "character varying"),
    ]
    .into_iter()
    .enumerate()
    {
        a.add_column("orders", name, i + 1, ty);
    }
    for (i, (name, ty)) in [
        ("order_id", "integer"),
        ("line_no", "integer"),
        ("product", "text"),
        ("quantity", "integer"),
    ]
    .into_iter()
    .enumerate()
    {
        a.add_column("order_items", name, i + 1, ty);
    }
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

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo::rerun-if-changed=build.rs");

    let schema = shop_schema();
    let config = GeneratorConfig::new("Shop")
        .hint("customers", TableHint::default().fk_constraint_names(true))
        .hint("active_customers", TableHint::default().pseudo_key(["id"]))
        .deny_warnings(true);
    let code = CodeGenerator::new(&schema, config).generate()?;

    let out = PathBuf::from(env::var("OUT_DIR")?).join("shop.rs");
    code.write_to(out)?;
    Ok(())
}
