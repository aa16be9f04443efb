#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use relational_core::testing::{ExecutedQuery, ScriptedDriver};
use relational_core::{Database, ResultSet};

pub type QueryLog = Arc<Mutex<Vec<ExecutedQuery>>>;

pub fn rs(columns: &[(&str, &str)], rows: &[&[Option<&str>]]) -> ResultSet {
    rows.iter()
        .fold(ResultSet::new(columns), |acc, row| acc.row(row.iter().copied()))
}

pub fn tables() -> ResultSet {
    rs(
        &[("table_name", "name"), ("table_type", "varchar")],
        &[
            &[Some("customers"), Some("BASE TABLE")],
            &[Some("order_items"), Some("BASE TABLE")],
            &[Some("orders"), Some("BASE TABLE")],
            &[Some("customer_list"), Some("VIEW")],
        ],
    )
}

pub fn columns() -> ResultSet {
    let cols = [
        ("customer_list", "id", "1", "integer"),
        ("customer_list", "name", "2", "text"),
        ("customers", "id", "1", "integer"),
        ("customers", "name", "2", "text"),
        ("customers", "active", "3", "boolean"),
        ("customers", "tags", "4", "ARRAY"),
        ("order_items", "order_id", "1", "integer"),
        ("order_items", "line_no", "2", "integer"),
        ("order_items", "product", "3", "text"),
        ("order_items", "quantity", "4", "integer"),
        ("orders", "id", "1", "integer"),
        ("orders", "customer_id", "2", "integer"),
        ("orders", "billing_customer_id", "3", "integer"),
        ("orders", "status", "4", "text"),
    ];
    cols.iter().fold(
        ResultSet::new(&[
            ("column_name", "name"),
            ("ordinal_position", "int4"),
            ("table_name", "name"),
            ("data_type", "varchar"),
        ]),
        |acc, (table, column, pos, ty)| acc.row([Some(*column), Some(*pos), Some(*table), Some(*ty)]),
    )
}

pub fn primary_keys() -> ResultSet {
    rs(
        &[("constraint_name", "name"), ("table_name", "name"), ("column_name", "name")],
        &[
            &[Some("customers_pkey"), Some("customers"), Some("id")],
            &[Some("order_items_pkey"), Some("order_items"), Some("order_id")],
            &[Some("order_items_pkey"), Some("order_items"), Some("line_no")],
            &[Some("orders_pkey"), Some("orders"), Some("id")],
        ],
    )
}

pub fn foreign_keys() -> ResultSet {
    rs(
        &[
            ("constraint_name", "name"),
            ("from_table_name", "name"),
            ("from_column_name", "name"),
            ("to_table_name", "name"),
            ("to_column_name", "name"),
        ],
        &[
            &[Some("order_items_order_id_fkey"), Some("order_items"), Some("order_id"), Some("orders"), Some("id")],
            &[Some("orders_billing_customer_id_fkey"), Some("orders"), Some("billing_customer_id"), Some("customers"), Some("id")],
            &[Some("orders_customer_id_fkey"), Some("orders"), Some("customer_id"), Some("customers"), Some("id")],
            &[Some("orders_ext_fkey"), Some("orders"), Some("status"), None, None],
        ],
    )
}

/// A driver answering the four catalog queries for a small shop schema.
pub fn shop_catalog() -> ScriptedDriver {
    ScriptedDriver::new()
        .on("information_schema.tables", tables())
        .on("information_schema.columns", columns())
        .on("'PRIMARY KEY'", primary_keys())
        .on("'FOREIGN KEY'", foreign_keys())
}

pub fn database(driver: ScriptedDriver) -> (Database, QueryLog) {
    let log = driver.log();
    (Database::new(Box::new(driver)), log)
}

pub fn executed(log: &QueryLog) -> Vec<ExecutedQuery> {
    log.lock().unwrap().clone()
}
