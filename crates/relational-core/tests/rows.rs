//! Row fetching and foreign-key navigation.

mod common;

use common::{database, executed, rs, shop_catalog};
use relational_core::{Database, Error, Value};

fn loaded(driver: relational_core::testing::ScriptedDriver) -> (Database, common::QueryLog) {
    let (mut db, log) = database(driver);
    db.load_schema().unwrap();
    log.lock().unwrap().clear();
    (db, log)
}

fn order_row() -> relational_core::ResultSet {
    rs(
        &[("id", "int4"), ("customer_id", "int4"), ("billing_customer_id", "int4"), ("status", "text")],
        &[&[Some("10"), Some("3"), None, Some("open")]],
    )
}

#[test]
fn rows_match_with_is_null_for_null_values() {
    let (db, log) = loaded(shop_catalog().on("FROM orders", order_row()));
    let orders = db.table("orders").unwrap();
    let rows = orders
        .rows(
            &db,
            &[("customer_id", Value::Int(3)), ("billing_customer_id", Value::Null)],
            Some("id DESC"),
            Some(5),
            Some(10),
        )
        .unwrap();

    let query = &executed(&log)[0];
    assert_eq!(
        query.sql,
        "SELECT * FROM orders WHERE customer_id=$1 AND billing_customer_id IS NULL ORDER BY id DESC LIMIT 5 OFFSET 10"
    );
    assert_eq!(query.param_texts(), vec!["3"]);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].value("status").unwrap(), &Value::from("open"));
    assert_eq!(rows[0].to_string(), "orders: (10,3,NULL,open)");
    assert!(matches!(
        rows[0].value("missing"),
        Err(Error::UnknownColumn { table, column }) if table == "orders" && column == "missing"
    ));
}

#[test]
fn parent_row_follows_outgoing_key() {
    let driver = shop_catalog()
        .on("FROM orders", order_row())
        .on(
            "FROM customers",
            rs(&[("id", "int4"), ("name", "text")], &[&[Some("3"), Some("Ada")]]),
        );
    let (db, log) = loaded(driver);
    let order = db.table("orders").unwrap().rows(&db, &[], None, None, None).unwrap().remove(0);

    let customer = order.parent_row(&db, "orders_customer_id_fkey").unwrap().unwrap();
    assert_eq!(customer.table, "customers");
    assert_eq!(customer.value("name").unwrap(), &Value::from("Ada"));
    let query = executed(&log).pop().unwrap();
    assert_eq!(query.sql, "SELECT * FROM customers WHERE id=$1");
    assert_eq!(query.param_texts(), vec!["3"]);

    // NULL reference: no parent, no query
    let before = executed(&log).len();
    assert_eq!(order.parent_row(&db, "orders_billing_customer_id_fkey").unwrap(), None);
    assert_eq!(executed(&log).len(), before);

    assert!(matches!(
        order.parent_row(&db, "order_items_order_id_fkey"),
        Err(Error::UnknownForeignKey { table: Some(t), .. }) if t == "orders"
    ));
}

#[test]
fn parent_row_rejects_ambiguous_match() {
    let driver = shop_catalog().on("FROM orders", order_row()).on(
        "FROM customers",
        rs(&[("id", "int4")], &[&[Some("3")], &[Some("3")]]),
    );
    let (db, _) = loaded(driver);
    let order = db.table("orders").unwrap().rows(&db, &[], None, None, None).unwrap().remove(0);
    assert!(matches!(
        order.parent_row(&db, "orders_customer_id_fkey"),
        Err(Error::MultipleRows { .. })
    ));
}

#[test]
fn child_rows_follow_incoming_key() {
    let driver = shop_catalog().on("FROM orders", order_row()).on(
        "FROM order_items",
        rs(
            &[("order_id", "int4"), ("line_no", "int4"), ("product", "text"), ("quantity", "int4")],
            &[&[Some("10"), Some("1"), Some("tea"), Some("2")], &[Some("10"), Some("2"), Some("cup"), Some("1")]],
        ),
    );
    let (db, log) = loaded(driver);
    let order = db.table("orders").unwrap().rows(&db, &[], None, None, None).unwrap().remove(0);

    let items = order.child_rows(&db, "order_items_order_id_fkey").unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].value("product").unwrap(), &Value::from("cup"));
    let query = executed(&log).pop().unwrap();
    assert_eq!(query.sql, "SELECT * FROM order_items WHERE order_id=$1");
    assert_eq!(query.param_texts(), vec!["10"]);
}

#[test]
fn column_values() {
    let driver = shop_catalog().on(
        "SELECT name FROM customers",
        rs(&[("name", "text")], &[&[Some("Ada")], &[Some("Bob")]]),
    );
    let (db, log) = loaded(driver);
    let column = db.table("customers").unwrap().column("name").unwrap();
    let values = column.values(&db, Some("name")).unwrap();
    assert_eq!(values, vec![Value::from("Ada"), Value::from("Bob")]);
    assert_eq!(executed(&log)[0].sql, "SELECT name FROM customers ORDER BY name");
}

#[test]
fn rows_after_dropped_column_keep_field_order() {
    let mut asm = relational_core::SchemaAssembler::new();
    asm.add_table("people", relational_core::TableKind::Table)
        .add_column("people", "id", 1, "integer")
        .add_column("people", "name", 3, "text");
    let driver = relational_core::testing::ScriptedDriver::new().on(
        "FROM people",
        rs(&[("id", "int4"), ("name", "text")], &[&[Some("1"), Some("Ada")]]),
    );
    let (mut db, _log) = database(driver);
    db.install_schema(asm.finish());

    let rows = db.table("people").unwrap().rows(&db, &[], None, None, None).unwrap();
    assert_eq!(rows[0].value("id").unwrap(), &Value::from("1"));
    assert_eq!(rows[0].value("name").unwrap(), &Value::from("Ada"));
}
