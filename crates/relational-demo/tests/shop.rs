use std::sync::{Arc, Mutex};

use relational_core::orm::Filter;
use relational_core::testing::{ExecutedQuery, ScriptedDriver};
use relational_core::{Database, Entity, ResultSet, Value};
use relational_demo::{ShopCustomer, ShopRoot};

type Log = Arc<Mutex<Vec<ExecutedQuery>>>;

fn customers() -> ResultSet {
    ResultSet::new(&[("id", "int4"), ("name", "text"), ("active", "bool"), ("tags", "_int4")])
        .row([Some("3"), Some("Ada"), Some("t"), Some("{1,2}")])
}

fn orders() -> ResultSet {
    ResultSet::new(&[
        ("id", "int4"),
        ("customer_id", "int4"),
        ("billing_customer_id", "int4"),
        ("status", "varchar"),
    ])
    .row([Some("10"), Some("3"), None, Some("open")])
}

fn shop(driver: ScriptedDriver) -> (ShopRoot, Log) {
    let log = driver.log();
    (ShopRoot::new(Arc::new(Database::new(Box::new(driver)))), log)
}

fn scripted() -> (ShopRoot, Log) {
    shop(
        ScriptedDriver::new()
            .on("FROM customers", customers())
            .on("FROM orders", orders()),
    )
}

fn executed(log: &Log) -> Vec<(String, Vec<String>)> {
    log.lock()
        .unwrap()
        .iter()
        .map(|q| (q.sql.clone(), q.param_texts()))
        .collect()
}

#[test]
fn filtered_list_uses_default_order() {
    let (root, log) = scripted();
    let orders = root
        .get_order_list(Some(Filter::new().eq("customer_id", 3)), None)
        .unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].get_id(), Some(10));
    assert_eq!(orders[0].get_status(), Some("open"));
    assert_eq!(orders[0].get_billing_customer_id(), None);
    assert_eq!(
        executed(&log),
        [(
            String::from("SELECT * FROM orders WHERE true AND customer_id=$1 ORDER BY id"),
            vec![String::from("3")],
        )]
    );
}

#[test]
fn parent_accessor_fetches_by_key() {
    let (root, log) = scripted();
    let order = root.get_order(10).unwrap().unwrap();
    let customer: ShopCustomer = order.get_customer().unwrap().unwrap();
    assert_eq!(customer.get_name(), Some("Ada"));
    assert_eq!(customer.get_active(), Some(true));
    assert_eq!(customer.get_tags(), Some(&[1, 2][..]));

    let queries = executed(&log);
    assert_eq!(queries[0].0, "SELECT * FROM orders WHERE id=$1");
    assert_eq!(queries[1], (String::from("SELECT * FROM customers WHERE id=$1"), vec![String::from("3")]));
}

#[test]
fn null_reference_has_no_parent() {
    let (root, log) = scripted();
    let order = root.get_order(10).unwrap().unwrap();
    assert!(order.get_billing_customer().unwrap().is_none());
    assert_eq!(executed(&log).len(), 1);
}

#[test]
fn child_lists_are_named_after_constraints() {
    let (root, log) = scripted();
    let customer = root.get_customer(3).unwrap().unwrap();
    let billed = customer
        .get_order_by_billing_customer_list(Some(Filter::new().eq("status", "open")), Some("id DESC"))
        .unwrap();
    assert_eq!(billed.len(), 1);
    assert_eq!(
        executed(&log)[1],
        (
            String::from("SELECT * FROM orders WHERE true AND status=$1 AND billing_customer_id=$2 ORDER BY id DESC"),
            vec![String::from("open"), String::from("3")],
        )
    );
}

#[test]
fn reference_values_override_caller_filter() {
    let (root, log) = scripted();
    let customer = root.get_customer(3).unwrap().unwrap();
    customer
        .get_order_by_customer_list(Some(Filter::new().eq("customer_id", 99)), None)
        .unwrap();
    assert_eq!(
        executed(&log)[1],
        (
            String::from("SELECT * FROM orders WHERE true AND customer_id=$1 ORDER BY id"),
            vec![String::from("3")],
        )
    );
}

#[test]
fn composite_and_pseudo_keys() {
    let (root, log) = shop(ScriptedDriver::new());
    assert!(root.get_order_item(10, 2).unwrap().is_none());
    assert!(root.get_active_customer(3).unwrap().is_none());
    root.get_active_customer_list(None, None).unwrap();
    let queries = executed(&log);
    assert_eq!(
        queries[0],
        (
            String::from("SELECT * FROM order_items WHERE order_id=$1 AND line_no=$2"),
            vec![String::from("10"), String::from("2")],
        )
    );
    assert_eq!(queries[1].0, "SELECT * FROM active_customers WHERE id=$1");
    assert_eq!(queries[2].0, "SELECT * FROM active_customers WHERE true ORDER BY id");
}

#[test]
fn entities_export_their_fields() {
    let (root, _) = scripted();
    let customer = root.get_customer(3).unwrap().unwrap();
    let map = customer.to_map();
    assert_eq!(ShopCustomer::TABLE, "customers");
    assert_eq!(map.keys().collect::<Vec<_>>(), ["id", "name", "active", "tags"]);
    assert_eq!(map["id"], Value::Int(3));
    assert_eq!(map["active"], Value::Bool(true));
    assert_eq!(map["tags"], Value::Array(vec![Value::Int(1), Value::Int(2)]));
}
