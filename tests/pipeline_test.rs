//! End-to-end: project file -> SQL, driver rows -> nested JSON.

use pretty_assertions::assert_eq;
use serde_json::json;
use sql2api::prelude::*;

const PROJECT: &str = r#"
[query]
tables = ["customers", "orders"]
columns = ["customers.id", "customers.name", "orders.id", "orders.total", "orders.paid"]
order_by = "orders.id"
limit = 100

[[query.joins]]
left_table = "customers"
left_column = "id"
right_table = "orders"
right_column = "customer_id"
join_type = "INNER"

[[mapping]]
sql_column = "customers.id"
json_path = "customer.id"
type = "number"

[[mapping]]
sql_column = "customers.name"
json_path = "customer.name"
type = "string"

[[mapping]]
sql_column = "orders.total"
json_path = "order.amount.total"
type = "number"

[[mapping]]
sql_column = "orders.paid"
json_path = "order.paid"
type = "boolean"

[[mapping]]
sql_column = "orders.shipped_at"
json_path = "order.shippedAt"
type = "date"
"#;

#[test]
fn test_project_compiles_with_preview_limit() {
    let project = ProjectConfig::from_toml_str(PROJECT).unwrap();
    let sql = compile(&project.query_description(), Some(5)).unwrap();
    assert_eq!(
        sql,
        "SELECT customers.id, customers.name, orders.id, orders.total, orders.paid\n\
         FROM customers\n\
         INNER JOIN orders ON customers.id = orders.customer_id\n\
         ORDER BY orders.id\n\
         LIMIT 5"
    );
    assert!(validate_sql(&sql).valid);
}

#[test]
fn test_rows_from_driver_are_reshaped() {
    let project = ProjectConfig::from_toml_str(PROJECT).unwrap();

    // Drivers differ: some return bare column names, some qualified ones.
    let rows: Vec<Row> = serde_json::from_value(json!([
        {"id": 1, "name": "Ada", "total": "120.50", "paid": "false", "shipped_at": null},
        {"customers.id": 2, "customers.name": "Linus", "orders.total": 8, "orders.paid": 0}
    ]))
    .unwrap();

    let mapped = map_rows(&rows, &project.mapping_rules());
    assert_eq!(
        serde_json::to_value(&mapped).unwrap(),
        json!([
            {
                "customer": {"id": 1, "name": "Ada"},
                "order": {"amount": {"total": 120.5}, "paid": true, "shippedAt": null}
            },
            {
                "customer": {"id": 2, "name": "Linus"},
                "order": {"amount": {"total": 8}, "paid": false, "shippedAt": null}
            }
        ])
    );
}

#[test]
fn test_empty_selection_is_reported() {
    let project = ProjectConfig::from_toml_str("[query]\ntables = []\n").unwrap();
    let err = project.query_description().to_sql().unwrap_err();
    assert!(matches!(err, BuilderError::EmptyTableList));
}
