//! Join compilation tests.

use crate::ast::{JoinKind, JoinSpec, QueryDescription};
use crate::transpiler::ToSql;

fn one_join(kind: JoinKind) -> QueryDescription {
    QueryDescription::from_table("t1").join(JoinSpec::new(kind, ("t1", "id"), ("t2", "t1_id")))
}

#[test]
fn test_plain_join_kinds() {
    let cases = [
        (JoinKind::Inner, "INNER JOIN t2 ON t1.id = t2.t1_id"),
        (JoinKind::Left, "LEFT JOIN t2 ON t1.id = t2.t1_id"),
        (JoinKind::Right, "RIGHT JOIN t2 ON t1.id = t2.t1_id"),
        (JoinKind::Full, "FULL OUTER JOIN t2 ON t1.id = t2.t1_id"),
    ];
    for (kind, expected) in cases {
        let sql = one_join(kind).to_sql().unwrap();
        assert_eq!(sql, format!("SELECT *\nFROM t1\n{}", expected), "{}", kind);
        assert!(!sql.contains("WHERE"), "{}", kind);
    }
}

#[test]
fn test_left_null_is_left_anti_join() {
    assert_eq!(
        one_join(JoinKind::LeftNull).to_sql().unwrap(),
        "SELECT *\nFROM t1\nLEFT JOIN t2 ON t1.id = t2.t1_id\nWHERE t2.t1_id IS NULL"
    );
}

#[test]
fn test_right_null_is_right_anti_join() {
    assert_eq!(
        one_join(JoinKind::RightNull).to_sql().unwrap(),
        "SELECT *\nFROM t1\nRIGHT JOIN t2 ON t1.id = t2.t1_id\nWHERE t1.id IS NULL"
    );
}

#[test]
fn test_full_null_is_symmetric_difference() {
    assert_eq!(
        one_join(JoinKind::FullNull).to_sql().unwrap(),
        "SELECT *\nFROM t1\nFULL OUTER JOIN t2 ON t1.id = t2.t1_id\nWHERE t1.id IS NULL OR t2.t1_id IS NULL"
    );
}

#[test]
fn test_exclusive_join_merges_with_user_where() {
    // The anti-join predicate is kept and the caller's filter is conjoined
    // with it: one WHERE, never two.
    let sql = one_join(JoinKind::LeftNull)
        .filter("t1.active = true")
        .to_sql()
        .unwrap();
    assert_eq!(sql.matches("WHERE").count(), 1);
    assert!(sql.ends_with("WHERE (t2.t1_id IS NULL) AND (t1.active = true)"));
}

#[test]
fn test_full_null_predicate_is_grouped_when_merged() {
    let sql = one_join(JoinKind::FullNull)
        .filter("t1.x = 1 OR t1.y = 2")
        .to_sql()
        .unwrap();
    assert!(sql.ends_with(
        "WHERE (t1.id IS NULL OR t2.t1_id IS NULL) AND (t1.x = 1 OR t1.y = 2)"
    ));
}

#[test]
fn test_joins_apply_in_order_with_one_where() {
    let query = QueryDescription::from_table("customers")
        .join(JoinSpec::new(JoinKind::LeftNull, ("customers", "id"), ("orders", "customer_id")))
        .join(JoinSpec::new(JoinKind::Inner, ("customers", "region_id"), ("regions", "id")))
        .join(JoinSpec::new(JoinKind::RightNull, ("customers", "id"), ("tickets", "customer_id")));
    assert_eq!(
        query.to_sql().unwrap(),
        "SELECT *\n\
         FROM customers\n\
         LEFT JOIN orders ON customers.id = orders.customer_id\n\
         INNER JOIN regions ON customers.region_id = regions.id\n\
         RIGHT JOIN tickets ON customers.id = tickets.customer_id\n\
         WHERE (orders.customer_id IS NULL) AND (customers.id IS NULL)"
    );
}

#[test]
fn test_empty_join_columns_pass_through() {
    let sql = QueryDescription::from_table("a")
        .join(JoinSpec::new(JoinKind::Inner, ("a", ""), ("b", "")))
        .to_sql()
        .unwrap();
    assert!(sql.contains("INNER JOIN b ON a. = b."));
}

#[test]
fn test_clause_ordering_with_exclusive_join() {
    let sql = one_join(JoinKind::FullNull)
        .filter("t1.k > 0")
        .order("t1.k")
        .limit(7)
        .to_sql()
        .unwrap();
    let join = sql.find("JOIN").unwrap();
    let filter = sql.find("WHERE").unwrap();
    let order = sql.find("ORDER BY").unwrap();
    let limit = sql.find("LIMIT 7").unwrap();
    assert!(sql.find("FROM").unwrap() < join);
    assert!(join < filter && filter < order && order < limit);
}
