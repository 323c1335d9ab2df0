//! Flat row to nested JSON mapping.
//!
//! Each [`MappingRule`] reads one column from a row, coerces it, and writes
//! it at a dot-delimited path in the output object. Rules run in order and
//! later writes win. Nothing in here fails: missing columns and nulls map
//! to `null`, bad conversions degrade per [`coerce`].

pub mod coerce;


use crate::ast::{MappingRule, Row, SqlValue};
use serde_json::{Map, Value as JsonValue};

pub use self::coerce::coerce;

/// One mapped output record.
pub type JsonObject = Map<String, JsonValue>;

/// Map every row. The output has exactly one object per input row, in
/// input order.
pub fn map_rows(rows: &[Row], rules: &[MappingRule]) -> Vec<JsonObject> {
    rows.iter().map(|row| map_row(row, rules)).collect()
}

/// Map a single row.
pub fn map_row(row: &Row, rules: &[MappingRule]) -> JsonObject {
    let mut result = JsonObject::new();
    for rule in rules {
        let value = match lookup(row, &rule.sql_column) {
            Some(raw) => coerce(raw, rule.kind),
            None => JsonValue::Null,
        };
        set_path(&mut result, &rule.json_path, value);
    }
    result
}

/// Resolve a rule's source column in `row`.
///
/// Drivers disagree on whether joined result columns come back qualified,
/// so `table.column` is tried first and the bare `column` second. A present
/// null under the qualified key does not fall back.
pub fn lookup<'a>(row: &'a Row, column: &str) -> Option<&'a SqlValue> {
    match column.split_once('.') {
        Some((_table, bare)) => row.get(column).or_else(|| row.get(bare)),
        None => row.get(column),
    }
}

/// Write `value` at a dot-delimited `path`, creating intermediate objects.
///
/// An intermediate segment holding anything other than an object (arrays
/// included) is replaced by an empty object.
pub fn set_path(target: &mut JsonObject, path: &str, value: JsonValue) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let last = segments.pop().unwrap_or_default();

    let mut current = target;
    for segment in segments {
        let slot = current
            .entry(segment.to_string())
            .or_insert(JsonValue::Null);
        if !slot.is_object() {
            *slot = JsonValue::Object(Map::new());
        }
        let JsonValue::Object(next) = slot else {
            return;
        };
        current = next;
    }
    current.insert(last.to_string(), value);
}
