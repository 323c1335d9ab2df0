//! Value coercion for mapping rules.
//!
//! Conversions follow the loose rules of JavaScript's `Number()`,
//! `Boolean()`, `String()` and `new Date(..).toISOString()`, because that is
//! what mapping configurations were written against. None of them fail:
//! bad input yields `NaN`, `"Invalid Date"` or a wrapped value.

use crate::ast::values::{float_to_json, iso_millis, js_number_from_str};
use crate::ast::{MappingType, SqlValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value as JsonValue};

/// Sentinel written for unparseable dates.
pub const INVALID_DATE: &str = "Invalid Date";

/// Largest magnitude a JS `Date` accepts, in milliseconds.
const MAX_DATE_MILLIS: f64 = 8.64e15;

/// Coerce a non-null value to `kind`. Null input always yields `null`.
pub fn coerce(value: &SqlValue, kind: MappingType) -> JsonValue {
    if value.is_null() {
        return JsonValue::Null;
    }
    match kind {
        MappingType::Number => match value {
            SqlValue::Int(n) => JsonValue::from(*n),
            other => number_to_json(to_number(other)),
        },
        MappingType::Boolean => JsonValue::Bool(truthy(value)),
        MappingType::Date => JsonValue::String(to_date_string(value)),
        MappingType::Array => match value {
            SqlValue::Json(JsonValue::Array(items)) => JsonValue::Array(items.clone()),
            other => JsonValue::Array(vec![other.to_json()]),
        },
        MappingType::Object => match value {
            SqlValue::Json(JsonValue::Object(map)) => JsonValue::Object(map.clone()),
            other => {
                let mut wrapped = Map::new();
                wrapped.insert("value".to_string(), other.to_json());
                JsonValue::Object(wrapped)
            }
        },
        MappingType::String => JsonValue::String(to_js_string(value)),
    }
}

/// Numeric value of `value`; `NaN` when there is none.
pub fn to_number(value: &SqlValue) -> f64 {
    match value {
        SqlValue::Null => 0.0,
        SqlValue::Bool(b) => bool_number(*b),
        SqlValue::Int(n) => *n as f64,
        SqlValue::Float(f) => *f,
        SqlValue::Text(s) => js_number_from_str(s),
        SqlValue::Timestamp(ts) => ts.timestamp_millis() as f64,
        SqlValue::Json(v) => json_number(v),
    }
}

fn json_number(value: &JsonValue) -> f64 {
    match value {
        JsonValue::Null => 0.0,
        JsonValue::Bool(b) => bool_number(*b),
        JsonValue::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        JsonValue::String(s) => js_number_from_str(s),
        // Arrays go through their string form: [] is 0, [7] is 7, [1,2] is NaN.
        JsonValue::Array(_) => js_number_from_str(&json_to_js_string(value)),
        JsonValue::Object(_) => f64::NAN,
    }
}

fn bool_number(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// Integral values within the exact range print without a fraction.
fn number_to_json(f: f64) -> JsonValue {
    const EXACT: f64 = 9_007_199_254_740_992.0;
    if f.fract() == 0.0 && f.abs() < EXACT {
        JsonValue::from(f as i64)
    } else {
        float_to_json(f)
    }
}

/// Truthiness: `false`, zero, `NaN`, and the empty string are false.
///
/// Every other string is true, `"false"` and `"0"` included.
pub fn truthy(value: &SqlValue) -> bool {
    match value {
        SqlValue::Null => false,
        SqlValue::Bool(b) => *b,
        SqlValue::Int(n) => *n != 0,
        SqlValue::Float(f) => *f != 0.0 && !f.is_nan(),
        SqlValue::Text(s) => !s.is_empty(),
        SqlValue::Timestamp(_) => true,
        SqlValue::Json(v) => match v {
            JsonValue::Null => false,
            JsonValue::Bool(b) => *b,
            JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            JsonValue::String(s) => !s.is_empty(),
            JsonValue::Array(_) | JsonValue::Object(_) => true,
        },
    }
}

/// ISO-8601 rendering of `value` read as a date, or [`INVALID_DATE`].
///
/// Numbers are epoch milliseconds. Strings may be RFC 3339, RFC 2822,
/// `YYYY-MM-DD`, or `YYYY-MM-DD HH:MM[:SS[.fff]]` with an optional offset;
/// strings without an offset are read as UTC.
pub fn to_date_string(value: &SqlValue) -> String {
    let parsed = match value {
        SqlValue::Timestamp(ts) => Some(*ts),
        SqlValue::Text(s) => parse_date(s),
        SqlValue::Json(JsonValue::String(s)) => parse_date(s),
        SqlValue::Json(JsonValue::Object(_)) => None,
        SqlValue::Json(JsonValue::Array(_)) => parse_date(&to_js_string(value)),
        other => from_millis(to_number(other)),
    };
    parsed
        .map(|ts| iso_millis(&ts))
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

fn from_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() || millis.abs() > MAX_DATE_MILLIS {
        return None;
    }
    DateTime::from_timestamp_millis(millis.trunc() as i64)
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%d %H:%M:%S%.f %#z"];

fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    None
}

/// `String(value)`.
///
/// Timestamps render as ISO-8601 rather than the locale-dependent
/// `Date.prototype.toString` form.
pub fn to_js_string(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "null".to_string(),
        SqlValue::Bool(b) => b.to_string(),
        SqlValue::Int(n) => n.to_string(),
        SqlValue::Float(f) => js_number_to_string(*f),
        SqlValue::Text(s) => s.clone(),
        SqlValue::Timestamp(ts) => iso_millis(ts),
        SqlValue::Json(v) => json_to_js_string(v),
    }
}

fn json_to_js_string(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => js_number_to_string(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| match item {
                JsonValue::Null => String::new(),
                other => json_to_js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        JsonValue::Object(_) => "[object Object]".to_string(),
    }
}

/// Number-to-string with JS spelling for non-finite and extreme values.
pub fn js_number_to_string(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if f == 0.0 {
        return "0".to_string();
    }
    let magnitude = f.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let exp = format!("{:e}", f);
        return match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                format!("{}e+{}", mantissa, power)
            }
            _ => exp,
        };
    }
    format!("{}", f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(s.to_string())
    }

    #[test]
    fn test_number_coercion_output() {
        assert_eq!(coerce(&text("19.99"), MappingType::Number), json!(19.99));
        assert_eq!(coerce(&text("7"), MappingType::Number), json!(7));
        assert_eq!(coerce(&SqlValue::Bool(true), MappingType::Number), json!(1));
        assert_eq!(coerce(&SqlValue::Int(i64::MAX), MappingType::Number), json!(i64::MAX));
        // NaN has no JSON form; it serializes as null.
        assert!(to_number(&text("n/a")).is_nan());
        assert_eq!(coerce(&text("n/a"), MappingType::Number), JsonValue::Null);
    }

    #[test]
    fn test_number_from_json_arrays() {
        assert_eq!(to_number(&SqlValue::Json(json!([]))), 0.0);
        assert_eq!(to_number(&SqlValue::Json(json!(["7"]))), 7.0);
        assert!(to_number(&SqlValue::Json(json!([1, 2]))).is_nan());
        assert!(to_number(&SqlValue::Json(json!({"a": 1}))).is_nan());
    }

    #[test]
    fn test_truthiness() {
        assert!(truthy(&text("false")));
        assert!(truthy(&text("0")));
        assert!(!truthy(&text("")));
        assert!(!truthy(&SqlValue::Int(0)));
        assert!(!truthy(&SqlValue::Float(f64::NAN)));
        assert!(truthy(&SqlValue::Json(json!([]))));
        assert_eq!(coerce(&text("false"), MappingType::Boolean), json!(true));
    }

    #[test]
    fn test_date_parsing() {
        assert_eq!(to_date_string(&text("2024-01-15")), "2024-01-15T00:00:00.000Z");
        assert_eq!(
            to_date_string(&text("2024-01-15T10:20:30+02:00")),
            "2024-01-15T08:20:30.000Z"
        );
        assert_eq!(
            to_date_string(&text("2024-01-15 10:20:30.5")),
            "2024-01-15T10:20:30.500Z"
        );
        assert_eq!(
            to_date_string(&text("2024-01-15 10:20:30+00")),
            "2024-01-15T10:20:30.000Z"
        );
        assert_eq!(to_date_string(&SqlValue::Int(0)), "1970-01-01T00:00:00.000Z");
        assert_eq!(
            to_date_string(&SqlValue::Timestamp(Utc.with_ymd_and_hms(2020, 2, 29, 0, 0, 0).unwrap())),
            "2020-02-29T00:00:00.000Z"
        );
    }

    #[test]
    fn test_invalid_dates_use_sentinel() {
        assert_eq!(to_date_string(&text("not a date")), INVALID_DATE);
        assert_eq!(to_date_string(&text("2024-13-45")), INVALID_DATE);
        assert_eq!(to_date_string(&SqlValue::Float(f64::NAN)), INVALID_DATE);
        assert_eq!(to_date_string(&SqlValue::Json(json!({"y": 1}))), INVALID_DATE);
        assert_eq!(coerce(&text(""), MappingType::Date), json!(INVALID_DATE));
    }

    #[test]
    fn test_array_and_object_wrapping() {
        let tags = SqlValue::Json(json!(["a", "b"]));
        assert_eq!(coerce(&tags, MappingType::Array), json!(["a", "b"]));
        assert_eq!(coerce(&text("a"), MappingType::Array), json!(["a"]));

        let doc = SqlValue::Json(json!({"k": 1}));
        assert_eq!(coerce(&doc, MappingType::Object), json!({"k": 1}));
        assert_eq!(coerce(&SqlValue::Int(3), MappingType::Object), json!({"value": 3}));
        assert_eq!(coerce(&tags, MappingType::Object), json!({"value": ["a", "b"]}));
    }

    #[test]
    fn test_string_conversion() {
        assert_eq!(to_js_string(&SqlValue::Float(2.0)), "2");
        assert_eq!(to_js_string(&SqlValue::Float(0.1)), "0.1");
        assert_eq!(to_js_string(&SqlValue::Float(f64::NAN)), "NaN");
        assert_eq!(to_js_string(&SqlValue::Float(1e21)), "1e+21");
        assert_eq!(to_js_string(&SqlValue::Float(1.5e-7)), "1.5e-7");
        assert_eq!(to_js_string(&SqlValue::Bool(false)), "false");
        assert_eq!(to_js_string(&SqlValue::Json(json!([1, null, "x"]))), "1,,x");
        assert_eq!(to_js_string(&SqlValue::Json(json!({"a": 1}))), "[object Object]");
        assert_eq!(coerce(&SqlValue::Int(5), MappingType::String), json!("5"));
    }

    #[test]
    fn test_null_short_circuits_every_kind() {
        for kind in MappingType::ALL {
            assert_eq!(coerce(&SqlValue::Null, kind), JsonValue::Null);
            assert_eq!(coerce(&SqlValue::Json(JsonValue::Null), kind), JsonValue::Null);
        }
    }
}
