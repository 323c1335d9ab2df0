//! Shallow SQL sanity checks.
//!
//! This is a lint, not a parser: it catches the obvious mistakes before a
//! statement is sent to the database. [`crate::engine::explain`] asks the
//! database itself.

use serde::Serialize;

/// Outcome of [`validate_sql`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Check a statement for emptiness, a SELECT, a FROM, and balanced
/// parentheses. Keyword checks are case-insensitive substring matches.
pub fn validate_sql(sql: &str) -> ValidationReport {
    let mut errors = Vec::new();
    let lower = sql.to_lowercase();

    if sql.trim().is_empty() {
        errors.push("SQL query is empty".to_string());
    }
    if !lower.contains("select") {
        errors.push("Query must include SELECT statement".to_string());
    }
    if !lower.contains("from") {
        errors.push("Query must include FROM clause".to_string());
    }

    let open = sql.matches('(').count();
    let close = sql.matches(')').count();
    if open != close {
        errors.push("Unbalanced parentheses in query".to_string());
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::QueryDescription;
    use crate::transpiler::ToSql;

    #[test]
    fn test_compiled_query_is_valid() {
        let sql = QueryDescription::from_table("users").limit(5).to_sql().unwrap();
        let report = validate_sql(&sql);
        assert!(report.valid, "{:?}", report.errors);
    }

    #[test]
    fn test_empty_query() {
        let report = validate_sql("   ");
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec![
                "SQL query is empty",
                "Query must include SELECT statement",
                "Query must include FROM clause",
            ]
        );
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let report = validate_sql("select count(* from t");
        assert_eq!(report.errors, vec!["Unbalanced parentheses in query"]);
    }
}
