use crate::ast::{JoinSpec, QueryDescription};
use crate::error::{BuilderError, BuilderResult};

/// Generate SELECT SQL.
///
/// Exclusive joins do not emit their own WHERE. Their `IS NULL` predicates
/// are collected and conjoined with the caller's WHERE fragment into a single
/// clause after the last join, so a statement never carries two WHERE
/// keywords.
pub(super) fn build_select(
    query: &QueryDescription,
    override_limit: Option<u32>,
) -> BuilderResult<String> {
    let anchor = query.anchor().ok_or(BuilderError::EmptyTableList)?;

    let mut lines: Vec<String> = Vec::with_capacity(5 + query.joins.len());

    // Columns
    if query.columns.is_empty() {
        lines.push("SELECT *".to_string());
    } else {
        lines.push(format!("SELECT {}", query.columns.join(", ")));
    }

    // FROM
    lines.push(format!("FROM {}", anchor));

    // JOINs, in order
    let mut predicates: Vec<String> = Vec::new();
    for join in &query.joins {
        lines.push(join_line(join));
        if let Some(predicate) = join.exclusion_predicate() {
            predicates.push(predicate);
        }
    }

    // WHERE
    if let Some(filter) = query.where_text() {
        predicates.push(filter.to_string());
    }
    if let Some(clause) = where_clause(&predicates) {
        lines.push(clause);
    }

    // ORDER BY
    if let Some(order) = query.order_text() {
        lines.push(format!("ORDER BY {}", order));
    }

    // LIMIT
    if let Some(n) = override_limit.or(query.limit).filter(|n| *n > 0) {
        lines.push(format!("LIMIT {}", n));
    }

    Ok(lines.join("\n"))
}

fn join_line(join: &JoinSpec) -> String {
    format!(
        "{} {} ON {}",
        join.join_type.keyword(),
        join.right_table,
        join.on_clause()
    )
}

fn where_clause(predicates: &[String]) -> Option<String> {
    match predicates {
        [] => None,
        [single] => Some(format!("WHERE {}", single)),
        many => {
            let grouped: Vec<String> = many.iter().map(|p| format!("({})", p)).collect();
            Some(format!("WHERE {}", grouped.join(" AND ")))
        }
    }
}
