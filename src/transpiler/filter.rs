//! Structured filter and ordering rows, rendered to the raw WHERE / ORDER BY
//! fragments a [`QueryDescription`](crate::ast::QueryDescription) carries.
//!
//! Values are quoted but not escaped.

use crate::ast::values::js_number_from_str;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WhereOperator {
    #[default]
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "LIKE")]
    Like,
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "IS NULL")]
    IsNull,
    #[serde(rename = "IS NOT NULL")]
    IsNotNull,
}

impl WhereOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            WhereOperator::Eq => "=",
            WhereOperator::Ne => "!=",
            WhereOperator::Gt => ">",
            WhereOperator::Lt => "<",
            WhereOperator::Gte => ">=",
            WhereOperator::Lte => "<=",
            WhereOperator::Like => "LIKE",
            WhereOperator::In => "IN",
            WhereOperator::IsNull => "IS NULL",
            WhereOperator::IsNotNull => "IS NOT NULL",
        }
    }
}

impl fmt::Display for WhereOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical glue placed before every condition but the first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connector::And => f.write_str("AND"),
            Connector::Or => f.write_str("OR"),
        }
    }
}

/// One row of the condition editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhereCondition {
    pub column: String,
    #[serde(default)]
    pub operator: WhereOperator,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub connector: Connector,
}

impl WhereCondition {
    pub fn new(column: impl Into<String>, operator: WhereOperator, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
            connector: Connector::And,
        }
    }

    pub fn or(mut self) -> Self {
        self.connector = Connector::Or;
        self
    }

    fn to_sql(&self) -> String {
        match self.operator {
            WhereOperator::IsNull | WhereOperator::IsNotNull => {
                format!("{} {}", self.column, self.operator)
            }
            WhereOperator::In => format!("{} IN ({})", self.column, self.value),
            WhereOperator::Like => format!("{} LIKE '{}'", self.column, self.value),
            op => {
                // Numeric-looking values go in bare, everything else quoted.
                let value = if js_number_from_str(&self.value).is_nan() {
                    format!("'{}'", self.value)
                } else {
                    self.value.clone()
                };
                format!("{} {} {}", self.column, op, value)
            }
        }
    }
}

/// Render conditions into one WHERE fragment, left to right, no grouping.
pub fn render_where(conditions: &[WhereCondition]) -> Option<String> {
    if conditions.is_empty() {
        return None;
    }
    let mut sql = String::new();
    for (i, cond) in conditions.iter().enumerate() {
        if i > 0 {
            sql.push_str(&format!(" {} ", cond.connector));
        }
        sql.push_str(&cond.to_sql());
    }
    Some(sql)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderByRule {
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl OrderByRule {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Render ordering rules as `col DIR, col DIR`.
pub fn render_order_by(rules: &[OrderByRule]) -> Option<String> {
    if rules.is_empty() {
        return None;
    }
    let parts: Vec<String> = rules
        .iter()
        .map(|r| {
            let dir = match r.direction {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            };
            format!("{} {}", r.column, dir)
        })
        .collect();
    Some(parts.join(", "))
}
