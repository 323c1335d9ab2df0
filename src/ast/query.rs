use crate::ast::JoinSpec;
use serde::{Deserialize, Serialize};

/// Structured shape of a SELECT statement.
///
/// `where_clause` and `order_by` are raw SQL fragments. They are pasted into
/// the statement verbatim: no parsing, no escaping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescription {
    /// Selected tables. The first one anchors the FROM clause.
    #[serde(default)]
    pub tables: Vec<String>,
    /// Projected column expressions. Empty means `*`.
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub joins: Vec<JoinSpec>,
    #[serde(default, rename = "where", alias = "where_clause")]
    pub where_clause: Option<String>,
    #[serde(default, alias = "order_by")]
    pub order_by: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl QueryDescription {
    /// Start a description anchored on `table`.
    pub fn from_table(table: impl Into<String>) -> Self {
        Self {
            tables: vec![table.into()],
            ..Self::default()
        }
    }

    /// Add another selected table.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.tables.push(table.into());
        self
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Append a join. The right-hand table is registered in `tables` too.
    pub fn join(mut self, join: JoinSpec) -> Self {
        if !self.tables.contains(&join.right_table) {
            self.tables.push(join.right_table.clone());
        }
        self.joins.push(join);
        self
    }

    /// Set the raw WHERE fragment.
    pub fn filter(mut self, condition: impl Into<String>) -> Self {
        self.where_clause = Some(condition.into());
        self
    }

    /// Set the raw ORDER BY fragment.
    pub fn order(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Anchor table, if any table is selected.
    pub fn anchor(&self) -> Option<&str> {
        self.tables.first().map(String::as_str)
    }

    /// Raw WHERE text, with empty strings treated as absent.
    pub fn where_text(&self) -> Option<&str> {
        non_empty(self.where_clause.as_deref())
    }

    /// Raw ORDER BY text, with empty strings treated as absent.
    pub fn order_text(&self) -> Option<&str> {
        non_empty(self.order_by.as_deref())
    }
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::JoinKind;

    #[test]
    fn test_builder_registers_join_table() {
        let query = QueryDescription::from_table("users")
            .column("users.id")
            .join(JoinSpec::new(JoinKind::Left, ("users", "id"), ("orders", "user_id")))
            .limit(10);
        assert_eq!(query.tables, vec!["users", "orders"]);
        assert_eq!(query.anchor(), Some("users"));
        assert_eq!(query.limit, Some(10));
    }

    #[test]
    fn test_deserialize_ui_shape() {
        let query: QueryDescription = serde_json::from_str(
            r#"{
                "tables": ["users"],
                "columns": [],
                "joins": [],
                "where": "users.active = true",
                "orderBy": "users.id DESC"
            }"#,
        )
        .unwrap();
        assert_eq!(query.where_text(), Some("users.active = true"));
        assert_eq!(query.order_text(), Some("users.id DESC"));
        assert_eq!(query.limit, None);
    }

    #[test]
    fn test_blank_fragments_are_absent() {
        let query = QueryDescription::from_table("t").filter("  ").order("");
        assert_eq!(query.where_text(), None);
        assert_eq!(query.order_text(), None);
    }
}
