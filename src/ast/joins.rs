use crate::ast::JoinKind;
use serde::{Deserialize, Serialize};

/// One join step: `right_table` joined onto the query on
/// `left_table.left_column = right_table.right_column`.
///
/// Neither table is checked against the query's table list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSpec {
    #[serde(alias = "left_table")]
    pub left_table: String,
    #[serde(alias = "right_table")]
    pub right_table: String,
    #[serde(alias = "left_column")]
    pub left_column: String,
    #[serde(alias = "right_column")]
    pub right_column: String,
    #[serde(alias = "join_type", alias = "kind")]
    pub join_type: JoinKind,
}

impl JoinSpec {
    pub fn new(
        join_type: JoinKind,
        left: (impl Into<String>, impl Into<String>),
        right: (impl Into<String>, impl Into<String>),
    ) -> Self {
        Self {
            left_table: left.0.into(),
            left_column: left.1.into(),
            right_table: right.0.into(),
            right_column: right.1.into(),
            join_type,
        }
    }

    /// `{left}.{lcol} = {right}.{rcol}`
    pub fn on_clause(&self) -> String {
        format!(
            "{}.{} = {}.{}",
            self.left_table, self.left_column, self.right_table, self.right_column
        )
    }

    /// The `IS NULL` predicate an exclusive join needs in the WHERE clause.
    pub fn exclusion_predicate(&self) -> Option<String> {
        let left = format!("{}.{}", self.left_table, self.left_column);
        let right = format!("{}.{}", self.right_table, self.right_column);
        match self.join_type {
            JoinKind::LeftNull => Some(format!("{} IS NULL", right)),
            JoinKind::RightNull => Some(format!("{} IS NULL", left)),
            JoinKind::FullNull => Some(format!("{} IS NULL OR {} IS NULL", left, right)),
            JoinKind::Inner | JoinKind::Left | JoinKind::Right | JoinKind::Full => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_clause() {
        let join = JoinSpec::new(JoinKind::Inner, ("users", "id"), ("orders", "user_id"));
        assert_eq!(join.on_clause(), "users.id = orders.user_id");
        assert_eq!(join.exclusion_predicate(), None);
    }

    #[test]
    fn test_exclusion_predicate_sides() {
        let mut join = JoinSpec::new(JoinKind::LeftNull, ("t1", "id"), ("t2", "t1_id"));
        assert_eq!(join.exclusion_predicate().unwrap(), "t2.t1_id IS NULL");

        join.join_type = JoinKind::RightNull;
        assert_eq!(join.exclusion_predicate().unwrap(), "t1.id IS NULL");

        join.join_type = JoinKind::FullNull;
        assert_eq!(
            join.exclusion_predicate().unwrap(),
            "t1.id IS NULL OR t2.t1_id IS NULL"
        );
    }

    #[test]
    fn test_deserialize_camel_case() {
        let join: JoinSpec = serde_json::from_str(
            r#"{"leftTable":"a","rightTable":"b","leftColumn":"id","rightColumn":"a_id","joinType":"LEFT"}"#,
        )
        .unwrap();
        assert_eq!(join.join_type, JoinKind::Left);
        assert_eq!(join.right_column, "a_id");
    }
}
