use serde::{Deserialize, Serialize};
use std::fmt;

/// Target kind a mapped value is coerced to.
///
/// Unknown names deserialize to `String`, which is also the coercion
/// fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum MappingType {
    #[default]
    String,
    Number,
    Boolean,
    Date,
    Object,
    Array,
}

impl MappingType {
    pub const ALL: [MappingType; 6] = [
        MappingType::String,
        MappingType::Number,
        MappingType::Boolean,
        MappingType::Date,
        MappingType::Object,
        MappingType::Array,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MappingType::String => "string",
            MappingType::Number => "number",
            MappingType::Boolean => "boolean",
            MappingType::Date => "date",
            MappingType::Object => "object",
            MappingType::Array => "array",
        }
    }

    /// Guess a scalar kind from a column name.
    ///
    /// Checked in order: numeric hints, then temporal, then boolean. Never
    /// returns `Object` or `Array`.
    pub fn infer(column: &str) -> Self {
        let lower = column.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if has(&["id", "count", "amount", "price"]) {
            MappingType::Number
        } else if has(&["date", "time", "created", "updated", "modified"]) {
            MappingType::Date
        } else if has(&["is_", "has_", "active", "enabled", "deleted"]) {
            MappingType::Boolean
        } else {
            MappingType::String
        }
    }
}

impl From<String> for MappingType {
    fn from(name: String) -> Self {
        MappingType::from(name.as_str())
    }
}

impl From<&str> for MappingType {
    fn from(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "number" => MappingType::Number,
            "boolean" => MappingType::Boolean,
            "date" => MappingType::Date,
            "object" => MappingType::Object,
            "array" => MappingType::Array,
            _ => MappingType::String,
        }
    }
}

impl fmt::Display for MappingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moves one flat source field to one nested destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRule {
    /// `table.column` or bare `column`, as it appears in result rows.
    #[serde(alias = "sql_column")]
    pub sql_column: String,
    /// Dot-delimited destination, e.g. `user.contact.email`.
    #[serde(alias = "json_path")]
    pub json_path: String,
    #[serde(rename = "type", default)]
    pub kind: MappingType,
}

impl MappingRule {
    pub fn new(
        sql_column: impl Into<String>,
        json_path: impl Into<String>,
        kind: MappingType,
    ) -> Self {
        Self {
            sql_column: sql_column.into(),
            json_path: json_path.into(),
            kind,
        }
    }

    /// Default rule for a freshly added column: the destination is the
    /// column part of a qualified name, the type is inferred from it.
    pub fn for_column(column: &str) -> Self {
        let json_path = match column.split('.').nth(1) {
            Some(bare) => bare,
            None => column,
        };
        Self::new(column, json_path, MappingType::infer(json_path))
    }

    /// One default rule per projected column.
    pub fn defaults_for<S: AsRef<str>>(columns: &[S]) -> Vec<Self> {
        columns.iter().map(|c| Self::for_column(c.as_ref())).collect()
    }
}
