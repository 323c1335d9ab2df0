//! # sql2api
//!
//! Build a SELECT statement from a structured description, then reshape the
//! flat rows it returns into nested JSON.
//!
//! ## Quick Example
//!
//! ```rust
//! use sql2api::prelude::*;
//!
//! let query = QueryDescription::from_table("users")
//!     .columns(["users.id", "users.email"])
//!     .join(JoinSpec::new(JoinKind::LeftNull, ("users", "id"), ("orders", "user_id")))
//!     .limit(10);
//!
//! let sql = query.to_sql().unwrap();
//! assert_eq!(
//!     sql,
//!     "SELECT users.id, users.email\nFROM users\nLEFT JOIN orders ON users.id = orders.user_id\nWHERE orders.user_id IS NULL\nLIMIT 10"
//! );
//!
//! let rows: Vec<Row> = serde_json::from_str(r#"[{"id": 1, "email": "a@b.com"}]"#).unwrap();
//! let rules = vec![
//!     MappingRule::new("users.id", "user.id", MappingType::Number),
//!     MappingRule::new("users.email", "user.contact.email", MappingType::String),
//! ];
//! let mapped = map_rows(&rows, &rules);
//! assert_eq!(mapped[0]["user"]["contact"]["email"], "a@b.com");
//! ```
//!
//! ## Join kinds
//!
//! | Kind         | SQL                                   | Set      |
//! |--------------|---------------------------------------|----------|
//! | `INNER`      | `INNER JOIN`                          | A ∩ B    |
//! | `LEFT`       | `LEFT JOIN`                           | A        |
//! | `RIGHT`      | `RIGHT JOIN`                          | B        |
//! | `FULL`       | `FULL OUTER JOIN`                     | A ∪ B    |
//! | `LEFT_NULL`  | `LEFT JOIN … WHERE right IS NULL`     | A − B    |
//! | `RIGHT_NULL` | `RIGHT JOIN … WHERE left IS NULL`     | B − A    |
//! | `FULL_NULL`  | `FULL OUTER JOIN … WHERE … OR …`      | A △ B    |

pub mod ast;
pub mod config;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod mapper;
pub mod transpiler;
pub mod validator;

pub use mapper::map_rows;
pub use transpiler::compile;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::{ConnectionConfig, ProjectConfig};
    pub use crate::dialect::Dialect;
    pub use crate::error::*;
    pub use crate::mapper::{JsonObject, map_row, map_rows};
    pub use crate::transpiler::{ToSql, compile};
    pub use crate::validator::{ValidationReport, validate_sql};
}
