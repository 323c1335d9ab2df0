//! SQL compiler for query descriptions.
//!
//! Turns a [`QueryDescription`] into SELECT text. The output is one clause
//! per line:
//!
//! ```text
//! SELECT users.id, orders.total
//! FROM users
//! LEFT JOIN orders ON users.id = orders.user_id
//! WHERE orders.user_id IS NULL
//! ORDER BY users.id
//! LIMIT 10
//! ```
//!
//! Identifiers and the raw WHERE/ORDER BY fragments are trusted verbatim.
//! Nothing here validates or escapes them, and dialect differences (no
//! `FULL OUTER JOIN` on MySQL, `TOP` instead of `LIMIT` on SQL Server) are
//! left for the database to reject.

pub mod filter;
mod select;

#[cfg(test)]
mod tests;

use crate::ast::QueryDescription;
use crate::error::BuilderResult;

pub use self::filter::{Connector, OrderByRule, SortDirection, WhereCondition, WhereOperator};

/// Trait for converting query descriptions to SQL.
pub trait ToSql {
    /// Compile with the description's own limit.
    fn to_sql(&self) -> BuilderResult<String>;

    /// Compile with `limit` taking precedence over the description's own.
    fn to_sql_with_limit(&self, limit: Option<u32>) -> BuilderResult<String>;
}

impl ToSql for QueryDescription {
    fn to_sql(&self) -> BuilderResult<String> {
        compile(self, None)
    }

    fn to_sql_with_limit(&self, limit: Option<u32>) -> BuilderResult<String> {
        compile(self, limit)
    }
}

/// Compile a query description into a SELECT statement.
///
/// `override_limit`, when given, replaces `query.limit`. A limit of zero
/// emits no LIMIT clause. Fails only when `query.tables` is empty.
pub fn compile(query: &QueryDescription, override_limit: Option<u32>) -> BuilderResult<String> {
    select::build_select(query, override_limit)
}
