//! Database dialect tags.
//!
//! The compiler emits the same text for every dialect; the tag only steers
//! connection URLs and query-plan validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported databases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    #[serde(alias = "postgres")]
    Postgresql,
    Mysql,
    #[serde(alias = "sqlserver")]
    Mssql,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::Postgresql, Dialect::Mysql, Dialect::Mssql];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Postgresql => "postgresql",
            Dialect::Mysql => "mysql",
            Dialect::Mssql => "mssql",
        }
    }

    pub fn url_scheme(&self) -> &'static str {
        match self {
            Dialect::Postgresql => "postgres",
            Dialect::Mysql => "mysql",
            Dialect::Mssql => "mssql",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Dialect::Postgresql => 5432,
            Dialect::Mysql => 3306,
            Dialect::Mssql => 1433,
        }
    }

    /// Detect the dialect from a connection URL scheme.
    pub fn from_url(url: &str) -> Option<Self> {
        let scheme = url.split_once("://").map(|(s, _)| s)?;
        scheme.parse().ok()
    }

    /// Statement that asks the server for a plan without running `sql`.
    pub fn explain(&self, sql: &str) -> String {
        match self {
            Dialect::Postgresql | Dialect::Mysql => format!("EXPLAIN {}", sql),
            Dialect::Mssql => format!("SET SHOWPLAN_TEXT ON;\n{}\nSET SHOWPLAN_TEXT OFF;", sql),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(Dialect::Postgresql),
            "mysql" | "mariadb" => Ok(Dialect::Mysql),
            "mssql" | "sqlserver" => Ok(Dialect::Mssql),
            other => Err(format!(
                "unknown dialect '{}'. Expected: postgresql, mysql, or mssql",
                other
            )),
        }
    }
}
