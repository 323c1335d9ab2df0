//! Error types for sql2api.

use thiserror::Error;

/// The main error type for query compilation and execution.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// Compilation attempted with no tables selected.
    #[error("No tables selected: a query needs at least one table for its FROM clause")]
    EmptyTableList,

    /// Invalid or incomplete project configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Dialect tag unknown, or known but without a driver.
    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(String),

    /// Could not open a connection to the database.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The database rejected the query. Carries the driver message untouched.
    #[error("Query execution failed: {0}")]
    Execution(String),

    /// Malformed JSON input (rows, query descriptions).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed TOML project file.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuilderError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type alias for sql2api operations.
pub type BuilderResult<T> = Result<T, BuilderError>;
