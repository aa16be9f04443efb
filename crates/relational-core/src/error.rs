//! Error types for schema reflection and query execution.

/// Errors surfaced by the gateway, the schema graph and the codec.
///
/// Nothing here is retried internally: every variant reaches the
/// immediate caller with enough context to diagnose the failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The driver could not establish (or lost) its connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// No driver factory is registered under this name.
    #[error("Unknown driver: {0}")]
    UnknownDriver(String),

    /// A query failed inside the driver.
    #[error("Query failed: {message}\nSQL: {sql}")]
    QueryExecution {
        /// The SQL as given by the caller, before placeholder substitution.
        sql: String,
        /// Driver error text.
        message: String,
    },

    /// A catalog query failed while loading the schema graph.
    #[error("Schema reflection failed: {message}\nSQL: {sql}")]
    SchemaReflection {
        /// The failing catalog query.
        sql: String,
        /// Driver error text.
        message: String,
    },

    /// A schema lookup was attempted before `load_schema`.
    #[error("Schema not loaded")]
    SchemaNotLoaded,

    /// Unknown table name.
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Unknown foreign key constraint.
    #[error("Unknown foreign key: {name}{}", .table.as_ref().map(|t| format!(" in table {t}")).unwrap_or_default())]
    UnknownForeignKey {
        /// Constraint name.
        name: String,
        /// Table the lookup was scoped to, if any.
        table: Option<String>,
    },

    /// Unknown column within a table or row.
    #[error("Unknown column: {column} in table {table}")]
    UnknownColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// A lookup expected at most one row but got more.
    #[error("Multiple rows returned when one was expected: {sql}")]
    MultipleRows {
        /// The query (or navigation path) that matched too many rows.
        sql: String,
    },

    /// Filter predicate with an operator outside the supported set.
    #[error("Unknown filter operator: {0}")]
    UnknownFilterOperator(String),

    /// Array literal text that does not follow the brace grammar.
    #[error("Malformed array literal at offset {offset}: {reason}")]
    MalformedLiteral {
        /// Byte offset where parsing stopped.
        offset: usize,
        /// What was expected.
        reason: String,
    },

    /// A scalar could not be converted to its declared type.
    #[error("Invalid {ty} value: {text:?}")]
    InvalidValue {
        /// Declared type name.
        ty: String,
        /// The raw text.
        text: String,
    },

    /// IO error (query log, schema cache).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure reported by a [`Driver`](crate::driver::Driver).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DriverError {
    /// Driver-specific error text.
    pub message: String,
}

impl DriverError {
    /// Creates a driver error from any message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type alias for relational operations.
pub type Result<T> = std::result::Result<T, Error>;
