//! Error and warning types for code generation.

use std::path::PathBuf;

/// A condition that does not stop generation but usually means the
/// schema or the hints need attention.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Warning {
    /// Several foreign keys from one table to another would get the same
    /// classic child-list accessor. Those accessors fall back to the
    /// by-constraint-name style.
    #[error(
        "ambiguous accessor {accessor} on {table}: {referencing_table} references it through {}; \
         enable use_fk_constraint_names for {table}",
        .constraints.join(", ")
    )]
    AmbiguousReverseAccessor {
        /// Referenced table, which owns the accessor.
        table: String,
        /// Table holding the foreign keys.
        referencing_table: String,
        /// The colliding accessor name.
        accessor: String,
        /// Constraint names involved.
        constraints: Vec<String>,
    },

    /// A derived name is already taken in its scope; the later item is
    /// not generated.
    #[error("duplicate name {name} in {scope} (from {source_name}); skipped")]
    DuplicateName {
        /// Type (or `types` / root type) the name lives in.
        scope: String,
        /// The colliding name.
        name: String,
        /// Table, column or constraint the skipped item came from.
        source_name: String,
    },

    /// A table has no primary key, so no lookup by key is generated.
    #[error("table {table} has no primary key; no lookup by key generated")]
    MissingPrimaryKey {
        /// Table name.
        table: String,
    },

    /// A hint names a table that does not exist.
    #[error("hints refer to unknown table {table}")]
    UnknownHintTable {
        /// Hinted table name.
        table: String,
    },

    /// A pseudo key names a column the view does not have.
    #[error("pseudo key of {table} refers to unknown column {column}")]
    UnknownKeyColumn {
        /// View name.
        table: String,
        /// Column name.
        column: String,
    },
}

/// Errors that stop code generation.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// Schema access failed.
    #[error(transparent)]
    Core(#[from] relational_core::Error),

    /// Warnings were raised while `deny_warnings` is set.
    #[error("Generation rejected with {} warning(s):\n{}", .0.len(), .0.iter().map(|w| format!("  - {w}")).collect::<Vec<_>>().join("\n"))]
    Rejected(Vec<Warning>),

    /// The hint file could not be parsed.
    #[error("Invalid generator config '{path}': {message}")]
    Config {
        /// Path of the config file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// IO error (reading hints, writing output).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for code generation.
pub type Result<T> = std::result::Result<T, CodegenError>;
