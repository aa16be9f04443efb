//! Generator configuration and per-table hints.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{CodegenError, Result};

/// Options for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Prefix of every generated type name; the root type is `{prefix}Root`.
    pub prefix: String,
    /// Use by-constraint-name child accessors for every table.
    pub use_fk_constraint_names: bool,
    /// Fail instead of generating when any warning is raised.
    pub deny_warnings: bool,
    /// Path of the runtime crate in generated `use` lines.
    pub runtime_crate: String,
    /// Per-table hints by table name.
    pub tables: IndexMap<String, TableHint>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            prefix: String::from("Rm"),
            use_fk_constraint_names: false,
            deny_warnings: false,
            runtime_crate: String::from("relational_core"),
            tables: IndexMap::new(),
        }
    }
}

impl GeneratorConfig {
    /// Creates a config with the given type prefix.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Sets the hint for one table.
    #[must_use]
    pub fn hint(mut self, table: impl Into<String>, hint: TableHint) -> Self {
        self.tables.insert(table.into(), hint);
        self
    }

    /// Sets the global child accessor style.
    #[must_use]
    pub const fn use_fk_constraint_names(mut self, enabled: bool) -> Self {
        self.use_fk_constraint_names = enabled;
        self
    }

    /// Turns warnings into errors.
    #[must_use]
    pub const fn deny_warnings(mut self, enabled: bool) -> Self {
        self.deny_warnings = enabled;
        self
    }

    /// Reads a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::Io`] or [`CodegenError::Config`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| CodegenError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The hint for `table`, or the default hint.
    #[must_use]
    pub fn table_hint(&self, table: &str) -> TableHint {
        self.tables.get(table).cloned().unwrap_or_default()
    }
}

/// Hints for one table or view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableHint {
    /// Generate nothing for this table.
    pub skip_impl: bool,
    /// Type path used wherever this table's entity type is referenced.
    pub impl_class: Option<String>,
    /// Default ordering for list queries.
    pub order_by: Option<String>,
    /// Child accessor style for this (referenced) table; overrides the
    /// global setting.
    pub use_fk_constraint_names: Option<bool>,
    /// SQL condition ANDed into every list query.
    pub lists_filter: Option<String>,
    /// Key used for lookups on a view.
    pub pseudo_view_pk: Option<PseudoKey>,
}

impl TableHint {
    /// Sets `skip_impl`.
    #[must_use]
    pub const fn skip(mut self) -> Self {
        self.skip_impl = true;
        self
    }

    /// Sets `impl_class`.
    #[must_use]
    pub fn impl_class(mut self, path: impl Into<String>) -> Self {
        self.impl_class = Some(path.into());
        self
    }

    /// Sets `order_by`.
    #[must_use]
    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// Sets `use_fk_constraint_names`.
    #[must_use]
    pub const fn fk_constraint_names(mut self, enabled: bool) -> Self {
        self.use_fk_constraint_names = Some(enabled);
        self
    }

    /// Sets `lists_filter`.
    #[must_use]
    pub fn lists_filter(mut self, condition: impl Into<String>) -> Self {
        self.lists_filter = Some(condition.into());
        self
    }

    /// Sets `pseudo_view_pk`.
    #[must_use]
    pub fn pseudo_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        self.pseudo_view_pk = Some(if columns.len() == 1 {
            PseudoKey::One(columns.remove(0))
        } else {
            PseudoKey::Many(columns)
        });
        self
    }
}

/// A view's pseudo key: one column name or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PseudoKey {
    /// Single column.
    One(String),
    /// Several columns, in argument order.
    Many(Vec<String>),
}

impl PseudoKey {
    /// Key columns in order.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::One(column) => vec![column.as_str()],
            Self::Many(columns) => columns.iter().map(String::as_str).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_file_shape() {
        let config: GeneratorConfig = serde_json::from_str(
            r#"{
                "prefix": "Shop",
                "tables": {
                    "customers": { "use_fk_constraint_names": true, "order_by": "name" },
                    "customer_list": { "pseudo_view_pk": "id" },
                    "order_lines": { "pseudo_view_pk": ["order_id", "line_no"], "skip_impl": true }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.prefix, "Shop");
        assert_eq!(config.runtime_crate, "relational_core");
        assert_eq!(config.table_hint("customers").use_fk_constraint_names, Some(true));
        assert_eq!(
            config.table_hint("customer_list").pseudo_view_pk.unwrap().columns(),
            vec!["id"]
        );
        let lines = config.table_hint("order_lines");
        assert!(lines.skip_impl);
        assert_eq!(lines.pseudo_view_pk.unwrap().columns(), vec!["order_id", "line_no"]);
        assert_eq!(config.table_hint("missing"), TableHint::default());
    }

    #[test]
    fn builder_matches_file() {
        let built = GeneratorConfig::new("Shop").hint(
            "customers",
            TableHint::default().fk_constraint_names(true).order_by("name"),
        );
        assert_eq!(built.table_hint("customers").order_by.as_deref(), Some("name"));
        assert!(!built.use_fk_constraint_names);
    }
}
