//! Connection configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Everything needed to open a [`Database`](crate::Database).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Registered driver name.
    #[serde(default = "default_driver")]
    pub driver: String,
    /// Driver-specific connection string.
    pub connection_string: String,
    /// Schema (namespace) to reflect.
    #[serde(default = "default_schema")]
    pub schema: String,
    /// Append a profiling line per query to this file.
    #[serde(default)]
    pub query_log: Option<PathBuf>,
    /// Load the schema graph from (and save it to) this file.
    #[serde(default)]
    pub schema_cache: Option<PathBuf>,
}

fn default_driver() -> String {
    String::from("postgres")
}

fn default_schema() -> String {
    String::from("public")
}

impl ConnectionConfig {
    /// Creates a config for the default driver and schema.
    #[must_use]
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            driver: default_driver(),
            connection_string: connection_string.into(),
            schema: default_schema(),
            query_log: None,
            schema_cache: None,
        }
    }

    /// Sets the driver name.
    #[must_use]
    pub fn driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = driver.into();
        self
    }

    /// Sets the schema to reflect.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Enables the query profiling log.
    #[must_use]
    pub fn query_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.query_log = Some(path.into());
        self
    }

    /// Enables the persisted schema cache.
    #[must_use]
    pub fn schema_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_cache = Some(path.into());
        self
    }

    /// Reads a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an IO or deserialization error.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
