//! The query capability consumed by the gateway.
//!
//! Driver crates (relational-postgres, test fakes) implement [`Driver`]
//! and register a factory in a [`DriverRegistry`]. The core stays
//! transport-agnostic.

use std::collections::BTreeMap;
use std::fmt;

use crate::codec::InlineQuote;
use crate::config::ConnectionConfig;
use crate::error::{DriverError, Error, Result};

/// How `?` placeholders are rewritten before a query reaches the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// `$1`, `$2`, ... with bound parameters.
    Numbered,
    /// `?` left in place with bound parameters.
    QuestionMark,
    /// Parameters substituted into the SQL as quoted literals.
    Inline(InlineQuote),
}

/// Name and driver type name of a result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDesc {
    /// Column label.
    pub name: String,
    /// Driver type name, e.g. `int4`, `_text`, `bool`.
    pub type_name: String,
}

/// A fully fetched result: column descriptors plus text rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultSet {
    /// Result columns in select order.
    pub columns: Vec<ColumnDesc>,
    /// Rows as driver text, `None` for NULL.
    pub rows: Vec<Vec<Option<String>>>,
}

impl ResultSet {
    /// Creates an empty result with the given `(name, type)` columns.
    #[must_use]
    pub fn new(columns: &[(&str, &str)]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|(name, type_name)| ColumnDesc {
                    name: (*name).to_string(),
                    type_name: (*type_name).to_string(),
                })
                .collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    #[must_use]
    pub fn row<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.rows.push(values.into_iter().map(|v| v.map(Into::into)).collect());
        self
    }

    /// Column type names in select order.
    #[must_use]
    pub fn type_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.type_name.as_str()).collect()
    }
}

/// A live connection able to run one statement at a time.
pub trait Driver: Send {
    /// Placeholder syntax this driver expects.
    fn param_style(&self) -> ParamStyle;

    /// Executes `sql` (already rewritten for [`param_style`](Self::param_style))
    /// with text parameters, `None` meaning NULL, and fetches every row.
    ///
    /// # Errors
    ///
    /// Returns the driver's error text on failure.
    fn execute(&mut self, sql: &str, params: &[Option<String>]) -> std::result::Result<ResultSet, DriverError>;

    /// Id generated by the last insert on this connection.
    ///
    /// # Errors
    ///
    /// Returns the driver's error text on failure.
    fn last_insert_id(&mut self) -> std::result::Result<Option<String>, DriverError> {
        let result = self.execute("SELECT lastval()", &[])?;
        Ok(result.rows.into_iter().next().and_then(|row| row.into_iter().next().flatten()))
    }
}

type DriverFactory = Box<dyn Fn(&ConnectionConfig) -> Result<Box<dyn Driver>> + Send + Sync>;

/// Explicit mapping of driver names to connection factories.
#[derive(Default)]
pub struct DriverRegistry {
    factories: BTreeMap<String, DriverFactory>,
}

impl DriverRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a factory under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&ConnectionConfig) -> Result<Box<dyn Driver>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    /// Returns `true` if a driver is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Opens a connection with the driver named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDriver`] for unregistered names, and
    /// whatever the factory reports (usually [`Error::Connection`]).
    pub fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Driver>> {
        let factory = self
            .factories
            .get(&config.driver)
            .ok_or_else(|| Error::UnknownDriver(config.driver.clone()))?;
        factory(config)
    }
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
