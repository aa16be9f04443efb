//! The query gateway: placeholder binding, execution and row shaping.

use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::cache;
use crate::catalog::SchemaCatalog;
use crate::codec::{convert_row, encode_param, inline_literal};
use crate::config::ConnectionConfig;
use crate::driver::{Driver, DriverRegistry, ParamStyle, ResultSet};
use crate::error::{Error, Result};
use crate::profile::QueryLog;
use crate::schema::{ForeignKey, Schema, Table};
use crate::value::{Params, Value};

/// A row keyed by column label, in select order.
pub type AssocRow = IndexMap<String, Value>;

/// SQL rewritten for a driver, with its encoded parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundQuery {
    /// SQL in the driver's placeholder syntax.
    pub sql: String,
    /// Encoded parameters; empty for inline substitution.
    pub params: Vec<Option<String>>,
}

/// Rewrites `?` placeholders for `style` and encodes `params`.
///
/// The SQL is split on every `?`, including ones inside string literals
/// or comments. Callers must pass exactly one parameter per placeholder:
/// a mismatch is logged but not repaired, and leaves surplus
/// placeholders unbound.
#[must_use]
pub fn bind_placeholders(sql: &str, params: &[Value], style: ParamStyle) -> BoundQuery {
    let pieces: Vec<&str> = sql.split('?').collect();
    let placeholders = pieces.len() - 1;
    if placeholders != params.len() {
        warn!(
            sql = %sql,
            placeholders,
            params = params.len(),
            "Placeholder count does not match parameter count"
        );
    }

    let mut out = String::with_capacity(sql.len());
    for (i, piece) in pieces.iter().enumerate() {
        if i > 0 {
            match style {
                ParamStyle::Numbered => out.push_str(&format!("${i}")),
                ParamStyle::QuestionMark => out.push('?'),
                ParamStyle::Inline(quote) => match params.get(i - 1) {
                    Some(value) => out.push_str(&inline_literal(value, quote)),
                    None => out.push('?'),
                },
            }
        }
        out.push_str(piece);
    }

    let params = match style {
        ParamStyle::Inline(_) => Vec::new(),
        _ => params.iter().map(encode_param).collect(),
    };
    BoundQuery { sql: out, params }
}

/// A database handle: one live connection plus the reflected schema.
///
/// Queries run one at a time; the connection sits behind a mutex so a
/// handle can be shared (e.g. in an `Arc`) by generated object roots.
pub struct Database {
    driver: Mutex<Box<dyn Driver>>,
    query_log: Option<QueryLog>,
    schema_name: String,
    schema: Option<Schema>,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("schema_name", &self.schema_name)
            .field("query_log", &self.query_log)
            .field("schema_loaded", &self.schema.is_some())
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Wraps an open driver. The schema is not loaded.
    #[must_use]
    pub fn new(driver: Box<dyn Driver>) -> Self {
        Self {
            driver: Mutex::new(driver),
            query_log: None,
            schema_name: String::from("public"),
            schema: None,
        }
    }

    /// Opens a connection through `registry` and prepares the schema.
    ///
    /// With a schema cache configured, the cached graph is installed
    /// when present; otherwise the catalog is reflected and the cache
    /// written. Without a cache the schema is loaded lazily by
    /// [`load_schema`](Self::load_schema).
    ///
    /// # Errors
    ///
    /// Returns connection, reflection and cache errors.
    pub fn connect(config: &ConnectionConfig, registry: &DriverRegistry) -> Result<Self> {
        let driver = registry.connect(config)?;
        let mut db = Self::new(driver).with_schema_name(&config.schema);
        if let Some(path) = &config.query_log {
            db = db.with_query_log(QueryLog::new(path));
        }
        info!(driver = %config.driver, schema = %config.schema, "Connected");

        if let Some(path) = &config.schema_cache {
            match cache::load_schema(path)? {
                Some(schema) => {
                    debug!(path = %path.display(), "Using cached schema");
                    db.install_schema(schema);
                }
                None => {
                    db.load_schema()?;
                    cache::save_schema(path, db.schema()?)?;
                }
            }
        }
        Ok(db)
    }

    /// Sets the schema (namespace) reflected by [`load_schema`](Self::load_schema).
    #[must_use]
    pub fn with_schema_name(mut self, name: &str) -> Self {
        self.schema_name = name.to_string();
        self
    }

    /// Enables per-query profiling.
    #[must_use]
    pub fn with_query_log(mut self, log: QueryLog) -> Self {
        self.query_log = Some(log);
        self
    }

    /// The schema (namespace) name.
    #[must_use]
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    fn driver(&self) -> Result<MutexGuard<'_, Box<dyn Driver>>> {
        self.driver
            .lock()
            .map_err(|_| Error::Connection(String::from("connection lock poisoned")))
    }

    fn run(&self, sql: &str, params: &Params) -> Result<ResultSet> {
        let mut driver = self.driver()?;
        let bound = bind_placeholders(sql, params.as_slice(), driver.param_style());
        let start = Instant::now();
        let result = driver
            .execute(&bound.sql, &bound.params)
            .map_err(|e| Error::QueryExecution {
                sql: sql.to_string(),
                message: e.message,
            })?;
        let elapsed = start.elapsed();
        drop(driver);

        debug!(
            sql = %bound.sql,
            params = params.len(),
            rows = result.rows.len(),
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "Executed query"
        );
        if let Some(log) = &self.query_log
            && let Err(e) = log.record(elapsed, sql, params.as_slice())
        {
            warn!(path = %log.path().display(), error = %e, "Failed to write query log");
        }
        Ok(result)
    }

    /// Runs a statement, discarding any rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueryExecution`] on failure.
    pub fn exec(&self, sql: &str, params: impl Into<Params>) -> Result<()> {
        self.run(sql, &params.into()).map(|_| ())
    }

    /// Returns every row as positional text values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueryExecution`] on failure.
    pub fn query_array(&self, sql: &str, params: impl Into<Params>) -> Result<Vec<Vec<Value>>> {
        let result = self.run(sql, &params.into())?;
        Ok(result.rows.into_iter().map(untyped_row).collect())
    }

    /// Returns the first row, if any, as positional text values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueryExecution`] on failure.
    pub fn query_one_array(&self, sql: &str, params: impl Into<Params>) -> Result<Option<Vec<Value>>> {
        Ok(self.query_array(sql, params)?.into_iter().next())
    }

    /// Returns every row keyed by column label.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueryExecution`] on failure.
    pub fn query_assoc(&self, sql: &str, params: impl Into<Params>) -> Result<Vec<AssocRow>> {
        let result = self.run(sql, &params.into())?;
        let names = column_names(&result);
        Ok(result
            .rows
            .into_iter()
            .map(|row| names.iter().cloned().zip(untyped_row(row)).collect())
            .collect())
    }

    /// Returns the first row, if any, keyed by column label.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueryExecution`] on failure.
    pub fn query_one_assoc(&self, sql: &str, params: impl Into<Params>) -> Result<Option<AssocRow>> {
        Ok(self.query_assoc(sql, params)?.into_iter().next())
    }

    /// Like [`query_array`](Self::query_array), converting each field by
    /// its result column type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueryExecution`] on failure and conversion errors
    /// from the codec.
    pub fn query_array_typed(&self, sql: &str, params: impl Into<Params>) -> Result<Vec<Vec<Value>>> {
        let result = self.run(sql, &params.into())?;
        let types = result.type_names();
        result.rows.iter().map(|row| convert_row(row, &types)).collect()
    }

    /// Like [`query_assoc`](Self::query_assoc), converting each field by
    /// its result column type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueryExecution`] on failure and conversion errors
    /// from the codec.
    pub fn query_assoc_typed(&self, sql: &str, params: impl Into<Params>) -> Result<Vec<AssocRow>> {
        let result = self.run(sql, &params.into())?;
        let names = column_names(&result);
        let types = result.type_names();
        result
            .rows
            .iter()
            .map(|row| -> Result<AssocRow> {
                Ok(names.iter().cloned().zip(convert_row(row, &types)?).collect())
            })
            .collect()
    }

    /// Typed variant of [`query_one_assoc`](Self::query_one_assoc).
    ///
    /// # Errors
    ///
    /// See [`query_assoc_typed`](Self::query_assoc_typed).
    pub fn query_one_assoc_typed(&self, sql: &str, params: impl Into<Params>) -> Result<Option<AssocRow>> {
        Ok(self.query_assoc_typed(sql, params)?.into_iter().next())
    }

    /// First column of the first row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueryExecution`] on failure.
    pub fn query_one_value(&self, sql: &str, params: impl Into<Params>) -> Result<Option<Value>> {
        Ok(self
            .query_one_array(sql, params)?
            .and_then(|row| row.into_iter().next()))
    }

    /// One column of every row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueryExecution`] on failure.
    pub fn query_one_column(&self, sql: &str, params: impl Into<Params>, column: usize) -> Result<Vec<Value>> {
        Ok(self
            .query_array(sql, params)?
            .into_iter()
            .map(|row| row.into_iter().nth(column).unwrap_or_default())
            .collect())
    }

    /// Maps the text of column `key` to column `value` for every row.
    /// A NULL key maps to the empty string. Later rows win on duplicate
    /// keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueryExecution`] on failure.
    pub fn query_key_value(
        &self,
        sql: &str,
        params: impl Into<Params>,
        key: usize,
        value: usize,
    ) -> Result<IndexMap<String, Value>> {
        let mut out = IndexMap::new();
        for row in self.query_array(sql, params)? {
            let k = match row.get(key) {
                Some(Value::Null) | None => String::new(),
                Some(k) => k.to_string(),
            };
            let v = row.get(value).cloned().unwrap_or_default();
            out.insert(k, v);
        }
        Ok(out)
    }

    /// Starts a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueryExecution`] on failure.
    pub fn begin(&self) -> Result<()> {
        self.exec("BEGIN", ())
    }

    /// Commits the current transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueryExecution`] on failure.
    pub fn commit(&self) -> Result<()> {
        self.exec("COMMIT", ())
    }

    /// Rolls back the current transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueryExecution`] on failure.
    pub fn rollback(&self) -> Result<()> {
        self.exec("ROLLBACK", ())
    }

    /// Id generated by the last insert on this connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueryExecution`] on failure.
    pub fn last_insert_id(&self) -> Result<Option<String>> {
        self.driver()?
            .last_insert_id()
            .map_err(|e| Error::QueryExecution {
                sql: String::from("SELECT lastval()"),
                message: e.message,
            })
    }

    /// Reflects the catalog and installs the resulting graph, replacing
    /// any previous one. On failure the previous graph stays in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaReflection`] if any catalog query fails.
    pub fn load_schema(&mut self) -> Result<&Schema> {
        let schema = SchemaCatalog::new(&self.schema_name).reflect(self)?;
        self.install_schema(schema);
        self.schema()
    }

    /// Installs a previously built or cached schema graph.
    pub fn install_schema(&mut self, schema: Schema) {
        info!(
            schema = %self.schema_name,
            tables = schema.tables.len(),
            foreign_keys = schema.foreign_keys.len(),
            "Installed schema graph"
        );
        self.schema = Some(schema);
    }

    /// The loaded schema graph.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaNotLoaded`] before the first load.
    pub fn schema(&self) -> Result<&Schema> {
        self.schema.as_ref().ok_or(Error::SchemaNotLoaded)
    }

    /// All tables and views.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaNotLoaded`] before the first load.
    pub fn tables(&self) -> Result<&IndexMap<String, Table>> {
        Ok(&self.schema()?.tables)
    }

    /// One table or view.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaNotLoaded`] or [`Error::UnknownTable`].
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.schema()?.table(name)
    }

    /// Every foreign key by constraint name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaNotLoaded`] before the first load.
    pub fn foreign_keys(&self) -> Result<&IndexMap<String, ForeignKey>> {
        Ok(&self.schema()?.foreign_keys)
    }

    /// One foreign key by constraint name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaNotLoaded`] or [`Error::UnknownForeignKey`].
    pub fn foreign_key(&self, name: &str) -> Result<&ForeignKey> {
        self.schema()?.foreign_key(name)
    }
}

fn column_names(result: &ResultSet) -> Vec<String> {
    result.columns.iter().map(|c| c.name.clone()).collect()
}

fn untyped_row(row: Vec<Option<String>>) -> Vec<Value> {
    row.into_iter().map(|field| field.map_or(Value::Null, Value::Text)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::InlineQuote;

    #[test]
    fn numbered_placeholders() {
        let bound = bind_placeholders(
            "SELECT * FROM t WHERE a=? AND b=?",
            &[Value::Int(1), Value::Bool(false)],
            ParamStyle::Numbered,
        );
        assert_eq!(bound.sql, "SELECT * FROM t WHERE a=$1 AND b=$2");
        assert_eq!(bound.params, vec![Some("1".to_string()), Some("0".to_string())]);
    }

    #[test]
    fn question_marks_pass_through() {
        let bound = bind_placeholders("SELECT ?", &[Value::Null], ParamStyle::QuestionMark);
        assert_eq!(bound.sql, "SELECT ?");
        assert_eq!(bound.params, vec![None]);
    }

    #[test]
    fn inline_substitution() {
        let bound = bind_placeholders(
            "SELECT * FROM t WHERE name=? AND tags=? AND x IS ?",
            &[Value::from("O'Brien"), Value::from(vec![1, 2]), Value::Null],
            ParamStyle::Inline(InlineQuote::EscapeString),
        );
        assert_eq!(
            bound.sql,
            r"SELECT * FROM t WHERE name=E'O\'Brien' AND tags=E'{1,2}' AND x IS NULL"
        );
        assert!(bound.params.is_empty());
    }

    #[test]
    fn count_mismatch_leaves_placeholders() {
        let bound = bind_placeholders(
            "a=? AND b=?",
            &[Value::Int(1)],
            ParamStyle::Inline(InlineQuote::Backslash),
        );
        assert_eq!(bound.sql, "a='1' AND b=?");
    }
}
