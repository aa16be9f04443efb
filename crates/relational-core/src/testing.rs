//! Scripted in-memory driver for tests.

use std::sync::{Arc, Mutex, PoisonError};

use crate::driver::{Driver, ParamStyle, ResultSet};
use crate::error::DriverError;

/// One query as the driver received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedQuery {
    /// Rewritten SQL.
    pub sql: String,
    /// Encoded parameters.
    pub params: Vec<Option<String>>,
}

impl ExecutedQuery {
    /// Parameters as plain strings, NULL rendered as `NULL`.
    #[must_use]
    pub fn param_texts(&self) -> Vec<String> {
        self.params
            .iter()
            .map(|p| p.clone().unwrap_or_else(|| String::from("NULL")))
            .collect()
    }
}

enum Reply {
    Rows(ResultSet),
    Fail(String),
}

/// Answers queries with canned results.
///
/// Each script entry matches when its needle occurs in the SQL; the
/// first match wins. Unmatched queries return an empty result. Every
/// query is recorded in a log shared with clones of [`log`](Self::log).
pub struct ScriptedDriver {
    style: ParamStyle,
    script: Vec<(String, Reply)>,
    log: Arc<Mutex<Vec<ExecutedQuery>>>,
}

impl ScriptedDriver {
    /// Creates a driver using `$n` placeholders.
    #[must_use]
    pub fn new() -> Self {
        Self::with_style(ParamStyle::Numbered)
    }

    /// Creates a driver using the given placeholder style.
    #[must_use]
    pub fn with_style(style: ParamStyle) -> Self {
        Self {
            style,
            script: Vec::new(),
            log: Arc::default(),
        }
    }

    /// Answers queries containing `needle` with `result`.
    #[must_use]
    pub fn on(mut self, needle: impl Into<String>, result: ResultSet) -> Self {
        self.script.push((needle.into(), Reply::Rows(result)));
        self
    }

    /// Fails queries containing `needle` with `message`.
    #[must_use]
    pub fn fail(mut self, needle: impl Into<String>, message: impl Into<String>) -> Self {
        self.script.push((needle.into(), Reply::Fail(message.into())));
        self
    }

    /// Shared log of executed queries.
    #[must_use]
    pub fn log(&self) -> Arc<Mutex<Vec<ExecutedQuery>>> {
        Arc::clone(&self.log)
    }
}

impl Default for ScriptedDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for ScriptedDriver {
    fn param_style(&self) -> ParamStyle {
        self.style
    }

    fn execute(&mut self, sql: &str, params: &[Option<String>]) -> Result<ResultSet, DriverError> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ExecutedQuery {
                sql: sql.to_string(),
                params: params.to_vec(),
            });
        match self.script.iter().find(|(needle, _)| sql.contains(needle.as_str())) {
            Some((_, Reply::Rows(result))) => Ok(result.clone()),
            Some((_, Reply::Fail(message))) => Err(DriverError::new(message.clone())),
            None => Ok(ResultSet::default()),
        }
    }
}
