//! Append-only query profiling log.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::codec::encode_param;
use crate::error::Result;
use crate::value::Value;

/// Writes one line per executed query: elapsed time, SQL and parameters.
///
/// Every append takes an exclusive lock on the file, so lines from
/// separate processes never interleave.
#[derive(Debug, Clone)]
pub struct QueryLog {
    path: PathBuf,
}

impl QueryLog {
    /// Logs to `path`, creating it on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one profiling line.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be opened, locked or written.
    pub fn record(&self, elapsed: Duration, sql: &str, params: &[Value]) -> Result<()> {
        let line = format_line(elapsed, sql, params);
        let mut file: File = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.lock()?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        file.unlock()?;
        Ok(())
    }
}

fn format_line(elapsed: Duration, sql: &str, params: &[Value]) -> String {
    let ms = elapsed.as_secs_f64() * 1000.0;
    let params = params
        .iter()
        .map(|p| encode_param(p).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",");
    format!("{ms:8.2} ms: {sql}        ({params})\n")
}
