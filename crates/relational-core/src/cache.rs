//! Persisted schema cache.
//!
//! Only the schema graph is stored; the connection is never part of the
//! cache. The format is the graph's JSON form with no versioning, so a
//! change to the model invalidates stored caches.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use tracing::warn;

use crate::error::Result;
use crate::schema::Schema;

/// Writes the schema graph under an exclusive lock.
///
/// # Errors
///
/// Returns an IO or serialization error.
pub fn save_schema(path: &Path, schema: &Schema) -> Result<()> {
    let json = serde_json::to_vec(schema)?;
    let mut file: File = OpenOptions::new().create(true).write(true).truncate(false).open(path)?;
    file.lock()?;
    file.set_len(0)?;
    file.write_all(&json)?;
    file.flush()?;
    file.unlock()?;
    Ok(())
}

/// Reads a cached schema graph.
///
/// A missing file yields `Ok(None)`. So does an undecodable one, with a
/// warning, so the caller falls back to reflection.
///
/// # Errors
///
/// Returns any other IO error.
pub fn load_schema(path: &Path) -> Result<Option<Schema>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    file.lock_shared()?;
    let mut text = String::new();
    file.read_to_string(&mut text)?;
    file.unlock()?;
    match serde_json::from_str(&text) {
        Ok(schema) => Ok(Some(schema)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable schema cache");
            Ok(None)
        }
    }
}
