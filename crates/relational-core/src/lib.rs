//! # relational-core
//!
//! Reflects a relational database schema (tables, views, columns,
//! primary and foreign keys) into an in-memory graph, and runs
//! parameterized queries with type-aware value encoding.
//!
//! ## Modules
//!
//! - [`codec`]: parameter encoding, SQL literals and the array literal grammar
//! - [`schema`]: the schema graph and foreign-key navigation
//! - [`catalog`]: reflection from `information_schema`
//! - [`gateway`]: the [`Database`] handle
//! - [`driver`]: the query capability drivers implement
//! - [`orm`]: runtime support for generated object models
//!
//! ## Example
//!
//! ```ignore
//! use relational_core::{ConnectionConfig, Database, DriverRegistry};
//!
//! let mut registry = DriverRegistry::new();
//! relational_postgres::register(&mut registry);
//!
//! let mut db = Database::connect(&ConnectionConfig::new("postgres://localhost/shop"), &registry)?;
//! db.load_schema()?;
//! let names = db.query_one_column("SELECT name FROM customers WHERE active=?", true, 0)?;
//! ```

pub mod cache;
pub mod catalog;
pub mod codec;
pub mod config;
pub mod driver;
pub mod error;
pub mod gateway;
pub mod orm;
pub mod profile;
pub mod schema;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod value;

pub use catalog::SchemaCatalog;
pub use config::ConnectionConfig;
pub use driver::{ColumnDesc, Driver, DriverRegistry, ParamStyle, ResultSet};
pub use error::{DriverError, Error, Result};
pub use gateway::{AssocRow, BoundQuery, Database, bind_placeholders};
pub use orm::{Entity, Filter, ObjectRoot};
pub use profile::QueryLog;
pub use schema::{Column, ForeignKey, PrimaryKey, Row, Schema, SchemaAssembler, Table, TableKind};
pub use value::{Params, Value};

pub use indexmap;
