//! # relational-codegen
//!
//! Generates a typed object model from a reflected schema: one entity
//! type per table or view, and a root type with lookups by key and
//! filtered lists.
//!
//! Each entity gets a getter per column, a getter per foreign key
//! returning the referenced row, and a list accessor per incoming
//! foreign key returning the referencing rows. Generated code runs on
//! [`relational_core::orm`].
//!
//! ## Example
//!
//! ```ignore
//! use relational_codegen::{generate_for_database, GeneratorConfig, TableHint};
//!
//! let config = GeneratorConfig::new("Shop")
//!     .hint("customers", TableHint::default().fk_constraint_names(true))
//!     .hint("audit_log", TableHint::default().skip());
//! let code = generate_for_database(&mut db, config)?;
//! code.write_to("src/shop.rs")?;
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod naming;
mod plan;
mod render;

pub use config::{GeneratorConfig, PseudoKey, TableHint};
pub use error::{CodegenError, Result, Warning};
pub use generator::{CodeGenerator, GeneratedCode, generate_for_database};
