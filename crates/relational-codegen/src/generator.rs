//! The generator entry points.

use std::fs;
use std::path::Path;

use relational_core::{Database, Schema};
use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::error::{CodegenError, Result, Warning};
use crate::plan::plan;
use crate::render::render;

/// Generates an object model for a reflected schema.
///
/// # Example
///
/// ```ignore
/// use relational_codegen::{CodeGenerator, GeneratorConfig};
///
/// let config = GeneratorConfig::new("Shop").use_fk_constraint_names(true);
/// let code = CodeGenerator::new(db.schema()?, config).generate()?;
/// code.write_to("src/model.rs")?;
/// ```
#[derive(Debug)]
pub struct CodeGenerator<'a> {
    schema: &'a Schema,
    config: GeneratorConfig,
}

impl<'a> CodeGenerator<'a> {
    /// Creates a generator over `schema`.
    #[must_use]
    pub const fn new(schema: &'a Schema, config: GeneratorConfig) -> Self {
        Self { schema, config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Reports the warnings generation would raise, without rendering.
    #[must_use]
    pub fn validate(&self) -> Vec<Warning> {
        plan(self.schema, &self.config).warnings
    }

    /// Renders the model source.
    ///
    /// Every warning is logged. With `deny_warnings` set, any warning
    /// rejects the run and no source is returned.
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::Rejected`] when warnings are denied.
    pub fn generate(&self) -> Result<GeneratedCode> {
        let plan = plan(self.schema, &self.config);
        for warning in &plan.warnings {
            warn!(%warning, "Code generation warning");
        }
        if self.config.deny_warnings && !plan.warnings.is_empty() {
            return Err(CodegenError::Rejected(plan.warnings));
        }

        let source = render(&plan, self.schema, &self.config);
        info!(
            entities = plan.entities.len(),
            warnings = plan.warnings.len(),
            bytes = source.len(),
            "Generated object model"
        );
        Ok(GeneratedCode {
            source,
            warnings: plan.warnings,
        })
    }
}

/// Output of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    /// Rust source of the model.
    pub source: String,
    /// Warnings raised while generating.
    pub warnings: Vec<Warning>,
}

impl GeneratedCode {
    /// Writes the source to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::Io`] if the file cannot be written.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, &self.source)?;
        debug!(path = %path.display(), "Wrote generated model");
        Ok(())
    }
}

/// Generates a model for the database's schema, reflecting it first if
/// it has not been loaded.
///
/// # Errors
///
/// Returns reflection errors and [`CodegenError::Rejected`].
pub fn generate_for_database(db: &mut Database, config: GeneratorConfig) -> Result<GeneratedCode> {
    if db.schema().is_err() {
        db.load_schema()?;
    }
    CodeGenerator::new(db.schema()?, config).generate()
}
