//! relational CLI
//!
//! Prints the reflected schema, runs ad-hoc queries and generates
//! object models.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use relational_codegen::{GeneratorConfig, generate_for_database};
use relational_core::{ConnectionConfig, Database, DriverRegistry, Value};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Schema reflection and object-model generation for relational databases.
#[derive(Parser)]
#[command(name = "relational")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Connection string.
    #[arg(short, long, env = "DATABASE_URL")]
    database: Option<String>,

    /// JSON connection config; flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Registered driver name.
    #[arg(long)]
    driver: Option<String>,

    /// Schema to reflect.
    #[arg(short, long)]
    schema: Option<String>,

    /// Append a profiling line per query to this file.
    #[arg(long)]
    query_log: Option<PathBuf>,

    /// Load the schema graph from (and save it to) this file.
    #[arg(long)]
    schema_cache: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the reflected schema.
    Schema,

    /// Generate an object model.
    Generate {
        /// JSON generator config with per-table hints.
        #[arg(long)]
        hints: Option<PathBuf>,

        /// Type name prefix.
        #[arg(short, long)]
        prefix: Option<String>,

        /// Output file (stdout if not specified).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Name child accessors after foreign key columns.
        #[arg(long)]
        fk_constraint_names: bool,

        /// Fail on any warning.
        #[arg(long)]
        deny_warnings: bool,
    },

    /// Run a query and print the rows as JSON.
    Query {
        /// SQL with `?` placeholders.
        sql: String,

        /// Positional parameters.
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// Print rows as objects keyed by column name.
        #[arg(long)]
        assoc: bool,

        /// Convert values by column type.
        #[arg(long)]
        typed: bool,
    },
}

fn connection_config(cli: &Cli) -> anyhow::Result<ConnectionConfig> {
    let mut config = match &cli.config {
        Some(path) => ConnectionConfig::from_file(path)?,
        None => ConnectionConfig::new(
            cli.database
                .clone()
                .context("no connection string: pass --database, DATABASE_URL or --config")?,
        ),
    };
    if cli.config.is_some()
        && let Some(database) = &cli.database
    {
        config.connection_string.clone_from(database);
    }
    if let Some(driver) = &cli.driver {
        config.driver.clone_from(driver);
    }
    if let Some(schema) = &cli.schema {
        config.schema.clone_from(schema);
    }
    if let Some(path) = &cli.query_log {
        config.query_log = Some(path.clone());
    }
    if let Some(path) = &cli.schema_cache {
        config.schema_cache = Some(path.clone());
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut registry = DriverRegistry::new();
    relational_postgres::register(&mut registry);

    let config = connection_config(&cli)?;
    let mut db = Database::connect(&config, &registry)?;

    match cli.command {
        Commands::Schema => {
            if db.schema().is_err() {
                db.load_schema()?;
            }
            print!("{}", db.schema()?);
        }

        Commands::Generate {
            hints,
            prefix,
            out,
            fk_constraint_names,
            deny_warnings,
        } => {
            let mut config = match hints {
                Some(path) => GeneratorConfig::from_file(&path)?,
                None => GeneratorConfig::default(),
            };
            if let Some(prefix) = prefix {
                config.prefix = prefix;
            }
            config.use_fk_constraint_names |= fk_constraint_names;
            config.deny_warnings |= deny_warnings;

            let code = generate_for_database(&mut db, config)?;
            if !code.warnings.is_empty() {
                warn!(count = code.warnings.len(), "Generated with warnings");
            }
            match out {
                Some(path) => {
                    code.write_to(&path)?;
                    info!(path = %path.display(), "Model written");
                }
                None => print!("{}", code.source),
            }
        }

        Commands::Query {
            sql,
            params,
            assoc,
            typed,
        } => {
            let params: Vec<Value> = params.into_iter().map(Value::from).collect();
            let json = match (assoc, typed) {
                (true, true) => serde_json::to_string_pretty(&db.query_assoc_typed(&sql, params)?)?,
                (true, false) => serde_json::to_string_pretty(&db.query_assoc(&sql, params)?)?,
                (false, true) => serde_json::to_string_pretty(&db.query_array_typed(&sql, params)?)?,
                (false, false) => serde_json::to_string_pretty(&db.query_array(&sql, params)?)?,
            };
            println!("{json}");
        }
    }

    Ok(())
}
