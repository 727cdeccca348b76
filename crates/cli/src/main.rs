//! `campus-cli` -- drive the rule and query engines from JSON files.
//!
//! Prints results as JSON on stdout; logs go to stderr.
//!
//! # Environment variables
//!
//! | Variable                  | Required | Default | Description                       |
//! |---------------------------|----------|---------|-----------------------------------|
//! | `QUERY_DEFAULT_PAGE_SIZE` | no       | `10`    | Page size when a query omits one  |
//! | `QUERY_MAX_PAGE_SIZE`     | no       | `100`   | Upper bound for requested sizes   |
//! | `RUST_LOG`                | no       | `campus_cli=info,campus_core=info` | Log filter |

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campus_core::config::QueryDefaults;
use campus_core::forms::RegistrationForm;
use campus_core::query::{self, QueryParams};
use campus_core::types::Record;

/// Exit code when a record fails validation.
const EXIT_INVALID: u8 = 2;

#[derive(Parser)]
#[command(name = "campus-cli")]
#[command(about = "Validate registration records and query JSON collections", long_about = None)]
#[command(version)]
struct Cli {
    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a registration record against a form schema.
    Validate {
        /// Form name: `college` or `university`.
        form: String,
        /// JSON object with the form values.
        record: PathBuf,
    },

    /// Run a query over a JSON array of records.
    Query {
        /// JSON array of records.
        collection: PathBuf,
        /// JSON query parameters (search, filters, sort, page).
        query: PathBuf,
    },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_cli=info,campus_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            let message = format!("{err:#}");
            tracing::error!(error = %message, "Command failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    match &cli.command {
        Command::Validate { form, record } => validate(form, record, cli.pretty),
        Command::Query { collection, query } => run_query(collection, query, cli.pretty),
    }
}

fn validate(form: &str, path: &Path, pretty: bool) -> Result<ExitCode> {
    let form: RegistrationForm = form.parse()?;
    let record: Record = read_json(path)?;

    let result = form
        .validate_submission(&record)
        .with_context(|| format!("Failed to build the {form} schema"))?;
    tracing::info!(
        form = %form,
        violations = result.len(),
        "Validated registration record"
    );

    print_json(&result, pretty)?;
    Ok(if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_INVALID)
    })
}

fn run_query(collection_path: &Path, query_path: &Path, pretty: bool) -> Result<ExitCode> {
    let defaults = QueryDefaults::from_env().context("Invalid query configuration")?;
    let collection: Vec<Record> = read_json(collection_path)?;
    let params: QueryParams = read_json(query_path)?;
    let spec = params
        .into_spec(&defaults)
        .with_context(|| format!("Invalid query in {}", query_path.display()))?;

    let result = query::run(&collection, &spec);
    tracing::info!(
        records = collection.len(),
        matched = result.total_matched,
        page = result.page,
        total_pages = result.total_pages,
        "Query complete"
    );

    print_json(&result, pretty)?;
    Ok(ExitCode::SUCCESS)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json: Value = serde_json::to_value(value)?;
    let rendered = if pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        json.to_string()
    };
    println!("{rendered}");
    Ok(())
}
