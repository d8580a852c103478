mod output;

use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use schema_registry::{DeclarationSet, Registry, RegistryConfig, save_snapshot, seal_snapshot};
use schema_registry_core::{DedupeStrategy, ModelMetadata, SchemaSnapshot, validate_snapshot};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::output::{EnumRow, OutputFormat, format_enums, format_models};

/// CLI-specific dedupe strategy with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliDedupe {
    KeepFirst,
    KeepLast,
}

impl From<CliDedupe> for DedupeStrategy {
    fn from(strategy: CliDedupe) -> Self {
        match strategy {
            CliDedupe::KeepFirst => Self::KeepFirst,
            CliDedupe::KeepLast => Self::KeepLast,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "schema-registry")]
#[command(about = "Inspect and snapshot model metadata declarations")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Path to a registry config YAML file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override FILTER_BY_DEFAULT ("false" disables filter/sort defaults).
    #[arg(long, global = true)]
    filter_by_default: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show registered models with their columns and relations.
    Inspect(InspectArgs),
    /// List the unique columns of a model.
    Uniques(UniquesArgs),
    /// List registered enums.
    Enums(EnumsArgs),
    /// Report duplicate columns, dangling relations and incomplete enums.
    Check(CheckArgs),
    /// Write a hashed JSON snapshot of the registry.
    Snapshot(SnapshotArgs),
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Declaration files and/or directories.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Only show this model.
    #[arg(long)]
    model: Option<String>,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct UniquesArgs {
    /// Declaration files and/or directories.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Model to query.
    #[arg(long)]
    model: String,
}

#[derive(Debug, Args)]
struct EnumsArgs {
    /// Declaration files and/or directories.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Only show enums of this model.
    #[arg(long)]
    model: Option<String>,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Declaration files and/or directories.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Exit with an error when any finding is reported.
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Args)]
struct SnapshotArgs {
    /// Declaration files and/or directories.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Output JSON snapshot path.
    #[arg(long)]
    output: PathBuf,
    /// Collapse repeated column names before writing.
    #[arg(long)]
    dedupe: Option<CliDedupe>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Inspect(args) => run_inspect(&cli.global, args),
        Command::Uniques(args) => run_uniques(&cli.global, args),
        Command::Enums(args) => run_enums(&cli.global, args),
        Command::Check(args) => run_check(&cli.global, args),
        Command::Snapshot(args) => run_snapshot(&cli.global, args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// `--filter-by-default` wins over `--config`, which wins over the environment.
fn resolve_config(global: &GlobalArgs) -> Result<RegistryConfig, String> {
    if let Some(value) = global.filter_by_default.as_deref() {
        return Ok(RegistryConfig::from_flag(Some(value)));
    }
    if let Some(path) = &global.config {
        return RegistryConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()));
    }
    Ok(RegistryConfig::from_env())
}

fn load_registry(global: &GlobalArgs, inputs: &[PathBuf]) -> Result<Registry, String> {
    let set = DeclarationSet::from_paths(inputs).map_err(|e| e.to_string())?;
    let mut registry = Registry::new(resolve_config(global)?);
    set.register_into(&mut registry).map_err(|e| e.to_string())?;
    info!(
        files = set.len(),
        models = registry.len(),
        "registered declarations"
    );
    Ok(registry)
}

fn take_snapshot(global: &GlobalArgs, inputs: &[PathBuf]) -> Result<SchemaSnapshot, String> {
    let registry = load_registry(global, inputs)?;
    Ok(registry.snapshot(chrono::Utc::now().to_rfc3339()))
}

fn require_model<'s>(snapshot: &'s SchemaSnapshot, name: &str) -> Result<&'s ModelMetadata, String> {
    snapshot
        .get_model(name)
        .ok_or_else(|| format!("Unknown model '{name}'"))
}

fn run_inspect(global: &GlobalArgs, args: InspectArgs) -> Result<(), String> {
    let snapshot = take_snapshot(global, &args.inputs)?;

    let models: Vec<&ModelMetadata> = match args.model.as_deref() {
        Some(name) => vec![require_model(&snapshot, name)?],
        None => snapshot.models.values().collect(),
    };

    print!("{}", with_newline(format_models(&models, args.format)?));
    Ok(())
}

fn run_uniques(global: &GlobalArgs, args: UniquesArgs) -> Result<(), String> {
    let snapshot = take_snapshot(global, &args.inputs)?;
    let model = require_model(&snapshot, &args.model)?;

    for name in model.unique_columns() {
        println!("{name}");
    }
    Ok(())
}

fn run_enums(global: &GlobalArgs, args: EnumsArgs) -> Result<(), String> {
    let snapshot = take_snapshot(global, &args.inputs)?;
    if let Some(name) = args.model.as_deref() {
        require_model(&snapshot, name)?;
    }

    let rows: Vec<EnumRow<'_>> = snapshot
        .enums_iter()
        .filter(|(model, _, _)| args.model.as_deref().is_none_or(|m| m == *model))
        .map(|(model, column, metadata)| EnumRow {
            model,
            column,
            metadata,
        })
        .collect();

    print!("{}", with_newline(format_enums(&rows, args.format)?));
    Ok(())
}

fn run_check(global: &GlobalArgs, args: CheckArgs) -> Result<(), String> {
    let snapshot = take_snapshot(global, &args.inputs)?;
    let findings = validate_snapshot(&snapshot);

    for finding in &findings {
        println!("warning: {finding}");
    }
    println!(
        "Checked {} model(s): {} finding(s).",
        snapshot.model_count(),
        findings.len()
    );

    if args.strict && !findings.is_empty() {
        return Err(format!(
            "{} finding(s) reported in strict mode",
            findings.len()
        ));
    }
    Ok(())
}

fn run_snapshot(global: &GlobalArgs, args: SnapshotArgs) -> Result<(), String> {
    let mut snapshot = take_snapshot(global, &args.inputs)?;
    if let Some(strategy) = args.dedupe {
        snapshot = snapshot.deduplicated(strategy.into());
    }
    let snapshot = seal_snapshot(snapshot).map_err(|e| e.to_string())?;

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }

    save_snapshot(&snapshot, &args.output)
        .map_err(|err| format!("Failed to write '{}': {err}", args.output.display()))?;

    println!(
        "Wrote snapshot of {} model(s) to '{}'.",
        snapshot.model_count(),
        args.output.display()
    );
    Ok(())
}

fn with_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
