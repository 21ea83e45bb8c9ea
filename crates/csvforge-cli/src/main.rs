mod logging;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use csvforge_core::{Error as CoreError, Schema, load_schema, resolve_order, save_schema, validate_schema};
use csvforge_generate::{CsvSerializer, GenerateOptions, GenerationEngine, GenerationError, GenerationReport};
use logging::{LogFormat, init_logging};
use thiserror::Error;

const DEFAULT_SCHEMA_PATH: &str = "./schemas/schema.yaml";
const DEFAULT_EXAMPLE_PATH: &str = "./schemas/schema.example.yaml";
const DEFAULT_OUTPUT_DIR: &str = "./output";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("schema error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "csvforge", version, about = "Generate synthetic CSV data from a YAML schema")]
struct Cli {
    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a CSV file from a schema.
    Generate(GenerateArgs),
    /// Create, check and describe schema files.
    #[command(subcommand)]
    Schema(SchemaCommand),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Schema file to generate from.
    #[arg(short, long, default_value = DEFAULT_SCHEMA_PATH)]
    schema: PathBuf,
    /// Output file; defaults to ./output/<schema name>.csv.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
    /// Write the generation report as JSON to this path.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum SchemaCommand {
    /// Write the example schema.
    New {
        #[arg(short, long, default_value = DEFAULT_EXAMPLE_PATH)]
        output: PathBuf,
    },
    /// Validate a schema and print its resolved header.
    Validate {
        #[arg(short, long, default_value = DEFAULT_SCHEMA_PATH)]
        schema: PathBuf,
    },
    /// Print the JSON Schema of schema files.
    JsonSchema,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Schema(SchemaCommand::New { output }) => run_schema_new(&output),
        Command::Schema(SchemaCommand::Validate { schema }) => run_schema_validate(&schema),
        Command::Schema(SchemaCommand::JsonSchema) => run_json_schema(),
    };

    if let Err(err) = &result {
        tracing::error!(event = "run_failed", error = %err);
    }
    result
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        schema: schema_path,
        output,
        seed,
        report,
    } = args;

    let output = match output {
        Some(path) => path,
        None => default_output_path(&schema_path)?,
    };

    tracing::info!(
        event = "run_started",
        schema = %schema_path.display(),
        output = %output.display()
    );
    let timer = Instant::now();

    let mut schema = load_schema(&schema_path)?;
    let options = GenerateOptions {
        seed,
        ..GenerateOptions::default()
    };
    let engine = GenerationEngine::new(options);
    let generation = engine.run_to_path(&mut schema, &output)?;

    if let Some(path) = report {
        write_report(&path, &generation)?;
        tracing::info!(event = "report_written", path = %path.display());
    }

    tracing::info!(
        event = "run_finished",
        status = "success",
        rows = generation.rows_written,
        seed = generation.seed,
        duration_ms = timer.elapsed().as_millis() as u64
    );
    Ok(())
}

fn run_schema_new(output: &Path) -> Result<(), CliError> {
    save_schema(output, &Schema::example())?;
    tracing::info!(event = "schema_written", path = %output.display());
    Ok(())
}

fn run_schema_validate(path: &Path) -> Result<(), CliError> {
    let mut schema = load_schema(path)?;
    validate_schema(&mut schema)?;
    let ordering = resolve_order(&schema.columns)?;
    let serializer = CsvSerializer::new(schema.metadata.delimiter_byte()?);
    let header = serializer.header_line(&ordering)?;

    tracing::info!(
        event = "schema_valid",
        path = %path.display(),
        columns = ordering.len(),
        rows = schema.metadata.row_count,
        header = %header
    );
    println!("{header}");
    Ok(())
}

fn run_json_schema() -> Result<(), CliError> {
    let schema = schemars::schema_for!(Schema);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

/// `./output/<schema file stem>.csv`.
fn default_output_path(schema_path: &Path) -> Result<PathBuf, CliError> {
    let stem = schema_path.file_stem().ok_or_else(|| {
        CliError::InvalidConfig(format!(
            "cannot derive an output name from {}",
            schema_path.display()
        ))
    })?;
    let mut file_name = stem.to_os_string();
    file_name.push(".csv");
    Ok(Path::new(DEFAULT_OUTPUT_DIR).join(file_name))
}

fn write_report(path: &Path, report: &GenerationReport) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_vec_pretty(report)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn default_output_uses_schema_stem() {
        let path = default_output_path(Path::new("./schemas/people.yaml")).unwrap();
        assert_eq!(path, Path::new("./output/people.csv"));
    }

    #[test]
    fn generate_defaults() {
        let cli = Cli::parse_from(["csvforge", "generate"]);
        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.schema, PathBuf::from(DEFAULT_SCHEMA_PATH));
                assert!(args.output.is_none());
                assert!(args.seed.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn schema_subcommands_parse() {
        let cli = Cli::parse_from([
            "csvforge",
            "--log-format",
            "json",
            "schema",
            "validate",
            "-s",
            "custom.yaml",
        ]);
        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Command::Schema(SchemaCommand::Validate { schema }) => {
                assert_eq!(schema, PathBuf::from("custom.yaml"));
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::parse_from(["csvforge", "schema", "new"]);
        match cli.command {
            Command::Schema(SchemaCommand::New { output }) => {
                assert_eq!(output, PathBuf::from(DEFAULT_EXAMPLE_PATH));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn generate_flags_parse() {
        let cli = Cli::parse_from([
            "csvforge", "generate", "-s", "a.yaml", "-o", "out/a.csv", "--seed", "42", "--report",
            "out/report.json",
        ]);
        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.output, Some(PathBuf::from("out/a.csv")));
                assert_eq!(args.seed, Some(42));
                assert_eq!(args.report, Some(PathBuf::from("out/report.json")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
