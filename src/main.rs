//! PII redaction CLI.
//!
//! Reads text from a file or stdin, runs validation and the configured
//! cleaning stages, and prints the pipeline output as JSON. The `restore`
//! subcommand turns a previous run's output back into the original text.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use anonify::validation::DEFAULT_MAX_LENGTH;
use anonify::{
    AnonifyError, CommandDetector, OffsetUnit, PipelineOutput, RedactionService, RegexEngine,
    RuleValidator, SpanEngine, StaticDetector,
};

/// PII Redaction Tool
///
/// Replaces emails, IP addresses, URLs and model-detected entities with
/// numbered placeholders such as [EMAIL_1]. Reads stdin when no input file
/// is given.
#[derive(Parser)]
#[command(name = "anonify")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input text file (defaults to stdin)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output JSON file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Skip the built-in regex stage
    #[arg(long)]
    no_regex: bool,

    /// External NER program: receives the text on stdin, prints a JSON entity array
    #[arg(long, value_name = "COMMAND")]
    ner_command: Option<String>,

    /// JSON entity array computed beforehand for this input
    #[arg(long, value_name = "FILE")]
    entities: Option<PathBuf>,

    /// Entity field holding the category name
    #[arg(long, value_name = "FIELD", default_value = "entity_group")]
    label_key: String,

    /// Entity offsets count characters rather than UTF-8 bytes
    #[arg(long)]
    char_offsets: bool,

    /// Keep surrounding whitespace and punctuation inside model spans
    #[arg(long)]
    no_trim: bool,

    /// First counter value for each label
    #[arg(long, value_name = "N", default_value_t = 1)]
    start_at: usize,

    /// Maximum accepted input length in characters
    #[arg(long, value_name = "CHARS", default_value_t = DEFAULT_MAX_LENGTH)]
    max_length: usize,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Restore original values from a previous run's JSON output
    Restore {
        /// JSON output of a previous run
        #[arg(short, long, value_name = "FILE")]
        mapping: PathBuf,

        /// Redacted text to restore (defaults to the output's cleaned_text)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Restored text file (defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

/// Command handler owning the configured pipeline.
struct RedactionHandler {
    service: RedactionService,
    verbose: bool,
}

impl RedactionHandler {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let mut service =
            RedactionService::new().with_validator(RuleValidator::standard(cli.max_length));

        if !cli.no_regex {
            service = service.with_engine(RegexEngine::default().with_start_at(cli.start_at));
        }

        if let Some(model) = build_model_stage(cli)? {
            service = service.with_engine(model);
        }

        Ok(Self {
            service,
            verbose: cli.verbose,
        })
    }

    fn redact(&self, input: Option<&Path>, output: Option<&Path>) -> Result<()> {
        let text = read_text(input)?;

        if self.verbose {
            eprintln!("Stages: {}", self.service.methods().join(" -> "));
            eprintln!("Input:  {} characters", text.chars().count());
        }

        let result = self
            .service
            .run(&text)
            .with_context(|| "Redaction failed")?;

        if self.verbose {
            eprintln!("\nRedaction Summary:");
            for (label, count) in &result.replaced_count {
                eprintln!("  {}: {}", label, count);
            }
            eprintln!("  Total: {}", result.total_redacted());
        }

        let json = serde_json::to_string_pretty(&result)
            .map_err(AnonifyError::from)
            .with_context(|| "Failed to encode output")?;
        write_text(output, &json)
    }

    fn restore(mapping: &Path, input: Option<&Path>, output: Option<&Path>) -> Result<()> {
        let raw = std::fs::read_to_string(mapping)
            .map_err(|source| AnonifyError::Io {
                path: mapping.to_path_buf(),
                source,
            })
            .with_context(|| format!("Failed to read {}", mapping.display()))?;
        let previous: PipelineOutput = serde_json::from_str(&raw)
            .map_err(AnonifyError::from)
            .with_context(|| format!("Invalid pipeline output in {}", mapping.display()))?;

        // Edited text no longer matches the recorded token positions.
        let restored = match input {
            Some(path) => previous.restore_text(&read_text(Some(path))?),
            None => previous.restore(),
        };
        write_text(output, &restored)
    }
}

/// Builds the model stage from `--ner-command` and `--entities`, if given.
fn build_model_stage(cli: &Cli) -> Result<Option<SpanEngine>> {
    if cli.ner_command.is_none() && cli.entities.is_none() {
        return Ok(None);
    }

    let offset_unit = if cli.char_offsets {
        OffsetUnit::Char
    } else {
        OffsetUnit::Byte
    };
    let mut engine = SpanEngine::new("model")
        .with_trim_spans(!cli.no_trim)
        .with_offset_unit(offset_unit)
        .with_start_at(cli.start_at);

    if let Some(command) = &cli.ner_command {
        let detector = CommandDetector::from_command_line(command)
            .ok_or_else(|| AnonifyError::configuration("ner-command", "empty command"))?
            .with_label_key(cli.label_key.clone());
        engine = engine.with_detector(detector);
    }

    if let Some(path) = &cli.entities {
        let json = std::fs::read_to_string(path)
            .map_err(|source| AnonifyError::Io {
                path: path.clone(),
                source,
            })
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let detector = StaticDetector::from_json(path.display().to_string(), &json)
            .map_err(|source| AnonifyError::Detection {
                method: "model".to_string(),
                source,
            })?
            .with_label_key(cli.label_key.clone());
        engine = engine.with_detector(detector);
    }

    Ok(Some(engine))
}

fn read_text(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|source| AnonifyError::Io {
                path: path.to_path_buf(),
                source,
            })
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .with_context(|| "Failed to read stdin")?;
            Ok(text)
        }
    }
}

fn write_text(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, text)
            .map_err(|source| AnonifyError::Io {
                path: path.to_path_buf(),
                source,
            })
            .with_context(|| format!("Failed to write to {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", text).with_context(|| "Failed to write stdout")
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "warn,anonify=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true),
        )
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Some(Commands::Restore {
            mapping,
            input,
            output,
        }) => RedactionHandler::restore(mapping, input.as_deref(), output.as_deref()),
        None => {
            let handler = RedactionHandler::from_cli(cli)?;
            handler.redact(cli.input.as_deref(), cli.output.as_deref())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            let code = err
                .downcast_ref::<AnonifyError>()
                .map_or(1, |e| e.kind().exit_code());
            ExitCode::from(code as u8)
        }
    }
}
