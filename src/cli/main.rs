//! datamaker - generate synthetic data objects from a schema with an LLM

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use linkml_datamaker::cli::commands::generate::{GenerateArgs, handle_generate};
use linkml_datamaker::llm::DEFAULT_MODEL;

#[derive(Parser)]
#[command(name = "datamaker")]
#[command(about = "Generate schema-conforming synthetic data by prompting an LLM", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate objects for a schema class
    Generate {
        /// Schema file (YAML)
        schema: PathBuf,

        /// Model name
        #[arg(short, long, default_value = DEFAULT_MODEL)]
        model: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: json, jsonl, yaml, md (default: from output extension, else yaml)
        #[arg(short = 'O', long = "output-format")]
        output_format: Option<String>,

        /// Class to generate (default: the schema's tree root)
        #[arg(short, long = "class")]
        class_name: Option<String>,

        /// Number of objects to generate
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Partially filled object to complete (YAML or JSON)
        #[arg(long)]
        stub: Option<PathBuf>,

        /// Label to identifier table for grounding entities (YAML)
        #[arg(long)]
        lookup: Option<PathBuf>,

        /// Engine configuration file (YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// OpenAI-compatible API base URL (default: $OPENAI_BASE_URL or api.openai.com)
        #[arg(long)]
        base_url: Option<String>,

        /// Sampling temperature
        #[arg(long)]
        temperature: Option<f32>,

        /// Log each prompt before sending it
        #[arg(long)]
        show_prompt: bool,
    },
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Generate {
            schema,
            model,
            output,
            output_format,
            class_name,
            count,
            stub,
            lookup,
            config,
            base_url,
            temperature,
            show_prompt,
        } => handle_generate(&GenerateArgs {
            schema,
            model,
            output,
            format: output_format,
            class_name,
            count,
            stub,
            lookup,
            config,
            base_url,
            temperature,
            show_prompt,
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
