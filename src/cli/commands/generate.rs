//! Generate command implementation

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::cli::error::CliError;
use crate::cli::output::format_summary;
use crate::engine::{
    DataMakerEngine, DataMakerError, EngineConfig, ExtractionResult, LookupNormalizer, LooseRecord,
    loose_record_from_json,
};
use crate::export::{OutputFormat, write_results};
use crate::llm::{CompletionClient, OpenAiClient, OpenAiConfig};
use crate::schema::{SchemaDefinition, SchemaLoader};

/// Arguments for the `generate` command
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    /// Schema file (YAML)
    pub schema: PathBuf,
    /// Model name
    pub model: String,
    /// Output file; stdout when absent
    pub output: Option<PathBuf>,
    /// Output format; guessed from the output extension when absent
    pub format: Option<String>,
    /// Class to generate; the schema's target class when absent
    pub class_name: Option<String>,
    /// Number of objects
    pub count: usize,
    /// Partially filled object (YAML or JSON)
    pub stub: Option<PathBuf>,
    /// Label → identifier table (YAML) for entity normalization
    pub lookup: Option<PathBuf>,
    /// Engine configuration file (YAML)
    pub config: Option<PathBuf>,
    /// OpenAI-compatible base URL
    pub base_url: Option<String>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Log each prompt before sending it
    pub show_prompt: bool,
}

impl GenerateArgs {
    pub fn new(schema: impl Into<PathBuf>) -> Self {
        Self {
            schema: schema.into(),
            model: crate::llm::DEFAULT_MODEL.to_string(),
            output: None,
            format: None,
            class_name: None,
            count: 1,
            stub: None,
            lookup: None,
            config: None,
            base_url: None,
            temperature: None,
            show_prompt: false,
        }
    }
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::FileReadError(path.to_path_buf(), e.to_string()))
}

fn load_schema(path: &Path) -> Result<SchemaDefinition, CliError> {
    if !path.exists() {
        return Err(CliError::FileReadError(
            path.to_path_buf(),
            "file does not exist".to_string(),
        ));
    }
    Ok(SchemaLoader::from_path(path)?)
}

/// Read a stub object; YAML and JSON are both accepted
fn load_stub(path: &Path) -> Result<LooseRecord, CliError> {
    let content = read_file(path)?;
    let value: serde_json::Value = serde_yaml::from_str(&content)
        .map_err(|e| CliError::InvalidArgument(format!("Failed to parse stub: {}", e)))?;
    loose_record_from_json(&value)
        .ok_or_else(|| CliError::InvalidArgument("Stub must be a mapping of field names".to_string()))
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, CliError> {
    match path {
        Some(path) => serde_yaml::from_str(&read_file(path)?)
            .map_err(|e| CliError::InvalidArgument(format!("Invalid engine config: {}", e))),
        None => Ok(EngineConfig::default()),
    }
}

fn output_format(args: &GenerateArgs) -> Result<OutputFormat, CliError> {
    match (&args.format, &args.output) {
        (Some(format), _) => format.parse().map_err(CliError::InvalidArgument),
        (None, Some(path)) => Ok(OutputFormat::from_path(path).unwrap_or_default()),
        (None, None) => Ok(OutputFormat::default()),
    }
}

/// Handle the `generate` command against an OpenAI-compatible endpoint
pub fn handle_generate(args: &GenerateArgs) -> Result<(), CliError> {
    let mut config = OpenAiConfig::from_env(args.model.clone());
    if let Some(url) = &args.base_url {
        config = config.with_base_url(url.clone());
    }
    if let Some(temperature) = args.temperature {
        config = config.with_temperature(temperature);
    }
    let client = OpenAiClient::new(config).map_err(DataMakerError::from)?;
    generate_with_client(args, client)
}

/// Run the `generate` command with any completion client
pub fn generate_with_client<C: CompletionClient>(
    args: &GenerateArgs,
    client: C,
) -> Result<(), CliError> {
    if args.count == 0 {
        return Err(CliError::InvalidArgument("count must be at least 1".to_string()));
    }
    let format = output_format(args)?;
    let schema = load_schema(&args.schema)?;
    let config = load_config(args.config.as_deref())?;
    let stub = args.stub.as_deref().map(load_stub).transpose()?;

    let lookup = match &args.lookup {
        Some(path) => Some(
            LookupNormalizer::from_yaml_str(&read_file(path)?, config.id_prefix.clone())
                .map_err(|e| CliError::InvalidArgument(format!("Invalid lookup table: {}", e)))?,
        ),
        None => None,
    };

    let mut engine = DataMakerEngine::new(schema, client).with_config(config);
    if let Some(lookup) = lookup {
        tracing::info!("Using lookup table with {} entries", lookup.len());
        engine = engine.with_normalizer(lookup);
    }

    let results = engine.make_many(
        args.class_name.as_deref(),
        args.count,
        stub.as_ref(),
        args.show_prompt,
    )?;
    write_output(&results, format, args.output.as_deref())?;
    eprint!("{}", format_summary(&results));
    Ok(())
}

fn write_output(
    results: &[ExtractionResult],
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), CliError> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| CliError::FileWriteError(path.to_path_buf(), e.to_string()))?;
            write_results(results, format, &mut BufWriter::new(file))?;
            eprintln!("Output written to: {}", path.display());
        }
        None => write_results(results, format, &mut std::io::stdout().lock())?,
    }
    Ok(())
}
