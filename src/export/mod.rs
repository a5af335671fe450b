//! Export functionality
//!
//! Renders extraction results in one of the supported formats:
//! - JSON (one document, an array when there are several results)
//! - JSON Lines (one compact result per line)
//! - YAML
//! - Markdown (human-readable report)

mod markdown;

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use crate::engine::ExtractionResult;

pub use markdown::render_markdown;

/// Error during export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ExportError {
    fn from(err: serde_yaml::Error) -> Self {
        ExportError::SerializationError(err.to_string())
    }
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Output format for extraction results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Json,
    Jsonl,
    #[default]
    Yaml,
    Markdown,
}

impl OutputFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
            OutputFormat::Yaml => write!(f, "yaml"),
            OutputFormat::Markdown => write!(f, "md"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Render results as text in the given format
pub fn render(results: &[ExtractionResult], format: OutputFormat) -> ExportResult<String> {
    let text = match format {
        OutputFormat::Json => {
            let mut text = match results {
                [single] => serde_json::to_string_pretty(single)?,
                _ => serde_json::to_string_pretty(results)?,
            };
            text.push('\n');
            text
        }
        OutputFormat::Jsonl => {
            let mut text = String::new();
            for result in results {
                text.push_str(&serde_json::to_string(result)?);
                text.push('\n');
            }
            text
        }
        OutputFormat::Yaml => match results {
            [single] => serde_yaml::to_string(single)?,
            _ => serde_yaml::to_string(results)?,
        },
        OutputFormat::Markdown => results
            .iter()
            .map(render_markdown)
            .collect::<Vec<_>>()
            .join("\n---\n\n"),
    };
    Ok(text)
}

/// Render results and write them out
pub fn write_results(
    results: &[ExtractionResult],
    format: OutputFormat,
    writer: &mut impl Write,
) -> ExportResult<()> {
    let text = render(results, format)?;
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    Ok(())
}
