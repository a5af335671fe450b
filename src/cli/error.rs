//! CLI error types

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::DataMakerError;
use crate::export::ExportError;
use crate::schema::SchemaError;

/// Errors surfaced by `datamaker` commands
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to read {}: {1}", .0.display())]
    FileReadError(PathBuf, String),

    #[error("Failed to write {}: {1}", .0.display())]
    FileWriteError(PathBuf, String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    DataMaker(#[from] DataMakerError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl CliError {
    /// Message for the terminal, with hints for provider failures
    pub fn user_message(&self) -> String {
        match self {
            CliError::DataMaker(DataMakerError::Llm(err)) => err.user_message(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;

    #[test]
    fn test_user_message() {
        let err = CliError::FileReadError(PathBuf::from("missing.yaml"), "not found".to_string());
        assert_eq!(err.user_message(), "Failed to read missing.yaml: not found");

        let err: CliError = DataMakerError::from(LlmError::Timeout(3)).into();
        assert!(err.user_message().contains("Hint: "));
    }
}
