//! Completion client failures

use thiserror::Error;

use super::config::{API_KEY_ENV, BASE_URL_ENV};

/// Why a completion could not be obtained
#[derive(Error, Debug)]
pub enum LlmError {
    /// The public endpoint was selected without credentials
    #[error("No API key configured for {0}")]
    MissingApiKey(String),

    /// The HTTP client could not be built
    #[error("Could not set up HTTP client: {0}")]
    ClientSetup(String),

    #[error("Could not reach completion endpoint {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("Completion request timed out after {0} seconds")]
    Timeout(u64),

    /// Non-success status from the endpoint
    #[error("Completion endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a chat-completions payload
    #[error("Could not decode completion response: {0}")]
    MalformedResponse(String),

    /// The payload decoded but carried no completion text
    #[error("Completion response had no text: {0}")]
    EmptyCompletion(String),

    /// HTTP completions were compiled out
    #[error("HTTP completions are unavailable in this build (feature `{0}` disabled)")]
    Offline(String),
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::MalformedResponse(err.to_string())
    }
}

pub type LlmResult<T> = Result<T, LlmError>;

impl LlmError {
    /// Terminal message with a hint on what to change
    pub fn user_message(&self) -> String {
        let hint = match self {
            LlmError::MissingApiKey(_) => format!(
                "export {API_KEY_ENV}, or pass --base-url (or set {BASE_URL_ENV}) for a local OpenAI-compatible server"
            ),
            LlmError::Unreachable { .. } => {
                format!("check --base-url / {BASE_URL_ENV} and that the server is running")
            }
            LlmError::Timeout(_) => {
                "the model is slow to answer; raise timeout_seconds or try a smaller model".to_string()
            }
            LlmError::Status { status: 401 | 403, .. } => {
                format!("the endpoint rejected the credentials in {API_KEY_ENV}")
            }
            LlmError::Status { status: 404, .. } => {
                "check the model name (-m) and that --base-url ends in the API version, e.g. /v1"
                    .to_string()
            }
            LlmError::Status { status: 429, .. } => {
                "rate limited; wait before retrying or generate fewer objects per run (-n)".to_string()
            }
            LlmError::Offline(feature) => format!("rebuild with --features {feature}"),
            _ => return self.to_string(),
        };
        format!("{self}\nHint: {hint}")
    }
}
