//! OpenAI-compatible chat-completions client
//!
//! Works against the OpenAI API and any server exposing the same
//! `/chat/completions` endpoint (vLLM, llama.cpp server, LiteLLM).
//!
//! # Example
//!
//! ```ignore
//! use linkml_datamaker::llm::{CompletionClient, OpenAiClient, OpenAiConfig};
//!
//! let client = OpenAiClient::new(OpenAiConfig::from_env("gpt-4o"))?;
//! let text = client.complete("Produce a data object...", false)?;
//! ```

use serde::{Deserialize, Serialize};

use super::client::CompletionClient;
use super::config::OpenAiConfig;
use super::error::{LlmError, LlmResult};

/// Blocking client for a chat-completions endpoint
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    config: OpenAiConfig,
    #[cfg(feature = "llm-online")]
    client: reqwest::blocking::Client,
}

/// Request body for the chat-completions endpoint
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response from the chat-completions endpoint
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

impl OpenAiClient {
    /// Create a new client
    ///
    /// Fails when no API key is configured and the base URL is the public
    /// OpenAI endpoint, since every request would be rejected.
    #[cfg(feature = "llm-online")]
    pub fn new(config: OpenAiConfig) -> LlmResult<Self> {
        check_api_key(&config)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| LlmError::ClientSetup(e.to_string()))?;
        Ok(Self { config, client })
    }

    /// Create a new client (stub for when feature is disabled)
    #[cfg(not(feature = "llm-online"))]
    pub fn new(config: OpenAiConfig) -> LlmResult<Self> {
        check_api_key(&config)?;
        Ok(Self { config })
    }

    /// Get the client configuration
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

fn check_api_key(config: &OpenAiConfig) -> LlmResult<()> {
    if config.api_key.is_none() && config.base_url.contains("api.openai.com") {
        return Err(LlmError::MissingApiKey(config.base_url.clone()));
    }
    Ok(())
}

/// Pull the first choice's text out of a response
fn extract_content(response: ChatResponse) -> LlmResult<String> {
    if let Some(usage) = &response.usage {
        tracing::debug!(
            "Completion used {} prompt tokens, {} completion tokens",
            usage.prompt_tokens,
            usage.completion_tokens
        );
    }
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::EmptyCompletion("response contained no choices".to_string()))
}

#[cfg(feature = "llm-online")]
impl CompletionClient for OpenAiClient {
    fn complete(&self, prompt: &str, show_prompt: bool) -> LlmResult<String> {
        if show_prompt {
            tracing::info!("Prompt:\n{}", prompt);
        }
        let url = self.config.endpoint();
        tracing::debug!("Sending request to {}", url);

        let mut request = self.client.post(&url).json(&self.request_body(prompt));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.config.timeout_seconds)
            } else {
                LlmError::Unreachable {
                    url: url.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let body: ChatResponse = response
            .json()
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;
        extract_content(body)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(not(feature = "llm-online"))]
impl CompletionClient for OpenAiClient {
    fn complete(&self, _prompt: &str, _show_prompt: bool) -> LlmResult<String> {
        Err(LlmError::Offline("llm-online".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
