//! Completion client trait and an in-memory implementation
//!
//! The data maker talks to language models through [`CompletionClient`]:
//! one prompt in, one raw completion out, as a single blocking call.

use std::cell::RefCell;

use super::error::{LlmError, LlmResult};

/// Trait for completion backends
pub trait CompletionClient {
    /// Generate a completion for the given prompt
    ///
    /// # Arguments
    /// * `prompt` - The input prompt for the LLM
    /// * `show_prompt` - Log the prompt before sending it
    ///
    /// # Returns
    /// The raw generated text
    fn complete(&self, prompt: &str, show_prompt: bool) -> LlmResult<String>;

    /// Get the model name being used
    fn model_name(&self) -> &str;
}

impl<C: CompletionClient + ?Sized> CompletionClient for Box<C> {
    fn complete(&self, prompt: &str, show_prompt: bool) -> LlmResult<String> {
        (**self).complete(prompt, show_prompt)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

impl<C: CompletionClient + ?Sized> CompletionClient for &C {
    fn complete(&self, prompt: &str, show_prompt: bool) -> LlmResult<String> {
        (**self).complete(prompt, show_prompt)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// A canned-response client for tests and dry runs
///
/// Responses are served in order; the last one repeats once the queue is
/// exhausted. Every prompt received is recorded.
pub struct MockCompletionClient {
    responses: Vec<String>,
    model: String,
    should_fail: bool,
    prompts: RefCell<Vec<String>>,
}

impl MockCompletionClient {
    /// Create a mock client that always returns the given response
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_responses(vec![response.into()])
    }

    /// Create a mock client serving responses in order
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses,
            model: "mock-model".to_string(),
            should_fail: false,
            prompts: RefCell::new(Vec::new()),
        }
    }

    /// Create a mock client that fails
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::with_responses(Vec::new())
        }
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    /// Number of completion calls made
    pub fn call_count(&self) -> usize {
        self.prompts.borrow().len()
    }
}

impl CompletionClient for MockCompletionClient {
    fn complete(&self, prompt: &str, show_prompt: bool) -> LlmResult<String> {
        if show_prompt {
            tracing::info!("Prompt:\n{}", prompt);
        }
        let index = {
            let mut prompts = self.prompts.borrow_mut();
            prompts.push(prompt.to_string());
            prompts.len() - 1
        };
        if self.should_fail {
            return Err(LlmError::Unreachable {
                url: "mock://".to_string(),
                message: "mock failure".to_string(),
            });
        }
        self.responses
            .get(index)
            .or_else(|| self.responses.last())
            .cloned()
            .ok_or_else(|| LlmError::EmptyCompletion("mock has no responses".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
