//! Completion clients
//!
//! This module provides the [`CompletionClient`] abstraction the data maker
//! uses to obtain raw completions, plus two implementations:
//!
//! - [`OpenAiClient`]: blocking client for OpenAI-compatible chat-completions
//!   endpoints (requires the `llm-online` feature for real requests)
//! - [`MockCompletionClient`]: canned responses for tests and dry runs
//!
//! # Feature Flags
//!
//! - `llm-online`: Enable HTTP requests in [`OpenAiClient`]
//!
//! Without it, [`OpenAiClient::complete`] returns [`LlmError::Offline`].

pub mod client;
pub mod config;
pub mod error;
pub mod openai;

pub use client::{CompletionClient, MockCompletionClient};
pub use config::{DEFAULT_MODEL, OpenAiConfig};
pub use error::{LlmError, LlmResult};
pub use openai::OpenAiClient;
