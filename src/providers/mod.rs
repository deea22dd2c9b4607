//! Provider module for Chatboard
//!
//! This module contains the remote model abstraction and the Gemini
//! implementation used by the chat app.

pub mod base;
pub mod gemini;

pub use base::{CompletionResponse, Message, ModelInfo, Provider, Role, TokenUsage};
pub use gemini::GeminiProvider;

#[cfg(test)]
pub use base::MockProvider;

use crate::config::ChatConfig;
use crate::credentials::ApiKey;
use crate::error::Result;

/// Create the provider for the chat app
///
/// # Errors
///
/// Returns error if the HTTP client cannot be built
pub fn create_provider(config: &ChatConfig, api_key: ApiKey) -> Result<Box<dyn Provider>> {
    Ok(Box::new(GeminiProvider::new(config, api_key)?))
}
