//! Pre-flight checks before talking to the backend.
//!
//! Validates credentials before starting operations that would otherwise
//! fail midway through a conversation.

use crate::error::{Result, VeilederError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Chat and ask need an API key for embeddings and completions.
    Chat,
    /// Listing tools only reads local collection files.
    Tools,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Chat => check_api_key()?,
        Operation::Tools => {}
    }
    Ok(())
}

/// Check if the OpenAI API key is configured.
pub fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(VeilederError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(VeilederError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}
