//! Error types for Veileder.

use thiserror::Error;

/// Library-level error type for Veileder operations.
#[derive(Error, Debug)]
pub enum VeilederError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("No tool registered under '{0}'")]
    ToolNotFound(String),

    #[error("Malformed tool call: {0}")]
    ToolCallParse(String),

    #[error("Tool dispatch loop exceeded {0} iterations")]
    IterationLimit(usize),

    #[error("Request timed out")]
    Timeout,

    #[error("Chat backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Collection error: {0}")]
    Collection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl VeilederError {
    /// Whether the same request can safely be retried.
    ///
    /// Timeouts and backend outages leave the conversation untouched (the
    /// failed turn is rolled back), so resubmitting is safe. Parse and
    /// configuration errors are not retryable: the same input fails again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VeilederError::Timeout | VeilederError::BackendUnavailable(_) | VeilederError::Http(_)
        )
    }
}

/// Result type alias for Veileder operations.
pub type Result<T> = std::result::Result<T, VeilederError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(VeilederError::Timeout.is_retryable());
        assert!(VeilederError::BackendUnavailable("503".to_string()).is_retryable());
        assert!(!VeilederError::ToolCallParse("bad json".to_string()).is_retryable());
        assert!(!VeilederError::Config("missing key".to_string()).is_retryable());
    }
}
