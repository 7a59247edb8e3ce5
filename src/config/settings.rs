//! Configuration settings for Veileder.

use crate::agent::ParseErrorPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub embedding: EmbeddingSettings,
    pub retrieval: RetrievalSettings,
    pub agent: AgentSettings,
    pub prompt: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data (collections live under
    /// `<data_dir>/collections`).
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.veileder".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-large".to_string(),
            dimensions: 1536,
        }
    }
}

/// Shared retrieval parameters, applied identically to every retriever.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of results returned per tool call.
    pub k: usize,
    /// Minimum similarity score a result must clear.
    pub score_threshold: f32,
    /// Candidate pool size fetched before filtering.
    pub fetch_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            k: 4,
            score_threshold: 0.7,
            fetch_k: 20,
        }
    }
}

/// Agent runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Chat model for response generation.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Optional completion token cap.
    pub max_tokens: Option<u32>,
    /// Upper bound on tool-dispatch round-trips per turn.
    pub max_tool_iterations: usize,
    /// What to do when the model emits a malformed tool-call payload.
    pub parse_error_policy: ParseErrorPolicy,
    /// Per-call deadline for backend and tool invocations, in seconds.
    pub request_timeout_seconds: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            max_tokens: None,
            max_tool_iterations: 4,
            parse_error_policy: ParseErrorPolicy::Recover,
            request_timeout_seconds: 60,
        }
    }
}

/// System prompt settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    /// Path to a custom system prompt file (overrides the built-in one).
    pub custom_path: Option<String>,
    /// Soft character limit; longer prompts log a warning but still work.
    pub soft_limit_chars: usize,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            custom_path: None,
            soft_limit_chars: 8000,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::VeilederError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("veileder")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Directory holding the per-category collection files.
    pub fn collections_dir(&self) -> PathBuf {
        self.data_dir().join("collections")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_retrieval_contract() {
        let settings = Settings::default();
        assert_eq!(settings.retrieval.k, 4);
        assert_eq!(settings.retrieval.fetch_k, 20);
        assert!((settings.retrieval.score_threshold - 0.7).abs() < f32::EPSILON);
        assert!(settings.retrieval.k <= settings.retrieval.fetch_k);
        assert_eq!(settings.agent.max_tool_iterations, 4);
        assert_eq!(settings.agent.parse_error_policy, ParseErrorPolicy::Recover);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.agent.model = "gpt-4o-mini".to_string();
        settings.retrieval.k = 6;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.agent.model, "gpt-4o-mini");
        assert_eq!(loaded.retrieval.k, 6);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let path = PathBuf::from("/nonexistent/veileder/config.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.agent.model, "gpt-4o");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str("[agent]\nmodel = \"gpt-4.1\"\n").unwrap();
        assert_eq!(settings.agent.model, "gpt-4.1");
        assert_eq!(settings.retrieval.fetch_k, 20);
    }
}
