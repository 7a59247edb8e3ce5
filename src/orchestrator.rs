//! Assembles the tutoring agent from settings.
//!
//! Everything is constructed explicitly here: backends are built once and
//! injected, so tests and multiple agents can coexist without shared
//! global state.

use crate::agent::{AgentConfig, AgentRuntime, OpenAiBackend};
use crate::config::{PromptPolicy, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, VeilederError};
use crate::retriever::{CollectionBackend, ContentCategory, RetrieverRegistry, RetrieverSpec};
use crate::tools::ToolCatalog;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Builds the agent graph: embedder, collections, registry, catalog,
/// prompt, chat backend, runtime.
pub struct Orchestrator {
    settings: Settings,
}

impl Orchestrator {
    /// Create an orchestrator for the given settings.
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Build the retriever registry: one collection-backed retriever per
    /// content category, all sharing the configured search parameters.
    ///
    /// Missing collection files are a configuration error; `veileder doctor`
    /// reports which ones are absent.
    pub fn build_registry(&self, embedder: Arc<dyn Embedder>) -> Result<RetrieverRegistry> {
        let collections_dir = self.settings.collections_dir();
        let retrieval = &self.settings.retrieval;
        let mut registry = RetrieverRegistry::new();

        for category in ContentCategory::all() {
            let path = collections_dir.join(category.collection_file());
            if !path.exists() {
                return Err(VeilederError::Config(format!(
                    "Collection file for '{}' not found at {}",
                    category.tool_name(),
                    path.display()
                )));
            }

            let backend =
                CollectionBackend::load(&path, category.tool_name(), Arc::clone(&embedder))?;
            info!(
                "Loaded collection '{}' ({} records)",
                category.tool_name(),
                backend.record_count()
            );

            let spec = RetrieverSpec::new(
                category.tool_name(),
                category.description(),
                retrieval.k,
                retrieval.score_threshold,
                retrieval.fetch_k,
            )?;
            registry.register(spec, Arc::new(backend))?;
        }

        Ok(registry)
    }

    /// Build the system prompt: the custom file if configured, the built-in
    /// tutoring prompt otherwise.
    pub fn build_prompt(&self) -> Result<PromptPolicy> {
        let soft_limit = self.settings.prompt.soft_limit_chars;
        match &self.settings.prompt.custom_path {
            Some(path) => {
                let expanded = Settings::expand_path(path);
                let text = std::fs::read_to_string(&expanded).map_err(|e| {
                    VeilederError::Config(format!(
                        "Failed to read custom prompt {}: {}",
                        expanded.display(),
                        e
                    ))
                })?;
                PromptPolicy::new(&text, soft_limit)
            }
            None => PromptPolicy::default_tutor(soft_limit),
        }
    }

    /// Build the full agent runtime, optionally overriding the chat model.
    pub fn build_agent(&self, model_override: Option<&str>) -> Result<AgentRuntime> {
        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
            &self.settings.embedding.model,
            self.settings.embedding.dimensions as usize,
        ));

        let registry = self.build_registry(embedder)?;
        let catalog = ToolCatalog::from_registry(&registry);
        let prompt = self.build_prompt()?;

        let agent_settings = &self.settings.agent;
        let model = model_override.unwrap_or(&agent_settings.model);
        let backend = Arc::new(OpenAiBackend::new(
            model,
            agent_settings.temperature,
            agent_settings.max_tokens,
        ));

        let config = AgentConfig {
            max_tool_iterations: agent_settings.max_tool_iterations,
            parse_error_policy: agent_settings.parse_error_policy,
            request_timeout: Duration::from_secs(agent_settings.request_timeout_seconds),
        };

        Ok(AgentRuntime::new(backend, catalog, prompt, config))
    }

    /// The settings this orchestrator was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retriever::CollectionRecord;
    use std::collections::HashMap;

    struct ZeroEmbedder;

    #[async_trait::async_trait]
    impl Embedder for ZeroEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.0, 0.0])
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn settings_with_data_dir(dir: &std::path::Path) -> Settings {
        let mut settings = Settings::default();
        settings.general.data_dir = dir.to_string_lossy().to_string();
        settings
    }

    fn write_collections(dir: &std::path::Path) {
        let collections = dir.join("collections");
        std::fs::create_dir_all(&collections).unwrap();
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), "sample.md".to_string());
        let records = vec![CollectionRecord::new(
            "sample".to_string(),
            metadata,
            vec![0.1, 0.2],
        )];
        let json = serde_json::to_string(&records).unwrap();
        for category in ContentCategory::all() {
            std::fs::write(collections.join(category.collection_file()), &json).unwrap();
        }
    }

    #[test]
    fn test_registry_built_in_category_order() {
        let dir = tempfile::tempdir().unwrap();
        write_collections(dir.path());
        let orchestrator = Orchestrator::new(settings_with_data_dir(dir.path()));

        let registry = orchestrator.build_registry(Arc::new(ZeroEmbedder)).unwrap();
        assert_eq!(registry.len(), 6);
        assert!(registry.lookup("search_course_notes").is_ok());
        assert!(registry.lookup("search_course_logistics").is_ok());

        let catalog = ToolCatalog::from_registry(&registry);
        let names: Vec<_> = catalog.iter().map(|t| t.name().to_string()).collect();
        let expected: Vec<_> = ContentCategory::all()
            .iter()
            .map(|c| c.tool_name().to_string())
            .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_missing_collection_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::new(settings_with_data_dir(dir.path()));

        let err = orchestrator
            .build_registry(Arc::new(ZeroEmbedder))
            .unwrap_err();
        assert!(matches!(err, VeilederError::Config(_)));
    }

    #[test]
    fn test_custom_prompt_loaded_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let prompt_path = dir.path().join("prompt.txt");
        std::fs::write(&prompt_path, "You are a study group leader.").unwrap();

        let mut settings = Settings::default();
        settings.prompt.custom_path = Some(prompt_path.to_string_lossy().to_string());
        let orchestrator = Orchestrator::new(settings);

        let prompt = orchestrator.build_prompt().unwrap();
        assert_eq!(prompt.as_str(), "You are a study group leader.");
    }

    #[test]
    fn test_default_prompt_used_without_custom_path() {
        let orchestrator = Orchestrator::new(Settings::default());
        let prompt = orchestrator.build_prompt().unwrap();
        assert!(prompt.as_str().contains("teaching assistant"));
    }
}
