//! Tool catalog: retrievers wrapped as model-invokable functions.
//!
//! The tool name and description are the only contract surface exposed to
//! the model. Every tool takes a single `query` string and returns the
//! filtered, truncated search results for its collection.

use crate::error::{Result, VeilederError};
use crate::retriever::{RetrievedDocument, RetrieverRegistry, RetrieverSpec, SearchBackend};
use std::sync::Arc;
use tracing::debug;

/// One retriever wrapped as a named tool.
pub struct RetrieverTool {
    spec: RetrieverSpec,
    backend: Arc<dyn SearchBackend>,
}

impl RetrieverTool {
    /// Wrap a spec and backend handle into a tool.
    pub fn wrap(spec: RetrieverSpec, backend: Arc<dyn SearchBackend>) -> Self {
        Self { spec, backend }
    }

    /// Tool name the model selects by.
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Tool description shown to the model.
    pub fn description(&self) -> &str {
        &self.spec.description
    }

    /// The spec this tool was built from.
    pub fn spec(&self) -> &RetrieverSpec {
        &self.spec
    }

    /// Run the similarity search for a query.
    ///
    /// Fetches `fetch_k` candidates, drops everything below the score
    /// threshold, and keeps the top `k` by score. Ties keep the backend's
    /// original order (the sort is stable). An empty result is not an
    /// error: it means nothing cleared the threshold.
    pub async fn invoke(&self, query: &str) -> Result<Vec<RetrievedDocument>> {
        let mut results = self.backend.search(query, self.spec.fetch_k).await?;

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.retain(|r| r.score >= self.spec.score_threshold);
        results.truncate(self.spec.k);

        debug!(
            "Tool '{}' returned {} results for query",
            self.spec.name,
            results.len()
        );
        Ok(results)
    }
}

/// Ordered catalog of tools presented to the model.
///
/// Iteration order equals registration order, which is the priority order
/// the system prompt tells the model to try sources in.
pub struct ToolCatalog {
    tools: Vec<RetrieverTool>,
}

impl ToolCatalog {
    /// Build a catalog from a registry, preserving registration order.
    pub fn from_registry(registry: &RetrieverRegistry) -> Self {
        let tools = registry
            .iter()
            .map(|entry| RetrieverTool::wrap(entry.spec.clone(), Arc::clone(&entry.backend)))
            .collect();
        Self { tools }
    }

    /// Find a tool by name.
    pub fn get(&self, name: &str) -> Result<&RetrieverTool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| VeilederError::ToolNotFound(name.to_string()))
    }

    /// Iterate tools in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &RetrieverTool> {
        self.tools.iter()
    }

    /// Number of tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// OpenAI function-calling definitions for every tool, in catalog order.
    pub fn openai_definitions(&self) -> Vec<async_openai::types::ChatCompletionTool> {
        use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

        self.tools
            .iter()
            .map(|tool| ChatCompletionTool {
                r#type: ChatCompletionToolType::Function,
                function: FunctionObject {
                    name: tool.name().to_string(),
                    description: Some(tool.description().to_string()),
                    parameters: Some(serde_json::json!({
                        "type": "object",
                        "properties": {
                            "query": {
                                "type": "string",
                                "description": "The search query"
                            }
                        },
                        "required": ["query"]
                    })),
                    strict: None,
                },
            })
            .collect()
    }
}

/// Parse the `query` argument out of a tool-call arguments payload.
pub fn parse_query_arguments(arguments: &str) -> Result<String> {
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| VeilederError::ToolCallParse(format!("Invalid tool arguments: {}", e)))?;

    args["query"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| VeilederError::ToolCallParse("Missing 'query' argument".to_string()))
}

/// Format retrieved documents as a tool result for the model.
pub fn format_tool_result(results: &[RetrievedDocument]) -> String {
    if results.is_empty() {
        return "No relevant results found.".to_string();
    }

    let formatted = results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let origin = match (r.source(), r.locator()) {
                (Some(source), Some(locator)) => format!("{} ({})", source, locator),
                (Some(source), None) => source.to_string(),
                _ => "unknown source".to_string(),
            };
            format!("{}. [{}]\n   {}", i + 1, origin, r.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("Found {} results:\n\n{}", results.len(), formatted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct CannedBackend {
        docs: Vec<RetrievedDocument>,
    }

    #[async_trait]
    impl SearchBackend for CannedBackend {
        async fn search(&self, _query: &str, fetch_k: usize) -> Result<Vec<RetrievedDocument>> {
            Ok(self.docs.iter().take(fetch_k).cloned().collect())
        }
    }

    fn doc(content: &str, score: f32) -> RetrievedDocument {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), format!("{}.md", content));
        RetrievedDocument {
            content: content.to_string(),
            metadata,
            score,
        }
    }

    fn tool_with(docs: Vec<RetrievedDocument>, k: usize, threshold: f32) -> RetrieverTool {
        let spec = RetrieverSpec::new("notes", "desc", k, threshold, 20).unwrap();
        RetrieverTool::wrap(spec, Arc::new(CannedBackend { docs }))
    }

    #[tokio::test]
    async fn test_invoke_filters_and_truncates() {
        let tool = tool_with(
            vec![
                doc("low", 0.2),
                doc("best", 0.95),
                doc("good", 0.8),
                doc("ok", 0.75),
            ],
            2,
            0.7,
        );

        let results = tool.invoke("query").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "best");
        assert_eq!(results[1].content, "good");
        assert!(results.iter().all(|r| r.score >= 0.7));
    }

    #[tokio::test]
    async fn test_invoke_ties_keep_backend_order() {
        let tool = tool_with(vec![doc("first", 0.8), doc("second", 0.8)], 2, 0.0);

        let results = tool.invoke("query").await.unwrap();
        assert_eq!(results[0].content, "first");
        assert_eq!(results[1].content, "second");
    }

    #[tokio::test]
    async fn test_invoke_empty_below_threshold_is_not_an_error() {
        let tool = tool_with(vec![doc("weak", 0.1), doc("weaker", 0.05)], 4, 0.7);

        let results = tool.invoke("query").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_catalog_order_follows_registration() {
        let mut registry = RetrieverRegistry::new();
        for name in ["notes", "textbook", "logistics"] {
            let spec = RetrieverSpec::new(name, "desc", 4, 0.7, 20).unwrap();
            registry
                .register(spec, Arc::new(CannedBackend { docs: vec![] }))
                .unwrap();
        }

        let catalog = ToolCatalog::from_registry(&registry);
        let names: Vec<_> = catalog.iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, vec!["notes", "textbook", "logistics"]);

        let definitions = catalog.openai_definitions();
        assert_eq!(definitions.len(), 3);
        assert_eq!(definitions[0].function.name, "notes");
    }

    #[test]
    fn test_parse_query_arguments() {
        assert_eq!(
            parse_query_arguments(r#"{"query": "for loops"}"#).unwrap(),
            "for loops"
        );
        assert!(matches!(
            parse_query_arguments("not json"),
            Err(VeilederError::ToolCallParse(_))
        ));
        assert!(matches!(
            parse_query_arguments(r#"{"q": "missing"}"#),
            Err(VeilederError::ToolCallParse(_))
        ));
    }

    #[test]
    fn test_format_tool_result() {
        assert_eq!(format_tool_result(&[]), "No relevant results found.");

        let formatted = format_tool_result(&[doc("pointers", 0.9)]);
        assert!(formatted.contains("Found 1 results"));
        assert!(formatted.contains("pointers.md"));
    }
}
