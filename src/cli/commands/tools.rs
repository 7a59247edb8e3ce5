//! List the tool catalog.

use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::Result;
use crate::orchestrator::Orchestrator;
use crate::tools::ToolCatalog;
use std::sync::Arc;

/// Print every registered tool in catalog (priority) order.
pub fn run_tools(settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings);
    let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
        &orchestrator.settings().embedding.model,
        orchestrator.settings().embedding.dimensions as usize,
    ));
    let registry = orchestrator.build_registry(embedder)?;
    let catalog = ToolCatalog::from_registry(&registry);

    Output::header(&format!("Registered tools ({})", catalog.len()));
    for tool in catalog.iter() {
        let spec = tool.spec();
        Output::list_item(&format!(
            "{} (k={}, threshold={}, fetch_k={})",
            tool.name(),
            spec.k,
            spec.score_threshold,
            spec.fetch_k
        ));
        println!("      {}", tool.description());
    }

    Ok(())
}
