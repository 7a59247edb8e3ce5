//! One-shot question command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use crate::orchestrator::Orchestrator;

/// Run the ask command.
pub async fn run_ask(question: &str, model: Option<String>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Chat) {
        Output::error(&format!("{}", e));
        Output::info("Run 'veileder doctor' for detailed diagnostics.");
        return Err(e);
    }

    let orchestrator = Orchestrator::new(settings);
    let mut agent = orchestrator.build_agent(model.as_deref())?;

    let spinner = Output::spinner("Searching course materials...");

    match agent.submit(question).await {
        Ok(response) => {
            spinner.finish_and_clear();
            println!("\n{}\n", response.text);
            Output::citations(&response.citations);
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to answer: {}", e));
            Err(e)
        }
    }
}
