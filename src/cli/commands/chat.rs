//! Interactive tutoring session.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use crate::orchestrator::Orchestrator;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(model: Option<String>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Chat) {
        Output::error(&format!("{}", e));
        Output::info("Run 'veileder doctor' for detailed diagnostics.");
        return Err(e);
    }

    let orchestrator = Orchestrator::new(settings);
    let mut agent = orchestrator.build_agent(model.as_deref())?;

    println!("\n{}", style("Veileder").bold().cyan());
    println!(
        "{}\n",
        style("Ask about the course. Type 'exit' to quit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Good luck with the course!");
            break;
        }

        let spinner = Output::spinner("Thinking...");
        match agent.submit(input).await {
            Ok(response) => {
                spinner.finish_and_clear();
                println!("\n{} {}\n", style("Veileder:").cyan().bold(), response.text);
                Output::citations(&response.citations);
            }
            Err(e) => {
                spinner.finish_and_clear();
                Output::error(&format!("Error: {}", e));
                if e.is_retryable() {
                    Output::info("That one is safe to retry.");
                }
            }
        }
    }

    Ok(())
}
