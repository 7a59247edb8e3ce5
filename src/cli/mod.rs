//! CLI module for Veileder.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Veileder - a retrieval-augmented course tutoring agent
///
/// Wires course-content retrievers to a chat model and answers student
/// questions with citations. The name "Veileder" is Norwegian for "guide."
#[derive(Parser, Debug)]
#[command(name = "veileder")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive tutoring session
    Chat {
        /// Chat model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Ask a single question and print the answer with citations
    Ask {
        /// The question to ask
        question: String,

        /// Chat model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List the retrieval tools exposed to the model
    Tools,

    /// Check configuration, credentials, and collection files
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
