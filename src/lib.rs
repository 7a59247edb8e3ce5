//! Veileder - a retrieval-augmented course tutoring agent.
//!
//! The name "Veileder" comes from the Norwegian word for "guide."
//!
//! # Overview
//!
//! Veileder wires a set of course-content retrievers (notes, textbook,
//! knowledge components, logistics, overview, course name) to an
//! OpenAI-compatible chat backend. Each retriever is exposed to the model
//! as a named tool; a fixed tutoring prompt governs the persona; and one
//! [`agent::AgentRuntime`] per conversation drives a bounded tool-dispatch
//! loop with all-or-nothing turn semantics.
//!
//! # Architecture
//!
//! - `config` - settings and the system prompt policy
//! - `embedding` - query embedding (external collaborator seam)
//! - `retriever` - retriever specs, registry, and document collections
//! - `tools` - retrievers wrapped as model-invokable tools
//! - `conversation` - the append-only turn log
//! - `agent` - the chat backend seam and the runtime state machine
//! - `orchestrator` - explicit assembly of the whole graph
//!
//! # Example
//!
//! ```rust,no_run
//! use veileder::config::Settings;
//! use veileder::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings);
//!     let mut agent = orchestrator.build_agent(None)?;
//!
//!     let response = agent.submit("How do I declare an array in C?").await?;
//!     println!("{}", response.text);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod retriever;
pub mod tools;

pub use error::{Result, VeilederError};
