//! Configuration for Veileder.

mod prompts;
mod settings;

pub use prompts::{PromptPolicy, DEFAULT_SYSTEM_PROMPT};
pub use settings::{
    AgentSettings, EmbeddingSettings, GeneralSettings, PromptSettings, RetrievalSettings, Settings,
};
