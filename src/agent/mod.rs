//! The conversational agent runtime.

mod backend;
mod runtime;

pub use backend::{ChatBackend, CompletionOutcome, OpenAiBackend};
pub use runtime::{
    AgentConfig, AgentRuntime, AssistantResponse, Citation, ParseErrorPolicy, RuntimeState,
};
