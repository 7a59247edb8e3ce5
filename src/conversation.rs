//! Conversation state: an append-only log of turns.
//!
//! One `ConversationState` is owned by exactly one agent runtime; there is
//! no shared or global buffer. Turns are never reordered or deduplicated.
//! The checkpoint/rollback pair exists so a failed turn can be undone as a
//! unit, keeping the log consistent with the all-or-nothing turn guarantee.

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

/// A tool call requested by the chat backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Backend-assigned correlation ID for this call.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// Raw JSON arguments payload.
    pub arguments: String,
}

/// One message in the conversation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    /// Set on tool turns: which backend call this result answers.
    pub tool_call_id: Option<String>,
    /// Set on assistant turns that requested tool calls.
    pub tool_calls: Vec<ToolCallRequest>,
}

impl Turn {
    /// A user message.
    pub fn user(content: &str) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }

    /// A final assistant text message.
    pub fn assistant(content: &str) -> Self {
        Self {
            role: Role::Assistant,
            content: content.to_string(),
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }

    /// An assistant turn requesting tool calls.
    pub fn tool_request(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            role: Role::Assistant,
            content: String::new(),
            tool_call_id: None,
            tool_calls,
        }
    }

    /// A tool result answering one requested call.
    pub fn tool(tool_call_id: &str, content: &str) -> Self {
        Self {
            role: Role::Tool,
            content: content.to_string(),
            tool_call_id: Some(tool_call_id.to_string()),
            tool_calls: Vec::new(),
        }
    }
}

/// Ordered, append-only conversation log for one agent instance.
#[derive(Debug, Default)]
pub struct ConversationState {
    turns: Vec<Turn>,
}

impl ConversationState {
    /// Create an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn. Order is preserved exactly as received.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// All turns in order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the conversation has no turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Mark the current length so a failed turn can be rolled back.
    pub fn checkpoint(&self) -> usize {
        self.turns.len()
    }

    /// Discard every turn appended after the checkpoint.
    pub fn rollback_to(&mut self, checkpoint: usize) {
        self.turns.truncate(checkpoint);
    }
}
