//! Chat-completion backend seam.
//!
//! The runtime talks to the model through [`ChatBackend`]: one call in, one
//! outcome out. The backend either produces final text or requests tool
//! calls; retries on transient network failure are its own concern.

use crate::conversation::{Role, ToolCallRequest, Turn};
use crate::error::{Result, VeilederError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionCall,
};
use async_trait::async_trait;

/// What the backend produced for one completion request.
#[derive(Debug)]
pub enum CompletionOutcome {
    /// Final text answer; the turn is done.
    Message(String),
    /// The model wants tool results before answering.
    ToolCalls(Vec<ToolCallRequest>),
}

/// Trait for chat-completion backends.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send the system prompt, conversation so far, and tool catalog to the
    /// model and return its next step.
    async fn complete(
        &self,
        system_prompt: &str,
        turns: &[Turn],
        tools: &[ChatCompletionTool],
    ) -> Result<CompletionOutcome>;
}

/// Production backend on the OpenAI chat-completions API.
pub struct OpenAiBackend {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl OpenAiBackend {
    /// Create a backend for the given model.
    pub fn new(model: &str, temperature: f32, max_tokens: Option<u32>) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            temperature,
            max_tokens,
        }
    }

    fn build_messages(
        system_prompt: &str,
        turns: &[Turn],
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(|e| VeilederError::OpenAI(e.to_string()))?
                .into()];

        for turn in turns {
            let message: ChatCompletionRequestMessage = match turn.role {
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.as_str())
                    .build()
                    .map_err(|e| VeilederError::OpenAI(e.to_string()))?
                    .into(),
                Role::Assistant if !turn.tool_calls.is_empty() => {
                    let tool_calls: Vec<ChatCompletionMessageToolCall> = turn
                        .tool_calls
                        .iter()
                        .map(|call| ChatCompletionMessageToolCall {
                            id: call.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: call.name.clone(),
                                arguments: call.arguments.clone(),
                            },
                        })
                        .collect();
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .tool_calls(tool_calls)
                        .build()
                        .map_err(|e| VeilederError::OpenAI(e.to_string()))?
                        .into()
                }
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.as_str())
                    .build()
                    .map_err(|e| VeilederError::OpenAI(e.to_string()))?
                    .into(),
                Role::Tool => ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(turn.tool_call_id.clone().unwrap_or_default())
                    .content(turn.content.as_str())
                    .build()
                    .map_err(|e| VeilederError::OpenAI(e.to_string()))?
                    .into(),
            };
            messages.push(message);
        }

        Ok(messages)
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn complete(
        &self,
        system_prompt: &str,
        turns: &[Turn],
        tools: &[ChatCompletionTool],
    ) -> Result<CompletionOutcome> {
        let messages = Self::build_messages(system_prompt, turns)?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature);
        if !tools.is_empty() {
            builder.tools(tools.to_vec());
        }
        if let Some(max_tokens) = self.max_tokens {
            builder.max_completion_tokens(max_tokens);
        }
        let request = builder
            .build()
            .map_err(|e| VeilederError::OpenAI(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| VeilederError::BackendUnavailable(format!("Chat API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| VeilederError::BackendUnavailable("No response from model".to_string()))?;

        match choice.message.tool_calls {
            Some(tool_calls) if !tool_calls.is_empty() => {
                let requests = tool_calls
                    .into_iter()
                    .map(|call| ToolCallRequest {
                        id: call.id,
                        name: call.function.name,
                        arguments: call.function.arguments,
                    })
                    .collect();
                Ok(CompletionOutcome::ToolCalls(requests))
            }
            _ => Ok(CompletionOutcome::Message(
                choice.message.content.unwrap_or_default(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_messages_maps_roles() {
        let turns = vec![
            Turn::user("what is a pointer?"),
            Turn::tool_request(vec![ToolCallRequest {
                id: "call_1".to_string(),
                name: "search_course_notes".to_string(),
                arguments: r#"{"query": "pointers"}"#.to_string(),
            }]),
            Turn::tool("call_1", "Found 1 results: ..."),
            Turn::assistant("A pointer stores an address."),
        ];

        let messages = OpenAiBackend::build_messages("be helpful", &turns).unwrap();
        // System message plus the four turns.
        assert_eq!(messages.len(), 5);
        assert!(matches!(
            messages[0],
            ChatCompletionRequestMessage::System(_)
        ));
        assert!(matches!(messages[1], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(
            messages[2],
            ChatCompletionRequestMessage::Assistant(_)
        ));
        assert!(matches!(messages[3], ChatCompletionRequestMessage::Tool(_)));
        assert!(matches!(
            messages[4],
            ChatCompletionRequestMessage::Assistant(_)
        ));
    }
}
