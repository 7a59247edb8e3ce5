//! Agent runtime: the bounded tool-dispatch state machine.
//!
//! One runtime owns one conversation. `submit` is the single external
//! operation; it takes `&mut self`, so a second call while one is in flight
//! is rejected by the borrow checker rather than at runtime. Every exit
//! path, success or failure, leaves the machine in `Idle`, and a failed
//! turn is rolled back as a unit so the conversation never records a
//! half-finished exchange.

use super::backend::{ChatBackend, CompletionOutcome};
use crate::config::PromptPolicy;
use crate::conversation::{ConversationState, ToolCallRequest, Turn};
use crate::error::{Result, VeilederError};
use crate::tools::{format_tool_result, parse_query_arguments, ToolCatalog};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Reply used when the tool-dispatch loop hits its iteration cap without
/// the model ever producing a final answer.
const FALLBACK_REPLY: &str =
    "I couldn't finish looking that up within my search budget. Could you narrow the question \
     down, or point me at the part you're stuck on?";

/// What to do when the model emits a malformed tool-call payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParseErrorPolicy {
    /// Fail the whole turn with a parse error.
    Surface,
    /// Substitute an empty tool result and keep the conversation alive.
    #[default]
    Recover,
}

/// Runtime configuration, decided once at construction.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Upper bound on tool-dispatch round-trips per turn.
    pub max_tool_iterations: usize,
    /// Malformed tool-call handling.
    pub parse_error_policy: ParseErrorPolicy,
    /// Deadline applied to each backend call and each tool invocation.
    pub request_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_iterations: 4,
            parse_error_policy: ParseErrorPolicy::Recover,
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Where the runtime is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    /// No request in flight.
    Idle,
    /// A completion request is in flight to the chat backend.
    AwaitingModel,
    /// Resolving tool calls the backend asked for.
    ToolDispatch,
    /// Final text received, appending the assistant turn.
    Responding,
}

/// A source reference extracted from tool results during a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Source identifier (file, document, or section name).
    pub source: String,
    /// Locator within the source (page or section), when available.
    pub locator: Option<String>,
}

/// The answer produced by one `submit` call.
#[derive(Debug, Clone)]
pub struct AssistantResponse {
    /// Final assistant text.
    pub text: String,
    /// Sources surfaced by the tools dispatched during this turn, in
    /// dispatch order, deduplicated.
    pub citations: Vec<Citation>,
    /// Correlation identifier for this turn.
    pub run_id: Uuid,
}

/// Conversational agent over a prompt, a tool catalog, and a chat backend.
pub struct AgentRuntime {
    backend: Arc<dyn ChatBackend>,
    catalog: ToolCatalog,
    prompt: PromptPolicy,
    conversation: ConversationState,
    config: AgentConfig,
    state: RuntimeState,
    tool_definitions: Vec<async_openai::types::ChatCompletionTool>,
}

impl AgentRuntime {
    /// Create a runtime. The tool schemas are derived from the catalog once,
    /// here; the catalog is immutable afterwards.
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        catalog: ToolCatalog,
        prompt: PromptPolicy,
        config: AgentConfig,
    ) -> Self {
        let tool_definitions = catalog.openai_definitions();
        Self {
            backend,
            catalog,
            prompt,
            conversation: ConversationState::new(),
            config,
            state: RuntimeState::Idle,
            tool_definitions,
        }
    }

    /// Current state-machine position. `Idle` whenever no `submit` call is
    /// in flight.
    pub fn state(&self) -> RuntimeState {
        self.state
    }

    /// The conversation log.
    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    /// Submit a user message and produce a response.
    ///
    /// On success the conversation gains exactly one user turn, any
    /// intermediate tool-request/tool turns, and one terminal assistant
    /// turn. On failure the conversation is restored to its pre-call state.
    /// Hitting the iteration cap is recovered: the turn completes with a
    /// fixed fallback reply instead of an error.
    pub async fn submit(&mut self, user_text: &str) -> Result<AssistantResponse> {
        if user_text.trim().is_empty() {
            return Err(VeilederError::InvalidInput(
                "User message must not be empty".to_string(),
            ));
        }

        let run_id = Uuid::new_v4();
        let checkpoint = self.conversation.checkpoint();
        let mut citations = Vec::new();

        info!(%run_id, "Starting turn");

        let result = self.run_turn(user_text, &mut citations).await;
        self.state = RuntimeState::Idle;

        match result {
            Ok(text) => Ok(AssistantResponse {
                text,
                citations,
                run_id,
            }),
            Err(VeilederError::IterationLimit(max)) => {
                warn!(%run_id, "Tool dispatch loop hit the {}-iteration cap, falling back", max);
                self.conversation.push(Turn::assistant(FALLBACK_REPLY));
                Ok(AssistantResponse {
                    text: FALLBACK_REPLY.to_string(),
                    citations,
                    run_id,
                })
            }
            Err(e) => {
                self.conversation.rollback_to(checkpoint);
                warn!(%run_id, "Turn failed and was rolled back: {}", e);
                Err(e)
            }
        }
    }

    /// Drive the AwaitingModel / ToolDispatch cycle until the backend
    /// produces final text or the iteration cap is hit.
    async fn run_turn(&mut self, user_text: &str, citations: &mut Vec<Citation>) -> Result<String> {
        self.conversation.push(Turn::user(user_text));

        for iteration in 1..=self.config.max_tool_iterations {
            self.state = RuntimeState::AwaitingModel;
            debug!("Completion round {} of {}", iteration, self.config.max_tool_iterations);

            let outcome = tokio::time::timeout(
                self.config.request_timeout,
                self.backend.complete(
                    self.prompt.as_str(),
                    self.conversation.turns(),
                    &self.tool_definitions,
                ),
            )
            .await
            .map_err(|_| VeilederError::Timeout)??;

            match outcome {
                CompletionOutcome::Message(text) => {
                    self.state = RuntimeState::Responding;
                    self.conversation.push(Turn::assistant(&text));
                    return Ok(text);
                }
                CompletionOutcome::ToolCalls(calls) => {
                    self.state = RuntimeState::ToolDispatch;
                    self.conversation.push(Turn::tool_request(calls.clone()));

                    // Sequential dispatch in the order the backend requested
                    // the calls keeps result ordering deterministic.
                    for call in &calls {
                        let result_text = self.dispatch(call, citations).await?;
                        self.conversation.push(Turn::tool(&call.id, &result_text));
                    }
                }
            }
        }

        Err(VeilederError::IterationLimit(self.config.max_tool_iterations))
    }

    /// Resolve a single tool call to its result text.
    ///
    /// Unknown tool names and failed invocations are reported back to the
    /// model as error text rather than failing the turn; malformed argument
    /// payloads follow the configured parse-error policy.
    async fn dispatch(
        &self,
        call: &ToolCallRequest,
        citations: &mut Vec<Citation>,
    ) -> Result<String> {
        info!("Dispatching tool '{}' with args: {}", call.name, call.arguments);

        let query = match parse_query_arguments(&call.arguments) {
            Ok(query) => query,
            Err(e) => {
                return match self.config.parse_error_policy {
                    ParseErrorPolicy::Surface => Err(e),
                    ParseErrorPolicy::Recover => {
                        warn!("Recovering from malformed tool call: {}", e);
                        Ok(String::new())
                    }
                }
            }
        };

        let tool = match self.catalog.get(&call.name) {
            Ok(tool) => tool,
            Err(e) => {
                warn!("Model requested unknown tool '{}'", call.name);
                return Ok(format!("Tool error: {}", e));
            }
        };

        let invocation = tokio::time::timeout(self.config.request_timeout, tool.invoke(&query))
            .await
            .map_err(|_| VeilederError::Timeout)?;

        let documents = match invocation {
            Ok(documents) => documents,
            Err(e) => {
                warn!("Tool '{}' failed: {}", call.name, e);
                return Ok(format!("Tool error: {}", e));
            }
        };

        for doc in &documents {
            if let Some(source) = doc.source() {
                let citation = Citation {
                    source: source.to_string(),
                    locator: doc.locator().map(|l| l.to_string()),
                };
                if !citations.contains(&citation) {
                    citations.push(citation);
                }
            }
        }

        Ok(format_tool_result(&documents))
    }
}
