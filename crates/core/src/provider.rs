//! Provider trait - the abstraction over LLM backends.
//!
//! A Provider knows how to send a conversation to an LLM and get exactly one
//! assistant message back. Whether that message is a final answer or a batch
//! of tool calls is decided once, by [`ProviderResponse::into_turn`], so the
//! agent loop never inspects raw messages.
//!
//! Implementations: OpenAI-compatible endpoints and Anthropic.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;
use crate::message::Message;
use crate::tool::ToolCall;

/// Configuration for a provider request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "gpt-4o-mini")
    pub model: String,

    /// The conversation messages, oldest first
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Available tools the model can call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

fn default_temperature() -> f32 {
    0.4
}

/// A tool definition sent to the LLM so it knows what tools it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated assistant message
    pub message: Message,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// What the model decided to do with its turn.
#[derive(Debug, Clone)]
pub enum AssistantTurn {
    /// Plain answer; the conversation is over.
    Final { message: Message },

    /// The model wants tool output first. `calls` mirrors
    /// `message.tool_calls`, with arguments already decoded.
    ToolCalls { message: Message, calls: Vec<ToolCall> },
}

impl ProviderResponse {
    /// Classify the response. Having at least one tool call is the only
    /// thing that keeps the loop going.
    pub fn into_turn(self) -> AssistantTurn {
        let message = self.message;
        if !message.has_tool_calls() {
            return AssistantTurn::Final { message };
        }

        let calls = message
            .tool_calls
            .iter()
            .map(|tc| ToolCall {
                id: tc.id.clone(),
                name: tc.name.clone(),
                arguments: decode_arguments(&tc.arguments),
            })
            .collect();
        AssistantTurn::ToolCalls { message, calls }
    }
}

/// Models occasionally send an empty string or malformed JSON as arguments.
/// Empty becomes `{}`; anything unparseable is passed through as a JSON
/// string so the tool can report it back.
fn decode_arguments(raw: &str) -> serde_json::Value {
    if raw.trim().is_empty() {
        return serde_json::Value::Object(serde_json::Map::new());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

/// The core Provider trait.
///
/// The agent loop calls `complete()` without knowing which backend is behind
/// it.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai", "anthropic").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: ProviderRequest) -> std::result::Result<ProviderResponse, ProviderError>;
}
