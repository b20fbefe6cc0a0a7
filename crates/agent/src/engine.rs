//! The template agent loop.
//!
//! ```text
//! seed ──► model ──► final text ──► done
//!            ▲  │
//!            │  └─► tool calls ──► run every call in order
//!            │                         │
//!            └──── one tool-result message
//! ```
//!
//! The loop ends on the first reply without tool calls. A reply that asks
//! for tools after the budget is spent aborts with
//! [`AgentError::LoopExhausted`].

use std::sync::Arc;
use std::time::Duration;

use stackwright_config::AppConfig;
use stackwright_core::message::{Conversation, Message, ToolResultPart};
use stackwright_core::provider::{
    AssistantTurn, Provider, ProviderRequest, ProviderResponse, ToolDefinition,
};
use stackwright_core::tool::{ToolCall, ToolRegistry};
use tracing::{debug, info, warn};

use crate::error::AgentError;
use crate::task::TemplateTask;

pub const DEFAULT_MAX_TOOL_ITERATIONS: u32 = 30;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct TemplateRun {
    /// Text of the final assistant message.
    pub text: String,
    /// Full history: system prompt, seed, every tool round, final answer.
    pub conversation: Conversation,
    /// How many tool rounds ran before the final answer.
    pub tool_cycles: u32,
}

/// Drives a model through schema lookups until it returns a template.
pub struct TemplateEngine {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    tools: Arc<ToolRegistry>,
    max_iterations: u32,
    request_timeout: Duration,
}

impl TemplateEngine {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.4,
            max_tokens: None,
            tools,
            max_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Engine with temperature, token limit, budget and timeout taken from
    /// the configuration.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        tools: Arc<ToolRegistry>,
        config: &AppConfig,
    ) -> Self {
        Self::new(provider, model, tools)
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens)
            .with_max_iterations(config.agent.max_tool_iterations)
            .with_request_timeout(Duration::from_secs(config.agent.request_timeout_secs))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set the maximum number of tool rounds per run.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Create a template from `instructions`, following the style of
    /// `samples` when given.
    pub async fn generate(&self, instructions: &str, samples: Option<&str>) -> Result<String, AgentError> {
        self.run(TemplateTask::create(instructions, samples))
            .await
            .map(|run| run.text)
    }

    /// Rewrite `source` according to `instructions`.
    pub async fn transform(&self, instructions: &str, source: &str) -> Result<String, AgentError> {
        self.run(TemplateTask::transform(instructions, source))
            .await
            .map(|run| run.text)
    }

    /// Run a task to completion.
    pub async fn run(&self, task: TemplateTask) -> Result<TemplateRun, AgentError> {
        let mut conversation = Conversation::new();
        conversation.push(Message::system(task.system_prompt));
        conversation.push(Message::user(task.seed));

        info!(
            conversation_id = %conversation.id,
            kind = ?task.kind,
            model = %self.model,
            "Starting template run"
        );

        let definitions = self.tools.definitions();
        let mut budget = self.max_iterations;
        let mut tool_cycles = 0;

        loop {
            let response = self.call_model(&conversation, &definitions).await?;

            let (message, calls) = match response.into_turn() {
                AssistantTurn::Final { message } => {
                    let text = message.content.clone();
                    conversation.push(message);
                    info!(
                        conversation_id = %conversation.id,
                        tool_cycles,
                        "Template run finished"
                    );
                    return Ok(TemplateRun {
                        text,
                        conversation,
                        tool_cycles,
                    });
                }
                AssistantTurn::ToolCalls { message, calls } => (message, calls),
            };

            if budget == 0 {
                warn!(
                    conversation_id = %conversation.id,
                    iterations = self.max_iterations,
                    "Tool budget spent, model still asking for tools"
                );
                return Err(AgentError::LoopExhausted {
                    iterations: self.max_iterations,
                });
            }

            debug!(
                conversation_id = %conversation.id,
                cycle = tool_cycles + 1,
                calls = calls.len(),
                "Executing tool calls"
            );

            conversation.push(message);
            let results = self.execute_calls(&calls).await;
            conversation.push(Message::tool_results(results));

            budget -= 1;
            tool_cycles += 1;
        }
    }

    async fn call_model(
        &self,
        conversation: &Conversation,
        definitions: &[ToolDefinition],
    ) -> Result<ProviderResponse, AgentError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: conversation.messages.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: definitions.to_vec(),
        };

        let response = tokio::time::timeout(self.request_timeout, self.provider.complete(request))
            .await
            .map_err(|_| AgentError::ModelTimeout {
                secs: self.request_timeout.as_secs(),
            })??;

        if let Some(usage) = &response.usage {
            debug!(
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Model replied"
            );
        }

        Ok(response)
    }

    /// Run every call in order. Tool failures become `Error: ...` text for
    /// the model to read; they never end the run.
    async fn execute_calls(&self, calls: &[ToolCall]) -> Vec<ToolResultPart> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            let content = match self.tools.execute(call).await {
                Ok(result) => {
                    debug!(tool = %call.name, success = result.success, "Tool executed");
                    result.output
                }
                Err(e) => {
                    warn!(tool = %call.name, error = %e, "Tool execution failed");
                    format!("Error: {e}")
                }
            };
            results.push(ToolResultPart {
                tool_call_id: call.id.clone(),
                content,
            });
        }
        results
    }
}
