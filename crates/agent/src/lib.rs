//! The template agent: a bounded tool-call loop that lets the model look up
//! CloudFormation schemas before it commits to a template.
//!
//! 1. **Seed** the conversation with a system prompt and the user's request
//! 2. **Send** the whole history to the LLM
//! 3. **If tool calls**: run them in order, append one result message, go to 2
//! 4. **If text**: that text is the template
//!
//! The number of tool rounds is capped; a model that keeps asking for tools
//! past the cap is treated as stuck.

pub mod engine;
pub mod error;
pub mod prompts;
pub mod task;

#[cfg(test)]
mod test_helpers;

pub use engine::{TemplateEngine, TemplateRun};
pub use error::AgentError;
pub use task::{TaskKind, TemplateTask};
