//! # Stackwright Core
//!
//! Domain types, traits, and error definitions shared by every Stackwright
//! crate. Nothing in here talks to the network or the filesystem.
//!
//! The two seams the rest of the workspace implements against:
//! - [`Provider`]: send a conversation to an LLM, get one assistant message back
//! - [`Tool`]: a named capability the LLM may call before answering

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{ProviderError, ToolError};
pub use message::{Conversation, ConversationId, Message, MessageToolCall, Role, ToolResultPart};
pub use provider::{AssistantTurn, Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
