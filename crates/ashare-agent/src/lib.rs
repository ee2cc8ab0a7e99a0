//! LLM provider layer and agent loop for the A-share analyst
//!
//! The conversation model follows the content-block shape (text, tool use,
//! tool result); [`OpenAiProvider`] translates it to the
//! `/chat/completions` wire protocol, so any OpenAI-compatible endpoint
//! works. [`AgentExecutor`] drives the gather-then-write loop with the
//! market data tools, and [`prompt`] builds the analyst task.

pub mod completion;
pub mod error;
pub mod executor;
pub mod messages;
pub mod openai;
pub mod prompt;
pub mod provider;

pub use completion::{
    CompletionRequest, CompletionRequestBuilder, CompletionResponse, StopReason, TokenUsage,
};
pub use error::{AgentError, Result};
pub use executor::{AgentExecutor, AgentExecutorBuilder, ExecutorConfig};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use provider::{LlmProvider, ToolDefinition};
