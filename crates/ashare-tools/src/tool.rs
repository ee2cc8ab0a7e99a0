//! Tool trait definition

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Error produced by tool execution
///
/// Category tools encode upstream data failures inside their JSON result
/// rather than returning `Err`, so in practice this surfaces only parameter
/// problems and serialization faults.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Parameters did not match the tool's input schema
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Result could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Tool failed while executing
    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),
}

/// Trait for tools that the agent can execute
///
/// Each tool must provide a name, description, and JSON schema for its
/// input. The LLM uses the schema to generate valid tool calls.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with given parameters
    ///
    /// `params` is the tool input as a JSON value matching `input_schema`.
    async fn execute(&self, params: Value) -> crate::Result<Value>;

    /// Get the tool's name (unique within a registry)
    fn name(&self) -> &str;

    /// Get the tool's description, shown to the LLM
    fn description(&self) -> &str;

    /// Get the tool's input schema (JSON Schema format)
    fn input_schema(&self) -> Value;
}
