//! Agent loop: completion, tool dispatch, repeat
//!
//! 1. Call the model with the conversation and the registered tools
//! 2. If it requested tool use, execute the tools and append the results
//! 3. Loop until the model ends its turn or the iteration cap is hit
//!
//! Tool failures are fed back to the model as error results rather than
//! aborting the run; the model can retry or work around a missing category.

use crate::{
    AgentError, CompletionRequest, ContentBlock, LlmProvider, Message, Result, StopReason,
    ToolDefinition,
};
use ashare_tools::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum loop iterations
    pub max_iterations: usize,

    /// Model identifier
    pub model: String,

    /// System prompt
    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model: "deepseek/deepseek-chat".to_string(),
            system_prompt: None,
            max_tokens: 4000,
            temperature: Some(0.1),
        }
    }
}

/// Runs the agent loop against one provider and one tool registry
pub struct AgentExecutor {
    provider: Arc<dyn LlmProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl AgentExecutor {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
        }
    }

    /// Create a builder
    pub fn builder() -> AgentExecutorBuilder {
        AgentExecutorBuilder::new()
    }

    /// Run the loop for one user message and return the final text
    pub async fn run(&self, user_message: impl Into<String>) -> Result<String> {
        let mut conversation = vec![Message::user(user_message)];

        for iteration in 1..=self.config.max_iterations {
            info!(
                iteration,
                max_iterations = self.config.max_iterations,
                model = %self.config.model,
                "agent iteration"
            );

            let tools = self.tool_definitions();
            let mut builder = CompletionRequest::builder(&self.config.model)
                .messages(conversation.clone())
                .max_tokens(self.config.max_tokens);

            if let Some(system) = &self.config.system_prompt {
                builder = builder.system(system.clone());
            }
            if let Some(temperature) = self.config.temperature {
                builder = builder.temperature(temperature);
            }
            if !tools.is_empty() {
                builder = builder.tools(tools);
            }

            let response = self.provider.complete(builder.build()).await?;
            info!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "completion received"
            );

            conversation.push(response.message.clone());

            match response.stop_reason {
                StopReason::EndTurn => {
                    let text = response.message.text().unwrap_or_default().to_string();
                    info!(iteration, response_length = text.len(), "agent completed");
                    return Ok(text);
                }
                StopReason::ToolUse => {
                    let results = self.execute_tools(&response.message).await?;
                    if results.is_empty() {
                        warn!("tool use stop reason but no tool calls in message");
                        return Err(AgentError::UnexpectedResponse(
                            "model requested tool use without tool calls".to_string(),
                        ));
                    }
                    conversation.extend(results);
                }
                StopReason::MaxTokens => {
                    warn!("completion truncated at max tokens");
                    return Ok(response.message.text().unwrap_or_default().to_string());
                }
            }
        }

        warn!(
            max_iterations = self.config.max_iterations,
            "iteration cap reached without completion"
        );
        Err(AgentError::RequestFailed(format!(
            "agent did not finish within {} iterations",
            self.config.max_iterations
        )))
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tool_registry
            .list_tools()
            .iter()
            .map(|tool| ToolDefinition::new(tool.name(), tool.description(), tool.input_schema()))
            .collect()
    }

    async fn execute_tools(&self, message: &Message) -> Result<Vec<Message>> {
        let mut results = Vec::new();

        for tool_use in message.tool_uses() {
            let ContentBlock::ToolUse { id, name, input } = tool_use else {
                continue;
            };

            debug!(tool = %name, id = %id, "executing tool");
            let tool = self
                .tool_registry
                .get(name)
                .ok_or_else(|| AgentError::ToolNotFound(name.clone()))?;

            match tool.execute(input.clone()).await {
                Ok(result) => {
                    let result_str =
                        serde_json::to_string(&result).unwrap_or_else(|_| result.to_string());
                    debug!(tool = %name, result_length = result_str.len(), "tool succeeded");
                    results.push(Message::tool_result(id.clone(), result_str));
                }
                Err(e) => {
                    warn!(tool = %name, error = %e, "tool failed");
                    results.push(Message::tool_error(id.clone(), format!("Error: {e}")));
                }
            }
        }

        Ok(results)
    }
}

/// Builder for [`AgentExecutor`]
pub struct AgentExecutorBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl AgentExecutorBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tool_registry: Arc::new(ToolRegistry::new()),
            config: ExecutorConfig::default(),
        }
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the tool registry
    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = registry;
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Set max tokens per completion
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    /// Set the iteration cap
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    /// Build the executor
    pub fn build(self) -> Result<AgentExecutor> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Configuration("provider not set".to_string()))?;

        Ok(AgentExecutor::new(provider, self.tool_registry, self.config))
    }
}

impl Default for AgentExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompletionResponse, MessageContent, Role, TokenUsage};
    use ashare_tools::Tool;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    /// Provider that replays a fixed script of responses
    struct ScriptedProvider {
        responses: Mutex<Vec<CompletionResponse>>,
    }

    impl ScriptedProvider {
        fn new(mut responses: Vec<CompletionResponse>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse> {
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| AgentError::RequestFailed("script exhausted".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct StubQuoteTool;

    #[async_trait]
    impl Tool for StubQuoteTool {
        async fn execute(&self, _params: Value) -> ashare_tools::Result<Value> {
            Ok(json!({"latest_price": 1685.0}))
        }

        fn name(&self) -> &str {
            "get_live_quote"
        }

        fn description(&self) -> &str {
            "stub quote"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }
    }

    fn text_response(text: &str, stop_reason: StopReason) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason,
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 5,
            },
        }
    }

    fn tool_use_response() -> CompletionResponse {
        CompletionResponse {
            message: Message {
                role: Role::Assistant,
                content: Some(MessageContent::Blocks(vec![ContentBlock::ToolUse {
                    id: "call_1".to_string(),
                    name: "get_live_quote".to_string(),
                    input: json!({"symbol": "600519"}),
                }])),
            },
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 5,
            },
        }
    }

    #[tokio::test]
    async fn test_plain_completion() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response(
            "Report text",
            StopReason::EndTurn,
        )]));

        let executor = AgentExecutor::builder()
            .provider(provider)
            .build()
            .unwrap();

        let result = executor.run("Analyze 600519").await.unwrap();
        assert_eq!(result, "Report text");
    }

    #[tokio::test]
    async fn test_tool_use_then_completion() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_use_response(),
            text_response("Report with quote data", StopReason::EndTurn),
        ]));

        let registry = Arc::new(ToolRegistry::new());
        registry.register(Arc::new(StubQuoteTool));

        let executor = AgentExecutor::builder()
            .provider(provider)
            .tool_registry(registry)
            .build()
            .unwrap();

        let result = executor.run("Analyze 600519").await.unwrap();
        assert_eq!(result, "Report with quote data");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_an_error() {
        let provider = Arc::new(ScriptedProvider::new(vec![tool_use_response()]));

        let executor = AgentExecutor::builder()
            .provider(provider)
            .build()
            .unwrap();

        let result = executor.run("Analyze 600519").await;
        assert!(matches!(result, Err(AgentError::ToolNotFound(_))));
    }

    #[tokio::test]
    async fn test_iteration_cap() {
        let responses: Vec<CompletionResponse> = (0..3).map(|_| tool_use_response()).collect();
        let provider = Arc::new(ScriptedProvider::new(responses));

        let registry = Arc::new(ToolRegistry::new());
        registry.register(Arc::new(StubQuoteTool));

        let executor = AgentExecutor::builder()
            .provider(provider)
            .tool_registry(registry)
            .max_iterations(2)
            .build()
            .unwrap();

        let result = executor.run("Analyze 600519").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_default_config() {
        let config = ExecutorConfig::default();
        assert_eq!(config.model, "deepseek/deepseek-chat");
        assert_eq!(config.max_tokens, 4000);
        assert_eq!(config.temperature, Some(0.1));
    }
}
