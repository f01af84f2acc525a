//! Provider-agnostic chat model interface.

use crate::error::Result;
use crate::messages::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Definition of a tool/function the model may call.
///
/// `parameters` is a JSON Schema object describing the arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: None,
        }
    }

    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

/// Generation settings for a single request
#[derive(Debug, Clone, Default)]
pub struct ChatConfig {
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
    pub tools: Vec<ToolDefinition>,
}

/// A request to a chat model: messages plus generation settings.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub config: ChatConfig,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            config: ChatConfig::default(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.config.tools = tools;
        self
    }

    /// Bind one more tool, ignoring it if a tool with the same name is bound
    pub fn bind_tool(&mut self, tool: ToolDefinition) {
        if !self.config.tools.iter().any(|t| t.name == tool.name) {
            self.config.tools.push(tool);
        }
    }
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub total_tokens: usize,
}

impl UsageMetadata {
    pub fn new(input_tokens: usize, output_tokens: usize) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }
    }
}

/// The assistant's reply plus provider metadata
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub message: Message,
    pub usage: Option<UsageMetadata>,
    /// Provider details such as `model` and `finish_reason`
    pub metadata: HashMap<String, Value>,
}

impl ChatResponse {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            usage: None,
            metadata: HashMap::new(),
        }
    }
}

/// Core trait for chat-based language models.
///
/// Implementations convert messages to their provider's wire format, make the
/// call and return the assistant message, including any tool calls. They must
/// be `Send + Sync`; agents hold them as `Arc<dyn ChatModel>`.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a complete reply for `request`.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Model name as sent to the provider
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct EchoModel;

    #[async_trait]
    impl ChatModel for EchoModel {
        async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
            let last = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(ChatResponse::new(Message::assistant(last)))
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_trait_object() {
        let model: Arc<dyn ChatModel> = Arc::new(EchoModel);
        let response = model
            .chat(ChatRequest::new(vec![Message::user("Hi")]))
            .await
            .unwrap();

        assert_eq!(response.message.content, "Hi");
        assert_eq!(model.model_name(), "echo");
    }

    #[test]
    fn test_bind_tool_skips_duplicates() {
        let mut request = ChatRequest::new(Vec::new())
            .with_tools(vec![ToolDefinition::new("search", "Search the web")]);

        request.bind_tool(ToolDefinition::new("search", "Another search"));
        request.bind_tool(ToolDefinition::new("setTheme", "Change the UI theme"));

        let names: Vec<_> = request.config.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["search", "setTheme"]);
        assert_eq!(request.config.tools[0].description, "Search the web");
    }

    #[test]
    fn test_usage_totals() {
        assert_eq!(UsageMetadata::new(10, 5).total_tokens, 15);
    }
}
