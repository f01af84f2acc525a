//! # dojo-llm - Chat models for dojo agents
//!
//! Message types, the [`ChatModel`] trait and a single OpenAI-compatible
//! client that reaches every supported provider.
//!
//! Agents name their model with an identifier string such as
//! `openai:gpt-4o` or `deepseek/deepseek-chat`; [`init_chat_model`] parses it,
//! resolves the provider's API key and endpoint from the environment and
//! returns a ready client.
//!
//! ```rust,no_run
//! use dojo_llm::{init_chat_model, ChatModel, ChatRequest, Message, ModelIdentifier};
//!
//! # async fn run() -> dojo_llm::Result<()> {
//! let model = init_chat_model(&ModelIdentifier::parse("openai:gpt-4o")?)?;
//! let reply = model
//!     .chat(ChatRequest::new(vec![Message::user("Hello!")]))
//!     .await?;
//! println!("{}", reply.message.content);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod identifier;
pub mod messages;
pub mod model;
pub mod openai;

pub use config::RemoteLlmConfig;
pub use error::{LlmError, Result};
pub use identifier::{ModelIdentifier, Provider};
pub use messages::{add_messages, Message, MessageRole, ToolCall};
pub use model::{ChatConfig, ChatModel, ChatRequest, ChatResponse, ToolDefinition, UsageMetadata};
pub use openai::OpenAiCompatibleClient;

use std::sync::Arc;

/// Build a chat model client for `id` using credentials from the environment.
///
/// Fails when the provider's API key variable is unset, which is what makes a
/// misconfigured server refuse to start.
pub fn init_chat_model(id: &ModelIdentifier) -> Result<Arc<dyn ChatModel>> {
    let config = RemoteLlmConfig::from_identifier(id)?;
    tracing::info!(provider = %id.provider, model = %id.model, base_url = %config.base_url, "initialised chat model");
    Ok(Arc::new(OpenAiCompatibleClient::new(config)?))
}
