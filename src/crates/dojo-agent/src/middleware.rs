//! Agent middleware
//!
//! Middleware wraps every model call of a run. `before_model` may rewrite the
//! outgoing request (bind tools, extend the system prompt); `after_model`
//! inspects the reply and decides whether the run keeps going.

use crate::error::Result;
use crate::events::RunContext;
use async_trait::async_trait;
use dojo_llm::{ChatRequest, Message, MessageRole};

/// What the run loop should do after a model turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelDirective {
    /// Keep looping while the model calls tools
    Continue,
    /// Stop after this turn's backend tool calls and hand control back to the
    /// client
    EndRun,
}

#[async_trait]
pub trait AgentMiddleware: Send + Sync {
    fn name(&self) -> &str;

    async fn before_model(&self, _ctx: &RunContext, _request: &mut ChatRequest) -> Result<()> {
        Ok(())
    }

    async fn after_model(&self, _ctx: &RunContext, _reply: &Message) -> Result<ModelDirective> {
        Ok(ModelDirective::Continue)
    }
}

/// Bridges a CopilotKit client into the run.
///
/// Frontend actions sent with the run are bound as tools on each request, and
/// the run's context items are appended to the system prompt. When the model
/// calls a frontend action the run ends so the client can execute it and send
/// the result back on the next run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopilotKitMiddleware;

impl CopilotKitMiddleware {
    pub const NAME: &'static str = "CopilotKitMiddleware";

    pub fn new() -> Self {
        Self
    }

    fn render_context(ctx: &RunContext) -> Option<String> {
        if ctx.context.is_empty() {
            return None;
        }
        let lines: Vec<String> = ctx
            .context
            .iter()
            .map(|item| format!("- {}: {}", item.description, item.value))
            .collect();
        Some(format!("App context:\n{}", lines.join("\n")))
    }
}

#[async_trait]
impl AgentMiddleware for CopilotKitMiddleware {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn before_model(&self, ctx: &RunContext, request: &mut ChatRequest) -> Result<()> {
        for tool in &ctx.frontend_tools {
            request.bind_tool(tool.clone());
        }

        if let Some(context) = Self::render_context(ctx) {
            let system = request
                .messages
                .first_mut()
                .filter(|first| first.role == MessageRole::System);
            match system {
                Some(first) => {
                    first.content.push_str("\n\n");
                    first.content.push_str(&context);
                }
                None => request.messages.insert(0, Message::system(context)),
            }
        }
        Ok(())
    }

    async fn after_model(&self, ctx: &RunContext, reply: &Message) -> Result<ModelDirective> {
        let frontend_call = reply
            .tool_calls
            .iter()
            .find(|call| ctx.is_frontend_tool(&call.name));

        match frontend_call {
            Some(call) => {
                tracing::debug!(tool = %call.name, run_id = %ctx.run_id, "frontend action requested, ending run");
                Ok(ModelDirective::EndRun)
            }
            None => Ok(ModelDirective::Continue),
        }
    }
}
