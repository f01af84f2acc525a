//! The agent run loop
//!
//! ```text
//! restore state ─► overlay client state ─► merge messages ─► input checkpoint
//!                                                               │
//!        ┌──────────────────────────────────────────────────────┘
//!        ▼
//!   before_model ─► model ─► after_model ─► backend tool calls ─► loop checkpoint
//!        ▲                                                              │
//!        │              tool calls, no EndRun                           │
//!        └──────────────────────────────────────────────────────────────┤
//!                                                no tool calls / EndRun ▼
//!                                                                 state snapshot
//! ```

use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::events::{AgentEvent, EventSink, RunContext, RunInput};
use crate::middleware::ModelDirective;
use crate::state::{merge_client_state, StateSchema, MESSAGES_KEY};
use crate::tools::ToolRegistry;
use dojo_checkpoint::{Checkpoint, CheckpointConfig, CheckpointMetadata, CheckpointSource};
use dojo_llm::{add_messages, init_chat_model, ChatModel, ChatRequest, Message, ToolCall};
use serde_json::Value;
use std::sync::Arc;

/// A configured agent bound to a chat model.
pub struct Agent<S: StateSchema> {
    config: AgentConfig<S>,
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
}

/// Bind `config` to an already constructed model client
pub fn create_agent<S: StateSchema>(config: AgentConfig<S>, model: Arc<dyn ChatModel>) -> Agent<S> {
    let tools = ToolRegistry::from_tools(config.tools());
    tracing::info!(
        model = %config.model(),
        tools = tools.len(),
        middleware = ?config.middleware_names(),
        checkpointer = config.checkpointer().map(|c| c.name()).unwrap_or("none"),
        state_schema = S::NAME,
        "agent created"
    );
    Agent { config, model, tools }
}

impl<S: StateSchema> Agent<S> {
    /// Build the model client named in `config` from environment credentials
    pub fn from_config(config: AgentConfig<S>) -> Result<Self> {
        let model = init_chat_model(config.model())?;
        Ok(create_agent(config, model))
    }

    pub fn config(&self) -> &AgentConfig<S> {
        &self.config
    }

    /// Latest state of `thread_id`, or the default state when nothing is stored
    pub async fn load_state(&self, thread_id: &str) -> Result<S> {
        Ok(self.restore(thread_id).await?.0)
    }

    async fn restore(&self, thread_id: &str) -> Result<(S, CheckpointConfig)> {
        let config = CheckpointConfig::for_thread(thread_id);
        let Some(saver) = self.config.checkpointer() else {
            return Ok((S::default(), config));
        };

        match saver.get_tuple(&config).await? {
            Some(tuple) => {
                let state = tuple.checkpoint.to_state()?;
                Ok((state, tuple.config))
            }
            None => Ok((S::default(), config)),
        }
    }

    async fn save(
        &self,
        config: CheckpointConfig,
        state: &S,
        metadata: CheckpointMetadata,
    ) -> Result<CheckpointConfig> {
        match self.config.checkpointer() {
            Some(saver) => {
                let checkpoint = Checkpoint::from_state(state)?;
                Ok(saver.put(&config, checkpoint, metadata).await?)
            }
            None => Ok(config),
        }
    }

    /// Run to completion without streaming events
    pub async fn invoke(&self, input: RunInput) -> Result<S> {
        self.run(input, None, &EventSink::none()).await
    }

    /// Run one turn of the conversation.
    ///
    /// With a checkpointer attached the thread state is restored from it and
    /// `prior` is ignored. Without one, `prior` (e.g. a session's state) is
    /// the starting point, falling back to the default state.
    pub async fn run(&self, input: RunInput, prior: Option<S>, events: &EventSink) -> Result<S> {
        let RunInput {
            context: ctx,
            messages,
            state: client_state,
        } = input;

        tracing::info!(thread_id = %ctx.thread_id, run_id = %ctx.run_id, "run started");

        let (mut state, mut checkpoint_config) = if self.config.has_checkpointer() {
            self.restore(&ctx.thread_id).await?
        } else {
            (
                prior.unwrap_or_default(),
                CheckpointConfig::for_thread(&ctx.thread_id),
            )
        };

        if let Some(patch) = &client_state {
            state = merge_client_state(state, patch)?;
        }
        let history = std::mem::take(state.messages_mut());
        *state.messages_mut() = add_messages(history, messages);
        state.apply_run_context(&ctx);

        checkpoint_config = self
            .save(
                checkpoint_config,
                &state,
                metadata(&ctx, CheckpointSource::Input, -1),
            )
            .await?;

        let max = self.config.max_iterations();
        for step in 0..max {
            let request = self.build_request(&ctx, &state).await?;
            let response = self.model.chat(request).await?;

            let mut reply = response.message;
            let message_id = reply.ensure_id().to_string();

            let mut directive = ModelDirective::Continue;
            for middleware in self.config.middleware() {
                if middleware.after_model(&ctx, &reply).await? == ModelDirective::EndRun {
                    directive = ModelDirective::EndRun;
                }
            }

            if !reply.content.is_empty() {
                events
                    .emit(AgentEvent::TextMessage {
                        message_id: message_id.clone(),
                        content: reply.content.clone(),
                    })
                    .await;
            }
            for call in &reply.tool_calls {
                events
                    .emit(AgentEvent::ToolCall {
                        message_id: message_id.clone(),
                        call: call.clone(),
                    })
                    .await;
            }

            let tool_calls = reply.tool_calls.clone();
            push_messages(&mut state, vec![reply]);

            // Backend calls are answered even when the run ends on a frontend
            // action, so no tool call in the stored history is left open.
            if !tool_calls.is_empty() {
                let results = self.execute_tools(&ctx, &tool_calls).await;
                for message in &results {
                    events
                        .emit(AgentEvent::ToolResult {
                            message: message.clone(),
                        })
                        .await;
                }
                push_messages(&mut state, results);
            }

            checkpoint_config = self
                .save(
                    checkpoint_config,
                    &state,
                    metadata(&ctx, CheckpointSource::Loop, checkpoint_step(step)),
                )
                .await?;

            if directive == ModelDirective::EndRun || tool_calls.is_empty() {
                events.emit(AgentEvent::StateSnapshot(snapshot(&state)?)).await;
                tracing::info!(
                    thread_id = %ctx.thread_id,
                    run_id = %ctx.run_id,
                    steps = step + 1,
                    messages = state.messages().len(),
                    "run finished"
                );
                return Ok(state);
            }
        }

        tracing::warn!(thread_id = %ctx.thread_id, run_id = %ctx.run_id, max, "iteration limit reached");
        Err(AgentError::IterationLimit(max))
    }

    async fn build_request(&self, ctx: &RunContext, state: &S) -> Result<ChatRequest> {
        let mut messages = Vec::with_capacity(state.messages().len() + 1);
        if !self.config.system_prompt().is_empty() {
            messages.push(Message::system(self.config.system_prompt()));
        }
        messages.extend(state.messages().iter().cloned());

        let mut request = ChatRequest::new(messages).with_tools(self.tools.definitions());
        for middleware in self.config.middleware() {
            middleware.before_model(ctx, &mut request).await?;
        }
        Ok(request)
    }

    /// Execute backend tool calls. Failures become tool messages so the model
    /// can see and react to them.
    async fn execute_tools(&self, ctx: &RunContext, calls: &[ToolCall]) -> Vec<Message> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            if ctx.is_frontend_tool(&call.name) {
                continue;
            }
            let content = match self.tools.execute(&call.name, call.args.clone()).await {
                Ok(Value::String(text)) => text,
                Ok(value) => value.to_string(),
                Err(e) => {
                    tracing::warn!(tool = %call.name, error = %e, "tool call failed");
                    format!("Error: {}", e)
                }
            };
            let mut message = Message::tool(content, &call.id);
            message.name = Some(call.name.clone());
            message.ensure_id();
            results.push(message);
        }
        results
    }
}

fn push_messages<S: StateSchema>(state: &mut S, new: Vec<Message>) {
    let history = std::mem::take(state.messages_mut());
    *state.messages_mut() = add_messages(history, new);
}

/// Loop index as a checkpoint step, saturating at `i32::MAX`
fn checkpoint_step(step: usize) -> i32 {
    i32::try_from(step).unwrap_or(i32::MAX)
}

fn metadata(ctx: &RunContext, source: CheckpointSource, step: i32) -> CheckpointMetadata {
    CheckpointMetadata::new()
        .with_source(source)
        .with_step(step)
        .with_run_id(ctx.run_id.clone())
}

/// State as JSON without the message history
pub fn snapshot<S: StateSchema>(state: &S) -> Result<Value> {
    let mut value = serde_json::to_value(state)?;
    if let Value::Object(map) = &mut value {
        map.remove(MESSAGES_KEY);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CopilotKitState, MessagesState};
    use async_trait::async_trait;
    use serde_json::json;

    struct Fixed(&'static str);

    #[async_trait]
    impl ChatModel for Fixed {
        async fn chat(&self, _request: ChatRequest) -> dojo_llm::Result<dojo_llm::ChatResponse> {
            Ok(dojo_llm::ChatResponse::new(Message::assistant(self.0)))
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_invoke_appends_reply() {
        let config = AgentConfig::<MessagesState>::builder("openai:gpt-4o")
            .system_prompt("You are a helpful assistant.")
            .build()
            .unwrap();
        let agent = create_agent(config, Arc::new(Fixed("hello there")));

        let input = RunInput::new(RunContext::new("t1", "r1"), vec![Message::user("hi")]);
        let state = agent.invoke(input).await.unwrap();

        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].content, "hello there");
        assert!(state.messages.iter().all(|m| m.id.is_some()));
    }

    #[tokio::test]
    async fn test_prior_state_used_without_checkpointer() {
        let config = AgentConfig::<MessagesState>::builder("openai:gpt-4o")
            .build()
            .unwrap();
        let agent = create_agent(config, Arc::new(Fixed("again")));

        let prior = MessagesState {
            messages: vec![Message::user("earlier").with_id("m0")],
        };
        let input = RunInput::new(RunContext::new("t1", "r2"), vec![Message::user("now")]);
        let state = agent.run(input, Some(prior), &EventSink::none()).await.unwrap();

        assert_eq!(state.messages.len(), 3);
        assert_eq!(state.messages[0].content, "earlier");
    }

    #[test]
    fn test_checkpoint_step_saturates() {
        assert_eq!(checkpoint_step(0), 0);
        assert_eq!(checkpoint_step(24), 24);
        assert_eq!(checkpoint_step(usize::MAX), i32::MAX);
    }

    #[test]
    fn test_snapshot_drops_messages() {
        let state = CopilotKitState {
            messages: vec![Message::user("hi")],
            ..Default::default()
        };
        let value = snapshot(&state).unwrap();
        assert!(value.get("messages").is_none());
        assert_eq!(value["copilotkit"], json!({"actions": [], "context": []}));
    }
}
