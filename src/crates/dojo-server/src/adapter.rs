//! Agents exposed over AG-UI
//!
//! An adapter owns an agent plus wherever that agent keeps thread state
//! between runs, and turns a [`RunAgentInput`] into one agent run.

use crate::agui::RunAgentInput;
use async_trait::async_trait;
use dojo_agent::{Agent, EventSink, Result, SessionService, StateSchema};
use dojo_llm::Message;
use std::sync::Arc;

#[async_trait]
pub trait AgUiAgent: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Run the agent, reporting progress to `events`, and return the full
    /// message history of the thread afterwards
    async fn run(&self, input: RunAgentInput, events: EventSink) -> Result<Vec<Message>>;
}

/// Agent whose thread state lives in its checkpointer (if any)
pub struct LangGraphAgUiAgent<S: StateSchema> {
    name: String,
    description: String,
    agent: Arc<Agent<S>>,
}

impl<S: StateSchema> LangGraphAgUiAgent<S> {
    pub fn new(name: impl Into<String>, description: impl Into<String>, agent: Arc<Agent<S>>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            agent,
        }
    }

    pub fn agent(&self) -> &Agent<S> {
        &self.agent
    }
}

#[async_trait]
impl<S: StateSchema> AgUiAgent for LangGraphAgUiAgent<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn run(&self, input: RunAgentInput, events: EventSink) -> Result<Vec<Message>> {
        tracing::debug!(agent = %self.name, thread_id = %input.thread_id, "starting run");
        let state = self.agent.run(input.into_run_input(), None, &events).await?;
        Ok(state.messages().to_vec())
    }
}

/// Agent whose thread state lives in an in-memory session service
pub struct SessionAgUiAgent<S: StateSchema> {
    name: String,
    description: String,
    agent: Arc<Agent<S>>,
    sessions: SessionService<S>,
}

impl<S: StateSchema> SessionAgUiAgent<S> {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        agent: Arc<Agent<S>>,
        sessions: SessionService<S>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            agent,
            sessions,
        }
    }

    pub fn sessions(&self) -> &SessionService<S> {
        &self.sessions
    }
}

#[async_trait]
impl<S: StateSchema> AgUiAgent for SessionAgUiAgent<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn run(&self, input: RunAgentInput, events: EventSink) -> Result<Vec<Message>> {
        let session_id = input.thread_id.clone();
        let prior = self.sessions.get_or_create(&session_id).await;
        tracing::debug!(
            agent = %self.name,
            session = %self.sessions.key(&session_id),
            history = prior.messages().len(),
            "starting run"
        );

        let state = self.agent.run(input.into_run_input(), Some(prior), &events).await?;
        let messages = state.messages().to_vec();
        self.sessions.save(&session_id, state).await;
        Ok(messages)
    }
}
